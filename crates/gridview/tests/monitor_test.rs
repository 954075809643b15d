use futures::executor::block_on;
use gridview::{
    Completion, ControlAction, Entity, EntityStatus, FetchError, FnFetcher, GridviewConfig,
    ManualClock, Monitor, Phase, Point, PositionSource, Snapshot,
};
use gridview_core::{GatewayEntity, ResourceEntity, Transport, WorkerEntity};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const INTERVAL: Duration = Duration::from_millis(3000);

type Script = Arc<Mutex<VecDeque<Result<Snapshot, FetchError>>>>;

fn gateway() -> Entity {
    Entity::Gateway(GatewayEntity {
        name: "gw".to_string(),
        status: EntityStatus::Running,
        version: "1.0.0".to_string(),
    })
}

fn worker(name: &str, status: EntityStatus) -> Entity {
    Entity::Worker(WorkerEntity {
        name: name.to_string(),
        status,
        transport: Transport::Http,
        endpoint: None,
        container_id: None,
        tool_count: Some(1),
        resources: Vec::new(),
    })
}

fn resource(name: &str) -> Entity {
    Entity::Resource(ResourceEntity {
        name: name.to_string(),
        status: EntityStatus::Running,
        image: "postgres:16".to_string(),
        network: None,
    })
}

/// A fetcher that replays queued results and reports `Unavailable` once the queue runs dry.
fn scripted(
    results: Vec<Result<Snapshot, FetchError>>,
) -> (
    FnFetcher<impl Fn() -> Result<Snapshot, FetchError> + Send + Sync>,
    Script,
) {
    let script: Script = Arc::new(Mutex::new(results.into()));
    let handle = Arc::clone(&script);
    let fetcher = FnFetcher::new(move || {
        handle
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(FetchError::Unavailable {
                    message: "script exhausted".to_string(),
                })
            })
    });
    (fetcher, script)
}

fn unavailable() -> Result<Snapshot, FetchError> {
    Err(FetchError::Unavailable {
        message: "gateway unreachable".to_string(),
    })
}

#[test]
fn first_tick_lays_out_the_initial_snapshot() {
    let snapshot = Snapshot::new(vec![gateway(), worker("w1", EntityStatus::Running)]);
    let (fetcher, _) = scripted(vec![Ok(snapshot)]);
    let clock = ManualClock::default();
    let mut monitor = Monitor::new(fetcher, &clock, &GridviewConfig::default()).unwrap();

    assert!(block_on(monitor.tick()).is_none(), "idle monitors never tick");
    monitor.start();
    let view = block_on(monitor.tick()).unwrap();

    assert!(!view.is_loading);
    assert_eq!(view.error, None);
    assert_eq!(view.phase, Phase::Active);
    assert!(view.last_updated.is_some());
    let gw = view.model.node("gw").unwrap();
    let w1 = view.model.node("w1").unwrap();
    assert_eq!(gw.position, Some(Point::new(40.0, 40.0)));
    assert_eq!(w1.position, Some(Point::new(478.0, 54.0)));
    assert_eq!(w1.position_source, PositionSource::Auto);

    assert!(block_on(monitor.tick()).is_none(), "next cycle is one interval away");
    assert_eq!(monitor.until_due(), Some(INTERVAL));
}

#[test]
fn growth_places_the_new_worker_in_the_same_column_without_moving_the_old_one() {
    let first = Snapshot::new(vec![gateway(), worker("w1", EntityStatus::Running)]);
    let second = Snapshot::new(vec![
        gateway(),
        worker("w1", EntityStatus::Error),
        worker("w2", EntityStatus::Initializing),
    ]);
    let (fetcher, _) = scripted(vec![Ok(first), Ok(second)]);
    let clock = ManualClock::default();
    let mut monitor = Monitor::new(fetcher, &clock, &GridviewConfig::default()).unwrap();
    monitor.start();

    let before = block_on(monitor.tick()).unwrap().model;
    let w1_before = before.node("w1").unwrap().position.unwrap();

    clock.advance(INTERVAL);
    let after = block_on(monitor.tick()).unwrap().model;
    assert_eq!(after.len(), 3);

    let w1 = after.node("w1").unwrap();
    let w2 = after.node("w2").unwrap();
    assert_eq!(w1.entity.status(), EntityStatus::Error);
    assert_eq!(w1.position, Some(w1_before));

    let w2_pos = w2.position.unwrap();
    assert_eq!(w2_pos.x, w1_before.x);
    assert_eq!(w2_pos, Point::new(478.0, 240.0));
    // 256x140 boxes: no overlap on the cross axis.
    assert!(w2_pos.y >= w1_before.y + 140.0 || w2_pos.y + 140.0 <= w1_before.y);

    // The earlier view still holds the earlier model.
    assert_eq!(before.len(), 2);
}

#[test]
fn a_dragged_node_stays_put_across_polls() {
    let snapshot = Snapshot::new(vec![gateway(), worker("w1", EntityStatus::Running)]);
    let (fetcher, _) = scripted(vec![Ok(snapshot.clone()), Ok(snapshot)]);
    let clock = ManualClock::default();
    let mut monitor = Monitor::new(fetcher, &clock, &GridviewConfig::default()).unwrap();
    monitor.start();
    block_on(monitor.tick()).unwrap();

    monitor.set_position("w1", Point::new(500.0, 500.0)).unwrap();
    clock.advance(INTERVAL);
    let view = block_on(monitor.tick()).unwrap();

    let w1 = view.model.node("w1").unwrap();
    assert_eq!(w1.position, Some(Point::new(500.0, 500.0)));
    assert_eq!(w1.position_source, PositionSource::Manual);
}

#[test]
fn failures_keep_the_last_good_model_until_a_fetch_succeeds() {
    let first = Snapshot::new(vec![gateway(), worker("w1", EntityStatus::Running)]);
    let recovered = Snapshot::new(vec![
        gateway(),
        worker("w1", EntityStatus::Running),
        worker("w2", EntityStatus::Running),
    ]);
    let (fetcher, _) = scripted(vec![
        Ok(first),
        unavailable(),
        Err(FetchError::Timeout { after_ms: 2500 }),
        Err(FetchError::Malformed {
            message: "duplicate entity name".to_string(),
        }),
        Ok(recovered),
    ]);
    let clock = ManualClock::default();
    let mut monitor = Monitor::new(fetcher, &clock, &GridviewConfig::default()).unwrap();
    monitor.start();
    let good = block_on(monitor.tick()).unwrap().model;

    for _ in 0..3 {
        clock.advance(INTERVAL);
        let view = block_on(monitor.tick()).unwrap();
        assert_eq!(view.phase, Phase::Errored);
        assert!(view.error.is_some());
        assert_eq!(*view.model, *good);
    }
    assert_eq!(monitor.scheduler().consecutive_failures(), 3);

    clock.advance(INTERVAL);
    let view = block_on(monitor.tick()).unwrap();
    assert_eq!(view.phase, Phase::Active);
    assert_eq!(view.error, None);
    assert_eq!(view.model.len(), 3);
}

#[test]
fn a_result_arriving_after_pause_is_discarded() {
    let snapshot = Snapshot::new(vec![gateway()]);
    let (fetcher, _) = scripted(Vec::new());
    let clock = ManualClock::default();
    let mut monitor = Monitor::new(fetcher, &clock, &GridviewConfig::default()).unwrap();
    monitor.start();

    let ticket = monitor.begin_cycle().unwrap();
    assert!(monitor.view().is_loading);
    monitor.pause();
    assert_eq!(monitor.finish_cycle(ticket, Ok(snapshot)), Completion::Discarded);
    assert!(monitor.model().is_empty());
    assert_eq!(monitor.phase(), Phase::Paused);
    assert!(!monitor.view().is_loading);

    clock.advance(INTERVAL * 4);
    assert!(block_on(monitor.tick()).is_none(), "paused monitors do not poll");
}

#[test]
fn manual_refresh_is_suppressed_while_a_cycle_is_in_flight() {
    let snapshot = Snapshot::new(vec![gateway()]);
    let (fetcher, script) = scripted(vec![Ok(snapshot.clone())]);
    let clock = ManualClock::default();
    let mut monitor = Monitor::new(fetcher, &clock, &GridviewConfig::default()).unwrap();
    monitor.start();

    let ticket = monitor.begin_cycle().unwrap();
    assert!(block_on(monitor.refresh_now()).is_none());
    assert_eq!(script.lock().unwrap().len(), 1, "suppressed refresh must not fetch");

    assert_eq!(monitor.finish_cycle(ticket, Ok(snapshot)), Completion::Applied);
    let view = block_on(monitor.refresh_now()).unwrap();
    assert_eq!(view.model.len(), 1);
}

#[test]
fn resume_polls_immediately() {
    let (fetcher, _) = scripted(vec![
        Ok(Snapshot::new(vec![gateway()])),
        Ok(Snapshot::new(vec![gateway(), worker("w1", EntityStatus::Running)])),
    ]);
    let clock = ManualClock::default();
    let mut monitor = Monitor::new(fetcher, &clock, &GridviewConfig::default()).unwrap();
    monitor.start();
    block_on(monitor.tick()).unwrap();

    monitor.pause();
    clock.advance(Duration::from_millis(10));
    monitor.resume();
    let view = block_on(monitor.tick()).unwrap();
    assert_eq!(view.model.len(), 2);
}

#[test]
fn intents_validate_node_ids_and_controllability() {
    let snapshot = Snapshot::new(vec![
        gateway(),
        worker("w1", EntityStatus::Running),
        resource("db"),
    ]);
    let (fetcher, _) = scripted(vec![Ok(snapshot)]);
    let clock = ManualClock::default();
    let mut monitor = Monitor::new(fetcher, &clock, &GridviewConfig::default()).unwrap();
    monitor.start();
    block_on(monitor.tick()).unwrap();

    assert!(monitor.select_node(Some("ghost")).is_err());
    monitor.select_node(Some("db")).unwrap();
    assert_eq!(monitor.model().selected_id(), Some("db"));

    assert!(monitor.request_action("gw", ControlAction::Restart).is_err());
    let req = monitor.request_action("db", ControlAction::Restart).unwrap();
    assert_eq!(req.id, "db");

    let placed = monitor.model().node("w1").unwrap().position;
    monitor.set_position("w1", Point::new(900.0, 900.0)).unwrap();
    monitor.clear_position("w1").unwrap();
    let w1 = monitor.model().node("w1").unwrap().clone();
    assert_eq!(w1.position_source, PositionSource::Auto);
    assert_eq!(w1.position, placed);

    monitor.reset_layout();
    assert!(monitor.model().placeholders().next().is_none());
}

#[test]
fn an_invalid_snapshot_is_a_failed_cycle() {
    let first = Snapshot::new(vec![gateway(), worker("w1", EntityStatus::Running)]);
    let second_gateway = Entity::Gateway(GatewayEntity {
        name: "gw2".to_string(),
        status: EntityStatus::Running,
        version: "1.0.0".to_string(),
    });
    let invalid = Snapshot::new(vec![
        gateway(),
        second_gateway,
        worker("w1", EntityStatus::Running),
        worker("w1", EntityStatus::Error),
    ]);
    let (fetcher, _) = scripted(vec![Ok(first), Ok(invalid)]);
    let clock = ManualClock::default();
    let mut monitor = Monitor::new(fetcher, &clock, &GridviewConfig::default()).unwrap();
    monitor.start();
    let good = block_on(monitor.tick()).unwrap();

    clock.advance(INTERVAL);
    let view = block_on(monitor.tick()).unwrap();
    assert_eq!(view.phase, Phase::Errored);
    assert!(view.error.as_deref().unwrap().starts_with("Malformed snapshot"));
    assert_eq!(*view.model, *good.model);
    assert_eq!(view.last_updated, good.last_updated);
    assert!(view.model.node("gw2").is_none());
}

#[test]
fn an_invalid_first_snapshot_leaves_the_model_empty() {
    let invalid = Snapshot::new(vec![gateway(), worker("gw", EntityStatus::Running)]);
    let (fetcher, _) = scripted(vec![Ok(invalid)]);
    let clock = ManualClock::default();
    let mut monitor = Monitor::new(fetcher, &clock, &GridviewConfig::default()).unwrap();
    monitor.start();

    let view = block_on(monitor.tick()).unwrap();
    assert_eq!(view.phase, Phase::Errored);
    assert!(view.model.is_empty());
    assert_eq!(view.last_updated, None);
}

#[test]
fn construction_rejects_an_invalid_config() {
    let clock = ManualClock::default();
    let mut config = GridviewConfig::default();
    config.layout.node_sep = -10.0;
    let (fetcher, _) = scripted(Vec::new());
    assert!(Monitor::new(fetcher, &clock, &config).is_err());

    let mut config = GridviewConfig::default();
    config.poll_interval_ms = 0;
    let (fetcher, _) = scripted(Vec::new());
    assert!(Monitor::new(fetcher, &clock, &config).is_err());
}

#[test]
fn pausing_an_errored_monitor_resumes_errored() {
    let (fetcher, _) = scripted(vec![unavailable(), Ok(Snapshot::new(vec![gateway()]))]);
    let clock = ManualClock::default();
    let mut monitor = Monitor::new(fetcher, &clock, &GridviewConfig::default()).unwrap();
    monitor.start();
    let view = block_on(monitor.tick()).unwrap();
    assert_eq!(view.phase, Phase::Errored);

    monitor.pause();
    assert_eq!(
        monitor.view().error.as_deref(),
        Some("Snapshot source unavailable: gateway unreachable")
    );
    clock.advance(Duration::from_millis(10));
    monitor.resume();
    let resumed = monitor.view();
    assert_eq!(resumed.phase, Phase::Errored);
    assert!(resumed.error.is_some());

    let view = block_on(monitor.tick()).unwrap();
    assert_eq!(view.phase, Phase::Active);
    assert_eq!(view.error, None);
    assert_eq!(view.model.len(), 1);
}

#[test]
fn a_stopped_monitor_neither_polls_nor_refreshes() {
    let (fetcher, script) = scripted(vec![unavailable(), Ok(Snapshot::new(vec![gateway()]))]);
    let clock = ManualClock::default();
    let mut monitor = Monitor::new(fetcher, &clock, &GridviewConfig::default()).unwrap();
    monitor.start();
    block_on(monitor.tick()).unwrap();

    monitor.stop();
    let view = monitor.view();
    assert_eq!(view.phase, Phase::Idle);
    assert_eq!(view.error, None);

    clock.advance(INTERVAL * 3);
    assert!(block_on(monitor.tick()).is_none());
    assert!(block_on(monitor.refresh_now()).is_none());
    assert_eq!(script.lock().unwrap().len(), 1, "a stopped monitor must not fetch");
}
