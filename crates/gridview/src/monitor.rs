//! Scheduler, fetcher, and session wired into one polling loop.

use crate::clock::Clock;
use crate::config::GridviewConfig;
use crate::fetch::{FetchError, SnapshotFetcher};
use crate::scheduler::{Completion, Phase, PollScheduler, Ticket};
use crate::session::{TopologySession, TopologyView};
use gridview_core::{ControlAction, ControlRequest, GraphModel, Point, Result, Snapshot};
use std::sync::Arc;
use std::time::Duration;

/// Drives fetch, reconcile, and layout cycles.
///
/// [`Monitor::tick`] and [`Monitor::refresh_now`] run a whole cycle. Drivers that fetch on
/// their own (a UI event loop, for instance) use [`Monitor::begin_cycle`] /
/// [`Monitor::begin_refresh`] and hand the result back through [`Monitor::finish_cycle`].
pub struct Monitor<F, C> {
    fetcher: F,
    clock: C,
    scheduler: PollScheduler,
    session: TopologySession,
}

impl<F, C> Monitor<F, C>
where
    F: SnapshotFetcher,
    C: Clock,
{
    /// Fails when `config` does not validate.
    pub fn new(fetcher: F, clock: C, config: &GridviewConfig) -> crate::Result<Self> {
        Ok(Self {
            fetcher,
            clock,
            scheduler: PollScheduler::new(config.poll_interval()),
            session: TopologySession::new(config)?,
        })
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    pub fn model(&self) -> Arc<GraphModel> {
        self.session.model()
    }

    pub fn view(&self) -> TopologyView {
        self.session.view(
            self.scheduler.is_in_flight(),
            self.scheduler.last_error(),
            self.scheduler.phase(),
        )
    }

    /// Time until the next automatic cycle, if one is scheduled.
    pub fn until_due(&self) -> Option<Duration> {
        self.scheduler.until_due(self.clock.now())
    }

    pub fn start(&mut self) {
        self.scheduler.start(self.clock.now());
    }

    /// The view was hidden or the user paused polling.
    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    pub fn resume(&mut self) {
        self.scheduler.resume(self.clock.now());
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    /// Runs a cycle if the interval is due. Returns the resulting view, or `None` when nothing
    /// ran.
    pub async fn tick(&mut self) -> Option<TopologyView> {
        let ticket = self.begin_cycle()?;
        Some(self.run(ticket).await)
    }

    /// Runs a cycle now, unless one is already in flight or the monitor is idle.
    pub async fn refresh_now(&mut self) -> Option<TopologyView> {
        let ticket = self.begin_refresh()?;
        Some(self.run(ticket).await)
    }

    pub fn begin_cycle(&mut self) -> Option<Ticket> {
        self.scheduler.begin_due(self.clock.now())
    }

    pub fn begin_refresh(&mut self) -> Option<Ticket> {
        self.scheduler.begin_refresh()
    }

    /// Applies a fetch result. Stale tickets are discarded and leave the model untouched. A
    /// failed fetch, or a snapshot that breaks the entity invariants, only updates the surfaced
    /// error.
    pub fn finish_cycle(
        &mut self,
        ticket: Ticket,
        result: std::result::Result<Snapshot, FetchError>,
    ) -> Completion {
        let result = result.and_then(|snapshot| {
            snapshot.validate()?;
            Ok(snapshot)
        });
        match result {
            Ok(snapshot) => {
                let completion = self.scheduler.complete(ticket, Ok(()));
                if completion == Completion::Applied {
                    let at = self.clock.wall();
                    let model = self.session.apply_snapshot(&snapshot, at);
                    tracing::debug!(
                        nodes = model.len(),
                        edges = model.edges().len(),
                        "cycle applied"
                    );
                }
                completion
            }
            Err(err) => {
                let completion = self.scheduler.complete(ticket, Err(err.to_string()));
                if completion == Completion::Applied {
                    tracing::warn!(error = %err, "snapshot fetch failed; keeping previous model");
                }
                completion
            }
        }
    }

    async fn run(&mut self, ticket: Ticket) -> TopologyView {
        tracing::debug!(
            trigger = ?ticket.trigger(),
            generation = ticket.generation(),
            "cycle started"
        );
        let result = self.fetcher.fetch_snapshot().await;
        self.finish_cycle(ticket, result);
        self.view()
    }

    pub fn select_node(&mut self, id: Option<&str>) -> Result<()> {
        self.session.select_node(id)
    }

    pub fn set_position(&mut self, id: &str, position: Point) -> Result<()> {
        self.session.set_position(id, position)
    }

    pub fn clear_position(&mut self, id: &str) -> Result<()> {
        self.session.clear_position(id)
    }

    pub fn reset_layout(&mut self) {
        self.session.reset_layout();
    }

    pub fn request_action(&self, id: &str, action: ControlAction) -> Result<ControlRequest> {
        self.session.request_action(id, action)
    }
}
