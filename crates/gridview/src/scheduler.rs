//! Polling state machine.
//!
//! The scheduler never performs I/O and never reads a clock on its own: callers pass `now` in,
//! ask for a [`Ticket`] when a cycle should start, and hand the ticket back with the outcome.
//! Pausing or stopping bumps the generation, so tickets issued before that are discarded on
//! completion.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Active,
    Paused,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// The interval fell due.
    Auto,
    /// `refresh_now`.
    Manual,
}

/// Proof that a cycle was started. Completing a ticket from an older generation is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    generation: u64,
    trigger: Trigger,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The ticket was stale (paused, stopped, or already completed).
    Discarded,
}

#[derive(Debug, Clone)]
pub struct PollScheduler {
    phase: Phase,
    interval: Duration,
    generation: u64,
    next_seq: u64,
    next_due: Option<Duration>,
    in_flight: Option<Ticket>,
    last_error: Option<String>,
    consecutive_failures: u32,
}

impl PollScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            phase: Phase::Idle,
            interval,
            generation: 0,
            next_seq: 0,
            next_due: None,
            in_flight: None,
            last_error: None,
            consecutive_failures: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Time left until the next automatic cycle, or `None` when nothing is scheduled.
    pub fn until_due(&self, now: Duration) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_sub(now))
    }

    /// Idle to active. The first cycle is due immediately.
    pub fn start(&mut self, now: Duration) {
        if self.phase != Phase::Idle {
            tracing::debug!(phase = ?self.phase, "start ignored; scheduler already running");
            return;
        }
        self.transition(Phase::Active);
        self.next_due = Some(now);
    }

    /// Stops automatic cycles and invalidates the one in flight, if any.
    pub fn pause(&mut self) {
        if !matches!(self.phase, Phase::Active | Phase::Errored) {
            return;
        }
        self.invalidate();
        self.next_due = None;
        self.transition(Phase::Paused);
    }

    /// Leaves the paused phase with a cycle due immediately. An error recorded before or during
    /// the pause is still current, so the scheduler resumes as errored until a cycle succeeds.
    pub fn resume(&mut self, now: Duration) {
        if self.phase != Phase::Paused {
            return;
        }
        let to = if self.last_error.is_some() {
            Phase::Errored
        } else {
            Phase::Active
        };
        self.transition(to);
        self.next_due = Some(now);
    }

    /// Back to idle from any phase. In-flight work is invalidated and the error is forgotten.
    pub fn stop(&mut self) {
        self.invalidate();
        self.next_due = None;
        self.last_error = None;
        self.consecutive_failures = 0;
        self.transition(Phase::Idle);
    }

    /// Starts an automatic cycle if one is due.
    ///
    /// A tick that falls due while a cycle is in flight is skipped, not queued. Either way the
    /// next due time advances by whole intervals, so the phase of the timer never drifts.
    pub fn begin_due(&mut self, now: Duration) -> Option<Ticket> {
        if !matches!(self.phase, Phase::Active | Phase::Errored) {
            return None;
        }
        let due = self.next_due?;
        if now < due {
            return None;
        }
        self.next_due = Some(self.advance_past(due, now));
        if self.in_flight.is_some() {
            tracing::debug!("skipping tick; a cycle is still in flight");
            return None;
        }
        Some(self.issue(Trigger::Auto))
    }

    /// Starts a cycle right away without moving the interval.
    ///
    /// Refused while idle and suppressed while a cycle is in flight. Honored while paused.
    pub fn begin_refresh(&mut self) -> Option<Ticket> {
        if self.phase == Phase::Idle {
            tracing::debug!("refresh ignored; scheduler is idle");
            return None;
        }
        if self.in_flight.is_some() {
            tracing::debug!("refresh suppressed; a cycle is already in flight");
            return None;
        }
        Some(self.issue(Trigger::Manual))
    }

    /// Records the outcome of a cycle. `Err` carries the message surfaced to the view.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<(), String>) -> Completion {
        if ticket.generation != self.generation || self.in_flight != Some(ticket) {
            tracing::warn!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "discarding result of a stale cycle"
            );
            return Completion::Discarded;
        }
        self.in_flight = None;
        match outcome {
            Ok(()) => {
                self.last_error = None;
                self.consecutive_failures = 0;
                if self.phase == Phase::Errored {
                    self.transition(Phase::Active);
                }
            }
            Err(message) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                tracing::debug!(
                    failures = self.consecutive_failures,
                    error = %message,
                    "cycle failed"
                );
                self.last_error = Some(message);
                if self.phase == Phase::Active {
                    self.transition(Phase::Errored);
                }
            }
        }
        Completion::Applied
    }

    fn issue(&mut self, trigger: Trigger) -> Ticket {
        let ticket = Ticket {
            seq: self.next_seq,
            generation: self.generation,
            trigger,
        };
        self.next_seq += 1;
        self.in_flight = Some(ticket);
        ticket
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }

    fn advance_past(&self, due: Duration, now: Duration) -> Duration {
        if self.interval.is_zero() {
            return now;
        }
        let step = self.interval.as_nanos();
        let skipped = now.saturating_sub(due).as_nanos() / step + 1;
        let ahead = skipped.saturating_mul(step);
        let ahead = Duration::new(
            u64::try_from(ahead / 1_000_000_000).unwrap_or(u64::MAX),
            (ahead % 1_000_000_000) as u32,
        );
        due.checked_add(ahead).unwrap_or(Duration::MAX)
    }

    fn transition(&mut self, to: Phase) {
        if self.phase != to {
            tracing::debug!(from = ?self.phase, to = ?to, "scheduler phase change");
            self.phase = to;
        }
    }
}
