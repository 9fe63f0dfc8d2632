use log::info;
use std::sync::mpsc;

use super::{Job, SimClock, SimExecutor, WorkloadFeed};
use crate::core::{Clock, Report, SchedEngine, Ticks};
use crate::error::SimError;

// Idle ticks spent retrying deferred dispatches before giving up
const MAX_IDLE_RETRIES: u32 = 16;

/// Discrete-event harness around the engine: a workload feed, a simulated
/// clock and in-process executions, all talking to the engine through its
/// notification inbox.
pub struct Sim {
    pub engine: SchedEngine<SimClock, SimExecutor>,
    clock: SimClock,
    feed: WorkloadFeed,
    idle_retries: u32,
}

impl Sim {
    pub fn new(jobs: Vec<Job>) -> Self {
        let (tx, rx) = mpsc::channel();
        let clock = SimClock::new();
        let exec = SimExecutor::new(clock.clone(), tx.clone());
        let feed = WorkloadFeed::new(jobs, tx);
        let engine = SchedEngine::new(clock.clone(), exec, rx);
        Self {
            engine,
            clock,
            feed,
            idle_retries: 0,
        }
    }

    pub fn now(&self) -> Ticks {
        self.clock.now()
    }

    /// Processes the current instant, then moves the clock to the next one.
    /// Returns `Ok(false)` once every job has been released and finished.
    pub fn step(&mut self) -> Result<bool, SimError> {
        let now = self.clock.now();

        // Terminations first so released memory is visible to the
        // preemption check of same-instant arrivals
        self.engine.executor_mut().reap();
        self.feed.release_due(now);
        self.engine.pump();

        if self.all_jobs_completed() {
            return Ok(false);
        }

        let next = [self.feed.next_arrival(), self.engine.executor().next_exit()]
            .into_iter()
            .flatten()
            .min();
        match next {
            Some(t) => {
                self.idle_retries = 0;
                self.clock.advance_to(t.max(now));
                Ok(true)
            }
            None if self.engine.wants_dispatch() && self.idle_retries < MAX_IDLE_RETRIES => {
                self.idle_retries += 1;
                self.clock.advance_time(1);
                Ok(true)
            }
            None => Err(SimError::Stalled {
                now,
                pending: self.engine.pending(),
            }),
        }
    }

    pub fn all_jobs_completed(&self) -> bool {
        self.feed.is_exhausted() && self.engine.is_idle()
    }

    pub fn run(mut self) -> Result<Report, SimError> {
        info!("simulation starting with {} job(s)", self.feed.remaining());
        while self.step()? {}
        Ok(self.engine.finish())
    }
}
