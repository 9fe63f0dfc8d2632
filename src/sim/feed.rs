use log::{trace, warn};
use std::collections::VecDeque;
use std::sync::mpsc::Sender;

use super::Job;
use crate::core::{Notification, Ticks};

/// Releases workload jobs to the engine as their arrival times come up.
#[derive(Debug)]
pub struct WorkloadFeed {
    jobs: VecDeque<Job>,
    outbox: Sender<Notification>,
}

impl WorkloadFeed {
    pub fn new(mut jobs: Vec<Job>, outbox: Sender<Notification>) -> Self {
        jobs.sort_by(|a, b| {
            a.arrival_time
                .cmp(&b.arrival_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        Self {
            jobs: jobs.into(),
            outbox,
        }
    }

    pub fn next_arrival(&self) -> Option<Ticks> {
        self.jobs.front().map(|job| job.arrival_time)
    }

    pub fn is_exhausted(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.jobs.len()
    }

    /// Sends every job that has arrived by `now` as one batch. Returns the
    /// batch size.
    pub fn release_due(&mut self, now: Ticks) -> usize {
        // Contiguous, since jobs are sorted
        let due = self.jobs.iter().take_while(|job| job.arrival_time <= now).count();
        if due == 0 {
            return 0;
        }

        let batch: Vec<Job> = self.jobs.drain(..due).collect();
        trace!("t={now} releasing {due} arrival(s)");
        if self.outbox.send(Notification::Arrivals(batch)).is_err() {
            warn!("t={now} engine inbox closed, dropping {due} arrival(s)");
        }
        due
    }
}
