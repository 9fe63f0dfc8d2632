use average::{Estimate, Variance};

use super::{Event, EventKind, Ticks};
use crate::sim::JobId;

/// Aggregates over every finished process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    pub finished: usize,
    pub elapsed: Ticks,
    pub useful: Ticks,
    pub cpu_utilization: f64,
    pub avg_wta: f64,
    pub std_wta: f64,
    pub avg_waiting: f64,
    pub std_waiting: f64,
}

#[derive(Debug)]
struct Accumulator {
    finished: usize,
    useful: Ticks,
    wta: Variance,
    waiting: Variance,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            finished: 0,
            useful: 0,
            wta: Variance::new(),
            waiting: Variance::new(),
        }
    }

    fn add(&mut self, event: &Event) {
        if let EventKind::Finish {
            weighted_turnaround, ..
        } = event.kind
        {
            self.finished += 1;
            self.useful += event.run_time;
            self.wta.add(weighted_turnaround);
            self.waiting.add(event.wait_time as f64);
        }
    }

    fn finish(self, elapsed: Ticks) -> Stats {
        if self.finished == 0 {
            return Stats {
                elapsed,
                ..Stats::default()
            };
        }
        let cpu_utilization = if elapsed == 0 {
            0.0
        } else {
            self.useful as f64 * 100.0 / elapsed as f64
        };
        Stats {
            finished: self.finished,
            elapsed,
            useful: self.useful,
            cpu_utilization,
            avg_wta: self.wta.mean(),
            std_wta: self.wta.population_variance().sqrt(),
            avg_waiting: self.waiting.mean(),
            std_waiting: self.waiting.population_variance().sqrt(),
        }
    }
}

/// Output of a finished run: the drained event log and its aggregates.
#[derive(Debug, Clone)]
pub struct Report {
    pub events: Vec<Event>,
    pub stats: Stats,
    // Jobs refused at admission
    pub rejected: Vec<JobId>,
}

impl Report {
    /// Drains `events` once, in order, folding every Finish into the aggregates.
    pub fn collect(events: impl Iterator<Item = Event>, elapsed: Ticks) -> Self {
        let mut acc = Accumulator::new();
        let events: Vec<Event> = events.inspect(|event| acc.add(event)).collect();
        Self {
            events,
            stats: acc.finish(elapsed),
            rejected: Vec::new(),
        }
    }
}
