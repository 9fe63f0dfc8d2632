use std::collections::VecDeque;
use std::fmt;

use crate::core::{ProcessRecord, Ticks};
use crate::mem::Addr;
use crate::sim::JobId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    Start,
    Stop,
    Resume,
    Finish {
        turnaround: Ticks,
        weighted_turnaround: f64,
    },
}

/// Immutable snapshot of one state transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub time: Ticks,
    pub process: JobId,
    pub arrival_time: Ticks,
    pub run_time: Ticks,
    pub remaining_time: Ticks,
    pub wait_time: Ticks,
    pub requested_memory: u32,
    pub allocated_memory: u32,
    pub memory_address: Option<Addr>,
}

impl Event {
    pub fn snapshot(kind: EventKind, time: Ticks, record: &ProcessRecord) -> Self {
        Self {
            kind,
            time,
            process: record.id,
            arrival_time: record.arrival_time,
            run_time: record.run_time,
            remaining_time: record.remaining_time,
            wait_time: record.wait_time,
            requested_memory: record.requested_memory,
            allocated_memory: record.allocated_memory,
            memory_address: record.memory_address,
        }
    }

    pub fn is_finish(&self) -> bool {
        matches!(self.kind, EventKind::Finish { .. })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            EventKind::Start => "started",
            EventKind::Stop => "stopped",
            EventKind::Resume => "resumed",
            EventKind::Finish { .. } => "finished",
        };
        write!(
            f,
            "At time {} process {} {} arr {} total {} remain {} wait {}",
            self.time, self.process, verb, self.arrival_time, self.run_time, self.remaining_time, self.wait_time
        )?;
        if let EventKind::Finish {
            turnaround,
            weighted_turnaround,
        } = self.kind
        {
            write!(f, " TA {turnaround} WTA {weighted_turnaround:.2}")?;
        }
        Ok(())
    }
}

/// Append-only, FIFO record of scheduling events.
#[derive(Debug, Default)]
pub struct EventLog {
    events: VecDeque<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        debug_assert!(
            self.events.back().is_none_or(|last| last.time <= event.time),
            "Events must be appended in chronological order"
        );
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind, time: Ticks) -> Event {
        Event {
            kind,
            time,
            process: 7,
            arrival_time: 2,
            run_time: 5,
            remaining_time: 0,
            wait_time: 3,
            requested_memory: 30,
            allocated_memory: 32,
            memory_address: Some(64),
        }
    }

    #[test]
    fn drains_in_append_order() {
        let mut log = EventLog::new();
        log.push(event(EventKind::Start, 5));
        log.push(event(EventKind::Stop, 6));
        log.push(event(EventKind::Resume, 6));
        assert_eq!(log.len(), 3);

        let kinds: Vec<EventKind> = log.drain().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Start, EventKind::Stop, EventKind::Resume]);
        assert!(log.is_empty());
    }

    #[test]
    fn finish_line_carries_turnaround() {
        let line = event(
            EventKind::Finish {
                turnaround: 10,
                weighted_turnaround: 2.0,
            },
            12,
        )
        .to_string();
        assert_eq!(line, "At time 12 process 7 finished arr 2 total 5 remain 0 wait 3 TA 10 WTA 2.00");
    }
}
