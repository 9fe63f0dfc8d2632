use keyed_priority_queue::KeyedPriorityQueue;
use std::cmp::Ordering;

use crate::core::{ProcKey, Ticks};

/// Ordering key of a queued process: shortest remaining time first, then
/// earliest arrival, then admission order.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct ReadyKey {
    pub remaining: Ticks,
    pub arrival: Ticks,
    pub seq: u64,
}

impl ReadyKey {
    fn as_tuple(&self) -> (Ticks, Ticks, u64) {
        (self.remaining, self.arrival, self.seq)
    }
}

// KeyedPriorityQueue is a max-heap, so the smallest key must compare greatest
impl PartialOrd for ReadyKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReadyKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other.as_tuple().cmp(&self.as_tuple())
    }
}

/// Min-heap of ready and preempted processes keyed by remaining time.
#[derive(Debug)]
pub struct ReadyHeap {
    queue: KeyedPriorityQueue<ProcKey, ReadyKey>,
}

impl Default for ReadyHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadyHeap {
    pub fn new() -> Self {
        Self {
            queue: KeyedPriorityQueue::new(),
        }
    }

    pub fn push(&mut self, process: ProcKey, key: ReadyKey) {
        let replaced = self.queue.push(process, key);
        debug_assert!(replaced.is_none(), "Process {process:?} queued twice");
    }

    pub fn pop_min(&mut self) -> Option<ProcKey> {
        self.queue.pop().map(|(process, _)| process)
    }

    pub fn peek_min(&self) -> Option<ProcKey> {
        self.queue.peek().map(|(process, _)| *process)
    }

    pub fn contains(&self, process: ProcKey) -> bool {
        self.queue.get_priority(&process).is_some()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ProcKey> + '_ {
        self.queue.iter().map(|(process, _)| *process)
    }
}
