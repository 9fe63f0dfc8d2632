use slotmap::{SlotMap, new_key_type};
use std::collections::VecDeque;

use super::control::ExecHandle;
use super::event::{Event, EventKind, EventLog};
use crate::error::AdmitError;
use crate::mem::{Addr, BuddyAllocator, round_to_block};
use crate::scheduler::{ReadyHeap, ReadyKey};
use crate::sim::{Job, JobId};

pub type Ticks = u64;
new_key_type! {
    pub struct ProcKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Ready,
    Running,
    // Preempted: memory and execution retained, queued in the ready heap
    Stopped,
    Finished,
}

#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub id: JobId,
    pub state: ProcessState,
    pub arrival_time: Ticks,
    pub priority: u32,
    pub run_time: Ticks,
    pub remaining_time: Ticks,
    pub wait_time: Ticks,
    pub last_stop: Option<Ticks>,
    pub requested_memory: u32,
    pub allocated_memory: u32,
    pub memory_address: Option<Addr>,
    pub exec: Option<ExecHandle>,
    // Admission order, last resort tie-break in the ready heap
    pub seq: u64,
}

impl ProcessRecord {
    pub fn ready_key(&self) -> ReadyKey {
        ReadyKey {
            remaining: self.remaining_time,
            arrival: self.arrival_time,
            seq: self.seq,
        }
    }
}

/// Everything the engine mutates: process table, ready heap, the running
/// slot, the memory pool and the event log.
#[derive(Debug, Default)]
pub struct SchedState {
    pub procs: SlotMap<ProcKey, ProcessRecord>,
    pub ready: ReadyHeap,
    // Processes that could not be dispatched during the current pass
    pub held: VecDeque<ProcKey>,
    pub running: Option<ProcKey>,
    pub memory: BuddyAllocator,
    pub log: EventLog,

    // Increment upon admission
    next_seq: u64,
}

impl SchedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `job` as Ready. Arrival stamps later than `now` are
    /// pulled back to `now`.
    pub fn admit(&mut self, job: &Job, now: Ticks) -> Result<ProcKey, AdmitError> {
        job.validate()?;
        let seq = self.next_seq;
        self.next_seq += 1;

        let key = self.procs.insert(ProcessRecord {
            id: job.id,
            state: ProcessState::Ready,
            arrival_time: job.arrival_time.min(now),
            priority: job.priority,
            run_time: job.run_time,
            remaining_time: job.run_time,
            wait_time: 0,
            last_stop: None,
            requested_memory: job.mem_size,
            allocated_memory: round_to_block(job.mem_size),
            memory_address: None,
            exec: None,
            seq,
        });
        self.ready_push(key);
        Ok(key)
    }

    pub fn process(&self, key: ProcKey) -> &ProcessRecord {
        self.procs.get(key).expect("Unknown process key")
    }

    pub fn process_mut(&mut self, key: ProcKey) -> &mut ProcessRecord {
        self.procs.get_mut(key).expect("Unknown process key")
    }

    pub fn ready_push(&mut self, key: ProcKey) {
        debug_assert_ne!(self.running, Some(key), "Running process pushed into ready heap");
        let record = self.process(key);
        debug_assert!(
            matches!(record.state, ProcessState::Ready | ProcessState::Stopped),
            "Process {} must be Ready or Stopped when queued",
            record.id
        );
        let ready_key = record.ready_key();
        self.ready.push(key, ready_key);
    }

    pub fn ready_pop(&mut self) -> Option<ProcKey> {
        self.ready.pop_min()
    }

    pub fn ready_peek(&self) -> Option<ProcKey> {
        self.ready.peek_min()
    }

    pub fn hold(&mut self, key: ProcKey) {
        self.held.push_back(key);
    }

    pub fn flush_held(&mut self) {
        while let Some(key) = self.held.pop_front() {
            self.ready_push(key);
        }
    }

    pub fn set_running(&mut self, key: ProcKey) {
        debug_assert!(self.running.is_none(), "A process is already running");
        debug_assert!(!self.ready.contains(key), "Running process must not be queued");
        self.running = Some(key);
        self.process_mut(key).state = ProcessState::Running;
    }

    pub fn mark_stopped(&mut self, key: ProcKey, now: Ticks) {
        debug_assert_eq!(self.running, Some(key), "Only the running process can be stopped");
        self.running = None;
        let record = self.process_mut(key);
        record.state = ProcessState::Stopped;
        record.last_stop = Some(now);
    }

    pub fn mark_finished(&mut self, key: ProcKey) {
        debug_assert_eq!(self.running, Some(key), "Only the running process can finish");
        self.running = None;
        let record = self.process_mut(key);
        record.state = ProcessState::Finished;
        record.remaining_time = 0;
        record.exec = None;
    }

    pub fn retire(&mut self, key: ProcKey) -> Option<ProcessRecord> {
        let record = self.procs.remove(key)?;
        debug_assert_eq!(record.state, ProcessState::Finished, "Retiring a live process");
        debug_assert!(record.memory_address.is_none(), "Retiring a process that still holds memory");
        Some(record)
    }

    pub fn record(&mut self, kind: EventKind, key: ProcKey, now: Ticks) {
        let event = Event::snapshot(kind, now, self.process(key));
        self.log.push(event);
    }

    /// Memory held by live processes, counted at their rounded size.
    pub fn live_allocated(&self) -> u32 {
        self.procs
            .values()
            .filter(|p| p.memory_address.is_some())
            .map(|p| p.allocated_memory)
            .sum()
    }

    pub fn live_count(&self) -> usize {
        self.procs.len()
    }
}
