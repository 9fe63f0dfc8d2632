use log::{debug, error, info, warn};
use std::sync::mpsc::{Receiver, TryRecvError};

use super::{
    control::{Clock, ExecHandle, Executor, Notification},
    event::EventKind,
    observer::Observer,
    state::{ProcKey, ProcessState, SchedState, Ticks},
    stats::Report,
};
use crate::error::DispatchError;
use crate::scheduler::{remaining_at, should_preempt};
use crate::sim::{Job, JobId};

/// Preemptive shortest-remaining-time-next engine.
///
/// All mutation happens on `&mut self`, one notification at a time, so
/// handlers never interleave with each other or with a dispatch pass.
pub struct SchedEngine<C: Clock, X: Executor> {
    pub state: SchedState,
    clock: C,
    exec: X,
    inbox: Receiver<Notification>,
    needs_dispatch: bool,
    // Time the first notification was handled
    started_at: Option<Ticks>,
    // Jobs refused at admission, never queued
    rejected: Vec<JobId>,
    observer: Observer,
}

impl<C: Clock, X: Executor> SchedEngine<C, X> {
    pub fn new(clock: C, exec: X, inbox: Receiver<Notification>) -> Self {
        Self {
            state: SchedState::new(),
            clock,
            exec,
            inbox,
            needs_dispatch: false,
            started_at: None,
            rejected: Vec::new(),
            observer: Observer::new(),
        }
    }

    /// Handles every pending notification, then runs a dispatch pass if one
    /// was requested. Returns the number of notifications handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.inbox.try_recv() {
                Ok(notification) => {
                    self.handle(notification);
                    handled += 1;
                }
                // Nothing pending ends the drain pass; a closed channel only
                // means no one will send again
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        if self.needs_dispatch {
            self.dispatch();
        }
        handled
    }

    pub fn handle(&mut self, notification: Notification) {
        let now = self.clock.now();
        self.started_at.get_or_insert(now);

        match notification {
            Notification::Arrivals(jobs) => self.on_arrivals(&jobs, now),
            Notification::Exited(handle) => self.on_exit(handle, now),
        }
        self.observer.observe(&self.state);
    }

    fn on_arrivals(&mut self, jobs: &[Job], now: Ticks) {
        for job in jobs {
            if job.arrival_time > now {
                warn!(
                    "t={now} process {} stamped with future arrival {}, admitting as arrived now",
                    job.id, job.arrival_time
                );
            }
            let key = match self.state.admit(job, now) {
                Ok(key) => key,
                Err(err) => {
                    error!("t={now} refusing job: {err}");
                    self.rejected.push(job.id);
                    continue;
                }
            };
            let process = self.state.process(key);
            debug!(
                "t={now} admitted process {} (runtime {}, memory {} -> {})",
                process.id, process.run_time, process.requested_memory, process.allocated_memory
            );
        }

        if self.state.running.is_some() {
            self.check_preemption(now);
        } else if !self.state.ready.is_empty() {
            self.needs_dispatch = true;
        }
    }

    fn check_preemption(&mut self, now: Ticks) {
        let Some(current) = self.state.running else {
            return;
        };
        let remaining = remaining_at(self.state.process(current), now);
        self.state.process_mut(current).remaining_time = remaining;

        let Some(candidate) = self.state.ready_peek() else {
            return;
        };
        let candidate = self.state.process(candidate);
        if !should_preempt(candidate, remaining) {
            return;
        }
        let free = self.state.memory.free_memory();
        if candidate.allocated_memory > free {
            debug!(
                "t={now} process {} is shorter but needs {} units with {free} free, not preempting",
                candidate.id, candidate.allocated_memory
            );
            return;
        }

        let running = self.state.process(current);
        let handle = running.exec.expect("Running process missing execution handle");
        if let Err(err) = self.exec.stop(handle) {
            warn!("t={now} failed to stop process {}: {err}", running.id);
            return;
        }

        self.state.mark_stopped(current, now);
        self.state.record(EventKind::Stop, current, now);
        self.state.ready_push(current);
        self.needs_dispatch = true;
        debug!("t={now} stopped process {} with {remaining} remaining", self.state.process(current).id);
    }

    fn on_exit(&mut self, handle: ExecHandle, now: Ticks) {
        let Some(current) = self.state.running else {
            warn!("t={now} termination of {handle:?} with nothing running, ignoring");
            return;
        };
        if self.state.process(current).exec != Some(handle) {
            warn!("t={now} termination of foreign execution {handle:?}, ignoring");
            return;
        }

        let process = self.state.process(current);
        let (id, size) = (process.id, process.allocated_memory);
        if let Some(addr) = process.memory_address {
            if let Err(err) = self.state.memory.free(addr, size) {
                warn!("t={now} releasing memory of process {id} failed: {err}");
            }
        }

        self.state.mark_finished(current);
        let process = self.state.process(current);
        let turnaround = now.saturating_sub(process.arrival_time);
        let weighted_turnaround = turnaround as f64 / process.run_time as f64;
        debug!("t={now} process {id} finished, TA {turnaround}");

        // The Finish snapshot still names the block that was just released
        self.state.record(
            EventKind::Finish {
                turnaround,
                weighted_turnaround,
            },
            current,
            now,
        );
        self.state.process_mut(current).memory_address = None;
        self.state.retire(current);
        self.needs_dispatch = true;
    }

    fn dispatch(&mut self) {
        self.needs_dispatch = false;
        while self.state.running.is_none() {
            let Some(key) = self.state.ready_pop() else {
                break;
            };
            if let Err(err) = self.launch(key) {
                warn!(
                    "t={} deferring process {}: {err}",
                    self.clock.now(),
                    self.state.process(key).id
                );
                self.state.hold(key);
            }
        }
        // With the CPU left idle, deferred processes are retried on the next pass
        self.needs_dispatch = self.state.running.is_none() && !self.state.held.is_empty();
        // Deferred processes keep their original key, so they come back in
        // the same order relative to each other and to later arrivals
        self.state.flush_held();
        self.observer.observe(&self.state);
    }

    fn launch(&mut self, key: ProcKey) -> Result<(), DispatchError> {
        let now = self.clock.now();
        let process = self.state.process(key);
        let (id, run_time, size, exec) = (process.id, process.run_time, process.allocated_memory, process.exec);

        match exec {
            None => {
                let addr = self.state.memory.allocate(size)?;
                let handle = match self.exec.start(id, run_time) {
                    Ok(handle) => handle,
                    Err(err) => {
                        if let Err(free_err) = self.state.memory.free(addr, size) {
                            warn!("t={now} could not return memory of process {id}: {free_err}");
                        }
                        return Err(err.into());
                    }
                };

                let process = self.state.process_mut(key);
                process.memory_address = Some(addr);
                process.exec = Some(handle);
                process.wait_time = now.saturating_sub(process.arrival_time);
                self.state.set_running(key);
                self.state.record(EventKind::Start, key, now);
                debug!("t={now} started process {id} at address {addr}");
            }
            Some(handle) => {
                debug_assert_eq!(self.state.process(key).state, ProcessState::Stopped);
                self.exec.resume(handle)?;

                let process = self.state.process_mut(key);
                let stopped_at = process.last_stop.take().unwrap_or(now);
                process.wait_time += now.saturating_sub(stopped_at);
                self.state.set_running(key);
                self.state.record(EventKind::Resume, key, now);
                debug!("t={now} resumed process {id}");
            }
        }
        Ok(())
    }

    /// Nothing running, nothing queued.
    pub fn is_idle(&self) -> bool {
        self.state.running.is_none() && self.state.ready.is_empty() && self.state.held.is_empty()
    }

    /// A dispatch pass is owed even without a new notification.
    pub fn wants_dispatch(&self) -> bool {
        self.needs_dispatch
    }

    pub fn pending(&self) -> usize {
        self.state.live_count()
    }

    pub fn running(&self) -> Option<ProcKey> {
        self.state.running
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn executor(&self) -> &X {
        &self.exec
    }

    pub fn executor_mut(&mut self) -> &mut X {
        &mut self.exec
    }

    /// Ids of jobs refused at admission, in arrival order.
    pub fn rejected(&self) -> &[JobId] {
        &self.rejected
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Drains the event log once and folds it into the run's aggregates.
    pub fn finish(mut self) -> Report {
        let end = self.clock.now();
        let elapsed = end - self.started_at.unwrap_or(end);
        let mut report = Report::collect(self.state.log.drain(), elapsed);
        report.rejected = self.rejected;
        info!(
            "run finished: {} processes in {elapsed} ticks, {} events, {} refused",
            report.stats.finished,
            report.events.len(),
            report.rejected.len()
        );
        report
    }
}
