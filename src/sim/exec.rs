use log::{trace, warn};
use slotmap::SlotMap;
use std::sync::mpsc::Sender;

use super::{JobId, SimClock};
use crate::core::{Clock, ExecHandle, Executor, Notification, Ticks};
use crate::error::ControlError;

#[derive(Debug)]
struct Execution {
    job: JobId,
    remaining: Ticks,
    // Set while running
    since: Option<Ticks>,
}

impl Execution {
    fn exit_time(&self) -> Option<Ticks> {
        self.since.map(|since| since + self.remaining)
    }
}

/// In-process workload stand-in: an execution simply burns simulated time
/// while running and terminates once its runtime is used up.
#[derive(Debug)]
pub struct SimExecutor {
    clock: SimClock,
    execs: SlotMap<ExecHandle, Execution>,
    outbox: Sender<Notification>,
}

impl SimExecutor {
    pub fn new(clock: SimClock, outbox: Sender<Notification>) -> Self {
        Self {
            clock,
            execs: SlotMap::with_key(),
            outbox,
        }
    }

    /// Earliest instant at which a running execution terminates.
    pub fn next_exit(&self) -> Option<Ticks> {
        self.execs.values().filter_map(Execution::exit_time).min()
    }

    /// Removes every execution whose runtime has elapsed by now and posts
    /// its termination notification.
    pub fn reap(&mut self) -> usize {
        let now = self.clock.now();
        let done: Vec<ExecHandle> = self
            .execs
            .iter()
            .filter(|(_, exec)| exec.exit_time().is_some_and(|t| t <= now))
            .map(|(handle, _)| handle)
            .collect();

        for &handle in &done {
            if let Some(exec) = self.execs.remove(handle) {
                trace!("t={now} workload of job {} exited", exec.job);
            }
            if self.outbox.send(Notification::Exited(handle)).is_err() {
                warn!("t={now} engine inbox closed, dropping termination of {handle:?}");
            }
        }
        done.len()
    }

    pub fn live(&self) -> usize {
        self.execs.len()
    }
}

impl Executor for SimExecutor {
    fn start(&mut self, job: JobId, run_time: Ticks) -> Result<ExecHandle, ControlError> {
        let now = self.clock.now();
        Ok(self.execs.insert(Execution {
            job,
            remaining: run_time,
            since: Some(now),
        }))
    }

    fn stop(&mut self, handle: ExecHandle) -> Result<(), ControlError> {
        let now = self.clock.now();
        let exec = self.execs.get_mut(handle).ok_or(ControlError::UnknownHandle)?;
        let since = exec.since.take().ok_or(ControlError::NotRunning)?;
        exec.remaining = exec.remaining.saturating_sub(now - since);
        Ok(())
    }

    fn resume(&mut self, handle: ExecHandle) -> Result<(), ControlError> {
        let now = self.clock.now();
        let exec = self.execs.get_mut(handle).ok_or(ControlError::UnknownHandle)?;
        if exec.since.is_some() {
            return Err(ControlError::NotStopped);
        }
        exec.since = Some(now);
        Ok(())
    }
}
