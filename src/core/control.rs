use slotmap::new_key_type;

use super::state::Ticks;
use crate::error::ControlError;
use crate::sim::{Job, JobId};

new_key_type! {
    /// Opaque reference to one workload execution.
    pub struct ExecHandle;
}

/// Time source polled by the engine on every transition.
pub trait Clock {
    fn now(&self) -> Ticks;
}

/// Start/stop/resume control over workload executions. An execution
/// terminates on its own once its runtime has elapsed and reports that
/// through `Notification::Exited`.
pub trait Executor {
    fn start(&mut self, job: JobId, run_time: Ticks) -> Result<ExecHandle, ControlError>;

    fn stop(&mut self, handle: ExecHandle) -> Result<(), ControlError>;

    fn resume(&mut self, handle: ExecHandle) -> Result<(), ControlError>;
}

/// Out-of-band notifications consumed by the engine's loop, one at a time.
#[derive(Debug)]
pub enum Notification {
    // Every job in the batch has arrived
    Arrivals(Vec<Job>),
    Exited(ExecHandle),
}
