pub mod control;
pub mod driver;
pub mod event;
pub mod observer;
pub mod state;
pub mod stats;

pub use control::{Clock, ExecHandle, Executor, Notification};
pub use driver::SchedEngine;
pub use event::{Event, EventKind, EventLog};
pub use observer::Observer;
pub use state::{ProcKey, ProcessRecord, ProcessState, SchedState, Ticks};
pub use stats::{Report, Stats};
