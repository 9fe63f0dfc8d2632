pub mod config;
pub mod core;
pub mod error;
pub mod mem;
pub mod scheduler;
pub mod sim;

pub use config::SimConfig;
pub use crate::core::{Event, EventKind, Report, SchedEngine, Stats};
pub use mem::BuddyAllocator;
pub use sim::{Job, Sim};
