pub mod heap;
pub mod srtn;

pub use heap::{ReadyHeap, ReadyKey};
pub use srtn::{remaining_at, should_preempt};
