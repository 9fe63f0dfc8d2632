use super::state::{ProcessState, SchedState};
use crate::mem::POOL_SIZE;

#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, state: &SchedState) {
        self.step += 1;

        if let Some(key) = state.running {
            let process = state.process(key);
            debug_assert_eq!(
                process.state,
                ProcessState::Running,
                "running slot holds process {} which is not Running",
                process.id
            );
            debug_assert!(
                !state.ready.contains(key),
                "Running process {} must not appear in the ready heap",
                process.id
            );
            debug_assert!(
                process.exec.is_some() && process.memory_address.is_some(),
                "Running process {} must hold an execution and memory",
                process.id
            );
        }

        for key in state.ready.iter() {
            let process = state.process(key);
            debug_assert!(
                matches!(process.state, ProcessState::Ready | ProcessState::Stopped),
                "Process {} in ready heap is {:?}",
                process.id,
                process.state
            );
            debug_assert_eq!(
                process.memory_address.is_some(),
                process.state == ProcessState::Stopped,
                "Only preempted processes may hold memory while queued (process {})",
                process.id
            );
        }

        let running = usize::from(state.running.is_some());
        debug_assert_eq!(
            state.ready.len() + state.held.len() + running,
            state.live_count(),
            "Every live process must be owned by exactly one container"
        );

        debug_assert_eq!(
            state.memory.free_memory() + state.live_allocated(),
            POOL_SIZE,
            "Memory pool conservation violated"
        );
        debug_assert_eq!(
            state.memory.free_in_lists(),
            state.memory.free_memory(),
            "Free lists disagree with the free-memory counter"
        );
    }
}
