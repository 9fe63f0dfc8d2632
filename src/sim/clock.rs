use std::cell::Cell;
use std::rc::Rc;

use crate::core::{Clock, Ticks};

/// Shared simulated clock; every clone observes the same time. Only the
/// simulation driver advances it.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: Rc<Cell<Ticks>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_time(&self, delta: Ticks) {
        self.now.set(self.now.get().saturating_add(delta));
    }

    pub fn advance_to(&self, t: Ticks) {
        debug_assert!(t >= self.now.get(), "Clock must not run backwards");
        self.now.set(t.max(self.now.get()));
    }
}

impl Clock for SimClock {
    fn now(&self) -> Ticks {
        self.now.get()
    }
}
