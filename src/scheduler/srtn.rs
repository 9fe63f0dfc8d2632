use crate::core::{ProcessRecord, Ticks};

/// Remaining work of the running process at `now`: everything since arrival
/// that was not spent waiting has been spent running.
pub fn remaining_at(running: &ProcessRecord, now: Ticks) -> Ticks {
    let ran = now.saturating_sub(running.arrival_time + running.wait_time);
    running.run_time.saturating_sub(ran)
}

/// A candidate only displaces the running process if its whole runtime is
/// strictly shorter than what the running process still needs.
pub fn should_preempt(candidate: &ProcessRecord, running_remaining: Ticks) -> bool {
    candidate.run_time < running_remaining
}
