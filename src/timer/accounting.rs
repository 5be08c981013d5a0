//! Elapsed and remaining time for a run.
//!
//! Everything here is derived from absolute timestamps, never from summed
//! per-tick deltas, so an arbitrarily late tick still sees the right answer.
//! While paused the elapsed value is frozen at the moment the pause began.

use super::state::{RunStatus, TimerRun};

pub fn elapsed_ms(run: &TimerRun, now_ms: u64) -> u64 {
    let until = match (run.status, run.paused_at, run.completed_at) {
        (RunStatus::Idle, _, _) => return 0,
        (_, Some(paused_at), _) => paused_at,
        (RunStatus::Completed, None, Some(completed_at)) => completed_at,
        _ => now_ms,
    };

    until
        .saturating_sub(run.start_timestamp)
        .saturating_sub(run.paused_duration)
}

pub fn remaining_ms(run: &TimerRun, now_ms: u64) -> u64 {
    run.duration.saturating_sub(elapsed_ms(run, now_ms))
}

pub fn is_complete(run: &TimerRun, now_ms: u64) -> bool {
    remaining_ms(run, now_ms) == 0
}
