use thiserror::Error;

/// Longest session the engine accepts, in minutes.
pub const MAX_MINUTES: u32 = 999;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("session length must be between 1 and {max} minutes, got {minutes}", max = MAX_MINUTES)]
    InvalidDuration { minutes: u32 },
    #[error("total duration must be greater than zero milliseconds")]
    InvalidTotal,
}
