use serde::{Deserialize, Serialize};

use super::{
    accounting,
    segments::{SegmentInfo, SEGMENT_COUNT},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

/// The single live timer session. Owned by the engine; everyone else gets a
/// [`TimerSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerRun {
    /// Unix ms at `start()`, 0 while idle.
    pub start_timestamp: u64,
    /// Total length in ms, fixed for the run.
    pub duration: u64,
    /// Start of the currently open pause.
    pub paused_at: Option<u64>,
    /// Sum of closed pauses only.
    pub paused_duration: u64,
    pub current_segment: usize,
    pub segments: Vec<SegmentInfo>,
    pub status: RunStatus,
    pub total_minutes: u32,
    pub created_at: u64,
    pub completed_at: Option<u64>,
}

impl TimerRun {
    pub fn idle(now_ms: u64) -> Self {
        Self {
            start_timestamp: 0,
            duration: 0,
            paused_at: None,
            paused_duration: 0,
            current_segment: 0,
            segments: Vec::new(),
            status: RunStatus::Idle,
            total_minutes: 0,
            created_at: now_ms,
            completed_at: None,
        }
    }

    pub fn begin(&mut self, minutes: u32, segments: Vec<SegmentInfo>, now_ms: u64) {
        debug_assert_eq!(segments.len(), SEGMENT_COUNT);
        *self = Self {
            start_timestamp: now_ms,
            duration: u64::from(minutes) * 60_000,
            paused_at: None,
            paused_duration: 0,
            current_segment: 0,
            segments,
            status: RunStatus::Running,
            total_minutes: minutes,
            created_at: now_ms,
            completed_at: None,
        };
    }
}

/// Read-only copy of the run handed to renderers and hosts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: RunStatus,
    pub total_minutes: u32,
    pub elapsed_ms: u64,
    pub remaining_ms: u64,
    pub current_segment: usize,
    pub segments: Vec<SegmentInfo>,
}

impl TimerSnapshot {
    pub fn capture(run: &TimerRun, now_ms: u64) -> Self {
        Self {
            status: run.status,
            total_minutes: run.total_minutes,
            elapsed_ms: accounting::elapsed_ms(run, now_ms),
            remaining_ms: accounting::remaining_ms(run, now_ms),
            current_segment: run.current_segment,
            segments: run.segments.clone(),
        }
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::capture(&TimerRun::idle(0), 0)
    }
}
