use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

use super::{
    accounting,
    clock::{to_datetime, Clock},
    error::{TimerError, MAX_MINUTES},
    feedback::{FeedbackCue, FeedbackSink},
    resolver,
    segments::{calculate_segments, SegmentInfo},
    state::{RunStatus, TimerRun, TimerSnapshot},
};

pub const SESSION_KIND_TIMER: &str = "timer";

/// Payload handed to the host when a run reaches zero on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub kind: String,
}

/// Registered by the host to persist sessions, grant rewards, etc.
/// Called at most once per run, synchronously from `tick()`; must not block.
pub trait CompletionListener: Send + Sync {
    fn on_session_completed(&self, session: &CompletedSession);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed.
    Skipped,
    Advanced { segment: usize, crossed: bool },
    Completed,
}

/// The timer state machine. Synchronous and single-owner; wrap it in a
/// [`super::TimerController`] to drive it from a periodic task.
pub struct TimerEngine {
    run: TimerRun,
    clock: Arc<dyn Clock>,
    feedback: Arc<dyn FeedbackSink>,
    listener: Option<Arc<dyn CompletionListener>>,
}

impl TimerEngine {
    pub fn new(clock: Arc<dyn Clock>, feedback: Arc<dyn FeedbackSink>) -> Self {
        let run = TimerRun::idle(clock.now_ms());
        Self {
            run,
            clock,
            feedback,
            listener: None,
        }
    }

    pub fn set_completion_listener(&mut self, listener: Arc<dyn CompletionListener>) {
        self.listener = Some(listener);
    }

    /// Detaches the listener so its owner can wind down. Later completions
    /// still change state but notify nobody.
    pub fn clear_completion_listener(&mut self) -> Option<Arc<dyn CompletionListener>> {
        self.listener.take()
    }

    pub fn start(&mut self, minutes: u32) -> Result<(), TimerError> {
        if minutes == 0 || minutes > MAX_MINUTES {
            return Err(TimerError::InvalidDuration { minutes });
        }

        let segments = calculate_segments(u64::from(minutes) * 60_000)?;
        let now = self.clock.now_ms();
        self.run.begin(minutes, segments, now);

        log_info!("timer started: {} min", minutes);
        self.feedback.cue(FeedbackCue::Start);
        Ok(())
    }

    pub fn pause(&mut self) -> bool {
        if self.run.status != RunStatus::Running {
            return false;
        }

        let now = self.clock.now_ms();
        self.run.paused_at = Some(now);
        self.run.status = RunStatus::Paused;

        log_info!(
            "timer paused at {} ms elapsed",
            accounting::elapsed_ms(&self.run, now)
        );
        self.feedback.cue(FeedbackCue::Pause);
        true
    }

    pub fn resume(&mut self) -> bool {
        let paused_at = match (self.run.status, self.run.paused_at) {
            (RunStatus::Paused, Some(paused_at)) => paused_at,
            _ => return false,
        };

        let now = self.clock.now_ms();
        self.run.paused_duration = self
            .run
            .paused_duration
            .saturating_add(now.saturating_sub(paused_at));
        self.run.paused_at = None;
        self.run.status = RunStatus::Running;

        log_info!("timer resumed, {} ms paused in total", self.run.paused_duration);
        self.feedback.cue(FeedbackCue::Resume);
        true
    }

    /// Abandons the run. A stopped run never counts as completed.
    pub fn stop(&mut self) {
        self.reset();
        self.feedback.cue(FeedbackCue::Stop);
    }

    /// Same as `stop()` without the cue.
    pub fn reset(&mut self) {
        if self.run.status != RunStatus::Idle {
            log_info!("timer reset from {:?}", self.run.status);
        }
        self.run = TimerRun::idle(self.clock.now_ms());
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.run.status != RunStatus::Running {
            return TickOutcome::Skipped;
        }

        let now = self.clock.now_ms();
        if accounting::is_complete(&self.run, now) {
            self.complete(now);
            return TickOutcome::Completed;
        }

        let elapsed = accounting::elapsed_ms(&self.run, now);
        let current = resolver::current_segment(elapsed, &self.run.segments);
        let crossed = current != self.run.current_segment;
        if crossed {
            log_debug!("segment {} -> {}", self.run.current_segment, current);
            self.feedback.cue(FeedbackCue::SegmentCrossed);
        }

        self.run.segments = resolver::update_segment_statuses(&self.run.segments, current, elapsed);
        self.run.current_segment = current;

        TickOutcome::Advanced {
            segment: current,
            crossed,
        }
    }

    fn complete(&mut self, now: u64) {
        self.run.status = RunStatus::Completed;
        self.run.completed_at = Some(now);

        let session = CompletedSession {
            start_time: to_datetime(self.run.created_at),
            end_time: to_datetime(now),
            duration_minutes: self.run.total_minutes,
            kind: SESSION_KIND_TIMER.to_string(),
        };

        log_info!("timer completed: {} min", session.duration_minutes);
        if let Some(listener) = &self.listener {
            listener.on_session_completed(&session);
        }
        self.feedback.cue(FeedbackCue::Complete);
    }

    pub fn elapsed_ms(&self) -> u64 {
        accounting::elapsed_ms(&self.run, self.clock.now_ms())
    }

    pub fn remaining_ms(&self) -> u64 {
        accounting::remaining_ms(&self.run, self.clock.now_ms())
    }

    pub fn status(&self) -> RunStatus {
        self.run.status
    }

    pub fn segments(&self) -> &[SegmentInfo] {
        &self.run.segments
    }

    pub fn current_segment(&self) -> usize {
        self.run.current_segment
    }

    pub fn total_minutes(&self) -> u32 {
        self.run.total_minutes
    }

    pub fn run(&self) -> &TimerRun {
        &self.run
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::capture(&self.run, self.clock.now_ms())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::{CompletedSession, CompletionListener};

    #[derive(Clone, Default)]
    pub struct RecordingListener {
        sessions: Arc<Mutex<Vec<CompletedSession>>>,
    }

    impl RecordingListener {
        pub fn sessions(&self) -> Vec<CompletedSession> {
            self.sessions.lock().unwrap().clone()
        }
    }

    impl CompletionListener for RecordingListener {
        fn on_session_completed(&self, session: &CompletedSession) {
            self.sessions.lock().unwrap().push(session.clone());
        }
    }
}
