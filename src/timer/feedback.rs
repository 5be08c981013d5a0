use serde::{Deserialize, Serialize};

// Set to true to log every cue at debug level
const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Haptic-style signal for a state transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FeedbackCue {
    Start,
    Pause,
    Resume,
    SegmentCrossed,
    Stop,
    Complete,
}

impl FeedbackCue {
    /// Vibration pattern in milliseconds, alternating on/off starting with on.
    pub fn pattern(&self) -> &'static [u64] {
        match self {
            FeedbackCue::Start => &[50],
            FeedbackCue::Pause | FeedbackCue::Resume => &[30],
            FeedbackCue::SegmentCrossed => &[20],
            FeedbackCue::Stop => &[100, 50, 100],
            FeedbackCue::Complete => &[200, 100, 200, 100, 200],
        }
    }
}

/// Fire-and-forget receiver for cues. Implementations must not block.
pub trait FeedbackSink: Send + Sync {
    fn cue(&self, cue: FeedbackCue);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn cue(&self, cue: FeedbackCue) {
        log_debug!("feedback {:?} pattern {:?}", cue, cue.pattern());
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentFeedback;

impl FeedbackSink for SilentFeedback {
    fn cue(&self, _cue: FeedbackCue) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::{FeedbackCue, FeedbackSink};

    #[derive(Clone, Default)]
    pub struct RecordingFeedback {
        cues: Arc<Mutex<Vec<FeedbackCue>>>,
    }

    impl RecordingFeedback {
        pub fn cues(&self) -> Vec<FeedbackCue> {
            self.cues.lock().unwrap().clone()
        }
    }

    impl FeedbackSink for RecordingFeedback {
        fn cue(&self, cue: FeedbackCue) {
            self.cues.lock().unwrap().push(cue);
        }
    }
}
