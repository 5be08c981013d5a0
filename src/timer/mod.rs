pub mod accounting;
pub mod clock;
pub mod controller;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod format;
pub mod resolver;
pub mod segments;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{TimerController, DEFAULT_TICK_INTERVAL};
pub use engine::{CompletedSession, CompletionListener, TickOutcome, TimerEngine};
pub use error::TimerError;
pub use feedback::{FeedbackCue, FeedbackSink, LogFeedback, SilentFeedback};
pub use format::{format_time, FormattedTime};
pub use segments::{SegmentInfo, SegmentStatus, SEGMENT_COUNT};
pub use state::{RunStatus, TimerRun, TimerSnapshot};
