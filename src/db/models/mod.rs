pub mod reward;
pub mod study_session;

pub use reward::{RewardGrant, REWARD_SOURCE_TIMER};
pub use study_session::StudySession;
