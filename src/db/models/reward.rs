use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const REWARD_SOURCE_TIMER: &str = "timer";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RewardGrant {
    pub id: String,
    pub session_id: Option<String>,
    pub source: String,
    pub duration_minutes: u32,
    pub amount: u64,
    pub granted_at: DateTime<Utc>,
}
