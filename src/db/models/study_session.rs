use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::CompletedSession;

/// A finished focus session as stored in the history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl StudySession {
    pub fn from_completed(session: &CompletedSession, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time: session.start_time,
            end_time: session.end_time,
            duration_minutes: session.duration_minutes,
            kind: session.kind.clone(),
            created_at: recorded_at,
        }
    }
}
