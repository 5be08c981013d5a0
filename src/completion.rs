//! Side effects of a naturally finished run.
//!
//! The engine calls [`CompletionRecorder`] from inside `tick()`, which only
//! queues the session. A background task then records the study session and
//! grants the reward. Failures there are logged and dropped; they never reach
//! the timer.

use anyhow::Result;
use chrono::Utc;
use tokio::{sync::mpsc, task::JoinHandle};
use uuid::Uuid;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{
    db::{Database, RewardGrant, StudySession, REWARD_SOURCE_TIMER},
    log_error, log_info, log_warn,
    timer::{CompletedSession, CompletionListener},
};

#[derive(Debug, Clone, Default)]
pub struct CompletionReport {
    pub session: Option<StudySession>,
    pub reward: Option<RewardGrant>,
}

#[derive(Clone)]
pub struct CompletionRecorder {
    sender: mpsc::UnboundedSender<CompletedSession>,
}

impl CompletionListener for CompletionRecorder {
    fn on_session_completed(&self, session: &CompletedSession) {
        if self.sender.send(session.clone()).is_err() {
            log_warn!(
                "completion worker is gone; dropping {} min session",
                session.duration_minutes
            );
        }
    }
}

pub fn reward_amount(duration_minutes: u32, reward_per_minute: u64) -> u64 {
    u64::from(duration_minutes).saturating_mul(reward_per_minute)
}

/// Starts the background task. It exits once every recorder clone is dropped.
/// `reports` receives one entry per processed session, if the host cares.
pub fn spawn_completion_worker(
    db: Database,
    reward_per_minute: u64,
    reports: Option<mpsc::UnboundedSender<CompletionReport>>,
) -> (CompletionRecorder, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::unbounded_channel::<CompletedSession>();

    let handle = tokio::spawn(async move {
        while let Some(session) = receiver.recv().await {
            let report = process_completed(&db, &session, reward_per_minute).await;
            if let Some(reports) = &reports {
                let _ = reports.send(report);
            }
        }
        log_info!("completion worker shutting down");
    });

    (CompletionRecorder { sender }, handle)
}

pub async fn process_completed(
    db: &Database,
    completed: &CompletedSession,
    reward_per_minute: u64,
) -> CompletionReport {
    let record = StudySession::from_completed(completed, Utc::now());
    let session = match db.insert_study_session(&record).await {
        Ok(()) => {
            log_info!(
                "recorded study session {} ({} min)",
                record.id,
                record.duration_minutes
            );
            Some(record)
        }
        Err(err) => {
            log_error!("failed to record study session: {err:?}");
            None
        }
    };

    let session_id = session.as_ref().map(|s| s.id.clone());
    let reward = match grant_reward(
        db,
        session_id,
        completed.duration_minutes,
        reward_per_minute,
    )
    .await
    {
        Ok(grant) => Some(grant),
        Err(err) => {
            log_error!("failed to grant focus reward: {err:?}");
            None
        }
    };

    CompletionReport { session, reward }
}

async fn grant_reward(
    db: &Database,
    session_id: Option<String>,
    duration_minutes: u32,
    reward_per_minute: u64,
) -> Result<RewardGrant> {
    let grant = RewardGrant {
        id: Uuid::new_v4().to_string(),
        session_id,
        source: REWARD_SOURCE_TIMER.to_string(),
        duration_minutes,
        amount: reward_amount(duration_minutes, reward_per_minute),
        granted_at: Utc::now(),
    };
    db.insert_reward_grant(&grant).await?;
    log_info!("granted {} for {} min focus", grant.amount, duration_minutes);
    Ok(grant)
}
