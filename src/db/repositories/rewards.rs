use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    helpers::{parse_datetime, to_i64, to_u32, to_u64},
    models::RewardGrant,
    Database,
};

fn row_to_reward_grant(row: &Row) -> Result<RewardGrant> {
    let granted_at: String = row.get("granted_at")?;
    let duration_minutes: i64 = row.get("duration_minutes")?;
    let amount: i64 = row.get("amount")?;

    Ok(RewardGrant {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        source: row.get("source")?,
        duration_minutes: to_u32(duration_minutes, "duration_minutes")?,
        amount: to_u64(amount, "amount")?,
        granted_at: parse_datetime(&granted_at, "granted_at")?,
    })
}

impl Database {
    pub async fn insert_reward_grant(&self, grant: &RewardGrant) -> Result<()> {
        let record = grant.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO reward_grants (id, session_id, source, duration_minutes, amount, granted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    record.session_id,
                    record.source,
                    record.duration_minutes,
                    to_i64(record.amount)?,
                    record.granted_at.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert reward grant")?;
            Ok(())
        })
        .await
    }

    pub async fn reward_balance(&self) -> Result<u64> {
        self.execute(|conn| {
            let total: i64 = conn.query_row(
                "SELECT COALESCE(SUM(amount), 0) FROM reward_grants",
                [],
                |row| row.get(0),
            )?;
            to_u64(total, "reward_balance")
        })
        .await
    }

    pub async fn list_reward_grants(&self, limit: u64) -> Result<Vec<RewardGrant>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, source, duration_minutes, amount, granted_at
                 FROM reward_grants
                 ORDER BY granted_at DESC
                 LIMIT ?1",
            )?;

            let mut rows = stmt.query(params![to_i64(limit)?])?;
            let mut grants = Vec::new();
            while let Some(row) = rows.next()? {
                grants.push(row_to_reward_grant(row)?);
            }
            Ok(grants)
        })
        .await
    }
}
