use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    helpers::{parse_datetime, to_i64, to_u32, to_u64},
    models::StudySession,
    Database,
};

fn row_to_study_session(row: &Row) -> Result<StudySession> {
    let start_time: String = row.get("start_time")?;
    let end_time: String = row.get("end_time")?;
    let created_at: String = row.get("created_at")?;
    let duration_minutes: i64 = row.get("duration_minutes")?;

    Ok(StudySession {
        id: row.get("id")?,
        start_time: parse_datetime(&start_time, "start_time")?,
        end_time: parse_datetime(&end_time, "end_time")?,
        duration_minutes: to_u32(duration_minutes, "duration_minutes")?,
        kind: row.get("kind")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_study_session(&self, session: &StudySession) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO study_sessions (id, start_time, end_time, duration_minutes, kind, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    record.start_time.to_rfc3339(),
                    record.end_time.to_rfc3339(),
                    record.duration_minutes,
                    record.kind,
                    record.created_at.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert study session")?;
            Ok(())
        })
        .await
    }

    /// Most recent first.
    pub async fn list_study_sessions(&self, limit: u64) -> Result<Vec<StudySession>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, start_time, end_time, duration_minutes, kind, created_at
                 FROM study_sessions
                 ORDER BY end_time DESC
                 LIMIT ?1",
            )?;

            let mut rows = stmt.query(params![to_i64(limit)?])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_study_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    pub async fn total_focus_minutes(&self) -> Result<u64> {
        self.execute(|conn| {
            let total: i64 = conn.query_row(
                "SELECT COALESCE(SUM(duration_minutes), 0) FROM study_sessions",
                [],
                |row| row.get(0),
            )?;
            to_u64(total, "total_focus_minutes")
        })
        .await
    }
}
