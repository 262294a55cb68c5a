//! Append-only change log
//!
//! Every detected change is appended here; nothing is ever updated or
//! deleted by the core. Impact-area labels are stored as a JSON array in a
//! text column, matching the flat-text persistence contract.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::domain::{Change, ChangeRecord, ChangeType, RiskLevel};
use crate::error::{Error, Result};

use super::snapshots::parse_timestamp;

/// Persistence contract for the change log
#[async_trait]
pub trait ChangeLog: Send + Sync {
    /// Append one change record
    async fn append(&self, change: &Change) -> Result<()>;

    /// Changes detected within the last `days` days, newest first
    async fn recent(&self, days: i64) -> Result<Vec<ChangeRecord>>;
}

/// SQLite implementation of the change log
#[derive(Debug, Clone)]
pub struct SqliteChangeLog {
    pool: SqlitePool,
}

impl SqliteChangeLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChangeLog for SqliteChangeLog {
    async fn append(&self, change: &Change) -> Result<()> {
        let impact_areas_json = serde_json::to_string(&change.impact_areas)
            .map_err(|e| Error::Other(format!("Failed to serialize impact areas: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO detected_changes (
                source, title, url, change_type, risk_level,
                summary, impact_areas, detected_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&change.source)
        .bind(&change.title)
        .bind(&change.url)
        .bind(change.change_type.as_str())
        .bind(change.risk_level.as_str())
        .bind(&change.summary)
        .bind(&impact_areas_json)
        .bind(change.detected_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(
            url = %change.url,
            change_type = change.change_type.as_str(),
            risk_level = change.risk_level.as_str(),
            "Change appended"
        );
        Ok(())
    }

    async fn recent(&self, days: i64) -> Result<Vec<ChangeRecord>> {
        let window = Duration::try_days(days)
            .ok_or_else(|| Error::InvalidInput(format!("look-back window out of range: {days} days")))?;
        let cutoff = (Utc::now() - window).to_rfc3339();

        let rows: Vec<ChangeRow> = sqlx::query_as(
            r#"
            SELECT id, source, title, url, change_type, risk_level,
                   summary, impact_areas, detected_at
            FROM detected_changes
            WHERE detected_at > ?
            ORDER BY detected_at DESC, id DESC
            "#,
        )
        .bind(&cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_record()).collect()
    }
}

/// Raw change-log row with text-encoded enums and timestamps
#[derive(Debug, FromRow)]
struct ChangeRow {
    id: i64,
    source: String,
    title: String,
    url: String,
    change_type: String,
    risk_level: String,
    summary: String,
    impact_areas: String,
    detected_at: String,
}

impl ChangeRow {
    fn into_record(self) -> Result<ChangeRecord> {
        let impact_areas: Vec<String> = serde_json::from_str(&self.impact_areas)
            .map_err(|e| Error::Other(format!("Invalid impact areas JSON: {e}")))?;

        Ok(ChangeRecord {
            id: self.id,
            source: self.source,
            title: self.title,
            url: self.url,
            change_type: ChangeType::from_str(&self.change_type)?,
            risk_level: RiskLevel::from_str(&self.risk_level)?,
            summary: self.summary,
            impact_areas,
            detected_at: parse_timestamp(&self.detected_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn change(url: &str, risk_level: RiskLevel) -> Change {
        Change {
            source: "FDA_NEWS".to_string(),
            title: "Announcement".to_string(),
            url: url.to_string(),
            content: String::new(),
            change_type: ChangeType::New,
            risk_level,
            summary: "A short summary".to_string(),
            impact_areas: vec!["Labeling".to_string(), "Marketing".to_string()],
            detected_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_recent() {
        let db = Database::in_memory().await.unwrap();
        let log = SqliteChangeLog::new(db.pool().clone());

        log.append(&change("https://x/1", RiskLevel::High)).await.unwrap();
        log.append(&change("https://x/2", RiskLevel::Low)).await.unwrap();

        let records = log.recent(7).await.unwrap();
        assert_eq!(records.len(), 2);
        // Newest first; same timestamp resolution falls back to insertion order
        assert_eq!(records[0].url, "https://x/2");
        assert_eq!(records[1].url, "https://x/1");
        assert_eq!(records[1].risk_level, RiskLevel::High);
        assert_eq!(records[0].impact_areas, vec!["Labeling", "Marketing"]);
    }

    #[tokio::test]
    async fn test_recent_window_excludes_old_entries() {
        let db = Database::in_memory().await.unwrap();
        let log = SqliteChangeLog::new(db.pool().clone());

        let mut old = change("https://x/old", RiskLevel::Medium);
        old.detected_at = Utc::now() - Duration::days(30);
        log.append(&old).await.unwrap();
        log.append(&change("https://x/new", RiskLevel::Medium)).await.unwrap();

        let records = log.recent(7).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://x/new");

        let records = log.recent(60).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_window_is_an_error() {
        let db = Database::in_memory().await.unwrap();
        let log = SqliteChangeLog::new(db.pool().clone());

        let result = log.recent(i64::MAX).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_log_is_append_only_per_url() {
        let db = Database::in_memory().await.unwrap();
        let log = SqliteChangeLog::new(db.pool().clone());

        log.append(&change("https://x/1", RiskLevel::Low)).await.unwrap();
        log.append(&change("https://x/1", RiskLevel::High)).await.unwrap();

        let records = log.recent(7).await.unwrap();
        assert_eq!(records.len(), 2, "same URL accumulates history");
    }
}
