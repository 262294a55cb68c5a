//! Snapshot persistence
//!
//! One live snapshot per URL. The upsert is a single statement so content,
//! fingerprint, and timestamp commit together: a concurrent reader never
//! observes a half-written snapshot, and two scans racing on the same URL
//! resolve to last-committer-wins rather than a lost update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::domain::DocumentSnapshot;
use crate::error::{Error, Result};

/// Persistence contract for document snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Return the most recent committed snapshot for a URL, if any
    async fn lookup(&self, url: &str) -> Result<Option<DocumentSnapshot>>;

    /// Insert or replace the snapshot for its URL
    ///
    /// `created_at` is only honored on first insert; updates preserve the
    /// original first-seen timestamp.
    async fn upsert(&self, snapshot: &DocumentSnapshot) -> Result<()>;
}

/// SQLite implementation of the snapshot store
#[derive(Debug, Clone)]
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn lookup(&self, url: &str) -> Result<Option<DocumentSnapshot>> {
        let row: Option<SnapshotRow> =
            sqlx::query_as("SELECT * FROM document_snapshots WHERE url = ?")
                .bind(url)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.into_snapshot()).transpose()
    }

    async fn upsert(&self, snapshot: &DocumentSnapshot) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO document_snapshots (
                url, source, title, content, content_fingerprint,
                last_updated_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(url) DO UPDATE SET
                source = excluded.source,
                title = excluded.title,
                content = excluded.content,
                content_fingerprint = excluded.content_fingerprint,
                last_updated_at = excluded.last_updated_at
            "#,
        )
        .bind(&snapshot.url)
        .bind(&snapshot.source)
        .bind(&snapshot.title)
        .bind(&snapshot.content)
        .bind(&snapshot.content_fingerprint)
        .bind(snapshot.last_updated_at.to_rfc3339())
        .bind(snapshot.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(url = %snapshot.url, fingerprint = %snapshot.content_fingerprint, "Snapshot upserted");
        Ok(())
    }
}

/// Raw snapshot row with text timestamps
#[derive(Debug, FromRow)]
struct SnapshotRow {
    url: String,
    source: String,
    title: String,
    content: String,
    content_fingerprint: String,
    last_updated_at: String,
    created_at: String,
}

impl SnapshotRow {
    fn into_snapshot(self) -> Result<DocumentSnapshot> {
        Ok(DocumentSnapshot {
            url: self.url,
            source: self.source,
            title: self.title,
            content: self.content,
            content_fingerprint: self.content_fingerprint,
            last_updated_at: parse_timestamp(&self.last_updated_at)?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Other(format!("Invalid timestamp '{raw}': {e}")))
}
