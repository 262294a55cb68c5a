//! Change detection orchestration
//!
//! Drives one scan batch through the pipeline: per document, decide whether
//! it is new, updated, or unchanged; persist the snapshot; classify; and
//! append the audit record. Documents are processed independently, so one
//! malformed document or storage error never aborts the rest of the batch.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::classify::Classifier;
use crate::diff::unified_diff;
use crate::domain::{Change, ChangeRecord, ChangeType, DocumentSnapshot, FetchedDocument};
use crate::error::{Error, Result};
use crate::fingerprint::fingerprint;
use crate::storage::{ChangeLog, SnapshotStore};

/// Result of one batch scan: changes in input order, plus per-item failures
#[derive(Debug, Default)]
pub struct DetectionOutcome {
    pub changes: Vec<Change>,
    pub failures: Vec<DetectionFailure>,
}

/// One document that could not be processed
#[derive(Debug)]
pub struct DetectionFailure {
    pub url: String,
    pub error: Error,
}

/// Orchestrates fingerprinting, diffing, classification, and persistence
///
/// Depends only on the storage and classifier traits; which classifier
/// variant is active is invisible here.
pub struct ChangeDetector {
    snapshots: Arc<dyn SnapshotStore>,
    changes: Arc<dyn ChangeLog>,
    classifier: Arc<dyn Classifier>,
}

impl ChangeDetector {
    pub fn new(
        snapshots: Arc<dyn SnapshotStore>,
        changes: Arc<dyn ChangeLog>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            snapshots,
            changes,
            classifier,
        }
    }

    /// Process one scan batch
    ///
    /// All snapshot writes and change-log appends for emitted changes are
    /// committed before this returns. Re-running an unchanged batch is a
    /// true no-op: no writes, no changes.
    pub async fn detect(&self, batch: &[FetchedDocument]) -> DetectionOutcome {
        let mut outcome = DetectionOutcome::default();

        for doc in batch {
            match self.process(doc).await {
                Ok(Some(change)) => outcome.changes.push(change),
                Ok(None) => debug!(url = %doc.url, "No change detected"),
                Err(error) => {
                    warn!(url = %doc.url, error = %error, code = error.code(), "Document processing failed");
                    outcome.failures.push(DetectionFailure {
                        url: doc.url.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            batch_size = batch.len(),
            changes = outcome.changes.len(),
            failures = outcome.failures.len(),
            "Scan batch processed"
        );
        outcome
    }

    /// Changes detected within the last `days` days, newest first
    pub async fn recent_changes(&self, days: i64) -> Result<Vec<ChangeRecord>> {
        self.changes.recent(days).await
    }

    async fn process(&self, doc: &FetchedDocument) -> Result<Option<Change>> {
        doc.validate()?;

        let new_fingerprint = fingerprint(&doc.content);

        match self.snapshots.lookup(&doc.url).await? {
            None => {
                // First observation: snapshot the full content and classify it.
                let now = Utc::now();
                self.snapshots
                    .upsert(&DocumentSnapshot {
                        url: doc.url.clone(),
                        source: doc.source.clone(),
                        title: doc.title.clone(),
                        content: doc.content.clone(),
                        content_fingerprint: new_fingerprint,
                        last_updated_at: now,
                        created_at: now,
                    })
                    .await?;

                let change = self
                    .build_change(doc, ChangeType::New, doc.content.clone())
                    .await;
                self.changes.append(&change).await?;
                info!(url = %doc.url, risk_level = change.risk_level.as_str(), "New document detected");
                Ok(Some(change))
            }
            Some(previous) if previous.content_fingerprint == new_fingerprint => Ok(None),
            Some(previous) => {
                // Risk assessment of an update is scoped to what changed, so
                // the diff becomes both the change content and the
                // classification input.
                let delta = unified_diff(&previous.content, &doc.content);

                self.snapshots
                    .upsert(&DocumentSnapshot {
                        url: doc.url.clone(),
                        source: doc.source.clone(),
                        title: doc.title.clone(),
                        content: doc.content.clone(),
                        content_fingerprint: new_fingerprint,
                        last_updated_at: Utc::now(),
                        created_at: previous.created_at,
                    })
                    .await?;

                let change = self.build_change(doc, ChangeType::Updated, delta).await;
                self.changes.append(&change).await?;
                info!(url = %doc.url, risk_level = change.risk_level.as_str(), "Document update detected");
                Ok(Some(change))
            }
        }
    }

    async fn build_change(
        &self,
        doc: &FetchedDocument,
        change_type: ChangeType,
        content: String,
    ) -> Change {
        let classification = self.classifier.classify(&content).await;
        let summary = self.classifier.summarize(&content).await;

        Change {
            source: doc.source.clone(),
            title: doc.title.clone(),
            url: doc.url.clone(),
            content,
            change_type,
            risk_level: classification.risk_level,
            summary,
            impact_areas: classification.impact_areas,
            detected_at: Utc::now(),
        }
    }
}
