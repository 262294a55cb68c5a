//! Core domain types for the change-detection pipeline
//!
//! This module defines the records that flow through the pipeline: fetched
//! documents coming in from the scraping adapter, snapshots persisted per URL,
//! and the append-only change log emitted to consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of transition detected for a document URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    New,
    Updated,
    Removed,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Updated => "updated",
            Self::Removed => "removed",
        }
    }
}

impl std::str::FromStr for ChangeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "new" => Ok(Self::New),
            "updated" => Ok(Self::Updated),
            "removed" => Ok(Self::Removed),
            other => Err(Error::InvalidInput(format!("unknown change type: {other}"))),
        }
    }
}

/// Coarse severity classification driving urgency of recommended actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(Error::InvalidInput(format!("unknown risk level: {other}"))),
        }
    }
}

/// One freshly fetched document, as produced by the external scraping adapter
///
/// `url` is the identity key. `content` may legitimately be empty (an emptied
/// page is a real transition); the other fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedDocument {
    pub source: String,
    pub title: String,
    pub url: String,
    pub content: String,
}

impl FetchedDocument {
    pub fn new(
        source: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            url: url.into(),
            content: content.into(),
        }
    }

    /// Check the required fields are present
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::MalformedDocument("missing url".into()));
        }
        if self.source.trim().is_empty() {
            return Err(Error::MalformedDocument(format!("missing source for {}", self.url)));
        }
        if self.title.trim().is_empty() {
            return Err(Error::MalformedDocument(format!("missing title for {}", self.url)));
        }
        Ok(())
    }
}

/// The last known state of a document URL
///
/// At most one live snapshot exists per URL. `content` and
/// `content_fingerprint` are always written together; `created_at` is set on
/// first observation and preserved across updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub url: String,
    pub source: String,
    pub title: String,
    pub content: String,
    pub content_fingerprint: String,
    pub last_updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// An audit record describing one detected transition for a URL
///
/// Changes are only created as a side effect of a snapshot insert or update,
/// never standalone. For `Updated` changes, `content` holds the unified diff
/// of old vs new text rather than the full document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    pub source: String,
    pub title: String,
    pub url: String,
    pub content: String,
    pub change_type: ChangeType,
    pub risk_level: RiskLevel,
    pub summary: String,
    pub impact_areas: Vec<String>,
    pub detected_at: DateTime<Utc>,
}

/// A persisted change-log row, as returned by the query surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub id: i64,
    pub source: String,
    pub title: String,
    pub url: String,
    pub change_type: ChangeType,
    pub risk_level: RiskLevel,
    pub summary: String,
    pub impact_areas: Vec<String>,
    pub detected_at: DateTime<Utc>,
}

/// Outcome of a single classification call
///
/// Ephemeral: produced fresh per call and consumed immediately to populate a
/// [`Change`]; never persisted directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub risk_level: RiskLevel,
    /// Confidence in the assessment, in [0, 1]
    pub confidence: f32,
    /// Ordered, non-empty set of impact-area labels
    pub impact_areas: Vec<String>,
    /// Short human-readable note on which signal fired
    pub reasoning: String,
}
