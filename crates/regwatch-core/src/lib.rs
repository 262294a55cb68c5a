//! Regwatch Core Library
//!
//! This crate provides the core functionality for Regwatch, including:
//! - Change detection (fingerprinting, diffing, snapshot comparison)
//! - Risk and impact classification (rule-based with optional learned scorer)
//! - Recommended-action generation
//! - Storage (SQLite snapshots + append-only change log)
//!
//! Fetching pages and rendering results live outside this crate; the pipeline
//! takes fetched documents in and emits structured change records out.

pub mod classify;
pub mod config;
pub mod detect;
pub mod diff;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::classify::{Classifier, LearnedClassifier, RuleClassifier};
    pub use crate::config::Config;
    pub use crate::detect::{ChangeDetector, DetectionOutcome};
    pub use crate::domain::{Change, ChangeType, FetchedDocument, RiskLevel};
    pub use crate::error::{Error, Result};
}
