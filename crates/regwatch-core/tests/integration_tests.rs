//! End-to-end pipeline tests against a real database file

use std::sync::Arc;

use async_trait::async_trait;
use regwatch_core::classify::{
    CapabilityError, Classifier, LearnedClassifier, ModelScore, RuleClassifier, ScoringModel,
    action_items,
};
use regwatch_core::config::{ClassifierConfig, Config, ModelConfig};
use regwatch_core::detect::ChangeDetector;
use regwatch_core::domain::{ChangeType, FetchedDocument, RiskLevel};
use regwatch_core::storage::{Database, DatabaseConfig, SqliteChangeLog, SqliteSnapshotStore};

fn build_detector(db: &Database, classifier: Arc<dyn Classifier>) -> ChangeDetector {
    ChangeDetector::new(
        Arc::new(SqliteSnapshotStore::new(db.pool().clone())),
        Arc::new(SqliteChangeLog::new(db.pool().clone())),
        classifier,
    )
}

fn rule_classifier() -> Arc<dyn Classifier> {
    Arc::new(RuleClassifier::new(ClassifierConfig::default()))
}

#[tokio::test]
async fn full_scan_cycle_against_file_backed_store() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("regwatch.db");

    // First scan: everything is new.
    {
        let db = Database::new(DatabaseConfig::with_path(&db_path)).await.unwrap();
        let detector = build_detector(&db, rule_classifier());

        let batch = vec![
            FetchedDocument::new(
                "FDA_DRUGS",
                "Recall Notice",
                "https://x/1",
                "FDA recall due to serious adverse reaction",
            ),
            FetchedDocument::new(
                "FDA_NEWS",
                "Dosage Guidance",
                "https://x/2",
                "Initial dosage 10mg.",
            ),
        ];
        let outcome = detector.detect(&batch).await;
        assert_eq!(outcome.changes.len(), 2);
        assert!(outcome.failures.is_empty());
        assert!(outcome.changes.iter().all(|c| c.change_type == ChangeType::New));
        db.close().await;
    }

    // Second scan from a fresh process: one document changed, one did not.
    {
        let db = Database::new(DatabaseConfig::with_path(&db_path)).await.unwrap();
        let detector = build_detector(&db, rule_classifier());

        let batch = vec![
            FetchedDocument::new(
                "FDA_DRUGS",
                "Recall Notice",
                "https://x/1",
                "FDA recall due to serious adverse reaction",
            ),
            FetchedDocument::new(
                "FDA_NEWS",
                "Dosage Guidance",
                "https://x/2",
                "Initial dosage 10mg. Updated dosage 20mg due to new clinical trial data.",
            ),
        ];
        let outcome = detector.detect(&batch).await;
        assert_eq!(outcome.changes.len(), 1, "unchanged document stays silent");
        let change = &outcome.changes[0];
        assert_eq!(change.url, "https://x/2");
        assert_eq!(change.change_type, ChangeType::Updated);
        assert_eq!(change.risk_level, RiskLevel::Medium);
        assert!(change.content.contains("-Initial dosage 10mg."));
        assert!(change.content.contains("+Initial dosage 10mg. Updated dosage 20mg"));

        // The query surface sees the whole history, newest first.
        let records = detector.recent_changes(7).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].url, "https://x/2");
        assert_eq!(records[0].change_type, ChangeType::Updated);
        db.close().await;
    }
}

#[tokio::test]
async fn repeated_scans_are_idempotent() {
    let db = Database::in_memory().await.unwrap();
    let detector = build_detector(&db, rule_classifier());

    let batch = vec![FetchedDocument::new(
        "EMA",
        "Guideline",
        "https://ema/1",
        "A guideline on manufacturing quality inspections.",
    )];

    let first = detector.detect(&batch).await;
    assert_eq!(first.changes.len(), 1);

    for _ in 0..3 {
        let again = detector.detect(&batch).await;
        assert!(again.changes.is_empty());
        assert!(again.failures.is_empty());
    }

    let records = detector.recent_changes(7).await.unwrap();
    assert_eq!(records.len(), 1, "re-scans never duplicate log entries");
}

/// Capability stub that always errors, exercising the fallback path through
/// the whole pipeline rather than just the classifier.
struct BrokenModel;

#[async_trait]
impl ScoringModel for BrokenModel {
    async fn score(&self, _text: &str) -> Result<ModelScore, CapabilityError> {
        Err(CapabilityError::Status(503))
    }

    async fn summarize(&self, _text: &str) -> Result<String, CapabilityError> {
        Err(CapabilityError::Status(503))
    }
}

#[tokio::test]
async fn pipeline_with_broken_model_matches_rule_based_pipeline() {
    let batch = vec![FetchedDocument::new(
        "FDA_DRUGS",
        "Labeling Update",
        "https://x/labeling",
        "New labeling requirements with updated dosage instructions for prescribers.",
    )];

    let db_a = Database::in_memory().await.unwrap();
    let learned: Arc<dyn Classifier> = Arc::new(LearnedClassifier::new(
        ClassifierConfig::default(),
        ModelConfig::default(),
        Arc::new(BrokenModel),
    ));
    let outcome_learned = build_detector(&db_a, learned).detect(&batch).await;

    let db_b = Database::in_memory().await.unwrap();
    let outcome_rules = build_detector(&db_b, rule_classifier()).detect(&batch).await;

    assert!(outcome_learned.failures.is_empty(), "capability failure never surfaces");
    let a = &outcome_learned.changes[0];
    let b = &outcome_rules.changes[0];
    assert_eq!(a.risk_level, b.risk_level);
    assert_eq!(a.impact_areas, b.impact_areas);
    assert_eq!(a.summary, b.summary);
}

#[tokio::test]
async fn impact_fallback_and_actions_for_uncategorized_change() {
    let db = Database::in_memory().await.unwrap();
    let detector = build_detector(&db, rule_classifier());

    let outcome = detector
        .detect(&[FetchedDocument::new(
            "FDA_NEWS",
            "Office Hours",
            "https://x/hours",
            "Reception desk hours move to 9am next month.",
        )])
        .await;

    let change = &outcome.changes[0];
    assert_eq!(change.impact_areas, vec!["General"], "never an empty label set");

    let actions = action_items(change.risk_level, &change.impact_areas);
    assert_eq!(actions.len(), 2, "only the closing actions apply");
}

#[test]
fn default_config_round_trips_through_toml() {
    let cfg = Config::default();
    let serialized = toml::to_string_pretty(&cfg).unwrap();
    let parsed: Config = toml::from_str(&serialized).unwrap();
    parsed.validate().unwrap();
    assert_eq!(parsed.classifier.fallback_area, "General");
}
