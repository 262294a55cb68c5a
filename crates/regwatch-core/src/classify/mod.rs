//! Risk and impact classification
//!
//! Two classifier variants sit behind one capability trait: the rule-based
//! keyword scorer (always available) and the learned scorer that delegates
//! to an external model and degrades to the rules on any capability failure.
//! The change detector depends only on the trait, never on which variant is
//! active.

pub mod actions;
pub mod model;
pub mod rules;
pub mod summary;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::{ClassifierConfig, ModelConfig};
use crate::domain::{ClassificationResult, RiskLevel};

pub use actions::action_items;
pub use model::{CapabilityError, HttpScoringModel, HttpScoringModelBuilder, ModelScore, ScoringModel};
pub use rules::RuleClassifier;
pub use summary::fallback_summary;

use summary::{clean_text, clip_to_window};

/// The single capability the pipeline needs from a classifier
///
/// Both methods are infallible by contract: a classifier that depends on an
/// external capability must absorb its failures internally.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Assign a risk level and impact-area labels to the text
    async fn classify(&self, text: &str) -> ClassificationResult;

    /// Produce a short human-readable synopsis of the text
    async fn summarize(&self, text: &str) -> String;
}

/// Classifier backed by an external scoring model, with rule-based fallback
///
/// The model's score is read as the probability that the text is NOT urgent:
/// low scores map to high risk. An urgent keyword overrides the score
/// entirely. Impact areas always come from the keyword table; the model only
/// influences the risk level and the summary.
pub struct LearnedClassifier {
    rules: RuleClassifier,
    model: Arc<dyn ScoringModel>,
    model_cfg: ModelConfig,
}

impl LearnedClassifier {
    pub fn new(
        classifier_cfg: ClassifierConfig,
        model_cfg: ModelConfig,
        model: Arc<dyn ScoringModel>,
    ) -> Self {
        Self {
            rules: RuleClassifier::new(classifier_cfg),
            model,
            model_cfg,
        }
    }

    /// Map a validated model score plus keyword overrides to a result
    fn assess_from_score(&self, text: &str, score: ModelScore) -> ClassificationResult {
        let lower = text.to_lowercase();
        let urgent_hits = self
            .rules
            .config()
            .urgent_keywords
            .iter()
            .filter(|kw| lower.contains(kw.to_lowercase().as_str()))
            .count();

        let risk_level = if urgent_hits > 0 || score.confidence < self.model_cfg.high_threshold {
            RiskLevel::High
        } else if score.confidence < self.model_cfg.medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        ClassificationResult {
            risk_level,
            confidence: score.confidence,
            impact_areas: self.rules.impact_areas(text),
            reasoning: format!(
                "Detected {urgent_hits} urgent indicators (model label '{}', score {:.2})",
                score.label, score.confidence
            ),
        }
    }
}

#[async_trait]
impl Classifier for LearnedClassifier {
    async fn classify(&self, text: &str) -> ClassificationResult {
        let cleaned = clean_text(text);
        let window = clip_to_window(&cleaned, self.model_cfg.score_window_chars);

        match self.model.score(window).await {
            Ok(score) if (0.0..=1.0).contains(&score.confidence) => {
                debug!(label = %score.label, score = score.confidence, "Model score received");
                self.assess_from_score(text, score)
            }
            Ok(score) => {
                warn!(score = score.confidence, "Model score out of range, using rule-based fallback");
                self.rules.assess_risk(text)
            }
            Err(err) => {
                warn!(error = %err, "Scoring model unavailable, using rule-based fallback");
                self.rules.assess_risk(text)
            }
        }
    }

    async fn summarize(&self, text: &str) -> String {
        if text.len() < self.model_cfg.summary_min_chars {
            return self.rules.summarize(text).await;
        }

        let cleaned = clean_text(text);
        let window = clip_to_window(&cleaned, self.model_cfg.summary_window_chars);

        match self.model.summarize(window).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => {
                warn!("Model returned empty summary, using rule-based fallback");
                self.rules.summarize(text).await
            }
            Err(err) => {
                warn!(error = %err, "Model summarization failed, using rule-based fallback");
                self.rules.summarize(text).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stub capability with canned behavior
    struct StubModel {
        score: std::result::Result<ModelScore, ()>,
        summary: std::result::Result<String, ()>,
    }

    impl StubModel {
        fn failing() -> Self {
            Self {
                score: Err(()),
                summary: Err(()),
            }
        }

        fn scoring(confidence: f32) -> Self {
            Self {
                score: Ok(ModelScore {
                    label: "NEUTRAL".into(),
                    confidence,
                }),
                summary: Ok("model summary".into()),
            }
        }
    }

    #[async_trait]
    impl ScoringModel for StubModel {
        async fn score(&self, _text: &str) -> std::result::Result<ModelScore, CapabilityError> {
            self.score
                .clone()
                .map_err(|_| CapabilityError::MalformedResponse("stub failure".into()))
        }

        async fn summarize(&self, _text: &str) -> std::result::Result<String, CapabilityError> {
            self.summary
                .clone()
                .map_err(|_| CapabilityError::MalformedResponse("stub failure".into()))
        }
    }

    fn learned(model: StubModel) -> LearnedClassifier {
        LearnedClassifier::new(
            ClassifierConfig::default(),
            ModelConfig::default(),
            Arc::new(model),
        )
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_rule_based() {
        let text = "FDA recall due to serious adverse reaction";
        let learned_result = learned(StubModel::failing()).classify(text).await;
        let rules_result = RuleClassifier::new(ClassifierConfig::default()).assess_risk(text);
        assert_eq!(learned_result, rules_result);
    }

    #[tokio::test]
    async fn test_low_score_maps_to_high_risk() {
        let result = learned(StubModel::scoring(0.2))
            .classify("routine administrative notice")
            .await;
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_mid_score_maps_to_medium_risk() {
        let result = learned(StubModel::scoring(0.5))
            .classify("routine administrative notice")
            .await;
        assert_eq!(result.risk_level, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn test_high_score_maps_to_low_risk() {
        let result = learned(StubModel::scoring(0.9))
            .classify("routine administrative notice")
            .await;
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_urgent_keyword_overrides_score() {
        let result = learned(StubModel::scoring(0.95))
            .classify("urgent notice to all holders")
            .await;
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_out_of_range_score_treated_as_failure() {
        let text = "Updated dosage guidance for clinical use";
        let learned_result = learned(StubModel::scoring(1.7)).classify(text).await;
        let rules_result = RuleClassifier::new(ClassifierConfig::default()).assess_risk(text);
        assert_eq!(learned_result, rules_result);
    }

    #[tokio::test]
    async fn test_summary_fallback_on_failure() {
        let text = "The agency issued new guidance today covering trial sponsors. \
                    It affects all active submissions immediately. Appendix details follow soon.";
        let summary = learned(StubModel::failing()).summarize(text).await;
        assert!(summary.starts_with("The agency issued new guidance"));
    }

    #[tokio::test]
    async fn test_short_text_skips_model() {
        // Under summary_min_chars the model is never consulted, so even a
        // "working" model yields the rule-based summary.
        let summary = learned(StubModel::scoring(0.5)).summarize("Short note").await;
        assert_eq!(summary, "Short note");
    }

    #[tokio::test]
    async fn test_model_summary_used_when_available() {
        let text = "x".repeat(150);
        let summary = learned(StubModel::scoring(0.5)).summarize(&text).await;
        assert_eq!(summary, "model summary");
    }
}
