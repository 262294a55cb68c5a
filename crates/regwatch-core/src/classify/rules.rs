//! Rule-based risk and impact scoring
//!
//! The mandatory baseline classifier: keyword tables from [`ClassifierConfig`],
//! no external dependencies, always available. Also serves as the fallback for
//! the learned variant.

use async_trait::async_trait;

use crate::config::ClassifierConfig;
use crate::domain::{ClassificationResult, RiskLevel};

use super::summary::fallback_summary;
use super::Classifier;

/// Fixed confidence when a high-risk keyword fires
const HIGH_CONFIDENCE: f32 = 0.8;
/// Fixed confidence when a medium-risk keyword fires
const MEDIUM_CONFIDENCE: f32 = 0.7;
/// Fixed confidence when no risk keyword matches
const LOW_CONFIDENCE: f32 = 0.6;

/// Keyword-table classifier
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    cfg: ClassifierConfig,
}

impl RuleClassifier {
    pub fn new(cfg: ClassifierConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.cfg
    }

    /// Assess risk from the keyword tables, evaluated high-before-medium
    pub fn assess_risk(&self, text: &str) -> ClassificationResult {
        let lower = text.to_lowercase();

        let (risk_level, confidence, reasoning) = if contains_any(&lower, &self.cfg.high_risk_keywords)
        {
            (RiskLevel::High, HIGH_CONFIDENCE, "High-risk keywords detected")
        } else if contains_any(&lower, &self.cfg.medium_risk_keywords) {
            (RiskLevel::Medium, MEDIUM_CONFIDENCE, "Medium-risk keywords detected")
        } else {
            (RiskLevel::Low, LOW_CONFIDENCE, "No high-risk indicators found")
        };

        ClassificationResult {
            risk_level,
            confidence,
            impact_areas: self.impact_areas(text),
            reasoning: reasoning.to_string(),
        }
    }

    /// Match the text against the impact-area table
    ///
    /// Areas are emitted in table order once they reach `min_keyword_hits`
    /// matches; the result is never empty thanks to the sentinel fallback.
    pub fn impact_areas(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();

        let matched: Vec<String> = self
            .cfg
            .impact_areas
            .iter()
            .filter(|rule| {
                let hits = rule
                    .keywords
                    .iter()
                    .filter(|kw| lower.contains(kw.to_lowercase().as_str()))
                    .count();
                hits >= self.cfg.min_keyword_hits
            })
            .map(|rule| rule.name.clone())
            .collect();

        if matched.is_empty() {
            vec![self.cfg.fallback_area.clone()]
        } else {
            matched
        }
    }
}

/// Case-insensitive substring match against a keyword list
///
/// Expects `lower` to already be lowercased.
fn contains_any(lower: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|kw| lower.contains(kw.to_lowercase().as_str()))
}

#[async_trait]
impl Classifier for RuleClassifier {
    async fn classify(&self, text: &str) -> ClassificationResult {
        self.assess_risk(text)
    }

    async fn summarize(&self, text: &str) -> String {
        fallback_summary(text, self.cfg.summary_max_chars)
    }
}
