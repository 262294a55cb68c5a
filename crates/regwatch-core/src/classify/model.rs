//! External scoring-model capability
//!
//! The learned classifier depends on this narrow interface only. Any failure
//! of the capability (network error, timeout, malformed body) is reported as
//! a typed [`CapabilityError`]; the classifier interprets it and falls back
//! to the rule-based path without surfacing the error to its caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::ModelConfig;
use crate::error::{Error, Result};

/// A label with its associated confidence, as returned by the capability
#[derive(Debug, Clone, PartialEq)]
pub struct ModelScore {
    pub label: String,
    /// Expected in [0, 1]; values outside are treated as malformed output
    pub confidence: f32,
}

/// Why a capability call could not produce a usable result
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Text-scoring capability the learned classifier delegates to
#[async_trait]
pub trait ScoringModel: Send + Sync {
    /// Score the text's urgency; higher means less urgent
    async fn score(&self, text: &str) -> std::result::Result<ModelScore, CapabilityError>;

    /// Produce a model-generated summary of the text
    async fn summarize(&self, text: &str) -> std::result::Result<String, CapabilityError>;
}

/// HTTP implementation of [`ScoringModel`] against a hosted inference API
///
/// Thread-safe; the underlying client carries an explicit request timeout so
/// a slow model counts as a capability failure rather than stalling a scan.
#[derive(Clone)]
pub struct HttpScoringModel {
    http_client: HttpClient,
    config: ModelConfig,
    api_key: String,
}

impl std::fmt::Debug for HttpScoringModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpScoringModel")
            .field("base_url", &self.config.base_url)
            .field("sentiment_model", &self.config.sentiment_model)
            .field("summary_model", &self.config.summary_model)
            .finish()
    }
}

/// Builder for creating an HttpScoringModel
pub struct HttpScoringModelBuilder {
    config: Option<ModelConfig>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for HttpScoringModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpScoringModelBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            api_key: None,
            timeout_secs: None,
        }
    }

    pub fn config(mut self, config: ModelConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn build(self) -> Result<HttpScoringModel> {
        let config = self.config.unwrap_or_default();
        let api_key = self
            .api_key
            .ok_or_else(|| Error::Model("API key is required".to_string()))?;

        let timeout_secs = self.timeout_secs.unwrap_or(config.timeout_secs);

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::Network)?;

        Ok(HttpScoringModel {
            http_client,
            config,
            api_key,
        })
    }
}

/// One candidate label in a classification response
#[derive(Debug, Deserialize)]
struct LabelCandidate {
    label: String,
    score: f32,
}

/// One entry in a summarization response
#[derive(Debug, Deserialize)]
struct SummaryEntry {
    summary_text: String,
}

impl HttpScoringModel {
    pub fn new(config: ModelConfig, api_key: impl Into<String>) -> Result<Self> {
        HttpScoringModelBuilder::new()
            .config(config)
            .api_key(api_key)
            .build()
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.config.base_url.trim_end_matches('/'), model)
    }

    async fn post_inputs(
        &self,
        model: &str,
        text: &str,
    ) -> std::result::Result<reqwest::Response, CapabilityError> {
        let response = self
            .http_client
            .post(self.model_url(model))
            .bearer_auth(&self.api_key)
            .json(&json!({ "inputs": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CapabilityError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl ScoringModel for HttpScoringModel {
    async fn score(&self, text: &str) -> std::result::Result<ModelScore, CapabilityError> {
        let response = self.post_inputs(&self.config.sentiment_model, text).await?;

        // Classification responses arrive as a list of candidate lists, best
        // candidate first.
        let candidates: Vec<Vec<LabelCandidate>> = response
            .json()
            .await
            .map_err(|e| CapabilityError::MalformedResponse(e.to_string()))?;

        let best = candidates
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| CapabilityError::MalformedResponse("empty candidate list".into()))?;

        Ok(ModelScore {
            label: best.label,
            confidence: best.score,
        })
    }

    async fn summarize(&self, text: &str) -> std::result::Result<String, CapabilityError> {
        let response = self.post_inputs(&self.config.summary_model, text).await?;

        let entries: Vec<SummaryEntry> = response
            .json()
            .await
            .map_err(|e| CapabilityError::MalformedResponse(e.to_string()))?;

        entries
            .into_iter()
            .next()
            .map(|e| e.summary_text)
            .ok_or_else(|| CapabilityError::MalformedResponse("empty summary list".into()))
    }
}
