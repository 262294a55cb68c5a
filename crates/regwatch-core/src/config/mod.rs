//! Configuration management with file persistence
//!
//! Keyword tables and scoring thresholds live here as immutable data loaded
//! once at construction and handed to the classifier, so tests can substitute
//! alternate tables without touching process-wide state.

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Regwatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub classifier: ClassifierConfig,
    pub model: ModelConfig,
}

/// Keyword tables and thresholds for the rule-based classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Terms that force a high risk assessment when present
    pub high_risk_keywords: Vec<String>,
    /// Terms that raise the assessment to medium risk
    pub medium_risk_keywords: Vec<String>,
    /// Terms that override the learned scorer to high risk regardless of score
    pub urgent_keywords: Vec<String>,
    /// Impact-area table, in emission order
    pub impact_areas: Vec<ImpactAreaRule>,
    /// Keyword matches required before an impact area is emitted
    pub min_keyword_hits: usize,
    /// Sentinel label emitted when no impact area matches
    pub fallback_area: String,
    /// Hard cap on generated summaries
    pub summary_max_chars: usize,
}

/// One row of the impact-area table: a category and the keywords that select it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactAreaRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl ImpactAreaRule {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Settings for the optional learned scoring model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Inference API base URL
    pub base_url: String,
    /// Model used for sentiment/urgency scoring
    pub sentiment_model: String,
    /// Model used for summarization
    pub summary_model: String,
    /// Request timeout; an overrun counts as a capability failure
    pub timeout_secs: u64,
    /// Input window (chars) for scoring calls
    pub score_window_chars: usize,
    /// Input window (chars) for summarization calls
    pub summary_window_chars: usize,
    /// Content shorter than this skips the model and uses the rule-based summary
    pub summary_min_chars: usize,
    /// Scores below this map to high risk
    pub high_threshold: f32,
    /// Scores below this (but above the high threshold) map to medium risk
    pub medium_threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            high_risk_keywords: to_strings(&[
                "recall",
                "warning",
                "safety",
                "death",
                "serious",
                "urgent",
                "immediate",
                "black box",
                "contraindication",
                "withdrawal",
            ]),
            medium_risk_keywords: to_strings(&[
                "labeling",
                "indication",
                "dosage",
                "administration",
                "clinical",
                "trial",
                "study",
                "efficacy",
                "approval",
                "guidance",
            ]),
            urgent_keywords: to_strings(&[
                "immediate",
                "urgent",
                "critical",
                "emergency",
                "recall",
                "warning",
                "death",
                "serious adverse",
            ]),
            impact_areas: vec![
                ImpactAreaRule::new("Clinical Trials", &["clinical", "trial", "study", "protocol"]),
                ImpactAreaRule::new("Labeling", &["label", "labeling", "package insert", "prescribing"]),
                ImpactAreaRule::new("Manufacturing", &["manufacturing", "quality", "facility", "inspection"]),
                ImpactAreaRule::new("Pharmacovigilance", &["safety", "adverse", "reaction", "monitoring"]),
                ImpactAreaRule::new("Marketing", &["promotion", "advertising", "marketing", "commercial"]),
                ImpactAreaRule::new("Regulatory Affairs", &["submission", "filing", "application", "review"]),
            ],
            min_keyword_hits: 1,
            fallback_area: "General".to_string(),
            summary_max_chars: 250,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api-inference.huggingface.co".to_string(),
            sentiment_model: "cardiffnlp/twitter-roberta-base-sentiment-latest".to_string(),
            summary_model: "sshleifer/distilbart-cnn-6-6".to_string(),
            timeout_secs: 30,
            score_window_chars: 512,
            summary_window_chars: 1024,
            summary_min_chars: 100,
            high_threshold: 0.3,
            medium_threshold: 0.6,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl ModelConfig {
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(env::var("REGWATCH_API_KEY")
            .or_else(|_| env::var("HF_API_TOKEN"))
            .ok())
    }

    pub fn redacted_api_key(&self) -> anyhow::Result<Option<String>> {
        self.resolved_api_key().map(|opt| {
            opt.map(|key| {
                if key.len() <= 4 {
                    "***".to_string()
                } else {
                    let suffix = &key[key.len() - 4..];
                    format!("***{}", suffix)
                }
            })
        })
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "Model API keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("REGWATCH_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("regwatch")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.model.enforce_env_only()?;

        if self.classifier.min_keyword_hits == 0 {
            return Err(anyhow!("classifier.min_keyword_hits must be at least 1"));
        }
        if self.classifier.fallback_area.trim().is_empty() {
            return Err(anyhow!("classifier.fallback_area must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.model.high_threshold)
            || !(0.0..=1.0).contains(&self.model.medium_threshold)
            || self.model.high_threshold > self.model.medium_threshold
        {
            return Err(anyhow!(
                "model thresholds must satisfy 0 <= high_threshold <= medium_threshold <= 1"
            ));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            // Classifier settings
            "classifier.high_risk_keywords" => Ok(self.classifier.high_risk_keywords.join(", ")),
            "classifier.medium_risk_keywords" => Ok(self.classifier.medium_risk_keywords.join(", ")),
            "classifier.urgent_keywords" => Ok(self.classifier.urgent_keywords.join(", ")),
            "classifier.min_keyword_hits" => Ok(self.classifier.min_keyword_hits.to_string()),
            "classifier.fallback_area" => Ok(self.classifier.fallback_area.clone()),
            "classifier.summary_max_chars" => Ok(self.classifier.summary_max_chars.to_string()),

            // Model settings
            "model.base_url" => Ok(self.model.base_url.clone()),
            "model.sentiment_model" => Ok(self.model.sentiment_model.clone()),
            "model.summary_model" => Ok(self.model.summary_model.clone()),
            "model.timeout_secs" => Ok(self.model.timeout_secs.to_string()),
            "model.score_window_chars" => Ok(self.model.score_window_chars.to_string()),
            "model.summary_window_chars" => Ok(self.model.summary_window_chars.to_string()),
            "model.summary_min_chars" => Ok(self.model.summary_min_chars.to_string()),
            "model.high_threshold" => Ok(self.model.high_threshold.to_string()),
            "model.medium_threshold" => Ok(self.model.medium_threshold.to_string()),

            // API key (special handling - show redacted)
            "model.api_key" | "api_key" => match self.model.redacted_api_key()? {
                Some(redacted) => Ok(redacted),
                None => Ok("(not set - use REGWATCH_API_KEY or HF_API_TOKEN env var)".to_string()),
            },

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `regwatch config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            // Classifier settings
            "classifier.high_risk_keywords" => {
                self.classifier.high_risk_keywords = split_list(value);
            }
            "classifier.medium_risk_keywords" => {
                self.classifier.medium_risk_keywords = split_list(value);
            }
            "classifier.urgent_keywords" => {
                self.classifier.urgent_keywords = split_list(value);
            }
            "classifier.min_keyword_hits" => {
                self.classifier.min_keyword_hits = value
                    .parse()
                    .with_context(|| format!("Invalid min_keyword_hits value: {}", value))?;
            }
            "classifier.fallback_area" => {
                self.classifier.fallback_area = value.to_string();
            }
            "classifier.summary_max_chars" => {
                self.classifier.summary_max_chars = value
                    .parse()
                    .with_context(|| format!("Invalid summary_max_chars value: {}", value))?;
            }

            // Model settings
            "model.base_url" => {
                self.model.base_url = value.to_string();
            }
            "model.sentiment_model" => {
                self.model.sentiment_model = value.to_string();
            }
            "model.summary_model" => {
                self.model.summary_model = value.to_string();
            }
            "model.timeout_secs" => {
                self.model.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
            }
            "model.score_window_chars" => {
                self.model.score_window_chars = value
                    .parse()
                    .with_context(|| format!("Invalid score_window_chars value: {}", value))?;
            }
            "model.summary_window_chars" => {
                self.model.summary_window_chars = value
                    .parse()
                    .with_context(|| format!("Invalid summary_window_chars value: {}", value))?;
            }
            "model.summary_min_chars" => {
                self.model.summary_min_chars = value
                    .parse()
                    .with_context(|| format!("Invalid summary_min_chars value: {}", value))?;
            }
            "model.high_threshold" => {
                self.model.high_threshold = value
                    .parse()
                    .with_context(|| format!("Invalid high_threshold value: {}", value))?;
            }
            "model.medium_threshold" => {
                self.model.medium_threshold = value
                    .parse()
                    .with_context(|| format!("Invalid medium_threshold value: {}", value))?;
            }

            // API key cannot be set via config
            "model.api_key" | "api_key" => {
                return Err(anyhow!(
                    "API keys cannot be stored in configuration for security. \
                     Set the REGWATCH_API_KEY or HF_API_TOKEN environment variable instead."
                ));
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `regwatch config list` to see available keys.",
                    key
                ));
            }
        }
        self.validate()
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = vec![
            "classifier.high_risk_keywords",
            "classifier.medium_risk_keywords",
            "classifier.urgent_keywords",
            "classifier.min_keyword_hits",
            "classifier.fallback_area",
            "classifier.summary_max_chars",
            "model.base_url",
            "model.sentiment_model",
            "model.summary_model",
            "model.timeout_secs",
            "model.score_window_chars",
            "model.summary_window_chars",
            "model.summary_min_chars",
            "model.high_threshold",
            "model.medium_threshold",
            "model.api_key",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

/// Parse a comma-separated keyword list
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
