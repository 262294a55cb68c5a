//! Error types for Regwatch

use thiserror::Error;

/// Result type alias using Regwatch's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Regwatch error types
///
/// Capability failures of the learned scoring model are deliberately NOT in
/// this enum: the classifier recovers from them internally and callers only
/// ever see a classification result. Everything here is surfaced to callers.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (E001-E099)
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Network errors (E100-E199)
    #[error("Network error: {0}. Check your internet connection.")]
    Network(#[from] reqwest::Error),

    #[error("Scoring model error: {0}")]
    Model(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    Config(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedDocument(_) => "E001",
            Self::InvalidInput(_) => "E002",
            Self::Network(_) => "E100",
            Self::Model(_) => "E101",
            Self::Database(_) => "E400",
            Self::Config(_) => "E600",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::MalformedDocument("x".into()).code(), "E001");
        assert_eq!(Error::Config("bad".into()).code(), "E600");
        assert_eq!(Error::Other("misc".into()).code(), "E9999");
    }

    #[test]
    fn test_error_display() {
        let err = Error::MalformedDocument("missing url".into());
        assert_eq!(err.to_string(), "Malformed document: missing url");
    }
}
