/*!
 * Error handling for the MRF sieve pipeline
 *
 * Provides detailed error types with context and suggestions. A missing EIN
 * on a scanned index element is deliberately NOT an error: it is a counted
 * diagnostic and scanning continues (see `scanner::ScanOutcome`).
 */

use std::path::PathBuf;
use thiserror::Error;

/// mrf-sieve result type
pub type Result<T> = std::result::Result<T, SieveError>;

/// Error types for fatal pipeline conditions
#[derive(Error, Debug)]
pub enum SieveError {
    /// File I/O errors with context
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
        path: Option<PathBuf>,
    },

    /// The index document does not have the expected shape
    #[error("Malformed index document: {message}")]
    MalformedIndex {
        message: String,
        element: Option<u64>,
    },

    /// Failure fetching or parsing a per-EIN lookup document
    #[error("Lookup failed for EIN {ein}: {message}")]
    Lookup { ein: String, message: String },

    /// HTTP transport errors
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        url: Option<String>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        suggestion: Option<String>,
    },

    /// A lookup URL template without an `{ein}` placeholder
    #[error("Invalid lookup URL template '{template}'")]
    Template { template: String },

    /// Generic errors with custom message
    #[error("{message}")]
    Custom {
        message: String,
        suggestion: Option<String>,
    },
}

impl SieveError {
    /// Create an I/O error tagged with the file it concerns
    pub fn io_with_path(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            message: source.to_string(),
            source,
            path: Some(path.into()),
        }
    }

    /// Create a malformed-index error located at a top-level element
    pub fn malformed_at(element: u64, message: impl Into<String>) -> Self {
        Self::MalformedIndex {
            message: message.into(),
            element: Some(element),
        }
    }

    /// Create a configuration error with a fix-it hint
    pub fn config(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::Io { path: Some(p), .. } => {
                format!("{}\n\nFile: {}", self, p.display())
            }
            Self::Configuration {
                suggestion: Some(sug),
                ..
            } => {
                format!("{}\n\nSuggestion: {}", self, sug)
            }
            Self::Template { .. } => format!(
                "{}\n\nSuggestion: the template must contain the literal placeholder {{ein}}",
                self
            ),
            Self::Custom {
                suggestion: Some(sug),
                ..
            } => {
                format!("{}\n\nSuggestion: {}", self, sug)
            }
            _ => self.to_string(),
        }
    }
}

// Convenience conversions
impl From<std::io::Error> for SieveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
            path: None,
        }
    }
}

impl From<serde_json::Error> for SieveError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedIndex {
            message: err.to_string(),
            element: None,
        }
    }
}

impl From<reqwest::Error> for SieveError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http {
            message: err.to_string(),
            url: err.url().map(|u| u.to_string()),
        }
    }
}

impl From<toml::de::Error> for SieveError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Failed to parse config file: {}", err),
            suggestion: Some("Check that the file is valid TOML format".to_string()),
        }
    }
}
