//! Error types for tablepager
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for tablepager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    #[error("Fetch failed for page {page}: {message}")]
    Fetch { page: usize, message: String },

    #[error("No fetch function registered with the page tracker")]
    NoItemsFn,

    // ============================================================================
    // Page Result Errors
    // ============================================================================
    #[error("Malformed page result: missing or invalid field '{field}'")]
    MissingPageField { field: String },

    #[error("Malformed page result: {message}")]
    MalformedPage { message: String },

    // ============================================================================
    // Preference Errors
    // ============================================================================
    #[error("Preference store error: {message}")]
    Preferences { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a fetch error for a page
    pub fn fetch(page: usize, message: impl Into<String>) -> Self {
        Self::Fetch {
            page,
            message: message.into(),
        }
    }

    /// Create a missing page field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingPageField {
            field: field.into(),
        }
    }

    /// Create a malformed page error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPage {
            message: message.into(),
        }
    }

    /// Create a preference store error
    pub fn preferences(message: impl Into<String>) -> Self {
        Self::Preferences {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Check if this error came from a malformed page result
    pub fn is_malformed_page(&self) -> bool {
        matches!(
            self,
            Error::MissingPageField { .. } | Error::MalformedPage { .. }
        )
    }
}

/// Result type alias for tablepager
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("totalNumberOfItems");
        assert_eq!(
            err.to_string(),
            "Malformed page result: missing or invalid field 'totalNumberOfItems'"
        );

        let err = Error::fetch(3, "connection reset");
        assert_eq!(err.to_string(), "Fetch failed for page 3: connection reset");

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");
    }

    #[test]
    fn test_is_malformed_page() {
        assert!(Error::missing_field("items").is_malformed_page());
        assert!(Error::malformed("page out of range").is_malformed_page());
        assert!(!Error::fetch(0, "boom").is_malformed_page());
        assert!(!Error::NoItemsFn.is_malformed_page());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
