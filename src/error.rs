//! Error types for the image card server.
//!
//! This module provides a unified error hierarchy using `thiserror` for consistent
//! error handling and reporting.
//!
//! # Error Categories
//!
//! - `ConfigError`: Missing configuration
//! - `Error::InvalidApiKey`: The API rejected the credential (HTTP 401)
//! - `Error::Api`: Upstream API errors (includes endpoint and status)
//! - `Error::Attachment`: Attached image fetch or decode failures
//! - `Error::Validation`: Input validation failures

use thiserror::Error;

/// Unified error type for the image card server.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (missing env vars)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The API rejected the supplied credential with HTTP 401
    #[error("Invalid OpenAI API Key. Please check your settings.")]
    InvalidApiKey,

    /// API errors with endpoint and HTTP status context
    ///
    /// Includes the API endpoint that failed, HTTP status code, and error message
    /// for debugging and user feedback. The message carries the raw response body
    /// when the API returned one.
    #[error("API error for {endpoint} (HTTP {status_code}): {message}")]
    Api {
        /// The API endpoint that was called
        endpoint: String,
        /// HTTP status code returned by the API
        status_code: u16,
        /// Error message from the API or describing the failure
        message: String,
    },

    /// An attached image could not be fetched or decoded
    #[error("Failed to load attached image '{name}': {message}")]
    Attachment {
        /// Display name of the attachment
        name: String,
        /// Description of the failure
        message: String,
    },

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Create a new API error with endpoint, status code, and message.
    ///
    /// # Example
    ///
    /// ```
    /// use gpt_image_mcp::error::Error;
    ///
    /// let err = Error::api(
    ///     "https://api.example.com/v1/images/generations",
    ///     500,
    ///     "Internal server error"
    /// );
    /// assert!(err.to_string().contains("api.example.com"));
    /// assert!(err.to_string().contains("500"));
    /// ```
    pub fn api(endpoint: impl Into<String>, status_code: u16, message: impl Into<String>) -> Self {
        Error::Api {
            endpoint: endpoint.into(),
            status_code,
            message: message.into(),
        }
    }

    /// Create a new attachment error for the named image.
    ///
    /// # Example
    ///
    /// ```
    /// use gpt_image_mcp::error::Error;
    ///
    /// let err = Error::attachment("photo.png", "Request failed");
    /// assert!(err.to_string().contains("photo.png"));
    /// ```
    pub fn attachment(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Attachment {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error.
    ///
    /// # Example
    ///
    /// ```
    /// use gpt_image_mcp::error::Error;
    ///
    /// let err = Error::validation("prompt cannot be empty");
    /// assert!(err.to_string().contains("prompt cannot be empty"));
    /// ```
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

/// Configuration errors.
///
/// These errors occur when loading or validating configuration from
/// environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Required environment variable {0} is not set")]
    MissingEnvVar(String),
}

impl ConfigError {
    /// Create a new missing environment variable error.
    pub fn missing_env_var(name: impl Into<String>) -> Self {
        ConfigError::MissingEnvVar(name.into())
    }
}

/// Result type alias using the unified Error type.
pub type Result<T> = std::result::Result<T, Error>;
