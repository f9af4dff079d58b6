//! Error types for wacloud
//!
//! Centralized error handling using thiserror.

use serde_json::Value;
use thiserror::Error;

/// All error types that can occur while building or sending a Cloud API call
#[derive(Debug, Error)]
pub enum CloudError {
    /// Tool arguments did not match the declared schema
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Upstream answered with a non-2xx status
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        /// Parsed upstream error body, when it was JSON
        body: Option<Value>,
    },

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// No access token configured
    #[error("Missing access token: set {env_var} or api.access_token")]
    MissingToken { env_var: String },

    /// Registry lookup failed
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Base URL or composed URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// IO error (reading upload files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Build an API error from a status code and the raw response text
    pub fn from_response(status: u16, text: &str) -> Self {
        let body = serde_json::from_str::<Value>(text).ok();
        let message = body
            .as_ref()
            .and_then(|b| b["error"]["message"].as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                if text.is_empty() {
                    "empty response body".to_string()
                } else {
                    text.to_string()
                }
            });
        CloudError::Api { status, message, body }
    }

    /// Upstream HTTP status, if this error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            CloudError::Api { status, .. } => Some(*status),
            CloudError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the request reached the remote side
    pub fn is_upstream(&self) -> bool {
        matches!(self, CloudError::Api { .. })
    }
}

/// Result type alias for wacloud operations
pub type Result<T> = std::result::Result<T, CloudError>;
