//! Error type shared by the library, the CLI and the web server.

use thiserror::Error;

/// Message shown to users when generation fails. The underlying error is
/// logged, not displayed.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate firmware. Please check API key and try again.";

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Gemini API HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Gemini API error: {0}")]
    ApiMessage(String),

    #[error("GEMINI_API_KEY (or API_KEY) is not set")]
    MissingApiKey,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Whether retrying the same request could succeed: rate limits, server
    /// errors and network timeouts. Auth and request errors never are.
    pub fn is_transient(&self) -> bool {
        match self {
            BridgeError::Http(e) => e.is_timeout() || e.is_connect(),
            BridgeError::Api { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Text suitable for an end user. Configuration problems are shown as-is;
    /// everything that went wrong talking to the API collapses to
    /// [`GENERATION_FAILED_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            BridgeError::InvalidConfig(msg) => msg.clone(),
            BridgeError::MissingApiKey | BridgeError::Io(_) => self.to_string(),
            _ => GENERATION_FAILED_MESSAGE.to_string(),
        }
    }
}
