//! Error types for completion, proxy, and configuration
//!
//! Completion errors are classified by what the user should see:
//! - Canceled: superseded by a newer request, fully silent
//! - Everything else: one neutral reply in the conversation log, no retry

use std::path::PathBuf;
use thiserror::Error;

/// Neutral reply appended to the log when a chat request fails.
pub const TRANSPORT_FAILURE_REPLY: &str = "Couldn't process that. Try rephrasing?";

/// Failures of a single completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Backend returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request superseded")]
    Canceled,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unexpected response shape: {0}")]
    InvalidResponse(String),
}

impl CompletionError {
    /// True when the request was superseded rather than failed.
    pub fn is_canceled(&self) -> bool {
        matches!(self, CompletionError::Canceled)
    }

    /// Text surfaced to the user, or `None` when the error must stay silent.
    pub fn user_message(&self) -> Option<&'static str> {
        if self.is_canceled() {
            None
        } else {
            Some(TRANSPORT_FAILURE_REPLY)
        }
    }

    /// Short suggestion for logs and the console banner.
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CompletionError::Transport(_) => "Check that the model endpoint is reachable.",
            CompletionError::Http { status, .. } if *status == 401 || *status == 403 => {
                "Check the API key or passphrase in ~/.ambientdesk/config.json"
            }
            CompletionError::Http { .. } => "The backend rejected the request. Try again.",
            CompletionError::Canceled => "Nothing to do.",
            CompletionError::Configuration(_) => {
                "Check your configuration in ~/.ambientdesk/config.json"
            }
            CompletionError::InvalidResponse(_) => "The backend answered in an unexpected format.",
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        CompletionError::Transport(err.to_string())
    }
}

/// Failures at the proxy boundary, each mapped to one HTTP status.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("POST only")]
    MethodNotAllowed,

    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error("GEMINI_API_KEY not configured")]
    MissingApiKey,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status_code(&self) -> u16 {
        match self {
            ProxyError::MethodNotAllowed => 405,
            ProxyError::InvalidPassphrase => 403,
            ProxyError::MissingApiKey => 500,
            ProxyError::BadRequest(_) => 400,
            ProxyError::Upstream(_) => 502,
            ProxyError::Internal(_) => 500,
        }
    }
}

/// Failures loading `~/.ambientdesk/config.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}
