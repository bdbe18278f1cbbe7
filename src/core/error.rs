//! Custom error types for Aura
//!
//! Every failure of a chat round-trip is local to that round-trip: the
//! conversation manager logs it, hands it back to the caller for display and
//! keeps the conversation usable.

use thiserror::Error;

/// Main error type for Aura operations
#[derive(Error, Debug)]
pub enum AuraError {
    /// Missing or placeholder credential, or an otherwise unusable setting.
    /// Raised before any network call is attempted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network failure or non-success HTTP status from the completion service
    #[error("API request failed: {}", describe_transport(.status, .body))]
    Transport {
        /// HTTP status code, if a response was received at all
        status: Option<u16>,
        /// Response body, or the underlying network error text
        body: String,
    },

    /// Well-formed response without a usable candidate
    #[error("No response generated{}", .0.as_deref().map(|r| format!(" ({})", r)).unwrap_or_default())]
    EmptyResponse(Option<String>),

    /// A completion is already in flight
    #[error("Aura is still answering the previous message")]
    Busy,

    /// Image attachment could not be read or has an unsupported type
    #[error("Image error: {0}")]
    Image(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

fn describe_transport(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(code) => format!("{} - {}", code, body),
        None => body.to_string(),
    }
}

impl From<reqwest::Error> for AuraError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL never reaches logs or the screen
        let err = err.without_url();
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            body: err.to_string(),
        }
    }
}

/// Convenience Result type for Aura operations
pub type Result<T> = std::result::Result<T, AuraError>;

impl AuraError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an image error
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Create a transport error from an HTTP status and body
    pub fn transport(status: u16, body: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            body: body.into(),
        }
    }

    /// Create an empty-response error
    pub fn empty_response(reason: Option<String>) -> Self {
        Self::EmptyResponse(reason)
    }

    /// Whether the chat stays usable after this error.
    ///
    /// Everything a round-trip can produce is recoverable; only local IO and
    /// serialization faults are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Json(_) | Self::Other(_))
    }

    /// Short title for a transient notice
    pub fn title(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "Configuration Required",
            Self::Busy => "Please wait",
            _ => "Error",
        }
    }
}
