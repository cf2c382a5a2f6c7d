//! Error types for the crowdin-api library.

use thiserror::Error;

use crate::api::RemoteError;

/// Boxed underlying cause of a transport failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for Crowdin API operations.
#[derive(Error, Debug)]
pub enum CrowdinError {
    /// Client could not be constructed from the given configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request never produced a response (DNS, connect, reset, timeout).
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Crowdin answered with a non-200 status and a JSON error body.
    #[error("{0}")]
    Remote(RemoteError),

    /// Crowdin answered with a non-200 status and a body that is not JSON.
    #[error("Bad http status code: {0}")]
    Status(u16),

    /// A successful response body could not be decoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A local file used in an upload could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrowdinError {
    /// Build a transport error without an underlying cause.
    pub fn transport(message: impl Into<String>) -> Self {
        CrowdinError::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            CrowdinError::Remote(remote) => Some(remote.status()),
            CrowdinError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CrowdinError {
    fn from(err: reqwest::Error) -> Self {
        CrowdinError::Transport {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Result type alias for crowdin-api operations.
pub type Result<T> = std::result::Result<T, CrowdinError>;
