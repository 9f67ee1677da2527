use std::path::PathBuf;

use thiserror::Error;

use crate::messages;

/// Failure to obtain the raw bytes of an attachment.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Download timed out")]
    Timeout,
    #[error("Unexpected HTTP status {0}")]
    Status(u16),
    #[error("Image exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported image location: {0}")]
    UnsupportedUrl(String),
}

/// Everything that can end or interrupt a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Recoverable: the session re-prompts and keeps waiting.
    #[error("Message does not carry exactly one image")]
    InvalidInput,
    #[error("Download failed: {0}")]
    Download(#[from] FetchError),
    #[error("Decode failed: {0}")]
    Decode(#[source] imaginarium::Error),
    #[error("Composition failed: {0}")]
    Composition(#[source] imaginarium::Error),
    #[error("Session timed out")]
    Timeout,
    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

impl SessionError {
    /// The single line shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::InvalidInput => messages::NOT_AN_IMAGE,
            SessionError::Download(_) | SessionError::Decode(_) => messages::DOWNLOAD_FAILED,
            SessionError::Composition(_) => messages::PROCESSING_FAILED,
            SessionError::Timeout => messages::TIMED_OUT,
            SessionError::Unexpected(_) => messages::UNEXPECTED,
        }
    }
}

impl From<tokio::task::JoinError> for SessionError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            SessionError::Unexpected("image worker panicked".to_string())
        } else {
            SessionError::Unexpected(err.to_string())
        }
    }
}
