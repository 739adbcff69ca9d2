// src/client/error.rs

use crate::error::ValidationError;

/// A failed call to the grading API. Never retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The server answered with a non-success status.
    #[error("Status: {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid API url: {0}")]
    Url(#[from] url::ParseError),

    #[error("not signed in")]
    NotSignedIn,
}

impl RequestError {
    /// Text for a transient notification.
    pub fn message(&self) -> String {
        match self {
            RequestError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Everything a client call can fail with: a form problem caught before the
/// request, or the request itself.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Request(#[from] RequestError),

    /// The local session file could not be read or written.
    #[error("session store: {0}")]
    Session(std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Request(RequestError::Transport(err))
    }
}
