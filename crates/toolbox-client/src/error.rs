use std::time::Duration;

use toolbox_models::InvalidPermissionState;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The change was refused locally; no request was sent.
    #[error(transparent)]
    Rejected(#[from] InvalidPermissionState),

    /// A save for this screen is still awaiting the server.
    #[error("a change to '{0}' is already pending")]
    Busy(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
