//! Error types for the TerraSync client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `message` already names the operation and status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 2xx response whose envelope carried `success: false`.
    #[error("{0}")]
    Application(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status code, for `Http` errors only.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether invoking the same operation again could succeed.
    /// The client never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
