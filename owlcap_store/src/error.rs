use thiserror::Error;

/// Error type shared by every datastore implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The document doesn't exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// The backend answered with an error.
    #[error("Backend error: {0}")]
    Backend(String),
    /// The backend was unreachable.
    #[error("Transport error: {0}")]
    Transport(String),
    /// A document wouldn't (de)serialize.
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            StoreError::Transport(e.to_string())
        } else {
            StoreError::Backend(e.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serde(e.to_string())
    }
}
