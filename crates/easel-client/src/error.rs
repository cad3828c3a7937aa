//! Client error types

/// Error type for lock client operations. Lock contention is not an error;
/// `AcquireResponse::Conflict` and `RefreshResponse::NotHeld` carry those
/// outcomes.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned error: status={status}, message={message}")]
    ServerError { status: u16, message: String },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
