//! API error types.

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors raised while starting or running the server.
///
/// Connection handlers never surface errors to clients; these only come
/// out of startup and the serve loop.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vision backend error: {0}")]
    Vision(#[from] smartsession_vision::VisionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
