//! Error types for vision operations.

use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur while decoding frames or building a detector.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Invalid frame payload: {0}")]
    InvalidFrame(String),

    #[error("Base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Cascade model not found: {0}")]
    ModelNotFound(String),

    #[error("Detection backend failed: {0}")]
    Backend(String),
}

impl VisionError {
    /// Create an invalid frame error.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame(message.into())
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    /// Create a backend failure error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for VisionError {
    fn from(e: opencv::Error) -> Self {
        Self::Backend(e.to_string())
    }
}
