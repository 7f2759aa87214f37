//! Face/eye detection providers.
//!
//! The trait gives the monitor one interface over whichever detection
//! backend was compiled in.

use std::sync::Arc;

use smartsession_models::BoundingBox;

use crate::config::VisionConfig;
use crate::error::VisionResult;
use crate::frame::Frame;

#[cfg(feature = "opencv")]
mod haar;

#[cfg(feature = "opencv")]
pub use haar::HaarCascadeProvider;

/// Face and eye detection provider.
///
/// Implementations must not fail: anything that goes wrong while
/// detecting (undecodable image, backend hiccup) is reported as an
/// empty list.
pub trait FaceProvider: Send + Sync {
    /// Detect faces, in frame coordinates.
    fn detect_faces(&self, frame: &Frame) -> Vec<BoundingBox>;

    /// Detect eyes inside `face`, in coordinates relative to the face box.
    fn detect_eyes(&self, frame: &Frame, face: &BoundingBox) -> Vec<BoundingBox>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Provider that never finds anything.
///
/// Used when no detection backend is compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFaceProvider;

impl NullFaceProvider {
    pub fn new() -> Self {
        Self
    }
}

impl FaceProvider for NullFaceProvider {
    fn detect_faces(&self, _frame: &Frame) -> Vec<BoundingBox> {
        Vec::new()
    }

    fn detect_eyes(&self, _frame: &Frame, _face: &BoundingBox) -> Vec<BoundingBox> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

/// Build the best available provider.
#[cfg(feature = "opencv")]
pub fn create_provider(config: &VisionConfig) -> VisionResult<Arc<dyn FaceProvider>> {
    Ok(Arc::new(HaarCascadeProvider::new(config)?))
}

/// Build the best available provider.
#[cfg(not(feature = "opencv"))]
pub fn create_provider(_config: &VisionConfig) -> VisionResult<Arc<dyn FaceProvider>> {
    tracing::warn!(
        "Built without the `opencv` feature; no faces will ever be detected \
         and every subject will end up in proctor_alert"
    );
    Ok(Arc::new(NullFaceProvider::new()))
}
