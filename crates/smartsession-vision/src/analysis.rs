//! Per-frame analysis: runs the detection provider and feature extraction.

use smartsession_models::BoundingBox;

use crate::features::{extract_features, EmotionFeatures};
use crate::frame::Frame;
use crate::providers::FaceProvider;

/// What the vision layer saw in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameObservation {
    pub face_count: u32,
    /// Present only when exactly one face was found
    pub features: Option<EmotionFeatures>,
}

impl FrameObservation {
    pub fn new(face_count: u32, features: Option<EmotionFeatures>) -> Self {
        Self { face_count, features }
    }
}

/// Analyze a decoded frame.
///
/// Eyes are only searched for when exactly one face is present; with zero
/// or several faces there is nothing to attribute the features to.
pub fn analyze_frame(provider: &dyn FaceProvider, frame: &Frame) -> FrameObservation {
    let faces = provider.detect_faces(frame);
    let face_count = u32::try_from(faces.len()).unwrap_or(u32::MAX);

    let features = match faces.as_slice() {
        [face] => Some(features_for(provider, frame, face)),
        _ => None,
    };

    FrameObservation { face_count, features }
}

fn features_for(provider: &dyn FaceProvider, frame: &Frame, face: &BoundingBox) -> EmotionFeatures {
    let eyes = provider.detect_eyes(frame, face);
    extract_features(face, &eyes)
}
