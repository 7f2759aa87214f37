//! Facial-geometry features derived from face and eye boxes.
//!
//! Only box geometry is used: eye aspect ratio for strain (squinting) and
//! the angle between the two eye centres for head tilt.

use serde::{Deserialize, Serialize};
use smartsession_models::BoundingBox;

/// Eye aspect ratio (h / w) below which an eye counts as strained.
pub const EYE_STRAIN_EAR_THRESHOLD: f64 = 0.25;

/// Features consumed by the confusion debouncer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionFeatures {
    pub eye_strain: bool,
    /// Absolute tilt in degrees, always >= 0
    pub head_tilt: f64,
}

/// Head tilt in degrees between two eye centres; 0.0 when the eyes are
/// vertically aligned.
pub fn head_tilt_degrees(left_eye: &BoundingBox, right_eye: &BoundingBox) -> f64 {
    let dx = right_eye.cx() - left_eye.cx();
    let dy = right_eye.cy() - left_eye.cy();

    if dx == 0.0 {
        return 0.0;
    }

    dy.atan2(dx).to_degrees()
}

/// Compute features from a face box and the eye boxes found inside it.
///
/// Needs at least two eyes; otherwise returns the neutral default
/// (`eye_strain = false`, `head_tilt = 0.0`). Only the first two eyes
/// are used.
pub fn extract_features(_face: &BoundingBox, eyes: &[BoundingBox]) -> EmotionFeatures {
    let [left_eye, right_eye, ..] = eyes else {
        return EmotionFeatures::default();
    };

    let ear_left = left_eye.aspect_ratio();
    let ear_right = right_eye.aspect_ratio();

    EmotionFeatures {
        eye_strain: ear_left < EYE_STRAIN_EAR_THRESHOLD && ear_right < EYE_STRAIN_EAR_THRESHOLD,
        head_tilt: head_tilt_degrees(left_eye, right_eye).abs(),
    }
}
