//! Vision configuration.

/// Default location of the OpenCV Haar cascades on Debian/Ubuntu.
const DEFAULT_CASCADE_DIR: &str = "/usr/share/opencv4/haarcascades";

/// Detection backend configuration.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Frontal face cascade XML
    pub face_cascade_path: String,
    /// Eye cascade XML
    pub eye_cascade_path: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            face_cascade_path: format!("{}/haarcascade_frontalface_default.xml", DEFAULT_CASCADE_DIR),
            eye_cascade_path: format!("{}/haarcascade_eye.xml", DEFAULT_CASCADE_DIR),
        }
    }
}

impl VisionConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            face_cascade_path: std::env::var("HAAR_FACE_CASCADE")
                .unwrap_or(defaults.face_cascade_path),
            eye_cascade_path: std::env::var("HAAR_EYE_CASCADE")
                .unwrap_or(defaults.eye_cascade_path),
        }
    }
}
