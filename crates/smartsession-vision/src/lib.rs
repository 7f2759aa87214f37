//! Vision collaborators for SmartSession.
//!
//! Turns a subject's raw frame into the typed signals the monitor consumes:
//! - Frame payload decoding (base64)
//! - Face and eye detection behind [`FaceProvider`]
//! - Eye-strain / head-tilt features from face and eye boxes
//!
//! Providers never fail at call time. An empty detection list is the
//! "not found" signal; only construction can return an error.

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod frame;
pub mod providers;

pub use analysis::{analyze_frame, FrameObservation};
pub use config::VisionConfig;
pub use error::{VisionError, VisionResult};
pub use features::{extract_features, EmotionFeatures};
pub use frame::{decode_frame, Frame};
pub use providers::{create_provider, FaceProvider, NullFaceProvider};

#[cfg(feature = "opencv")]
pub use providers::HaarCascadeProvider;
