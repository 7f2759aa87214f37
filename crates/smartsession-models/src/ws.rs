//! WebSocket message types.
//!
//! These messages keep the wire format the browser clients already speak.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::status::{GazeDirection, Status};

/// Frame sent by a monitored subject.
///
/// Both fields are required; a payload missing either one fails to
/// deserialize and is skipped by the server.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubjectFrame {
    /// Base64-encoded image (JPEG/PNG)
    pub frame: String,

    /// Gaze direction estimated client-side
    pub gaze_direction: GazeDirection,
}

/// Status update broadcast to every observer.
///
/// Carries no subject identifier: with several subjects connected,
/// observers cannot tell whose update this is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatusUpdate {
    pub status: Status,
    /// Unix epoch seconds
    pub timestamp: f64,
    pub gaze_direction: GazeDirection,
    pub face_count: u32,
}
