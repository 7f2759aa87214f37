//! Shared data models for SmartSession backend.
//!
//! This crate provides Serde-serializable types for:
//! - Subject status and gaze direction
//! - Connection identifiers
//! - Face/eye bounding boxes exchanged with the vision layer
//! - WebSocket message schemas for subjects and observers

pub mod id;
pub mod rect;
pub mod status;
pub mod ws;

// Re-export common types
pub use id::ConnectionId;
pub use rect::BoundingBox;
pub use status::{GazeDirection, Status};
pub use ws::{StatusUpdate, SubjectFrame};
