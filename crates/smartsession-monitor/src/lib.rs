//! Subject monitoring core.
//!
//! Fuses per-frame signals into a coarse [`Status`] and fans the result out
//! to observers:
//!
//! ```text
//! FrameObservation + GazeDirection
//!     │
//!     ▼
//! ┌──────────────────────────────────────────────┐
//! │ FramePipeline (one per subject connection)   │
//! │   SessionState.update_face_count             │
//! │   GazeDebouncer.update / SessionState.gaze   │
//! │   ConfusionDebouncer → update_confusion      │
//! └───────────────────┬──────────────────────────┘
//!                     │ StatusUpdate
//!                     ▼
//! ┌──────────────────────────────────────────────┐
//! │ BroadcastRegistry (process-wide, shared)     │
//! └───────────────────┬──────────────────────────┘
//!                     ▼
//!               every observer
//! ```
//!
//! [`Status`]: smartsession_models::Status

pub mod config;
pub mod confusion;
pub mod gaze;
pub mod pipeline;
pub mod registry;
pub mod session;

pub use config::MonitorConfig;
pub use confusion::ConfusionDebouncer;
pub use gaze::GazeDebouncer;
pub use pipeline::{FrameOutcome, FramePipeline};
pub use registry::{BroadcastOutcome, BroadcastRegistry, ChannelSink, DeliveryError, StatusSink};
pub use session::{SessionSnapshot, SessionState};
