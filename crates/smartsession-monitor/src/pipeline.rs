//! Per-connection frame processing.

use std::time::Instant;

use smartsession_models::{GazeDirection, Status, StatusUpdate};
use smartsession_vision::FrameObservation;

use crate::{ConfusionDebouncer, GazeDebouncer, MonitorConfig, SessionState};

/// Result of feeding one frame through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub update: StatusUpdate,
    pub previous: Status,
}

impl FrameOutcome {
    pub fn changed(&self) -> bool {
        self.previous != self.update.status
    }
}

/// Session state plus both debouncers for one subject connection.
///
/// Owned by the connection's processing loop; not shared.
#[derive(Debug, Clone)]
pub struct FramePipeline {
    session: SessionState,
    gaze: GazeDebouncer,
    confusion: ConfusionDebouncer,
}

impl FramePipeline {
    pub fn new(config: &MonitorConfig) -> Self {
        Self::new_at(config, Instant::now())
    }

    pub fn new_at(config: &MonitorConfig, now: Instant) -> Self {
        Self {
            session: SessionState::new_at(config.gaze_away_threshold, now),
            gaze: GazeDebouncer::new_at(config.gaze_away_threshold, now),
            confusion: ConfusionDebouncer::new(
                config.confusion_min_duration,
                config.head_tilt_threshold_deg,
            ),
        }
    }

    pub fn apply(&mut self, observation: FrameObservation, direction: GazeDirection) -> FrameOutcome {
        self.apply_at(observation, direction, Instant::now())
    }

    /// Run one frame through the state machine.
    ///
    /// Order is fixed: face count, gaze, then confusion. Confusion is only
    /// evaluated when features were extracted (exactly one face); otherwise
    /// it counts as not confused, which drops a `Confused` session back to
    /// `Focused` on a single missed face.
    pub fn apply_at(
        &mut self,
        observation: FrameObservation,
        direction: GazeDirection,
        now: Instant,
    ) -> FrameOutcome {
        let previous = self.session.status();
        let centered = direction.is_centered();

        self.session.update_face_count_at(observation.face_count, now);

        // The debouncer's verdict is not used; the session keeps its own timer.
        let _away = self.gaze.update_at(direction, now);
        self.session.update_gaze_at(centered, now);

        let is_confused = match observation.features {
            Some(features) => {
                self.confusion
                    .update_at(features.eye_strain, features.head_tilt, centered, now)
            }
            None => false,
        };
        self.session.update_confusion(is_confused);

        let snapshot = self.session.snapshot();
        let update = StatusUpdate {
            status: snapshot.status,
            timestamp: snapshot.timestamp,
            gaze_direction: self.gaze.current_direction(),
            face_count: observation.face_count,
        };

        if update.status != previous {
            tracing::debug!(from = %previous, to = %update.status, "Session status changed");
        }

        FrameOutcome { update, previous }
    }

    pub fn status(&self) -> Status {
        self.session.status()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn reset(&mut self) {
        let now = Instant::now();
        self.session.reset_at(now);
        self.gaze.reset_at(now);
        self.confusion.reset();
    }
}
