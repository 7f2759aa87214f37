//! Composite per-subject status.
//!
//! `SessionState` is the authoritative state machine for one subject
//! connection. It keeps its own gaze timer, separate from
//! [`GazeDebouncer`](crate::GazeDebouncer); both watch the same input but
//! are not synchronized.
//!
//! `ProctorAlert` is sticky: confusion updates can never leave it and only
//! [`SessionState::reset`] returns the session to `Focused`.

use std::time::{Duration, Instant};

use serde::Serialize;
use smartsession_models::Status;

/// Point-in-time view of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub status: Status,
    /// Unix epoch seconds
    pub timestamp: f64,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    status: Status,
    last_gaze_centered_at: Instant,
    face_missing_since: Option<Instant>,
    multi_face_seen: bool,
    gaze_away_threshold: Duration,
}

impl SessionState {
    /// Create a focused session with no face or gaze history.
    pub fn new(gaze_away_threshold: Duration) -> Self {
        Self::new_at(gaze_away_threshold, Instant::now())
    }

    /// Create a session whose gaze timer starts at `now`.
    pub fn new_at(gaze_away_threshold: Duration, now: Instant) -> Self {
        Self {
            status: Status::Focused,
            last_gaze_centered_at: now,
            face_missing_since: None,
            multi_face_seen: false,
            gaze_away_threshold,
        }
    }

    /// Apply a face count at the current time.
    pub fn update_face_count(&mut self, count: u32) {
        self.update_face_count_at(count, Instant::now());
    }

    /// Apply the number of faces detected in the latest frame.
    ///
    /// Two consecutive empty frames raise the alert. The first one only
    /// records when the face went missing; the elapsed time is not checked.
    pub fn update_face_count_at(&mut self, count: u32, now: Instant) {
        match count {
            0 => {
                if self.face_missing_since.is_none() {
                    self.face_missing_since = Some(now);
                } else {
                    self.raise_alert("face missing");
                }
            }
            1 => {
                self.face_missing_since = None;
                self.multi_face_seen = false;
            }
            _ => {
                self.multi_face_seen = true;
                self.raise_alert("multiple faces");
            }
        }
    }

    /// Apply a gaze reading at the current time.
    pub fn update_gaze(&mut self, gaze_centered: bool) {
        self.update_gaze_at(gaze_centered, Instant::now());
    }

    /// Refresh the gaze timer, or alert once the gaze has been away past the threshold.
    pub fn update_gaze_at(&mut self, gaze_centered: bool, now: Instant) {
        if gaze_centered {
            self.last_gaze_centered_at = now;
        } else if now.saturating_duration_since(self.last_gaze_centered_at) >= self.gaze_away_threshold
        {
            self.raise_alert("gaze away");
        }
    }

    /// Set `Confused` or `Focused`. Ignored while an alert is active.
    pub fn update_confusion(&mut self, is_confused: bool) {
        match self.status {
            Status::ProctorAlert => {}
            Status::Focused | Status::Confused => {
                self.status = if is_confused {
                    Status::Confused
                } else {
                    Status::Focused
                };
            }
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn face_missing_since(&self) -> Option<Instant> {
        self.face_missing_since
    }

    pub fn multi_face_seen(&self) -> bool {
        self.multi_face_seen
    }

    /// Current status with a Unix-epoch timestamp. Does not mutate.
    pub fn snapshot(&self) -> SessionSnapshot {
        let now = chrono::Utc::now();
        SessionSnapshot {
            status: self.status,
            timestamp: now.timestamp_micros() as f64 / 1_000_000.0,
        }
    }

    /// Return to `Focused` and clear every timer and flag.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    /// Like [`reset`](Self::reset), restarting the gaze timer at `now`.
    pub fn reset_at(&mut self, now: Instant) {
        *self = Self::new_at(self.gaze_away_threshold, now);
    }

    fn raise_alert(&mut self, reason: &'static str) {
        if self.status != Status::ProctorAlert {
            tracing::info!(reason, previous = %self.status, "Proctor alert raised");
        }
        self.status = Status::ProctorAlert;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_starts_focused() {
        let session = SessionState::new(secs(3.0));
        assert_eq!(session.status(), Status::Focused);
        assert!(session.face_missing_since().is_none());
        assert!(!session.multi_face_seen());
    }

    #[test]
    fn test_face_missing_twice_alerts() {
        let t0 = Instant::now();
        let mut session = SessionState::new_at(secs(3.0), t0);
        session.update_face_count_at(1, t0);
        session.update_face_count_at(0, t0 + secs(0.1));
        assert_eq!(session.status(), Status::Focused);
        assert_eq!(session.face_missing_since(), Some(t0 + secs(0.1)));

        // Counted, not timed: the second miss alerts however soon it comes.
        session.update_face_count_at(0, t0 + secs(0.1001));
        assert_eq!(session.status(), Status::ProctorAlert);
    }

    #[test]
    fn test_face_return_clears_miss() {
        let t0 = Instant::now();
        let mut session = SessionState::new_at(secs(3.0), t0);
        session.update_face_count_at(0, t0);
        session.update_face_count_at(1, t0 + secs(0.1));
        session.update_face_count_at(0, t0 + secs(0.2));
        assert_eq!(session.status(), Status::Focused);
    }

    #[test]
    fn test_multiple_faces_alert_immediately() {
        let mut session = SessionState::new(secs(3.0));
        session.update_confusion(true);
        assert_eq!(session.status(), Status::Confused);

        session.update_face_count(2);
        assert_eq!(session.status(), Status::ProctorAlert);
        assert!(session.multi_face_seen());
    }

    #[test]
    fn test_gaze_away_alerts_after_threshold() {
        let t0 = Instant::now();
        let mut session = SessionState::new_at(secs(2.0), t0);
        session.update_gaze_at(true, t0);
        session.update_gaze_at(false, t0 + secs(1.0));
        assert_eq!(session.status(), Status::Focused);
        session.update_gaze_at(false, t0 + secs(2.5));
        assert_eq!(session.status(), Status::ProctorAlert);
    }

    #[test]
    fn test_alert_is_sticky() {
        let mut session = SessionState::new(secs(3.0));
        session.update_face_count(3);
        for _ in 0..10 {
            session.update_confusion(false);
            session.update_confusion(true);
        }
        session.update_face_count(1);
        session.update_gaze(true);
        assert_eq!(session.status(), Status::ProctorAlert);

        session.reset();
        assert_eq!(session.status(), Status::Focused);
        assert!(!session.multi_face_seen());
    }

    #[test]
    fn test_confusion_toggles_when_not_alerting() {
        let mut session = SessionState::new(secs(3.0));
        session.update_confusion(true);
        assert_eq!(session.status(), Status::Confused);
        session.update_confusion(false);
        assert_eq!(session.status(), Status::Focused);
    }

    #[test]
    fn test_snapshot_is_pure_read() {
        let mut session = SessionState::new(secs(3.0));
        session.update_confusion(true);
        let a = session.snapshot();
        let b = session.snapshot();
        assert_eq!(a.status, b.status);
        assert_eq!(a.status, Status::Confused);
        assert!(a.timestamp > 0.0);
        assert!(b.timestamp >= a.timestamp);
    }

    #[test]
    fn test_reset_restarts_gaze_timer() {
        let t0 = Instant::now();
        let mut session = SessionState::new_at(secs(2.0), t0);
        session.update_face_count_at(0, t0);
        session.reset_at(t0 + secs(5.0));
        assert!(session.face_missing_since().is_none());
        session.update_gaze_at(false, t0 + secs(6.0));
        assert_eq!(session.status(), Status::Focused);
    }
}
