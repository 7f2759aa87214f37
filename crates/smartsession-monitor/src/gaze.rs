//! Gaze-away debounce.
//!
//! A single timer, reset every time the subject looks at the screen. The
//! away alert fires once the subject has been looking elsewhere for at
//! least the configured threshold, whichever non-center directions they
//! wandered through in between.

use std::time::{Duration, Instant};

use smartsession_models::GazeDirection;

/// Tracks how long the subject's gaze has been off-center.
#[derive(Debug, Clone)]
pub struct GazeDebouncer {
    last_centered_at: Instant,
    current_direction: GazeDirection,
    away_threshold: Duration,
}

impl GazeDebouncer {
    /// Create a debouncer; the gaze counts as centered at construction.
    pub fn new(away_threshold: Duration) -> Self {
        Self::new_at(away_threshold, Instant::now())
    }

    /// Create a debouncer whose gaze counts as centered at `now`.
    pub fn new_at(away_threshold: Duration, now: Instant) -> Self {
        Self {
            last_centered_at: now,
            current_direction: GazeDirection::Center,
            away_threshold,
        }
    }

    /// Record the latest direction. Returns `true` if the gaze has been
    /// away for at least the threshold.
    pub fn update(&mut self, direction: GazeDirection) -> bool {
        self.update_at(direction, Instant::now())
    }

    pub fn update_at(&mut self, direction: GazeDirection, now: Instant) -> bool {
        self.current_direction = direction;

        match direction {
            GazeDirection::Center => {
                self.last_centered_at = now;
                false
            }
            GazeDirection::Left | GazeDirection::Right | GazeDirection::Up | GazeDirection::Down => {
                now.saturating_duration_since(self.last_centered_at) >= self.away_threshold
            }
        }
    }

    /// Direction from the most recent update.
    pub fn current_direction(&self) -> GazeDirection {
        self.current_direction
    }

    /// Continuous away time that triggers the alert.
    pub fn away_threshold(&self) -> Duration {
        self.away_threshold
    }

    /// Restart the timer and report the gaze as centered again.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    /// Like [`reset`](Self::reset), restarting the timer at `now`.
    pub fn reset_at(&mut self, now: Instant) {
        self.last_centered_at = now;
        self.current_direction = GazeDirection::Center;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_center_never_alerts() {
        let t0 = Instant::now();
        let mut gaze = GazeDebouncer::new_at(secs(2.0), t0);
        assert!(!gaze.update_at(GazeDirection::Center, t0 + secs(10.0)));
        assert_eq!(gaze.current_direction(), GazeDirection::Center);
    }

    #[test]
    fn test_away_below_threshold_is_quiet() {
        let t0 = Instant::now();
        let mut gaze = GazeDebouncer::new_at(secs(2.0), t0);
        gaze.update_at(GazeDirection::Center, t0);
        for (i, dir) in [GazeDirection::Left, GazeDirection::Right, GazeDirection::Up, GazeDirection::Down]
            .into_iter()
            .enumerate()
        {
            assert!(!gaze.update_at(dir, t0 + secs(0.4 * (i as f64 + 1.0))));
            assert_eq!(gaze.current_direction(), dir);
        }
    }

    #[test]
    fn test_away_alerts_at_threshold() {
        let t0 = Instant::now();
        let mut gaze = GazeDebouncer::new_at(secs(2.0), t0);
        gaze.update_at(GazeDirection::Center, t0);
        assert!(!gaze.update_at(GazeDirection::Left, t0 + secs(1.9)));
        assert!(gaze.update_at(GazeDirection::Left, t0 + secs(2.0)));
        assert!(gaze.update_at(GazeDirection::Down, t0 + secs(5.0)));
    }

    #[test]
    fn test_center_resets_timer() {
        let t0 = Instant::now();
        let mut gaze = GazeDebouncer::new_at(secs(2.0), t0);
        assert!(!gaze.update_at(GazeDirection::Up, t0 + secs(1.5)));
        assert!(!gaze.update_at(GazeDirection::Center, t0 + secs(1.8)));
        assert!(!gaze.update_at(GazeDirection::Up, t0 + secs(3.0)));
        assert!(gaze.update_at(GazeDirection::Up, t0 + secs(3.8)));
    }

    #[test]
    fn test_timer_starts_at_construction() {
        let t0 = Instant::now();
        let mut gaze = GazeDebouncer::new_at(secs(1.0), t0);
        assert!(gaze.update_at(GazeDirection::Right, t0 + secs(1.0)));
    }

    #[test]
    fn test_reset() {
        let t0 = Instant::now();
        let mut gaze = GazeDebouncer::new_at(secs(1.0), t0);
        gaze.update_at(GazeDirection::Left, t0 + secs(0.5));
        gaze.reset_at(t0 + secs(2.0));
        assert_eq!(gaze.current_direction(), GazeDirection::Center);
        assert!(!gaze.update_at(GazeDirection::Left, t0 + secs(2.5)));
    }
}
