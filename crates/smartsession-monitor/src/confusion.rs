//! Confusion debounce.
//!
//! A frame looks confused when the subject is looking at the screen,
//! squinting, and tilting their head past the threshold. Confusion is only
//! confirmed once such frames have run uninterrupted for the minimum
//! duration; any other frame closes the streak and clears the confirmation.

use std::time::{Duration, Instant};

/// Confirms sustained confusion from per-frame cues.
#[derive(Debug, Clone)]
pub struct ConfusionDebouncer {
    streak_start: Option<Instant>,
    confirmed: bool,
    min_duration: Duration,
    head_tilt_threshold_deg: f64,
}

impl ConfusionDebouncer {
    pub fn new(min_duration: Duration, head_tilt_threshold_deg: f64) -> Self {
        Self {
            streak_start: None,
            confirmed: false,
            min_duration,
            head_tilt_threshold_deg,
        }
    }

    /// Feed one frame's cues. Returns whether confusion is confirmed.
    pub fn update(&mut self, eye_strain: bool, head_tilt_deg: f64, gaze_centered: bool) -> bool {
        self.update_at(eye_strain, head_tilt_deg, gaze_centered, Instant::now())
    }

    pub fn update_at(
        &mut self,
        eye_strain: bool,
        head_tilt_deg: f64,
        gaze_centered: bool,
        now: Instant,
    ) -> bool {
        let frame_confused =
            gaze_centered && eye_strain && head_tilt_deg > self.head_tilt_threshold_deg;

        if frame_confused {
            match self.streak_start {
                // The opening frame only starts the clock.
                None => self.streak_start = Some(now),
                Some(start) => {
                    if now.saturating_duration_since(start) >= self.min_duration {
                        self.confirmed = true;
                    }
                }
            }
        } else {
            self.streak_start = None;
            self.confirmed = false;
        }

        self.confirmed
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Whether a confused streak is currently open.
    pub fn in_streak(&self) -> bool {
        self.streak_start.is_some()
    }

    pub fn reset(&mut self) {
        self.streak_start = None;
        self.confirmed = false;
    }
}
