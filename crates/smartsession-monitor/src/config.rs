//! Monitor configuration.

use std::time::Duration;

/// Thresholds for the fusion state machine and the broadcast fan-out.
///
/// Immutable once the server has started; every subject connection gets
/// the same values.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Continuous gaze-away time that raises a proctor alert
    pub gaze_away_threshold: Duration,
    /// Sustained confusion time before it is confirmed
    pub confusion_min_duration: Duration,
    /// Head tilt (degrees) above which a frame can count as confused
    pub head_tilt_threshold_deg: f64,
    /// Per-observer delivery timeout for one broadcast
    pub broadcast_send_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            gaze_away_threshold: Duration::from_secs(3),
            confusion_min_duration: Duration::from_secs(2),
            head_tilt_threshold_deg: 10.0,
            broadcast_send_timeout: Duration::from_millis(2000),
        }
    }
}

impl MonitorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gaze_away_threshold: env_secs("GAZE_AWAY_THRESHOLD_SECS")
                .unwrap_or(defaults.gaze_away_threshold),
            confusion_min_duration: env_secs("CONFUSION_MIN_DURATION_SECS")
                .unwrap_or(defaults.confusion_min_duration),
            head_tilt_threshold_deg: std::env::var("CONFUSION_HEAD_TILT_THRESHOLD_DEG")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(defaults.head_tilt_threshold_deg),
            broadcast_send_timeout: Duration::from_millis(
                std::env::var("BROADCAST_SEND_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            ),
        }
    }
}

/// Parse a non-negative fractional seconds value.
fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(Duration::from_secs_f64)
}
