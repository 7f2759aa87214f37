//! Subject status and gaze direction enums.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Coarse status of a monitored subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Engaged, nothing to report
    #[default]
    Focused,
    /// Sustained confusion cues
    Confused,
    /// Integrity violation; sticky until the session is reset
    ProctorAlert,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Focused => "focused",
            Status::Confused => "confused",
            Status::ProctorAlert => "proctor_alert",
        }
    }

    /// Whether this status is the sticky alert state.
    pub fn is_alert(&self) -> bool {
        matches!(self, Status::ProctorAlert)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gaze direction reported by the subject's client for each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GazeDirection {
    #[default]
    Center,
    Left,
    Right,
    Up,
    Down,
}

impl GazeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GazeDirection::Center => "center",
            GazeDirection::Left => "left",
            GazeDirection::Right => "right",
            GazeDirection::Up => "up",
            GazeDirection::Down => "down",
        }
    }

    #[inline]
    pub fn is_centered(&self) -> bool {
        matches!(self, GazeDirection::Center)
    }
}

impl std::fmt::Display for GazeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GazeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(GazeDirection::Center),
            "left" => Ok(GazeDirection::Left),
            "right" => Ok(GazeDirection::Right),
            "up" => Ok(GazeDirection::Up),
            "down" => Ok(GazeDirection::Down),
            other => Err(format!("Unknown gaze direction: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&Status::Focused).unwrap(), "\"focused\"");
        assert_eq!(serde_json::to_string(&Status::Confused).unwrap(), "\"confused\"");
        assert_eq!(
            serde_json::to_string(&Status::ProctorAlert).unwrap(),
            "\"proctor_alert\""
        );
        assert_eq!(Status::ProctorAlert.to_string(), "proctor_alert");
    }

    #[test]
    fn test_gaze_direction_parse() {
        assert_eq!("left".parse::<GazeDirection>().unwrap(), GazeDirection::Left);
        assert!("sideways".parse::<GazeDirection>().is_err());
        assert!(GazeDirection::Center.is_centered());
        assert!(!GazeDirection::Down.is_centered());
    }

    #[test]
    fn test_gaze_direction_rejects_unknown_json() {
        let parsed: Result<GazeDirection, _> = serde_json::from_str("\"CENTER\"");
        assert!(parsed.is_err());
    }
}
