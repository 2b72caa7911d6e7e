use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Head orientation in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HeadPose {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Gaze vector derived from head pose, each axis normalized to [-1, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GazeDirection {
    pub x: f64,
    pub y: f64,
}

/// One synthetic attentiveness measurement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetrySample {
    pub timestamp: DateTime<Utc>,
    /// 0 – 100
    pub eye_contact_score: f64,
    /// 0 – 100
    pub face_visibility: f64,
    pub head_pose: HeadPose,
    pub blink_detected: bool,
    pub gaze_direction: GazeDirection,
}

/// Head-movement stability bucket, derived from yaw variance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HeadMovement {
    Stable,
    Moderate,
    Excessive,
    /// No samples to classify.
    Unknown,
}

/// Summary of a telemetry window attached to a single answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TelemetrySummary {
    pub avg_eye_contact: f64,
    pub avg_face_visibility: f64,
    /// Blinks per minute at the simulator's 1 Hz cadence.
    pub blink_rate: f64,
    pub head_movement: HeadMovement,
}

/// Whole-session telemetry summary carried in the final report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionTelemetry {
    pub avg_eye_contact: f64,
    pub avg_face_visibility: f64,
    pub total_blinks: usize,
    pub blink_rate_per_minute: f64,
    pub head_movement_stability: HeadMovement,
    pub sample_count: usize,
}
