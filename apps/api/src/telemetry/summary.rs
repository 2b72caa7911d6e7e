//! Summaries over telemetry samples: per-answer windows and whole sessions.

use crate::models::telemetry::{HeadMovement, SessionTelemetry, TelemetrySample, TelemetrySummary};
use crate::stats::{mean, population_variance, ratio, round_to};

/// Yaw variance below this is `stable`.
const STABLE_YAW_VARIANCE: f64 = 25.0;
/// Yaw variance below this (and not stable) is `moderate`; anything above is `excessive`.
const MODERATE_YAW_VARIANCE: f64 = 100.0;

/// Per-answer windows come from the 1 Hz simulator.
const WINDOW_SAMPLES_PER_MINUTE: f64 = 60.0;
/// Session-level blink rate assumes 10 Hz underlying capture.
const CAPTURE_SAMPLES_PER_MINUTE: f64 = 600.0;

/// Classifies head-movement stability from the population variance of yaw.
/// Used for both per-answer windows and the final report.
pub fn classify_head_movement(samples: &[TelemetrySample]) -> HeadMovement {
    if samples.is_empty() {
        return HeadMovement::Unknown;
    }
    let yaws: Vec<f64> = samples.iter().map(|s| s.head_pose.yaw).collect();
    let variance = population_variance(&yaws);

    if variance < STABLE_YAW_VARIANCE {
        HeadMovement::Stable
    } else if variance < MODERATE_YAW_VARIANCE {
        HeadMovement::Moderate
    } else {
        HeadMovement::Excessive
    }
}

/// Summarizes a recent window of samples attached to one answer.
pub fn summarize(samples: &[TelemetrySample]) -> TelemetrySummary {
    if samples.is_empty() {
        return TelemetrySummary {
            avg_eye_contact: 0.0,
            avg_face_visibility: 0.0,
            blink_rate: 0.0,
            head_movement: HeadMovement::Unknown,
        };
    }

    let (eye, face) = score_columns(samples);
    let blinks = count_blinks(samples) as f64;
    let minutes = (samples.len() as f64 / WINDOW_SAMPLES_PER_MINUTE).max(1.0);

    TelemetrySummary {
        avg_eye_contact: round_to(mean(&eye), 1),
        avg_face_visibility: round_to(mean(&face), 1),
        blink_rate: round_to(blinks / minutes, 1),
        head_movement: classify_head_movement(samples),
    }
}

/// Summarizes every sample recorded across a session.
pub fn summarize_session(samples: &[TelemetrySample]) -> SessionTelemetry {
    let (eye, face) = score_columns(samples);
    let blinks = count_blinks(samples);
    let minutes = samples.len() as f64 / CAPTURE_SAMPLES_PER_MINUTE;

    SessionTelemetry {
        avg_eye_contact: round_to(mean(&eye), 1),
        avg_face_visibility: round_to(mean(&face), 1),
        total_blinks: blinks,
        blink_rate_per_minute: round_to(ratio(blinks as f64, minutes), 1),
        head_movement_stability: classify_head_movement(samples),
        sample_count: samples.len(),
    }
}

fn score_columns(samples: &[TelemetrySample]) -> (Vec<f64>, Vec<f64>) {
    samples
        .iter()
        .map(|s| (s.eye_contact_score, s.face_visibility))
        .unzip()
}

fn count_blinks(samples: &[TelemetrySample]) -> usize {
    samples.iter().filter(|s| s.blink_detected).count()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, TimeZone, Utc};

    use crate::models::telemetry::{GazeDirection, HeadPose, TelemetrySample};

    /// Builds samples one second apart with the given yaw values and fixed scores.
    pub fn samples_with_yaw(yaws: &[f64], eye: f64, face: f64) -> Vec<TelemetrySample> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        yaws.iter()
            .enumerate()
            .map(|(i, &yaw)| TelemetrySample {
                timestamp: start + Duration::seconds(i as i64),
                eye_contact_score: eye,
                face_visibility: face,
                head_pose: HeadPose {
                    yaw,
                    pitch: 0.0,
                    roll: 0.0,
                },
                blink_detected: false,
                gaze_direction: GazeDirection {
                    x: yaw / 30.0,
                    y: 0.0,
                },
            })
            .collect()
    }
}
