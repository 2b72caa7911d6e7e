//! Rule-based coaching recommendations for the final report.

use tracing::debug;

use crate::models::evaluation::Metric;
use crate::models::telemetry::{HeadMovement, SessionTelemetry};

const MAX_RECOMMENDATIONS: usize = 5;
const SCORE_FLOOR: f64 = 6.0;
const EYE_CONTACT_FLOOR: f64 = 60.0;
const FACE_VISIBILITY_FLOOR: f64 = 80.0;

fn metric_advice(metric: Metric) -> &'static str {
    match metric {
        Metric::Relevance => "Practice answering questions more directly and staying on topic",
        Metric::TechnicalAccuracy => "Review technical concepts and ensure accuracy in responses",
        Metric::Clarity => "Work on structuring answers more clearly and concisely",
        Metric::Completeness => "Provide more comprehensive answers covering all aspects",
        Metric::Examples => "Include more specific, relevant examples in responses",
        Metric::Depth => "Demonstrate deeper understanding and insight",
    }
}

/// Builds at most five recommendations, in a fixed order:
/// overall score, then sub-scores in canonical metric order, then camera presence.
///
/// `sub_scores` holds the session mean per metric, `None` when no evaluation reported
/// that metric.
pub fn recommend(
    overall_score: f64,
    sub_scores: &[(Metric, Option<f64>)],
    telemetry: &SessionTelemetry,
) -> Vec<String> {
    let mut recommendations: Vec<&str> = Vec::new();

    if overall_score < SCORE_FLOOR {
        recommendations.push("Consider additional preparation focusing on core competencies");
    }

    for metric in Metric::ALL {
        let mean = sub_scores
            .iter()
            .find(|(m, _)| *m == metric)
            .and_then(|(_, mean)| *mean);
        if let Some(score) = mean.filter(|score| *score < SCORE_FLOOR) {
            debug!("Sub-score {} averaged {score:.1}", metric.key());
            recommendations.push(metric_advice(metric));
        }
    }

    // With no samples the averages are zero, so both camera rules fire.
    if telemetry.avg_eye_contact < EYE_CONTACT_FLOOR {
        recommendations.push("Practice maintaining better eye contact with the camera");
    }
    if telemetry.avg_face_visibility < FACE_VISIBILITY_FLOOR {
        recommendations.push("Ensure proper lighting and camera positioning for better visibility");
    }
    if matches!(
        telemetry.head_movement_stability,
        HeadMovement::Moderate | HeadMovement::Excessive
    ) {
        recommendations.push("Try to minimize excessive head movements during responses");
    }

    if recommendations.is_empty() {
        recommendations.push("Continue practicing to maintain your strong performance");
    }

    recommendations
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(str::to_string)
        .collect()
}
