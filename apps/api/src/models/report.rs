use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::telemetry::SessionTelemetry;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceCategory {
    Excellent,
    VeryGood,
    Good,
    Satisfactory,
    NeedsImprovement,
    Poor,
}

impl PerformanceCategory {
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            PerformanceCategory::Excellent
        } else if score >= 8.0 {
            PerformanceCategory::VeryGood
        } else if score >= 7.0 {
            PerformanceCategory::Good
        } else if score >= 6.0 {
            PerformanceCategory::Satisfactory
        } else if score >= 5.0 {
            PerformanceCategory::NeedsImprovement
        } else {
            PerformanceCategory::Poor
        }
    }
}

/// Averaged sub-scores across every evaluation that reported them. 0 when none did.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AveragedScores {
    pub relevance: f64,
    pub technical_accuracy: f64,
    pub clarity: f64,
    pub completeness: f64,
    pub examples: f64,
    pub depth: f64,
}

/// Performance on one question type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypePerformance {
    pub question_type: String,
    pub average_score: f64,
    pub question_count: usize,
    pub performance_level: PerformanceCategory,
}

/// Share of answers falling into one score band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandShare {
    pub band: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionMetadata {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Final aggregated summary of a completed session. Always recomputed in full.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub overall_score: f64,
    pub performance_category: PerformanceCategory,
    pub total_questions: usize,
    pub questions_answered: usize,
    pub completion_rate: f64,
    pub interview_duration_minutes: f64,
    pub detailed_scores: AveragedScores,
    pub telemetry_summary: SessionTelemetry,
    pub question_analysis: Vec<TypePerformance>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendations: Vec<String>,
    pub score_distribution: Vec<BandShare>,
    pub session_metadata: SessionMetadata,
}
