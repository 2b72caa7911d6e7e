use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::evaluation::Evaluation;
use crate::models::report::Report;
use crate::models::telemetry::{TelemetrySample, TelemetrySummary};

/// Lifecycle of one interview attempt. Transitions only move forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    QuestionsReady,
    Active,
    Completed,
}

/// A generated interview question. Immutable once generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub question: String,
    /// technical | behavioral | situational | general
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_kind")]
    pub category: String,
    #[serde(default)]
    pub expected_points: Vec<String>,
    /// Suggested time budget in seconds.
    #[serde(default = "default_time_limit")]
    pub time_limit: u32,
}

fn default_kind() -> String {
    "general".to_string()
}

fn default_difficulty() -> String {
    "medium".to_string()
}

fn default_time_limit() -> u32 {
    180
}

/// One submitted answer, its evaluation, and the telemetry window captured with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_index: usize,
    pub question: String,
    pub question_type: String,
    pub answer: String,
    pub evaluation: Evaluation,
    pub telemetry: Vec<TelemetrySample>,
    pub telemetry_summary: TelemetrySummary,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub resume_text: String,
    pub jd_text: String,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
    pub status: SessionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub report: Option<Report>,
}

impl Session {
    pub fn new(resume_text: String, jd_text: String) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            created_at: Utc::now(),
            resume_text,
            jd_text,
            questions: Vec::new(),
            answers: Vec::new(),
            status: SessionStatus::Created,
            started_at: None,
            ended_at: None,
            report: None,
        }
    }
}
