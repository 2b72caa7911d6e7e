//! Semantic rating: the rater seam plus the two-stage response parser.
//!
//! `SemanticRater` returns the rater's raw text. `parse_rating` turns that text into a
//! tagged result: a structured JSON rating, a heuristic rating recovered from bare
//! numbers, or a failure the evaluator answers with its local fallback.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::evaluation::prompts::{RATING_MAX_TOKENS, RATING_PROMPT_TEMPLATE};
use crate::llm_client::prompts::{fill_template, JSON_ONLY_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::evaluation::{DetailedScores, Metric};
use crate::models::session::Question;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid"));

const HEURISTIC_CONFIDENCE: f64 = 0.7;
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// The rating collaborator. Carried in the evaluator as `Arc<dyn SemanticRater>` so
/// tests can swap in scripted responses.
#[async_trait]
pub trait SemanticRater: Send + Sync {
    async fn rate(&self, question: &Question, answer: &str) -> Result<String, LlmError>;
}

/// Rates answers through the Claude API.
pub struct LlmRater(pub LlmClient);

#[async_trait]
impl SemanticRater for LlmRater {
    async fn rate(&self, question: &Question, answer: &str) -> Result<String, LlmError> {
        let prompt = build_rating_prompt(question, answer);
        self.0
            .complete(&prompt, JSON_ONLY_SYSTEM, RATING_MAX_TOKENS)
            .await
    }
}

pub fn build_rating_prompt(question: &Question, answer: &str) -> String {
    let expected_points = question.expected_points.join(", ");
    fill_template(
        RATING_PROMPT_TEMPLATE,
        &[
            ("question", question.question.as_str()),
            ("question_type", question.kind.as_str()),
            ("expected_points", expected_points.as_str()),
            ("answer", answer),
        ],
    )
}

/// A rating as supplied by the semantic rater, already clamped to valid ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticRating {
    pub overall_score: f64,
    pub detailed_scores: DetailedScores,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub feedback: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRating {
    Structured(SemanticRating),
    Heuristic(SemanticRating),
    Failure(String),
}

#[derive(Debug, Deserialize)]
struct RatingPayload {
    overall_score: f64,
    #[serde(default)]
    detailed_scores: DetailedScores,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Parses a rater response.
///
/// Stage 1: if the text contains a `{...}` block, it must deserialize into the rating
/// schema; a malformed block is a `Failure`.
/// Stage 2: otherwise the first numbers in the text are read positionally as
/// [overall, relevance, accuracy, clarity, completeness, examples, depth], each clamped
/// to [1, 10]; missing positions take the overall score.
pub fn parse_rating(text: &str) -> ParsedRating {
    if let Some(block) = outermost_json_object(text) {
        return match serde_json::from_str::<RatingPayload>(block) {
            Ok(payload) => ParsedRating::Structured(SemanticRating {
                overall_score: payload.overall_score.clamp(1.0, 10.0),
                detailed_scores: payload.detailed_scores.clamped(),
                strengths: payload.strengths,
                improvements: payload.improvements,
                feedback: payload.feedback,
                confidence: payload
                    .confidence
                    .unwrap_or(DEFAULT_CONFIDENCE)
                    .clamp(0.0, 1.0),
            }),
            Err(e) => ParsedRating::Failure(format!("malformed rating JSON: {e}")),
        };
    }

    let numbers: Vec<f64> = NUMBER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    let Some(&overall) = numbers.first() else {
        return ParsedRating::Failure("no scores found in rating response".to_string());
    };

    let mut detailed_scores = DetailedScores::default();
    for (i, metric) in Metric::ALL.into_iter().enumerate() {
        let value = numbers.get(i + 1).copied().unwrap_or(overall);
        detailed_scores.set(metric, Some(value));
    }

    ParsedRating::Heuristic(SemanticRating {
        overall_score: overall.clamp(1.0, 10.0),
        detailed_scores: detailed_scores.clamped(),
        strengths: vec![
            "Clear communication".to_string(),
            "Relevant content".to_string(),
            "Good structure".to_string(),
        ],
        improvements: vec![
            "Add more examples".to_string(),
            "Provide more detail".to_string(),
            "Better organization".to_string(),
        ],
        feedback: "The answer addresses the question with reasonable clarity.".to_string(),
        confidence: HEURISTIC_CONFIDENCE,
    })
}

/// Span from the first `{` to the last `}`, if any.
fn outermost_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
