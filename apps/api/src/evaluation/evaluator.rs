//! Answer Evaluator: turns one submitted answer into an `Evaluation`.
//!
//! Flow: semantic rating → two-stage parse → local linguistic + sentiment metrics →
//!       adjustments → composite final score.
//!
//! `evaluate` never fails. Any rater problem (transport error, non-success status,
//! unparseable response) degrades to a length-based fallback score.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::evaluation::linguistics::linguistic_metrics;
use crate::evaluation::rating::{parse_rating, ParsedRating, SemanticRater, SemanticRating};
use crate::evaluation::sentiment::sentiment_metrics;
use crate::models::evaluation::{
    Adjustments, DetailedScores, Evaluation, LinguisticMetrics, RatingSource, SentimentMetrics,
};
use crate::models::session::Question;
use crate::stats::round_to;

const READABLE_RANGE: (f64, f64) = (30.0, 70.0);
const READABILITY_BONUS: f64 = 0.2;
const CONFIDENCE_WEIGHT: f64 = 0.5;
const FALLBACK_CONFIDENCE: f64 = 0.5;

pub struct AnswerEvaluator {
    rater: Arc<dyn SemanticRater>,
}

impl AnswerEvaluator {
    pub fn new(rater: Arc<dyn SemanticRater>) -> Self {
        Self { rater }
    }

    pub async fn evaluate(&self, question: &Question, answer: &str) -> Evaluation {
        let linguistic = linguistic_metrics(answer);
        let sentiment = sentiment_metrics(answer);

        let parsed = match self.rater.rate(question, answer).await {
            Ok(text) => parse_rating(&text),
            Err(e) => ParsedRating::Failure(e.to_string()),
        };

        match parsed {
            ParsedRating::Structured(rating) => {
                combine(rating, RatingSource::Structured, linguistic, sentiment)
            }
            ParsedRating::Heuristic(rating) => {
                debug!(
                    "Rating response was not JSON; recovered scores positionally (overall {})",
                    rating.overall_score
                );
                combine(rating, RatingSource::Heuristic, linguistic, sentiment)
            }
            ParsedRating::Failure(reason) => {
                warn!("Semantic rating unavailable, using length-based fallback: {reason}");
                fallback_evaluation(linguistic, sentiment)
            }
        }
    }
}

/// Applies the local adjustments to a rater-supplied base score.
fn combine(
    rating: SemanticRating,
    source: RatingSource,
    linguistic: LinguisticMetrics,
    sentiment: SentimentMetrics,
) -> Evaluation {
    let adjustments = adjustments(&linguistic, &sentiment);
    let final_score = final_score(rating.overall_score, &adjustments);

    Evaluation {
        overall_score: rating.overall_score,
        final_score,
        detailed_scores: rating.detailed_scores,
        strengths: rating.strengths,
        improvements: rating.improvements,
        feedback: rating.feedback,
        confidence: rating.confidence,
        linguistic_metrics: linguistic,
        sentiment_metrics: sentiment,
        adjustments,
        source,
    }
}

fn adjustments(linguistic: &LinguisticMetrics, sentiment: &SentimentMetrics) -> Adjustments {
    let (low, high) = READABLE_RANGE;
    let readability = if (low..=high).contains(&linguistic.readability_score) {
        READABILITY_BONUS
    } else {
        0.0
    };

    Adjustments {
        word_count: word_count_adjustment(linguistic.word_count),
        readability,
        confidence: (sentiment.confidence_score - 0.5) * CONFIDENCE_WEIGHT,
    }
}

fn final_score(base: f64, adjustments: &Adjustments) -> f64 {
    let raw = base + adjustments.word_count + adjustments.readability + adjustments.confidence;
    round_to(raw.clamp(1.0, 10.0), 1)
}

/// Penalises answers that are too short or ramble.
fn word_count_adjustment(words: usize) -> f64 {
    match words {
        0..=19 => -1.0,
        20..=49 => -0.5,
        50..=200 => 0.0,
        201..=300 => -0.2,
        _ => -0.5,
    }
}

fn fallback_score(words: usize) -> f64 {
    match words {
        0 => 1.0,
        1..=19 => 3.0,
        20..=49 => 5.0,
        50..=150 => 7.0,
        _ => 6.0,
    }
}

/// Length-only evaluation used when no semantic rating is available.
fn fallback_evaluation(linguistic: LinguisticMetrics, sentiment: SentimentMetrics) -> Evaluation {
    let words = linguistic.word_count;
    let score = fallback_score(words);

    Evaluation {
        overall_score: score,
        final_score: score,
        detailed_scores: DetailedScores::uniform(score),
        strengths: vec!["Answer provided".to_string(), "Appropriate length".to_string()],
        improvements: vec![
            "Could add more detail".to_string(),
            "Include specific examples".to_string(),
        ],
        feedback: format!(
            "Your answer contains {words} words. Automated scoring was unavailable, so this \
             score is based on answer length only."
        ),
        confidence: FALLBACK_CONFIDENCE,
        linguistic_metrics: linguistic,
        sentiment_metrics: sentiment,
        adjustments: Adjustments::default(),
        source: RatingSource::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays a fixed response; `None` simulates a failed call.
    struct ScriptedRater {
        response: Option<String>,
        calls: AtomicUsize,
    }

    impl ScriptedRater {
        fn new(response: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                response: response.map(str::to_string),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SemanticRater for ScriptedRater {
        async fn rate(&self, _question: &Question, _answer: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().ok_or(LlmError::EmptyContent)
        }
    }

    fn question() -> Question {
        Question {
            question: "Tell me about a hard bug you fixed.".into(),
            kind: "behavioral".into(),
            difficulty: "medium".into(),
            category: "debugging".into(),
            expected_points: vec!["situation".into(), "result".into()],
            time_limit: 180,
        }
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[tokio::test]
    async fn test_structured_rating_is_adjusted() {
        let rater = ScriptedRater::new(Some(
            r#"{"overall_score": 8, "detailed_scores": {"clarity": 9},
                "strengths": ["Specific"], "improvements": ["Shorter"],
                "feedback": "Good.", "confidence": 0.8}"#,
        ));
        let evaluator = AnswerEvaluator::new(rater.clone());
        let eval = evaluator.evaluate(&question(), &words(100)).await;

        assert_eq!(eval.source, RatingSource::Structured);
        assert_eq!(eval.overall_score, 8.0);
        assert_eq!(eval.detailed_scores.clarity, Some(9.0));
        assert_eq!(eval.confidence, 0.8);
        assert_eq!(eval.linguistic_metrics.word_count, 100);
        // 100 words: no length penalty; neutral text with no hedging: confidence 0
        assert_eq!(eval.adjustments.word_count, 0.0);
        assert_eq!(eval.adjustments.confidence, -0.25);
        let expected = round_to(
            (8.0 + eval.adjustments.readability - 0.25).clamp(1.0, 10.0),
            1,
        );
        assert_eq!(eval.final_score, expected);
        assert_eq!(rater.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_heuristic_rating_is_tagged() {
        let evaluator = AnswerEvaluator::new(ScriptedRater::new(Some("Overall 6, relevance 7")));
        let eval = evaluator.evaluate(&question(), &words(60)).await;
        assert_eq!(eval.source, RatingSource::Heuristic);
        assert_eq!(eval.overall_score, 6.0);
        assert_eq!(eval.detailed_scores.relevance, Some(7.0));
        assert_eq!(eval.detailed_scores.depth, Some(6.0));
        assert_eq!(eval.confidence, 0.7);
    }

    #[tokio::test]
    async fn test_failed_call_falls_back() {
        let rater = ScriptedRater::new(None);
        let evaluator = AnswerEvaluator::new(rater.clone());
        let eval = evaluator.evaluate(&question(), &words(40)).await;

        assert_eq!(eval.source, RatingSource::Fallback);
        assert_eq!(eval.overall_score, 5.0);
        assert_eq!(eval.final_score, 5.0);
        assert_eq!(eval.detailed_scores, DetailedScores::uniform(5.0));
        assert_eq!(eval.adjustments, Adjustments::default());
        assert_eq!(eval.confidence, 0.5);
        assert!(eval.feedback.contains("40 words"));
        // metrics are still computed on the fallback path
        assert_eq!(eval.linguistic_metrics.word_count, 40);
        // no retries
        assert_eq!(rater.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_json_falls_back() {
        let evaluator =
            AnswerEvaluator::new(ScriptedRater::new(Some(r#"{"overall_score": "eight"}"#)));
        let eval = evaluator.evaluate(&question(), &words(100)).await;
        assert_eq!(eval.source, RatingSource::Fallback);
        assert_eq!(eval.final_score, 7.0);
    }

    #[tokio::test]
    async fn test_empty_answer_falls_back_to_one() {
        let evaluator = AnswerEvaluator::new(ScriptedRater::new(None));
        let eval = evaluator.evaluate(&question(), "").await;
        assert_eq!(eval.final_score, 1.0);
        assert_eq!(eval.linguistic_metrics.word_count, 0);
    }

    #[test]
    fn test_fallback_score_buckets() {
        assert_eq!(fallback_score(0), 1.0);
        assert_eq!(fallback_score(10), 3.0);
        assert_eq!(fallback_score(19), 3.0);
        assert_eq!(fallback_score(20), 5.0);
        assert_eq!(fallback_score(40), 5.0);
        assert_eq!(fallback_score(100), 7.0);
        assert_eq!(fallback_score(150), 7.0);
        assert_eq!(fallback_score(151), 6.0);
        assert_eq!(fallback_score(200), 6.0);
    }

    #[test]
    fn test_word_count_adjustment_boundaries() {
        assert_eq!(word_count_adjustment(19), -1.0);
        assert_eq!(word_count_adjustment(20), -0.5);
        assert_eq!(word_count_adjustment(49), -0.5);
        assert_eq!(word_count_adjustment(50), 0.0);
        assert_eq!(word_count_adjustment(200), 0.0);
        assert_eq!(word_count_adjustment(201), -0.2);
        assert_eq!(word_count_adjustment(300), -0.2);
        assert_eq!(word_count_adjustment(301), -0.5);
    }

    #[test]
    fn test_final_score_is_clamped_and_rounded() {
        let bonus = Adjustments {
            word_count: 0.0,
            readability: 0.2,
            confidence: 0.25,
        };
        assert_eq!(final_score(10.0, &bonus), 10.0);

        let penalty = Adjustments {
            word_count: -1.0,
            readability: 0.0,
            confidence: -0.25,
        };
        assert_eq!(final_score(1.0, &penalty), 1.0);
        assert_eq!(final_score(7.0, &penalty), 5.8);
    }

    #[test]
    fn test_readability_bonus_range() {
        let sentiment = sentiment_metrics("");
        let mut linguistic = linguistic_metrics("one two three");
        for (score, expected) in [(29.9, 0.0), (30.0, 0.2), (70.0, 0.2), (70.1, 0.0)] {
            linguistic.readability_score = score;
            assert_eq!(adjustments(&linguistic, &sentiment).readability, expected);
        }
        // empty-text sentiment confidence is 0.5, so no confidence shift
        assert_eq!(adjustments(&linguistic, &sentiment).confidence, 0.0);
    }
}
