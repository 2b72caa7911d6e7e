//! Session Aggregator: folds a session's answers into the final `Report`.
//!
//! `finalize` is pure and deterministic. Every division is guarded, so a session with
//! no questions, no answers, or no telemetry still yields a well-formed report of zeros.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::evaluation::Metric;
use crate::models::report::{
    AveragedScores, BandShare, PerformanceCategory, Report, SessionMetadata, TypePerformance,
};
use crate::models::session::{Answer, Session};
use crate::models::telemetry::TelemetrySample;
use crate::report::recommendations::recommend;
use crate::stats::{mean, ratio, round_to};
use crate::telemetry::summary::summarize_session;

const TOP_THEMES: usize = 3;

/// Score bands, highest first, each lower-inclusive.
const BANDS: [(&str, f64); 6] = [
    ("9-10", 9.0),
    ("8-9", 8.0),
    ("7-8", 7.0),
    ("6-7", 6.0),
    ("5-6", 5.0),
    ("0-5", f64::NEG_INFINITY),
];

pub fn finalize(session: &Session) -> Report {
    let answers = &session.answers;
    let scores: Vec<f64> = answers.iter().map(|a| a.evaluation.final_score).collect();

    // Category and recommendations use the unrounded mean, like the per-type analysis.
    let overall = mean(&scores);
    let total_questions = session.questions.len();
    let questions_answered = answers.len();

    let sub_scores = sub_score_means(answers);
    let telemetry_summary = summarize_session(&session_samples(answers));
    let recommendations = recommend(overall, &sub_scores, &telemetry_summary);

    Report {
        overall_score: round_to(overall, 1),
        performance_category: PerformanceCategory::from_score(overall),
        total_questions,
        questions_answered,
        completion_rate: round_to(
            ratio(questions_answered as f64 * 100.0, total_questions as f64),
            1,
        ),
        interview_duration_minutes: duration_minutes(session.started_at, session.ended_at),
        detailed_scores: averaged_scores(&sub_scores),
        telemetry_summary,
        question_analysis: question_analysis(answers),
        strengths: most_frequent(answers.iter().flat_map(|a| &a.evaluation.strengths)),
        areas_for_improvement: most_frequent(
            answers.iter().flat_map(|a| &a.evaluation.improvements),
        ),
        recommendations,
        score_distribution: score_distribution(&scores),
        session_metadata: SessionMetadata {
            session_id: session.session_id,
            created_at: session.created_at,
            completed_at: session.ended_at,
        },
    }
}

fn duration_minutes(started: Option<DateTime<Utc>>, ended: Option<DateTime<Utc>>) -> f64 {
    match (started, ended) {
        (Some(start), Some(end)) => {
            round_to((end - start).num_milliseconds().max(0) as f64 / 60_000.0, 1)
        }
        _ => 0.0,
    }
}

/// Mean of each sub-score over the evaluations that reported it.
fn sub_score_means(answers: &[Answer]) -> Vec<(Metric, Option<f64>)> {
    Metric::ALL
        .into_iter()
        .map(|metric| {
            let values: Vec<f64> = answers
                .iter()
                .filter_map(|a| a.evaluation.detailed_scores.get(metric))
                .collect();
            let average = (!values.is_empty()).then(|| mean(&values));
            (metric, average)
        })
        .collect()
}

fn averaged_scores(sub_scores: &[(Metric, Option<f64>)]) -> AveragedScores {
    let value = |metric: Metric| {
        sub_scores
            .iter()
            .find(|(m, _)| *m == metric)
            .and_then(|(_, mean)| *mean)
            .map_or(0.0, |v| round_to(v, 1))
    };

    AveragedScores {
        relevance: value(Metric::Relevance),
        technical_accuracy: value(Metric::TechnicalAccuracy),
        clarity: value(Metric::Clarity),
        completeness: value(Metric::Completeness),
        examples: value(Metric::Examples),
        depth: value(Metric::Depth),
    }
}

/// Union of every answer's telemetry window. Windows of consecutive answers can
/// overlap, so samples are deduplicated by timestamp.
fn session_samples(answers: &[Answer]) -> Vec<TelemetrySample> {
    let mut seen = HashSet::new();
    answers
        .iter()
        .flat_map(|a| &a.telemetry)
        .filter(|s| seen.insert(s.timestamp))
        .cloned()
        .collect()
}

/// Average score per question type, in order of first appearance.
fn question_analysis(answers: &[Answer]) -> Vec<TypePerformance> {
    let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
    for answer in answers {
        let score = answer.evaluation.final_score;
        match groups.iter_mut().find(|(kind, _)| *kind == answer.question_type) {
            Some((_, scores)) => scores.push(score),
            None => groups.push((answer.question_type.as_str(), vec![score])),
        }
    }

    groups
        .into_iter()
        .map(|(kind, scores)| {
            let average = mean(&scores);
            TypePerformance {
                question_type: kind.to_string(),
                average_score: round_to(average, 1),
                question_count: scores.len(),
                performance_level: PerformanceCategory::from_score(average),
            }
        })
        .collect()
}

/// The three most frequent items; ties keep first-occurrence order.
fn most_frequent<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item.as_str()) {
            Some((_, count)) => *count += 1,
            None => counts.push((item.as_str(), 1)),
        }
    }
    // stable sort keeps first-occurrence order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(TOP_THEMES)
        .map(|(item, _)| item.to_string())
        .collect()
}

fn band_index(score: f64) -> usize {
    BANDS
        .iter()
        .position(|(_, floor)| score >= *floor)
        .unwrap_or(BANDS.len() - 1)
}

/// Percentage of scores per band, one decimal each.
///
/// Rounded with the largest-remainder method in tenths of a percent so a non-empty
/// distribution always sums to exactly 100.0.
fn score_distribution(scores: &[f64]) -> Vec<BandShare> {
    if scores.is_empty() {
        return Vec::new();
    }

    let mut counts = [0usize; BANDS.len()];
    for &score in scores {
        counts[band_index(score)] += 1;
    }

    const TENTHS: usize = 1000;
    let total = scores.len();
    let mut tenths: Vec<usize> = counts.iter().map(|c| c * TENTHS / total).collect();
    let remainders: Vec<usize> = counts.iter().map(|c| c * TENTHS % total).collect();

    let leftover = TENTHS - tenths.iter().sum::<usize>();
    let mut order: Vec<usize> = (0..BANDS.len()).collect();
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]));
    for &i in order.iter().take(leftover) {
        tenths[i] += 1;
    }

    BANDS
        .iter()
        .zip(tenths)
        .map(|((band, _), t)| BandShare {
            band: band.to_string(),
            percentage: t as f64 / 10.0,
        })
        .collect()
}
