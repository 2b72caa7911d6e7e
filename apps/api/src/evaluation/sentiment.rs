//! Lexicon-based sentiment and a confidence estimate from hedging vs. assertive phrasing.
//!
//! Polarity follows the usual valence-lexicon approach: each known word carries a
//! valence, a preceding booster strengthens it, a negation in the previous three
//! tokens flips and dampens it, and the sum is squashed into [-1, 1].

use crate::models::evaluation::{Sentiment, SentimentMetrics};
use crate::stats::round_to;

const POSITIVE_THRESHOLD: f64 = 0.05;
const NEGATIVE_THRESHOLD: f64 = -0.05;
/// Normalization constant for the compound score.
const COMPOUND_ALPHA: f64 = 15.0;
const BOOSTER_INCREMENT: f64 = 0.293;
const NEGATION_SCALAR: f64 = -0.74;
const NEGATION_LOOKBACK: usize = 3;
const PHRASE_WEIGHT: f64 = 0.1;

const LEXICON: &[(&str, f64)] = &[
    // positive
    ("absolutely", 1.5),
    ("achieved", 1.8),
    ("benefit", 2.0),
    ("best", 3.2),
    ("better", 1.9),
    ("certain", 1.1),
    ("clear", 1.6),
    ("clearly", 1.7),
    ("confident", 2.2),
    ("definitely", 1.7),
    ("easy", 1.9),
    ("effective", 2.1),
    ("efficient", 1.8),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("excited", 2.2),
    ("exciting", 2.2),
    ("fantastic", 2.6),
    ("good", 1.9),
    ("great", 3.1),
    ("growth", 1.6),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("impressive", 2.4),
    ("improve", 1.9),
    ("improved", 2.0),
    ("innovative", 1.8),
    ("learned", 1.3),
    ("love", 3.2),
    ("nice", 1.8),
    ("opportunity", 1.8),
    ("outstanding", 3.0),
    ("passionate", 2.4),
    ("positive", 2.6),
    ("proud", 2.1),
    ("reliable", 1.9),
    ("solved", 1.9),
    ("strong", 2.3),
    ("success", 2.7),
    ("successful", 2.4),
    ("successfully", 2.3),
    ("support", 1.7),
    ("sure", 1.3),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("won", 2.7),
    // negative
    ("afraid", -2.2),
    ("angry", -2.3),
    ("awful", -2.0),
    ("bad", -2.5),
    ("blame", -1.4),
    ("broken", -1.9),
    ("bug", -0.9),
    ("confused", -1.3),
    ("conflict", -1.3),
    ("crash", -1.7),
    ("delay", -1.3),
    ("delayed", -0.9),
    ("difficult", -1.5),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("frustrated", -2.2),
    ("frustrating", -2.2),
    ("hate", -2.7),
    ("lose", -1.7),
    ("lost", -1.3),
    ("mistake", -1.5),
    ("mistakes", -1.5),
    ("poor", -2.1),
    ("problem", -1.7),
    ("problems", -1.7),
    ("risk", -1.1),
    ("sadly", -1.9),
    ("stress", -1.8),
    ("stressful", -2.0),
    ("struggle", -1.5),
    ("struggled", -1.4),
    ("terrible", -2.1),
    ("uncertain", -1.2),
    ("unclear", -1.0),
    ("unfortunately", -1.5),
    ("weak", -1.9),
    ("worried", -1.6),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
];

const BOOSTERS: &[&str] = &[
    "very",
    "really",
    "extremely",
    "highly",
    "incredibly",
    "so",
    "truly",
    "remarkably",
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "cannot", "without",
];

const CONFIDENCE_PHRASES: &[&str] = &[
    "confident",
    "certain",
    "sure",
    "definitely",
    "absolutely",
    "clearly",
    "obviously",
    "undoubtedly",
    "experience shows",
    "i know",
    "i'm experienced",
    "i've successfully",
];

const UNCERTAINTY_PHRASES: &[&str] = &[
    "maybe",
    "perhaps",
    "possibly",
    "might",
    "could be",
    "i think",
    "i guess",
    "not sure",
    "uncertain",
    "probably",
];

pub fn sentiment_metrics(text: &str) -> SentimentMetrics {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return SentimentMetrics {
            sentiment: Sentiment::Neutral,
            compound: 0.0,
            confidence_score: 0.5,
            positive_score: 0.0,
            negative_score: 0.0,
            neutral_score: 1.0,
        };
    }

    let mut sum = 0.0;
    let mut positive_sum = 0.0;
    let mut negative_sum = 0.0;
    let mut neutral_count = 0.0;

    for (i, token) in tokens.iter().enumerate() {
        let Some(mut valence) = valence(token) else {
            neutral_count += 1.0;
            continue;
        };
        if i > 0 && BOOSTERS.contains(&tokens[i - 1].as_str()) {
            valence += BOOSTER_INCREMENT * valence.signum();
        }
        if tokens[i.saturating_sub(NEGATION_LOOKBACK)..i]
            .iter()
            .any(|t| is_negation(t))
        {
            valence *= NEGATION_SCALAR;
        }

        sum += valence;
        if valence > 0.0 {
            positive_sum += valence + 1.0;
        } else {
            negative_sum += valence - 1.0;
        }
    }

    let compound = round_to(
        (sum / (sum * sum + COMPOUND_ALPHA).sqrt()).clamp(-1.0, 1.0),
        4,
    );
    let total = positive_sum + negative_sum.abs() + neutral_count;

    let sentiment = if compound >= POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else if compound <= NEGATIVE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    let confident = count_phrase_hits(&tokens, CONFIDENCE_PHRASES) as f64;
    let uncertain = count_phrase_hits(&tokens, UNCERTAINTY_PHRASES) as f64;
    let confidence_score =
        round_to((compound.abs() + PHRASE_WEIGHT * (confident - uncertain)).clamp(0.0, 1.0), 2);

    SentimentMetrics {
        sentiment,
        compound,
        confidence_score,
        positive_score: round_to(positive_sum / total, 2),
        negative_score: round_to(negative_sum.abs() / total, 2),
        neutral_score: round_to(neutral_count / total, 2),
    }
}

/// Lowercased words with surrounding punctuation stripped; apostrophes are kept.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.replace('\u{2019}', "'")
                .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

fn valence(token: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(word, _)| *word == token)
        .map(|(_, v)| *v)
}

fn is_negation(token: &str) -> bool {
    NEGATIONS.contains(&token) || token.ends_with("n't")
}

/// Number of distinct phrases that occur as whole-word sequences in the tokens.
fn count_phrase_hits(tokens: &[String], phrases: &[&str]) -> usize {
    phrases
        .iter()
        .filter(|phrase| {
            let words: Vec<&str> = phrase.split_whitespace().collect();
            tokens
                .windows(words.len())
                .any(|window| window.iter().zip(&words).all(|(t, w)| t == w))
        })
        .count()
}
