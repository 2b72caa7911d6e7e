//! Local linguistic metrics: counts plus Flesch readability.

use crate::models::evaluation::LinguisticMetrics;
use crate::stats::{ratio, round_to};

/// Used when the text has no words the readability formulas can score.
const DEFAULT_READABILITY: f64 = 50.0;
const DEFAULT_GRADE_LEVEL: f64 = 10.0;

pub fn linguistic_metrics(text: &str) -> LinguisticMetrics {
    if text.trim().is_empty() {
        return LinguisticMetrics {
            word_count: 0,
            sentence_count: 0,
            avg_sentence_length: 0.0,
            readability_score: 0.0,
            grade_level: 0.0,
        };
    }

    let word_count = word_count(text);
    let sentence_count = text.split('.').filter(|s| !s.trim().is_empty()).count();
    let avg_sentence_length = round_to(word_count as f64 / sentence_count.max(1) as f64, 1);

    let (readability_score, grade_level) =
        readability(text).unwrap_or((DEFAULT_READABILITY, DEFAULT_GRADE_LEVEL));

    LinguisticMetrics {
        word_count,
        sentence_count,
        avg_sentence_length,
        readability_score,
        grade_level,
    }
}

/// Whitespace-delimited token count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Flesch reading ease and Flesch–Kincaid grade, or `None` when the text has no
/// alphabetic words.
fn readability(text: &str) -> Option<(f64, f64)> {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphabetic())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return None;
    }

    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| s.chars().any(char::is_alphabetic))
        .count()
        .max(1);
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words_per_sentence = ratio(words.len() as f64, sentences as f64);
    let syllables_per_word = ratio(syllables as f64, words.len() as f64);

    let reading_ease = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    let grade = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;

    Some((round_to(reading_ease, 2), round_to(grade, 1)))
}

/// Vowel-group syllable estimate for a lowercase alphabetic word. Always at least 1.
fn count_syllables(word: &str) -> usize {
    let chars: Vec<char> = word.chars().collect();
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut count = 0;
    let mut previous_vowel = false;
    for &c in &chars {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    // silent trailing 'e' ("make"), but not "-le" ("table")
    if count > 1 && word.ends_with('e') && !word.ends_with("le") {
        count -= 1;
    }

    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_all_zero() {
        let m = linguistic_metrics("   ");
        assert_eq!(m.word_count, 0);
        assert_eq!(m.sentence_count, 0);
        assert_eq!(m.readability_score, 0.0);
        assert_eq!(m.grade_level, 0.0);
    }

    #[test]
    fn test_counts() {
        let m = linguistic_metrics("I built a cache. It was fast.. Users liked it");
        assert_eq!(m.word_count, 10);
        // empty fragment between the two dots is dropped
        assert_eq!(m.sentence_count, 3);
        assert_eq!(m.avg_sentence_length, 3.3);
    }

    #[test]
    fn test_simple_text_is_very_readable() {
        let m = linguistic_metrics("The cat sat on the mat.");
        // 6 words, 1 sentence, 6 syllables: 206.835 - 6.09 - 84.6
        assert!((m.readability_score - 116.15).abs() < 0.02, "{}", m.readability_score);
    }

    #[test]
    fn test_dense_text_is_harder() {
        let simple = linguistic_metrics("We fixed the bug. It took a day. Then we shipped.");
        let dense = linguistic_metrics(
            "Implementing comprehensive observability infrastructure necessitated \
             considerable organizational coordination.",
        );
        assert!(dense.readability_score < simple.readability_score);
        assert!(dense.grade_level > simple.grade_level);
    }

    #[test]
    fn test_numeric_only_text_uses_defaults() {
        let m = linguistic_metrics("42 17 99");
        assert_eq!(m.word_count, 3);
        assert_eq!(m.readability_score, 50.0);
        assert_eq!(m.grade_level, 10.0);
    }

    #[test]
    fn test_syllables() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("rhythm"), 1);
        assert_eq!(count_syllables("infrastructure"), 4);
    }
}
