//! Question generation from a résumé and job description.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::prompts::{
    JD_PROMPT_CHARS, QUESTION_MAX_TOKENS, QUESTION_PROMPT_TEMPLATE, RESUME_PROMPT_CHARS,
};
use crate::llm_client::prompts::{fill_template, JSON_ONLY_SYSTEM};
use crate::llm_client::LlmClient;
use crate::models::session::Question;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.?\s*").expect("numbering pattern is valid"));

/// Lines considered when the response is not a JSON array.
const MAX_LINE_QUESTIONS: usize = 10;
const MIN_LINE_QUESTION_CHARS: usize = 10;

/// Asks the LLM for `count` tailored questions.
///
/// A failed call is an error; an unparseable response is not. It degrades to
/// line-derived questions, then to a fixed set of general questions.
pub async fn generate_questions(
    llm: &LlmClient,
    resume_text: &str,
    jd_text: &str,
    count: usize,
) -> Result<Vec<Question>, AppError> {
    let prompt = build_question_prompt(resume_text, jd_text, count);
    let text = llm
        .complete(&prompt, JSON_ONLY_SYSTEM, QUESTION_MAX_TOKENS)
        .await
        .map_err(|e| AppError::Llm(format!("Question generation failed: {e}")))?;

    let questions = parse_questions(&text);
    info!("Generated {} interview questions", questions.len());
    Ok(questions)
}

pub fn build_question_prompt(resume_text: &str, jd_text: &str, count: usize) -> String {
    let count = count.to_string();
    fill_template(
        QUESTION_PROMPT_TEMPLATE,
        &[
            ("question_count", count.as_str()),
            ("resume_text", truncate_chars(resume_text, RESUME_PROMPT_CHARS)),
            ("jd_text", truncate_chars(jd_text, JD_PROMPT_CHARS)),
        ],
    )
}

/// Prefix of at most `max` characters, cut on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

pub fn parse_questions(text: &str) -> Vec<Question> {
    if let Some(block) = outermost_json_array(text) {
        return match serde_json::from_str::<Vec<Question>>(block) {
            Ok(questions) if !questions.is_empty() => questions,
            Ok(_) => {
                warn!("LLM returned an empty question array; using default questions");
                fallback_questions()
            }
            Err(e) => {
                warn!("Malformed question JSON ({e}); using default questions");
                fallback_questions()
            }
        };
    }

    let from_lines = questions_from_lines(text);
    if from_lines.is_empty() {
        warn!("No questions found in LLM response; using default questions");
        fallback_questions()
    } else {
        warn!(
            "Question response was not JSON; derived {} questions from lines",
            from_lines.len()
        );
        from_lines
    }
}

fn outermost_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

fn questions_from_lines(text: &str) -> Vec<Question> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_LINE_QUESTIONS)
        .map(|line| LEADING_NUMBER.replace(line, "").into_owned())
        .filter(|line| line.chars().count() > MIN_LINE_QUESTION_CHARS)
        .map(|line| Question {
            question: line,
            kind: "general".to_string(),
            difficulty: "medium".to_string(),
            category: "general".to_string(),
            expected_points: strings(&[
                "Clear communication",
                "Relevant experience",
                "Problem-solving",
            ]),
            time_limit: 180,
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn fallback_questions() -> Vec<Question> {
    vec![
        Question {
            question: "Tell me about yourself and your relevant experience for this role."
                .to_string(),
            kind: "behavioral".to_string(),
            difficulty: "easy".to_string(),
            category: "introduction".to_string(),
            expected_points: strings(&[
                "Clear introduction",
                "Relevant experience",
                "Career goals",
            ]),
            time_limit: 180,
        },
        Question {
            question:
                "Describe a challenging project you worked on and how you overcame obstacles."
                    .to_string(),
            kind: "behavioral".to_string(),
            difficulty: "medium".to_string(),
            category: "problem-solving".to_string(),
            expected_points: strings(&[
                "Problem identification",
                "Solution approach",
                "Results achieved",
            ]),
            time_limit: 240,
        },
        Question {
            question: "How do you stay updated with the latest trends in your field?".to_string(),
            kind: "behavioral".to_string(),
            difficulty: "easy".to_string(),
            category: "learning".to_string(),
            expected_points: strings(&[
                "Learning methods",
                "Continuous improvement",
                "Industry awareness",
            ]),
            time_limit: 120,
        },
    ]
}
