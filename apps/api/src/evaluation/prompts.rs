// Prompt constants for answer rating.

/// Rating prompt template.
/// Replace: {question}, {question_type}, {expected_points}, {answer}
pub const RATING_PROMPT_TEMPLATE: &str = r#"Rate this interview answer comprehensively on a scale of 1-10 considering multiple criteria.

QUESTION: {question}
QUESTION TYPE: {question_type}
EXPECTED POINTS: {expected_points}

CANDIDATE ANSWER: {answer}

Evaluate based on:
1. RELEVANCE (1-10): How well does the answer address the question?
2. TECHNICAL ACCURACY (1-10): Correctness of technical information (if applicable)
3. CLARITY (1-10): How clear and well-structured is the communication?
4. COMPLETENESS (1-10): Does the answer cover all important aspects?
5. EXAMPLES (1-10): Quality and relevance of examples provided
6. DEPTH (1-10): Level of insight and understanding demonstrated

Also provide an overall score (1-10), the top 3 strengths, the top 3 areas for
improvement, and specific feedback for the candidate.

Return a JSON object with this EXACT schema:
{
  "overall_score": 7,
  "detailed_scores": {
    "relevance": 7,
    "technical_accuracy": 7,
    "clarity": 7,
    "completeness": 7,
    "examples": 7,
    "depth": 7
  },
  "strengths": ["strength1", "strength2", "strength3"],
  "improvements": ["improvement1", "improvement2", "improvement3"],
  "feedback": "Detailed feedback paragraph",
  "confidence": 0.8
}"#;

pub const RATING_MAX_TOKENS: u32 = 2000;
