// Prompt constants for interview question generation.

/// Question generation prompt.
/// Replace: {question_count}, {resume_text}, {jd_text}
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Based on the following resume and job description, generate {question_count} diverse interview questions.
Create a mix of technical, behavioral, and situational questions that are specific to the candidate's experience and the job requirements.

RESUME:
{resume_text}

JOB DESCRIPTION:
{jd_text}

Cover:
1. Technical skills and experience
2. Behavioral scenarios
3. Situational problem-solving
4. Role-specific competencies
5. Cultural fit

Return a JSON array with this EXACT schema:
[
  {
    "question": "Question text here",
    "type": "technical|behavioral|situational",
    "difficulty": "easy|medium|hard",
    "category": "relevant category",
    "expected_points": ["point1", "point2", "point3"],
    "time_limit": 180
  }
]

Each question must be relevant to both the resume and the job description, clear and
specific, and appropriate for the role level."#;

pub const QUESTION_MAX_TOKENS: u32 = 4000;

/// Prompt budget for the résumé, in characters.
pub const RESUME_PROMPT_CHARS: usize = 3000;
/// Prompt budget for the job description, in characters.
pub const JD_PROMPT_CHARS: usize = 2000;
