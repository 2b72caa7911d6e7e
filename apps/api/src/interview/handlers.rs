//! Axum route handlers for the Interview API. One handler per session phase.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::interview::questions::generate_questions;
use crate::models::evaluation::Evaluation;
use crate::models::report::Report;
use crate::models::session::{Answer, Question, Session, SessionStatus};
use crate::models::telemetry::{TelemetrySample, TelemetrySummary};
use crate::report::finalize;
use crate::state::AppState;
use crate::telemetry::summary::summarize;

/// Telemetry attached to an answer: samples from the last two minutes.
const ANSWER_WINDOW_SECS: i64 = 120;
/// Samples returned by the live telemetry endpoint.
const LIVE_SAMPLE_COUNT: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub resume_chars: usize,
    pub jd_chars: usize,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub total_questions: usize,
    pub first_question: Question,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_index: usize,
    pub answer_text: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub question_index: usize,
    pub evaluation: Evaluation,
    pub telemetry_summary: TelemetrySummary,
    pub questions_answered: usize,
    pub total_questions: usize,
    pub next_question_index: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct EndResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub report: Report,
}

#[derive(Debug, Serialize)]
pub struct LiveTelemetryResponse {
    pub session_id: Uuid,
    pub running: bool,
    pub samples: Vec<TelemetrySample>,
}

/// One multipart file or text field.
struct Upload {
    filename: String,
    content_type: Option<String>,
    bytes: bytes::Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Multipart fields `resume` and `job_description`, each a PDF or text file.
/// `job_description` may also be sent as a plain text field.
pub async fn handle_create_session(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let mut resume = None;
    let mut job_description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{name}.txt"));
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;

        let upload = Upload {
            filename,
            content_type,
            bytes,
        };
        match name.as_str() {
            "resume" => resume = Some(upload),
            "job_description" => job_description = Some(upload),
            other => debug!("Ignoring multipart field '{other}'"),
        }
    }

    let resume = resume.ok_or_else(|| AppError::Validation("Missing 'resume' file".into()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::Validation("Missing 'job_description' file".into()))?;

    let resume_text = extract_upload(resume).await?;
    let jd_text = extract_upload(job_description).await?;

    let session = Session::new(resume_text, jd_text);
    let response = CreateSessionResponse {
        session_id: session.session_id,
        status: session.status,
        resume_chars: session.resume_text.chars().count(),
        jd_chars: session.jd_text.chars().count(),
    };
    state.sessions.insert(session).await?;
    info!("Created session {}", response.session_id);

    Ok((StatusCode::CREATED, Json(response)))
}

async fn extract_upload(upload: Upload) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || {
        extract_text(
            &upload.filename,
            upload.content_type.as_deref(),
            &upload.bytes,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;
    Ok(text)
}

/// POST /api/v1/sessions/:id/questions
///
/// Generates (or regenerates) questions. Not allowed once the interview has started.
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let session = state.sessions.get(session_id).await?;
    ensure_can_generate(session.status)?;

    let questions = generate_questions(
        &state.llm,
        &session.resume_text,
        &session.jd_text,
        state.config.question_count,
    )
    .await?;

    let response = state
        .sessions
        .update(session_id, move |s| {
            ensure_can_generate(s.status)?;
            s.questions = questions;
            s.status = SessionStatus::QuestionsReady;
            Ok(QuestionsResponse {
                session_id,
                status: s.status,
                questions: s.questions.clone(),
            })
        })
        .await?;

    info!(
        "Session {session_id}: {} questions ready",
        response.questions.len()
    );
    Ok(Json(response))
}

fn ensure_can_generate(status: SessionStatus) -> Result<(), AppError> {
    match status {
        SessionStatus::Created | SessionStatus::QuestionsReady => Ok(()),
        other => Err(AppError::Conflict(format!(
            "Questions cannot be generated for a session that is {other:?}"
        ))),
    }
}

/// POST /api/v1/sessions/:id/start
///
/// Marks the session active and starts telemetry. Idempotent while active.
pub async fn handle_start(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<StartResponse>, AppError> {
    let response = state
        .sessions
        .update(session_id, |s| {
            match s.status {
                SessionStatus::QuestionsReady => {
                    s.status = SessionStatus::Active;
                    s.started_at = Some(Utc::now());
                }
                SessionStatus::Active => {}
                other => {
                    return Err(AppError::Conflict(format!(
                        "Interview cannot start from status {other:?}"
                    )))
                }
            }
            let first_question = s.questions.first().cloned().ok_or_else(|| {
                AppError::Validation("Session has no questions; generate them first".into())
            })?;
            Ok(StartResponse {
                session_id,
                status: s.status,
                started_at: s.started_at,
                total_questions: s.questions.len(),
                first_question,
            })
        })
        .await?;

    state.telemetry.start(session_id).await;
    info!("Session {session_id}: interview active");
    Ok(Json(response))
}

/// POST /api/v1/sessions/:id/answers
///
/// Evaluates the answer and attaches the recent telemetry window. Re-submitting an
/// answer for the same question replaces the earlier one.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let session = state.sessions.get(session_id).await?;
    ensure_active(session.status)?;
    let question = session
        .questions
        .get(request.question_index)
        .cloned()
        .ok_or_else(|| {
            AppError::Validation(format!(
                "question_index {} is out of range (session has {} questions)",
                request.question_index,
                session.questions.len()
            ))
        })?;

    let evaluation = state
        .evaluator
        .evaluate(&question, &request.answer_text)
        .await;
    let telemetry = state
        .telemetry
        .recent_window(session_id, ANSWER_WINDOW_SECS)
        .await;
    let telemetry_summary = summarize(&telemetry);

    let answer = Answer {
        question_index: request.question_index,
        question: question.question,
        question_type: question.kind,
        answer: request.answer_text,
        evaluation: evaluation.clone(),
        telemetry,
        telemetry_summary: telemetry_summary.clone(),
        submitted_at: Utc::now(),
    };

    let index = request.question_index;
    let (questions_answered, total_questions) = state
        .sessions
        .update(session_id, move |s| {
            ensure_active(s.status)?;
            match s.answers.iter().position(|a| a.question_index == index) {
                Some(pos) => s.answers[pos] = answer,
                None => s.answers.push(answer),
            }
            Ok((s.answers.len(), s.questions.len()))
        })
        .await?;

    info!(
        "Session {session_id}: answer {index} scored {} ({:?})",
        evaluation.final_score, evaluation.source
    );

    Ok(Json(SubmitAnswerResponse {
        question_index: index,
        evaluation,
        telemetry_summary,
        questions_answered,
        total_questions,
        next_question_index: (index + 1 < total_questions).then_some(index + 1),
    }))
}

fn ensure_active(status: SessionStatus) -> Result<(), AppError> {
    if status == SessionStatus::Active {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "Answers are only accepted while the interview is active (status {status:?})"
        )))
    }
}

/// POST /api/v1/sessions/:id/end
///
/// Completes the interview and computes the report. Calling it again on a completed
/// session recomputes the same report.
pub async fn handle_end(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<EndResponse>, AppError> {
    let report = state
        .sessions
        .update(session_id, |s| {
            match s.status {
                SessionStatus::Active => {
                    s.status = SessionStatus::Completed;
                    s.ended_at = Some(Utc::now());
                }
                SessionStatus::Completed => {}
                other => {
                    return Err(AppError::Conflict(format!(
                        "Interview cannot end from status {other:?}"
                    )))
                }
            }
            let report = finalize(s);
            s.report = Some(report.clone());
            Ok(report)
        })
        .await?;

    state.telemetry.stop(session_id).await;
    state.store.save_report(session_id, &report).await?;
    info!(
        "Session {session_id}: completed with overall score {}",
        report.overall_score
    );

    Ok(Json(EndResponse {
        session_id,
        status: SessionStatus::Completed,
        report,
    }))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.sessions.get(session_id).await?))
}

/// GET /api/v1/sessions/:id/telemetry
pub async fn handle_live_telemetry(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<LiveTelemetryResponse>, AppError> {
    // 404 for unknown sessions rather than an empty feed
    state.sessions.get(session_id).await?;

    Ok(Json(LiveTelemetryResponse {
        session_id,
        running: state.telemetry.is_running(session_id).await,
        samples: state.telemetry.latest(session_id, LIVE_SAMPLE_COUNT).await,
    }))
}

/// GET /api/v1/sessions/:id/report
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Report>, AppError> {
    let session = state.sessions.get(session_id).await?;
    match (session.status, session.report) {
        (SessionStatus::Completed, Some(report)) => Ok(Json(report)),
        _ => Err(AppError::NotFound(format!(
            "No report for session {session_id}; the interview has not been completed"
        ))),
    }
}

/// GET /api/v1/sessions/:id/export
///
/// Writes the export bundle to the exports directory and returns it as a download.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.get(session_id).await?;
    let (path, bundle) = state.store.export(&session).await?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("interview_results_{session_id}.json"));
    let disposition = format!("attachment; filename=\"{filename}\"");

    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(bundle)))
}
