use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::AnswerEvaluator;
use crate::interview::SessionRegistry;
use crate::llm_client::LlmClient;
use crate::store::FileStore;
use crate::telemetry::TelemetrySimulator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    pub sessions: Arc<SessionRegistry>,
    pub store: Arc<FileStore>,
    /// Per-session telemetry tasks. Cancelled on shutdown.
    pub telemetry: Arc<TelemetrySimulator>,
    /// Pluggable rater behind the evaluator. Default: `LlmRater`.
    pub evaluator: Arc<AnswerEvaluator>,
}
