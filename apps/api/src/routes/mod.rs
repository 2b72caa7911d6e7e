pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

/// Upper bound for a multipart upload (résumé + job description).
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route("/api/v1/sessions/:id", get(handlers::handle_get_session))
        .route(
            "/api/v1/sessions/:id/questions",
            post(handlers::handle_generate_questions),
        )
        .route("/api/v1/sessions/:id/start", post(handlers::handle_start))
        .route(
            "/api/v1/sessions/:id/answers",
            post(handlers::handle_submit_answer),
        )
        .route("/api/v1/sessions/:id/end", post(handlers::handle_end))
        .route(
            "/api/v1/sessions/:id/telemetry",
            get(handlers::handle_live_telemetry),
        )
        .route(
            "/api/v1/sessions/:id/report",
            get(handlers::handle_get_report),
        )
        .route(
            "/api/v1/sessions/:id/export",
            get(handlers::handle_export),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::Config;
    use crate::evaluation::rating::LlmRater;
    use crate::evaluation::AnswerEvaluator;
    use crate::interview::SessionRegistry;
    use crate::llm_client::LlmClient;
    use crate::store::FileStore;
    use crate::telemetry::TelemetrySimulator;

    const BOUNDARY: &str = "interview-test-boundary";

    fn llm_text(text: &str) -> Value {
        json!({
            "content": [{"type": "text", "text": text}],
            "usage": {"input_tokens": 10, "output_tokens": 20}
        })
    }

    async fn mock_llm() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_string_contains("Rate this interview answer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(llm_text(
                r#"{"overall_score": 8, "detailed_scores": {"relevance": 8, "technical_accuracy": 7,
                    "clarity": 8, "completeness": 7, "examples": 6, "depth": 7},
                    "strengths": ["Concrete"], "improvements": ["Quantify impact"],
                    "feedback": "Good answer.", "confidence": 0.8}"#,
            )))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_string_contains("diverse interview questions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(llm_text(
                r#"[{"question": "How do you design an idempotent API?", "type": "technical"},
                    {"question": "Tell me about a missed deadline.", "type": "behavioral"}]"#,
            )))
            .mount(&server)
            .await;
        server
    }

    async fn test_app(llm_uri: String, dir: &std::path::Path) -> Router {
        let config = Config {
            anthropic_api_key: "test-key".into(),
            anthropic_base_url: llm_uri.clone(),
            port: 0,
            rust_log: "debug".into(),
            data_dir: dir.join("data"),
            exports_dir: dir.join("exports"),
            question_count: 2,
        };
        let store = Arc::new(
            FileStore::open(config.data_dir.clone(), config.exports_dir.clone())
                .await
                .unwrap(),
        );
        let llm = LlmClient::new(config.anthropic_api_key.clone(), llm_uri).unwrap();

        build_router(AppState {
            llm: llm.clone(),
            config,
            sessions: Arc::new(SessionRegistry::new(store.clone())),
            store: store.clone(),
            telemetry: Arc::new(TelemetrySimulator::new(Some(store))),
            evaluator: Arc::new(AnswerEvaluator::new(Arc::new(LlmRater(llm)))),
        })
    }

    /// Content type a browser would declare for the file name.
    fn part_content_type(filename: &str) -> &'static str {
        match filename.rsplit_once('.').map(|(_, ext)| ext) {
            Some("pdf") => "application/pdf",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("rtf") => "application/rtf",
            _ => "text/plain",
        }
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: {}\r\n\r\n",
                    part_content_type(filename)
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn upload_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        Request::post("/api/v1/sessions")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_empty(uri: &str) -> Request<Body> {
        Request::post(uri).body(Body::empty()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app("http://127.0.0.1:9".into(), dir.path()).await;
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "interviewer");
    }

    #[tokio::test]
    async fn test_full_interview_flow() {
        let server = mock_llm().await;
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(server.uri(), dir.path()).await;

        let (status, created) = send(
            &app,
            upload_request(&[
                ("resume", Some("resume.txt"), "Jane Doe. Backend engineer, 6 years of Rust."),
                ("job_description", None, "Senior Rust engineer for payments infrastructure."),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "created");
        let id = created["session_id"].as_str().unwrap().to_string();
        let base = format!("/api/v1/sessions/{id}");

        // answers before the interview starts are rejected
        let (status, body) = send(
            &app,
            post_json(&format!("{base}/answers"), json!({"question_index": 0, "answer_text": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        let (status, questions) = send(&app, post_empty(&format!("{base}/questions"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(questions["status"], "questions_ready");
        assert_eq!(questions["questions"].as_array().unwrap().len(), 2);

        let (status, started) = send(&app, post_empty(&format!("{base}/start"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(started["status"], "active");
        assert_eq!(
            started["first_question"]["question"],
            "How do you design an idempotent API?"
        );

        let answer = "I would require a client-generated idempotency key on every write, \
                      store the key with the response, and replay the stored response on retries.";
        let (status, scored) = send(
            &app,
            post_json(
                &format!("{base}/answers"),
                json!({"question_index": 0, "answer_text": answer}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(scored["evaluation"]["source"], "structured");
        assert_eq!(scored["evaluation"]["overall_score"], 8.0);
        assert_eq!(scored["next_question_index"], 1);

        let (status, _) = send(
            &app,
            post_json(
                &format!("{base}/answers"),
                json!({"question_index": 9, "answer_text": answer}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get(&format!("{base}/report"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, ended) = send(&app, post_empty(&format!("{base}/end"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ended["status"], "completed");
        assert_eq!(ended["report"]["questions_answered"], 1);
        assert_eq!(ended["report"]["total_questions"], 2);
        assert_eq!(ended["report"]["completion_rate"], 50.0);
        assert_eq!(ended["report"]["strengths"], json!(["Concrete"]));

        // ending twice recomputes the same report
        let (status, again) = send(&app, post_empty(&format!("{base}/end"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["report"]["overall_score"], ended["report"]["overall_score"]);

        let (status, report) = send(&app, get(&format!("{base}/report"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["questions_answered"], 1);

        let (status, live) = send(&app, get(&format!("{base}/telemetry"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(live["running"], false);

        let response = app
            .clone()
            .oneshot(get(&format!("{base}/export")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains(&format!("interview_results_{id}_")));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let bundle: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(bundle["export_info"]["session_id"], id.as_str());
        assert_eq!(bundle["detailed_answers"].as_array().unwrap().len(), 1);

        // questions can no longer be regenerated
        let (status, _) = send(&app, post_empty(&format!("{base}/questions"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_missing_job_description_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app("http://127.0.0.1:9".into(), dir.path()).await;
        let (status, body) = send(
            &app,
            upload_request(&[("resume", Some("resume.txt"), "Jane Doe")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unreadable_upload_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app("http://127.0.0.1:9".into(), dir.path()).await;
        // an unsupported format, then a DOCX that is not a valid archive
        for resume in ["resume.rtf", "resume.docx"] {
            let (status, body) = send(
                &app,
                upload_request(&[
                    ("resume", Some(resume), "binary"),
                    ("job_description", None, "Rust engineer"),
                ]),
            )
            .await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{resume}");
            assert_eq!(body["error"]["code"], "UNPROCESSABLE_ENTITY");
        }
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app("http://127.0.0.1:9".into(), dir.path()).await;
        let id = uuid::Uuid::new_v4();
        for uri in [
            format!("/api/v1/sessions/{id}"),
            format!("/api/v1/sessions/{id}/telemetry"),
            format!("/api/v1/sessions/{id}/report"),
        ] {
            let (status, _) = send(&app, get(&uri)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_question_generation_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(server.uri(), dir.path()).await;

        let (_, created) = send(
            &app,
            upload_request(&[
                ("resume", Some("resume.txt"), "Jane Doe"),
                ("job_description", Some("jd.txt"), "Rust engineer"),
            ]),
        )
        .await;
        let id = created["session_id"].as_str().unwrap();

        let (status, body) =
            send(&app, post_empty(&format!("/api/v1/sessions/{id}/questions"))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "LLM_ERROR");

        // the session is untouched and can retry
        let (_, session) = send(&app, get(&format!("/api/v1/sessions/{id}"))).await;
        assert_eq!(session["status"], "created");
    }
}
