//! JSON-file durable store for session records, telemetry logs, computed reports,
//! and export bundles.
//!
//! Layout under the data directory:
//! - `sessions/<id>.json`  : overwritten after every mutation
//! - `telemetry/<id>.jsonl`: append-only, one sample per line
//! - `results/<id>.json`   : latest computed report
//!
//! Exports land in a separate directory as `interview_results_<id>_<timestamp>.json`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::evaluation::Evaluation;
use crate::models::report::Report;
use crate::models::session::Session;
use crate::models::telemetry::{TelemetrySample, TelemetrySummary};

const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportInfo {
    pub exported_at: DateTime<Utc>,
    pub session_id: Uuid,
    pub export_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub question_number: usize,
    pub question: String,
    pub answer: String,
    pub evaluation: Evaluation,
    pub telemetry_summary: TelemetrySummary,
    pub submitted_at: DateTime<Utc>,
}

/// Everything a candidate downloads at the end of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportBundle {
    pub export_info: ExportInfo,
    pub session: Session,
    pub summary: Option<Report>,
    pub detailed_answers: Vec<AnswerDetail>,
    pub telemetry_log: Vec<TelemetrySample>,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
    exports_dir: PathBuf,
}

impl FileStore {
    /// Opens the store, creating every directory it writes to.
    pub async fn open(
        data_dir: impl Into<PathBuf>,
        exports_dir: impl Into<PathBuf>,
    ) -> Result<Self, StoreError> {
        let store = Self {
            data_dir: data_dir.into(),
            exports_dir: exports_dir.into(),
        };

        for dir in [
            store.data_dir.join("sessions"),
            store.data_dir.join("telemetry"),
            store.data_dir.join("results"),
            store.exports_dir.clone(),
        ] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|source| StoreError::Io { path: dir, source })?;
        }

        info!("File store ready at {}", store.data_dir.display());
        Ok(store)
    }

    pub async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        let path = self.session_path(session.session_id);
        write_json(&path, session).await?;
        debug!("Saved session {}", session.session_id);
        Ok(())
    }

    pub async fn load_session(&self, session_id: Uuid) -> Result<Option<Session>, StoreError> {
        read_json(&self.session_path(session_id)).await
    }

    /// Appends samples to the session's telemetry log, one JSON object per line.
    pub async fn append_telemetry(
        &self,
        session_id: Uuid,
        samples: &[TelemetrySample],
    ) -> Result<(), StoreError> {
        if samples.is_empty() {
            return Ok(());
        }
        let path = self.telemetry_path(session_id);

        let mut lines = String::new();
        for sample in samples {
            lines.push_str(&serde_json::to_string(sample)?);
            lines.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| io_error(&path, source))?;
        file.write_all(lines.as_bytes())
            .await
            .map_err(|source| io_error(&path, source))?;
        Ok(())
    }

    /// Reads the full telemetry log; empty if nothing was recorded.
    pub async fn load_telemetry(&self, session_id: Uuid) -> Result<Vec<TelemetrySample>, StoreError> {
        let path = self.telemetry_path(session_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(io_error(&path, source)),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StoreError::from))
            .collect()
    }

    pub async fn save_report(&self, session_id: Uuid, report: &Report) -> Result<(), StoreError> {
        write_json(&self.data_dir.join("results").join(format!("{session_id}.json")), report).await
    }

    /// Builds the export bundle for a session and writes it to the exports directory.
    pub async fn export(&self, session: &Session) -> Result<(PathBuf, ExportBundle), StoreError> {
        let now = Utc::now();
        let telemetry_log = self.load_telemetry(session.session_id).await?;

        let detailed_answers = session
            .answers
            .iter()
            .enumerate()
            .map(|(i, a)| AnswerDetail {
                question_number: i + 1,
                question: a.question.clone(),
                answer: a.answer.clone(),
                evaluation: a.evaluation.clone(),
                telemetry_summary: a.telemetry_summary.clone(),
                submitted_at: a.submitted_at,
            })
            .collect();

        let bundle = ExportBundle {
            export_info: ExportInfo {
                exported_at: now,
                session_id: session.session_id,
                export_version: EXPORT_VERSION.to_string(),
            },
            session: session.clone(),
            summary: session.report.clone(),
            detailed_answers,
            telemetry_log,
        };

        let filename = format!(
            "interview_results_{}_{}.json",
            session.session_id,
            now.format("%Y%m%d_%H%M%S")
        );
        let path = self.exports_dir.join(filename);
        write_json(&path, &bundle).await?;
        info!("Exported session {} to {}", session.session_id, path.display());

        Ok((path, bundle))
    }

    fn session_path(&self, session_id: Uuid) -> PathBuf {
        self.data_dir
            .join("sessions")
            .join(format!("{session_id}.json"))
    }

    fn telemetry_path(&self, session_id: Uuid) -> PathBuf {
        self.data_dir
            .join("telemetry")
            .join(format!("{session_id}.jsonl"))
    }
}

/// Writes pretty JSON through a temp file + rename so readers never see a partial record.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|source| io_error(&tmp, source))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| io_error(path, source))
}

async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(io_error(path, source)),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::summary::fixtures::samples_with_yaw;

    async fn temp_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data"), dir.path().join("exports"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_open_creates_directories() {
        let (dir, _store) = temp_store().await;
        for sub in ["sessions", "telemetry", "results"] {
            assert!(dir.path().join("data").join(sub).is_dir());
        }
        assert!(dir.path().join("exports").is_dir());
    }

    #[tokio::test]
    async fn test_session_save_overwrites() {
        let (_dir, store) = temp_store().await;
        let mut session = Session::new("resume".into(), "jd".into());
        store.save_session(&session).await.unwrap();

        session.jd_text = "updated jd".into();
        store.save_session(&session).await.unwrap();

        let loaded = store.load_session(session.session_id).await.unwrap().unwrap();
        assert_eq!(loaded.jd_text, "updated jd");
    }

    #[tokio::test]
    async fn test_load_missing_session_is_none() {
        let (_dir, store) = temp_store().await;
        assert!(store.load_session(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_telemetry_log_is_append_only() {
        let (_dir, store) = temp_store().await;
        let id = Uuid::new_v4();
        let samples = samples_with_yaw(&[1.0, 2.0, 3.0], 80.0, 90.0);

        store.append_telemetry(id, &samples[..2]).await.unwrap();
        store.append_telemetry(id, &samples[2..]).await.unwrap();

        let logged = store.load_telemetry(id).await.unwrap();
        assert_eq!(logged.len(), 3);
        let yaws: Vec<f64> = logged.iter().map(|s| s.head_pose.yaw).collect();
        assert_eq!(yaws, [1.0, 2.0, 3.0]);
        assert_eq!(logged[0].timestamp, samples[0].timestamp);
    }

    #[tokio::test]
    async fn test_missing_telemetry_log_is_empty() {
        let (_dir, store) = temp_store().await;
        assert!(store.load_telemetry(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_writes_bundle() {
        let (_dir, store) = temp_store().await;
        let session = Session::new("resume".into(), "jd".into());
        store
            .append_telemetry(session.session_id, &samples_with_yaw(&[0.0], 80.0, 90.0))
            .await
            .unwrap();

        let (path, bundle) = store.export(&session).await.unwrap();
        assert!(path.exists());
        assert_eq!(bundle.export_info.export_version, "1.0");
        assert_eq!(bundle.telemetry_log.len(), 1);
        assert!(bundle.summary.is_none());

        let on_disk: ExportBundle =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(on_disk.session.session_id, session.session_id);
    }
}
