//! In-memory session registry backed by the durable store.
//!
//! Every successful mutation is written through to disk before it becomes visible.
//! A lookup miss falls back to the store, so sessions outlive a restart.
//!
//! The map lock is only held to look up or insert an entry. Each session has its own
//! mutex, held across the disk write, so updates to one session never stall another.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::Session;
use crate::store::FileStore;

type SessionEntry = Arc<Mutex<Session>>;

pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    store: Arc<FileStore>,
}

impl SessionRegistry {
    pub fn new(store: Arc<FileStore>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            store,
        }
    }

    pub async fn insert(&self, session: Session) -> Result<(), AppError> {
        self.store.save_session(&session).await?;
        self.sessions
            .write()
            .await
            .insert(session.session_id, Arc::new(Mutex::new(session)));
        Ok(())
    }

    /// Snapshot of a session.
    pub async fn get(&self, session_id: Uuid) -> Result<Session, AppError> {
        let entry = self.entry(session_id).await?;
        let session = entry.lock().await;
        Ok(session.clone())
    }

    /// Applies `f` to a copy of the session, persists the copy, then publishes it.
    ///
    /// If `f` or the write fails, the registry keeps the previous state.
    pub async fn update<T, F>(&self, session_id: Uuid, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Session) -> Result<T, AppError>,
    {
        let entry = self.entry(session_id).await?;
        let mut current = entry.lock().await;

        let mut draft = current.clone();
        let output = f(&mut draft)?;
        self.store.save_session(&draft).await?;
        *current = draft;
        Ok(output)
    }

    async fn entry(&self, session_id: Uuid) -> Result<SessionEntry, AppError> {
        if let Some(entry) = self.sessions.read().await.get(&session_id) {
            return Ok(entry.clone());
        }

        let session = self
            .store
            .load_session(session_id)
            .await?
            .ok_or_else(|| not_found(session_id))?;
        info!("Loaded session {session_id} from the store");

        let mut sessions = self.sessions.write().await;
        Ok(sessions
            .entry(session_id)
            .or_insert_with(|| Arc::new(Mutex::new(session)))
            .clone())
    }
}

fn not_found(session_id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {session_id} not found"))
}
