use super::types::{CaptionEntry, NewCaptionEntry, Session, SessionStatus, SessionUpdate};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown session: {0}")]
    UnknownSession(String),

    #[error("session {0} is already completed")]
    SessionCompleted(String),

    #[error("caption text is empty")]
    EmptyText,
}

/// Durable record of sessions and their ordered caption entries
///
/// Writes after a session reaches `Completed` are rejected with
/// `StoreError::SessionCompleted`; the session itself is never deleted.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, source_language: &str, target_language: &str) -> Session;

    async fn get_session(&self, id: &str) -> Result<Session, StoreError>;

    /// Apply a partial update; always refreshes `updated_at`
    async fn update_session(&self, id: &str, update: SessionUpdate)
        -> Result<Session, StoreError>;

    /// Append one entry. Safe to call concurrently for the same session from
    /// overlapping in-flight requests.
    async fn append_entry(
        &self,
        session_id: &str,
        entry: NewCaptionEntry,
    ) -> Result<CaptionEntry, StoreError>;

    /// Entries sorted ascending by timestamp, regardless of append order
    async fn list_entries(&self, session_id: &str) -> Result<Vec<CaptionEntry>, StoreError>;

    async fn get_settings(&self, user_id: &str) -> Option<serde_json::Value>;

    async fn put_settings(&self, user_id: &str, settings: serde_json::Value);
}

struct SessionRecord {
    session: Session,
    entries: Vec<CaptionEntry>,
}

/// In-memory `SessionStore` backed by a single RwLock'd map
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
    settings: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            settings: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, source_language: &str, target_language: &str) -> Session {
        let now = Utc::now();
        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            status: SessionStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session.id.clone(),
            SessionRecord {
                session: session.clone(),
                entries: Vec::new(),
            },
        );

        debug!("Created session {}", session.id);

        session
    }

    async fn get_session(&self, id: &str) -> Result<Session, StoreError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .map(|record| record.session.clone())
            .ok_or_else(|| StoreError::UnknownSession(id.to_string()))
    }

    async fn update_session(
        &self,
        id: &str,
        update: SessionUpdate,
    ) -> Result<Session, StoreError> {
        let mut sessions = self.sessions.write().await;
        let record = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownSession(id.to_string()))?;

        // Completed is terminal: active and paused move freely between each
        // other and either may complete, but nothing leaves completed
        if record.session.status == SessionStatus::Completed {
            return Err(StoreError::SessionCompleted(id.to_string()));
        }

        if let Some(next) = update.status {
            record.session.status = next;
        }
        if let Some(source) = update.source_language {
            record.session.source_language = source;
        }
        if let Some(target) = update.target_language {
            record.session.target_language = target;
        }
        record.session.updated_at = Utc::now();

        Ok(record.session.clone())
    }

    async fn append_entry(
        &self,
        session_id: &str,
        entry: NewCaptionEntry,
    ) -> Result<CaptionEntry, StoreError> {
        let original_text = entry.original_text.trim().to_string();
        if original_text.is_empty() {
            return Err(StoreError::EmptyText);
        }

        let mut sessions = self.sessions.write().await;
        let record = sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::UnknownSession(session_id.to_string()))?;

        if record.session.status == SessionStatus::Completed {
            return Err(StoreError::SessionCompleted(session_id.to_string()));
        }

        let caption = CaptionEntry {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            original_text,
            translated_text: entry.translated_text,
            speaker_label: entry.speaker_label,
            timestamp: entry.timestamp,
            confidence: entry.confidence,
        };

        record.entries.push(caption.clone());

        Ok(caption)
    }

    async fn list_entries(&self, session_id: &str) -> Result<Vec<CaptionEntry>, StoreError> {
        let sessions = self.sessions.read().await;
        let record = sessions
            .get(session_id)
            .ok_or_else(|| StoreError::UnknownSession(session_id.to_string()))?;

        // Entries arrive in completion order; readers get timestamp order
        let mut entries = record.entries.clone();
        entries.sort_by_key(|entry| entry.timestamp);

        Ok(entries)
    }

    async fn get_settings(&self, user_id: &str) -> Option<serde_json::Value> {
        let settings = self.settings.read().await;
        settings.get(user_id).cloned()
    }

    async fn put_settings(&self, user_id: &str, value: serde_json::Value) {
        let mut settings = self.settings.write().await;
        settings.insert(user_id.to_string(), value);
    }
}
