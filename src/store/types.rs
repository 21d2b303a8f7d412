use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a caption session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Paused,
    Completed,
}

/// A logical grouping of ordered caption entries produced by one
/// recording or upload activity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,

    /// Source language name; "auto" lets the engine detect
    pub source_language: String,

    pub target_language: String,

    pub status: SessionStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// One caption produced by the streaming or batch pipeline, immutable once
/// created
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionEntry {
    pub id: String,

    pub session_id: String,

    pub original_text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_label: Option<String>,

    /// Time offset of the source audio chunk in milliseconds (not the
    /// wall-clock append time)
    pub timestamp: u64,

    /// 0-100, when the pipeline produced an estimate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
}

/// Fields for appending one entry; the id is generated by the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCaptionEntry {
    pub original_text: String,

    #[serde(default)]
    pub translated_text: Option<String>,

    #[serde(default)]
    pub speaker_label: Option<String>,

    #[serde(default)]
    pub timestamp: u64,

    #[serde(default)]
    pub confidence: Option<u8>,
}

/// Partial session update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    #[serde(default)]
    pub status: Option<SessionStatus>,

    #[serde(default)]
    pub source_language: Option<String>,

    #[serde(default)]
    pub target_language: Option<String>,
}

/// Free-form per-user settings bag (language defaults, display toggles,
/// API keys, styling)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub user_id: String,
    pub settings: serde_json::Value,
}
