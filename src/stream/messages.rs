use serde::{Deserialize, Serialize};

/// Messages sent by the capture client over the caption channel.
///
/// Each `audio_chunk` carries its own routing parameters; there is no
/// separate configure handshake, and one connection may address several
/// sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    AudioChunk {
        /// Base64-encoded audio bytes
        audio: String,

        /// Session to persist the resulting entry into; no persistence when
        /// absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,

        /// Source language name; "auto" or absent lets the engine detect
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_language: Option<String>,

        /// Ask the engine for speaker diarization
        #[serde(default)]
        speaker_labels: bool,

        /// Label attached to the persisted entry
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speaker_label: Option<String>,

        /// Capture-side offset of the chunk in milliseconds
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<u64>,
    },
}

/// Messages pushed back to the caption renderer, in completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    TranscriptionResult {
        original_text: String,

        /// Empty when no translation was requested or when translation
        /// failed after a successful transcription
        #[serde(default)]
        translated_text: String,

        timestamp: u64,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        speaker_label: Option<String>,
    },

    /// One failed chunk; the connection stays open
    Error { message: String },
}
