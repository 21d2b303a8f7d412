use super::language::engine_language_code;
use crate::config::EngineConfig;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionFailure {
    /// Network failure or timeout before a response arrived
    #[error("transcription request failed: {0}")]
    Request(String),

    /// The engine answered with a non-success status
    #[error("transcription engine returned status {status}: {message}")]
    Engine { status: u16, message: String },

    /// The engine answered 2xx but the body did not parse
    #[error("malformed transcription response: {0}")]
    Malformed(String),
}

/// Requested response shape. `Json` is the cheapest structured format and is
/// forced on the streaming path; `VerboseJson` carries per-segment detail and
/// is used for batch file/URL requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Json,
    VerboseJson,
}

impl ResponseFormat {
    fn as_str(self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::VerboseJson => "verbose_json",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TranscribeOptions {
    /// Human-readable language name; "auto", empty or absent means the
    /// engine detects the language
    pub language: Option<String>,
    pub speaker_labels: bool,
    pub min_speakers: Option<u32>,
    pub max_speakers: Option<u32>,
    /// Optional context prompt forwarded to the engine
    pub prompt: Option<String>,
    pub response_format: ResponseFormat,
}

/// One timed segment of a verbose transcription response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

/// Normalized transcription result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    /// Audio duration in seconds, when the engine reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<TranscriptSegment>>,
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Turn one encoded audio chunk into transcript text. Stateless; the
    /// audio is not retained past the request.
    async fn transcribe(
        &self,
        audio: &[u8],
        options: &TranscribeOptions,
    ) -> Result<Transcript, TranscriptionFailure>;
}

/// `Transcriber` backed by an OpenAI-compatible `/audio/transcriptions`
/// endpoint
pub struct HttpTranscriptionGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpTranscriptionGateway {
    pub fn new(config: &EngineConfig) -> Result<Self, TranscriptionFailure> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranscriptionFailure::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Transcriber for HttpTranscriptionGateway {
    async fn transcribe(
        &self,
        audio: &[u8],
        options: &TranscribeOptions,
    ) -> Result<Transcript, TranscriptionFailure> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let audio_part = Part::bytes(audio.to_vec())
            .file_name("chunk.wav")
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionFailure::Request(e.to_string()))?;

        let mut form = Form::new()
            .part("file", audio_part)
            .text("model", self.model.clone())
            .text("response_format", options.response_format.as_str())
            .text("temperature", "0");

        if let Some(code) = options.language.as_deref().and_then(engine_language_code) {
            form = form.text("language", code);
        }
        if let Some(prompt) = &options.prompt {
            form = form.text("prompt", prompt.clone());
        }
        if options.speaker_labels {
            form = form.text("speaker_labels", "true");
            if let Some(min) = options.min_speakers {
                form = form.text("min_speakers", min.to_string());
            }
            if let Some(max) = options.max_speakers {
                form = form.text("max_speakers", max.to_string());
            }
        }

        let mut request = self.client.post(&url).multipart(form);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TranscriptionFailure::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranscriptionFailure::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(TranscriptionFailure::Engine {
                status: status.as_u16(),
                message: body,
            });
        }

        let transcript: Transcript = serde_json::from_str(&body)
            .map_err(|e| TranscriptionFailure::Malformed(e.to_string()))?;

        debug!(
            "Transcribed {} bytes into {} chars",
            audio.len(),
            transcript.text.len()
        );

        Ok(transcript)
    }
}
