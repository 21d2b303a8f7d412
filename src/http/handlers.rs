use super::state::AppState;
use crate::export::{self, ExportFormat};
use crate::gateway::{ResponseFormat, TranscribeOptions, TranscriptionFailure, TranslationFailure};
use crate::store::{NewCaptionEntry, SessionUpdate, StoreError, UserSettings};
use axum::{
    extract::{Multipart, Path, Query, State, WebSocketUpgrade},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeUrlRequest {
    pub url: String,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub speaker_labels: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: String,

    #[serde(default)]
    pub source_language: Option<String>,

    pub target_language: String,

    /// Optional surrounding context handed to the translation engine
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,

    /// Language the engine detected in the source text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// Defaults to the configured source language when absent
    #[serde(default)]
    pub source_language: Option<String>,

    #[serde(default)]
    pub target_language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Error mapping
// ============================================================================

fn store_error_response(e: StoreError) -> Response {
    let status = match &e {
        StoreError::UnknownSession(_) => StatusCode::NOT_FOUND,
        StoreError::SessionCompleted(_) => StatusCode::CONFLICT,
        StoreError::EmptyText => StatusCode::BAD_REQUEST,
    };

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

fn transcription_error_response(e: TranscriptionFailure) -> Response {
    error!("Transcription failed: {}", e);
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

fn translation_error_response(e: TranslationFailure) -> Response {
    error!("Translation failed: {}", e);
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response()
}

// ============================================================================
// Batch transcription
// ============================================================================

/// Direct media downloads from these platforms are not supported; their URLs
/// point at player pages, not audio
const BLOCKED_HOSTS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "tiktok.com",
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "twitch.tv",
    "vimeo.com",
];

fn is_blocked_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    BLOCKED_HOSTS
        .iter()
        .any(|blocked| host == *blocked || host.ends_with(&format!(".{}", blocked)))
}

async fn batch_transcribe(
    state: &AppState,
    audio: Vec<u8>,
    language: Option<String>,
    speaker_labels: bool,
) -> Response {
    let options = TranscribeOptions {
        language,
        speaker_labels,
        response_format: ResponseFormat::VerboseJson,
        ..TranscribeOptions::default()
    };

    match state.transcriber.transcribe(&audio, &options).await {
        Ok(transcript) => (StatusCode::OK, Json(transcript)).into_response(),
        Err(e) => transcription_error_response(e),
    }
}

/// POST /api/transcribe/file
/// Transcribe an uploaded media file (multipart: file, language?, speakerLabels?)
pub async fn transcribe_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut audio: Option<Vec<u8>> = None;
    let mut language: Option<String> = None;
    let mut speaker_labels = false;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(format!("invalid multipart body: {}", e)),
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => match field.bytes().await {
                Ok(bytes) => audio = Some(bytes.to_vec()),
                Err(e) => return bad_request(format!("failed to read file field: {}", e)),
            },
            Some("language") => language = field.text().await.ok().filter(|v| !v.is_empty()),
            Some("speakerLabels") | Some("speaker_labels") => {
                speaker_labels = field
                    .text()
                    .await
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(false);
            }
            _ => {}
        }
    }

    let Some(audio) = audio else {
        return bad_request("missing file field".to_string());
    };

    info!("Transcribing uploaded file ({} bytes)", audio.len());

    batch_transcribe(&state, audio, language, speaker_labels).await
}

/// POST /api/transcribe/url
/// Fetch a remote media file and transcribe it
pub async fn transcribe_url(
    State(state): State<AppState>,
    Json(req): Json<TranscribeUrlRequest>,
) -> impl IntoResponse {
    let parsed = match Url::parse(&req.url) {
        Ok(parsed) => parsed,
        Err(e) => return bad_request(format!("invalid url: {}", e)),
    };

    let host = parsed.host_str().unwrap_or_default().to_string();
    if is_blocked_host(&host) {
        return bad_request(format!(
            "direct media downloads from {} are not supported; upload the audio file instead",
            host
        ));
    }

    info!("Fetching media from {}", req.url);

    let audio = match fetch_remote_media(&parsed).await {
        Ok(audio) => audio,
        Err(e) => {
            warn!("Failed to fetch {}: {}", req.url, e);
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("failed to fetch {}: {}", req.url, e),
                }),
            )
                .into_response();
        }
    };

    batch_transcribe(&state, audio, req.language, req.speaker_labels).await
}

async fn fetch_remote_media(url: &Url) -> anyhow::Result<Vec<u8>> {
    let response = reqwest::get(url.clone()).await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

// ============================================================================
// Translation
// ============================================================================

/// POST /api/translate
/// One-shot translation of a text
pub async fn translate(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> impl IntoResponse {
    match state
        .translator
        .translate(
            &req.text,
            req.source_language.as_deref(),
            &req.target_language,
            req.context.as_deref(),
        )
        .await
    {
        Ok(translation) => (
            StatusCode::OK,
            Json(TranslateResponse {
                translated_text: translation.translated_text,
                source_language: translation.detected_source_language,
                confidence: translation.confidence,
            }),
        )
            .into_response(),
        Err(e) => translation_error_response(e),
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// POST /api/sessions
/// Create a new caption session
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let source = req
        .source_language
        .unwrap_or_else(|| state.defaults.source_language.clone());
    let target = req
        .target_language
        .unwrap_or_else(|| state.defaults.target_language.clone());

    let session = state.store.create_session(&source, &target).await;

    info!("Created session {} ({} -> {})", session.id, source, target);

    (StatusCode::CREATED, Json(session)).into_response()
}

/// GET /api/sessions/:session_id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.store.get_session(&session_id).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// PATCH /api/sessions/:session_id
/// Partial update (pause/resume/complete, language changes)
pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(update): Json<SessionUpdate>,
) -> impl IntoResponse {
    match state.store.update_session(&session_id, update).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// GET /api/sessions/:session_id/entries
/// Entries sorted ascending by timestamp
pub async fn list_entries(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.store.list_entries(&session_id).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// POST /api/sessions/:session_id/entries
/// Append one entry (batch upload path)
pub async fn append_entry(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(entry): Json<NewCaptionEntry>,
) -> impl IntoResponse {
    match state.store.append_entry(&session_id, entry).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// GET /api/sessions/:session_id/export?format=srt|vtt|txt
pub async fn export_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> impl IntoResponse {
    let format = match ExportFormat::from_str(&query.format) {
        Ok(format) => format,
        Err(e) => return bad_request(e),
    };

    match state.store.list_entries(&session_id).await {
        Ok(entries) => {
            let body = export::render(format, &entries);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, format.content_type().to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!(
                            "attachment; filename=\"session-{}.{}\"",
                            session_id,
                            format.extension()
                        ),
                    ),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => store_error_response(e),
    }
}

// ============================================================================
// Settings
// ============================================================================

/// GET /api/settings/:user_id
/// Returns an empty bag for users with no stored settings
pub async fn get_settings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let settings = state
        .store
        .get_settings(&user_id)
        .await
        .unwrap_or_else(|| serde_json::json!({}));

    (StatusCode::OK, Json(UserSettings { user_id, settings })).into_response()
}

/// PUT /api/settings/:user_id
pub async fn put_settings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(settings): Json<serde_json::Value>,
) -> impl IntoResponse {
    state.store.put_settings(&user_id, settings.clone()).await;

    (StatusCode::OK, Json(UserSettings { user_id, settings })).into_response()
}

// ============================================================================
// Streaming
// ============================================================================

/// GET /ws/captions
/// Upgrade into the duplex caption channel
pub async fn ws_captions(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let coordinator = Arc::clone(&state.coordinator);
    ws.on_upgrade(move |socket| coordinator.run(socket))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
