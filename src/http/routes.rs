use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Uploaded media files can be large; the axum default (2 MB) is far too low
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Batch transcription + translation
        .route("/api/transcribe/file", post(handlers::transcribe_file))
        .route("/api/transcribe/url", post(handlers::transcribe_url))
        .route("/api/translate", post(handlers::translate))
        // Session CRUD + export
        .route("/api/sessions", post(handlers::create_session))
        .route(
            "/api/sessions/:session_id",
            get(handlers::get_session).patch(handlers::update_session),
        )
        .route(
            "/api/sessions/:session_id/entries",
            get(handlers::list_entries).post(handlers::append_entry),
        )
        .route(
            "/api/sessions/:session_id/export",
            get(handlers::export_session),
        )
        // Per-user settings
        .route(
            "/api/settings/:user_id",
            get(handlers::get_settings).put(handlers::put_settings),
        )
        // Duplex caption stream
        .route("/ws/captions", get(handlers::ws_captions))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        // Browser clients live on other origins
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
