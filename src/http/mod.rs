//! HTTP API server for the caption UI
//!
//! This module provides the REST + WebSocket surface:
//! - POST /api/transcribe/file - Batch transcription of an uploaded file
//! - POST /api/transcribe/url - Batch transcription of a remote file
//! - POST /api/translate - One-shot translation
//! - POST /api/sessions, GET/PATCH /api/sessions/:id - Session CRUD
//! - GET/POST /api/sessions/:id/entries - Caption entries
//! - GET /api/sessions/:id/export - SRT/VTT/TXT download
//! - GET/PUT /api/settings/:user_id - Per-user settings bag
//! - GET /ws/captions - Duplex streaming channel
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
