//! Session and caption entry storage
//!
//! This module provides the `SessionStore` abstraction that owns:
//! - Session lifecycle (create, pause/resume, complete)
//! - Append-only caption entries per session
//! - Timestamp-ordered entry reads
//! - Per-user settings bags
//!
//! The store is constructed once at process start and injected into the
//! streaming coordinator and the HTTP handlers, so a persistent backend can
//! replace `MemoryStore` without touching either.

mod memory;
mod types;

pub use memory::{MemoryStore, SessionStore, StoreError};
pub use types::{CaptionEntry, NewCaptionEntry, Session, SessionStatus, SessionUpdate, UserSettings};
