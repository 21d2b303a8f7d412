pub mod config;
pub mod export;
pub mod gateway;
pub mod http;
pub mod store;
pub mod stream;

pub use config::Config;
pub use export::ExportFormat;
pub use gateway::{
    HttpTranscriptionGateway, HttpTranslationGateway, ResponseFormat, TranscribeOptions,
    Transcriber, Transcript, TranscriptSegment, TranscriptionFailure, Translation,
    TranslationFailure, Translator,
};
pub use http::{create_router, AppState};
pub use store::{
    CaptionEntry, MemoryStore, NewCaptionEntry, Session, SessionStatus, SessionStore,
    SessionUpdate, StoreError, UserSettings,
};
pub use stream::{
    CaptionChannel, ChannelConfig, ClientMessage, ServerMessage, StreamingCoordinator,
};
