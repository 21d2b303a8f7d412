//! Thin adapters over the remote speech-to-text and translation engines
//!
//! Both engines are opaque HTTP services. The gateways normalize options and
//! responses, and surface failures as typed errors; they hold no state across
//! calls and never retry on their own.

pub mod language;
mod transcription;
mod translation;

pub use language::engine_language_code;
pub use transcription::{
    HttpTranscriptionGateway, ResponseFormat, TranscribeOptions, Transcriber, Transcript,
    TranscriptSegment, TranscriptionFailure,
};
pub use translation::{HttpTranslationGateway, Translation, TranslationFailure, Translator};
