// Stub engine gateways shared by the streaming and HTTP API tests.
//
// Both stubs implement the gateway traits so the full pipeline runs without
// any network access, and both record their calls so tests can assert on
// what the coordinator actually sent.

// Not every test binary exercises every stub hook
#![allow(dead_code)]

use async_trait::async_trait;
use caption_relay::{
    TranscribeOptions, Transcriber, Transcript, TranscriptionFailure, Translation,
    TranslationFailure, Translator,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct StubTranscriber {
    text: String,
    duration: Option<f64>,
    fail_next: AtomicBool,
    calls: Mutex<Vec<TranscribeOptions>>,
}

impl StubTranscriber {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            duration: Some(2.0),
            fail_next: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make the next transcribe call fail with an engine error
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_options(&self) -> Option<TranscribeOptions> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(
        &self,
        _audio: &[u8],
        options: &TranscribeOptions,
    ) -> Result<Transcript, TranscriptionFailure> {
        self.calls.lock().unwrap().push(options.clone());

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(TranscriptionFailure::Engine {
                status: 500,
                message: "stub engine failure".to_string(),
            });
        }

        Ok(Transcript {
            text: self.text.clone(),
            duration: self.duration,
            segments: None,
        })
    }
}

pub struct StubTranslator {
    translated: String,
    fail_next: AtomicBool,
    calls: AtomicUsize,
}

impl StubTranslator {
    pub fn new(translated: &str) -> Self {
        Self {
            translated: translated.to_string(),
            fail_next: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make the next translate call fail
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for StubTranslator {
    async fn translate(
        &self,
        _text: &str,
        _source_language: Option<&str>,
        _target_language: &str,
        _context: Option<&str>,
    ) -> Result<Translation, TranslationFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(TranslationFailure::Malformed(
                "stub refused to translate".to_string(),
            ));
        }

        Ok(Translation {
            translated_text: self.translated.clone(),
            detected_source_language: Some("en".to_string()),
            confidence: Some(0.9),
        })
    }
}
