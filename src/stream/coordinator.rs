use super::messages::{ClientMessage, ServerMessage};
use crate::config::LanguageDefaults;
use crate::gateway::{ResponseFormat, TranscribeOptions, Transcriber, Translator};
use crate::store::{NewCaptionEntry, SessionStore};
use axum::extract::ws::{Message, WebSocket};
use base64::Engine;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Derive a 0-100 confidence figure from the engine-reported audio duration.
///
/// This is a stand-in, not a model signal: longer chunks give the engine
/// more context, nothing else. Swap it out via
/// `StreamingCoordinator::with_confidence` when a real score is available.
pub fn duration_confidence(duration_secs: Option<f64>) -> Option<u8> {
    duration_secs.map(|duration| {
        let scaled = 60.0 + duration.clamp(0.0, 7.0) * 5.0;
        scaled.min(95.0) as u8
    })
}

/// Owns one duplex connection per client and drives the
/// transcribe -> translate -> persist pipeline for every inbound chunk.
///
/// Chunk requests on one connection are fully independent: each spawns its
/// own task, and results are emitted in completion order. Readers needing
/// strict timestamp order re-sort via `SessionStore::list_entries`.
pub struct StreamingCoordinator {
    store: Arc<dyn SessionStore>,
    transcriber: Arc<dyn Transcriber>,
    translator: Arc<dyn Translator>,
    defaults: LanguageDefaults,
    confidence: fn(Option<f64>) -> Option<u8>,
}

impl StreamingCoordinator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        transcriber: Arc<dyn Transcriber>,
        translator: Arc<dyn Translator>,
        defaults: LanguageDefaults,
    ) -> Self {
        Self {
            store,
            transcriber,
            translator,
            defaults,
            confidence: duration_confidence,
        }
    }

    /// Replace the confidence heuristic (use `|_| None` to disable it)
    pub fn with_confidence(mut self, confidence: fn(Option<f64>) -> Option<u8>) -> Self {
        self.confidence = confidence;
        self
    }

    /// Drive one client connection until it closes.
    pub async fn run(self: Arc<Self>, socket: WebSocket) {
        let (mut sink, mut stream) = socket.split();
        let (reply_tx, mut reply_rx) = mpsc::channel::<ServerMessage>(64);

        // Single owner of the sink; in-flight pipelines funnel through it,
        // so results leave in completion order.
        let writer = tokio::spawn(async move {
            while let Some(message) = reply_rx.recv().await {
                match serde_json::to_string(&message) {
                    Ok(json) => {
                        if sink.send(Message::Text(json)).await.is_err() {
                            // Client gone; remaining results are discarded
                            break;
                        }
                    }
                    Err(e) => error!("Failed to encode outbound message: {}", e),
                }
            }
        });

        let connected_at = Instant::now();

        while let Some(frame) = stream.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
            };

            match frame {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => {
                        let coordinator = Arc::clone(&self);
                        let reply_tx = reply_tx.clone();
                        let fallback_ms = connected_at.elapsed().as_millis() as u64;
                        tokio::spawn(async move {
                            let reply = coordinator.process(message, fallback_ms).await;
                            // Fails only after close; drop the result then
                            let _ = reply_tx.send(reply).await;
                        });
                    }
                    Err(e) => {
                        let _ = reply_tx
                            .send(ServerMessage::Error {
                                message: format!("unrecognized message: {}", e),
                            })
                            .await;
                    }
                },
                Message::Close(_) => break,
                // Ping/pong are answered by the transport; binary frames are
                // not part of the protocol
                _ => {}
            }
        }

        drop(reply_tx);
        let _ = writer.await;

        debug!("Caption connection closed");
    }

    /// Run the pipeline for one chunk and produce the single outbound reply.
    async fn process(&self, message: ClientMessage, fallback_timestamp: u64) -> ServerMessage {
        let ClientMessage::AudioChunk {
            audio,
            session_id,
            language,
            target_language,
            speaker_labels,
            speaker_label,
            timestamp,
        } = message;

        let audio_bytes = match base64::engine::general_purpose::STANDARD.decode(audio.as_bytes())
        {
            Ok(bytes) => bytes,
            Err(e) => {
                return ServerMessage::Error {
                    message: format!("invalid audio payload: {}", e),
                }
            }
        };

        let source = language.unwrap_or_else(|| self.defaults.source_language.clone());
        let target = target_language.unwrap_or_else(|| self.defaults.target_language.clone());
        let timestamp = timestamp.unwrap_or(fallback_timestamp);

        let options = TranscribeOptions {
            language: Some(source.clone()),
            speaker_labels,
            response_format: ResponseFormat::Json,
            ..TranscribeOptions::default()
        };

        let transcript = match self.transcriber.transcribe(&audio_bytes, &options).await {
            Ok(transcript) => transcript,
            Err(e) => {
                warn!("Transcription failed: {}", e);
                return ServerMessage::Error {
                    message: format!("transcription failed: {}", e),
                };
            }
        };

        let original_text = transcript.text.trim().to_string();

        // Exact compare on the configured names; "auto" resolves to the
        // coordinator default before the check
        let resolved_source = if source.eq_ignore_ascii_case("auto") {
            self.defaults.source_language.as_str()
        } else {
            source.as_str()
        };
        let wants_translation =
            !target.is_empty() && !target.eq_ignore_ascii_case(resolved_source);

        let translated_text = if wants_translation && !original_text.is_empty() {
            match self
                .translator
                .translate(&original_text, Some(&source), &target, None)
                .await
            {
                Ok(translation) => translation.translated_text,
                Err(e) => {
                    // Partial success: the transcription still goes out
                    warn!("Translation failed, emitting transcription only: {}", e);
                    String::new()
                }
            }
        } else {
            String::new()
        };

        if let Some(session_id) = &session_id {
            if !original_text.is_empty() {
                let entry = NewCaptionEntry {
                    original_text: original_text.clone(),
                    translated_text: (!translated_text.is_empty())
                        .then(|| translated_text.clone()),
                    speaker_label: speaker_label.clone(),
                    timestamp,
                    confidence: (self.confidence)(transcript.duration),
                };

                if let Err(e) = self.store.append_entry(session_id, entry).await {
                    warn!("Failed to persist caption entry: {}", e);
                    return ServerMessage::Error {
                        message: format!("failed to persist entry: {}", e),
                    };
                }
            }
        }

        ServerMessage::TranscriptionResult {
            original_text,
            translated_text,
            timestamp,
            speaker_label,
        }
    }
}
