// End-to-end tests for the streaming pipeline
//
// A real server (router + WebSocket upgrade + coordinator) runs on an
// ephemeral port with stub engine gateways; a real CaptionChannel client
// connects to it. These cover the per-chunk pipeline semantics: translation
// skipping, "auto" handling, error containment, and persistence.

mod common;

use anyhow::{Context, Result};
use base64::Engine as _;
use caption_relay::config::LanguageDefaults;
use caption_relay::gateway::engine_language_code;
use caption_relay::{
    create_router, AppState, CaptionChannel, ChannelConfig, ClientMessage, MemoryStore,
    ResponseFormat, ServerMessage, SessionStore,
};
use common::{StubTranscriber, StubTranslator};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

struct Fixture {
    store: Arc<MemoryStore>,
    transcriber: Arc<StubTranscriber>,
    translator: Arc<StubTranslator>,
    ws_url: String,
}

async fn start_server(text: &str, translated: &str) -> Result<Fixture> {
    let store = Arc::new(MemoryStore::new());
    let transcriber = Arc::new(StubTranscriber::new(text));
    let translator = Arc::new(StubTranslator::new(translated));

    let state = AppState::new(
        Arc::clone(&store) as Arc<dyn SessionStore>,
        Arc::clone(&transcriber) as Arc<dyn caption_relay::Transcriber>,
        Arc::clone(&translator) as Arc<dyn caption_relay::Translator>,
        LanguageDefaults::default(),
    );

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok(Fixture {
        store,
        transcriber,
        translator,
        ws_url: format!("ws://{}/ws/captions", addr),
    })
}

async fn open_channel(
    fixture: &Fixture,
) -> Result<(CaptionChannel, mpsc::UnboundedReceiver<ServerMessage>)> {
    CaptionChannel::connect(ChannelConfig::new(fixture.ws_url.as_str())).await
}

fn chunk(session_id: Option<&str>, language: &str, target: &str, timestamp: u64) -> ClientMessage {
    ClientMessage::AudioChunk {
        audio: base64::engine::general_purpose::STANDARD.encode(b"pcm bytes"),
        session_id: session_id.map(str::to_string),
        language: Some(language.to_string()),
        target_language: Some(target.to_string()),
        speaker_labels: false,
        speaker_label: None,
        timestamp: Some(timestamp),
    }
}

async fn next_message(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Result<ServerMessage> {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .context("timed out waiting for a message")?
        .context("channel closed")
}

#[tokio::test]
async fn chunk_flows_through_transcribe_translate_and_persist() -> Result<()> {
    let fixture = start_server("hello", "hola").await?;
    let session = fixture.store.create_session("auto", "spanish").await;

    let (channel, mut rx) = open_channel(&fixture).await?;
    channel.send(chunk(Some(&session.id), "auto", "spanish", 1000));

    match next_message(&mut rx).await? {
        ServerMessage::TranscriptionResult {
            original_text,
            translated_text,
            timestamp,
            speaker_label,
        } => {
            assert_eq!(original_text, "hello");
            assert_eq!(translated_text, "hola");
            assert_eq!(timestamp, 1000);
            assert_eq!(speaker_label, None);
        }
        other => panic!("expected transcription result, got {:?}", other),
    }

    let entries = fixture.store.list_entries(&session.id).await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].original_text, "hello");
    assert_eq!(entries[0].translated_text.as_deref(), Some("hola"));
    assert_eq!(entries[0].timestamp, 1000);
    assert!(entries[0].confidence.is_some(), "duration yields an estimate");

    channel.disconnect();

    Ok(())
}

#[tokio::test]
async fn same_language_never_invokes_the_translator() -> Result<()> {
    let fixture = start_server("hello", "should not appear").await?;

    let (channel, mut rx) = open_channel(&fixture).await?;
    channel.send(chunk(None, "english", "english", 5));

    match next_message(&mut rx).await? {
        ServerMessage::TranscriptionResult {
            original_text,
            translated_text,
            ..
        } => {
            assert_eq!(original_text, "hello");
            assert_eq!(translated_text, "");
        }
        other => panic!("expected transcription result, got {:?}", other),
    }

    assert_eq!(fixture.translator.call_count(), 0);

    channel.disconnect();

    Ok(())
}

#[tokio::test]
async fn auto_language_reaches_the_engine_without_a_constraint() -> Result<()> {
    let fixture = start_server("hello", "hola").await?;

    let (channel, mut rx) = open_channel(&fixture).await?;
    channel.send(chunk(None, "auto", "spanish", 5));
    next_message(&mut rx).await?;

    let options = fixture
        .transcriber
        .last_options()
        .expect("transcriber was invoked");
    assert_eq!(options.language.as_deref(), Some("auto"));
    assert_eq!(
        options.language.as_deref().and_then(engine_language_code),
        None,
        "\"auto\" resolves to no engine language constraint"
    );
    // The live path always uses the cheapest structured format
    assert_eq!(options.response_format, ResponseFormat::Json);

    channel.disconnect();

    Ok(())
}

#[tokio::test]
async fn one_failed_chunk_leaves_the_connection_usable() -> Result<()> {
    let fixture = start_server("hello", "hola").await?;

    let (channel, mut rx) = open_channel(&fixture).await?;

    fixture.transcriber.fail_next();
    channel.send(chunk(None, "english", "spanish", 1));

    match next_message(&mut rx).await? {
        ServerMessage::Error { message } => {
            assert!(message.contains("transcription failed"), "{}", message);
        }
        other => panic!("expected error message, got {:?}", other),
    }

    // The next chunk on the same connection works normally
    channel.send(chunk(None, "english", "spanish", 2));
    match next_message(&mut rx).await? {
        ServerMessage::TranscriptionResult { original_text, .. } => {
            assert_eq!(original_text, "hello");
        }
        other => panic!("expected transcription result, got {:?}", other),
    }

    assert_eq!(fixture.transcriber.call_count(), 2);

    channel.disconnect();

    Ok(())
}

#[tokio::test]
async fn translation_failure_degrades_to_transcription_only() -> Result<()> {
    let fixture = start_server("hello", "hola").await?;

    let (channel, mut rx) = open_channel(&fixture).await?;

    fixture.translator.fail_next();
    channel.send(chunk(None, "english", "spanish", 7));

    match next_message(&mut rx).await? {
        ServerMessage::TranscriptionResult {
            original_text,
            translated_text,
            timestamp,
            ..
        } => {
            assert_eq!(original_text, "hello");
            assert_eq!(translated_text, "", "partial success drops the translation");
            assert_eq!(timestamp, 7);
        }
        other => panic!("expected transcription result, got {:?}", other),
    }

    channel.disconnect();

    Ok(())
}

#[tokio::test]
async fn unknown_session_surfaces_an_error_without_closing() -> Result<()> {
    let fixture = start_server("hello", "hola").await?;

    let (channel, mut rx) = open_channel(&fixture).await?;
    channel.send(chunk(Some("no-such-session"), "english", "spanish", 1));

    match next_message(&mut rx).await? {
        ServerMessage::Error { message } => {
            assert!(message.contains("unknown session"), "{}", message);
        }
        other => panic!("expected error message, got {:?}", other),
    }

    channel.send(chunk(None, "english", "spanish", 2));
    assert!(matches!(
        next_message(&mut rx).await?,
        ServerMessage::TranscriptionResult { .. }
    ));

    channel.disconnect();

    Ok(())
}

#[tokio::test]
async fn malformed_frames_get_an_error_reply() -> Result<()> {
    let fixture = start_server("hello", "hola").await?;

    // Drive the socket directly to send a frame the protocol does not know
    let (mut socket, _) = tokio_tungstenite::connect_async(fixture.ws_url.as_str()).await?;
    use futures::{SinkExt, StreamExt};
    socket
        .send(tokio_tungstenite::tungstenite::Message::Text(
            r#"{"type":"bogus"}"#.to_string(),
        ))
        .await?;

    let frame = timeout(Duration::from_secs(5), socket.next())
        .await?
        .context("connection closed")??;
    let reply: ServerMessage = serde_json::from_str(frame.to_text()?)?;
    assert!(matches!(reply, ServerMessage::Error { .. }));

    Ok(())
}
