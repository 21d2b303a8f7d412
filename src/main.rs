use anyhow::Result;
use caption_relay::{
    create_router, AppState, Config, HttpTranscriptionGateway, HttpTranslationGateway, MemoryStore,
};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "caption-relay", about = "Streaming transcription and translation relay")]
struct Args {
    /// Config file to load (path without extension, e.g. config/caption-relay)
    #[arg(long)]
    config: Option<String>,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(bind) = args.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    info!("{} starting", cfg.service.name);
    info!(
        "Transcription engine: {} (model {})",
        cfg.transcription.base_url, cfg.transcription.model
    );
    info!(
        "Translation engine: {} (model {})",
        cfg.translation.base_url, cfg.translation.model
    );

    let store = Arc::new(MemoryStore::new());
    let transcriber = Arc::new(HttpTranscriptionGateway::new(&cfg.transcription)?);
    let translator = Arc::new(HttpTranslationGateway::new(&cfg.translation)?);
    let state = AppState::new(store, transcriber, translator, cfg.defaults.clone());

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Listening on {}", addr);

    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
