use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use echonotes::pipeline::PipelineSupervisor;
use echonotes::settings::SettingsStore;
use echonotes::stt::HttpTranscriber;
use echonotes::summarizer::OllamaSummarizer;
use echonotes::{create_router, AppState, Config};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "echonotes")]
#[command(about = "Live lecture transcription with accessibility summaries")]
struct Args {
    /// Config file path, without extension
    #[arg(long, default_value = "config/echonotes")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("STT service: {}", cfg.stt.url);
    info!(
        "Summarizer: {} (model '{}')",
        cfg.summarizer.url, cfg.summarizer.model
    );

    let transcriber = Arc::new(HttpTranscriber::new(cfg.stt.clone())?);
    let summarizer = Arc::new(OllamaSummarizer::new(cfg.summarizer.clone())?);
    let supervisor = Arc::new(PipelineSupervisor::new(
        cfg.pipeline.clone(),
        transcriber,
        summarizer,
    ));
    let state = AppState::new(supervisor.clone(), Arc::new(SettingsStore::new()));
    let app = create_router(state, &cfg.service.http)?;

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, ending active sessions");
    supervisor.shutdown_all().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
    }
}
