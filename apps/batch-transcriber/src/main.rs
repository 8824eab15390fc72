mod audio;
mod chunker;
mod completion_log;
mod config;
mod engine;
mod error;
mod sink;
mod state;
mod worker;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use completion_log::CompletionLog;
use config::Config;
use engine::{TranscriptionEngine, WhisperEngine};
use worker::WorkerPool;

#[tokio::main]
async fn main() -> Result<()> {
	// Load environment variables
	dotenvy::dotenv().ok();

	// Parse CLI arguments
	let config = Config::parse();
	config.validate().map_err(|e| anyhow::anyhow!(e))?;

	init_tracing();

	info!(
		input = %config.input_dir.display(),
		output = %config.output_dir.display(),
		model = %config.model,
		devices = config.devices,
		window_ms = config.window_ms,
		"🎯 Starting batch transcription run"
	);

	std::fs::create_dir_all(&config.output_dir).context("Failed to create output directory")?;

	// The log must be fully loaded before any worker consults it; an
	// unreadable log aborts the run here.
	let log = Arc::new(CompletionLog::load(&config.output_dir).context("Failed to load completion log")?);
	info!(log = %log.path().display(), already_completed = log.len(), "📒 Completion log loaded");

	let engine: Arc<dyn TranscriptionEngine> = Arc::new(WhisperEngine::new(config.model.clone(), config.whisper_threads, !config.no_gpu));

	// Cooperative shutdown: workers observe the token at chunk boundaries,
	// finish the chunk in flight and leave the rest for the next run.
	let cancellation_token = CancellationToken::new();
	let signal_token = cancellation_token.clone();
	tokio::spawn(async move {
		wait_for_shutdown_signal().await;
		info!("🛑 Shutdown signal received (SIGTERM/SIGINT), finishing current chunks...");
		signal_token.cancel();
	});

	let pool = WorkerPool::new(&config, log, engine, cancellation_token);
	let summary = pool.run().await?;

	let elapsed_secs = summary.elapsed.as_secs_f64();
	info!(
		enumerated = summary.enumerated,
		completed = summary.completed,
		skipped = summary.skipped,
		failed = summary.failed,
		chunks = summary.chunks_transcribed,
		elapsed_secs = format!("{elapsed_secs:.1}"),
		elapsed_hours = format!("{:.2}", elapsed_secs / 3600.0),
		"✅ Run complete"
	);

	if summary.failed > 0 {
		warn!(failed = summary.failed, "⚠️ Some files failed; they are not in the completion log and will be re-attempted next run");
	}

	Ok(())
}

fn init_tracing() {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,batch_transcriber=debug"));

	tracing_subscriber::registry().with(env_filter).with(tracing_subscriber::fmt::layer().with_target(true)).init();
}

async fn wait_for_shutdown_signal() {
	let ctrl_c = async {
		signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
	};

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("failed to install SIGTERM handler")
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
			_ = ctrl_c => {},
			_ = terminate => {},
	}
}
