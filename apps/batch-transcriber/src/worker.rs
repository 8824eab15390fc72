mod job;

pub use job::{FileJob, FileOutcome};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::completion_log::CompletionLog;
use crate::config::Config;
use crate::engine::TranscriptionEngine;
use crate::error::TranscribeError;
use crate::sink::TranscriptRow;
use crate::state::RunState;
use crate::{audio, chunker, sink};

const RESULT_CHANNEL_CAPACITY: usize = 100;

/// End-of-run accounting reported by the pool.
///
/// `completed + skipped + failed` can fall short of `enumerated` when the
/// run is cancelled before every file is attempted.
#[derive(Debug)]
pub struct RunSummary {
	pub enumerated: usize,
	pub completed: u64,
	pub skipped: u64,
	pub failed: u64,
	pub chunks_transcribed: u64,
	pub elapsed: Duration,
}

/// Fixed pool of workers, one per device slot.
///
/// The i-th enumerated file is assigned device slot `i mod N`, and worker `w`
/// owns slot `w` for the whole run, processing its files end-to-end one at a
/// time. Slot exclusivity therefore holds by construction; the completion
/// log is the only state shared between workers.
pub struct WorkerPool {
	input_dir: PathBuf,
	output_dir: PathBuf,
	extension: String,
	devices: usize,
	window_ms: u64,
	log: Arc<CompletionLog>,
	engine: Arc<dyn TranscriptionEngine>,
	state: Arc<RunState>,
	cancellation_token: CancellationToken,
}

impl WorkerPool {
	pub fn new(config: &Config, log: Arc<CompletionLog>, engine: Arc<dyn TranscriptionEngine>, cancellation_token: CancellationToken) -> Self {
		Self {
			input_dir: config.input_dir.clone(),
			output_dir: config.output_dir.clone(),
			extension: config.extension.clone(),
			devices: config.devices,
			window_ms: config.window_ms,
			log,
			engine,
			state: RunState::new(),
			cancellation_token,
		}
	}

	/// Dispatch every eligible input file and drive the run to completion.
	///
	/// Only enumeration failures abort; per-file failures are reported by
	/// the owning worker and the run continues.
	pub async fn run(self) -> anyhow::Result<RunSummary> {
		let started = Instant::now();

		let files = enumerate_files(&self.input_dir, &self.extension)?;
		info!(files = files.len(), devices = self.devices, "🗂️ Enumerated input files");

		let enumerated = files.len();
		let mut queues: Vec<Vec<FileJob>> = (0..self.devices).map(|_| Vec::new()).collect();
		for (i, (file_name, path)) in files.into_iter().enumerate() {
			let device_slot = i % self.devices;
			queues[device_slot].push(FileJob::new(file_name, path, device_slot));
		}

		let (tx, mut rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
		let mut handles = Vec::with_capacity(self.devices);
		for (device_slot, jobs) in queues.into_iter().enumerate() {
			if jobs.is_empty() {
				continue;
			}

			let worker = Worker {
				device_slot,
				output_dir: self.output_dir.clone(),
				window_ms: self.window_ms,
				log: Arc::clone(&self.log),
				engine: Arc::clone(&self.engine),
				state: Arc::clone(&self.state),
				cancellation_token: self.cancellation_token.clone(),
			};
			let tx = tx.clone();
			handles.push(tokio::task::spawn_blocking(move || worker.run(jobs, &tx)));
		}
		drop(tx);

		let mut summary = RunSummary {
			enumerated,
			completed: 0,
			skipped: 0,
			failed: 0,
			chunks_transcribed: 0,
			elapsed: Duration::ZERO,
		};
		while let Some(outcome) = rx.recv().await {
			self.record(&mut summary, &outcome);
		}
		for handle in handles {
			handle.await?;
		}

		summary.chunks_transcribed = self.state.chunks_transcribed();
		summary.elapsed = started.elapsed();
		Ok(summary)
	}

	fn record(&self, summary: &mut RunSummary, outcome: &FileOutcome) {
		match outcome {
			FileOutcome::Completed { .. } => {
				summary.completed += 1;
				self.state.record_completed();
			}
			FileOutcome::Skipped { .. } => {
				summary.skipped += 1;
				self.state.record_skipped();
			}
			FileOutcome::Failed { .. } => {
				summary.failed += 1;
				self.state.record_failed();
			}
		}
	}
}

/// List eligible input files sorted by name, paired with their bare names.
///
/// Each file is visited exactly once per run; an unreadable directory is
/// fatal before any worker starts.
fn enumerate_files(input_dir: &Path, extension: &str) -> Result<Vec<(String, PathBuf)>, TranscribeError> {
	let entries = std::fs::read_dir(input_dir).map_err(|e| TranscribeError::Enumeration(e.to_string()))?;

	let mut files = Vec::new();
	for entry in entries {
		let entry = entry.map_err(|e| TranscribeError::Enumeration(e.to_string()))?;
		let path = entry.path();
		if !path.is_file() {
			continue;
		}
		let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
			continue;
		};
		let matches = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case(extension));
		if matches {
			files.push((file_name.to_string(), path));
		}
	}

	files.sort();
	Ok(files)
}

/// One blocking execution unit bound to a single device slot.
struct Worker {
	device_slot: usize,
	output_dir: PathBuf,
	window_ms: u64,
	log: Arc<CompletionLog>,
	engine: Arc<dyn TranscriptionEngine>,
	state: Arc<RunState>,
	cancellation_token: CancellationToken,
}

impl Worker {
	/// Process the slot's files in order, reporting each outcome as it lands.
	fn run(&self, jobs: Vec<FileJob>, tx: &mpsc::Sender<FileOutcome>) {
		info!(device_slot = self.device_slot, files = jobs.len(), "🏭 Worker started");

		for job in jobs {
			if self.cancellation_token.is_cancelled() {
				info!(device_slot = self.device_slot, "🛑 Worker stopping (cancellation requested)");
				break;
			}

			let outcome = self.process(&job);
			if tx.blocking_send(outcome).is_err() {
				warn!(device_slot = self.device_slot, "Result channel closed, stopping worker");
				break;
			}
		}

		info!(device_slot = self.device_slot, "✅ Worker finished");
	}

	/// Per-file state machine: claimed against the completion log, then
	/// either skipped, completed, or failed. Every collaborator error is
	/// absorbed here; nothing propagates to sibling workers.
	fn process(&self, job: &FileJob) -> FileOutcome {
		if self.log.contains(&job.file_name) {
			info!(file = %job.file_name, "⏭️ Already processed, skipping");
			return FileOutcome::Skipped { file_name: job.file_name.clone() };
		}

		info!(file = %job.file_name, device_slot = job.device_slot, "🎬 Processing file");

		match self.transcribe_file(job) {
			Ok(chunks) => {
				if let Err(e) = self.log.append(&job.file_name) {
					warn!(
						file = %job.file_name,
						error = %e,
						"⚠️ Completion log append failed, the next run will re-process this file"
					);
				}
				info!(file = %job.file_name, device_slot = job.device_slot, chunks, "🏁 Finished processing");
				FileOutcome::Completed {
					file_name: job.file_name.clone(),
					chunks,
				}
			}
			Err(e) => {
				error!(file = %job.file_name, device_slot = job.device_slot, error = %e, "❌ File failed");
				FileOutcome::Failed {
					file_name: job.file_name.clone(),
					error: e.to_string(),
				}
			}
		}
	}

	/// Bind, chunk, transcribe sequentially, then write the artifact.
	///
	/// Chunks of one file are never parallelized; segment order must match
	/// window order. The artifact is written only after the whole file has
	/// transcribed, so a failure discards partial segments instead of
	/// leaving them behind.
	fn transcribe_file(&self, job: &FileJob) -> Result<usize, TranscribeError> {
		let mut binding = self.engine.bind(job.device_slot)?;
		let prepared = audio::load_prepared(&job.path)?;

		let plan = chunker::windows(prepared.duration_ms(), self.window_ms);
		debug!(file = %job.file_name, duration_ms = prepared.duration_ms(), windows = plan.len(), "🪟 Chunk plan ready");

		let mut rows = Vec::with_capacity(plan.len());
		for window in &plan {
			if self.cancellation_token.is_cancelled() {
				return Err(TranscribeError::Cancelled);
			}

			let text = binding.transcribe(prepared.window(window.start_ms, window.end_ms))?;
			rows.push(TranscriptRow::new(window.start_ms, window.end_ms, text));
			self.state.record_chunk();
		}

		sink::write_rows(&self.output_dir, &job.file_name, &rows)?;
		Ok(rows.len())
	}
}
