use std::time::Instant;
use tracing::{info, warn};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::error::TranscribeError;

/// A transcription backend that can be bound to one compute device.
///
/// The selector string it was built from is opaque to the rest of the
/// pipeline. Implementations must be shareable across workers; each worker
/// binds its own handle per file.
pub trait TranscriptionEngine: Send + Sync {
	/// Acquire a per-file handle pinned to `device_slot`. A failed bind is a
	/// per-file failure and must leave the slot usable for the next file.
	fn bind(&self, device_slot: usize) -> Result<Box<dyn EngineBinding>, TranscribeError>;
}

/// Exclusive per-file handle to a bound engine.
///
/// `transcribe` is synchronous and potentially slow (seconds per chunk); it
/// is never called concurrently on the same handle.
pub trait EngineBinding: Send {
	fn transcribe(&mut self, samples: &[f32]) -> Result<String, TranscribeError>;
}

/// Whisper-backed engine. Holds only the model selector; the model itself is
/// loaded at bind time so that a load failure stays scoped to one file.
pub struct WhisperEngine {
	model_path: String,
	threads: i32,
	use_gpu: bool,
}

impl WhisperEngine {
	pub const fn new(model_path: String, threads: i32, use_gpu: bool) -> Self {
		Self { model_path, threads, use_gpu }
	}
}

impl TranscriptionEngine for WhisperEngine {
	fn bind(&self, device_slot: usize) -> Result<Box<dyn EngineBinding>, TranscribeError> {
		info!(model = %self.model_path, device_slot, "🔄 Loading Whisper model...");
		let start = Instant::now();

		let ctx_params = WhisperContextParameters {
			use_gpu: self.use_gpu,
			gpu_device: device_slot as i32,
			..Default::default()
		};

		let ctx = WhisperContext::new_with_params(&self.model_path, ctx_params).map_err(|e| TranscribeError::Bind {
			slot: device_slot,
			reason: e.to_string(),
		})?;

		info!(load_time_ms = start.elapsed().as_millis(), device_slot, "✅ Whisper model loaded");

		Ok(Box::new(WhisperBinding { ctx, threads: self.threads }))
	}
}

struct WhisperBinding {
	ctx: WhisperContext,
	threads: i32,
}

impl EngineBinding for WhisperBinding {
	fn transcribe(&mut self, samples: &[f32]) -> Result<String, TranscribeError> {
		let mut state = self
			.ctx
			.create_state()
			.map_err(|e| TranscribeError::Transcription(format!("Failed to create Whisper state: {e}")))?;

		state
			.full(create_params(self.threads), samples)
			.map_err(|e| TranscribeError::Transcription(e.to_string()))?;

		let num_segments = state.full_n_segments();
		if num_segments == 0 {
			warn!("⚠️ No segments extracted - audio may be silence");
			return Ok(String::new());
		}

		let mut text = String::new();
		for i in 0..num_segments {
			if let Some(segment) = state.get_segment(i) {
				if let Ok(segment_text) = segment.to_str() {
					let trimmed = segment_text.trim();
					if !trimmed.is_empty() {
						if !text.is_empty() {
							text.push(' ');
						}
						text.push_str(trimmed);
					}
				}
			}
		}

		Ok(text)
	}
}

fn create_params(threads: i32) -> FullParams<'static, 'static> {
	let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
	params.set_translate(false);
	params.set_print_special(false);
	params.set_print_progress(false);
	params.set_print_realtime(false);
	params.set_print_timestamps(false);
	params.set_n_threads(threads);
	params
}
