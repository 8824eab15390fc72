use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared counters for one run, updated by workers and read for the summary.
#[derive(Default)]
pub struct RunState {
	pub files_completed: AtomicU64,
	pub files_skipped: AtomicU64,
	pub files_failed: AtomicU64,
	pub chunks_transcribed: AtomicU64,
}

impl RunState {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn record_completed(&self) {
		self.files_completed.fetch_add(1, Ordering::Relaxed);
	}

	pub fn record_skipped(&self) {
		self.files_skipped.fetch_add(1, Ordering::Relaxed);
	}

	pub fn record_failed(&self) {
		self.files_failed.fetch_add(1, Ordering::Relaxed);
	}

	pub fn record_chunk(&self) {
		self.chunks_transcribed.fetch_add(1, Ordering::Relaxed);
	}

	pub fn chunks_transcribed(&self) -> u64 {
		self.chunks_transcribed.load(Ordering::Relaxed)
	}
}
