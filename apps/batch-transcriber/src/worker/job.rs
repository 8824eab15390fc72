use std::path::PathBuf;

/// One file's worth of work, fixed at dispatch time.
///
/// The device slot is decided round-robin over the enumeration order and
/// travels with the job, so device pinning is an explicit parameter of the
/// invocation rather than ambient state.
#[derive(Debug, Clone)]
pub struct FileJob {
	/// Bare file name, as recorded in the completion log
	pub file_name: String,

	/// Full path to the input file
	pub path: PathBuf,

	/// Compute device this file's transcription runs on
	pub device_slot: usize,
}

impl FileJob {
	pub const fn new(file_name: String, path: PathBuf, device_slot: usize) -> Self {
		Self { file_name, path, device_slot }
	}
}

/// Terminal state of one dispatched file, reported back to the orchestrator.
#[derive(Debug)]
pub enum FileOutcome {
	/// Fully transcribed, artifact written, completion log appended
	Completed { file_name: String, chunks: usize },

	/// Present in the completion log from a prior run; nothing to do
	Skipped { file_name: String },

	/// Failed at some stage; not logged, so a future run re-attempts it
	Failed { file_name: String, error: String },
}
