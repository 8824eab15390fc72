use thiserror::Error;

/// Closed error taxonomy for a single file's journey through the pipeline.
///
/// Only `Enumeration` is fatal to the run; everything else is caught at the
/// worker boundary, converted to a failed outcome for that file, and the
/// worker moves on. Failed files are never written to the completion log, so
/// the next run will attempt them again.
#[derive(Error, Debug)]
pub enum TranscribeError {
	#[error("Input directory unreadable: {0}")]
	Enumeration(String),
	#[error("Engine bind failed on device {slot}: {reason}")]
	Bind { slot: usize, reason: String },
	#[error("Audio decode failed: {0}")]
	Decode(String),
	#[error("Transcription failed: {0}")]
	Transcription(String),
	#[error("Artifact write failed: {0}")]
	Sink(String),
	#[error("Cancelled at chunk boundary")]
	Cancelled,
}

impl From<hound::Error> for TranscribeError {
	fn from(error: hound::Error) -> Self {
		Self::Decode(error.to_string())
	}
}

impl From<csv::Error> for TranscribeError {
	fn from(error: csv::Error) -> Self {
		Self::Sink(error.to_string())
	}
}
