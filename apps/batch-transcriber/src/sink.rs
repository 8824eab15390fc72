use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::TranscribeError;

const CSV_HEADER: [&str; 3] = ["Start Time", "End Time", "Transcription"];

/// One output row: a chunk's time window and its transcript text.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptRow {
	pub start: String,
	pub end: String,
	pub text: String,
}

impl TranscriptRow {
	pub fn new(start_ms: u64, end_ms: u64, text: String) -> Self {
		Self {
			start: format_timestamp(start_ms),
			end: format_timestamp(end_ms),
			text,
		}
	}
}

/// Format milliseconds as `HH:MM:SS`.
pub fn format_timestamp(ms: u64) -> String {
	let hours = ms / 3_600_000;
	let minutes = (ms % 3_600_000) / 60_000;
	let seconds = (ms % 60_000) / 1_000;
	format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Artifact file name for an input file: the final extension becomes `.csv`.
pub fn artifact_name(file_name: &str) -> String {
	match file_name.rsplit_once('.') {
		Some((stem, _)) => format!("{stem}.csv"),
		None => format!("{file_name}.csv"),
	}
}

/// Write a file's complete, ordered transcript to its CSV artifact.
///
/// The rows are written to a temporary file in the output directory and
/// renamed over the final path, so readers never observe a half-written
/// artifact and a stale partial file from an interrupted run is replaced.
/// An empty transcript still produces the header row.
pub fn write_rows(output_dir: &Path, file_name: &str, rows: &[TranscriptRow]) -> Result<PathBuf, TranscribeError> {
	let artifact_path = output_dir.join(artifact_name(file_name));

	let mut tmp = NamedTempFile::new_in(output_dir).map_err(|e| TranscribeError::Sink(e.to_string()))?;
	{
		let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(tmp.as_file_mut());
		writer.write_record(CSV_HEADER)?;
		for row in rows {
			writer.serialize(row)?;
		}
		writer.flush().map_err(|e| TranscribeError::Sink(e.to_string()))?;
	}
	tmp.as_file().sync_all().map_err(|e| TranscribeError::Sink(e.to_string()))?;
	tmp.persist(&artifact_path).map_err(|e| TranscribeError::Sink(e.to_string()))?;

	debug!(artifact = %artifact_path.display(), rows = rows.len(), "💾 Artifact written");
	Ok(artifact_path)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_format_timestamp() {
		assert_eq!(format_timestamp(0), "00:00:00");
		assert_eq!(format_timestamp(999), "00:00:00");
		assert_eq!(format_timestamp(59_999), "00:00:59");
		assert_eq!(format_timestamp(60_000), "00:01:00");
		assert_eq!(format_timestamp(3_599_999), "00:59:59");
		assert_eq!(format_timestamp(3_600_000), "01:00:00");
		assert_eq!(format_timestamp(7_261_000), "02:01:01");
	}

	#[test]
	fn test_artifact_name() {
		assert_eq!(artifact_name("a.wav"), "a.csv");
		assert_eq!(artifact_name("talk.2024.wav"), "talk.2024.csv");
		assert_eq!(artifact_name("noext"), "noext.csv");
	}

	#[test]
	fn test_rows_are_written_in_order_with_header() {
		let dir = tempfile::tempdir().unwrap();
		let rows = vec![
			TranscriptRow::new(0, 30_000, "first".to_string()),
			TranscriptRow::new(30_000, 45_000, "second".to_string()),
		];

		let path = write_rows(dir.path(), "a.wav", &rows).unwrap();

		let contents = std::fs::read_to_string(path).unwrap();
		let lines: Vec<&str> = contents.lines().collect();
		assert_eq!(lines.len(), 3);
		assert_eq!(lines[0], "Start Time,End Time,Transcription");
		assert_eq!(lines[1], "00:00:00,00:00:30,first");
		assert_eq!(lines[2], "00:00:30,00:00:45,second");
	}

	#[test]
	fn test_empty_transcript_writes_header_only() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_rows(dir.path(), "b.wav", &[]).unwrap();

		let contents = std::fs::read_to_string(path).unwrap();
		assert_eq!(contents.lines().count(), 1);
	}

	#[test]
	fn test_existing_artifact_is_replaced() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("a.csv"), "half-written garbage").unwrap();

		let rows = vec![TranscriptRow::new(0, 1_000, "clean".to_string())];
		let path = write_rows(dir.path(), "a.wav", &rows).unwrap();

		let contents = std::fs::read_to_string(path).unwrap();
		assert!(contents.starts_with("Start Time"));
		assert!(contents.contains("clean"));
		assert!(!contents.contains("garbage"));
	}

	#[test]
	fn test_text_with_commas_is_quoted() {
		let dir = tempfile::tempdir().unwrap();
		let rows = vec![TranscriptRow::new(0, 1_000, "one, two, three".to_string())];
		let path = write_rows(dir.path(), "q.wav", &rows).unwrap();

		let contents = std::fs::read_to_string(path).unwrap();
		assert!(contents.contains("\"one, two, three\""));
	}
}
