use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// File name of the on-disk log, one completed input file name per line.
pub const LOG_FILE_NAME: &str = "processed_files.log";

#[derive(Error, Debug)]
pub enum LogError {
	#[error("Completion log I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// Durable, append-only record of input files that finished processing.
///
/// This is the sole source of truth for resumption: a name is appended only
/// after the file's artifact has been fully written, and a name present here
/// is never processed again. The membership check and the append share one
/// internal mutex so that concurrent workers cannot both decide a file is
/// still pending after one of them has recorded it.
pub struct CompletionLog {
	path: PathBuf,
	inner: Mutex<LogInner>,
}

struct LogInner {
	completed: HashSet<String>,
	writer: File,
}

impl CompletionLog {
	/// Load the log for an output directory, reading any prior runs' entries
	/// in full before the first query. An absent file means nothing has been
	/// completed yet; an unreadable file is an error the caller treats as
	/// fatal.
	pub fn load(output_dir: &Path) -> Result<Self, LogError> {
		let path = output_dir.join(LOG_FILE_NAME);

		let mut completed = HashSet::new();
		match std::fs::read_to_string(&path) {
			Ok(contents) => {
				for line in contents.lines() {
					let name = line.trim();
					if !name.is_empty() {
						completed.insert(name.to_string());
					}
				}
			}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
			Err(e) => return Err(e.into()),
		}

		let writer = OpenOptions::new().create(true).append(true).open(&path)?;

		Ok(Self {
			path,
			inner: Mutex::new(LogInner { completed, writer }),
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// True iff `name` was recorded complete in this or any prior run.
	pub fn contains(&self, name: &str) -> bool {
		self.lock().completed.contains(name)
	}

	/// Record `name` as complete, flushing the line to disk before returning.
	///
	/// Idempotent: a name already present is not written again. On write
	/// failure the name stays out of the in-memory set as well, so the file
	/// is treated as not completed and a future run re-processes it.
	pub fn append(&self, name: &str) -> Result<(), LogError> {
		let mut inner = self.lock();
		if inner.completed.contains(name) {
			return Ok(());
		}

		writeln!(inner.writer, "{name}")?;
		inner.writer.flush()?;
		inner.writer.sync_data()?;

		inner.completed.insert(name.to_string());
		Ok(())
	}

	pub fn len(&self) -> usize {
		self.lock().completed.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, LogInner> {
		self.inner.lock().unwrap_or_else(PoisonError::into_inner)
	}
}
