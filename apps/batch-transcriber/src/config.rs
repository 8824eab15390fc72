use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "batch-transcriber")]
#[command(about = "Resumable batch audio transcription across a fixed device pool", long_about = None)]
pub struct Config {
	/// Directory containing input audio files
	#[arg(long, env = "INPUT_DIR")]
	pub input_dir: PathBuf,

	/// Directory for transcript artifacts and the completion log (created if absent)
	#[arg(long, env = "OUTPUT_DIR")]
	pub output_dir: PathBuf,

	/// Whisper model path or selector, passed through to the engine
	#[arg(long, env = "WHISPER_MODEL", default_value = "base")]
	pub model: String,

	/// Number of compute devices; also the number of concurrent workers
	#[arg(long, env = "DEVICE_COUNT", default_value = "2")]
	pub devices: usize,

	/// Chunk window width in milliseconds
	#[arg(long, env = "WINDOW_MS", default_value = "30000")]
	pub window_ms: u64,

	/// Input file extension to process
	#[arg(long, env = "AUDIO_EXTENSION", default_value = "wav")]
	pub extension: String,

	/// Number of threads per Whisper invocation
	#[arg(long, env = "WHISPER_THREADS", default_value = "2")]
	pub whisper_threads: i32,

	/// Run the model on CPU; device slots still partition the work
	#[arg(long, env = "NO_GPU")]
	pub no_gpu: bool,
}

impl Config {
	/// Validate configuration values
	pub fn validate(&self) -> Result<(), String> {
		if self.devices == 0 {
			return Err("devices must be at least 1".to_string());
		}

		if self.window_ms == 0 {
			return Err("window_ms must be greater than 0".to_string());
		}

		if self.whisper_threads < 1 {
			return Err("whisper_threads must be at least 1".to_string());
		}

		if self.extension.is_empty() {
			return Err("extension must not be empty".to_string());
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn base_args() -> Vec<&'static str> {
		vec!["batch-transcriber", "--input-dir", "/in", "--output-dir", "/out"]
	}

	#[test]
	fn test_defaults() {
		let config = Config::try_parse_from(base_args()).unwrap();
		assert_eq!(config.model, "base");
		assert_eq!(config.devices, 2);
		assert_eq!(config.window_ms, 30_000);
		assert_eq!(config.extension, "wav");
		assert_eq!(config.whisper_threads, 2);
		assert!(!config.no_gpu);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_overrides() {
		let mut args = base_args();
		args.extend(["--devices", "4", "--window-ms", "10000", "--extension", "flac", "--no-gpu"]);

		let config = Config::try_parse_from(args).unwrap();
		assert_eq!(config.devices, 4);
		assert_eq!(config.window_ms, 10_000);
		assert_eq!(config.extension, "flac");
		assert!(config.no_gpu);
	}

	#[test]
	fn test_zero_devices_rejected() {
		let mut args = base_args();
		args.extend(["--devices", "0"]);
		let config = Config::try_parse_from(args).unwrap();
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_zero_window_rejected() {
		let mut args = base_args();
		args.extend(["--window-ms", "0"]);
		let config = Config::try_parse_from(args).unwrap();
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_missing_input_dir_rejected() {
		assert!(Config::try_parse_from(["batch-transcriber", "--output-dir", "/out"]).is_err());
	}
}
