use hound::{SampleFormat, WavReader};
use std::path::Path;
use tracing::debug;

use crate::error::TranscribeError;

/// Sample rate the engine expects. All inputs are resampled to this.
pub const ENGINE_SAMPLE_RATE: u32 = 16_000;

const SAMPLES_PER_MS: u64 = ENGINE_SAMPLE_RATE as u64 / 1_000;

/// One input file decoded, downmixed to mono and resampled to the engine
/// rate. Loaded once per file and immutable afterwards; chunk slices borrow
/// from it.
#[derive(Debug)]
pub struct PreparedAudio {
	samples: Vec<f32>,
}

impl PreparedAudio {
	pub fn duration_ms(&self) -> u64 {
		self.samples.len() as u64 / SAMPLES_PER_MS
	}

	/// Samples covering `[start_ms, end_ms)`.
	pub fn window(&self, start_ms: u64, end_ms: u64) -> &[f32] {
		let len = self.samples.len();
		let start = (start_ms * SAMPLES_PER_MS) as usize;
		let end = (end_ms * SAMPLES_PER_MS) as usize;
		&self.samples[start.min(len)..end.min(len)]
	}
}

/// Open a WAV file and prepare it for the engine.
///
/// Accepts integer and float PCM at any rate and channel count.
pub fn load_prepared(path: &Path) -> Result<PreparedAudio, TranscribeError> {
	let mut reader = WavReader::open(path)?;
	let spec = reader.spec();

	let samples: Vec<f32> = match spec.sample_format {
		SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
		SampleFormat::Int => {
			let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
			reader.samples::<i32>().map(|s| s.map(|v| v as f32 / scale)).collect::<Result<_, _>>()?
		}
	};

	debug!(
		path = %path.display(),
		sample_rate = spec.sample_rate,
		channels = spec.channels,
		samples = samples.len(),
		"🎧 Audio decoded"
	);

	let mono = downmix(samples, spec.channels);
	let samples = resample_simple(&mono, spec.sample_rate, ENGINE_SAMPLE_RATE);

	Ok(PreparedAudio { samples })
}

fn downmix(samples: Vec<f32>, channels: u16) -> Vec<f32> {
	if channels <= 1 {
		return samples;
	}

	let channels = channels as usize;
	samples.chunks(channels).map(|frame| frame.iter().sum::<f32>() / channels as f32).collect()
}

fn resample_simple(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
	if from_rate == to_rate {
		return samples.to_vec();
	}

	let ratio = from_rate as f32 / to_rate as f32;
	let output_len = (samples.len() as f32 / ratio) as usize;

	(0..output_len)
		.map(|i| {
			let src_idx = (i as f32 * ratio) as usize;
			samples.get(src_idx).copied().unwrap_or(0.0)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use hound::{WavSpec, WavWriter};
	use std::path::PathBuf;

	fn write_wav(dir: &Path, name: &str, sample_rate: u32, channels: u16, frames: usize) -> PathBuf {
		let path = dir.join(name);
		let spec = WavSpec {
			channels,
			sample_rate,
			bits_per_sample: 16,
			sample_format: SampleFormat::Int,
		};
		let mut writer = WavWriter::create(&path, spec).unwrap();
		for i in 0..frames * channels as usize {
			writer.write_sample((i % 128) as i16).unwrap();
		}
		writer.finalize().unwrap();
		path
	}

	#[test]
	fn test_mono_16k_duration() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_wav(dir.path(), "a.wav", 16_000, 1, 16_000);

		let audio = load_prepared(&path).unwrap();
		assert_eq!(audio.duration_ms(), 1_000);
		assert_eq!(audio.window(0, 500).len(), 8_000);
		assert_eq!(audio.window(500, 1_000).len(), 8_000);
	}

	#[test]
	fn test_stereo_is_downmixed() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_wav(dir.path(), "a.wav", 16_000, 2, 16_000);

		let audio = load_prepared(&path).unwrap();
		assert_eq!(audio.duration_ms(), 1_000);
	}

	#[test]
	fn test_low_rate_is_resampled_up() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_wav(dir.path(), "a.wav", 8_000, 1, 8_000);

		let audio = load_prepared(&path).unwrap();
		assert_eq!(audio.duration_ms(), 1_000);
	}

	#[test]
	fn test_empty_file_has_zero_duration() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_wav(dir.path(), "a.wav", 16_000, 1, 0);

		let audio = load_prepared(&path).unwrap();
		assert_eq!(audio.duration_ms(), 0);
	}

	#[test]
	fn test_float_samples_are_accepted() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("f.wav");
		let spec = WavSpec {
			channels: 1,
			sample_rate: 16_000,
			bits_per_sample: 32,
			sample_format: SampleFormat::Float,
		};
		let mut writer = WavWriter::create(&path, spec).unwrap();
		for _ in 0..16_000 {
			writer.write_sample(0.1_f32).unwrap();
		}
		writer.finalize().unwrap();

		let audio = load_prepared(&path).unwrap();
		assert_eq!(audio.duration_ms(), 1_000);
	}

	#[test]
	fn test_missing_file_is_decode_error() {
		let dir = tempfile::tempdir().unwrap();
		let err = load_prepared(&dir.path().join("nope.wav")).unwrap_err();
		assert!(matches!(err, TranscribeError::Decode(_)));
	}

	#[test]
	fn test_window_clamps_to_duration() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_wav(dir.path(), "a.wav", 16_000, 1, 1_600);

		let audio = load_prepared(&path).unwrap();
		assert_eq!(audio.duration_ms(), 100);
		assert_eq!(audio.window(0, 100).len(), 1_600);
	}
}
