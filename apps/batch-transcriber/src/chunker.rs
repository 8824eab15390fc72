/// One bounded time window of an audio file, submitted to the engine as a unit.
///
/// Windows tile `[0, duration)` in order with no gaps and no overlap. The
/// final window is clipped to the file's duration, never padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
	pub start_ms: u64,
	pub end_ms: u64,
}

impl Window {
	pub const fn duration_ms(&self) -> u64 {
		self.end_ms - self.start_ms
	}
}

/// Plan fixed-width windows over `[0, duration_ms)`.
///
/// A zero-length file yields an empty plan; the caller treats that file as
/// trivially complete. `window_ms` is validated at configuration time and
/// must be positive.
pub fn windows(duration_ms: u64, window_ms: u64) -> Vec<Window> {
	debug_assert!(window_ms > 0, "window width must be positive");

	let mut plan = Vec::with_capacity((duration_ms / window_ms + 1) as usize);
	let mut start_ms = 0;
	while start_ms < duration_ms {
		let end_ms = (start_ms + window_ms).min(duration_ms);
		plan.push(Window { start_ms, end_ms });
		start_ms = end_ms;
	}
	plan
}
