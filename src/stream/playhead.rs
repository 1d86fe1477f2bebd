//! Playhead estimation.

//---------------------------------------------------------------------------------------------------- Playhead
/// Everything needed to estimate what is audible right now.
///
/// The decode counter runs ahead of the speakers by however much audio
/// is sitting in queued buffers. The estimate subtracts that queued audio,
/// then adds back how far the sink is into the buffer currently sounding:
///
/// ```text
/// elapsed = frames_handed / sample_rate
///         - pending_buffers * frames_per_chunk / sample_rate
///         + sub_buffer_offset
/// ```
///
/// clamped to `0.0..=duration`.
///
/// ```rust
/// # use nagare::stream::*;
/// let playhead = Playhead {
///     frames_handed:     88_200, // 2 seconds decoded
///     pending_buffers:   2,      // 1 second of that not heard yet
///     frames_per_chunk:  22_050,
///     sample_rate:       44_100,
///     sub_buffer_offset: 0.25,   // a quarter second into the current buffer
/// };
/// assert_eq!(playhead.elapsed(4.0), 1.25);
/// assert_eq!(playhead.elapsed(1.0), 1.0);
/// ```
#[derive(Copy,Clone,Debug,Default,PartialEq)]
pub struct Playhead {
	/// Frames written into buffers so far.
	pub frames_handed: u64,
	/// Queued buffers the sink has not finished playing.
	pub pending_buffers: usize,
	/// Frames in one full chunk.
	pub frames_per_chunk: usize,
	/// Frames per second.
	pub sample_rate: u32,
	/// Seconds the sink is into the currently sounding buffer.
	pub sub_buffer_offset: f64,
}

impl Playhead {
	#[must_use]
	/// Elapsed seconds, clamped to `0.0..=duration`.
	///
	/// A zero `sample_rate` or a non-finite estimate yields `0.0`.
	pub fn elapsed(&self, duration: f64) -> f64 {
		if self.sample_rate == 0 {
			return 0.0;
		}
		let rate   = f64::from(self.sample_rate);
		let queued = (self.pending_buffers * self.frames_per_chunk) as f64;

		let elapsed = self.frames_handed as f64 / rate
			- queued / rate
			+ self.sub_buffer_offset;

		if elapsed.is_finite() {
			elapsed.clamp(0.0, duration.max(0.0))
		} else {
			0.0
		}
	}

	#[must_use]
	/// [`Self::elapsed`] as a fraction of `duration`, in `0.0..=1.0`.
	///
	/// `0.0` if `duration` is not positive.
	pub fn progress(&self, duration: f64) -> f64 {
		if duration > 0.0 {
			(self.elapsed(duration) / duration).clamp(0.0, 1.0)
		} else {
			0.0
		}
	}
}
