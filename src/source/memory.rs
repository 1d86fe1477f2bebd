//---------------------------------------------------------------------------------------------------- Use
use std::sync::Arc;
use crate::source::PcmSource;

//---------------------------------------------------------------------------------------------------- MemorySource
/// A [`PcmSource`] over PCM that is already decoded in memory.
///
/// The samples are shared, so cloning is cheap and each
/// clone has its own cursor.
///
/// ```rust
/// # use nagare::source::*;
/// // 3 stereo frames.
/// let mut source = MemorySource::new(2, 48_000, vec![1, 2, 3, 4, 5, 6]);
/// assert_eq!(source.total_frames(), 3);
///
/// let mut dst = [0; 4];
/// assert_eq!(source.read(&mut dst), 2);
/// assert_eq!(dst, [1, 2, 3, 4]);
/// assert_eq!(source.read(&mut dst), 1);
/// assert_eq!(source.read(&mut dst), 0);
/// ```
#[derive(Clone,Debug)]
pub struct MemorySource {
	samples:      Arc<[i16]>,
	channels:     u16,
	sample_rate:  u32,
	/// Current frame.
	cursor:       usize,
	/// Upper bound on frames returned per `read()`.
	max_read:     Option<usize>,
	/// Whether `total_frames()` reports the real length.
	known_length: bool,
}

impl MemorySource {
	#[must_use]
	/// Wrap interleaved `samples` with `channels` channels at `sample_rate`.
	///
	/// A trailing partial frame is never read.
	pub fn new(channels: u16, sample_rate: u32, samples: impl Into<Arc<[i16]>>) -> Self {
		Self {
			samples: samples.into(),
			channels,
			sample_rate,
			cursor: 0,
			max_read: None,
			known_length: true,
		}
	}

	#[must_use]
	/// Return at most `frames` frames per `read()`,
	/// like a decoder handing out one packet at a time.
	pub fn with_max_read(mut self, frames: usize) -> Self {
		self.max_read = Some(frames.max(1));
		self
	}

	#[must_use]
	/// Report `0` (unknown) from `total_frames()`.
	pub fn with_unknown_length(mut self) -> Self {
		self.known_length = false;
		self
	}

	/// Frames actually held.
	fn frames(&self) -> usize {
		match self.channels {
			0 => 0,
			c => self.samples.len() / usize::from(c),
		}
	}
}

//---------------------------------------------------------------------------------------------------- PcmSource Impl
impl PcmSource for MemorySource {
	fn channels(&self) -> u16 {
		self.channels
	}

	fn sample_rate(&self) -> u32 {
		self.sample_rate
	}

	fn total_frames(&self) -> u64 {
		if self.known_length {
			self.frames() as u64
		} else {
			0
		}
	}

	fn read(&mut self, dst: &mut [i16]) -> usize {
		if self.channels == 0 {
			return 0;
		}
		let channels = usize::from(self.channels);

		let mut frames = (dst.len() / channels).min(self.frames().saturating_sub(self.cursor));
		if let Some(max) = self.max_read {
			frames = frames.min(max);
		}

		let start = self.cursor * channels;
		let len   = frames * channels;
		dst[..len].copy_from_slice(&self.samples[start..start + len]);
		self.cursor += frames;
		frames
	}

	fn seek(&mut self, frame: u64) {
		self.cursor = usize::try_from(frame).unwrap_or(usize::MAX).min(self.frames());
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn short_reads() {
		let mut source = MemorySource::new(1, 10, (0..10).collect::<Vec<i16>>()).with_max_read(3);
		let mut dst = [0; 8];
		assert_eq!(source.read(&mut dst), 3);
		assert_eq!(&dst[..3], &[0, 1, 2]);
		assert_eq!(source.read(&mut dst), 3);
		assert_eq!(source.read(&mut dst), 3);
		assert_eq!(source.read(&mut dst), 1);
		assert_eq!(source.read(&mut dst), 0);
	}

	#[test]
	fn seek_clamps_to_end() {
		let mut source = MemorySource::new(2, 10, vec![0; 20]);
		source.seek(u64::MAX);
		assert_eq!(source.read(&mut [0; 4]), 0);
		source.seek(9);
		assert_eq!(source.read(&mut [0; 4]), 1);
	}

	#[test]
	fn unknown_length() {
		let source = MemorySource::new(1, 10, vec![0; 20]).with_unknown_length();
		assert_eq!(source.total_frames(), 0);
	}
}
