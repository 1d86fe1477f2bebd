//---------------------------------------------------------------------------------------------------- use
use crate::config::{DEFAULT_CHUNK_SIZE,DEFAULT_RING_SIZE,BYTES_PER_SAMPLE};

#[allow(unused_imports)] // docs
use crate::stream::Streamer;

//---------------------------------------------------------------------------------------------------- StreamConfig
/// Construction config for a [`Streamer`].
///
/// This is passed once to [`Streamer::open`] / [`Streamer::new`].
/// `looping` and `surround` can be changed afterwards with
/// [`Streamer::set_looping`] and [`Streamer::set_surround`];
/// the chunk and ring sizes are fixed for the stream's lifetime.
#[derive(Copy,Clone,Debug,PartialEq,Eq,Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamConfig {
	/// How many bytes of 16-bit PCM each buffer slot is filled with.
	///
	/// This is rounded down to a whole number of frames
	/// (`channels * 2` bytes) once the source's channel count is known,
	/// and is never less than one frame.
	pub chunk_size: usize,

	/// How many buffer slots the stream cycles through.
	///
	/// `0` is treated as `1`.
	pub ring_size: usize,

	/// Wrap back to the start of the file when it ends.
	pub looping: bool,

	/// Downmix stereo sources to mono before uploading.
	///
	/// The name is historical: this does _not_ enable
	/// multichannel output, it forces a mono (downmixed)
	/// upload for 2-channel sources. Mono sources are unaffected.
	pub surround: bool,
}

//---------------------------------------------------------------------------------------------------- StreamConfig Impl
impl StreamConfig {
	/// A reasonable default [`StreamConfig`].
	///
	/// ```rust
	/// # use nagare::config::*;
	/// assert_eq!(StreamConfig::DEFAULT, StreamConfig {
	///     chunk_size: 65_536,
	///     ring_size:  4,
	///     looping:    false,
	///     surround:   false,
	/// });
	/// ```
	pub const DEFAULT: Self = Self {
		chunk_size: DEFAULT_CHUNK_SIZE,
		ring_size:  DEFAULT_RING_SIZE,
		looping:    false,
		surround:   false,
	};

	#[must_use]
	/// The chunk size in bytes, rounded down to whole
	/// `channels`-channel 16-bit frames (minimum one frame).
	///
	/// ```rust
	/// # use nagare::config::*;
	/// let config = StreamConfig { chunk_size: 65_537, ..StreamConfig::DEFAULT };
	/// assert_eq!(config.chunk_size_for(2), 65_536);
	/// assert_eq!(config.chunk_size_for(1), 65_536);
	///
	/// let config = StreamConfig { chunk_size: 3, ..StreamConfig::DEFAULT };
	/// assert_eq!(config.chunk_size_for(2), 4);
	/// ```
	pub const fn chunk_size_for(&self, channels: u16) -> usize {
		let frame_size = channels as usize * BYTES_PER_SAMPLE;
		if frame_size == 0 {
			return 0;
		}
		let frames = self.chunk_size / frame_size;
		if frames == 0 {
			frame_size
		} else {
			frames * frame_size
		}
	}

	#[must_use]
	/// The ring size, never less than `1`.
	pub const fn ring_size(&self) -> usize {
		if self.ring_size == 0 {
			1
		} else {
			self.ring_size
		}
	}
}

impl Default for StreamConfig {
	fn default() -> Self {
		Self::DEFAULT
	}
}
