//! Audio sources.
//!
//! A [`PcmSource`] is a decode cursor over interleaved signed 16-bit
//! PCM frames. [`open`] picks the decoder from the file extension once;
//! after that, nothing downstream branches on the container again.

//---------------------------------------------------------------------------------------------------- Use
use std::path::Path;
use crate::error::OpenError;

mod container;
pub use container::Container;

mod decode;
pub use decode::SymphoniaSource;

mod memory;
pub use memory::MemorySource;

//---------------------------------------------------------------------------------------------------- PcmSource
/// A cursor over decoded 16-bit PCM frames.
///
/// Invariants:
/// 1. `channels()` and `sample_rate()` never change
/// 2. `read()` never decodes fewer channels than `channels()` says,
///    downmixing is the caller's business
/// 3. A short or zero-frame `read()` is a normal signal, not a failure;
///    `0` means the source is exhausted until the next `seek()`
pub trait PcmSource: Send {
	/// Interleaved channels per frame.
	fn channels(&self) -> u16;

	/// Frames per second.
	fn sample_rate(&self) -> u32;

	/// Total frames in the source, `0` if unknown.
	fn total_frames(&self) -> u64;

	/// Read up to `dst.len() / channels()` whole frames into `dst`,
	/// starting at the cursor, and advance the cursor past them.
	///
	/// Returns the amount of _frames_ read.
	fn read(&mut self, dst: &mut [i16]) -> usize;

	/// Move the cursor to an absolute frame.
	///
	/// Seeking past the end leaves the source exhausted.
	fn seek(&mut self, frame: u64);
}

impl<T: PcmSource + ?Sized> PcmSource for Box<T> {
	fn channels(&self) -> u16 {
		(**self).channels()
	}
	fn sample_rate(&self) -> u32 {
		(**self).sample_rate()
	}
	fn total_frames(&self) -> u64 {
		(**self).total_frames()
	}
	fn read(&mut self, dst: &mut [i16]) -> usize {
		(**self).read(dst)
	}
	fn seek(&mut self, frame: u64) {
		(**self).seek(frame);
	}
}

//---------------------------------------------------------------------------------------------------- Open
/// Open the file at `path` with the decoder its extension selects.
///
/// # Errors
/// See [`OpenError`].
///
/// ```rust
/// # use nagare::{source, error::OpenError};
/// assert!(matches!(
///     source::open("song.flac"),
///     Err(OpenError::UnsupportedExtension(ext)) if ext == "flac",
/// ));
/// ```
pub fn open(path: impl AsRef<Path>) -> Result<Box<dyn PcmSource>, OpenError> {
	let path = path.as_ref();
	let container = Container::from_path(path)?;
	Ok(Box::new(SymphoniaSource::open(path, container)?))
}
