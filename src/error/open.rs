//---------------------------------------------------------------------------------------------------- Open Errors
#[allow(unused_imports)] // docs
use crate::{source::PcmSource, stream::Streamer};

#[derive(thiserror::Error, Debug)]
/// Errors when opening a [`PcmSource`]
///
/// This `enum` represents all the potential errors that can
/// occur when attempting to turn a file into something
/// a [`Streamer`] can pull PCM frames out of.
///
/// This includes things like:
/// - The file extension not being `.wav`, `.mp3` or `.ogg`
/// - File IO errors (non-existent PATH, lacking-permissions, etc)
/// - The decoder rejecting the file's header
pub enum OpenError {
	#[error("unsupported file extension: {0:?}")]
	/// The file extension is not one of the supported containers.
	///
	/// The `String` is the extension found (empty if there was none).
	UnsupportedExtension(String),

	#[error("failed to open file: {0}")]
	/// Error occurred while reading a [`std::fs::File`] (most likely missing)
	File(#[from] std::io::Error),

	#[error("failed to probe audio data: {0}")]
	/// The decoder rejected the container or codec
	Probe(#[from] symphonia::core::errors::Error),

	#[error("failed to find a decodable track")]
	/// The container did not contain a track with a known codec
	Track,

	#[error("failed to find the codec's sample rate")]
	/// The codec did not specify a (non-zero) sample rate
	SampleRate,

	#[error("unsupported channel count: {0}")]
	/// Only mono and stereo sources can be streamed.
	///
	/// `0` means the codec did not specify a channel layout.
	Channels(usize),
}
