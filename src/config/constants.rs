//! Default values for [`StreamConfig`](crate::config::StreamConfig).

//---------------------------------------------------------------------------------------------------- Constants
/// How many bytes of PCM each buffer slot holds by default.
///
/// At 44.1 kHz stereo this is ~0.37 seconds of audio per slot.
pub const DEFAULT_CHUNK_SIZE: usize = 65_536;

/// How many buffer slots a stream cycles through by default.
///
/// More slots means more audio queued ahead of the playhead
/// (more tolerance for a late `update()`), fewer means less
/// latency on seek and less memory.
pub const DEFAULT_RING_SIZE: usize = 4;

/// All uploaded PCM is signed 16-bit.
pub(crate) const BYTES_PER_SAMPLE: usize = 2;
