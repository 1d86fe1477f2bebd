//! Audio sinks.
//!
//! A [`Sink`] is the buffer-queue playback device a
//! [`Streamer`](crate::stream::Streamer) feeds. It hands out
//! voices and buffer slots, accepts uploaded 16-bit PCM, plays the
//! buffers queued on each voice in FIFO order and reports which ones
//! have finished.
//!
//! Two implementations ship with `nagare`:
//! - [`CpalSink`] renders to the default output device (feature `cpal`)
//! - [`DummySink`] has no device; time only moves when [`DummySink::advance`]
//!   is called, which makes playback fully deterministic for tests

mod types;
pub use types::{VoiceId,BufferId,SampleFormat,VoiceState,QueueCounts};

mod sink;
pub use sink::Sink;

mod mixer;
mod resampler;

mod dummy;
pub use dummy::{DummySink,Upload};

cfg_if::cfg_if! {
	if #[cfg(feature = "cpal")] {
		mod cpal;
		pub use self::cpal::CpalSink;
	}
}
