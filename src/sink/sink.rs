//! The abstract buffer-queue audio device.
//!
//! The trait `Sink` is the ideal abstract simplification of the
//! device calls a stream needs: a voice to queue buffers on, a handful
//! of reusable buffer slots, and enough introspection to know when a
//! slot can be refilled and how far into the current one playback is.

//----------------------------------------------------------------------------------------------- use
use crate::{
	error::SinkError,
	sink::{VoiceId,BufferId,SampleFormat,VoiceState,QueueCounts},
};

#[allow(unused_imports)] // docs
use crate::stream::Streamer;

//----------------------------------------------------------------------------------------------- Sink Trait
/// A buffer-queue audio device.
///
/// Implementors are expected to follow these invariants,
/// which [`Streamer`] relies on:
/// 1. Buffers queued on a voice play in FIFO order
/// 2. A buffer is reported as processed only after it was fully played,
///    and processed buffers always form a prefix of the queue
/// 3. A playing voice that runs out of unprocessed buffers
///    transitions to [`VoiceState::Stopped`] on its own
/// 4. Playing a stopped voice restarts its queue from the first buffer;
///    playing a paused voice resumes where it was
///
/// Unknown ids are ignored (queries return neutral values), the same way
/// a hardware API would reject them without affecting other voices.
pub trait Sink {
	/// Create a new, stopped voice with an empty queue.
	fn create_voice(&mut self) -> Result<VoiceId, SinkError>;

	/// Destroy a voice, detaching all its buffers.
	fn destroy_voice(&mut self, voice: VoiceId);

	/// Allocate `n` empty buffer slots.
	///
	/// This is all-or-nothing: on error, nothing was allocated.
	fn allocate_buffers(&mut self, n: usize) -> Result<Vec<BufferId>, SinkError>;

	/// Release buffer slots.
	fn deallocate_buffers(&mut self, buffers: &[BufferId]);

	/// Replace the contents of a buffer slot.
	///
	/// `samples` are interleaved signed 16-bit samples laid out
	/// as `format` says, i.e. `samples.len() / format.channels()` frames.
	///
	/// Must not be called on a buffer that is queued on a voice.
	fn upload_buffer(&mut self, buffer: BufferId, format: SampleFormat, samples: &[i16], sample_rate: u32);

	/// Append a buffer to the tail of a voice's queue.
	fn enqueue(&mut self, voice: VoiceId, buffer: BufferId);

	/// Detach the oldest processed buffer from the head of a voice's queue.
	///
	/// Returns `None` if no buffer has been processed.
	fn dequeue_processed(&mut self, voice: VoiceId) -> Option<BufferId>;

	/// Rewind the voice and detach every queued buffer, processed or not.
	///
	/// The voice is left [`VoiceState::Stopped`].
	fn clear_queue(&mut self, voice: VoiceId);

	/// Current playback state of a voice.
	fn state(&self, voice: VoiceId) -> VoiceState;

	/// Processed/queued buffer counts of a voice.
	fn counts(&self, voice: VoiceId) -> QueueCounts;

	/// How far (in seconds of buffer audio) playback
	/// has progressed into the currently sounding buffer.
	fn sub_offset_seconds(&self, voice: VoiceId) -> f64;

	/// Start or resume a voice.
	fn play(&mut self, voice: VoiceId);

	/// Pause a voice, keeping its position and queue.
	fn pause(&mut self, voice: VoiceId);

	/// Stop a voice and rewind it to the start of its queue.
	fn stop(&mut self, voice: VoiceId);

	/// Set the linear gain of a voice (`1.0` is unity).
	fn set_gain(&mut self, voice: VoiceId, gain: f32);

	/// The linear gain of a voice.
	fn gain(&self, voice: VoiceId) -> f32;

	/// Set the playback rate multiplier of a voice (`1.0` is normal speed).
	///
	/// Non-positive or non-finite values are ignored.
	fn set_pitch(&mut self, voice: VoiceId, pitch: f32);

	/// The playback rate multiplier of a voice.
	fn pitch(&self, voice: VoiceId) -> f32;

	/// Set the position of a voice in 3D space.
	fn set_position(&mut self, voice: VoiceId, position: [f32; 3]);

	/// Set the velocity of a voice in 3D space.
	fn set_velocity(&mut self, voice: VoiceId, velocity: [f32; 3]);
}
