//! A [`Sink`](crate::sink::Sink) without a device.
//!
//! For documentation on the queue semantics, see `sink.rs`.

//----------------------------------------------------------------------------------------------- use
use std::sync::{Arc,Mutex,MutexGuard};
use crate::sink::{
	VoiceId,BufferId,SampleFormat,
	mixer::{self,Mixer,impl_sink},
};

//----------------------------------------------------------------------------------------------- DummySink
/// An in-memory sink where time only passes when told to.
///
/// Nothing is ever rendered; [`DummySink::advance`] consumes queued
/// buffers exactly as a device playing in real-time would, which makes
/// a [`Streamer`](crate::stream::Streamer) fully deterministic to drive.
///
/// Cloning returns another handle to the _same_ sink, so a test can
/// hand one clone to a `Streamer` and keep another to inspect it.
///
/// ```rust
/// # use nagare::sink::*;
/// let mut sink = DummySink::new();
/// let voice = sink.create_voice().unwrap();
/// let buffer = sink.allocate_buffers(1).unwrap()[0];
///
/// // 1 second of mono audio.
/// sink.upload_buffer(buffer, SampleFormat::Mono16, &[0; 100], 100);
/// sink.enqueue(voice, buffer);
/// sink.play(voice);
///
/// sink.advance(0.5);
/// assert_eq!(sink.state(voice), VoiceState::Playing);
/// sink.advance(0.5);
/// assert_eq!(sink.state(voice), VoiceState::Stopped);
/// assert_eq!(sink.dequeue_processed(voice), Some(buffer));
/// ```
#[derive(Clone,Debug)]
pub struct DummySink {
	mixer: Arc<Mutex<Mixer>>,
}

/// A copy of what was last uploaded into a buffer slot.
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Upload {
	/// Layout of `samples`.
	pub format: SampleFormat,
	/// The uploaded interleaved samples.
	pub samples: Vec<i16>,
	/// The uploaded sample rate.
	pub sample_rate: u32,
}

impl Upload {
	#[must_use]
	/// Size of the upload in bytes.
	pub fn byte_len(&self) -> usize {
		self.samples.len() * std::mem::size_of::<i16>()
	}

	#[must_use]
	/// How many frames were uploaded.
	pub fn frames(&self) -> usize {
		self.samples.len() / self.format.channels()
	}
}

//----------------------------------------------------------------------------------------------- DummySink Impl
impl DummySink {
	#[must_use]
	/// Create a sink with unlimited voices and buffer slots.
	pub fn new() -> Self {
		Self {
			mixer: Arc::new(Mutex::new(Mixer::new())),
		}
	}

	#[must_use]
	/// Create a sink that fails to allocate past `voices` voices
	/// or `buffers` buffer slots in total.
	pub fn with_limits(voices: usize, buffers: usize) -> Self {
		let mut mixer = Mixer::new();
		mixer.voice_limit  = Some(voices);
		mixer.buffer_limit = Some(buffers);
		Self {
			mixer: Arc::new(Mutex::new(mixer)),
		}
	}

	fn mixer(&self) -> MutexGuard<'_, Mixer> {
		mixer::lock(&self.mixer)
	}

	/// Let `seconds` of real-time playback pass on every playing voice.
	pub fn advance(&self, seconds: f64) {
		self.mixer().advance(seconds);
	}

	#[must_use]
	/// What was last uploaded into `buffer`, if it exists.
	pub fn upload(&self, buffer: BufferId) -> Option<Upload> {
		self.mixer().buffer(buffer).map(|b| Upload {
			format:      b.format,
			samples:     b.samples.clone(),
			sample_rate: b.sample_rate,
		})
	}

	#[must_use]
	/// How many voices currently exist.
	pub fn voice_count(&self) -> usize {
		self.mixer().voice_count()
	}

	#[must_use]
	/// How many buffer slots currently exist.
	pub fn buffer_count(&self) -> usize {
		self.mixer().buffer_count()
	}

	#[must_use]
	/// The last position set on `voice`.
	pub fn position(&self, voice: VoiceId) -> Option<[f32; 3]> {
		self.mixer().position(voice)
	}

	#[must_use]
	/// The last velocity set on `voice`.
	pub fn velocity(&self, voice: VoiceId) -> Option<[f32; 3]> {
		self.mixer().velocity(voice)
	}
}

impl Default for DummySink {
	fn default() -> Self {
		Self::new()
	}
}

impl_sink!(DummySink);
