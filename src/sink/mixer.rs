//! Software buffer-queue voices.
//!
//! `Mixer` owns every voice and buffer slot handed out by the
//! built-in sinks and implements the queue semantics described on
//! [`Sink`](crate::sink::Sink). [`CpalSink`](crate::sink::CpalSink)
//! pulls audio out of it with `render()` from its render thread,
//! [`DummySink`](crate::sink::DummySink) moves time with `advance()`.

//----------------------------------------------------------------------------------------------- use
use std::{
	collections::{HashMap,VecDeque},
	sync::{Mutex,MutexGuard,PoisonError},
};
use crate::{
	error::SinkError,
	sink::{VoiceId,BufferId,SampleFormat,VoiceState,QueueCounts},
	sink::resampler::{Resampler,ResamplerStruct},
	macros::warn2,
};

//----------------------------------------------------------------------------------------------- PcmBuffer
/// The contents of one buffer slot.
#[derive(Clone,Debug,PartialEq,Eq)]
pub(crate) struct PcmBuffer {
	pub(crate) format:      SampleFormat,
	pub(crate) samples:     Vec<i16>,
	pub(crate) sample_rate: u32,
}

impl PcmBuffer {
	/// A freshly allocated slot holds nothing.
	const EMPTY: Self = Self {
		format:      SampleFormat::Mono16,
		samples:     Vec::new(),
		sample_rate: 0,
	};

	pub(crate) fn frames(&self) -> usize {
		self.samples.len() / self.format.channels()
	}

	/// Frame `index` as `(left, right)` in `-1.0..1.0`.
	fn frame(&self, index: usize) -> (f32, f32) {
		let scale = |s: i16| f32::from(s) / 32_768.0;
		match self.format {
			SampleFormat::Mono16 => {
				let s = scale(self.samples[index]);
				(s, s)
			},
			SampleFormat::Stereo16 => (
				scale(self.samples[index * 2]),
				scale(self.samples[index * 2 + 1]),
			),
		}
	}

	/// Buffer playback rate in frames per second at `pitch`.
	fn rate(&self, pitch: f32) -> f64 {
		f64::from(self.sample_rate) * f64::from(pitch)
	}
}

//----------------------------------------------------------------------------------------------- Voice
#[derive(Debug)]
struct Voice {
	queue:     VecDeque<BufferId>,
	/// Length of the processed prefix of `queue`.
	processed: usize,
	/// Frame position inside `queue[processed]`.
	///
	/// Whole frames while rendering, `advance()` may leave a fraction.
	cursor:    f64,
	state:     VoiceState,
	gain:      f32,
	pitch:     f32,
	position:  [f32; 3],
	velocity:  [f32; 3],
	/// `None` while the buffers play at the device rate.
	resampler: Option<ResamplerStruct>,
	/// Planar resampler input.
	chunk:     [Vec<f32>; 2],
	/// Resampled frames not yet mixed.
	pending:   VecDeque<(f32, f32)>,
}

impl Voice {
	const NEW: Self = Self {
		queue:     VecDeque::new(),
		processed: 0,
		cursor:    0.0,
		state:     VoiceState::Stopped,
		gain:      1.0,
		pitch:     1.0,
		position:  [0.0; 3],
		velocity:  [0.0; 3],
		resampler: None,
		chunk:     [Vec::new(), Vec::new()],
		pending:   VecDeque::new(),
	};

	/// Back to the first queued buffer, dropping resampler state.
	fn rewind(&mut self) {
		self.processed = 0;
		self.cursor    = 0.0;
		self.resampler = None;
		self.pending.clear();
	}

	/// Mark the current buffer processed.
	fn finish_current(&mut self) {
		self.processed += 1;
		self.cursor = 0.0;
		if self.processed >= self.queue.len() {
			self.processed = self.queue.len();
			self.state = VoiceState::Stopped;
		}
	}

	/// The current buffer, skipping empty and unknown ones.
	///
	/// Returns `None` once the voice is not playing.
	fn current<'b>(&mut self, buffers: &'b HashMap<BufferId, PcmBuffer>) -> Option<&'b PcmBuffer> {
		loop {
			if self.state != VoiceState::Playing {
				return None;
			}
			let Some(id) = self.queue.get(self.processed) else {
				self.state = VoiceState::Stopped;
				return None;
			};
			match buffers.get(id) {
				Some(b) if b.sample_rate > 0 && (self.cursor as usize) < b.frames() => return Some(b),
				_ => self.finish_current(),
			}
		}
	}

	/// Take the next frame at the buffer's own rate.
	fn next_source_frame(&mut self, buffers: &HashMap<BufferId, PcmBuffer>) -> Option<(f32, f32)> {
		let frame = self.current(buffers)?.frame(self.cursor as usize);
		self.cursor = self.cursor.floor() + 1.0;
		Some(frame)
	}

	/// Produce the next output frame at `device_rate`, before gain.
	///
	/// Returns `None` once the voice is not playing
	/// and nothing resampled is left over.
	fn next_frame(&mut self, buffers: &HashMap<BufferId, PcmBuffer>, device_rate: u32) -> Option<(f32, f32)> {
		loop {
			if self.state == VoiceState::Paused {
				return None;
			}
			if let Some(frame) = self.pending.pop_front() {
				return Some(frame);
			}

			let rate = self.current(buffers)?.rate(self.pitch);
			let device_rate = f64::from(device_rate);
			if rate == device_rate {
				self.resampler = None;
				return self.next_source_frame(buffers);
			}

			let ratio = device_rate / rate;
			let reuse = self.resampler.as_mut().is_some_and(|r| r.set_ratio(ratio));
			if !reuse {
				self.resampler = ResamplerStruct::new(ratio);
			}
			let Some(needed) = self.resampler.as_ref().map(Resampler::input_frames_next) else {
				// Unsupported ratio, play unresampled rather than not at all.
				return self.next_source_frame(buffers);
			};

			for side in &mut self.chunk {
				side.clear();
			}
			while self.chunk[0].len() < needed {
				let Some((left, right)) = self.next_source_frame(buffers) else {
					break;
				};
				self.chunk[0].push(left);
				self.chunk[1].push(right);
			}
			if self.chunk[0].is_empty() {
				continue;
			}
			// The last chunk of a starved queue is padded with silence.
			for side in &mut self.chunk {
				side.resize(needed, 0.0);
			}

			if let Some(resampler) = self.resampler.as_mut() {
				resampler.process(&self.chunk[0], &self.chunk[1], &mut self.pending);
			}
		}
	}

	/// Consume `seconds` of wall-clock playback without producing audio.
	fn advance(&mut self, buffers: &HashMap<BufferId, PcmBuffer>, mut seconds: f64) {
		while seconds > 0.0 {
			let Some(buffer) = self.current(buffers) else {
				return;
			};

			let rate      = buffer.rate(self.pitch);
			let remaining = (buffer.frames() as f64 - self.cursor).max(0.0);
			let step      = seconds * rate;
			if step < remaining {
				self.cursor += step;
				return;
			}

			seconds -= remaining / rate;
			self.finish_current();
		}
	}
}

//----------------------------------------------------------------------------------------------- Mixer
/// Every voice and buffer slot of one sink.
#[derive(Debug)]
pub(crate) struct Mixer {
	voices:  HashMap<VoiceId, Voice>,
	buffers: HashMap<BufferId, PcmBuffer>,
	/// Ids are never reused, `0` is never handed out.
	next_id: u32,
	pub(crate) voice_limit:  Option<usize>,
	pub(crate) buffer_limit: Option<usize>,
}

impl Mixer {
	pub(crate) fn new() -> Self {
		Self {
			voices:       HashMap::new(),
			buffers:      HashMap::new(),
			next_id:      1,
			voice_limit:  None,
			buffer_limit: None,
		}
	}

	fn next_id(&mut self) -> u32 {
		let id = self.next_id;
		self.next_id = self.next_id.wrapping_add(1).max(1);
		id
	}

	//----------------------------------------------------------------------------------------------- Allocation
	pub(crate) fn create_voice(&mut self) -> Result<VoiceId, SinkError> {
		if self.voice_limit.is_some_and(|limit| self.voices.len() >= limit) {
			return Err(SinkError::Allocation);
		}
		let id = VoiceId(self.next_id());
		self.voices.insert(id, Voice::NEW);
		Ok(id)
	}

	pub(crate) fn destroy_voice(&mut self, voice: VoiceId) {
		self.voices.remove(&voice);
	}

	pub(crate) fn allocate_buffers(&mut self, n: usize) -> Result<Vec<BufferId>, SinkError> {
		if self.buffer_limit.is_some_and(|limit| self.buffers.len() + n > limit) {
			return Err(SinkError::Allocation);
		}
		let ids: Vec<BufferId> = (0..n).map(|_| BufferId(self.next_id())).collect();
		for id in &ids {
			self.buffers.insert(*id, PcmBuffer::EMPTY);
		}
		Ok(ids)
	}

	pub(crate) fn deallocate_buffers(&mut self, buffers: &[BufferId]) {
		for id in buffers {
			self.buffers.remove(id);
		}
	}

	pub(crate) fn upload_buffer(&mut self, buffer: BufferId, format: SampleFormat, samples: &[i16], sample_rate: u32) {
		let Some(slot) = self.buffers.get_mut(&buffer) else {
			warn2!("Mixer - upload to unknown buffer {buffer:?}");
			return;
		};
		slot.format = format;
		slot.sample_rate = sample_rate;
		slot.samples.clear();
		slot.samples.extend_from_slice(samples);
	}

	//----------------------------------------------------------------------------------------------- Queue
	pub(crate) fn enqueue(&mut self, voice: VoiceId, buffer: BufferId) {
		if !self.buffers.contains_key(&buffer) {
			warn2!("Mixer - enqueue of unknown buffer {buffer:?}");
			return;
		}
		if let Some(v) = self.voices.get_mut(&voice) {
			v.queue.push_back(buffer);
		}
	}

	pub(crate) fn dequeue_processed(&mut self, voice: VoiceId) -> Option<BufferId> {
		let v = self.voices.get_mut(&voice)?;
		if v.processed == 0 {
			return None;
		}
		v.processed -= 1;
		v.queue.pop_front()
	}

	pub(crate) fn clear_queue(&mut self, voice: VoiceId) {
		if let Some(v) = self.voices.get_mut(&voice) {
			v.queue.clear();
			v.rewind();
			v.state = VoiceState::Stopped;
		}
	}

	//----------------------------------------------------------------------------------------------- Queries
	pub(crate) fn state(&self, voice: VoiceId) -> VoiceState {
		self.voices.get(&voice).map_or(VoiceState::Stopped, |v| v.state)
	}

	pub(crate) fn counts(&self, voice: VoiceId) -> QueueCounts {
		self.voices.get(&voice).map_or(QueueCounts::default(), |v| QueueCounts {
			processed: v.processed,
			queued:    v.queue.len(),
		})
	}

	pub(crate) fn sub_offset_seconds(&self, voice: VoiceId) -> f64 {
		let Some(v) = self.voices.get(&voice) else {
			return 0.0;
		};
		v.queue
			.get(v.processed)
			.and_then(|id| self.buffers.get(id))
			.filter(|b| b.sample_rate > 0)
			.map_or(0.0, |b| v.cursor / f64::from(b.sample_rate))
	}

	//----------------------------------------------------------------------------------------------- Transport
	pub(crate) fn play(&mut self, voice: VoiceId) {
		let Some(v) = self.voices.get_mut(&voice) else {
			return;
		};
		match v.state {
			VoiceState::Playing => (),
			VoiceState::Paused  => v.state = VoiceState::Playing,
			VoiceState::Stopped => {
				v.rewind();
				if !v.queue.is_empty() {
					v.state = VoiceState::Playing;
				}
			},
		}
	}

	pub(crate) fn pause(&mut self, voice: VoiceId) {
		if let Some(v) = self.voices.get_mut(&voice) {
			if v.state == VoiceState::Playing {
				v.state = VoiceState::Paused;
			}
		}
	}

	pub(crate) fn stop(&mut self, voice: VoiceId) {
		if let Some(v) = self.voices.get_mut(&voice) {
			v.rewind();
			v.state = VoiceState::Stopped;
		}
	}

	//----------------------------------------------------------------------------------------------- Voice parameters
	pub(crate) fn set_gain(&mut self, voice: VoiceId, gain: f32) {
		if let Some(v) = self.voices.get_mut(&voice) {
			v.gain = gain;
		}
	}

	pub(crate) fn gain(&self, voice: VoiceId) -> f32 {
		self.voices.get(&voice).map_or(0.0, |v| v.gain)
	}

	pub(crate) fn set_pitch(&mut self, voice: VoiceId, pitch: f32) {
		if !(pitch.is_finite() && pitch > 0.0) {
			warn2!("Mixer - ignoring invalid pitch {pitch}");
			return;
		}
		if let Some(v) = self.voices.get_mut(&voice) {
			v.pitch = pitch;
		}
	}

	pub(crate) fn pitch(&self, voice: VoiceId) -> f32 {
		self.voices.get(&voice).map_or(1.0, |v| v.pitch)
	}

	pub(crate) fn set_position(&mut self, voice: VoiceId, position: [f32; 3]) {
		if let Some(v) = self.voices.get_mut(&voice) {
			v.position = position;
		}
	}

	pub(crate) fn position(&self, voice: VoiceId) -> Option<[f32; 3]> {
		self.voices.get(&voice).map(|v| v.position)
	}

	pub(crate) fn set_velocity(&mut self, voice: VoiceId, velocity: [f32; 3]) {
		if let Some(v) = self.voices.get_mut(&voice) {
			v.velocity = velocity;
		}
	}

	pub(crate) fn velocity(&self, voice: VoiceId) -> Option<[f32; 3]> {
		self.voices.get(&voice).map(|v| v.velocity)
	}

	//----------------------------------------------------------------------------------------------- Playback
	/// Mix every playing voice into `out`, an interleaved
	/// `channels`-channel `f32` buffer at `device_rate`.
	///
	/// Voices whose buffer rate (times pitch) differs from `device_rate`
	/// go through their own band-limited [`Resampler`].
	///
	/// Mono buffers are duplicated to both sides, and a mono
	/// device receives the average of left and right.
	/// Channels past the second are left silent.
	#[cfg_attr(not(feature = "cpal"), allow(dead_code))]
	pub(crate) fn render(&mut self, out: &mut [f32], channels: usize, device_rate: u32) {
		out.fill(0.0);
		if channels == 0 || device_rate == 0 {
			return;
		}

		let Self { voices, buffers, .. } = self;
		for voice in voices.values_mut() {
			for frame in out.chunks_exact_mut(channels) {
				let Some((left, right)) = voice.next_frame(buffers, device_rate) else {
					break;
				};
				let (left, right) = (left * voice.gain, right * voice.gain);
				if let [mono] = frame {
					*mono += (left + right) * 0.5;
				} else {
					frame[0] += left;
					frame[1] += right;
				}
			}
		}

		for sample in out {
			*sample = sample.clamp(-1.0, 1.0);
		}
	}

	/// Let `seconds` of playback pass on every playing voice.
	pub(crate) fn advance(&mut self, seconds: f64) {
		let Self { voices, buffers, .. } = self;
		for voice in voices.values_mut() {
			voice.advance(buffers, seconds);
		}
	}

	//----------------------------------------------------------------------------------------------- Introspection
	pub(crate) fn buffer(&self, buffer: BufferId) -> Option<&PcmBuffer> {
		self.buffers.get(&buffer)
	}

	pub(crate) fn voice_count(&self) -> usize {
		self.voices.len()
	}

	pub(crate) fn buffer_count(&self) -> usize {
		self.buffers.len()
	}
}

//----------------------------------------------------------------------------------------------- Shared handles
/// Lock a shared [`Mixer`].
///
/// A panic while holding the lock cannot leave the mixer's
/// maps half-updated, so a poisoned lock is recovered.
pub(crate) fn lock(mixer: &Mutex<Mixer>) -> MutexGuard<'_, Mixer> {
	mixer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Implement [`Sink`](crate::sink::Sink) for a handle type
/// exposing `fn mixer(&self) -> MutexGuard<'_, Mixer>`.
macro_rules! impl_sink {
	($sink:ty) => {
		impl $crate::sink::Sink for $sink {
			fn create_voice(&mut self) -> Result<$crate::sink::VoiceId, $crate::error::SinkError> {
				self.mixer().create_voice()
			}
			fn destroy_voice(&mut self, voice: $crate::sink::VoiceId) {
				self.mixer().destroy_voice(voice);
			}
			fn allocate_buffers(&mut self, n: usize) -> Result<Vec<$crate::sink::BufferId>, $crate::error::SinkError> {
				self.mixer().allocate_buffers(n)
			}
			fn deallocate_buffers(&mut self, buffers: &[$crate::sink::BufferId]) {
				self.mixer().deallocate_buffers(buffers);
			}
			fn upload_buffer(
				&mut self,
				buffer: $crate::sink::BufferId,
				format: $crate::sink::SampleFormat,
				samples: &[i16],
				sample_rate: u32,
			) {
				self.mixer().upload_buffer(buffer, format, samples, sample_rate);
			}
			fn enqueue(&mut self, voice: $crate::sink::VoiceId, buffer: $crate::sink::BufferId) {
				self.mixer().enqueue(voice, buffer);
			}
			fn dequeue_processed(&mut self, voice: $crate::sink::VoiceId) -> Option<$crate::sink::BufferId> {
				self.mixer().dequeue_processed(voice)
			}
			fn clear_queue(&mut self, voice: $crate::sink::VoiceId) {
				self.mixer().clear_queue(voice);
			}
			fn state(&self, voice: $crate::sink::VoiceId) -> $crate::sink::VoiceState {
				self.mixer().state(voice)
			}
			fn counts(&self, voice: $crate::sink::VoiceId) -> $crate::sink::QueueCounts {
				self.mixer().counts(voice)
			}
			fn sub_offset_seconds(&self, voice: $crate::sink::VoiceId) -> f64 {
				self.mixer().sub_offset_seconds(voice)
			}
			fn play(&mut self, voice: $crate::sink::VoiceId) {
				self.mixer().play(voice);
			}
			fn pause(&mut self, voice: $crate::sink::VoiceId) {
				self.mixer().pause(voice);
			}
			fn stop(&mut self, voice: $crate::sink::VoiceId) {
				self.mixer().stop(voice);
			}
			fn set_gain(&mut self, voice: $crate::sink::VoiceId, gain: f32) {
				self.mixer().set_gain(voice, gain);
			}
			fn gain(&self, voice: $crate::sink::VoiceId) -> f32 {
				self.mixer().gain(voice)
			}
			fn set_pitch(&mut self, voice: $crate::sink::VoiceId, pitch: f32) {
				self.mixer().set_pitch(voice, pitch);
			}
			fn pitch(&self, voice: $crate::sink::VoiceId) -> f32 {
				self.mixer().pitch(voice)
			}
			fn set_position(&mut self, voice: $crate::sink::VoiceId, position: [f32; 3]) {
				self.mixer().set_position(voice, position);
			}
			fn set_velocity(&mut self, voice: $crate::sink::VoiceId, velocity: [f32; 3]) {
				self.mixer().set_velocity(voice, velocity);
			}
		}
	};
}
pub(crate) use impl_sink;
