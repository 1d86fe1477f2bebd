//! The streaming playback state machine.

//---------------------------------------------------------------------------------------------------- Use
use std::path::Path;
use crate::{
	config::{StreamConfig,BYTES_PER_SAMPLE},
	error::{NagareError,OpenError},
	sink::{Sink,VoiceId,BufferId,SampleFormat,VoiceState},
	source::{self,PcmSource},
	stream::{BufferRing,Playhead,downmix_in_place},
	macros::{debug2,trace2,warn2},
};

//---------------------------------------------------------------------------------------------------- Streamer
/// Streamed playback of one audio source on one sink voice.
///
/// The source is decoded `chunk_size` bytes at a time into a ring
/// of sink buffers which stay queued on the voice. Nothing happens in
/// the background: [`Streamer::update`] must be called regularly
/// (e.g. once per frame) to refill the buffers the sink has finished.
/// If the caller stalls for longer than the queued audio lasts,
/// playback underruns until the next `update()`.
///
/// A `Streamer` never starts playing on its own, call [`Streamer::play`].
///
/// Dropping it stops the voice and releases the voice and buffers.
///
/// ```rust,no_run
/// # use nagare::{config::StreamConfig, sink::CpalSink, stream::Streamer};
/// let sink = CpalSink::new()?;
/// let mut stream = Streamer::open(sink, "music.ogg", StreamConfig::DEFAULT)?;
/// stream.play();
/// while stream.is_playing() {
///     stream.update();
///     std::thread::sleep(std::time::Duration::from_millis(10));
/// }
/// # Ok::<(), nagare::error::NagareError>(())
/// ```
pub struct Streamer<S: Sink> {
	sink:   S,
	source: Box<dyn PcmSource>,
	ring:   BufferRing,
	voice:  VoiceId,

	// Fixed at construction.
	channels:         u16,
	sample_rate:      u32,
	total_frames:     u64,
	duration:         f64,
	native_format:    SampleFormat,
	chunk_size:       usize,
	frames_per_chunk: usize,

	looping:  bool,
	surround: bool,
	/// The caller wants audio, regardless of what the voice is doing.
	playing:  bool,

	/// Frames written into buffers so far (not frames heard),
	/// kept modulo the file length while looping.
	frames_handed: u64,

	/// Re-usable decode scratch space, one chunk long.
	pcm: Vec<i16>,
}

impl<S: Sink> std::fmt::Debug for Streamer<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Streamer")
			.field("voice", &self.voice)
			.field("channels", &self.channels)
			.field("sample_rate", &self.sample_rate)
			.field("total_frames", &self.total_frames)
			.field("chunk_size", &self.chunk_size)
			.field("ring_size", &self.ring.len())
			.field("looping", &self.looping)
			.field("surround", &self.surround)
			.field("playing", &self.playing)
			.field("frames_handed", &self.frames_handed)
			.finish_non_exhaustive()
	}
}

//---------------------------------------------------------------------------------------------------- Construction
impl<S: Sink> Streamer<S> {
	#[cold]
	#[inline(never)]
	/// Open the file at `path` and prime a stream of it on `sink`.
	///
	/// The decoder is picked from the extension (`.wav`, `.mp3`, `.ogg`).
	///
	/// # Errors
	/// [`NagareError::Open`] if the file cannot be opened or decoded,
	/// [`NagareError::Sink`] if the sink cannot allocate the voice or buffers.
	pub fn open(sink: S, path: impl AsRef<Path>, config: StreamConfig) -> Result<Self, NagareError> {
		let source = source::open(path)?;
		Self::new(sink, source, config)
	}

	#[cold]
	#[inline(never)]
	/// Prime a stream of an already opened `source` on `sink`.
	///
	/// Sources shorter than the ring prime only as many
	/// buffers as they have data for. The voice is left stopped.
	///
	/// # Errors
	/// [`OpenError::Channels`] / [`OpenError::SampleRate`] if the source is
	/// not 1 or 2 channels with a non-zero rate, [`NagareError::Sink`] if the
	/// sink cannot allocate. Nothing stays allocated on the sink on error.
	pub fn new(mut sink: S, source: Box<dyn PcmSource>, config: StreamConfig) -> Result<Self, NagareError> {
		let channels = source.channels();
		let Some(native_format) = SampleFormat::from_channels(channels) else {
			return Err(OpenError::Channels(usize::from(channels)).into());
		};
		let sample_rate = source.sample_rate();
		if sample_rate == 0 {
			return Err(OpenError::SampleRate.into());
		}

		let total_frames     = source.total_frames();
		let chunk_size       = config.chunk_size_for(channels);
		let frames_per_chunk = chunk_size / (usize::from(channels) * BYTES_PER_SAMPLE);

		let voice = sink.create_voice()?;
		let ring = match BufferRing::allocate(&mut sink, config.ring_size()) {
			Ok(ring) => ring,
			Err(e) => {
				sink.destroy_voice(voice);
				return Err(e.into());
			},
		};

		debug2!(
			"Streamer - new(), channels: {channels}, sample_rate: {sample_rate}, \
			total_frames: {total_frames}, chunk_size: {chunk_size}, ring_size: {}",
			ring.len(),
		);

		let mut this = Self {
			sink,
			source,
			ring,
			voice,
			channels,
			sample_rate,
			total_frames,
			duration: total_frames as f64 / f64::from(sample_rate),
			native_format,
			chunk_size,
			frames_per_chunk,
			looping:  config.looping,
			surround: config.surround,
			playing:  false,
			frames_handed: 0,
			pcm: Vec::with_capacity(frames_per_chunk * usize::from(channels)),
		};

		this.sink.clear_queue(this.voice);
		this.prime(0);
		this.sink.stop(this.voice);

		Ok(this)
	}
}

//---------------------------------------------------------------------------------------------------- Filling
impl<S: Sink> Streamer<S> {
	/// Fill every ring slot from the current source cursor and queue
	/// the ones that received data, in ring order.
	///
	/// `start_frame` is where the cursor is; the frames primed are counted
	/// on top of it so the playhead estimate lines up with the queue.
	fn prime(&mut self, start_frame: u64) {
		self.frames_handed = start_frame;
		for i in 0..self.ring.len() {
			let buffer = self.ring.slots()[i];
			if self.fill(buffer) {
				self.sink.enqueue(self.voice, buffer);
			}
		}
		trace2!("Streamer - primed {} buffer(s) from frame {start_frame}", self.sink.counts(self.voice).queued);
	}

	/// Decode up to one chunk into `buffer` and upload it.
	///
	/// Returns `false` if no frames at all could be read,
	/// in which case `buffer` must not be queued.
	fn fill(&mut self, buffer: BufferId) -> bool {
		let channels = usize::from(self.channels);
		let frames_to_read = self.frames_per_chunk;

		self.pcm.clear();
		self.pcm.resize(frames_to_read * channels, 0);

		let mut frames_read = 0;
		// Set when wrapping to frame 0 and cleared once data arrives,
		// so an empty source cannot spin forever while looping.
		let mut wrapped = false;

		while frames_read < frames_to_read {
			let n = self.source.read(&mut self.pcm[frames_read * channels..]);
			if n == 0 {
				if self.looping && !wrapped {
					trace2!("Streamer - end of source, wrapping to frame 0");
					self.source.seek(0);
					wrapped = true;
					continue;
				}
				break;
			}
			wrapped = false;
			frames_read += n;
		}

		if frames_read == 0 {
			return false;
		}

		self.pcm.truncate(frames_read * channels);
		let format = if self.surround && self.channels == 2 {
			downmix_in_place(&mut self.pcm);
			SampleFormat::Mono16
		} else {
			self.native_format
		};

		self.sink.upload_buffer(buffer, format, &self.pcm, self.sample_rate);

		self.frames_handed += frames_read as u64;
		if self.looping && self.total_frames > 0 {
			self.frames_handed %= self.total_frames;
		}

		true
	}
}

//---------------------------------------------------------------------------------------------------- Playback
impl<S: Sink> Streamer<S> {
	/// Refill finished buffers and keep the voice going.
	///
	/// This must be called regularly while playing. Each processed
	/// buffer is dequeued, refilled and queued again at the tail. If
	/// playback is wanted but the voice stopped, it is restarted when
	/// buffers remain (it only starved), restarted from the top when
	/// looping, and otherwise playback has ended: [`Self::is_playing`]
	/// turns `false`.
	pub fn update(&mut self) {
		let processed = self.sink.counts(self.voice).processed;
		for _ in 0..processed {
			let Some(buffer) = self.sink.dequeue_processed(self.voice) else {
				break;
			};
			if !self.ring.contains(buffer) {
				warn2!("Streamer - sink returned foreign buffer {buffer:?}");
				continue;
			}
			if self.fill(buffer) {
				self.sink.enqueue(self.voice, buffer);
			}
		}

		if !self.playing || self.sink.state(self.voice) == VoiceState::Playing {
			return;
		}

		if self.sink.counts(self.voice).queued > 0 {
			trace2!("Streamer - voice starved, restarting");
			self.sink.play(self.voice);
		} else if self.looping {
			debug2!("Streamer - queue drained while looping, restarting from 0");
			// `playing` is set, so this resumes the voice.
			self.seek(0.0);
		} else {
			debug2!("Streamer - end of stream");
			self.playing = false;
		}
	}

	/// Start (or resume) playback.
	pub fn play(&mut self) {
		debug2!("Streamer - play()");
		self.playing = true;
		if self.sink.state(self.voice) != VoiceState::Playing {
			self.sink.play(self.voice);
		}
	}

	/// Pause playback, keeping the position and queued audio.
	pub fn pause(&mut self) {
		debug2!("Streamer - pause()");
		self.playing = false;
		self.sink.pause(self.voice);
	}

	/// Stop playback and rewind to the start.
	///
	/// The ring is re-primed from frame 0 so a following
	/// [`Self::play`] starts immediately.
	pub fn stop(&mut self) {
		debug2!("Streamer - stop()");
		self.playing = false;
		self.sink.stop(self.voice);
		self.sink.clear_queue(self.voice);
		self.source.seek(0);
		self.prime(0);
	}

	/// Jump to `seconds` into the source.
	///
	/// The queued audio is dropped and the ring re-primed from the new
	/// position. Playback resumes only if it was wanted before.
	///
	/// Negative values seek to the start; seeking past the end leaves
	/// nothing to play (or wraps on the next refill when looping).
	pub fn seek(&mut self, seconds: f64) {
		let frame = (seconds * f64::from(self.sample_rate)) as u64;
		debug2!("Streamer - seek(), seconds: {seconds}, frame: {frame}");

		self.source.seek(frame);
		self.sink.clear_queue(self.voice);
		self.prime(frame);

		if self.playing {
			self.sink.play(self.voice);
		}
	}

	/// Toggle stereo to mono downmixing.
	///
	/// Despite the name, this does not enable multichannel output:
	/// `true` uploads 2-channel sources downmixed to mono. The ring is
	/// re-primed at the current playhead so the change is immediate
	/// without a jump in position. Mono sources are unaffected, but
	/// still re-primed.
	pub fn set_surround(&mut self, surround: bool) {
		if self.surround == surround {
			return;
		}
		let offset = self.offset();
		debug2!("Streamer - set_surround(), surround: {surround}, offset: {offset}");
		self.surround = surround;
		self.seek(offset);
	}

	/// Wrap to the start at the end of the source.
	///
	/// Takes effect from the next refill.
	pub fn set_looping(&mut self, looping: bool) {
		self.looping = looping;
	}

	/// Set the voice's linear gain, negative values are treated as `0.0`.
	pub fn set_gain(&mut self, gain: f32) {
		self.sink.set_gain(self.voice, gain.max(0.0));
	}

	/// Set the voice's playback rate multiplier.
	pub fn set_pitch(&mut self, pitch: f32) {
		self.sink.set_pitch(self.voice, pitch);
	}

	/// Set the voice's position in 3D space.
	pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
		self.sink.set_position(self.voice, [x, y, z]);
	}

	/// Set the voice's velocity in 3D space.
	pub fn set_velocity(&mut self, x: f32, y: f32, z: f32) {
		self.sink.set_velocity(self.voice, [x, y, z]);
	}
}

//---------------------------------------------------------------------------------------------------- Queries
impl<S: Sink> Streamer<S> {
	#[must_use]
	/// The current playback position in seconds, in `0.0..=duration`.
	///
	/// This is estimated from the frames decoded so far, minus the audio
	/// queued but not yet heard, plus the sink's progress into the
	/// buffer currently playing.
	pub fn offset(&self) -> f64 {
		self.playhead().elapsed(self.duration)
	}

	#[must_use]
	/// [`Self::offset`] as a fraction of [`Self::duration`].
	///
	/// `0.0` if the duration is unknown.
	pub fn progress(&self) -> f64 {
		self.playhead().progress(self.duration)
	}

	#[must_use]
	/// The inputs of the current playhead estimate.
	pub fn playhead(&self) -> Playhead {
		Playhead {
			frames_handed:     self.frames_handed,
			pending_buffers:   self.sink.counts(self.voice).pending(),
			frames_per_chunk:  self.frames_per_chunk,
			sample_rate:       self.sample_rate,
			sub_buffer_offset: self.sink.sub_offset_seconds(self.voice),
		}
	}

	#[must_use]
	/// Whether playback is wanted.
	///
	/// This turns `false` on its own once a non-looping
	/// stream has played to the end (see [`Self::update`]).
	pub const fn is_playing(&self) -> bool {
		self.playing
	}

	#[must_use]
	/// Total length of the source in seconds, `0.0` if unknown.
	pub const fn duration(&self) -> f64 {
		self.duration
	}

	#[must_use]
	/// Whether the stream wraps at the end of the source.
	pub const fn looping(&self) -> bool {
		self.looping
	}

	#[must_use]
	/// Whether stereo is downmixed to mono, see [`Self::set_surround`].
	pub const fn surround(&self) -> bool {
		self.surround
	}

	#[must_use]
	/// The voice's linear gain.
	pub fn gain(&self) -> f32 {
		self.sink.gain(self.voice)
	}

	#[must_use]
	/// The voice's playback rate multiplier.
	pub fn pitch(&self) -> f32 {
		self.sink.pitch(self.voice)
	}

	#[must_use]
	/// The source's native channel count.
	pub const fn channels(&self) -> u16 {
		self.channels
	}

	#[must_use]
	/// The source's sample rate.
	pub const fn sample_rate(&self) -> u32 {
		self.sample_rate
	}

	#[must_use]
	/// The chunk size in bytes after rounding to whole frames.
	pub const fn chunk_size(&self) -> usize {
		self.chunk_size
	}

	#[must_use]
	/// The format the next refill uploads with.
	pub const fn format(&self) -> SampleFormat {
		if self.surround && self.channels == 2 {
			SampleFormat::Mono16
		} else {
			self.native_format
		}
	}

	#[must_use]
	/// The sink voice this stream plays on.
	pub const fn voice(&self) -> VoiceId {
		self.voice
	}

	#[must_use]
	/// The sink this stream plays on.
	pub const fn sink(&self) -> &S {
		&self.sink
	}
}

//---------------------------------------------------------------------------------------------------- Drop
impl<S: Sink> Drop for Streamer<S> {
	fn drop(&mut self) {
		debug2!("Streamer - drop()");
		self.sink.stop(self.voice);
		self.sink.clear_queue(self.voice);
		self.sink.destroy_voice(self.voice);
		self.ring.release(&mut self.sink);
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		error::SinkError,
		sink::{DummySink,QueueCounts},
		source::MemorySource,
		tests::{config,init_test,memory,ramp},
	};
	use pretty_assertions::assert_eq;

	/// Let `seconds` pass in `step` sized ticks, calling `update()` after each.
	fn play_for(streamer: &mut Streamer<DummySink>, sink: &DummySink, seconds: f64, step: f64) {
		let ticks = (seconds / step).round() as usize;
		for _ in 0..ticks {
			sink.advance(step);
			streamer.update();
		}
	}

	#[test]
	fn priming_short_source() {
		// 2.5 chunks of audio.
		let (streamer, sink) = init_test(memory(1, 1000, 0.25), config(1, 1000, 0.1));
		let voice = streamer.voice();

		assert_eq!(sink.counts(voice), QueueCounts { processed: 0, queued: 3 });
		assert_eq!(sink.state(voice), VoiceState::Stopped);
		assert!(!streamer.is_playing());

		let slots = streamer.ring.slots();
		assert_eq!(sink.upload(slots[0]).unwrap().frames(), 100);
		assert_eq!(sink.upload(slots[1]).unwrap().frames(), 100);
		assert_eq!(sink.upload(slots[2]).unwrap().frames(), 50);
		assert_eq!(sink.upload(slots[3]).unwrap().frames(), 0);
	}

	#[test]
	fn priming_caps_at_ring_size() {
		let (streamer, sink) = init_test(memory(2, 1000, 10.0), config(2, 1000, 0.1));
		assert_eq!(sink.counts(streamer.voice()).queued, 4);

		let config = StreamConfig { ring_size: 2, ..config(2, 1000, 0.1) };
		let (streamer, sink) = init_test(memory(2, 1000, 10.0), config);
		assert_eq!(sink.counts(streamer.voice()).queued, 2);
		assert_eq!(sink.buffer_count(), 2);
	}

	#[test]
	fn chunk_rounds_to_frames() {
		let config = StreamConfig { chunk_size: 1001, ..StreamConfig::DEFAULT };
		let (streamer, sink) = init_test(memory(2, 1000, 10.0), config);
		assert_eq!(streamer.chunk_size(), 1000);
		let upload = sink.upload(streamer.ring.slots()[0]).unwrap();
		assert_eq!(upload.byte_len(), 1000);
		assert_eq!(upload.format, SampleFormat::Stereo16);
		assert_eq!(upload.sample_rate, 1000);
	}

	#[test]
	fn end_to_end_progress() {
		// 4 seconds, 0.5 second chunks.
		let (mut streamer, sink) = init_test(memory(1, 44_100, 4.0), config(1, 44_100, 0.5));
		assert_eq!(sink.counts(streamer.voice()).queued, 4);
		assert_eq!(streamer.duration(), 4.0);
		assert_eq!(streamer.progress(), 0.0);

		streamer.play();
		play_for(&mut streamer, &sink, 2.0, 0.1);
		assert!((streamer.progress() - 0.5).abs() < 1e-3, "{}", streamer.progress());
		assert!(streamer.is_playing());
	}

	#[test]
	fn stop_rewinds() {
		let (mut streamer, sink) = init_test(memory(1, 1000, 10.0), config(1, 1000, 0.5));
		streamer.play();
		play_for(&mut streamer, &sink, 1.3, 0.1);
		assert!(streamer.offset() > 1.0);

		streamer.stop();
		assert_eq!(streamer.offset(), 0.0);
		assert!(!streamer.is_playing());
		assert_eq!(sink.state(streamer.voice()), VoiceState::Stopped);
		assert_eq!(sink.counts(streamer.voice()), QueueCounts { processed: 0, queued: 4 });

		// Re-primed from the top.
		let upload = sink.upload(streamer.ring.slots()[0]).unwrap();
		assert_eq!(&upload.samples[..3], &[0, 1, 2]);
	}

	#[test]
	fn seek_lands_on_target() {
		let (mut streamer, sink) = init_test(memory(1, 1000, 10.0), config(1, 1000, 0.5));
		streamer.seek(3.3);
		assert!((streamer.offset() - 3.3).abs() < 1e-9, "{}", streamer.offset());
		// Seeking does not start playback.
		assert!(!streamer.is_playing());
		assert_eq!(sink.state(streamer.voice()), VoiceState::Stopped);

		let upload = sink.upload(streamer.ring.slots()[0]).unwrap();
		assert_eq!(upload.samples[0], 3300);

		// Near the end, within a chunk.
		streamer.seek(9.8);
		assert!((streamer.offset() - 9.8).abs() <= 0.5, "{}", streamer.offset());
		assert_eq!(sink.counts(streamer.voice()).queued, 1);
	}

	#[test]
	fn seek_while_playing_resumes() {
		let (mut streamer, sink) = init_test(memory(1, 1000, 10.0), config(1, 1000, 0.5));
		streamer.play();
		play_for(&mut streamer, &sink, 0.4, 0.1);

		streamer.seek(6.0);
		assert_eq!(sink.state(streamer.voice()), VoiceState::Playing);
		play_for(&mut streamer, &sink, 1.0, 0.1);
		assert!((streamer.offset() - 7.0).abs() < 1e-6, "{}", streamer.offset());
	}

	#[test]
	fn looping_never_halts() {
		// Not a multiple of the chunk size, so fills wrap mid-chunk.
		let config = StreamConfig { looping: true, ..config(1, 1000, 0.5) };
		let (mut streamer, sink) = init_test(memory(1, 1000, 1.25), config);
		let voice = streamer.voice();
		assert_eq!(sink.counts(voice).queued, 4);

		// The third chunk holds the tail then the head of the file.
		let upload = sink.upload(streamer.ring.slots()[2]).unwrap();
		assert_eq!(upload.frames(), 500);
		assert_eq!(upload.samples[249], 1249);
		assert_eq!(upload.samples[250], 0);

		streamer.play();
		for _ in 0..200 {
			sink.advance(0.05);
			streamer.update();
			assert!(streamer.is_playing());
			assert_eq!(sink.state(voice), VoiceState::Playing);
			assert!(streamer.frames_handed < 1250);
			assert!((0.0..=1.25).contains(&streamer.offset()));
		}

		// Starving the voice entirely still recovers.
		sink.advance(100.0);
		streamer.update();
		assert!(streamer.is_playing());
		assert_eq!(sink.state(voice), VoiceState::Playing);
	}

	#[test]
	fn end_of_stream_once() {
		let (mut streamer, sink) = init_test(memory(1, 1000, 1.25), config(1, 1000, 0.5));
		streamer.play();

		let mut ended_at = None;
		for tick in 1..=60 {
			sink.advance(0.05);
			streamer.update();
			match (ended_at, streamer.is_playing()) {
				(None, false) => ended_at = Some(tick),
				(Some(_), true) => panic!("playback resumed at tick {tick}"),
				_ => (),
			}
		}

		// 1.25 seconds is 25 ticks, allow for float drift.
		let ended_at = ended_at.unwrap();
		assert!((25..=26).contains(&ended_at), "{ended_at}");
		assert_eq!(sink.counts(streamer.voice()).queued, 0);
		assert_eq!(streamer.offset(), 1.25);
		assert_eq!(streamer.progress(), 1.0);
	}

	#[test]
	fn starved_voice_restarts() {
		let (mut streamer, sink) = init_test(memory(1, 1000, 10.0), config(1, 1000, 0.5));
		streamer.play();

		// All 4 buffers play out before the next update.
		sink.advance(5.0);
		assert_eq!(sink.state(streamer.voice()), VoiceState::Stopped);

		streamer.update();
		assert!(streamer.is_playing());
		assert_eq!(sink.state(streamer.voice()), VoiceState::Playing);
		assert_eq!(sink.counts(streamer.voice()), QueueCounts { processed: 0, queued: 4 });
		assert!((streamer.offset() - 2.0).abs() < 1e-9);
	}

	#[test]
	fn pause_holds_position() {
		let (mut streamer, sink) = init_test(memory(1, 1000, 10.0), config(1, 1000, 0.5));
		streamer.play();
		streamer.play();
		play_for(&mut streamer, &sink, 0.7, 0.1);

		streamer.pause();
		let offset = streamer.offset();
		assert!((offset - 0.7).abs() < 1e-6, "{offset}");

		sink.advance(1.0);
		streamer.update();
		assert_eq!(streamer.offset(), offset);
		assert_eq!(sink.state(streamer.voice()), VoiceState::Paused);

		streamer.play();
		assert_eq!(sink.state(streamer.voice()), VoiceState::Playing);
		assert_eq!(streamer.offset(), offset);
	}

	#[test]
	fn surround_downmixes_without_jump() {
		let (mut streamer, sink) = init_test(memory(2, 1000, 10.0), config(2, 1000, 0.5));
		assert_eq!(streamer.format(), SampleFormat::Stereo16);
		streamer.play();
		play_for(&mut streamer, &sink, 1.2, 0.1);

		let before = streamer.progress();
		streamer.set_surround(true);
		let after = streamer.progress();
		assert!((after - before).abs() < 0.05, "{before} -> {after}");

		assert!(streamer.surround());
		assert_eq!(streamer.channels(), 2);
		assert_eq!(streamer.format(), SampleFormat::Mono16);
		for slot in streamer.ring.slots() {
			let upload = sink.upload(*slot).unwrap();
			assert_eq!(upload.format, SampleFormat::Mono16);
			assert_eq!(upload.samples.len(), 500);
			// The ramp's channels cancel out.
			assert!(upload.samples.iter().all(|s| *s == 0));
		}

		// And back.
		streamer.set_surround(false);
		let upload = sink.upload(streamer.ring.slots()[0]).unwrap();
		assert_eq!(upload.format, SampleFormat::Stereo16);
		assert_eq!(upload.samples.len(), 1000);
	}

	#[test]
	fn surround_mono_source_unaffected() {
		let config = StreamConfig { surround: true, ..config(1, 1000, 0.5) };
		let (streamer, sink) = init_test(memory(1, 1000, 10.0), config);
		assert_eq!(streamer.format(), SampleFormat::Mono16);
		let upload = sink.upload(streamer.ring.slots()[1]).unwrap();
		assert_eq!(&upload.samples[..2], &[500, 501]);
	}

	#[test]
	fn short_reads_are_absorbed() {
		let source = MemorySource::new(2, 1000, ramp(2, 1000)).with_max_read(7);
		let (streamer, sink) = init_test(source, config(2, 1000, 0.1));
		let expected = ramp(2, 1000);
		for (i, slot) in streamer.ring.slots().iter().enumerate() {
			let upload = sink.upload(*slot).unwrap();
			assert_eq!(upload.samples, &expected[i * 200..(i + 1) * 200]);
		}
	}

	#[test]
	fn empty_looping_source_terminates() {
		let config = StreamConfig { looping: true, ..config(1, 1000, 0.5) };
		let (mut streamer, sink) = init_test(MemorySource::new(1, 1000, Vec::<i16>::new()), config);
		assert_eq!(sink.counts(streamer.voice()).queued, 0);

		streamer.play();
		streamer.update();
		assert_eq!(sink.counts(streamer.voice()).queued, 0);
		assert_eq!(streamer.progress(), 0.0);
	}

	#[test]
	fn unknown_length() {
		let config = StreamConfig { looping: true, ..config(1, 1000, 0.5) };
		let source = memory(1, 1000, 1.0).with_unknown_length();
		let (mut streamer, sink) = init_test(source, config);
		assert_eq!(streamer.duration(), 0.0);

		streamer.play();
		play_for(&mut streamer, &sink, 3.0, 0.1);
		assert!(streamer.is_playing());
		assert_eq!(streamer.progress(), 0.0);
		assert_eq!(streamer.offset(), 0.0);
	}

	#[test]
	fn set_looping_at_runtime() {
		let (mut streamer, sink) = init_test(memory(1, 1000, 1.0), config(1, 1000, 0.5));
		assert!(!streamer.looping());
		// Only 2 chunks exist.
		assert_eq!(sink.counts(streamer.voice()).queued, 2);

		streamer.set_looping(true);
		assert!(streamer.looping());
		streamer.play();
		play_for(&mut streamer, &sink, 3.0, 0.1);
		assert!(streamer.is_playing());
	}

	#[test]
	fn voice_parameters() {
		let (mut streamer, sink) = init_test(memory(1, 1000, 1.0), config(1, 1000, 0.5));
		let voice = streamer.voice();

		assert_eq!(streamer.gain(), 1.0);
		streamer.set_gain(-1.0);
		assert_eq!(streamer.gain(), 0.0);
		streamer.set_gain(0.5);
		assert_eq!(streamer.gain(), 0.5);

		assert_eq!(streamer.pitch(), 1.0);
		streamer.set_pitch(2.0);
		assert_eq!(streamer.pitch(), 2.0);
		streamer.set_pitch(-1.0);
		assert_eq!(streamer.pitch(), 2.0);

		streamer.set_position(1.0, 2.0, 3.0);
		streamer.set_velocity(-1.0, 0.0, 1.0);
		assert_eq!(sink.position(voice), Some([1.0, 2.0, 3.0]));
		assert_eq!(sink.velocity(voice), Some([-1.0, 0.0, 1.0]));
		assert_eq!(streamer.sample_rate(), 1000);
	}

	#[test]
	fn rejects_unplayable_sources() {
		let sink = DummySink::new();
		let source = Box::new(MemorySource::new(3, 1000, vec![0; 30]));
		assert!(matches!(
			Streamer::new(sink.clone(), source, StreamConfig::DEFAULT),
			Err(NagareError::Open(OpenError::Channels(3))),
		));

		let source = Box::new(MemorySource::new(1, 0, vec![0; 30]));
		assert!(matches!(
			Streamer::new(sink.clone(), source, StreamConfig::DEFAULT),
			Err(NagareError::Open(OpenError::SampleRate)),
		));
		assert_eq!(sink.voice_count(), 0);
	}

	#[test]
	fn allocation_failure_releases_everything() {
		// Not enough buffers.
		let sink = DummySink::with_limits(1, 3);
		let source = Box::new(memory(1, 1000, 1.0));
		assert!(matches!(
			Streamer::new(sink.clone(), source, StreamConfig::DEFAULT),
			Err(NagareError::Sink(SinkError::Allocation)),
		));
		assert_eq!(sink.voice_count(), 0);
		assert_eq!(sink.buffer_count(), 0);

		// No voice.
		let sink = DummySink::with_limits(0, 4);
		let source = Box::new(memory(1, 1000, 1.0));
		assert!(matches!(
			Streamer::new(sink.clone(), source, StreamConfig::DEFAULT),
			Err(NagareError::Sink(SinkError::Allocation)),
		));
		assert_eq!(sink.buffer_count(), 0);
	}

	#[test]
	fn drop_releases_everything() {
		let (mut streamer, sink) = init_test(memory(1, 1000, 10.0), config(1, 1000, 0.5));
		streamer.play();
		play_for(&mut streamer, &sink, 0.3, 0.1);
		assert_eq!(sink.voice_count(), 1);
		assert_eq!(sink.buffer_count(), 4);

		drop(streamer);
		assert_eq!(sink.voice_count(), 0);
		assert_eq!(sink.buffer_count(), 0);
	}

	#[test]
	fn open_wav() {
		use crate::tests::{write_wav,TempFile};

		let file = TempFile::new("streamer_open.wav");
		write_wav(file.path(), 2, 8000, &ramp(2, 8000));
		let sink = DummySink::new();
		let streamer = Streamer::open(sink.clone(), file.path(), config(2, 8000, 0.25)).unwrap();
		assert_eq!(streamer.channels(), 2);
		assert_eq!(streamer.duration(), 1.0);
		assert_eq!(sink.counts(streamer.voice()).queued, 4);

		assert!(matches!(
			Streamer::open(sink, "song.flac", StreamConfig::DEFAULT),
			Err(NagareError::Open(OpenError::UnsupportedExtension(_))),
		));
	}
}
