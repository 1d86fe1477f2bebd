//! Decoding files through `symphonia`.

//---------------------------------------------------------------------------------------------------- Use
use std::{
	fs::File,
	path::Path,
};
use symphonia::core::{
	audio::SampleBuffer,
	codecs::{Decoder,DecoderOptions,CODEC_TYPE_NULL},
	errors::Error,
	formats::{FormatReader,FormatOptions,SeekMode,SeekTo},
	io::{MediaSourceStream,MediaSourceStreamOptions},
	meta::{MetadataOptions,Limit},
	probe::Hint,
	units::{Time,TimeBase},
};
use symphonia::default::{get_probe,get_codecs};
use crate::{
	error::OpenError,
	source::{Container,PcmSource},
	macros::{debug2,trace2,warn2},
};

//---------------------------------------------------------------------------------------------------- Constants
// `symphonia` format options.
//
// These are some misc options `Symphonia` needs.
// Most of these are the default values, but as `const`.

/// Gapless playback trims encoder delay/padding so loops are seamless.
pub(crate) const FORMAT_OPTIONS: FormatOptions = FormatOptions {
	enable_gapless: true,
	prebuild_seek_index: false,
	seek_index_fill_rate: 20,
};

/// Metadata is never read, keep the defaults.
pub(crate) const METADATA_OPTIONS: MetadataOptions = MetadataOptions {
	limit_metadata_bytes: Limit::Default,
	limit_visual_bytes: Limit::Default,
};

/// Skip checksum verification.
pub(crate) const DECODER_OPTIONS: DecoderOptions = DecoderOptions {
	verify: false,
};

/// File read-ahead.
pub(crate) const MEDIA_SOURCE_STREAM_OPTIONS: MediaSourceStreamOptions = MediaSourceStreamOptions {
	buffer_len: 64 * 1024,
};

/// Consecutive undecodable packets tolerated
/// before the rest of the stream is given up on.
const MAX_DECODE_RETRIES: usize = 3;

//---------------------------------------------------------------------------------------------------- SymphoniaSource
/// A [`PcmSource`] decoding WAV, MP3 or Ogg Vorbis files.
///
/// Packets are decoded lazily as frames are read. Decode errors in
/// the middle of a stream are logged and treated as end-of-stream.
pub struct SymphoniaSource {
	/// The container demuxer.
	reader: Box<dyn FormatReader>,
	/// The codec decoder for `track_id`.
	decoder: Box<dyn Decoder>,
	/// The track being decoded.
	track_id: u32,
	/// The track's `TimeBase`, used to convert seek timestamps to frames.
	time_base: Option<TimeBase>,

	container:    Container,
	channels:     u16,
	sample_rate:  u32,
	total_frames: u64,

	/// The last decoded packet as interleaved `i16`.
	buf: Option<SampleBuffer<i16>>,
	/// Next unread sample in `buf`.
	pos: usize,
	/// Frames still to drop after an accurate seek
	/// landed before the requested frame.
	skip: u64,
	/// Nothing more to read until the next seek.
	exhausted: bool,
	decode_errors: usize,
}

impl std::fmt::Debug for SymphoniaSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SymphoniaSource")
			.field("container", &self.container)
			.field("track_id", &self.track_id)
			.field("channels", &self.channels)
			.field("sample_rate", &self.sample_rate)
			.field("total_frames", &self.total_frames)
			.field("exhausted", &self.exhausted)
			.finish_non_exhaustive()
	}
}

//---------------------------------------------------------------------------------------------------- SymphoniaSource Impl
impl SymphoniaSource {
	#[cold]
	#[inline(never)]
	/// Open `path` as `container`.
	///
	/// # Errors
	/// Fails if the file cannot be read, the decoder rejects it,
	/// or it is not a 1 or 2 channel track with a sample rate.
	pub fn open(path: impl AsRef<Path>, container: Container) -> Result<Self, OpenError> {
		let path = path.as_ref();
		debug2!("SymphoniaSource - open(), path: {}, container: {container}", path.display());

		let file = File::open(path)?;
		let mss = MediaSourceStream::new(Box::new(file), MEDIA_SOURCE_STREAM_OPTIONS);

		let mut hint = Hint::new();
		hint.with_extension(container.extension());

		let reader = get_probe()
			.format(&hint, mss, &FORMAT_OPTIONS, &METADATA_OPTIONS)?
			.format;

		let codecs = get_codecs();

		// Select the first track with a known codec.
		let Some(track) = reader
			.tracks()
			.iter()
			.find(|t| {
				// Make sure it is not null.
				t.codec_params.codec != CODEC_TYPE_NULL &&
				// And it exists in our codec registry.
				codecs.get_codec(t.codec_params.codec).is_some()
			})
		else {
			return Err(OpenError::Track);
		};

		let decoder = codecs.make(&track.codec_params, &DECODER_OPTIONS)?;

		let Some(sample_rate) = track.codec_params.sample_rate.filter(|r| *r > 0) else {
			return Err(OpenError::SampleRate);
		};

		let channels = track.codec_params.channels.map_or(0, |c| c.count());
		let channels = match channels {
			1 | 2 => channels as u16,
			_ => return Err(OpenError::Channels(channels)),
		};

		let track_id     = track.id;
		let time_base    = track.codec_params.time_base;
		let total_frames = track.codec_params.n_frames.unwrap_or(0);

		debug2!("SymphoniaSource - {channels} channel(s), {sample_rate} Hz, {total_frames} frames");

		Ok(Self {
			reader,
			decoder,
			track_id,
			time_base,
			container,
			channels,
			sample_rate,
			total_frames,
			buf: None,
			pos: 0,
			skip: 0,
			exhausted: false,
			decode_errors: 0,
		})
	}

	#[must_use]
	/// The container this source was opened as.
	pub const fn container(&self) -> Container {
		self.container
	}

	/// Convert a track timestamp delta to frames.
	fn ts_to_frames(&self, ts: u64) -> u64 {
		let Some(time_base) = self.time_base else {
			return ts;
		};
		let rate = u64::from(self.sample_rate);
		let time = time_base.calc_time(ts);
		time.seconds * rate + (time.frac * rate as f64).round() as u64
	}

	/// Count one undecodable packet.
	///
	/// Returns `false` (and marks the source exhausted) once more than
	/// [`MAX_DECODE_RETRIES`] packets in a row could not be decoded.
	fn skip_undecodable(&mut self) -> bool {
		self.decode_errors += 1;
		if self.decode_errors > MAX_DECODE_RETRIES {
			debug2!("SymphoniaSource - {} undecodable packets in a row, ending stream", self.decode_errors);
			self.exhausted = true;
			return false;
		}
		true
	}

	/// Decode packets until one yields unread samples.
	///
	/// Returns `false` (and marks the source exhausted)
	/// at the end of the stream or on an unrecoverable error.
	fn decode_next(&mut self) -> bool {
		let channels = usize::from(self.channels);

		loop {
			let packet = match self.reader.next_packet() {
				Ok(packet) => packet,

				// This "end of stream" error is currently the only way
				// a [FormatReader] can indicate the media is complete.
				Err(Error::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
					trace2!("SymphoniaSource - end of stream");
					self.exhausted = true;
					return false;
				},

				Err(Error::ResetRequired) => {
					self.decoder.reset();
					continue;
				},

				Err(e) => {
					warn2!("SymphoniaSource - read error, ending stream: {e}");
					self.exhausted = true;
					return false;
				},
			};

			if packet.track_id() != self.track_id {
				continue;
			}

			match self.decoder.decode(&packet) {
				Ok(decoded) => {
					self.decode_errors = 0;

					let spec = *decoded.spec();
					if spec.channels.count() != channels {
						warn2!("SymphoniaSource - channel layout changed mid-stream, ending stream");
						self.exhausted = true;
						return false;
					}

					let frames   = decoded.frames();
					let capacity = decoded.capacity();
					if self.buf.as_ref().map_or(true, |b| b.capacity() < capacity * channels) {
						self.buf = Some(SampleBuffer::new(capacity as u64, spec));
					}
					if let Some(buf) = self.buf.as_mut() {
						buf.copy_interleaved_ref(decoded);
					}

					let skip = self.skip.min(frames as u64);
					self.skip -= skip;
					self.pos = skip as usize * channels;

					if skip < frames as u64 {
						return true;
					}
				},

				Err(Error::DecodeError(e)) => {
					warn2!("SymphoniaSource - skipping undecodable packet: {e}");
					if !self.skip_undecodable() {
						return false;
					}
				},

				Err(e) => {
					warn2!("SymphoniaSource - decode error, ending stream: {e}");
					self.exhausted = true;
					return false;
				},
			}
		}
	}
}

//---------------------------------------------------------------------------------------------------- PcmSource Impl
impl PcmSource for SymphoniaSource {
	fn channels(&self) -> u16 {
		self.channels
	}

	fn sample_rate(&self) -> u32 {
		self.sample_rate
	}

	fn total_frames(&self) -> u64 {
		self.total_frames
	}

	fn read(&mut self, dst: &mut [i16]) -> usize {
		let channels = usize::from(self.channels);
		let wanted   = dst.len() / channels * channels;
		let mut written = 0;

		while written < wanted {
			let pos = self.pos;
			let available = self.buf.as_ref().map_or(&[][..], |b| &b.samples()[pos..]);

			if available.is_empty() {
				if self.exhausted || !self.decode_next() {
					break;
				}
				continue;
			}

			let n = available.len().min(wanted - written);
			dst[written..written + n].copy_from_slice(&available[..n]);
			written  += n;
			self.pos += n;
		}

		written / channels
	}

	fn seek(&mut self, frame: u64) {
		trace2!("SymphoniaSource - seek(), frame: {frame}");

		let rate = u64::from(self.sample_rate);
		let time = Time {
			seconds: frame / rate,
			frac:    (frame % rate) as f64 / rate as f64,
		};

		self.buf  = None;
		self.pos  = 0;
		self.skip = 0;
		self.decode_errors = 0;

		match self.reader.seek(
			SeekMode::Accurate,
			SeekTo::Time { time, track_id: Some(self.track_id) },
		) {
			Ok(seeked) => {
				self.decoder.reset();
				self.exhausted = false;
				self.skip = self.ts_to_frames(seeked.required_ts.saturating_sub(seeked.actual_ts));
			},

			// Out of range (or unseekable); the
			// next read reports end-of-stream.
			Err(e) => {
				debug2!("SymphoniaSource - seek to frame {frame} failed: {e}");
				self.exhausted = true;
			},
		}
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use crate::tests::{write_wav,TempFile};
	use pretty_assertions::assert_eq;

	/// Read everything left in `source`, `chunk` frames at a time.
	fn read_all(source: &mut SymphoniaSource, chunk: usize) -> Vec<i16> {
		let channels = usize::from(source.channels());
		let mut out = Vec::new();
		let mut dst = vec![0; chunk * channels];
		loop {
			let frames = source.read(&mut dst);
			if frames == 0 {
				return out;
			}
			out.extend_from_slice(&dst[..frames * channels]);
		}
	}

	#[test]
	fn mono_wav() {
		let samples: Vec<i16> = (0..2000).map(|i| i as i16 - 1000).collect();
		let file = TempFile::new("mono_wav.wav");
		write_wav(file.path(), 1, 8000, &samples);

		let mut source = SymphoniaSource::open(file.path(), Container::Wav).unwrap();
		assert_eq!(source.container(), Container::Wav);
		assert_eq!(source.channels(), 1);
		assert_eq!(source.sample_rate(), 8000);
		assert_eq!(source.total_frames(), 2000);

		assert_eq!(read_all(&mut source, 300), samples);
		assert_eq!(source.read(&mut [0; 16]), 0);

		// Exhausted sources come back after a seek.
		source.seek(1234);
		let mut dst = [0; 10];
		assert_eq!(source.read(&mut dst), 10);
		assert_eq!(&dst[..], &samples[1234..1244]);

		source.seek(0);
		assert_eq!(read_all(&mut source, 777), samples);
	}

	#[test]
	fn stereo_wav_reads_whole_frames() {
		let samples: Vec<i16> = (0..1000).flat_map(|i| [i as i16, -(i as i16)]).collect();
		let file = TempFile::new("stereo_wav.wav");
		write_wav(file.path(), 2, 44_100, &samples);

		let mut source = SymphoniaSource::open(file.path(), Container::Wav).unwrap();
		assert_eq!(source.channels(), 2);
		assert_eq!(source.total_frames(), 1000);

		// An odd destination length only receives whole frames.
		let mut dst = [0; 7];
		assert_eq!(source.read(&mut dst), 3);
		assert_eq!(&dst[..6], &[0, 0, 1, -1, 2, -2]);

		source.seek(500);
		let mut dst = [0; 4];
		assert_eq!(source.read(&mut dst), 2);
		assert_eq!(dst, [500, -500, 501, -501]);
	}

	#[test]
	fn truncated_wav_ends_early() {
		let samples: Vec<i16> = (0..8000).map(|i| (i % 2000) as i16).collect();
		let file = TempFile::new("truncated_wav.wav");
		write_wav(file.path(), 1, 8000, &samples);

		// Cut the data chunk short of what its header claims.
		let kept = 3001;
		std::fs::OpenOptions::new()
			.write(true)
			.open(file.path())
			.unwrap()
			.set_len(44 + 2 * kept as u64)
			.unwrap();

		let mut source = SymphoniaSource::open(file.path(), Container::Wav).unwrap();
		let out = read_all(&mut source, 512);
		assert!(out.len() <= kept, "{}", out.len());
		assert_eq!(out, &samples[..out.len()]);

		assert!(source.exhausted);
		assert_eq!(source.read(&mut [0; 16]), 0);
		assert_eq!(source.read(&mut [0; 16]), 0);
	}

	#[test]
	fn undecodable_packets_exhaust_the_source() {
		let samples: Vec<i16> = (0..100).collect();
		let file = TempFile::new("undecodable_packets.wav");
		write_wav(file.path(), 1, 8000, &samples);
		let mut source = SymphoniaSource::open(file.path(), Container::Wav).unwrap();

		for _ in 0..MAX_DECODE_RETRIES {
			assert!(source.skip_undecodable());
		}
		assert!(!source.exhausted);

		assert!(!source.skip_undecodable());
		assert!(source.exhausted);
		assert_eq!(source.read(&mut [0; 16]), 0);

		// A seek gives the stream another chance.
		source.seek(0);
		assert_eq!(read_all(&mut source, 64), samples);
	}

	#[test]
	fn open_errors() {
		let missing = std::env::temp_dir().join("nagare_definitely_missing.wav");
		assert!(matches!(
			SymphoniaSource::open(&missing, Container::Wav),
			Err(OpenError::File(_)),
		));

		let file = TempFile::new("not_audio.wav");
		std::fs::write(file.path(), b"this is not a wave file").unwrap();
		assert!(matches!(
			SymphoniaSource::open(file.path(), Container::Wav),
			Err(OpenError::Probe(_)),
		));
	}

	#[test]
	fn open_through_extension() {
		let file = TempFile::new("open_through_extension.WAV");
		write_wav(file.path(), 1, 22_050, &[1, 2, 3]);

		let source = crate::source::open(file.path()).unwrap();
		assert_eq!(source.channels(), 1);
		assert_eq!(source.sample_rate(), 22_050);
		assert_eq!(source.total_frames(), 3);
	}
}
