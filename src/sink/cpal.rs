//! Audio hardware output
//!
//! This file implements the abstract `Sink`
//! trait using `cpal` as a backend.
//!
//! For documentation on `Sink`, see `sink.rs`.
//!
//! The device callback never touches the [`Mixer`]. A render thread
//! mixes one period at a time and sends the samples over a bounded
//! channel, the callback only receives from that channel.

//----------------------------------------------------------------------------------------------- use
use std::{
	borrow::Cow,
	sync::{Arc,Mutex,MutexGuard},
};
use crossbeam::channel::{Receiver,Sender};
use cpal::traits::{DeviceTrait,HostTrait,StreamTrait};
use crate::{
	error::SinkError,
	sink::mixer::{self,Mixer,impl_sink},
	macros::{debug2,error2},
};

//----------------------------------------------------------------------------------------------- Constants
/// How many milliseconds of rendered audio sit between the
/// render thread and the device.
const BUFFER_MILLISECONDS: usize = 50;

/// Frames mixed per lock of the [`Mixer`] on the render thread.
const PERIOD_FRAMES: usize = 256;

//----------------------------------------------------------------------------------------------- CpalSink
/// A [`Sink`](crate::sink::Sink) rendering to the default output device.
///
/// The device is opened with its default configuration. Buffers
/// at other rates are resampled per voice while rendering.
///
/// The device stream runs for as long as any clone of this
/// handle is alive; voices that are not playing output silence.
///
/// Cloning returns another handle to the _same_ device and voices,
/// so several [`Streamer`](crate::stream::Streamer)s can share it.
#[derive(Clone)]
pub struct CpalSink {
	mixer: Arc<Mutex<Mixer>>,
	/// Kept alive, dropping it closes the device
	/// and ends the render thread.
	_stream: Arc<cpal::Stream>,
	sample_rate: u32,
	channels: u16,
}

impl std::fmt::Debug for CpalSink {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CpalSink")
			.field("sample_rate", &self.sample_rate)
			.field("channels", &self.channels)
			.finish_non_exhaustive()
	}
}

//----------------------------------------------------------------------------------------------- CpalSink Impl
impl CpalSink {
	#[cold]
	#[inline(never)]
	/// Open the default output device and start its stream.
	///
	/// # Errors
	/// [`SinkError::DeviceUnavailable`] if there is no output device,
	/// [`SinkError::Backend`] if the device has no usable default
	/// configuration, or the stream or render thread could not be started.
	pub fn new() -> Result<Self, SinkError> {
		let host = cpal::default_host();
		let device = host.default_output_device().ok_or(SinkError::DeviceUnavailable)?;
		debug2!("CpalSink - opening device: {:?}", device.name());

		let supported = device.default_output_config()?;
		debug2!("CpalSink - default config: {supported:?}");
		let config = supported.config();
		let sample_rate = config.sample_rate.0;
		let channels = config.channels;
		if sample_rate == 0 || channels == 0 {
			return Err(SinkError::Backend(Cow::Borrowed("device reported an empty configuration")));
		}

		let capacity = (BUFFER_MILLISECONDS * sample_rate as usize / 1000).max(PERIOD_FRAMES)
			* usize::from(channels);
		let (sender, receiver) = crossbeam::channel::bounded(capacity);

		let stream = device.build_output_stream(
			&config,
			move |data: &mut [f32], _: &cpal::OutputCallbackInfo| fill_output(&receiver, data),
			move |error| {
				error2!("CpalSink - stream error: {error}");
			},
			None,
		)?;
		stream.play()?;

		let mixer = Arc::new(Mutex::new(Mixer::new()));
		let render = Arc::clone(&mixer);
		std::thread::Builder::new()
			.name("nagare-render".into())
			.spawn(move || render_thread(&render, &sender, usize::from(channels), sample_rate))
			.map_err(|e| SinkError::Backend(Cow::Owned(e.to_string())))?;

		Ok(Self {
			mixer,
			_stream: Arc::new(stream),
			sample_rate,
			channels,
		})
	}

	#[must_use]
	/// The rate the device is rendering at.
	pub const fn sample_rate(&self) -> u32 {
		self.sample_rate
	}

	#[must_use]
	/// The device's channel count.
	///
	/// Voices fill the first two channels, a mono
	/// device receives the average of both sides.
	pub const fn channels(&self) -> u16 {
		self.channels
	}

	fn mixer(&self) -> MutexGuard<'_, Mixer> {
		mixer::lock(&self.mixer)
	}
}

impl_sink!(CpalSink);

//----------------------------------------------------------------------------------------------- Render thread
/// Mix and send periods until the device is gone.
#[cold]
#[inline(never)]
fn render_thread(mixer: &Mutex<Mixer>, sender: &Sender<f32>, channels: usize, sample_rate: u32) {
	debug2!("CpalSink - render thread up: {sample_rate} Hz, {channels} channels");
	let mut period = vec![0.0; PERIOD_FRAMES * channels];
	while render_period(mixer, sender, &mut period, channels, sample_rate) {}
	debug2!("CpalSink - device closed, render thread exiting");
}

/// Mix one period into `period` and send it.
///
/// The lock is released before sending. Sending blocks
/// while the channel is full, which paces this thread to the device.
///
/// Returns `false` once the receiving side has been dropped.
fn render_period(
	mixer: &Mutex<Mixer>,
	sender: &Sender<f32>,
	period: &mut [f32],
	channels: usize,
	sample_rate: u32,
) -> bool {
	mixer::lock(mixer).render(period, channels, sample_rate);
	period.iter().all(|sample| sender.send(*sample).is_ok())
}

/// The device callback: copy whatever has been
/// rendered into `output`, silence past that.
fn fill_output(receiver: &Receiver<f32>, output: &mut [f32]) {
	let mut written = 0;
	for sample in output.iter_mut() {
		match receiver.try_recv() {
			Ok(s) => *sample = s,
			Err(_) => break,
		}
		written += 1;
	}
	output[written..].fill(0.0);
}

//----------------------------------------------------------------------------------------------- Error re-map
impl From<cpal::DefaultStreamConfigError> for SinkError {
	fn from(error: cpal::DefaultStreamConfigError) -> Self {
		use cpal::DefaultStreamConfigError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			e => Self::Backend(Cow::Owned(e.to_string())),
		}
	}
}

impl From<cpal::BuildStreamError> for SinkError {
	fn from(error: cpal::BuildStreamError) -> Self {
		use cpal::BuildStreamError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			e => Self::Backend(Cow::Owned(e.to_string())),
		}
	}
}

impl From<cpal::PlayStreamError> for SinkError {
	fn from(error: cpal::PlayStreamError) -> Self {
		use cpal::PlayStreamError as E;
		match error {
			E::DeviceNotAvailable => Self::DeviceUnavailable,
			e => Self::Backend(Cow::Owned(e.to_string())),
		}
	}
}
