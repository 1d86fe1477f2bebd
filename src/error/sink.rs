//---------------------------------------------------------------------------------------------------- Sink Errors
use std::borrow::Cow;

#[allow(unused_imports)] // docs
use crate::sink::Sink;

/// Error that occurs when the [`Sink`] cannot
/// hand out the resources a stream needs.
///
/// This can be due to many reasons, e.g:
/// - The sink ran out of voices or buffer slots
/// - No audio device is available
/// - The audio hardware/server refused to open a stream
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
	#[error("failed to allocate sink voices/buffers")]
	/// The sink could not allocate a voice or buffer slot.
	Allocation,

	#[error("audio hardware/server is unavailable")]
	/// There is no output device to open.
	DeviceUnavailable,

	#[error("audio backend error: {0}")]
	/// The audio backend failed while building or starting its stream.
	///
	/// The `str` will contain more information.
	Backend(Cow<'static, str>),
}
