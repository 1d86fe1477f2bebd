//! Plain data shared between sinks and streams.

//---------------------------------------------------------------------------------------------------- use
use strum::{
	AsRefStr,
	Display,
	EnumCount,
	EnumIter,
	IntoStaticStr,
};

//---------------------------------------------------------------------------------------------------- Ids
/// Handle to a playback voice owned by a [`Sink`](crate::sink::Sink).
#[derive(Copy,Clone,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct VoiceId(pub(crate) u32);

/// Handle to a buffer slot owned by a [`Sink`](crate::sink::Sink).
///
/// Identity only, the uploaded PCM is not readable through it.
#[derive(Copy,Clone,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct BufferId(pub(crate) u32);

//---------------------------------------------------------------------------------------------------- SampleFormat
/// Layout of the PCM uploaded into a buffer slot.
///
/// Samples are always signed 16-bit, interleaved.
#[derive(Copy,Clone,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SampleFormat {
	/// 1 channel, 16-bit
	Mono16,
	/// 2 interleaved channels, 16-bit
	Stereo16,
}

impl SampleFormat {
	#[must_use]
	/// The native format for a channel count, if it is playable.
	///
	/// ```rust
	/// # use nagare::sink::*;
	/// assert_eq!(SampleFormat::from_channels(1), Some(SampleFormat::Mono16));
	/// assert_eq!(SampleFormat::from_channels(2), Some(SampleFormat::Stereo16));
	/// assert_eq!(SampleFormat::from_channels(6), None);
	/// ```
	pub const fn from_channels(channels: u16) -> Option<Self> {
		match channels {
			1 => Some(Self::Mono16),
			2 => Some(Self::Stereo16),
			_ => None,
		}
	}

	#[must_use]
	/// How many interleaved samples make up one frame.
	pub const fn channels(&self) -> usize {
		match self {
			Self::Mono16   => 1,
			Self::Stereo16 => 2,
		}
	}
}

//---------------------------------------------------------------------------------------------------- VoiceState
/// Instantaneous playback state of a voice.
#[derive(Copy,Clone,Debug,Default,PartialEq,Eq,PartialOrd,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum VoiceState {
	/// Consuming queued buffers.
	Playing,
	/// Holding its position, resumable.
	Paused,
	/// Not playing; either never started, stopped,
	/// or every queued buffer has been consumed.
	#[default]
	Stopped,
}

//---------------------------------------------------------------------------------------------------- QueueCounts
/// Buffer queue bookkeeping of a voice.
#[derive(Copy,Clone,Debug,Default,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct QueueCounts {
	/// Buffers at the head of the queue that have finished playing
	/// but have not been dequeued yet.
	pub processed: usize,
	/// Every buffer currently in the queue, processed ones included.
	pub queued: usize,
}

impl QueueCounts {
	#[must_use]
	/// Buffers still waiting to be (fully) heard.
	///
	/// ```rust
	/// # use nagare::sink::*;
	/// assert_eq!(QueueCounts { processed: 1, queued: 4 }.pending(), 3);
	/// ```
	pub const fn pending(&self) -> usize {
		self.queued.saturating_sub(self.processed)
	}
}
