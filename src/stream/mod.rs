//! Streamed playback.
//!
//! A [`Streamer`] decodes a [`PcmSource`](crate::source::PcmSource)
//! a chunk at a time into a small ring of sink buffers and keeps
//! them queued on one voice. There is no internal thread: the caller
//! drives it by calling [`Streamer::update`] regularly.

mod ring;
pub(crate) use ring::BufferRing;

mod downmix;
pub use downmix::{downmix_frame,downmix_in_place};

mod playhead;
pub use playhead::Playhead;

mod streamer;
pub use streamer::Streamer;
