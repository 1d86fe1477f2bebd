//! Configuration for a [`Streamer`].

#[allow(unused_imports)] // docs
use crate::stream::Streamer;

mod config;
pub use config::StreamConfig;

mod constants;
pub use constants::{
	DEFAULT_CHUNK_SIZE,
	DEFAULT_RING_SIZE,
};
pub(crate) use constants::BYTES_PER_SAMPLE;
