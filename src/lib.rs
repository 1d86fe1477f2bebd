//! Chunked streaming audio playback.
//!
//! `nagare` plays long audio files (`.wav`, `.mp3`, `.ogg`) without
//! decoding them whole: a [`Streamer`] decodes a chunk at a time into a
//! small ring of buffers queued on an audio [`Sink`](sink::Sink) voice,
//! and refills each buffer as soon as the sink has played it.
//!
//! A `Streamer` has no internal threads. The caller owns the cadence
//! and must call [`Streamer::update`] regularly, e.g. once per frame.
//!
//! ```rust,no_run
//! use nagare::{Streamer, config::StreamConfig, sink::CpalSink};
//!
//! let sink = CpalSink::new()?;
//! let config = StreamConfig { looping: true, ..StreamConfig::DEFAULT };
//! let mut stream = Streamer::open(sink, "music.ogg", config)?;
//!
//! stream.play();
//! loop {
//!     stream.update();
//!     println!("{:.2}%", stream.progress() * 100.0);
//!     std::thread::sleep(std::time::Duration::from_millis(10));
//! }
//! # Ok::<(), nagare::error::NagareError>(())
//! ```

//---------------------------------------------------------------------------------------------------- Lints
#![allow(
    clippy::len_zero,
    clippy::type_complexity,
    clippy::module_inception,
)]

#![deny(
    nonstandard_style,
    deprecated,
    missing_docs,
)]

#![forbid(
    unused_mut,
    unused_unsafe,
    future_incompatible,
    break_with_label_and_loop,
    coherence_leak_check,
    duplicate_macro_attributes,
    exported_private_dependencies,
    for_loops_over_fallibles,
    overlapping_range_endpoints,
    semicolon_in_expressions_from_macros,
    redundant_semicolons,
    unconditional_recursion,
    unreachable_patterns,
    unused_allocation,
    unused_braces,
    unused_comparisons,
    unused_doc_comments,
    unused_parens,
    unused_labels,
    while_true,
    keyword_idents,
    non_ascii_idents,
    noop_method_call,
    single_use_lifetimes,
)]

//---------------------------------------------------------------------------------------------------- Public API
pub mod config;
pub mod error;
pub mod sink;
pub mod source;

pub mod stream;
pub use stream::Streamer;

//---------------------------------------------------------------------------------------------------- Private Usage
mod macros;
