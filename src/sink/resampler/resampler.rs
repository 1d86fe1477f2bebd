// Per-voice resampling
//
// This file defines the `Resampler` trait.
//
// A voice whose buffers play at a rate other than the device's
// (after `pitch` is applied) feeds its frames through one of these.
// Input and output are stereo and planar, `Mixer::render()` splits
// and re-joins the channels.
//
// Processing uses pre-allocated buffers, creating a new
// object (`Resampler::new()`) is the only heavy part.
//
// The currently used backend (the only implementor) is `rubato`.

//----------------------------------------------------------------------------------------------- use
use std::collections::VecDeque;

//----------------------------------------------------------------------------------------------- Resampler
pub(crate) trait Resampler
where
	Self: Sized,
{
	/// Create a new [`Resampler`] producing `ratio` output frames per input frame.
	///
	/// This allocates, and returns `None` if the
	/// backend rejects the ratio.
	fn new(ratio: f64) -> Option<Self>;

	/// Switch to a new `ratio` without losing buffered audio.
	///
	/// Returns `false` if the new ratio is too far from the one
	/// this object was created with, the caller should create
	/// a new one instead.
	fn set_ratio(&mut self, ratio: f64) -> bool;

	/// How many input frames the next [`Resampler::process`] call takes.
	fn input_frames_next(&self) -> usize;

	/// Resample exactly [`Resampler::input_frames_next`] frames
	/// of `left` and `right`, appending the output to `out`.
	fn process(&mut self, left: &[f32], right: &[f32], out: &mut VecDeque<(f32, f32)>);
}
