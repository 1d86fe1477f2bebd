//! `rubato` backend for [`Resampler`].

//----------------------------------------------------------------------------------------------- use
use std::collections::VecDeque;
use rubato::{
	Resampler as _,
	SincFixedIn,
	SincInterpolationParameters,
	SincInterpolationType,
	WindowFunction,
};
use crate::{
	sink::resampler::Resampler,
	macros::{error2,trace2},
};

//----------------------------------------------------------------------------------------------- Constants
/// Input frames per `process()` call.
const CHUNK_FRAMES: usize = 512;

/// How far [`Resampler::set_ratio`] may move from the ratio the
/// resampler was built with, in either direction.
///
/// Pitch changes inside this range keep the filter state.
const MAX_RATIO_RELATIVE: f64 = 4.0;

/// Band-limited sinc interpolation.
///
/// The cutoff sits just below the lower of the two Nyquist
/// frequencies, so nothing above it folds back when downsampling.
const PARAMETERS: SincInterpolationParameters = SincInterpolationParameters {
	sinc_len:            128,
	f_cutoff:            0.95,
	interpolation:       SincInterpolationType::Linear,
	oversampling_factor: 128,
	window:              WindowFunction::BlackmanHarris2,
};

//----------------------------------------------------------------------------------------------- Rubato
/// Stereo [`SincFixedIn`] with pre-allocated output.
pub(crate) struct Rubato {
	resampler: SincFixedIn<f32>,
	ratio:     f64,
	/// Planar output, sized for the largest ratio allowed.
	output:    [Vec<f32>; 2],
}

impl std::fmt::Debug for Rubato {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Rubato")
			.field("ratio", &self.ratio)
			.finish_non_exhaustive()
	}
}

impl Resampler for Rubato {
	#[cold]
	#[inline(never)]
	fn new(ratio: f64) -> Option<Self> {
		let resampler = match SincFixedIn::<f32>::new(
			ratio,
			MAX_RATIO_RELATIVE,
			PARAMETERS,
			CHUNK_FRAMES,
			2,
		) {
			Ok(r) => r,
			Err(e) => {
				error2!("Rubato - cannot resample at ratio {ratio}: {e}");
				return None;
			},
		};

		trace2!("Rubato - new resampler, ratio: {ratio}");
		let frames = resampler.output_frames_max();
		Some(Self {
			resampler,
			ratio,
			output: [vec![0.0; frames], vec![0.0; frames]],
		})
	}

	fn set_ratio(&mut self, ratio: f64) -> bool {
		if ratio == self.ratio {
			return true;
		}
		match self.resampler.set_resample_ratio(ratio, false) {
			Ok(()) => {
				self.ratio = ratio;
				true
			},
			Err(_) => false,
		}
	}

	fn input_frames_next(&self) -> usize {
		self.resampler.input_frames_next()
	}

	fn process(&mut self, left: &[f32], right: &[f32], out: &mut VecDeque<(f32, f32)>) {
		let Self { resampler, output, .. } = self;
		match resampler.process_into_buffer(&[left, right], output, None) {
			Ok((_, written)) => {
				let [l, r] = output;
				out.extend(l[..written].iter().copied().zip(r[..written].iter().copied()));
			},
			Err(e) => error2!("Rubato - dropping {} frames: {e}", left.len()),
		}
	}
}

//----------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn ratio_changes_in_range() {
		let mut r = Rubato::new(0.5).unwrap();
		assert_eq!(r.input_frames_next(), CHUNK_FRAMES);

		assert!(r.set_ratio(1.0));
		assert_eq!(r.ratio, 1.0);

		// Past `MAX_RATIO_RELATIVE` of the original 0.5.
		assert!(!r.set_ratio(4.0));
		assert_eq!(r.ratio, 1.0);
	}

	#[test]
	fn output_length_follows_ratio() {
		let mut r = Rubato::new(0.5).unwrap();
		let input = vec![0.0_f32; CHUNK_FRAMES];
		let mut out = VecDeque::new();
		for _ in 0..8 {
			r.process(&input, &input, &mut out);
		}
		// 8 chunks at half rate, minus the filter's delay.
		let expected = 8 * CHUNK_FRAMES / 2;
		assert!(out.len() <= expected);
		assert!(out.len() + PARAMETERS.sinc_len >= expected, "{}", out.len());
	}
}
