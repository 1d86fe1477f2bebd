//! Stereo to mono reduction.

//---------------------------------------------------------------------------------------------------- Downmix
#[inline]
#[must_use]
/// Average one stereo frame into a mono sample.
///
/// The sum is taken in 32 bits and divided with truncation
/// toward zero, so it can never overflow.
///
/// ```rust
/// # use nagare::stream::*;
/// assert_eq!(downmix_frame(32_767, 32_767), 32_767);
/// assert_eq!(downmix_frame(-32_768, -32_768), -32_768);
/// assert_eq!(downmix_frame(1, 2), 1);
/// assert_eq!(downmix_frame(-1, -2), -1);
/// ```
pub const fn downmix_frame(left: i16, right: i16) -> i16 {
	((left as i32 + right as i32) / 2) as i16
}

/// Downmix interleaved stereo `pcm` to mono in place.
///
/// Frame `i` is written to `pcm[i]` and `pcm` is truncated to
/// the frame count. A trailing unpaired sample is dropped.
///
/// ```rust
/// # use nagare::stream::*;
/// let mut pcm = vec![100, 200, -3, 0, 7];
/// downmix_in_place(&mut pcm);
/// assert_eq!(pcm, [150, -1]);
/// ```
pub fn downmix_in_place(pcm: &mut Vec<i16>) {
	let frames = pcm.len() / 2;
	for i in 0..frames {
		pcm[i] = downmix_frame(pcm[i * 2], pcm[i * 2 + 1]);
	}
	pcm.truncate(frames);
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extremes() {
		assert_eq!(downmix_frame(i16::MAX, i16::MAX), i16::MAX);
		assert_eq!(downmix_frame(i16::MIN, i16::MIN), i16::MIN);
		assert_eq!(downmix_frame(i16::MAX, i16::MIN), 0);
		assert_eq!(downmix_frame(i16::MIN, i16::MAX), 0);
		assert_eq!(downmix_frame(i16::MIN, 0), -16_384);
	}

	#[test]
	fn truncates_toward_zero() {
		assert_eq!(downmix_frame(3, 0), 1);
		assert_eq!(downmix_frame(-3, 0), -1);
		assert_eq!(downmix_frame(i16::MIN, -1), -16_384);
	}

	#[test]
	fn matches_wide_arithmetic() {
		// Sweep a coarse grid of the full range against 64-bit math.
		for left in (i16::MIN..=i16::MAX).step_by(257) {
			for right in (i16::MIN..=i16::MAX).step_by(263) {
				let expected = (i64::from(left) + i64::from(right)) / 2;
				assert_eq!(i64::from(downmix_frame(left, right)), expected);
			}
		}
	}
}
