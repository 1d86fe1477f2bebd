//---------------------------------------------------------------------------------------------------- Use
use std::path::Path;
use strum::{
	AsRefStr,
	Display,
	EnumCount,
	EnumIter,
	EnumString,
	IntoStaticStr,
};
use crate::error::OpenError;

//---------------------------------------------------------------------------------------------------- Container
/// Supported audio containers.
///
/// Selected by file extension, case-insensitively.
///
/// ```rust
/// # use nagare::source::*;
/// assert_eq!(Container::from_extension("wav"), Some(Container::Wav));
/// assert_eq!(Container::from_extension("MP3"), Some(Container::Mp3));
/// assert_eq!(Container::from_extension("Ogg"), Some(Container::Ogg));
/// assert_eq!(Container::from_extension("flac"), None);
/// ```
#[derive(Copy,Clone,Debug,PartialEq,PartialOrd,Eq,Ord,Hash)]
#[derive(AsRefStr,Display,EnumCount,EnumIter,EnumString,IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Container {
	/// RIFF WAVE
	Wav,
	/// MPEG-1/2 Layer III
	Mp3,
	/// Ogg Vorbis
	Ogg,
}

impl Container {
	#[must_use]
	/// Match a file extension (without the leading `.`).
	pub fn from_extension(extension: &str) -> Option<Self> {
		extension.parse().ok()
	}

	/// Match the extension of `path`.
	///
	/// # Errors
	/// [`OpenError::UnsupportedExtension`] if the extension
	/// is missing or not a supported container.
	pub fn from_path(path: &Path) -> Result<Self, OpenError> {
		let extension = path
			.extension()
			.map(|e| e.to_string_lossy())
			.unwrap_or_default();

		Self::from_extension(&extension)
			.ok_or_else(|| OpenError::UnsupportedExtension(extension.into_owned()))
	}

	#[must_use]
	/// The canonical (lowercase) extension.
	pub fn extension(&self) -> &'static str {
		(*self).into()
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn from_path() {
		assert_eq!(Container::from_path(Path::new("a/b/song.WAV")).unwrap(), Container::Wav);
		assert_eq!(Container::from_path(Path::new("x.tar.ogg")).unwrap(), Container::Ogg);

		for bad in ["no_extension", "song.flac", "song.mp3.bak", ".wav"] {
			assert!(matches!(
				Container::from_path(Path::new(bad)),
				Err(OpenError::UnsupportedExtension(_)),
			), "{bad}");
		}
	}

	#[test]
	fn extension() {
		assert_eq!(Container::Wav.extension(), "wav");
		assert_eq!(Container::Mp3.extension(), "mp3");
		assert_eq!(Container::Ogg.extension(), "ogg");
	}
}
