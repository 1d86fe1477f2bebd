//---------------------------------------------------------------------------------------------------- use
use crate::error::{OpenError,SinkError};

#[allow(unused_imports)] // docs
use crate::stream::Streamer;

//---------------------------------------------------------------------------------------------------- NagareError
#[derive(thiserror::Error, Debug)]
/// All errors that prevent a [`Streamer`] from being created.
pub enum NagareError {
	#[error("audio open error: {0}")]
	/// The file could not be opened or decoded
	Open(#[from] OpenError),

	#[error("audio sink error: {0}")]
	/// The sink could not allocate the stream's resources
	Sink(#[from] SinkError),
}
