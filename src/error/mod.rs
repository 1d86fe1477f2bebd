//! General errors that can occur.

mod open;
pub use open::OpenError;

mod sink;
pub use sink::SinkError;

mod error;
pub use error::NagareError;
