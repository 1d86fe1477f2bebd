//! Resampler backends.

mod resampler;
pub(crate) use resampler::Resampler;

mod rubato;
pub(crate) use self::rubato::Rubato as ResamplerStruct;
