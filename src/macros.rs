// Global macros for internal nagare usage.

//---------------------------------------------------------------------------------------------------- Logging
// Logs with `log` but only if the `log` feature is enabled,
// otherwise the arguments are type-checked (so bindings used
// only for logging still count as used) but never evaluated.

macro_rules! error2 {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        ::log::error!($($arg)+);
        #[cfg(not(feature = "log"))]
        {
            if false {
                let _ = format_args!($($arg)+);
            }
        }
    }};
}
pub(crate) use error2;

macro_rules! warn2 {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        ::log::warn!($($arg)+);
        #[cfg(not(feature = "log"))]
        {
            if false {
                let _ = format_args!($($arg)+);
            }
        }
    }};
}
pub(crate) use warn2;

macro_rules! debug2 {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        ::log::debug!($($arg)+);
        #[cfg(not(feature = "log"))]
        {
            if false {
                let _ = format_args!($($arg)+);
            }
        }
    }};
}
pub(crate) use debug2;

macro_rules! trace2 {
    ($($arg:tt)+) => {{
        #[cfg(feature = "log")]
        ::log::trace!($($arg)+);
        #[cfg(not(feature = "log"))]
        {
            if false {
                let _ = format_args!($($arg)+);
            }
        }
    }};
}
pub(crate) use trace2;

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use std::cell::Cell;

	#[test]
	fn arguments_are_not_evaluated_without_a_logger() {
		let calls = Cell::new(0);
		let count = || {
			calls.set(calls.get() + 1);
			calls.get()
		};

		// No logger is installed in tests, and these must not
		// evaluate their arguments with or without `log`.
		error2!("{}", count());
		warn2!("{}", count());
		debug2!("{}", count());
		trace2!("{}", count());
		assert_eq!(calls.get(), 0);

		// A binding only logged is still used.
		let e = std::io::Error::from(std::io::ErrorKind::Other);
		warn2!("{e}");
	}
}
