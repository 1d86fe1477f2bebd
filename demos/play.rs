//! Stream an audio file to the default output device.
//!
//! ```bash
//! cargo run --example play -- [--loop] [--mono] <PATH>
//! ```
//!
//! `--mono` downmixes stereo files (the `surround` flag).

use std::time::Duration;
use nagare::{
	Streamer,
	config::StreamConfig,
	error::NagareError,
	sink::CpalSink,
};

fn main() -> Result<(), NagareError> {
	//-------------------------------------------------------------------- Arguments
	let mut config = StreamConfig::DEFAULT;
	let mut path = None;

	for arg in std::env::args().skip(1) {
		match arg.as_str() {
			"--loop" => config.looping  = true,
			"--mono" => config.surround = true,
			_ => path = Some(arg),
		}
	}

	let Some(path) = path else {
		eprintln!("usage: play [--loop] [--mono] <PATH>");
		std::process::exit(1);
	};

	//-------------------------------------------------------------------- Stream set-up
	// Open the default audio device and prime the stream.
	let sink = CpalSink::new()?;
	println!("device: {} channel(s), {} Hz", sink.channels(), sink.sample_rate());
	let mut stream = Streamer::open(sink, &path, config)?;
	println!(
		"{path}: {} channel(s), {} Hz, {:.2}s",
		stream.channels(),
		stream.sample_rate(),
		stream.duration(),
	);

	//-------------------------------------------------------------------- Playback
	// Nothing refills the buffers but us,
	// so keep ticking until the end of the file.
	stream.play();
	let mut tick: u32 = 0;
	while stream.is_playing() {
		stream.update();

		// Print every ~0.5 seconds.
		if tick % 50 == 0 {
			println!("{:>7.2}s {:>6.2}%", stream.offset(), stream.progress() * 100.0);
		}
		tick = tick.wrapping_add(1);

		std::thread::sleep(Duration::from_millis(10));
	}

	Ok(())
}
