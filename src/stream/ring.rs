//! The fixed set of buffer slots a stream cycles through.

//---------------------------------------------------------------------------------------------------- Use
use crate::{
	error::SinkError,
	sink::{Sink,BufferId},
};

//---------------------------------------------------------------------------------------------------- BufferRing
/// Buffer slots allocated once and reused in FIFO order.
///
/// The ring only owns the slot ids; which of them are currently queued
/// is tracked by the sink. A slot is only ever refilled after the sink
/// reported it processed and it was dequeued.
#[derive(Debug)]
pub(crate) struct BufferRing {
	slots: Vec<BufferId>,
}

impl BufferRing {
	/// Allocate `size` slots from `sink`.
	pub(crate) fn allocate<S: Sink>(sink: &mut S, size: usize) -> Result<Self, SinkError> {
		Ok(Self {
			slots: sink.allocate_buffers(size)?,
		})
	}

	/// Every slot, in allocation order.
	pub(crate) fn slots(&self) -> &[BufferId] {
		&self.slots
	}

	/// Whether `buffer` is one of this ring's slots.
	pub(crate) fn contains(&self, buffer: BufferId) -> bool {
		self.slots.contains(&buffer)
	}

	pub(crate) fn len(&self) -> usize {
		self.slots.len()
	}

	/// Hand every slot back to `sink`.
	///
	/// The ring is empty afterwards, so releasing twice is harmless.
	pub(crate) fn release<S: Sink>(&mut self, sink: &mut S) {
		if !self.slots.is_empty() {
			sink.deallocate_buffers(&self.slots);
			self.slots.clear();
		}
	}
}

//---------------------------------------------------------------------------------------------------- Tests
#[cfg(test)]
mod tests {
	use super::*;
	use crate::sink::DummySink;
	use pretty_assertions::assert_eq;

	#[test]
	fn allocate_and_release() {
		let mut sink = DummySink::new();
		let mut ring = BufferRing::allocate(&mut sink, 4).unwrap();
		assert_eq!(ring.len(), 4);
		assert_eq!(sink.buffer_count(), 4);
		assert!(ring.slots().iter().all(|id| ring.contains(*id)));

		ring.release(&mut sink);
		ring.release(&mut sink);
		assert_eq!(ring.len(), 0);
		assert_eq!(sink.buffer_count(), 0);
	}

	#[test]
	fn allocation_failure() {
		let mut sink = DummySink::with_limits(1, 3);
		assert!(matches!(BufferRing::allocate(&mut sink, 4), Err(SinkError::Allocation)));
		assert_eq!(sink.buffer_count(), 0);
	}
}
