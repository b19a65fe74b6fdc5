use std::io::Result as Res;
use std::io::{ErrorKind, Read};

use crate::error::StreamError;

/**
	A byte-oriented stream that a `BitReader` unpacks bits from.

	Only [`read_byte`] and [`available`] are required. Sources that can rewind override the mark/reset methods; the defaults report that marking is unsupported.

	[`read_byte`]: ByteSource::read_byte
	[`available`]: ByteSource::available
*/
pub trait ByteSource {
	/// Reads the next byte, or returns `None` at the end of the data.
	fn read_byte(&mut self) -> Res<Option<u8>>;

	/// Returns the number of bytes that can be read without blocking.
	fn available(&self) -> Res<usize>;

	/// Returns whether [`mark`](ByteSource::mark) and [`reset`](ByteSource::reset) are supported.
	fn mark_supported(&self) -> bool {
		false
	}

	/// Marks the current position. The mark stays valid for at least `read_limit` further bytes.
	fn mark(&mut self, read_limit: usize) {
		let _ = read_limit;
	}

	/// Rewinds to the last mark.
	fn reset(&mut self) -> Res<()> {
		Err(StreamError::MarkUnsupported.into())
	}

	/// Releases the source.
	fn close(&mut self) -> Res<()> {
		Ok(())
	}
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
	#[inline]
	fn read_byte(&mut self) -> Res<Option<u8>> {
		(**self).read_byte()
	}

	fn available(&self) -> Res<usize> {
		(**self).available()
	}

	fn mark_supported(&self) -> bool {
		(**self).mark_supported()
	}

	fn mark(&mut self, read_limit: usize) {
		(**self).mark(read_limit)
	}

	fn reset(&mut self) -> Res<()> {
		(**self).reset()
	}

	fn close(&mut self) -> Res<()> {
		(**self).close()
	}
}

/// Consumes the slice from the front. Marking is not supported, use [`SliceSource`] for that.
impl ByteSource for &[u8] {
	#[inline]
	fn read_byte(&mut self) -> Res<Option<u8>> {
		match self.split_first() {
			Some((&byte, rest)) => {
				*self = rest;
				Ok(Some(byte))
			}
			None => Ok(None),
		}
	}

	fn available(&self) -> Res<usize> {
		Ok(self.len())
	}
}

/**
	An in-memory source that always supports mark/reset.

	The read limit passed to `mark` is ignored, as the whole buffer stays addressable.

	# Examples

	```
	use bitstream_mark::{ByteSource, SliceSource};

	let mut source = SliceSource::new(vec![1, 2, 3]);
	assert_eq!(source.read_byte().unwrap(), Some(1));
	source.mark(1);
	assert_eq!(source.read_byte().unwrap(), Some(2));
	source.reset().unwrap();
	assert_eq!(source.read_byte().unwrap(), Some(2));
	```
*/
#[derive(Debug, Clone)]
pub struct SliceSource<T> {
	data: T,
	pos: usize,
	marked: Option<usize>,
}

impl<T: AsRef<[u8]>> SliceSource<T> {
	pub fn new(data: T) -> Self {
		Self {
			data,
			pos: 0,
			marked: None,
		}
	}

	/// Returns the offset of the next byte to be read.
	pub fn position(&self) -> usize {
		self.pos
	}

	/// Unwraps this `SliceSource`, returning the underlying data.
	pub fn into_inner(self) -> T {
		self.data
	}
}

impl<T: AsRef<[u8]>> ByteSource for SliceSource<T> {
	#[inline]
	fn read_byte(&mut self) -> Res<Option<u8>> {
		let byte = self.data.as_ref().get(self.pos).copied();
		if byte.is_some() {
			self.pos += 1;
		}
		Ok(byte)
	}

	fn available(&self) -> Res<usize> {
		Ok(self.data.as_ref().len().saturating_sub(self.pos))
	}

	fn mark_supported(&self) -> bool {
		true
	}

	fn mark(&mut self, _read_limit: usize) {
		self.marked = Some(self.pos);
	}

	fn reset(&mut self) -> Res<()> {
		match self.marked {
			Some(pos) => {
				self.pos = pos;
				Ok(())
			}
			None => Err(StreamError::NotMarked.into()),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
	Unset,
	Active { limit: usize },
	Invalidated { limit: usize },
}

/**
	Adapts any [`Read`] into a [`ByteSource`] with mark/reset support.

	Bytes read after a `mark` are kept in a replay buffer of at most `read_limit` bytes. Reading beyond that limit invalidates the mark, after which `reset` fails with [`StreamError::MarkInvalidated`].

	`available` only counts bytes already held in the replay buffer, since a plain `Read` cannot report how much data it has left.

	Reads are done one byte at a time. If the inner reader is slow to call, wrap it in a [`std::io::BufReader`] first.

	# Examples

	```
	use bitstream_mark::{ByteSource, ReadSource};

	let mut source = ReadSource::new(&b"\x0a\x0b\x0c"[..]);
	source.mark(2);
	assert_eq!(source.read_byte().unwrap(), Some(0x0a));
	assert_eq!(source.read_byte().unwrap(), Some(0x0b));
	source.reset().unwrap();
	assert_eq!(source.available().unwrap(), 2);
	assert_eq!(source.read_byte().unwrap(), Some(0x0a));
	```

	[`Read`]: https://doc.rust-lang.org/std/io/trait.Read.html
	[`std::io::BufReader`]: https://doc.rust-lang.org/std/io/struct.BufReader.html
*/
#[derive(Debug)]
pub struct ReadSource<R: Read> {
	/// Reader to pull bytes from, `None` once closed.
	inner: Option<R>,
	/// Bytes read since the mark.
	replay: Vec<u8>,
	/// Offset of the next byte to hand out from `replay`.
	replay_pos: usize,
	mark: Mark,
}

impl<R: Read> ReadSource<R> {
	pub fn new(inner: R) -> Self {
		Self {
			inner: Some(inner),
			replay: Vec::new(),
			replay_pos: 0,
			mark: Mark::Unset,
		}
	}

	/// Gets a reference to the underlying reader, or `None` if the source was closed.
	pub fn get_ref(&self) -> Option<&R> {
		self.inner.as_ref()
	}

	/**
		Unwraps this `ReadSource`, returning the underlying reader.

		Bytes still waiting in the replay buffer are lost. Returns `None` if the source was closed.
	*/
	pub fn into_inner(self) -> Option<R> {
		self.inner
	}

	fn read_inner(&mut self) -> Res<Option<u8>> {
		let inner = self.inner.as_mut().ok_or(StreamError::Closed)?;
		let mut temp = [0; 1];
		loop {
			match inner.read(&mut temp) {
				Ok(0) => return Ok(None),
				Ok(_) => return Ok(Some(temp[0])),
				Err(e) if e.kind() == ErrorKind::Interrupted => continue,
				Err(e) => return Err(e),
			}
		}
	}
}

impl<R: Read> ByteSource for ReadSource<R> {
	fn read_byte(&mut self) -> Res<Option<u8>> {
		if self.inner.is_none() {
			return Err(StreamError::Closed.into());
		}
		if let Some(&byte) = self.replay.get(self.replay_pos) {
			self.replay_pos += 1;
			return Ok(Some(byte));
		}
		let byte = match self.read_inner()? {
			Some(byte) => byte,
			None => return Ok(None),
		};
		match self.mark {
			Mark::Active { limit } if self.replay.len() < limit => {
				self.replay.push(byte);
				self.replay_pos += 1;
			}
			Mark::Active { limit } => {
				log::debug!("mark invalidated after {} bytes", limit);
				self.mark = Mark::Invalidated { limit };
				self.replay.clear();
				self.replay_pos = 0;
			}
			Mark::Unset | Mark::Invalidated { .. } => {
				self.replay.clear();
				self.replay_pos = 0;
			}
		}
		Ok(Some(byte))
	}

	fn available(&self) -> Res<usize> {
		if self.inner.is_none() {
			return Err(StreamError::Closed.into());
		}
		Ok(self.replay.len() - self.replay_pos)
	}

	fn mark_supported(&self) -> bool {
		true
	}

	fn mark(&mut self, read_limit: usize) {
		// unread replay bytes stay ahead of the new mark
		self.replay.drain(..self.replay_pos);
		self.replay_pos = 0;
		self.mark = Mark::Active { limit: read_limit.max(self.replay.len()) };
	}

	fn reset(&mut self) -> Res<()> {
		if self.inner.is_none() {
			return Err(StreamError::Closed.into());
		}
		match self.mark {
			Mark::Active { .. } => {
				self.replay_pos = 0;
				Ok(())
			}
			Mark::Unset => Err(StreamError::NotMarked.into()),
			Mark::Invalidated { limit } => Err(StreamError::MarkInvalidated { limit }.into()),
		}
	}

	fn close(&mut self) -> Res<()> {
		if self.inner.take().is_some() {
			log::debug!("closed read source");
		}
		self.replay = Vec::new();
		self.replay_pos = 0;
		self.mark = Mark::Unset;
		Ok(())
	}
}

#[cfg(test)]
mod tests_slice {
	use crate::{ByteSource, SliceSource, StreamError};

	#[test]
	fn byte_slice_is_consumed() {
		let mut source = &b"\x01\x02"[..];
		assert_eq!(source.available().unwrap(), 2);
		assert_eq!(source.read_byte().unwrap(), Some(1));
		assert_eq!(source.read_byte().unwrap(), Some(2));
		assert_eq!(source.read_byte().unwrap(), None);
		assert_eq!(source.mark_supported(), false);
		let err = source.reset().unwrap_err();
		assert_eq!(StreamError::from_io(&err), Some(StreamError::MarkUnsupported));
	}

	#[test]
	fn reset_without_mark() {
		let mut source = SliceSource::new(b"\x01");
		let err = source.reset().unwrap_err();
		assert_eq!(StreamError::from_io(&err), Some(StreamError::NotMarked));
	}

	#[test]
	fn reset_repeatedly() {
		let mut source = SliceSource::new(&b"\x01\x02\x03"[..]);
		source.read_byte().unwrap();
		source.mark(0);
		assert_eq!(source.read_byte().unwrap(), Some(2));
		assert_eq!(source.read_byte().unwrap(), Some(3));
		assert_eq!(source.available().unwrap(), 0);
		source.reset().unwrap();
		assert_eq!(source.position(), 1);
		assert_eq!(source.available().unwrap(), 2);
		assert_eq!(source.read_byte().unwrap(), Some(2));
		source.reset().unwrap();
		assert_eq!(source.read_byte().unwrap(), Some(2));
	}
}
