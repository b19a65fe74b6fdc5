use std::io::Result as Res;

use crate::endian::{mask, BitEndianness, BE, LE};
use crate::sink::ByteSink;
use crate::BITS_PER_BYTE;

/// Writes most significant bits first.
pub type BEBitWriter<K> = BitWriter<BE, K>;
/// Writes least significant bits first.
pub type LEBitWriter<K> = BitWriter<LE, K>;

/// Writing of values up to 32 bits wide to a bit stream.
pub trait BitWrite {
	/// Writes the low `count` bits of `value`, `0 <= count <= 32`.
	fn write(&mut self, value: u32, count: u32) -> Res<()>;

	/// Flushes a partially written byte, padded with zero bits, and closes the underlying sink.
	fn close(&mut self) -> Res<()>;
}

/**
	An error returned by `BitWriter::into_inner`.

	Mirrors [`std::io::IntoInnerError`], whose constructor is not public: it carries the writer that failed to flush its partial byte along with the error.

	[`std::io::IntoInnerError`]: https://doc.rust-lang.org/std/io/struct.IntoInnerError.html
**/
#[derive(Debug)]
pub struct IntoInnerError<W>(W, std::io::Error);

impl<W> IntoInnerError<W> {
	/// The error that occurred while flushing.
	pub fn error(&self) -> &std::io::Error { &self.1 }
	/// The writer, still holding its partial byte.
	pub fn into_inner(self) -> W { self.0 }
}

/**
	Adds bit-level writing support to a [`ByteSink`], such as anything implementing `std::io::Write`.

	Bits are collected in a one-byte buffer, which is written to the sink as soon as it is full. A partially filled byte is written out, padded with zero bits, by `align`, `close`, `into_inner`, or when the writer is dropped.

	Errors while flushing on drop are logged and otherwise ignored. Code that wishes to handle such errors must call `close` or `align` before the writer is dropped.
*/
#[derive(Debug)]
pub struct BitWriter<E: BitEndianness, K: ByteSink> {
	/// Data to write to, only `None` after `into_inner`.
	inner: Option<K>,
	/// Number of pending bits in `bit_buffer`, 0 <= bit_count < 8.
	bit_count: u8,
	/// Storage for remaining bits after an unaligned write operation. Unused bits are zero.
	bit_buffer: u8,
	phantom: std::marker::PhantomData<E>,
}

impl<E: BitEndianness, K: ByteSink> BitWriter<E, K> {
	/**
		Creates a new `BitWriter` writing to `inner`.

		# Examples

		Create a `BitWriter` writing to bytes in memory:

		```
		use bitstream_mark::BEBitWriter;

		let mut vec = vec![];
		let mut writer = BEBitWriter::new(&mut vec);
		writer.write(0b101, 3).unwrap();
		writer.close().unwrap();
		drop(writer);
		assert_eq!(vec, b"\xa0");
		```
	*/
	pub fn new(inner: K) -> Self {
		Self {
			inner: Some(inner),
			bit_count: 0,
			bit_buffer: 0,
			phantom: std::marker::PhantomData,
		}
	}

	/// Returns whether the writer is aligned to the byte boundary.
	#[inline(always)]
	pub fn is_aligned(&self) -> bool {
		self.bit_count == 0
	}

	/// Returns the number of bits waiting in the partially written byte.
	#[inline]
	pub fn buffered_bits(&self) -> u32 {
		u32::from(self.bit_count)
	}

	/// Aligns to byte boundary, padding a partial byte with zero bits and writing it out.
	pub fn align(&mut self) -> Res<()> {
		if !self.is_aligned() {
			self.flush_buffer()?;
		}
		Ok(())
	}

	/// Gets a reference to the underlying sink.
	pub fn get_ref(&self) -> &K {
		self.sink_ref()
	}

	/**
		Unwraps this `BitWriter`, returning the underlying sink.

		The partially written byte is flushed before returning the sink. If an error occurs during the flushing it will be returned together with the writer.
	*/
	pub fn into_inner(mut self) -> Result<K, IntoInnerError<Self>> {
		match self.align() {
			Ok(()) => Ok(self.take_sink()),
			Err(e) => Err(IntoInnerError(self, e)),
		}
	}

	/**
		Flushes the partially written byte, then closes the sink.

		Calling this again only closes the sink again, as the buffer is already empty.
	*/
	pub fn close(&mut self) -> Res<()> {
		if !self.is_aligned() {
			log::trace!("{} close: flushing {} buffered bits", E::NAME, self.bit_count);
		}
		self.align()?;
		log::debug!("closing {} bit writer", E::NAME);
		self.sink_mut().close()
	}

	fn sink_ref(&self) -> &K {
		self.inner.as_ref().expect("sink is only taken by into_inner")
	}

	fn sink_mut(&mut self) -> &mut K {
		self.inner.as_mut().expect("sink is only taken by into_inner")
	}

	fn take_sink(&mut self) -> K {
		self.inner.take().expect("sink is only taken by into_inner")
	}

	fn flush_buffer(&mut self) -> Res<()> {
		let byte = self.bit_buffer;
		self.sink_mut().write_byte(byte)?;
		self.bit_buffer = 0;
		self.bit_count = 0;
		Ok(())
	}
}

impl<K: ByteSink> BitWriter<BE, K> {
	/**
		Writes the low `count` bits of `value`, most significant bit first.

		Bits of `value` above `count` are ignored.

		# Panics

		Panics if `count` > 32.

		# Examples

		```
		use bitstream_mark::BEBitWriter;

		let mut vec = vec![];
		{
			let mut writer = BEBitWriter::new(&mut vec);
			writer.write(31, 5).unwrap();
			writer.write(0x1234, 12).unwrap();
		}
		assert_eq!(vec, b"\xf9\x1a\x00");
		```
	*/
	pub fn write(&mut self, value: u32, count: u32) -> Res<()> {
		assert!(count <= 32);
		let mut remaining = count;
		while remaining > 0 {
			let rest = BITS_PER_BYTE - u32::from(self.bit_count);
			if rest > remaining {
				self.bit_buffer |= ((value & u32::from(mask(remaining))) << (rest - remaining)) as u8;
				self.bit_count += remaining as u8;
				remaining = 0;
			} else {
				remaining -= rest;
				self.bit_buffer |= (value >> remaining) as u8 & mask(rest);
				self.flush_buffer()?;
			}
		}
		Ok(())
	}
}

impl<K: ByteSink> BitWriter<LE, K> {
	/**
		Writes the low `count` bits of `value`, least significant bit first.

		Bits of `value` above `count` are ignored.

		# Panics

		Panics if `count` > 32.

		# Examples

		```
		use bitstream_mark::LEBitWriter;

		let mut vec = vec![];
		{
			let mut writer = LEBitWriter::new(&mut vec);
			writer.write(31, 5).unwrap();
			writer.write(0x1234, 12).unwrap();
		}
		assert_eq!(vec, b"\x9f\x46\x00");
		```
	*/
	pub fn write(&mut self, mut value: u32, count: u32) -> Res<()> {
		assert!(count <= 32);
		let mut remaining = count;
		while remaining > 0 {
			let rest = BITS_PER_BYTE - u32::from(self.bit_count);
			if rest > remaining {
				self.bit_buffer |= ((value & u32::from(mask(remaining))) << self.bit_count) as u8;
				self.bit_count += remaining as u8;
				remaining = 0;
			} else {
				self.bit_buffer |= ((value & u32::from(mask(rest))) << self.bit_count) as u8;
				self.flush_buffer()?;
				remaining -= rest;
				value >>= rest;
			}
		}
		Ok(())
	}
}

impl<K: ByteSink> BitWrite for BitWriter<BE, K> {
	#[inline]
	fn write(&mut self, value: u32, count: u32) -> Res<()> {
		Self::write(self, value, count)
	}

	fn close(&mut self) -> Res<()> {
		Self::close(self)
	}
}

impl<K: ByteSink> BitWrite for BitWriter<LE, K> {
	#[inline]
	fn write(&mut self, value: u32, count: u32) -> Res<()> {
		Self::write(self, value, count)
	}

	fn close(&mut self) -> Res<()> {
		Self::close(self)
	}
}

/// Flushes the buffer for unaligned writes before the `BitWriter` is dropped.
impl<E: BitEndianness, K: ByteSink> Drop for BitWriter<E, K> {
	fn drop(&mut self) {
		if self.inner.is_none() || self.is_aligned() {
			return;
		}
		if let Err(e) = self.flush_buffer() {
			log::warn!("{} bit writer dropped {} unflushed bits: {}", E::NAME, self.bit_count, e);
		}
	}
}



#[cfg(test)]
mod tests_le {
	use crate::LEBitWriter;

	#[test]
	fn write_mixed_widths() {
		let mut vec = vec![];{
		let mut writer = LEBitWriter::new(&mut vec);
		writer.write(0, 0).unwrap();
		writer.write(0x78563412, 32).unwrap();
		writer.write(2, 4).unwrap();
		writer.write(3, 3).unwrap();
		writer.write(0, 1).unwrap();
		writer.write(0xa8, 8).unwrap();
		writer.write(0x11, 6).unwrap();
		writer.close().unwrap();}
		assert_eq!(vec, b"\x12\x34\x56\x78\x32\xa8\x11");
	}

	#[test]
	fn write_single_bits() {
		let mut vec = vec![];{
		let mut writer = LEBitWriter::new(&mut vec);
		for bit in [0, 0, 1, 0, 1, 0, 1, 0].iter() {
			writer.write(*bit, 1).unwrap();
		}}
		assert_eq!(vec, b"\x54");
	}

	#[test]
	fn write_bits() {
		let mut vec = vec![];{
		let mut writer = LEBitWriter::new(&mut vec);
		writer.write(0x0a, 4).unwrap();
		writer.write(0xbc, 8).unwrap();}
		assert_eq!(vec, b"\xca\x0b");
	}

	#[test]
	fn high_bit_set_shifts_logically() {
		let mut vec = vec![];{
		let mut writer = LEBitWriter::new(&mut vec);
		writer.write(1, 1).unwrap();
		writer.write(0x8000_0001, 32).unwrap();}
		assert_eq!(vec, b"\x03\x00\x00\x00\x01");
	}

	#[test]
	#[should_panic]
	fn write_too_many_bits() {
		let mut vec = vec![];
		let mut writer = LEBitWriter::new(&mut vec);
		writer.write(0xff, 33).unwrap();
	}
}
