use std::io::Result as Res;

use crate::endian::{mask, BitEndianness, BE, LE};
use crate::error::StreamError;
use crate::source::ByteSource;
use crate::BITS_PER_BYTE;

/// Reads most significant bits first.
pub type BEBitReader<S> = BitReader<BE, S>;
/// Reads least significant bits first.
pub type LEBitReader<S> = BitReader<LE, S>;

/**
	Reading of values up to 32 bits wide from a bit stream.

	Implemented by [`BitReader`] for both bit orders, so code can be written once against either.
*/
pub trait BitRead {
	/**
		Reads `count` bits, `0 <= count <= 32`, into the low bits of the result.

		Fails with [`StreamError::EndOfData`] only if not a single bit could be read. If the stream ends after at least one bit was read, the bits read so far are returned without error.
	*/
	fn read(&mut self, count: u32) -> Res<u32>;

	/// Returns the number of bits that can be read without blocking.
	fn available_bits(&self) -> Res<u64>;

	/// Returns whether the underlying source supports `mark` and `reset`.
	fn mark_supported(&self) -> bool;

	/// Marks the current bit position, valid for at least `read_limit` further bits.
	fn mark(&mut self, read_limit: usize);

	/// Rewinds to the bit position of the last `mark`.
	fn reset(&mut self) -> Res<()>;

	/// Closes the underlying source.
	fn close(&mut self) -> Res<()>;
}

/**
	Adds bit-level reading support to a [`ByteSource`].

	An internal one-byte buffer holds the bits of a partially read byte. Reads of up to 32 bits are assembled from this buffer and from whole bytes pulled from the source one at a time.

	The bit endianness determines the direction in which bits in a byte are read, and how the bits of a multi-byte read are ordered in the result. For big endian the first bit read becomes the most significant bit of the result, for little endian the least significant.

	Mark/reset is delegated to the source, with the partial byte saved and restored alongside, so a reset rewinds to the exact bit.
*/
pub struct BitReader<E: BitEndianness, S: ByteSource> {
	/// Data to read from.
	inner: S,
	/// Number of unread bits in `bit_buffer`, 0 <= bit_count < 8.
	bit_count: u8,
	/// Storage for remaining bits after an unaligned read operation.
	bit_buffer: u8,
	/// `(bit_buffer, bit_count)` at the last `mark`.
	marked: (u8, u8),
	phantom: std::marker::PhantomData<E>,
}

impl<E: BitEndianness, S: ByteSource> BitReader<E, S> {
	/**
		Creates a new `BitReader` reading from `inner`.

		# Examples

		```
		use bitstream_mark::BEBitReader;

		let data = b"\xcf\xfe\xf3\x2c";
		let mut reader = BEBitReader::new(&data[..]);
		assert_eq!(reader.read(12).unwrap(), 0xcff);
		```
	*/
	pub fn new(inner: S) -> Self {
		Self {
			inner,
			bit_count: 0,
			bit_buffer: 0,
			marked: (0, 0),
			phantom: std::marker::PhantomData,
		}
	}

	/// Returns whether the reader is aligned to the byte boundary.
	#[inline(always)]
	pub fn is_aligned(&self) -> bool {
		self.bit_count == 0
	}

	/// Returns the number of bits left over from the last partially read byte.
	#[inline]
	pub fn buffered_bits(&self) -> u32 {
		u32::from(self.bit_count)
	}

	/// Aligns to byte boundary, discarding a partial byte if the `BitReader` was not aligned.
	pub fn align(&mut self) {
		self.bit_count = 0;
		self.bit_buffer = 0;
	}

	/// Gets a reference to the underlying source.
	pub fn get_ref(&self) -> &S {
		&self.inner
	}

	/**
		Unwraps this `BitReader`, returning the underlying source.

		Note that any partially read byte is lost.
	*/
	pub fn into_inner(self) -> S {
		self.inner
	}

	/// Returns the number of bits that can be read without blocking: whole bytes from the source plus the buffered bits.
	pub fn available_bits(&self) -> Res<u64> {
		let bytes = self.inner.available()? as u64;
		Ok(bytes * u64::from(BITS_PER_BYTE) + u64::from(self.bit_count))
	}

	/// Returns whether the underlying source supports `mark` and `reset`.
	pub fn mark_supported(&self) -> bool {
		self.inner.mark_supported()
	}

	/**
		Marks the current bit position.

		The source is asked to keep at least `read_limit` bits, rounded up to whole bytes, available for a later `reset`.
	*/
	pub fn mark(&mut self, read_limit: usize) {
		let per_byte = BITS_PER_BYTE as usize;
		let bytes = read_limit / per_byte + usize::from(read_limit % per_byte != 0);
		log::trace!("{} mark: {} bytes, {} bits buffered", E::NAME, bytes, self.bit_count);
		self.inner.mark(bytes);
		self.marked = (self.bit_buffer, self.bit_count);
	}

	/**
		Rewinds to the bit position of the last `mark`.

		Fails with whatever the source reports if it does not support marking, was never marked, or the mark was invalidated. The reader is unchanged in that case.
	*/
	pub fn reset(&mut self) -> Res<()> {
		self.inner.reset()?;
		let (bit_buffer, bit_count) = self.marked;
		log::trace!("{} reset: {} bits buffered", E::NAME, bit_count);
		self.bit_buffer = bit_buffer;
		self.bit_count = bit_count;
		Ok(())
	}

	/// Closes the underlying source.
	pub fn close(&mut self) -> Res<()> {
		log::debug!("closing {} bit reader", E::NAME);
		self.inner.close()
	}

	/// Refills the buffer with the next byte. Returns `false` at the end of the data.
	fn fill_buffer(&mut self) -> Res<bool> {
		match self.inner.read_byte()? {
			Some(byte) => {
				self.bit_buffer = byte;
				self.bit_count = BITS_PER_BYTE as u8;
				Ok(true)
			}
			None => Ok(false),
		}
	}
}

fn short_read<E: BitEndianness>(count: u32, missing: u32) -> Res<()> {
	if missing == count {
		return Err(StreamError::EndOfData.into());
	}
	log::debug!("{} short read: got {} of {} bits", E::NAME, count - missing, count);
	Ok(())
}

/// These methods read starting from the most significant bit.
impl<S: ByteSource> BitReader<BE, S> {
	/**
		Reads `count` bits, most significant bit first.

		The first bit read ends up as bit `count - 1` of the result, the others are zero. If the stream ends before `count` bits could be read, the bits read so far are returned in their positions, leaving the low bits zero.

		# Errors

		Fails with [`StreamError::EndOfData`] (kind [`UnexpectedEof`]) if the stream ended before a single bit was read. Errors of the source are returned unchanged.

		# Panics

		Panics if `count` > 32.

		# Examples

		```
		# use bitstream_mark::BEBitReader;
		let mut reader = BEBitReader::new(&b"\xf8\x11"[..]);
		assert_eq!(reader.read(5).unwrap(), 31);
		assert_eq!(reader.read(3).unwrap(), 0);
		// only 8 bits left, they come first
		assert_eq!(reader.read(12).unwrap(), 0x110);
		assert!(reader.read(1).is_err());
		```

		[`UnexpectedEof`]: https://doc.rust-lang.org/std/io/enum.ErrorKind.html#variant.UnexpectedEof
	*/
	pub fn read(&mut self, count: u32) -> Res<u32> {
		assert!(count <= 32);
		let mut remaining = count;
		let mut res = 0u32;
		while remaining > 0 {
			if self.is_aligned() && !self.fill_buffer()? {
				short_read::<BE>(count, remaining)?;
				return Ok(res);
			}
			let buffered = u32::from(self.bit_count);
			if buffered > remaining {
				res |= u32::from((self.bit_buffer >> (buffered - remaining)) & mask(remaining));
				self.bit_count -= remaining as u8;
				remaining = 0;
			} else {
				remaining -= buffered;
				res |= u32::from(self.bit_buffer & mask(buffered)) << remaining;
				self.bit_count = 0;
			}
		}
		Ok(res)
	}
}

/// These methods read starting from the least significant bit.
impl<S: ByteSource> BitReader<LE, S> {
	/**
		Reads `count` bits, least significant bit first.

		The first bit read ends up as bit 0 of the result, bits above `count` are zero. If the stream ends before `count` bits could be read, the bits read so far are returned.

		# Errors

		Fails with [`StreamError::EndOfData`] (kind [`UnexpectedEof`]) if the stream ended before a single bit was read. Errors of the source are returned unchanged.

		# Panics

		Panics if `count` > 32.

		# Examples

		```
		# use bitstream_mark::LEBitReader;
		let mut reader = LEBitReader::new(&b"\xf8\x11"[..]);
		assert_eq!(reader.read(5).unwrap(), 24);
		assert_eq!(reader.read(3).unwrap(), 7);
		assert_eq!(reader.read(12).unwrap(), 0x11);
		assert!(reader.read(1).is_err());
		```

		[`UnexpectedEof`]: https://doc.rust-lang.org/std/io/enum.ErrorKind.html#variant.UnexpectedEof
	*/
	pub fn read(&mut self, count: u32) -> Res<u32> {
		assert!(count <= 32);
		let mut remaining = count;
		let mut res = 0u32;
		let mut res_bits = 0;
		while remaining > 0 {
			if self.is_aligned() && !self.fill_buffer()? {
				short_read::<LE>(count, remaining)?;
				return Ok(res);
			}
			let buffered = u32::from(self.bit_count);
			if buffered > remaining {
				res |= u32::from(self.bit_buffer & mask(remaining)) << res_bits;
				self.bit_buffer >>= remaining;
				self.bit_count -= remaining as u8;
				remaining = 0;
			} else {
				res |= u32::from(self.bit_buffer & mask(buffered)) << res_bits;
				res_bits += buffered;
				remaining -= buffered;
				self.bit_count = 0;
			}
		}
		Ok(res)
	}
}

impl<S: ByteSource> BitRead for BitReader<BE, S> {
	#[inline]
	fn read(&mut self, count: u32) -> Res<u32> {
		Self::read(self, count)
	}

	fn available_bits(&self) -> Res<u64> {
		Self::available_bits(self)
	}

	fn mark_supported(&self) -> bool {
		Self::mark_supported(self)
	}

	fn mark(&mut self, read_limit: usize) {
		Self::mark(self, read_limit)
	}

	fn reset(&mut self) -> Res<()> {
		Self::reset(self)
	}

	fn close(&mut self) -> Res<()> {
		Self::close(self)
	}
}

impl<S: ByteSource> BitRead for BitReader<LE, S> {
	#[inline]
	fn read(&mut self, count: u32) -> Res<u32> {
		Self::read(self, count)
	}

	fn available_bits(&self) -> Res<u64> {
		Self::available_bits(self)
	}

	fn mark_supported(&self) -> bool {
		Self::mark_supported(self)
	}

	fn mark(&mut self, read_limit: usize) {
		Self::mark(self, read_limit)
	}

	fn reset(&mut self) -> Res<()> {
		Self::reset(self)
	}

	fn close(&mut self) -> Res<()> {
		Self::close(self)
	}
}

#[cfg(test)]
mod tests_common {
	use std::io;
	use crate::{BEBitReader, BitRead, LEBitReader, ReadSource, SliceSource, StreamError};

	const DATA: &[u8] = b"\x12\x34\x56\x78\x32\xa8\x11";

	#[test]
	fn get_ref() {
		let reader = BEBitReader::new(&b"\xf8"[..]);
		let inner = reader.get_ref();
		assert_eq!(inner[0], 0xf8);
	}

	#[test]
	fn into_inner() {
		let mut reader = BEBitReader::new(&b"\xf8\x80"[..]);
		reader.read(4).unwrap();
		let inner = reader.into_inner();
		assert_eq!(inner, b"\x80");
	}

	#[test]
	fn align() {
		let mut reader = BEBitReader::new(&b"\xf8\x80"[..]);
		let bits = reader.read(5).unwrap();
		assert_eq!(reader.is_aligned(), false);
		assert_eq!(reader.buffered_bits(), 3);
		reader.align();
		assert_eq!(reader.is_aligned(), true);
		let bit = reader.read(1).unwrap();
		assert_eq!(bits, 31);
		assert_eq!(bit, 1);
	}

	#[test]
	fn zero_width() {
		let mut reader = BEBitReader::new(&b""[..]);
		assert_eq!(reader.read(0).unwrap(), 0);
		let mut reader = LEBitReader::new(&b"\xff"[..]);
		assert_eq!(reader.read(0).unwrap(), 0);
		assert_eq!(reader.available_bits().unwrap(), 8);
	}

	#[test]
	fn end_of_data() {
		let mut reader = LEBitReader::new(&b""[..]);
		let err = reader.read(3).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
		assert_eq!(StreamError::from_io(&err), Some(StreamError::EndOfData));
	}

	#[test]
	fn reset_unsupported() {
		let mut reader = BEBitReader::new(DATA);
		assert_eq!(reader.mark_supported(), false);
		reader.mark(8);
		reader.read(8).unwrap();
		let err = reader.reset().unwrap_err();
		assert_eq!(StreamError::from_io(&err), Some(StreamError::MarkUnsupported));
		assert_eq!(reader.read(8).unwrap(), 0x34);
	}

	#[test]
	fn reset_without_mark() {
		let mut reader = LEBitReader::new(SliceSource::new(DATA));
		reader.read(3).unwrap();
		let err = reader.reset().unwrap_err();
		assert_eq!(StreamError::from_io(&err), Some(StreamError::NotMarked));
		assert_eq!(reader.buffered_bits(), 5);
	}

	#[test]
	fn mark_limit_rounds_up() {
		let mut reader = BEBitReader::new(ReadSource::new(DATA));
		reader.read(4).unwrap();
		// 4 buffered bits plus 9 more need two more bytes from the source
		reader.mark(13);
		assert_eq!(reader.read(13).unwrap(), 0x0468);
		reader.reset().unwrap();
		assert_eq!(reader.read(13).unwrap(), 0x0468);
		reader.reset().unwrap();
		// the 21st bit comes from a third byte, past the limit
		assert_eq!(reader.read(21).unwrap(), 0x468ac);
		let err = reader.reset().unwrap_err();
		assert_eq!(StreamError::from_io(&err), Some(StreamError::MarkInvalidated { limit: 2 }));
	}

	#[test]
	fn generic_over_endianness() {
		fn first_nibbles<R: BitRead>(reader: &mut R) -> (u32, u32) {
			(reader.read(4).unwrap(), reader.read(4).unwrap())
		}
		assert_eq!(first_nibbles(&mut BEBitReader::new(DATA)), (1, 2));
		assert_eq!(first_nibbles(&mut LEBitReader::new(DATA)), (2, 1));
	}

	#[test]
	fn close_borrowed_source() {
		let mut source = ReadSource::new(DATA);
		{
			let mut reader = LEBitReader::new(&mut source);
			reader.read(8).unwrap();
			reader.close().unwrap();
			reader.close().unwrap();
		}
		assert!(source.get_ref().is_none());
	}
}

#[cfg(test)]
mod tests_be {
	use crate::{BEBitReader, SliceSource, StreamError};

	#[test]
	fn read_mark_reset() {
		let data = b"\x12\x34\x56\x78\x32\xa8\x11";
		let mut reader = BEBitReader::new(SliceSource::new(data));
		assert_eq!(reader.mark_supported(), true);
		assert_eq!(reader.available_bits().unwrap(), 56);
		assert_eq!(reader.read(0).unwrap(), 0);
		assert_eq!(reader.read(32).unwrap(), 0x12345678);
		assert_eq!(reader.read(4).unwrap(), 3);

		reader.mark(200);
		assert_eq!(reader.read(3).unwrap(), 1);
		assert_eq!(reader.read(1).unwrap(), 0);
		assert_eq!(reader.read(8).unwrap(), 0xa8);

		reader.reset().unwrap();
		assert_eq!(reader.read(4).unwrap(), 2);
		assert_eq!(reader.read(8).unwrap(), 0xa8);

		// asking for more than is left only returns what is there
		assert_eq!(reader.available_bits().unwrap(), 8);
		assert_eq!(reader.read(12).unwrap(), 0x110);

		let err = reader.read(1).unwrap_err();
		assert_eq!(StreamError::from_io(&err), Some(StreamError::EndOfData));
		reader.close().unwrap();
	}

	#[test]
	fn read_single_bits() {
		let mut reader = BEBitReader::new(&b"\x2a"[..]);
		let bits: Vec<u32> = (0..8).map(|_| reader.read(1).unwrap()).collect();
		assert_eq!(bits, [0, 0, 1, 0, 1, 0, 1, 0]);
	}

	#[test]
	fn read_bits() {
		let mut reader = BEBitReader::new(&b"\xab\xcd"[..]);
		assert_eq!(reader.read(4).unwrap(), 0x0a);
		assert_eq!(reader.read(8).unwrap(), 0xbc);
	}

	#[test]
	fn read_unaligned_wide() {
		let mut reader = BEBitReader::new(&b"\xb1\xed\x3b\xc1\xff"[..]);
		assert_eq!(reader.read(2).unwrap(), 2);
		assert_eq!(reader.read(3).unwrap(), 6);
		assert_eq!(reader.read(32).unwrap(), 0x3da7783f);
		assert_eq!(reader.read(3).unwrap(), 7);
	}

	#[test]
	fn short_read_mid_byte() {
		let mut reader = BEBitReader::new(&b"\xab"[..]);
		assert_eq!(reader.read(3).unwrap(), 0b101);
		assert_eq!(reader.read(7).unwrap(), 0b01011 << 2);
	}

	#[test]
	#[should_panic]
	fn read_too_many_bits() {
		let mut reader = BEBitReader::new(&b""[..]);
		let _ = reader.read(33);
	}
}
