/*!
	## Bit-level reading and writing with mark/reset

	Byte streams only allow reading and writing whole bytes. This crate layers bit-granular access on top of them: values of any width from 0 to 32 bits can be read from a [`ByteSource`] and written to a [`ByteSink`], in either big endian or little endian bit order.

	- [`BitReader`] unpacks bits, [`BitWriter`] packs them. Both hold at most one partially consumed byte.
	- The bit order is picked with a type parameter, usually through the aliases [`BEBitReader`], [`LEBitReader`], [`BEBitWriter`] and [`LEBitWriter`].
	- Readers support mark/reset down to the bit, as long as the source supports it. [`SliceSource`] and [`ReadSource`] do.
	- Every `std::io::Write` is a [`ByteSink`].

	### End of data

	A read fails with [`StreamError::EndOfData`] only if not a single bit is left. If fewer bits than requested are left, they are returned without error. This makes it possible to drain a stream whose length is not a whole number of fields.

	```
	use bitstream_mark::{BEBitReader, BEBitWriter, SliceSource, StreamError};

	let mut bytes = vec![];
	{
		let mut writer = BEBitWriter::new(&mut bytes);
		writer.write(0b101, 3).unwrap();
		writer.write(0x1ff, 9).unwrap();
		writer.close().unwrap();
	}
	assert_eq!(bytes, b"\xbf\xf0");

	let mut reader = BEBitReader::new(SliceSource::new(&bytes));
	assert_eq!(reader.read(3).unwrap(), 0b101);
	reader.mark(9);
	assert_eq!(reader.read(9).unwrap(), 0x1ff);
	reader.reset().unwrap();
	assert_eq!(reader.read(9).unwrap(), 0x1ff);
	// the padding bits are all that is left
	assert_eq!(reader.available_bits().unwrap(), 4);
	assert_eq!(reader.read(8).unwrap(), 0);
	let err = reader.read(1).unwrap_err();
	assert_eq!(StreamError::from_io(&err), Some(StreamError::EndOfData));
	```

	### Non-goals of this crate

	- Values wider than 32 bits.
	- Seeking to arbitrary bit offsets other than through mark/reset.
	- Sharing a reader or writer between threads without external synchronization.
*/
mod endian;
mod error;
mod read;
mod sink;
mod source;
mod write;

pub use self::endian::*;
pub use self::error::*;
pub use self::read::*;
pub use self::sink::*;
pub use self::source::*;
pub use self::write::*;

/// Number of bits in a byte of the underlying stream.
pub const BITS_PER_BYTE: u32 = 8;
