/**
	Selects the bit order of a `BitReader` or `BitWriter`.

	This trait is sealed and only exists as a trait bound; the packing algorithm for each order lives in its own `impl` block on the reader and writer.
*/
pub trait BitEndianness: private::Sealed {
	/// Short name used in log output.
	const NAME: &'static str;
}

/// The first bit of a byte is its most significant bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BigEndian;
/// The first bit of a byte is its least significant bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LittleEndian;

impl BitEndianness for BigEndian {
	const NAME: &'static str = "BE";
}

impl BitEndianness for LittleEndian {
	const NAME: &'static str = "LE";
}

pub type BE = BigEndian;
pub type LE = LittleEndian;

/// Mask selecting the low `bits` bits of a byte, for `bits` in `0..=8`.
#[inline(always)]
pub(crate) fn mask(bits: u32) -> u8 {
	debug_assert!(bits <= 8);
	(0xffu16 >> (8 - bits)) as u8
}

// ensures no one else implements the trait
mod private {
	pub trait Sealed {}

	impl Sealed for super::BigEndian {}
	impl Sealed for super::LittleEndian {}
}
