use std::io::Result as Res;
use std::io::Write;

/**
	A byte-oriented stream that a `BitWriter` packs bits into.

	Implemented for everything implementing [`Write`], where `close` maps to `flush`.

	[`Write`]: https://doc.rust-lang.org/std/io/trait.Write.html
*/
pub trait ByteSink {
	/// Writes a single byte.
	fn write_byte(&mut self, byte: u8) -> Res<()>;

	/// Releases the sink. Calling this more than once must be harmless.
	fn close(&mut self) -> Res<()>;
}

impl<W: Write> ByteSink for W {
	#[inline]
	fn write_byte(&mut self, byte: u8) -> Res<()> {
		self.write_all(&[byte])
	}

	fn close(&mut self) -> Res<()> {
		self.flush()
	}
}
