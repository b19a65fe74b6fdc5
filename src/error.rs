use std::io;

use thiserror::Error;

/**
	Failures raised by this crate itself, as opposed to failures of the underlying byte stream.

	Every operation returns [`std::io::Result`], so these are converted into an [`io::Error`] carrying the `StreamError` as its payload. Recover it with [`StreamError::from_io`].

	[`std::io::Result`]: https://doc.rust-lang.org/std/io/type.Result.html
	[`io::Error`]: https://doc.rust-lang.org/std/io/struct.Error.html
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
	/// A read could not produce a single bit because the source is exhausted.
	#[error("no bits left in stream")]
	EndOfData,
	/// The source does not support mark/reset.
	#[error("mark/reset is not supported by this source")]
	MarkUnsupported,
	/// `reset` was called without a prior `mark`.
	#[error("stream has not been marked")]
	NotMarked,
	/// More than `limit` bytes were read since the mark.
	#[error("mark invalidated after reading past the limit of {limit} bytes")]
	MarkInvalidated { limit: usize },
	/// The source was closed.
	#[error("stream is closed")]
	Closed,
}

impl StreamError {
	/// Returns the `StreamError` wrapped by `err`, if it carries one.
	pub fn from_io(err: &io::Error) -> Option<Self> {
		err.get_ref()
			.and_then(|inner| inner.downcast_ref::<StreamError>())
			.copied()
	}

	fn kind(&self) -> io::ErrorKind {
		match self {
			StreamError::EndOfData => io::ErrorKind::UnexpectedEof,
			StreamError::MarkUnsupported => io::ErrorKind::Unsupported,
			StreamError::NotMarked | StreamError::MarkInvalidated { .. } => io::ErrorKind::InvalidInput,
			StreamError::Closed => io::ErrorKind::Other,
		}
	}
}

impl From<StreamError> for io::Error {
	fn from(err: StreamError) -> Self {
		io::Error::new(err.kind(), err)
	}
}
