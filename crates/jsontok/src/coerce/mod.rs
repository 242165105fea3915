//! Conversions from scanned lexemes to typed values.
//!
//! Everything here is pure: the reader decides which conversion applies and
//! turns failures into [`ErrorKind`](crate::ErrorKind)s with its own
//! position information.

pub(crate) mod bytes;
pub(crate) mod dates;
pub(crate) mod numbers;
