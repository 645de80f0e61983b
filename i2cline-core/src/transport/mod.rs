//! Transport interface and backend implementations.

use std::fmt::Debug;
use std::io::{self, Read, Write};

#[cfg(unix)]
mod dev;
mod mem;

#[cfg(unix)]
pub use dev::{DevFile, OpenError};
pub use mem::Mem;

/// Abstraction over whatever actually moves bytes to and from a peripheral.
///
/// Every `read`/`write` call is a single bus transfer: no framing, no
/// buffering, and partial transfers are reported as-is.
pub trait Transport: Debug + Read + Write {
    /// Release the underlying resource, reporting any error from doing so.
    fn close(self) -> io::Result<()>;
}
