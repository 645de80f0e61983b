use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type BusResult<T> = Result<T, BusError>;

/// Error resulting from an operation on a [`BusHandle`](crate::BusHandle).
///
/// Nothing is retried internally. Every failure is handed straight back to
/// the caller, who decides whether to try again.
#[derive(Debug, Error)]
pub enum BusError {
    // -- Setup -- //
    /// The bus device node could not be opened (missing `i2c-dev` module,
    /// wrong bus number, insufficient permissions...).
    #[error("could not open {}: {source}", .path.display())]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The kernel rejected the request to address the peripheral.
    #[error("could not bind bus {bus} to peripheral {addr:#04x}: {source}")]
    Bind {
        bus: u32,
        addr: u8,
        #[source]
        source: io::Error,
    },

    // -- Caller Contract Violations -- //
    /// Payload exceeds what a single transfer may carry.
    #[error("payload of {len} bytes exceeds the {max} byte transfer limit")]
    PayloadTooLarge { len: usize, max: usize },
    /// Zero-length writes are never sent to the kernel.
    #[error("refusing to send an empty payload")]
    EmptyPayload,

    // -- Transfers -- //
    /// The underlying read or write failed (peripheral not responding, bus
    /// error, generic I/O error).
    #[error("i2c transfer failed: {0}")]
    Transfer(#[source] io::Error),
    /// A fixed-width register read came back with fewer bytes than the
    /// register holds.
    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },
    /// Releasing the device node failed. The handle is closed regardless.
    #[error("error while closing the bus: {0}")]
    Close(#[source] io::Error),
    /// The handle has already been closed.
    #[error("bus handle is closed")]
    Closed,
}

impl BusError {
    /// Returns the underlying OS error, if there is one.
    pub fn io_error(&self) -> Option<&io::Error> {
        use BusError::*;
        match self {
            DeviceOpen { source, .. } | Bind { source, .. } => Some(source),
            Transfer(e) | Close(e) => Some(e),
            PayloadTooLarge { .. } | EmptyPayload | ShortRead { .. } | Closed => None,
        }
    }
}
