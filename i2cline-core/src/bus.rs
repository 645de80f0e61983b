use std::fmt;
use std::io::{self, Read, Write};
#[cfg(unix)]
use std::path::Path;

use crate::debug::{noop_debugf, Debugf};
use crate::error::{BusError, BusResult};
#[cfg(unix)]
use crate::platform;
use crate::transport::Transport;
#[cfg(unix)]
use crate::transport::{DevFile, OpenError};

/// Largest payload accepted by a single raw write.
pub const MAX_WRITE_LEN: usize = 512;

/// Largest payload accepted by a register write, leaving room for the
/// register byte in front of it.
pub const MAX_REG_PAYLOAD: usize = MAX_WRITE_LEN - 1;

// anything larger would be cut short by the kernel without an error
const_assert!(MAX_WRITE_LEN <= crate::platform::MAX_KERNEL_TRANSFER);

// handles get moved onto worker threads, and errors get boxed into io::Error
assert_impl_all!(BusHandle<crate::transport::Mem>: Send);
assert_impl_all!(BusError: Send, Sync);

/// An open binding between this process and a single I2C peripheral.
///
/// Every transfer blocks until the kernel is done with it. The handle is not
/// internally synchronized: `&mut self` on every operation keeps it to one
/// user at a time.
///
/// Register helpers (`read_reg_*` / `write_reg_*`) implement the usual SMBus
/// access pattern on top of plain transfers: write the register address,
/// then read, or write the register address together with the data.
pub struct BusHandle<T: Transport> {
    addr: u8,
    bus: u32,
    transport: Option<T>,
    pub(crate) debugf: Debugf,
}

impl<T: Transport> fmt::Debug for BusHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusHandle")
            .field("addr", &format_args!("{:#04x}", self.addr))
            .field("bus", &self.bus)
            .field("transport", &self.transport)
            .field("debugf", &"<fn>")
            .finish()
    }
}

#[cfg(unix)]
impl BusHandle<DevFile> {
    /// Open `/dev/i2c-<bus>` and bind it to the peripheral at `addr`.
    pub fn open(bus: u32, addr: u8) -> BusResult<BusHandle<DevFile>> {
        BusHandle::open_at(platform::bus_path(bus), bus, addr)
    }

    /// Open an arbitrary `i2c-dev` device node and bind it to `addr`.
    ///
    /// The reported bus number is taken from a trailing `i2c-<n>` in the
    /// file name, or 0 if there isn't one.
    pub fn open_path(path: impl AsRef<Path>, addr: u8) -> BusResult<BusHandle<DevFile>> {
        let path = path.as_ref();
        let bus = platform::bus_from_path(path).unwrap_or(0);
        BusHandle::open_at(path, bus, addr)
    }

    fn open_at(path: impl AsRef<Path>, bus: u32, addr: u8) -> BusResult<BusHandle<DevFile>> {
        let path = path.as_ref();
        let dev = DevFile::open(path, addr).map_err(|e| match e {
            OpenError::Open(source) => BusError::DeviceOpen {
                path: path.to_path_buf(),
                source,
            },
            OpenError::Bind(source) => BusError::Bind { bus, addr, source },
        })?;

        debug!("opened {} for peripheral {:#04x}", path.display(), addr);
        Ok(BusHandle::with_transport(bus, addr, dev))
    }
}

impl<T: Transport> BusHandle<T> {
    /// Wrap an already-bound transport.
    pub fn with_transport(bus: u32, addr: u8, transport: T) -> BusHandle<T> {
        BusHandle {
            addr,
            bus,
            transport: Some(transport),
            debugf: Box::new(noop_debugf),
        }
    }

    /// Replace the debug hook used by every subsequent transfer.
    ///
    /// Pass [`noop_debugf`] to switch tracing back off.
    pub fn set_debugf(&mut self, debugf: impl FnMut(fmt::Arguments<'_>) + Send + 'static) {
        self.debugf = Box::new(debugf);
    }

    /// Bus number the peripheral sits on. Zero once closed.
    pub fn bus(&self) -> u32 {
        self.bus
    }

    /// Peripheral address on the bus. Zero once closed.
    pub fn addr(&self) -> u8 {
        self.addr
    }

    /// The underlying transport, or `None` if the handle has been closed.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Mutable access to the underlying transport.
    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    /// Send `buf` to the peripheral in a single transfer, returning the
    /// number of bytes written.
    ///
    /// `buf` must hold between 1 and [`MAX_WRITE_LEN`] bytes. Anything else
    /// is rejected without touching the bus.
    pub fn write(&mut self, buf: &[u8]) -> BusResult<usize> {
        if buf.is_empty() {
            return Err(BusError::EmptyPayload);
        }
        if buf.len() > MAX_WRITE_LEN {
            return Err(BusError::PayloadTooLarge {
                len: buf.len(),
                max: MAX_WRITE_LEN,
            });
        }

        let transport = self.transport.as_mut().ok_or(BusError::Closed)?;
        (self.debugf)(format_args!(
            "Write {} hex bytes: [{}]",
            buf.len(),
            hex::encode(buf)
        ));

        transport.write(buf).map_err(BusError::Transfer)
    }

    /// Send a single byte to the peripheral.
    pub fn write_byte(&mut self, b: u8) -> BusResult<usize> {
        self.write(&[b])
    }

    /// Fill `buf` from the peripheral in a single transfer, returning the
    /// number of bytes read.
    ///
    /// There is no framing: the caller sizes `buf` to the expected response.
    pub fn read(&mut self, buf: &mut [u8]) -> BusResult<usize> {
        let transport = self.transport.as_mut().ok_or(BusError::Closed)?;
        let n = transport.read(buf).map_err(BusError::Transfer)?;

        (self.debugf)(format_args!(
            "Read {} hex bytes: [{}]",
            n,
            hex::encode(&buf[..n])
        ));
        Ok(n)
    }

    /// Release the device node.
    ///
    /// The bus number and address are reset to zero whether or not the close
    /// itself succeeds. Closing an already-closed handle does nothing.
    pub fn close(&mut self) -> BusResult<()> {
        let transport = match self.transport.take() {
            Some(transport) => transport,
            None => return Ok(()),
        };

        let (bus, addr) = (self.bus, self.addr);
        self.bus = 0;
        self.addr = 0;

        debug!("closing bus {} peripheral {:#04x}", bus, addr);
        transport.close().map_err(BusError::Close)
    }
}

fn into_io(e: BusError) -> io::Error {
    match e {
        BusError::Transfer(e) => e,
        BusError::Closed => io::Error::new(io::ErrorKind::NotConnected, e),
        BusError::ShortRead { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, e),
        e => io::Error::new(io::ErrorKind::InvalidInput, e),
    }
}

impl<T: Transport> Read for BusHandle<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        BusHandle::read(self, buf).map_err(into_io)
    }
}

impl<T: Transport> Write for BusHandle<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        BusHandle::write(self, buf).map_err(into_io)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.transport.as_mut() {
            Some(transport) => transport.flush(),
            None => Err(into_io(BusError::Closed)),
        }
    }
}
