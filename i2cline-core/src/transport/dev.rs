use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::IntoRawFd;
use std::path::Path;

use crate::platform;
use crate::transport::Transport;

/// Error from [`DevFile::open`], split by which step failed.
#[derive(Debug)]
pub enum OpenError {
    Open(io::Error),
    Bind(io::Error),
}

/// An `i2c-dev` character device, bound to a single peripheral address.
#[derive(Debug)]
pub struct DevFile {
    file: File,
}

impl DevFile {
    /// Open the device node at `path` and bind it to `addr`.
    pub fn open(path: impl AsRef<Path>, addr: u8) -> Result<DevFile, OpenError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(OpenError::Open)?;

        platform::set_slave_address(&file, addr).map_err(OpenError::Bind)?;

        Ok(DevFile { file })
    }
}

impl Transport for DevFile {
    fn close(self) -> io::Result<()> {
        // File's Drop impl swallows close(2) errors
        let fd = self.file.into_raw_fd();
        // SAFETY: `fd` was just released by the File, so nothing else owns it.
        match unsafe { libc::close(fd) } {
            0 => Ok(()),
            _ => Err(io::Error::last_os_error()),
        }
    }
}

impl Read for DevFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for DevFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        // noop
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_node() {
        match DevFile::open("/dev/i2c-does-not-exist", 0x20) {
            Err(OpenError::Open(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_i2c_node_fails_to_bind() {
        match DevFile::open("/dev/null", 0x20) {
            Err(OpenError::Bind(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
