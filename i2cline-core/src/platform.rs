//! Platform glue for binding a bus file descriptor to a peripheral address.

use std::fs::File;
use std::io;

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        pub use self::linux::*;
    } else {
        pub use self::unsupported::*;
    }
}

/// Directory holding the `i2c-<n>` character devices.
pub const DEV_DIR: &str = "/dev";

/// i2c-dev silently truncates a single read or write to this many bytes.
pub const MAX_KERNEL_TRANSFER: usize = 8192;

/// Path of the character device for bus `bus`.
pub fn bus_path(bus: u32) -> String {
    format!("{}/i2c-{}", DEV_DIR, bus)
}

/// Extract the bus number from a path of the form `.../i2c-<n>`.
pub fn bus_from_path(path: &std::path::Path) -> Option<u32> {
    path.file_name()?
        .to_str()?
        .strip_prefix("i2c-")?
        .parse()
        .ok()
}

#[cfg(target_os = "linux")]
mod linux {
    use super::*;

    use std::os::unix::io::AsRawFd;

    /// `I2C_SLAVE` from `<linux/i2c-dev.h>`: use this slave address for all
    /// subsequent plain reads and writes on the descriptor.
    pub const I2C_SLAVE: libc::c_ulong = 0x0703;

    /// Point all further transfers on `file` at the peripheral `addr`.
    pub fn set_slave_address(file: &File, addr: u8) -> io::Result<()> {
        // SAFETY: I2C_SLAVE takes its argument by value, no memory is shared
        // with the kernel.
        let ret = unsafe {
            libc::ioctl(
                file.as_raw_fd(),
                I2C_SLAVE as _,
                libc::c_ulong::from(addr),
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
mod unsupported {
    use super::*;

    pub fn set_slave_address(_file: &File, _addr: u8) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Other,
            "i2c-dev peripheral addressing is only available on Linux",
        ))
    }
}
