//! Low-level access to I2C peripherals through the Linux `i2c-dev` interface.
//!
//! The `i2c-dev` kernel module must be loaded (`sudo modprobe i2c-dev`) for
//! the `/dev/i2c-<bus>` device nodes to exist. Each bus can address up to 127
//! peripherals, and most boards expose several buses.
//!
//! ```no_run
//! use i2cline_core::BusHandle;
//!
//! # fn main() -> i2cline_core::BusResult<()> {
//! let mut dev = BusHandle::open(1, 0x76)?;
//! let id = dev.read_reg_u8(0xd0)?;
//! dev.write_reg_u16_be(0xf4, 0x2755)?;
//! dev.close()?;
//! # let _ = id;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate static_assertions;

#[macro_use]
extern crate log;

pub mod bus;
pub mod debug;
pub mod error;
pub mod platform;
pub mod transport;

mod smbus;

pub use bus::{BusHandle, MAX_REG_PAYLOAD, MAX_WRITE_LEN};
pub use debug::{log_debugf, noop_debugf, Debugf};
pub use error::{BusError, BusResult};
pub use transport::Transport;
