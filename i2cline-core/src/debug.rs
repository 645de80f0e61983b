//! Debug hooks used to trace bus traffic.

use std::fmt;

/// Formatted debug callback invoked on every successful transfer.
pub type Debugf = Box<dyn FnMut(fmt::Arguments<'_>) + Send>;

/// Debug hook which discards everything. Installed by default, and can be
/// handed back to [`BusHandle::set_debugf`](crate::BusHandle::set_debugf) to
/// switch tracing off again.
pub fn noop_debugf(_args: fmt::Arguments<'_>) {}

/// Debug hook which forwards to the `log` facade at trace level, under the
/// `I2C` target.
pub fn log_debugf(args: fmt::Arguments<'_>) {
    trace!(target: "I2C", "{}", args);
}
