use std::io::{self, Read, Write};

use crate::transport::Transport;

/// Memory-backed peripheral, emulating the register file of a typical SMBus
/// device.
///
/// The first byte of every write selects the register pointer, and any
/// following bytes are stored starting at that register. Reads return data
/// from the register pointer onwards. The pointer auto-increments after each
/// byte, wrapping at the end of the register file.
///
/// Every write transfer is recorded, so tests can check exactly what went out
/// on the bus. The record is unbounded: long-lived users should drain it with
/// [`Mem::take_writes`] periodically.
pub struct Mem {
    regs: Box<[u8]>,
    ptr: usize,
    writes: Vec<Vec<u8>>,
}

impl std::fmt::Debug for Mem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mem")
            .field("len", &self.regs.len())
            .field("ptr", &self.ptr)
            .field("regs", &"[...]")
            .field("writes", &self.writes.len())
            .finish()
    }
}

impl Mem {
    /// Create a zero-filled register file with `len` registers.
    ///
    /// Panics if `len` is zero or larger than the 8-bit register space.
    pub fn new(len: usize) -> Mem {
        Mem::with_contents(vec![0; len].into_boxed_slice())
    }

    /// Create a register file from some existing data.
    ///
    /// Panics if `regs` is empty or larger than the 8-bit register space.
    pub fn with_contents(regs: Box<[u8]>) -> Mem {
        assert!(
            !regs.is_empty() && regs.len() <= 256,
            "register file must hold between 1 and 256 registers"
        );
        Mem {
            regs,
            ptr: 0,
            writes: Vec::new(),
        }
    }

    /// Current register contents.
    pub fn regs(&self) -> &[u8] {
        &self.regs
    }

    /// Every write transfer seen so far, oldest first.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// Drain the recorded write transfers.
    pub fn take_writes(&mut self) -> Vec<Vec<u8>> {
        std::mem::replace(&mut self.writes, Vec::new())
    }

    fn advance(&mut self) -> usize {
        let ptr = self.ptr;
        self.ptr = (self.ptr + 1) % self.regs.len();
        ptr
    }
}

impl Transport for Mem {
    fn close(self) -> io::Result<()> {
        // noop
        Ok(())
    }
}

impl Read for Mem {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        for b in buf.iter_mut() {
            let ptr = self.advance();
            *b = self.regs[ptr];
        }
        Ok(buf.len())
    }
}

impl Write for Mem {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let (reg, data) = match buf.split_first() {
            Some(split) => split,
            None => return Ok(0),
        };

        self.writes.push(buf.to_vec());
        self.ptr = *reg as usize % self.regs.len();
        for b in data {
            let ptr = self.advance();
            self.regs[ptr] = *b;
        }

        Ok(buf.len())
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
    fn pointer_then_data() {
        let mut mem = Mem::new(16);
        mem.write_all(&[0x04, 0xaa, 0xbb]).unwrap();
        assert_eq!(&mem.regs()[4..6], &[0xaa, 0xbb]);

        mem.write_all(&[0x04]).unwrap();
        let mut buf = [0; 3];
        mem.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0xaa, 0xbb, 0x00]);

        assert_eq!(mem.writes(), &[vec![0x04, 0xaa, 0xbb], vec![0x04]][..]);
    }

    #[test]
    fn pointer_wraps() {
        let mut mem = Mem::new(4);
        mem.write_all(&[0x03, 1, 2]).unwrap();
        assert_eq!(mem.regs(), &[2, 0, 0, 1]);

        // register bytes beyond the file wrap too
        mem.write_all(&[0x07]).unwrap();
        let mut buf = [0; 2];
        mem.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2]);
    }

    #[test]
    fn empty_write_is_not_a_transfer() {
        let mut mem = Mem::new(1);
        assert_eq!(mem.write(&[]).unwrap(), 0);
        assert!(mem.take_writes().is_empty());
    }

    #[test]
    fn take_writes_drains_the_record() {
        let mut mem = Mem::new(8);
        for reg in 0..4 {
            mem.write_all(&[reg, 0xff]).unwrap();
        }
        assert_eq!(mem.take_writes().len(), 4);
        assert!(mem.writes().is_empty());

        // register contents survive the drain
        assert_eq!(&mem.regs()[..5], &[0xff, 0xff, 0xff, 0xff, 0x00]);
    }

    #[test]
    #[should_panic]
    fn zero_sized_register_file() {
        let _ = Mem::new(0);
    }
}
