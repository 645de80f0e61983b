//! SMBus-style register access on top of plain I2C transfers.
//!
//! Reads select the register with a one byte write and then read the data in
//! a second transfer. Writes send the register byte and the data together in
//! a single transfer. Nothing keeps another bus master from slipping in
//! between the two halves of a read.

use byteorder::{BigEndian, ByteOrder};

use crate::bus::{BusHandle, MAX_REG_PAYLOAD, MAX_WRITE_LEN};
use crate::error::{BusError, BusResult};
use crate::transport::Transport;

impl<T: Transport> BusHandle<T> {
    /// Read `n` bytes starting at register `reg`.
    ///
    /// Returns the freshly allocated buffer alongside the number of bytes the
    /// peripheral actually returned.
    pub fn read_reg_bytes(&mut self, reg: u8, n: usize) -> BusResult<(Vec<u8>, usize)> {
        (self.debugf)(format_args!(
            "Read {} bytes starting from reg {:#04x}...",
            n, reg
        ));

        self.write_byte(reg)?;
        let mut buf = vec![0; n];
        let count = self.read(&mut buf)?;
        Ok((buf, count))
    }

    /// Write `data` to consecutive registers starting at `reg`, in a single
    /// transfer.
    ///
    /// `data` must hold between 1 and [`MAX_REG_PAYLOAD`] bytes.
    pub fn write_reg_bytes(&mut self, reg: u8, data: &[u8]) -> BusResult<()> {
        if data.is_empty() {
            return Err(BusError::EmptyPayload);
        }
        if data.len() > MAX_REG_PAYLOAD {
            return Err(BusError::PayloadTooLarge {
                len: data.len(),
                max: MAX_REG_PAYLOAD,
            });
        }

        let mut frame = [0; MAX_WRITE_LEN];
        frame[0] = reg;
        frame[1..=data.len()].copy_from_slice(data);
        self.write(&frame[..=data.len()])?;

        (self.debugf)(format_args!(
            "Write {} bytes starting from reg {:#04x}",
            data.len(),
            reg
        ));
        Ok(())
    }

    /// Read a byte from register `reg`.
    pub fn read_reg_u8(&mut self, reg: u8) -> BusResult<u8> {
        let buf = self.read_reg::<1>(reg)?;

        (self.debugf)(format_args!("Read U8 {} from reg {:#04x}", buf[0], reg));
        Ok(buf[0])
    }

    /// Write a byte to register `reg`.
    pub fn write_reg_u8(&mut self, reg: u8, value: u8) -> BusResult<()> {
        self.write(&[reg, value])?;

        (self.debugf)(format_args!("Write U8 {} to reg {:#04x}", value, reg));
        Ok(())
    }

    /// Read an unsigned big-endian word from register `reg`.
    pub fn read_reg_u16_be(&mut self, reg: u8) -> BusResult<u16> {
        let buf = self.read_reg::<2>(reg)?;
        let w = BigEndian::read_u16(&buf);

        (self.debugf)(format_args!("Read U16 {} from reg {:#04x}", w, reg));
        Ok(w)
    }

    /// Read an unsigned little-endian word from register `reg`.
    pub fn read_reg_u16_le(&mut self, reg: u8) -> BusResult<u16> {
        Ok(self.read_reg_u16_be(reg)?.swap_bytes())
    }

    /// Read a signed big-endian word from register `reg`.
    pub fn read_reg_s16_be(&mut self, reg: u8) -> BusResult<i16> {
        let buf = self.read_reg::<2>(reg)?;
        let w = BigEndian::read_i16(&buf);

        (self.debugf)(format_args!("Read S16 {} from reg {:#04x}", w, reg));
        Ok(w)
    }

    /// Read a signed little-endian word from register `reg`.
    pub fn read_reg_s16_le(&mut self, reg: u8) -> BusResult<i16> {
        Ok(self.read_reg_s16_be(reg)?.swap_bytes())
    }

    /// Write an unsigned big-endian word to register `reg`.
    pub fn write_reg_u16_be(&mut self, reg: u8, value: u16) -> BusResult<()> {
        let mut frame = [reg, 0, 0];
        BigEndian::write_u16(&mut frame[1..], value);
        self.write(&frame)?;

        (self.debugf)(format_args!("Write U16 {} to reg {:#04x}", value, reg));
        Ok(())
    }

    /// Write an unsigned little-endian word to register `reg`.
    pub fn write_reg_u16_le(&mut self, reg: u8, value: u16) -> BusResult<()> {
        self.write_reg_u16_be(reg, value.swap_bytes())
    }

    /// Write a signed big-endian word to register `reg`.
    pub fn write_reg_s16_be(&mut self, reg: u8, value: i16) -> BusResult<()> {
        let mut frame = [reg, 0, 0];
        BigEndian::write_i16(&mut frame[1..], value);
        self.write(&frame)?;

        (self.debugf)(format_args!("Write S16 {} to reg {:#04x}", value, reg));
        Ok(())
    }

    /// Write a signed little-endian word to register `reg`.
    pub fn write_reg_s16_le(&mut self, reg: u8, value: i16) -> BusResult<()> {
        self.write_reg_s16_be(reg, value.swap_bytes())
    }

    /// Select `reg`, then read exactly `N` bytes from it.
    fn read_reg<const N: usize>(&mut self, reg: u8) -> BusResult<[u8; N]> {
        self.write_byte(reg)?;
        let mut buf = [0; N];
        let got = self.read(&mut buf)?;
        if got < N {
            return Err(BusError::ShortRead { expected: N, got });
        }
        Ok(buf)
    }
}
