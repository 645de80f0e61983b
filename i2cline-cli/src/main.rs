#[macro_use]
extern crate log;

pub type DynResult<T> = Result<T, Box<dyn std::error::Error>>;

use structopt::clap::AppSettings;
use structopt::StructOpt;

use i2cline_core::transport::Mem;
use i2cline_core::{log_debugf, BusHandle, Transport};

mod buscfg;

use crate::buscfg::{parse_int, BusCfg};

#[derive(StructOpt)]
#[structopt(name = "i2cline")]
#[structopt(about = r#"
Poke at I2C peripherals through the Linux i2c-dev interface.
"#)]
struct Args {
    /// Peripheral to talk to.
    ///
    /// One of `dev:bus=<n>,addr=<addr>` (opens `/dev/i2c-<n>`),
    /// `path:file=/path/to/node,addr=<addr>`, or `mem:addr=<addr>[,size=<n>]`
    /// for an in-memory register file (handy for dry runs).
    #[structopt(short, long)]
    target: BusCfg,

    /// Trace every transfer through the logger.
    #[structopt(long)]
    trace: bool,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Read a register.
    Get {
        #[structopt(parse(try_from_str = parse_u8))]
        reg: u8,
        /// u8, u16be, u16le, s16be or s16le
        #[structopt(short, long, default_value = "u8")]
        width: Width,
    },
    /// Write a register.
    #[structopt(setting = AppSettings::AllowNegativeNumbers)]
    Set {
        #[structopt(parse(try_from_str = parse_u8))]
        reg: u8,
        #[structopt(parse(try_from_str = parse_int), allow_hyphen_values = true)]
        value: i64,
        /// u8, u16be, u16le, s16be or s16le
        #[structopt(short, long, default_value = "u8")]
        width: Width,
    },
    /// Read a run of registers.
    Dump {
        #[structopt(parse(try_from_str = parse_u8))]
        reg: u8,
        count: usize,
    },
    /// Send raw bytes in a single transfer.
    Write {
        #[structopt(parse(try_from_str = parse_u8), required = true)]
        bytes: Vec<u8>,
    },
    /// Read raw bytes in a single transfer.
    Read { count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Width {
    U8,
    U16Be,
    U16Le,
    S16Be,
    S16Le,
}

impl std::str::FromStr for Width {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Width, &'static str> {
        Ok(match s {
            "u8" => Width::U8,
            "u16be" => Width::U16Be,
            "u16le" => Width::U16Le,
            "s16be" => Width::S16Be,
            "s16le" => Width::S16Le,
            _ => return Err("invalid register width"),
        })
    }
}

impl Width {
    fn range(self) -> (i64, i64) {
        match self {
            Width::U8 => (0, u8::MAX as i64),
            Width::U16Be | Width::U16Le => (0, u16::MAX as i64),
            Width::S16Be | Width::S16Le => (i16::MIN as i64, i16::MAX as i64),
        }
    }

    /// Decimal value alongside its raw register bits, so signed words show
    /// up as two's complement of the register's own width.
    fn format(self, val: i64) -> String {
        match self {
            Width::U8 => format!("{} ({:#04x})", val, val as u8),
            _ => format!("{} ({:#06x})", val, val as u16),
        }
    }
}

fn parse_u8(s: &str) -> Result<u8, String> {
    match parse_int(s)? {
        v if (0..=0xff).contains(&v) => Ok(v as u8),
        v => Err(format!("{} does not fit in a byte", v)),
    }
}

fn run<T: Transport>(bus: &mut BusHandle<T>, cmd: Command) -> DynResult<()> {
    match cmd {
        Command::Get { reg, width } => {
            let val = match width {
                Width::U8 => bus.read_reg_u8(reg)? as i64,
                Width::U16Be => bus.read_reg_u16_be(reg)? as i64,
                Width::U16Le => bus.read_reg_u16_le(reg)? as i64,
                Width::S16Be => bus.read_reg_s16_be(reg)? as i64,
                Width::S16Le => bus.read_reg_s16_le(reg)? as i64,
            };
            println!("{}", width.format(val));
        }
        Command::Set { reg, value, width } => {
            let (min, max) = width.range();
            if value < min || value > max {
                return Err(format!("{} is out of range for {:?}", value, width).into());
            }
            match width {
                Width::U8 => bus.write_reg_u8(reg, value as u8)?,
                Width::U16Be => bus.write_reg_u16_be(reg, value as u16)?,
                Width::U16Le => bus.write_reg_u16_le(reg, value as u16)?,
                Width::S16Be => bus.write_reg_s16_be(reg, value as i16)?,
                Width::S16Le => bus.write_reg_s16_le(reg, value as i16)?,
            }
        }
        Command::Dump { reg, count } => {
            let (buf, n) = bus.read_reg_bytes(reg, count)?;
            println!("{}", hex::encode(&buf[..n]));
        }
        Command::Write { bytes } => {
            let n = bus.write(&bytes)?;
            info!("wrote {} bytes", n);
        }
        Command::Read { count } => {
            let mut buf = vec![0; count];
            let n = bus.read(&mut buf)?;
            println!("{}", hex::encode(&buf[..n]));
        }
    }

    Ok(())
}

/// Run `cmd` and always close the handle afterwards, reporting the first
/// error encountered.
fn run_and_close<T: Transport>(mut bus: BusHandle<T>, trace: bool, cmd: Command) -> DynResult<()> {
    if trace {
        bus.set_debugf(log_debugf);
    }

    let res = run(&mut bus, cmd);
    let closed = bus.close();
    res?;
    closed?;
    Ok(())
}

fn main() -> DynResult<()> {
    pretty_env_logger::formatted_builder()
        .filter(None, log::LevelFilter::Error)
        .filter(Some("i2cline"), log::LevelFilter::Info)
        .filter(Some("i2cline_core"), log::LevelFilter::Info)
        .filter(Some("I2C"), log::LevelFilter::Trace)
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_default())
        .init();

    let args = Args::from_args();

    match args.target {
        BusCfg::Dev { bus, addr } => {
            run_and_close(BusHandle::open(bus, addr)?, args.trace, args.cmd)
        }
        BusCfg::Path { path, addr } => {
            run_and_close(BusHandle::open_path(path, addr)?, args.trace, args.cmd)
        }
        BusCfg::Mem { addr, size } => {
            info!("using an in-memory register file, nothing touches the bus");
            let bus = BusHandle::with_transport(0, addr, Mem::new(size));
            run_and_close(bus, args.trace, args.cmd)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem() -> BusHandle<Mem> {
        BusHandle::with_transport(0, 0x20, Mem::new(256))
    }

    #[test]
    fn widths() {
        assert_eq!("u16le".parse::<Width>(), Ok(Width::U16Le));
        assert!("u32".parse::<Width>().is_err());
        assert_eq!(Width::S16Be.range(), (-32768, 32767));
    }

    #[test]
    fn values_print_at_register_width() {
        assert_eq!(Width::S16Le.format(-2), "-2 (0xfffe)");
        assert_eq!(Width::S16Be.format(i16::MIN as i64), "-32768 (0x8000)");
        assert_eq!(Width::U16Be.format(0x12), "18 (0x0012)");
        assert_eq!(Width::U8.format(0xff), "255 (0xff)");
        assert_eq!(Width::U8.format(7), "7 (0x07)");
    }

    #[test]
    fn set_then_get() {
        let mut bus = mem();
        run(
            &mut bus,
            Command::Set {
                reg: 0x10,
                value: -2,
                width: Width::S16Le,
            },
        )
        .unwrap();
        assert_eq!(&bus.transport().unwrap().regs()[0x10..0x12], &[0xfe, 0xff]);
        assert_eq!(bus.read_reg_s16_le(0x10).unwrap(), -2);
    }

    #[test]
    fn out_of_range_set_is_refused() {
        let mut bus = mem();
        let res = run(
            &mut bus,
            Command::Set {
                reg: 0x10,
                value: 0x100,
                width: Width::U8,
            },
        );
        assert!(res.is_err());
        assert!(bus.transport().unwrap().writes().is_empty());
    }

    #[test]
    fn args_parse() {
        let args = Args::from_iter_safe(&[
            "i2cline",
            "--target",
            "mem:addr=0x20",
            "set",
            "0x10",
            "-5",
            "--width",
            "s16be",
        ])
        .unwrap();
        assert_eq!(
            args.target,
            BusCfg::Mem {
                addr: 0x20,
                size: 256
            }
        );
        match args.cmd {
            Command::Set { reg, value, width } => {
                assert_eq!((reg, value, width), (0x10, -5, Width::S16Be))
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
