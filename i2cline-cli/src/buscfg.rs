use std::str::FromStr;

/// Helper struct to parse bus target configurations.
#[derive(Debug, PartialEq)]
pub enum BusCfg {
    /// `dev:bus=<n>,addr=<addr>`
    Dev { bus: u32, addr: u8 },
    /// `path:file=/path/,addr=<addr>`
    Path { path: String, addr: u8 },
    /// `mem:addr=<addr>[,size=<n>]`
    Mem { addr: u8, size: usize },
}

/// Parse an integer written in decimal, or in hex with a `0x` prefix. A
/// single leading `-` is allowed.
pub fn parse_int(s: &str) -> Result<i64, String> {
    let (digits, neg) = match s.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (s, false),
    };
    let (digits, radix) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (digits, 10),
    };
    // at most one sign, ahead of any prefix
    if digits.starts_with(&['+', '-'][..]) {
        return Err(format!("could not parse `{}`: misplaced sign", s));
    }
    let val = i64::from_str_radix(digits, radix)
        .map_err(|e| format!("could not parse `{}`: {}", s, e))?;

    Ok(if neg { -val } else { val })
}

fn parse_addr(s: &str) -> Result<u8, &'static str> {
    match parse_int(s) {
        Ok(v) if (0..=0x7f).contains(&v) => Ok(v as u8),
        _ => Err("`addr` must be a 7-bit address"),
    }
}

impl FromStr for BusCfg {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<BusCfg, &'static str> {
        let mut s = s.splitn(2, ':');
        let kind = s.next().unwrap_or_default();
        let opts = s.next().ok_or("missing required options")?.split(',');

        let mut bus = None;
        let mut addr = None;
        let mut file = None;
        let mut size = None;

        for arg in opts {
            let mut s = arg.splitn(2, '=');
            let key = s.next().unwrap_or_default();
            let val = s.next();
            match key {
                "bus" => {
                    let val = val.ok_or("missing argument for `bus`")?;
                    bus = Some(
                        parse_int(val)
                            .ok()
                            .filter(|v| (0..=i64::from(u32::MAX)).contains(v))
                            .ok_or("could not parse `bus`")? as u32,
                    );
                }
                "addr" => addr = Some(parse_addr(val.ok_or("missing argument for `addr`")?)?),
                "file" => file = Some(val.ok_or("missing argument for `file`")?.to_string()),
                "size" => {
                    let val = val.ok_or("missing argument for `size`")?;
                    size = Some(
                        parse_int(val)
                            .ok()
                            .filter(|v| (1..=256).contains(v))
                            .ok_or("`size` must be between 1 and 256")? as usize,
                    );
                }
                _ => return Err("unknown option"),
            }
        }

        let addr = addr.ok_or("missing `addr` parameter")?;
        Ok(match kind {
            "dev" => {
                if file.is_some() || size.is_some() {
                    return Err("unknown `dev` option");
                }
                BusCfg::Dev {
                    bus: bus.ok_or("missing `bus` parameter")?,
                    addr,
                }
            }
            "path" => {
                if bus.is_some() || size.is_some() {
                    return Err("unknown `path` option");
                }
                BusCfg::Path {
                    path: file.ok_or("missing `file` parameter")?,
                    addr,
                }
            }
            "mem" => {
                if bus.is_some() || file.is_some() {
                    return Err("unknown `mem` option");
                }
                BusCfg::Mem {
                    addr,
                    size: size.unwrap_or(256),
                }
            }
            _ => return Err("invalid bus kind"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ints() {
        assert_eq!(parse_int("42"), Ok(42));
        assert_eq!(parse_int("0x2a"), Ok(42));
        assert_eq!(parse_int("0X2A"), Ok(42));
        assert_eq!(parse_int("-0x100"), Ok(-256));
        assert!(parse_int("0xzz").is_err());
        assert!(parse_int("").is_err());
    }

    #[test]
    fn one_sign_before_the_prefix() {
        assert_eq!(parse_int("-5"), Ok(-5));
        assert!(parse_int("--5").is_err());
        assert!(parse_int("-+5").is_err());
        assert!(parse_int("+5").is_err());
        assert!(parse_int("0x-5").is_err());
        assert!(parse_int("0x+5").is_err());
        assert!(parse_int("-").is_err());
        assert!("dev:bus=--1,addr=0x20".parse::<BusCfg>().is_err());
    }

    #[test]
    fn targets() {
        assert_eq!(
            "dev:bus=1,addr=0x76".parse::<BusCfg>(),
            Ok(BusCfg::Dev { bus: 1, addr: 0x76 })
        );
        assert_eq!(
            "path:file=/dev/i2c-3,addr=64".parse::<BusCfg>(),
            Ok(BusCfg::Path {
                path: "/dev/i2c-3".into(),
                addr: 0x40
            })
        );
        assert_eq!(
            "mem:addr=0x20".parse::<BusCfg>(),
            Ok(BusCfg::Mem {
                addr: 0x20,
                size: 256
            })
        );
        assert_eq!(
            "mem:addr=0x20,size=16".parse::<BusCfg>(),
            Ok(BusCfg::Mem {
                addr: 0x20,
                size: 16
            })
        );
    }

    #[test]
    fn bad_targets() {
        assert!("dev".parse::<BusCfg>().is_err());
        assert!("dev:bus=1".parse::<BusCfg>().is_err());
        assert!("dev:addr=0x20".parse::<BusCfg>().is_err());
        assert!("dev:bus=1,addr=0x80".parse::<BusCfg>().is_err());
        assert!("dev:bus=1,addr=0x20,size=4".parse::<BusCfg>().is_err());
        assert!("mem:addr=0x20,size=0".parse::<BusCfg>().is_err());
        assert!("mem:addr=0x20,size=257".parse::<BusCfg>().is_err());
        assert!("spi:addr=0x20".parse::<BusCfg>().is_err());
    }
}
