//! Image configuration, fixed for the lifetime of a run.

pub use tandem_io::MAX_HARTS;

const DEFAULT_HARTS: u32 = 1;
const DEFAULT_VLEN_HINT: u32 = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Harts taking part in the run, including the primary.
    pub harts: u32,
    /// Whether the vector phase runs (single-hart builds only).
    pub vector: bool,
    /// Expected VLEN in bits. Informational; VL always comes from hardware.
    pub vlen_hint: u32,
}

impl Config {
    pub const fn new(harts: u32, vector: bool, vlen_hint: u32) -> Self {
        Self { harts, vector, vlen_hint }
    }

    /// Reads `TANDEM_HARTS`, `TANDEM_VECTOR` and `TANDEM_VLEN` at compile time.
    ///
    /// Values are not validated: a hart count the machine cannot satisfy
    /// hangs at the first barrier.
    pub const fn from_build_env() -> Self {
        Self {
            harts: parse_u32(option_env!("TANDEM_HARTS"), DEFAULT_HARTS),
            vector: parse_flag(option_env!("TANDEM_VECTOR"), true),
            vlen_hint: parse_u32(option_env!("TANDEM_VLEN"), DEFAULT_VLEN_HINT),
        }
    }

    pub const fn is_smp(&self) -> bool {
        self.harts > 1
    }

    /// Secondary harts the primary waits for during boot.
    pub const fn secondaries(&self) -> u32 {
        self.harts.saturating_sub(1)
    }

    /// Phase number printed in the banner and summary.
    pub const fn phase(&self) -> u32 {
        if self.is_smp() {
            4
        } else {
            2
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_HARTS, true, DEFAULT_VLEN_HINT)
    }
}

const fn parse_u32(value: Option<&str>, default: u32) -> u32 {
    let bytes = match value {
        Some(v) => v.as_bytes(),
        None => return default,
    };
    if bytes.is_empty() {
        return default;
    }
    let mut acc: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b < b'0' || b > b'9' {
            return default;
        }
        acc = acc * 10 + (b - b'0') as u32;
        i += 1;
    }
    acc
}

const fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) => {
            let b = v.as_bytes();
            !(b.len() == 1 && b[0] == b'0')
        }
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_values() {
        assert_eq!(parse_u32(Some("4"), 1), 4);
        assert_eq!(parse_u32(Some("512"), 1), 512);
        assert_eq!(parse_u32(Some("x2"), 7), 7);
        assert_eq!(parse_u32(Some(""), 7), 7);
        assert_eq!(parse_u32(None, 7), 7);
        assert!(!parse_flag(Some("0"), true));
        assert!(parse_flag(Some("1"), false));
        assert!(parse_flag(None, true));
    }

    #[test]
    fn test_phase_follows_hart_count() {
        assert_eq!(Config::new(1, true, 256).phase(), 2);
        let smp = Config::new(4, false, 256);
        assert_eq!(smp.phase(), 4);
        assert_eq!(smp.secondaries(), 3);
    }
}
