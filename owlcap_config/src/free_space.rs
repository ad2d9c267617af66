use crate::ConfigError;
use std::str::FromStr;

/// How much space the expiry engine keeps free on each capture device.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FreeSpaceTarget {
    /// Absolute gigabytes.
    Gigabytes(u64),
    /// Percentage of the device's total capacity.
    Percent(u64),
}

impl FreeSpaceTarget {
    /// Bytes that must stay free on a device of `total_bytes` capacity.
    pub fn target_bytes(&self, total_bytes: u64) -> u64 {
        match self {
            FreeSpaceTarget::Gigabytes(g) => g * 1_000_000_000,
            FreeSpaceTarget::Percent(p) => total_bytes / 100 * p,
        }
    }
}

impl FromStr for FreeSpaceTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(pct) = s.strip_suffix('%') {
            let p: u64 = pct
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("Bad free_space_g value: {s}")))?;
            if p == 0 || p >= 100 {
                return Err(ConfigError::Invalid(format!(
                    "free_space_g percentage must be between 1 and 99, got {p}"
                )));
            }
            Ok(FreeSpaceTarget::Percent(p))
        } else {
            let g: u64 = s
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("Bad free_space_g value: {s}")))?;
            Ok(FreeSpaceTarget::Gigabytes(g))
        }
    }
}

#[cfg(test)]
mod test {
    use super::FreeSpaceTarget;

    #[test]
    fn parses_both_forms() {
        let abs: FreeSpaceTarget = "200".parse().unwrap();
        assert_eq!(abs, FreeSpaceTarget::Gigabytes(200));
        let pct: FreeSpaceTarget = "5%".parse().unwrap();
        assert_eq!(pct, FreeSpaceTarget::Percent(5));
    }

    #[test]
    fn rejects_nonsense() {
        assert!("fivegigs".parse::<FreeSpaceTarget>().is_err());
        assert!("120%".parse::<FreeSpaceTarget>().is_err());
    }

    #[test]
    fn target_math() {
        let pct = FreeSpaceTarget::Percent(10);
        assert_eq!(pct.target_bytes(1_000_000_000_000), 100_000_000_000);
        let abs = FreeSpaceTarget::Gigabytes(2);
        assert_eq!(abs.target_bytes(1_000_000_000_000), 2_000_000_000);
    }
}
