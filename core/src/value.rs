//! Fixed-point decoding of the card's value fields.

use std::fmt;

/// The card counts values in thousandths of the displayed unit.
pub const SCALE: u64 = 1000;

/// A value read from the card, counted in thousandths.
///
/// Keeping the raw integer avoids the rounding artifacts a floating
/// division by 1000 would introduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(u64);

impl Amount {
    pub fn from_thousandths(raw: u64) -> Self {
        Self(raw)
    }

    pub fn thousandths(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let frac = self.0 % SCALE;

        match frac {
            0 => write!(f, "{whole}"),
            _ => {
                let digits = format!("{frac:03}");
                write!(f, "{whole}.{}", digits.trim_end_matches('0'))
            }
        }
    }
}

/// Accumulates octets as an unsigned big-endian integer.
pub fn value_from_bytes(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |val, b| (val << 8) | u64::from(*b))
}

/// Decodes a field window into an [`Amount`].
/// The card returns these fields in little-endian order, so the window is
/// reversed before the big-endian accumulation.
pub fn amount_from_window(window: &[u8]) -> Amount {
    let mut bytes = window.to_vec();
    bytes.reverse();

    Amount::from_thousandths(value_from_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_big_endian() {
        assert_eq!(1000, value_from_bytes(&[0x00, 0x00, 0x03, 0xE8]));
        assert_eq!(256, value_from_bytes(&[0x01, 0x00]));
        assert_eq!(0, value_from_bytes(&[]));
    }

    #[test]
    fn reverses_little_endian_windows() {
        assert_eq!(
            Amount::from_thousandths(1000),
            amount_from_window(&[0xE8, 0x03, 0x00, 0x00]),
        );
        assert_eq!(Amount::from_thousandths(256), amount_from_window(&[0x00, 0x01]));
    }

    #[test]
    fn displays_without_trailing_zeroes() {
        assert_eq!("1", Amount::from_thousandths(1000).to_string());
        assert_eq!("0.256", Amount::from_thousandths(256).to_string());
        assert_eq!("1.5", Amount::from_thousandths(1500).to_string());
        assert_eq!("12.05", Amount::from_thousandths(12050).to_string());
        assert_eq!("0", Amount::from_thousandths(0).to_string());
    }
}
