//! Fixed-point xs:decimal representation

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of decimal digits a value may carry
pub const DECIMAL_PRECISION: u32 = 18;

/// An exact fixed-point decimal: `mantissa * 10^-scale`
///
/// Scale may be negative, in which case the value has trailing integer zeros
/// that are not stored in the mantissa (`100` is mantissa 1, scale -2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct XsDecimal {
    mantissa: i64,
    scale: i8,
}

/// Powers of ten that fit in an i64
pub(crate) const POW10: [i64; 19] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
];

/// `10^exp` as an i64, if it fits
pub fn pow10(exp: u32) -> Option<i64> {
    POW10.get(exp as usize).copied()
}

/// Number of decimal digits in `|value|` (zero has one digit)
pub fn digit_count(value: i128) -> u32 {
    let mut v = value.unsigned_abs();
    let mut count = 1;
    while v >= 10 {
        v /= 10;
        count += 1;
    }
    count
}

impl XsDecimal {
    pub const ZERO: XsDecimal = XsDecimal {
        mantissa: 0,
        scale: 0,
    };

    /// Build a decimal from raw parts without normalizing
    pub const fn from_parts(mantissa: i64, scale: i8) -> Self {
        Self { mantissa, scale }
    }

    /// Build a normalized decimal, or `None` if it exceeds the precision bound
    pub fn new(mantissa: i64, scale: i8) -> Option<Self> {
        Some(Self::from_parts(mantissa, scale).normalized()).filter(|d| d.is_within_precision())
    }

    /// Build a decimal from an integer
    pub fn from_i64(value: i64) -> Option<Self> {
        Self::new(value, 0)
    }

    pub const fn mantissa(&self) -> i64 {
        self.mantissa
    }

    pub const fn scale(&self) -> i8 {
        self.scale
    }

    /// Strip trailing zeros from the mantissa
    pub fn normalized(self) -> Self {
        if self.mantissa == 0 {
            return Self::ZERO;
        }
        let mut mantissa = self.mantissa;
        let mut scale = self.scale;
        while mantissa % 10 == 0 && scale > i8::MIN {
            mantissa /= 10;
            scale -= 1;
        }
        Self { mantissa, scale }
    }

    /// Digits stored in the mantissa
    pub fn digit_count(&self) -> u32 {
        digit_count(self.mantissa as i128)
    }

    /// Digits needed to write the value out, counting implied integer zeros
    pub fn total_digits(&self) -> u32 {
        let implied = if self.scale < 0 {
            self.scale.unsigned_abs() as u32
        } else {
            0
        };
        self.digit_count() + implied
    }

    /// Check the value against the fixed precision bound
    pub fn is_within_precision(&self) -> bool {
        self.total_digits() <= DECIMAL_PRECISION && self.scale as i32 <= DECIMAL_PRECISION as i32
    }

    pub const fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub const fn is_negative(&self) -> bool {
        self.mantissa < 0
    }

    /// Integer part, truncated toward zero
    pub fn trunc_to_i64(&self) -> Option<i64> {
        if self.scale >= 0 {
            let divisor = pow10(self.scale as u32);
            Some(divisor.map_or(0, |d| self.mantissa / d))
        } else {
            pow10(self.scale.unsigned_abs() as u32).and_then(|m| self.mantissa.checked_mul(m))
        }
    }

    /// Nearest double to this value
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// Nearest float to this value
    pub fn to_f32(&self) -> f32 {
        self.to_string().parse().unwrap_or(f32::NAN)
    }

    /// Convert to a `rust_decimal::Decimal`
    pub fn to_rust_decimal(&self) -> Option<Decimal> {
        if self.scale >= 0 {
            Decimal::try_from_i128_with_scale(self.mantissa as i128, self.scale as u32).ok()
        } else {
            let factor = pow10(self.scale.unsigned_abs() as u32)?;
            let widened = (self.mantissa as i128).checked_mul(factor as i128)?;
            Decimal::try_from_i128_with_scale(widened, 0).ok()
        }
    }

    /// Convert from a `rust_decimal::Decimal`, rounding half to even to the
    /// precision bound
    ///
    /// Returns `None` when the integer part alone needs more digits than the
    /// bound allows.
    pub fn from_rust_decimal(value: Decimal) -> Option<Self> {
        let mut value = value.normalize();
        if value.scale() > DECIMAL_PRECISION {
            value = value
                .round_dp_with_strategy(DECIMAL_PRECISION, RoundingStrategy::MidpointNearestEven)
                .normalize();
        }
        let digits = digit_count(value.mantissa());
        if digits > DECIMAL_PRECISION {
            let excess = digits - DECIMAL_PRECISION;
            if excess > value.scale() {
                return None;
            }
            value = value
                .round_dp_with_strategy(value.scale() - excess, RoundingStrategy::MidpointNearestEven)
                .normalize();
        }
        let mantissa = i64::try_from(value.mantissa()).ok()?;
        let scale = i8::try_from(value.scale()).ok()?;
        Self::new(mantissa, scale)
    }
}

impl fmt::Display for XsDecimal {
    /// Canonical lexical form: no exponent, no trailing fractional zeros and
    /// no decimal point for integral values
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.normalized();
        if value.mantissa < 0 {
            f.write_str("-")?;
        }
        let digits = value.mantissa.unsigned_abs().to_string();
        if value.scale <= 0 {
            f.write_str(&digits)?;
            for _ in 0..value.scale.unsigned_abs() {
                f.write_str("0")?;
            }
            return Ok(());
        }
        let scale = value.scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{int_part}.{frac_part}")
        } else {
            f.write_str("0.")?;
            for _ in 0..scale - digits.len() {
                f.write_str("0")?;
            }
            f.write_str(&digits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_normalize_strips_trailing_zeros() {
        let d = XsDecimal::from_parts(12_500, 3).normalized();
        assert_eq!(d.mantissa(), 125);
        assert_eq!(d.scale(), 2);
        let hundred = XsDecimal::from_i64(100).unwrap();
        assert_eq!((hundred.mantissa(), hundred.scale()), (1, -2));
    }

    #[test]
    fn test_display() {
        assert_eq!(XsDecimal::from_parts(125, 2).to_string(), "1.25");
        assert_eq!(XsDecimal::from_parts(-5, 3).to_string(), "-0.005");
        assert_eq!(XsDecimal::from_parts(1, -2).to_string(), "100");
        assert_eq!(XsDecimal::from_parts(10, 1).to_string(), "1");
        assert_eq!(XsDecimal::ZERO.to_string(), "0");
    }

    #[test]
    fn test_precision_bound() {
        assert!(XsDecimal::new(999_999_999_999_999_999, 0).is_some());
        assert!(XsDecimal::new(1_000_000_000_000_000_001, 0).is_none());
        assert!(XsDecimal::new(1, -17).is_some());
        assert!(XsDecimal::new(1, -18).is_none());
        assert!(XsDecimal::new(1, 19).is_none());
    }

    #[test]
    fn test_truncation() {
        assert_eq!(XsDecimal::from_parts(-35, 1).trunc_to_i64(), Some(-3));
        assert_eq!(XsDecimal::from_parts(7, -3).trunc_to_i64(), Some(7000));
    }

    #[test]
    fn test_rust_decimal_conversion() {
        let d = XsDecimal::from_parts(1, -3);
        assert_eq!(d.to_rust_decimal(), Some(Decimal::from(1000)));
        let third = Decimal::from(1) / Decimal::from(3);
        let rounded = XsDecimal::from_rust_decimal(third).unwrap();
        assert_eq!(rounded.to_string(), "0.333333333333333333");
        let big = Decimal::from_str("12345678901234567890").unwrap();
        assert_eq!(XsDecimal::from_rust_decimal(big), None);
    }
}
