//! Numeric arithmetic: promotion, exact decimal operations and IEEE
//! float/double operations

use super::{ArithmeticOperator, Operand};
use crate::error::{EvalError, EvalResult};
use rust_decimal::Decimal;
use xqvalue_types::{DECIMAL_PRECISION, XsDecimal};

/// Both operands converted to the wider of their two types
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Promoted {
    Integer(i64, i64),
    Decimal(XsDecimal, XsDecimal),
    Float(f32, f32),
    Double(f64, f64),
}

/// Rank in the promotion order integer < decimal < float < double
fn rank(operand: &Operand) -> Option<u8> {
    match operand {
        Operand::Integer(_) => Some(0),
        Operand::Decimal(_) => Some(1),
        Operand::Float(_) => Some(2),
        Operand::Double(_) => Some(3),
        _ => None,
    }
}

fn to_decimal(operand: &Operand, op: ArithmeticOperator) -> EvalResult<XsDecimal> {
    match *operand {
        Operand::Integer(v) => XsDecimal::from_i64(v).ok_or_else(|| EvalError::precision_exceeded(op.name())),
        Operand::Decimal(d) => Ok(d),
        _ => Err(EvalError::internal(format!("{} is not exact", operand.tag()))),
    }
}

fn to_f32(operand: &Operand) -> f32 {
    match *operand {
        Operand::Integer(v) => v as f32,
        Operand::Decimal(d) => d.to_f32(),
        Operand::Float(v) => v,
        Operand::Double(v) => v as f32,
        _ => f32::NAN,
    }
}

fn to_f64(operand: &Operand) -> f64 {
    match *operand {
        Operand::Integer(v) => v as f64,
        Operand::Decimal(d) => d.to_f64(),
        Operand::Float(v) => v as f64,
        Operand::Double(v) => v,
        _ => f64::NAN,
    }
}

/// Promote a pair of numeric operands, or `None` if either is not numeric
pub(super) fn promote(left: &Operand, right: &Operand, op: ArithmeticOperator) -> EvalResult<Option<Promoted>> {
    let (Some(l), Some(r)) = (rank(left), rank(right)) else {
        return Ok(None);
    };
    let promoted = match l.max(r) {
        0 => match (left, right) {
            (Operand::Integer(a), Operand::Integer(b)) => Promoted::Integer(*a, *b),
            _ => return Err(EvalError::internal("integer promotion of non-integers")),
        },
        1 => Promoted::Decimal(to_decimal(left, op)?, to_decimal(right, op)?),
        2 => Promoted::Float(to_f32(left), to_f32(right)),
        _ => Promoted::Double(to_f64(left), to_f64(right)),
    };
    Ok(Some(promoted))
}

/// Apply `op` to a promoted pair
pub(super) fn apply(op: ArithmeticOperator, operands: Promoted) -> EvalResult<Operand> {
    match operands {
        Promoted::Integer(a, b) => integer(op, a, b),
        Promoted::Decimal(a, b) => decimal(op, a, b).map(Operand::Decimal),
        Promoted::Float(a, b) => Ok(Operand::Float(match op {
            ArithmeticOperator::Add => a + b,
            ArithmeticOperator::Subtract => a - b,
            ArithmeticOperator::Multiply => a * b,
            ArithmeticOperator::Divide => a / b,
        })),
        Promoted::Double(a, b) => Ok(Operand::Double(match op {
            ArithmeticOperator::Add => a + b,
            ArithmeticOperator::Subtract => a - b,
            ArithmeticOperator::Multiply => a * b,
            ArithmeticOperator::Divide => a / b,
        })),
    }
}

// ============================================================================
// Integer
// ============================================================================

fn integer(op: ArithmeticOperator, a: i64, b: i64) -> EvalResult<Operand> {
    let result = match op {
        ArithmeticOperator::Add => a.checked_add(b),
        ArithmeticOperator::Subtract => a.checked_sub(b),
        ArithmeticOperator::Multiply => a.checked_mul(b),
        // Integer division yields a decimal
        ArithmeticOperator::Divide => {
            let a = XsDecimal::from_i64(a).ok_or_else(|| EvalError::precision_exceeded(op.name()))?;
            let b = XsDecimal::from_i64(b).ok_or_else(|| EvalError::precision_exceeded(op.name()))?;
            return decimal_divide(a, b).map(Operand::Decimal);
        }
    };
    result.map(Operand::Integer).ok_or_else(|| EvalError::overflow(op.name()))
}

// ============================================================================
// Decimal
// ============================================================================

/// Build a decimal from a wide mantissa, stripping trailing zeros and
/// rejecting values beyond the precision bound
pub(crate) fn decimal_from_wide(mantissa: i128, scale: i32) -> Option<XsDecimal> {
    if mantissa == 0 {
        return Some(XsDecimal::ZERO);
    }
    let (mut mantissa, mut scale) = (mantissa, scale);
    while mantissa % 10 == 0 {
        mantissa /= 10;
        scale -= 1;
    }
    let mantissa = i64::try_from(mantissa).ok()?;
    let scale = i8::try_from(scale).ok()?;
    XsDecimal::new(mantissa, scale)
}

/// Mantissa of `value` rescaled to `scale` (which must not be below the
/// value's own scale)
fn rescale(value: XsDecimal, scale: i32) -> Option<i128> {
    let shift = u32::try_from(scale - value.scale() as i32).ok()?;
    10i128
        .checked_pow(shift)
        .and_then(|factor| (value.mantissa() as i128).checked_mul(factor))
}

fn decimal(op: ArithmeticOperator, a: XsDecimal, b: XsDecimal) -> EvalResult<XsDecimal> {
    let exceeded = || EvalError::precision_exceeded(op.name());
    match op {
        ArithmeticOperator::Add | ArithmeticOperator::Subtract => {
            let scale = (a.scale() as i32).max(b.scale() as i32);
            let left = rescale(a, scale).ok_or_else(exceeded)?;
            let right = rescale(b, scale).ok_or_else(exceeded)?;
            let sum = if op == ArithmeticOperator::Add {
                left.checked_add(right)
            } else {
                left.checked_sub(right)
            };
            sum.and_then(|m| decimal_from_wide(m, scale)).ok_or_else(exceeded)
        }
        ArithmeticOperator::Multiply => {
            let product = (a.mantissa() as i128).checked_mul(b.mantissa() as i128);
            let scale = a.scale() as i32 + b.scale() as i32;
            product
                .and_then(|m| decimal_from_wide(m, scale))
                .ok_or_else(exceeded)
        }
        ArithmeticOperator::Divide => decimal_divide(a, b),
    }
}

/// Quotient rounded half to even to the precision bound
pub(crate) fn decimal_divide(a: XsDecimal, b: XsDecimal) -> EvalResult<XsDecimal> {
    if b.is_zero() {
        return Err(EvalError::DivisionByZero);
    }
    let exceeded = || EvalError::precision_exceeded("divide");
    let dividend = a.to_rust_decimal().ok_or_else(exceeded)?;
    let divisor = b.to_rust_decimal().ok_or_else(exceeded)?;
    let quotient: Decimal = dividend.checked_div(divisor).ok_or_else(exceeded)?;
    let rounded = round_significant(quotient);
    XsDecimal::from_rust_decimal(rounded).ok_or_else(exceeded)
}

/// Round to at most the precision bound of significant digits
fn round_significant(value: Decimal) -> Decimal {
    let value = value.normalize();
    let digits = xqvalue_types::decimal::digit_count(value.mantissa());
    if digits <= DECIMAL_PRECISION {
        return value;
    }
    let excess = digits - DECIMAL_PRECISION;
    let scale = value.scale().saturating_sub(excess);
    value.round_dp_with_strategy(scale, rust_decimal::RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(mantissa: i64, scale: i8) -> XsDecimal {
        XsDecimal::new(mantissa, scale).unwrap()
    }

    #[test]
    fn test_decimal_add_aligns_scales() {
        let sum = decimal(ArithmeticOperator::Add, dec(15, 1), dec(25, 2)).unwrap();
        assert_eq!(sum, dec(175, 2));
    }

    #[test]
    fn test_decimal_add_precision_exceeded() {
        let big = dec(999_999_999_999_999_999, 0);
        let err = decimal(ArithmeticOperator::Add, big, dec(1, 0)).unwrap_err();
        assert!(matches!(err, EvalError::PrecisionExceeded { .. }));

        let wide = decimal(ArithmeticOperator::Add, dec(1, -17), dec(1, 18)).unwrap_err();
        assert!(matches!(wide, EvalError::PrecisionExceeded { .. }));
    }

    #[test]
    fn test_decimal_multiply_strips_zeros() {
        let product = decimal(ArithmeticOperator::Multiply, dec(25, 1), dec(4, 0)).unwrap();
        assert_eq!(product, dec(1, -1));
    }

    #[test]
    fn test_decimal_divide_rounds() {
        let third = decimal_divide(dec(1, 0), dec(3, 0)).unwrap();
        assert_eq!(third.to_string(), "0.333333333333333333");
        let two_thirds = decimal_divide(dec(2, 0), dec(3, 0)).unwrap();
        assert_eq!(two_thirds.to_string(), "0.666666666666666667");
        assert_eq!(decimal_divide(dec(1, 0), XsDecimal::ZERO), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_integer_divide_is_decimal() {
        assert_eq!(
            integer(ArithmeticOperator::Divide, 7, 2).unwrap(),
            Operand::Decimal(dec(35, 1))
        );
        assert!(matches!(
            integer(ArithmeticOperator::Add, i64::MAX, 1),
            Err(EvalError::Overflow { .. })
        ));
    }
}
