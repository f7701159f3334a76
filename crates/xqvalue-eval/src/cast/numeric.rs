//! Casts into xs:boolean and the numeric types

use super::lexical;
use super::text_of;
use crate::error::{EvalError, EvalResult};
use rust_decimal::Decimal;
use xqvalue_types::writer;
use xqvalue_types::{
    BooleanView, DecimalView, DoubleView, FloatView, IntegerView, TaggedValue, ValueSink, ValueTag, XsDecimal,
};

/// A numeric source value read through its view
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    Integer(i64),
    Decimal(XsDecimal),
    Float(f32),
    Double(f64),
}

impl Numeric {
    pub(crate) fn read(value: TaggedValue<'_>) -> EvalResult<Self> {
        Ok(match value.tag() {
            t if t.is_integer_family() => Self::Integer(value.view::<IntegerView<'_>>()?.get()),
            ValueTag::Decimal => Self::Decimal(value.view::<DecimalView<'_>>()?.get()),
            ValueTag::Float => Self::Float(value.view::<FloatView<'_>>()?.get()),
            ValueTag::Double => Self::Double(value.view::<DoubleView<'_>>()?.get()),
            other => return Err(EvalError::internal(format!("{other} is not numeric"))),
        })
    }

    pub(crate) fn to_f64(self) -> f64 {
        match self {
            Self::Integer(v) => v as f64,
            Self::Decimal(d) => d.to_f64(),
            Self::Float(v) => v as f64,
            Self::Double(v) => v,
        }
    }

    pub(crate) fn to_f32(self) -> f32 {
        match self {
            Self::Integer(v) => v as f32,
            Self::Decimal(d) => d.to_f32(),
            Self::Float(v) => v,
            Self::Double(v) => v as f32,
        }
    }
}

fn read_boolean(value: TaggedValue<'_>) -> EvalResult<bool> {
    Ok(value.view::<BooleanView<'_>>()?.get())
}

// ============================================================================
// Boolean
// ============================================================================

pub(super) fn boolean_from_text(value: TaggedValue<'_>, _target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    writer::write_boolean(sink, lexical::parse_boolean(text_of(value)?)?);
    Ok(())
}

/// Zero and NaN are false, every other number is true
pub(super) fn boolean_from_numeric(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    let truth = match Numeric::read(value)? {
        Numeric::Integer(v) => v != 0,
        Numeric::Decimal(d) => !d.is_zero(),
        Numeric::Float(v) => !(v == 0.0 || v.is_nan()),
        Numeric::Double(v) => !(v == 0.0 || v.is_nan()),
    };
    writer::write_boolean(sink, truth);
    Ok(())
}

pub(super) fn boolean_from_boolean(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    writer::write_boolean(sink, read_boolean(value)?);
    Ok(())
}

// ============================================================================
// Double and float
// ============================================================================

pub(super) fn double_from_text(value: TaggedValue<'_>, _target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    writer::write_double(sink, lexical::parse_double(text_of(value)?)?);
    Ok(())
}

pub(super) fn double_from_numeric(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    writer::write_double(sink, Numeric::read(value)?.to_f64());
    Ok(())
}

pub(super) fn double_from_boolean(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    writer::write_double(sink, if read_boolean(value)? { 1.0 } else { 0.0 });
    Ok(())
}

pub(super) fn float_from_text(value: TaggedValue<'_>, _target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    writer::write_float(sink, lexical::parse_float(text_of(value)?)?);
    Ok(())
}

pub(super) fn float_from_numeric(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    writer::write_float(sink, Numeric::read(value)?.to_f32());
    Ok(())
}

pub(super) fn float_from_boolean(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    writer::write_float(sink, if read_boolean(value)? { 1.0 } else { 0.0 });
    Ok(())
}

// ============================================================================
// Decimal
// ============================================================================

/// Exact decimal value of a finite double, rounded half to even to the
/// supported number of fractional digits
pub(crate) fn decimal_from_f64(value: f64) -> EvalResult<XsDecimal> {
    let type_name = ValueTag::Decimal.name();
    if !value.is_finite() {
        return Err(EvalError::non_finite(type_name, super::canonical::format_double(value)));
    }
    if value.abs() >= 1e18 {
        return Err(EvalError::numeric_overflow(type_name, super::canonical::format_double(value)));
    }
    if value == 0.0 {
        return Ok(XsDecimal::ZERO);
    }
    // Shortest round-trip digits, e.g. "-1.2345e-7"
    let text = format!("{value:e}");
    let (digits, exponent) = text
        .split_once('e')
        .ok_or_else(|| EvalError::internal(format!("unexpected float rendering {text}")))?;
    let exponent: i32 = exponent
        .parse()
        .map_err(|_| EvalError::internal(format!("unexpected float rendering {text}")))?;
    let negative = digits.starts_with('-');
    let digits: String = digits.chars().filter(char::is_ascii_digit).collect();
    let mantissa = digits
        .bytes()
        .fold(0i128, |acc, b| acc * 10 + (b - b'0') as i128);
    let mantissa = if negative { -mantissa } else { mantissa };
    let scale = digits.len() as i32 - 1 - exponent;

    let exact = if scale >= 0 {
        match u32::try_from(scale).ok().filter(|s| *s <= 28) {
            Some(scale) => Decimal::try_from_i128_with_scale(mantissa, scale).ok(),
            // Smaller than anything the rounding below would keep
            None => return Ok(XsDecimal::ZERO),
        }
    } else {
        10i128
            .checked_pow(scale.unsigned_abs())
            .and_then(|factor| mantissa.checked_mul(factor))
            .and_then(|widened| Decimal::try_from_i128_with_scale(widened, 0).ok())
    };
    exact
        .and_then(XsDecimal::from_rust_decimal)
        .ok_or_else(|| EvalError::numeric_overflow(type_name, super::canonical::format_double(value)))
}

pub(super) fn decimal_from_text(value: TaggedValue<'_>, _target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    writer::write_decimal(sink, lexical::parse_decimal(text_of(value)?)?);
    Ok(())
}

pub(super) fn decimal_from_numeric(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    let decimal = match Numeric::read(value)? {
        Numeric::Integer(v) => XsDecimal::from_i64(v)
            .ok_or_else(|| EvalError::numeric_overflow(ValueTag::Decimal.name(), v.to_string()))?,
        Numeric::Decimal(d) => d,
        Numeric::Float(v) => decimal_from_f64(v as f64)?,
        Numeric::Double(v) => decimal_from_f64(v)?,
    };
    writer::write_decimal(sink, decimal);
    Ok(())
}

pub(super) fn decimal_from_boolean(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    let one = XsDecimal::from_parts(if read_boolean(value)? { 1 } else { 0 }, 0);
    writer::write_decimal(sink, one);
    Ok(())
}

// ============================================================================
// Integer and its derived types
// ============================================================================

/// Check the target's value range and write at the target's width
fn write_integer_target(sink: &mut dyn ValueSink, target: ValueTag, value: i64) -> EvalResult<()> {
    let (min, max) = target
        .integer_range()
        .ok_or_else(|| EvalError::internal(format!("{target} is not an integer type")))?;
    if value < min || value > max {
        return Err(EvalError::out_of_range(target.name(), value.to_string()));
    }
    writer::write_integer(sink, target, value)?;
    Ok(())
}

/// Truncate a finite double toward zero into the 64-bit range
fn truncate_f64(value: f64, target: ValueTag) -> EvalResult<i64> {
    if !value.is_finite() {
        return Err(EvalError::non_finite(target.name(), super::canonical::format_double(value)));
    }
    let truncated = value.trunc();
    // 2^63 is exactly representable; anything at or beyond it does not fit
    if truncated >= 9_223_372_036_854_775_808.0 || truncated < -9_223_372_036_854_775_808.0 {
        return Err(EvalError::numeric_overflow(target.name(), super::canonical::format_double(value)));
    }
    Ok(truncated as i64)
}

pub(super) fn integer_from_text(value: TaggedValue<'_>, target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    let parsed = lexical::parse_integer(text_of(value)?, target)?;
    write_integer_target(sink, target, parsed)
}

pub(super) fn integer_from_numeric(
    value: TaggedValue<'_>,
    target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    let integer = match Numeric::read(value)? {
        Numeric::Integer(v) => v,
        Numeric::Decimal(d) => d
            .trunc_to_i64()
            .ok_or_else(|| EvalError::numeric_overflow(target.name(), d.to_string()))?,
        Numeric::Float(v) => truncate_f64(v as f64, target)?,
        Numeric::Double(v) => truncate_f64(v, target)?,
    };
    write_integer_target(sink, target, integer)
}

pub(super) fn integer_from_boolean(
    value: TaggedValue<'_>,
    target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    write_integer_target(sink, target, read_boolean(value)? as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_from_double() {
        assert_eq!(decimal_from_f64(1.5).unwrap(), XsDecimal::from_parts(15, 1));
        assert_eq!(decimal_from_f64(-0.1).unwrap(), XsDecimal::from_parts(-1, 1));
        assert_eq!(decimal_from_f64(1e17).unwrap(), XsDecimal::from_parts(1, -17));
        assert_eq!(decimal_from_f64(1e-30).unwrap(), XsDecimal::ZERO);
        assert!(decimal_from_f64(1e18).is_err());
        assert!(matches!(
            decimal_from_f64(f64::NAN),
            Err(EvalError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn test_truncate_bounds() {
        assert_eq!(truncate_f64(-2.9, ValueTag::Integer).unwrap(), -2);
        assert!(truncate_f64(9.3e18, ValueTag::Integer).is_err());
        assert_eq!(
            truncate_f64(-9_223_372_036_854_775_808.0, ValueTag::Integer).unwrap(),
            i64::MIN
        );
    }
}
