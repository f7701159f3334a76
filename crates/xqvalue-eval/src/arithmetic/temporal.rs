//! Duration and date/time arithmetic

use super::ArithmeticOperator;
use super::numeric::decimal_divide;
use crate::context::DynamicContext;
use crate::error::{EvalError, EvalResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use xqvalue_types::calendar::{self, MILLIS_PER_SECOND};
use xqvalue_types::{Timezone, XsDate, XsDateTime, XsDecimal, XsTime};

// ============================================================================
// Durations
// ============================================================================

pub(super) fn add_months(a: i32, b: i32, op: ArithmeticOperator) -> EvalResult<i32> {
    let result = match op {
        ArithmeticOperator::Subtract => a.checked_sub(b),
        _ => a.checked_add(b),
    };
    result.ok_or_else(|| EvalError::duration_overflow(op.name()))
}

pub(super) fn add_millis(a: i64, b: i64, op: ArithmeticOperator) -> EvalResult<i64> {
    let result = match op {
        ArithmeticOperator::Subtract => a.checked_sub(b),
        _ => a.checked_add(b),
    };
    result.ok_or_else(|| EvalError::duration_overflow(op.name()))
}

/// Scale a duration component by a factor, rounding half up
///
/// Division by zero overflows; a NaN factor is FOCA0005.
pub(super) fn scale_component(value: i64, factor: f64, op: ArithmeticOperator, min: i64, max: i64) -> EvalResult<i64> {
    if factor.is_nan() {
        return Err(EvalError::nan_operand(op.name()));
    }
    let scaled = match op {
        ArithmeticOperator::Divide => {
            if factor == 0.0 {
                return Err(EvalError::duration_overflow(op.name()));
            }
            value as f64 / factor
        }
        _ => value as f64 * factor,
    };
    let rounded = (scaled + 0.5).floor();
    // `max as f64` rounds up to the next power of two for i64
    if !rounded.is_finite() || rounded < min as f64 || rounded >= max as f64 + 1.0 {
        return Err(EvalError::duration_overflow(op.name()));
    }
    Ok(rounded as i64)
}

/// Ratio of two durations of the same kind
pub(super) fn duration_ratio(a: i64, b: i64) -> EvalResult<XsDecimal> {
    let exceeded = || EvalError::precision_exceeded("divide");
    let a = XsDecimal::from_i64(a).ok_or_else(exceeded)?;
    let b = XsDecimal::from_i64(b).ok_or_else(exceeded)?;
    decimal_divide(a, b)
}

// ============================================================================
// Calendar conversion
// ============================================================================

fn out_of_range(type_name: &str) -> EvalError {
    EvalError::invalid_date_time(type_name, "result is outside the supported year range")
}

fn to_naive(value: &XsDateTime) -> EvalResult<NaiveDateTime> {
    let seconds = (value.millisecond / 1000) as u32;
    let millis = (value.millisecond % 1000) as u32;
    let date = NaiveDate::from_ymd_opt(value.year as i32, value.month as u32, value.day as u32);
    let time = NaiveTime::from_hms_milli_opt(value.hour as u32, value.minute as u32, seconds, millis);
    match (date, time) {
        (Some(date), Some(time)) => Ok(date.and_time(time)),
        _ => Err(EvalError::invalid_date_time("xs:dateTime", "fields do not name an instant")),
    }
}

fn from_naive(value: NaiveDateTime, timezone: Option<Timezone>, type_name: &str) -> EvalResult<XsDateTime> {
    let year = i16::try_from(value.year()).map_err(|_| out_of_range(type_name))?;
    let millisecond = value.second() as i32 * MILLIS_PER_SECOND as i32 + (value.nanosecond() / 1_000_000) as i32;
    Ok(XsDateTime {
        year,
        month: value.month() as u8,
        day: value.day() as u8,
        hour: value.hour() as u8,
        minute: value.minute() as u8,
        millisecond,
        timezone,
    })
}

// ============================================================================
// Date/time plus duration
// ============================================================================

/// Add a number of months, clamping the day to the end of the target month
pub(super) fn add_months_to_date(date: XsDate, months: i32, type_name: &str) -> EvalResult<XsDate> {
    let total = date.year as i64 * 12 + (date.month as i64 - 1) + months as i64;
    let year = i16::try_from(total.div_euclid(12)).map_err(|_| out_of_range(type_name))?;
    let month = (total.rem_euclid(12) + 1) as u8;
    let day = date.day.min(calendar::days_in_month(year as i64, month));
    Ok(XsDate::new(year, month, day).with_timezone(date.timezone))
}

pub(super) fn add_months_to_date_time(value: XsDateTime, months: i32) -> EvalResult<XsDateTime> {
    let date = add_months_to_date(value.date(), months, "xs:dateTime")?;
    Ok(XsDateTime::new(date, value.time()))
}

pub(super) fn add_millis_to_date_time(value: XsDateTime, millis: i64) -> EvalResult<XsDateTime> {
    let delta = TimeDelta::try_milliseconds(millis).ok_or_else(|| out_of_range("xs:dateTime"))?;
    let shifted = to_naive(&value)?
        .checked_add_signed(delta)
        .ok_or_else(|| out_of_range("xs:dateTime"))?;
    from_naive(shifted, value.timezone, "xs:dateTime")
}

/// A date plus a day-time duration: the date at midnight is shifted and
/// the time of day dropped
pub(super) fn add_millis_to_date(date: XsDate, millis: i64) -> EvalResult<XsDate> {
    let shifted = add_millis_to_date_time(date.at_midnight(), millis)
        .map_err(|_| out_of_range("xs:date"))?;
    Ok(shifted.date())
}

pub(super) fn add_millis_to_time(time: XsTime, millis: i64) -> XsTime {
    let shifted = time.millis_of_day() + millis.rem_euclid(calendar::MILLIS_PER_DAY);
    XsTime::from_millis_of_day(shifted, time.timezone)
}

// ============================================================================
// Date/time minus date/time
// ============================================================================

/// Milliseconds between two instants, each normalized to UTC using the
/// implicit timezone when it carries none
pub(super) fn date_time_difference(a: XsDateTime, b: XsDateTime, ctx: &DynamicContext) -> EvalResult<i64> {
    let utc = |value: &XsDateTime| -> EvalResult<NaiveDateTime> {
        let offset = value.timezone.unwrap_or(ctx.implicit_timezone()).offset_minutes();
        let local = to_naive(value)?;
        local
            .checked_sub_signed(TimeDelta::minutes(offset as i64))
            .ok_or_else(|| out_of_range("xs:dateTime"))
    };
    let delta = utc(&a)? - utc(&b)?;
    Ok(delta.num_milliseconds())
}

pub(super) fn date_difference(a: XsDate, b: XsDate, ctx: &DynamicContext) -> EvalResult<i64> {
    date_time_difference(a.at_midnight(), b.at_midnight(), ctx)
}

/// Both times are taken on one reference day and normalized to UTC
pub(super) fn time_difference(a: XsTime, b: XsTime, ctx: &DynamicContext) -> i64 {
    let implicit = ctx.implicit_timezone();
    let utc = |value: &XsTime| value.millis_of_day() - value.timezone.unwrap_or(implicit).offset_millis();
    utc(&a) - utc(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_addition_clamps_to_month_end() {
        let leap_day = XsDate::new(2024, 2, 29);
        assert_eq!(
            add_months_to_date(leap_day, 12, "xs:date").unwrap(),
            XsDate::new(2025, 2, 28)
        );
        assert_eq!(
            add_months_to_date(XsDate::new(2023, 1, 31), 1, "xs:date").unwrap(),
            XsDate::new(2023, 2, 28)
        );
        assert_eq!(
            add_months_to_date(XsDate::new(2023, 3, 31), -1, "xs:date").unwrap(),
            XsDate::new(2023, 2, 28)
        );
        assert_eq!(
            add_months_to_date(XsDate::new(1, 1, 15), -13, "xs:date").unwrap(),
            XsDate::new(-1, 12, 15)
        );
    }

    #[test]
    fn test_millis_roll_over_days() {
        let value = XsDateTime::new(XsDate::new(1999, 12, 31), XsTime::new(23, 0, 0));
        let shifted = add_millis_to_date_time(value, 2 * calendar::MILLIS_PER_HOUR).unwrap();
        assert_eq!(shifted, XsDateTime::new(XsDate::new(2000, 1, 1), XsTime::new(1, 0, 0)));
    }

    #[test]
    fn test_time_wraps() {
        let time = XsTime::new(23, 30, 0);
        assert_eq!(
            add_millis_to_time(time, calendar::MILLIS_PER_HOUR),
            XsTime::new(0, 30, 0)
        );
        assert_eq!(
            add_millis_to_time(XsTime::MIDNIGHT, -calendar::MILLIS_PER_MINUTE),
            XsTime::new(23, 59, 0)
        );
    }

    #[test]
    fn test_difference_uses_implicit_timezone() {
        let ctx = DynamicContext::builder()
            .implicit_timezone(Timezone::new(5, 0).unwrap())
            .build();
        let local = XsDateTime::new(XsDate::new(2000, 1, 1), XsTime::new(12, 0, 0));
        let utc = local.with_timezone(Some(Timezone::UTC));
        assert_eq!(
            date_time_difference(local, utc, &ctx).unwrap(),
            -5 * calendar::MILLIS_PER_HOUR
        );
    }

    #[test]
    fn test_scale_component_rounds_half_up() {
        assert_eq!(scale_component(3, 0.5, ArithmeticOperator::Multiply, i64::MIN, i64::MAX).unwrap(), 2);
        assert_eq!(scale_component(-3, 0.5, ArithmeticOperator::Multiply, i64::MIN, i64::MAX).unwrap(), -1);
        assert!(matches!(
            scale_component(1, f64::NAN, ArithmeticOperator::Multiply, i64::MIN, i64::MAX),
            Err(EvalError::NaNOperand { .. })
        ));
        assert!(matches!(
            scale_component(1, 0.0, ArithmeticOperator::Divide, i64::MIN, i64::MAX),
            Err(EvalError::DurationOverflow { .. })
        ));
    }
}
