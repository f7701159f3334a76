//! Canonical lexical forms
//!
//! Casting any primitive to a string-like type writes the value's canonical
//! lexical form. These formatters are also what the owned values print
//! through when a collaborator needs a display string.

use crate::error::{EvalError, EvalResult};
use base64::Engine as _;
use std::fmt::Write as _;
use xqvalue_types::calendar::{MILLIS_PER_DAY, MILLIS_PER_HOUR, MILLIS_PER_MINUTE, MILLIS_PER_SECOND};
use xqvalue_types::{
    BinaryView, BooleanView, DateTimeView, DateView, DecimalView, DoubleView, DurationView, FloatView,
    IntegerView, QNameView, StringView, TaggedValue, TimeView, Timezone, ValueTag, XsDate, XsDateTime,
    XsDecimal, XsDuration, XsTime,
};

// ============================================================================
// Numerics
// ============================================================================

/// Canonical form of a double
///
/// Magnitudes from 0.000001 up to and including 1000000 use plain decimal
/// notation; everything else uses `mantissa E exponent` with at least one
/// fractional mantissa digit.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-INF" } else { "INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    if (1e-6..=1e6).contains(&value.abs()) {
        value.to_string()
    } else {
        scientific(format!("{value:E}"))
    }
}

/// Canonical form of a float, with the same thresholds as a double
pub fn format_float(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-INF" } else { "INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    if (1e-6f32..=1e6f32).contains(&value.abs()) {
        value.to_string()
    } else {
        scientific(format!("{value:E}"))
    }
}

/// `1E-7` becomes `1.0E-7`
fn scientific(mut text: String) -> String {
    if let Some(e) = text.find('E') {
        if !text[..e].contains('.') {
            text.insert_str(e, ".0");
        }
    }
    text
}

pub fn format_decimal(value: XsDecimal) -> String {
    value.to_string()
}

// ============================================================================
// Durations
// ============================================================================

fn format_duration_parts(months: i64, millis: i64, zero: &str) -> String {
    if months == 0 && millis == 0 {
        return zero.to_string();
    }
    let mut out = String::new();
    if months < 0 || millis < 0 {
        out.push('-');
    }
    out.push('P');
    let months = months.unsigned_abs();
    let millis = millis.unsigned_abs();
    let (years, months) = (months / 12, months % 12);
    if years > 0 {
        let _ = write!(out, "{years}Y");
    }
    if months > 0 {
        let _ = write!(out, "{months}M");
    }

    let day = MILLIS_PER_DAY as u64;
    let hour = MILLIS_PER_HOUR as u64;
    let minute = MILLIS_PER_MINUTE as u64;
    let second = MILLIS_PER_SECOND as u64;
    let days = millis / day;
    let hours = millis % day / hour;
    let minutes = millis % hour / minute;
    let seconds = millis % minute / second;
    let fraction = millis % second;
    if days > 0 {
        let _ = write!(out, "{days}D");
    }
    if hours > 0 || minutes > 0 || seconds > 0 || fraction > 0 {
        out.push('T');
        if hours > 0 {
            let _ = write!(out, "{hours}H");
        }
        if minutes > 0 {
            let _ = write!(out, "{minutes}M");
        }
        if seconds > 0 || fraction > 0 {
            let _ = write!(out, "{seconds}");
            push_fraction(&mut out, fraction as u32);
            out.push('S');
        }
    }
    out
}

pub fn format_duration(value: XsDuration) -> String {
    format_duration_parts(value.months as i64, value.millis, "PT0S")
}

pub fn format_year_month_duration(months: i32) -> String {
    format_duration_parts(months as i64, 0, "P0M")
}

pub fn format_day_time_duration(millis: i64) -> String {
    format_duration_parts(0, millis, "PT0S")
}

// ============================================================================
// Dates and times
// ============================================================================

/// `.fff` with trailing zeros removed; nothing for zero
fn push_fraction(out: &mut String, millis: u32) {
    if millis > 0 {
        let digits = format!("{millis:03}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
}

fn push_year(out: &mut String, year: i16) {
    if year < 0 {
        out.push('-');
    }
    let _ = write!(out, "{:04}", year.unsigned_abs());
}

fn push_time(out: &mut String, hour: u8, minute: u8, millisecond: i32) {
    let _ = write!(out, "{hour:02}:{minute:02}:{:02}", millisecond / 1000);
    push_fraction(out, (millisecond % 1000) as u32);
}

fn push_timezone(out: &mut String, timezone: Option<Timezone>) {
    match timezone {
        None => {}
        Some(tz) if tz.offset_minutes() == 0 => out.push('Z'),
        Some(tz) => {
            let sign = if tz.offset_minutes() < 0 { '-' } else { '+' };
            let _ = write!(out, "{sign}{:02}:{:02}", tz.hour().unsigned_abs(), tz.minute().unsigned_abs());
        }
    }
}

pub fn format_date_time(value: &XsDateTime) -> String {
    let mut out = String::with_capacity(29);
    push_year(&mut out, value.year);
    let _ = write!(out, "-{:02}-{:02}T", value.month, value.day);
    push_time(&mut out, value.hour, value.minute, value.millisecond);
    push_timezone(&mut out, value.timezone);
    out
}

pub fn format_date(value: &XsDate) -> String {
    let mut out = String::with_capacity(16);
    push_year(&mut out, value.year);
    let _ = write!(out, "-{:02}-{:02}", value.month, value.day);
    push_timezone(&mut out, value.timezone);
    out
}

pub fn format_time(value: &XsTime) -> String {
    let mut out = String::with_capacity(18);
    push_time(&mut out, value.hour, value.minute, value.millisecond);
    push_timezone(&mut out, value.timezone);
    out
}

/// Canonical form of a gregorian fragment; only the fields the type
/// carries are written
pub fn format_gregorian(tag: ValueTag, value: &XsDate) -> String {
    let mut out = String::with_capacity(16);
    match tag {
        ValueTag::GYear => push_year(&mut out, value.year),
        ValueTag::GYearMonth => {
            push_year(&mut out, value.year);
            let _ = write!(out, "-{:02}", value.month);
        }
        ValueTag::GMonthDay => {
            let _ = write!(out, "--{:02}-{:02}", value.month, value.day);
        }
        ValueTag::GDay => {
            let _ = write!(out, "---{:02}", value.day);
        }
        _ => {
            let _ = write!(out, "--{:02}", value.month);
        }
    }
    push_timezone(&mut out, value.timezone);
    out
}

// ============================================================================
// Binaries
// ============================================================================

/// Two uppercase hex digits per byte
pub fn format_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02X}");
    }
    out
}

pub fn format_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

// ============================================================================
// Any atomic value
// ============================================================================

/// Canonical lexical form of any atomic value
pub fn lexical_form(value: TaggedValue<'_>) -> EvalResult<String> {
    let tag = value.tag();
    let text = match tag {
        t if t.has_string_payload() => value.view::<StringView<'_>>()?.as_str().to_owned(),
        t if t.is_integer_family() => value.view::<IntegerView<'_>>()?.get().to_string(),
        t if t.is_gregorian() => format_gregorian(t, &value.view::<DateView<'_>>()?.get()),
        ValueTag::Boolean => value.view::<BooleanView<'_>>()?.get().to_string(),
        ValueTag::Decimal => format_decimal(value.view::<DecimalView<'_>>()?.get()),
        ValueTag::Float => format_float(value.view::<FloatView<'_>>()?.get()),
        ValueTag::Double => format_double(value.view::<DoubleView<'_>>()?.get()),
        ValueTag::DateTime => format_date_time(&value.view::<DateTimeView<'_>>()?.get()),
        ValueTag::Date => format_date(&value.view::<DateView<'_>>()?.get()),
        ValueTag::Time => format_time(&value.view::<TimeView<'_>>()?.get()),
        ValueTag::Duration => format_duration(value.view::<DurationView<'_>>()?.get()),
        ValueTag::YearMonthDuration => format_year_month_duration(value.view::<DurationView<'_>>()?.months()),
        ValueTag::DayTimeDuration => format_day_time_duration(value.view::<DurationView<'_>>()?.millis()),
        ValueTag::QName => {
            let qname = value.view::<QNameView<'_>>()?;
            if qname.prefix().is_empty() {
                qname.local_name().to_owned()
            } else {
                format!("{}:{}", qname.prefix(), qname.local_name())
            }
        }
        ValueTag::HexBinary => format_hex(value.view::<BinaryView<'_>>()?.as_bytes()),
        ValueTag::Base64Binary => format_base64(value.view::<BinaryView<'_>>()?.as_bytes()),
        other => return Err(EvalError::cast_not_defined(other.name(), ValueTag::String.name())),
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scientific_always_has_fraction() {
        assert_eq!(scientific("1E-7".to_string()), "1.0E-7");
        assert_eq!(scientific("1.25E10".to_string()), "1.25E10");
    }

    #[test]
    fn test_fraction_trimmed() {
        let mut out = String::new();
        push_fraction(&mut out, 500);
        assert_eq!(out, ".5");
        out.clear();
        push_fraction(&mut out, 0);
        assert_eq!(out, "");
    }

    #[test]
    fn test_negative_timezone() {
        let mut out = String::new();
        push_timezone(&mut out, Timezone::new(-5, -30));
        assert_eq!(out, "-05:30");
    }
}
