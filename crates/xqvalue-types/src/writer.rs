//! Append-only encoders for every atomic layout
//!
//! Each writer emits the tag byte followed by the payload. Writers reject a
//! tag that does not use their layout, so a value is never written with a
//! payload its views cannot read back.

use crate::decimal::XsDecimal;
use crate::sink::ValueSink;
use crate::tag::ValueTag;
use crate::temporal::{Timezone, XsDate, XsDateTime, XsDuration, XsTime};
use xqvalue_diagnostics::{Result, XqError};

fn wrong_layout(writer: &str, tag: ValueTag) -> XqError {
    XqError::internal(format!("{writer} cannot encode a {tag} value"))
}

fn write_length(sink: &mut (impl ValueSink + ?Sized), kind: &str, len: usize) -> Result<()> {
    let len = u32::try_from(len)
        .map_err(|_| XqError::internal(format!("{kind} of {len} bytes exceeds the encodable length")))?;
    sink.write_u32(len);
    Ok(())
}

fn write_timezone(sink: &mut (impl ValueSink + ?Sized), timezone: Option<Timezone>) {
    let (hour, minute) = Timezone::to_wire(timezone);
    sink.write_i8(hour);
    sink.write_i8(minute);
}

pub fn write_tag(sink: &mut (impl ValueSink + ?Sized), tag: ValueTag) {
    sink.write_u8(tag.as_u8());
}

pub fn write_boolean(sink: &mut (impl ValueSink + ?Sized), value: bool) {
    write_tag(sink, ValueTag::Boolean);
    sink.write_u8(value as u8);
}

/// Write an integer-family value at the width its tag declares
///
/// The value must fit the width; the tag's narrower facet range is the cast
/// engine's concern.
pub fn write_integer(sink: &mut (impl ValueSink + ?Sized), tag: ValueTag, value: i64) -> Result<()> {
    let width = tag
        .integer_width()
        .ok_or_else(|| wrong_layout("integer writer", tag))?;
    let fits = match width {
        1 => i8::try_from(value).is_ok(),
        2 => i16::try_from(value).is_ok(),
        4 => i32::try_from(value).is_ok(),
        _ => true,
    };
    if !fits {
        return Err(XqError::internal(format!("{value} does not fit the {tag} payload")));
    }
    write_tag(sink, tag);
    let bytes = value.to_be_bytes();
    sink.write_bytes(&bytes[8 - width..]);
    Ok(())
}

pub fn write_float(sink: &mut (impl ValueSink + ?Sized), value: f32) {
    write_tag(sink, ValueTag::Float);
    sink.write_f32(value);
}

pub fn write_double(sink: &mut (impl ValueSink + ?Sized), value: f64) {
    write_tag(sink, ValueTag::Double);
    sink.write_f64(value);
}

pub fn write_decimal(sink: &mut (impl ValueSink + ?Sized), value: XsDecimal) {
    write_tag(sink, ValueTag::Decimal);
    sink.write_i8(value.scale());
    sink.write_i64(value.mantissa());
}

/// Write a length-prefixed UTF-8 value (string family, untypedAtomic,
/// anyURI, NOTATION)
pub fn write_string(sink: &mut (impl ValueSink + ?Sized), tag: ValueTag, value: &str) -> Result<()> {
    if !tag.has_string_payload() {
        return Err(wrong_layout("string writer", tag));
    }
    write_tag(sink, tag);
    write_length(sink, tag.name(), value.len())?;
    sink.write_bytes(value.as_bytes());
    Ok(())
}

pub fn write_date_time(sink: &mut (impl ValueSink + ?Sized), value: &XsDateTime) {
    write_tag(sink, ValueTag::DateTime);
    sink.write_i16(value.year);
    sink.write_u8(value.month);
    sink.write_u8(value.day);
    sink.write_u8(value.hour);
    sink.write_u8(value.minute);
    sink.write_i32(value.millisecond);
    write_timezone(sink, value.timezone);
}

/// Write an xs:date or gregorian fragment value
pub fn write_date(sink: &mut (impl ValueSink + ?Sized), tag: ValueTag, value: &XsDate) -> Result<()> {
    if !tag.has_date_payload() {
        return Err(wrong_layout("date writer", tag));
    }
    write_tag(sink, tag);
    sink.write_i16(value.year);
    sink.write_u8(value.month);
    sink.write_u8(value.day);
    write_timezone(sink, value.timezone);
    Ok(())
}

pub fn write_time(sink: &mut (impl ValueSink + ?Sized), value: &XsTime) {
    write_tag(sink, ValueTag::Time);
    sink.write_u8(value.hour);
    sink.write_u8(value.minute);
    sink.write_i32(value.millisecond);
    write_timezone(sink, value.timezone);
}

pub fn write_duration(sink: &mut (impl ValueSink + ?Sized), value: XsDuration) {
    write_tag(sink, ValueTag::Duration);
    sink.write_i32(value.months);
    sink.write_i64(value.millis);
}

pub fn write_year_month_duration(sink: &mut (impl ValueSink + ?Sized), months: i32) {
    write_tag(sink, ValueTag::YearMonthDuration);
    sink.write_i32(months);
}

pub fn write_day_time_duration(sink: &mut (impl ValueSink + ?Sized), millis: i64) {
    write_tag(sink, ValueTag::DayTimeDuration);
    sink.write_i64(millis);
}

pub fn write_qname(sink: &mut (impl ValueSink + ?Sized), uri: &str, prefix: &str, local: &str) -> Result<()> {
    write_tag(sink, ValueTag::QName);
    for part in [uri, prefix, local] {
        write_length(sink, "xs:QName part", part.len())?;
        sink.write_bytes(part.as_bytes());
    }
    Ok(())
}

pub fn write_binary(sink: &mut (impl ValueSink + ?Sized), tag: ValueTag, bytes: &[u8]) -> Result<()> {
    if !tag.is_binary() {
        return Err(wrong_layout("binary writer", tag));
    }
    write_tag(sink, tag);
    write_length(sink, tag.name(), bytes.len())?;
    sink.write_bytes(bytes);
    Ok(())
}
