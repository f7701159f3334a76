//! Tagged value codec tests
//!
//! Tests for: wire layouts, view binding and rebinding, malformed input,
//! sequences and owned value round trips

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use xqvalue_diagnostics::SYSE0002;
use xqvalue_types::writer;
use xqvalue_types::{
    AtomicValue, DateTimeView, DateView, DecimalView, DurationView, IntegerView, SequenceBuilder, SequenceView,
    StringView, TaggedValue, Timezone, ValueBuffer, ValueSink, ValueTag, XsDate, XsDateTime, XsDecimal, XsTime,
    write_empty_sequence,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn encode(value: &AtomicValue) -> Vec<u8> {
    value.to_buffer().unwrap().to_vec()
}

// ============================================================================
// Wire layouts
// ============================================================================

#[rstest]
#[case(ValueTag::Byte, -2, vec![31, 0xFE])]
#[case(ValueTag::Short, 258, vec![30, 0x01, 0x02])]
#[case(ValueTag::UnsignedByte, 255, vec![36, 0x00, 0xFF])]
#[case(ValueTag::Int, -1, vec![29, 0xFF, 0xFF, 0xFF, 0xFF])]
#[case(ValueTag::Integer, 1, vec![25, 0, 0, 0, 0, 0, 0, 0, 1])]
fn test_integer_widths(#[case] tag: ValueTag, #[case] value: i64, #[case] expected: Vec<u8>) {
    assert_eq!(encode(&AtomicValue::Integer { tag, value }), expected);
}

#[test]
fn test_decimal_layout() {
    let bytes = encode(&AtomicValue::decimal(-125, 2));
    assert_eq!(bytes, vec![24, 2, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x83]);
}

#[test]
fn test_date_time_layout() {
    let value = XsDateTime {
        year: 2024,
        month: 2,
        day: 29,
        hour: 13,
        minute: 5,
        millisecond: 7_250,
        timezone: Some(Timezone::new(-5, -30).unwrap()),
    };
    let bytes = encode(&AtomicValue::DateTime(value));
    assert_eq!(
        bytes,
        vec![15, 0x07, 0xE8, 2, 29, 13, 5, 0, 0, 0x1C, 0x52, 0xFB, 0xE2]
    );
}

#[test]
fn test_missing_timezone_marker() {
    let bytes = encode(&AtomicValue::date(1999, 12, 31));
    assert_eq!(bytes, vec![16, 0x07, 0xCF, 12, 31, 127, 127]);
}

#[test]
fn test_string_is_length_prefixed() {
    let bytes = encode(&AtomicValue::string("ab"));
    assert_eq!(bytes, vec![4, 0, 0, 0, 2, b'a', b'b']);
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn test_views_read_in_place() {
    let bytes = encode(&AtomicValue::DateTime(XsDateTime::new(
        XsDate::new(2001, 9, 11),
        XsTime::new(8, 46, 40_123),
    )));
    let value = TaggedValue::new(&bytes).unwrap();
    let view = value.view::<DateTimeView<'_>>().unwrap();
    assert_eq!(view.year(), 2001);
    assert_eq!(view.hour(), 8);
    assert_eq!(view.millisecond(), 40_123);
    assert_eq!(view.timezone(), None);
}

#[test]
fn test_view_rebinds_across_one_buffer() {
    let mut buffer = ValueBuffer::new();
    writer::write_integer(&mut buffer, ValueTag::Short, 7).unwrap();
    let first_len = buffer.len();
    writer::write_string(&mut buffer, ValueTag::Token, "rust").unwrap();
    let bytes = buffer.to_vec();

    let mut value = TaggedValue::bind(&bytes, 0, first_len).unwrap();
    assert_eq!(value.view::<IntegerView<'_>>().unwrap().get(), 7);

    value.set(&bytes, first_len, bytes.len() - first_len).unwrap();
    assert_eq!(value.tag(), ValueTag::Token);
    assert_eq!(value.view::<StringView<'_>>().unwrap().as_str(), "rust");
}

#[test]
fn test_duration_view_reads_both_kinds() {
    let ym = encode(&AtomicValue::YearMonthDuration(-14));
    let view = TaggedValue::new(&ym).unwrap().view::<DurationView<'_>>().unwrap();
    assert_eq!((view.months(), view.millis()), (-14, 0));

    let dt = encode(&AtomicValue::DayTimeDuration(3_600_000));
    let view = TaggedValue::new(&dt).unwrap().view::<DurationView<'_>>().unwrap();
    assert_eq!((view.months(), view.millis()), (0, 3_600_000));
}

#[test]
fn test_decimal_view_digit_count() {
    let bytes = encode(&AtomicValue::decimal(123_456, 3));
    let view = TaggedValue::new(&bytes).unwrap().view::<DecimalView<'_>>().unwrap();
    assert_eq!(view.digit_count(), 6);
    assert_eq!(view.get(), XsDecimal::from_parts(123_456, 3));
}

// ============================================================================
// Malformed input
// ============================================================================

#[rstest]
#[case(vec![])]
#[case(vec![21])]
#[case(vec![200, 0])]
fn test_bad_tag_bytes(#[case] bytes: Vec<u8>) {
    assert_eq!(TaggedValue::new(&bytes).unwrap_err().code(), SYSE0002);
}

#[test]
fn test_truncated_payloads() {
    let value = TaggedValue::new(&[25, 0, 0, 1]).unwrap();
    assert_eq!(value.view::<IntegerView<'_>>().unwrap_err().code(), SYSE0002);

    let value = TaggedValue::new(&[4, 0, 0, 0, 9, b'x']).unwrap();
    assert_eq!(value.view::<StringView<'_>>().unwrap_err().code(), SYSE0002);
}

#[test]
fn test_invalid_calendar_bytes() {
    // 2023-02-29
    let value = TaggedValue::new(&[16, 0x07, 0xE7, 2, 29, 127, 127]).unwrap();
    assert_eq!(value.view::<DateView<'_>>().unwrap_err().code(), SYSE0002);
}

#[test]
fn test_wrong_view_for_tag() {
    let bytes = encode(&AtomicValue::Boolean(true));
    let value = TaggedValue::new(&bytes).unwrap();
    assert!(value.view::<StringView<'_>>().is_err());
}

#[test]
fn test_bind_out_of_range() {
    let bytes = [43u8, 1];
    assert_eq!(TaggedValue::bind(&bytes, 1, 4).unwrap_err().code(), SYSE0002);
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn test_empty_sequence() {
    let mut out = Vec::new();
    write_empty_sequence(&mut out);
    let value = TaggedValue::new(&out).unwrap();
    let sequence = value.view::<SequenceView<'_>>().unwrap();
    assert!(sequence.is_empty());
    assert_eq!(sequence.single().unwrap(), None);
}

#[test]
fn test_single_item_sequence_unwraps() {
    let item = encode(&AtomicValue::integer(42));
    let mut out = Vec::new();
    let mut builder = SequenceBuilder::new(&mut out);
    builder.push(&item).unwrap();
    assert_eq!(builder.finish().unwrap(), 1);

    let sequence = TaggedValue::new(&out).unwrap().view::<SequenceView<'_>>().unwrap();
    let single = sequence.single().unwrap().unwrap();
    assert_eq!(AtomicValue::from_tagged(single).unwrap(), AtomicValue::integer(42));
}

#[test]
fn test_sequence_with_trailing_garbage() {
    let mut out = Vec::new();
    write_empty_sequence(&mut out);
    out.push(0);
    let value = TaggedValue::new(&out).unwrap();
    assert_eq!(value.view::<SequenceView<'_>>().unwrap_err().code(), SYSE0002);
}

// ============================================================================
// Properties
// ============================================================================

fn date_strategy() -> impl Strategy<Value = XsDate> {
    (-9999i16..=9999, 1u8..=12, 1u8..=28, proptest::option::of(-14i8..=14))
        .prop_map(|(year, month, day, hour)| {
            XsDate::new(year, month, day).with_timezone(hour.and_then(|h| Timezone::new(h, 0)))
        })
}

proptest! {
    #[test]
    fn prop_decimal_round_trip(mantissa in -999_999_999_999_999_999i64..=999_999_999_999_999_999, scale in 0i8..=18) {
        let value = AtomicValue::decimal(mantissa, scale);
        let decoded = AtomicValue::decode(&encode(&value)).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn prop_date_round_trip(date in date_strategy()) {
        let value = AtomicValue::Date { tag: ValueTag::Date, value: date };
        let decoded = AtomicValue::decode(&encode(&value)).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn prop_time_round_trip(millis in 0i64..86_400_000) {
        let value = AtomicValue::Time(XsTime::from_millis_of_day(millis, None));
        let decoded = AtomicValue::decode(&encode(&value)).unwrap();
        prop_assert_eq!(decoded, value);
    }
}
