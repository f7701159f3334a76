//! Owned atomic values
//!
//! `AtomicValue` is the owned counterpart of the zero-copy views. It is used
//! to construct literals and to inspect results; the engines themselves read
//! through views and write through the codec writers.

use crate::decimal::XsDecimal;
use crate::sink::{ValueBuffer, ValueSink};
use crate::tag::ValueTag;
use crate::temporal::{XsDate, XsDateTime, XsDuration, XsTime};
use crate::view::{
    BinaryView, BooleanView, DateTimeView, DateView, DecimalView, DoubleView, DurationView, FloatView,
    IntegerView, QNameView, StringView, TaggedValue, TimeView,
};
use crate::writer;
use serde::{Deserialize, Serialize};
use xqvalue_diagnostics::{Result, XqError};

/// An expanded qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct XsQName {
    pub uri: String,
    pub prefix: String,
    pub local: String,
}

impl XsQName {
    pub fn new(uri: impl Into<String>, prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    /// A name with no namespace and no prefix
    pub fn local(local: impl Into<String>) -> Self {
        Self::new("", "", local)
    }
}

/// An owned atomic value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AtomicValue {
    /// String family, xs:untypedAtomic, xs:anyURI or xs:NOTATION
    String { tag: ValueTag, value: String },
    Boolean(bool),
    /// xs:integer or one of its derived types
    Integer { tag: ValueTag, value: i64 },
    Decimal(XsDecimal),
    Float(f32),
    Double(f64),
    DateTime(XsDateTime),
    /// xs:date or one of the gregorian fragment types
    Date { tag: ValueTag, value: XsDate },
    Time(XsTime),
    Duration(XsDuration),
    YearMonthDuration(i32),
    DayTimeDuration(i64),
    QName(XsQName),
    /// xs:hexBinary or xs:base64Binary
    Binary { tag: ValueTag, bytes: Vec<u8> },
}

impl AtomicValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String {
            tag: ValueTag::String,
            value: value.into(),
        }
    }

    pub fn untyped_atomic(value: impl Into<String>) -> Self {
        Self::String {
            tag: ValueTag::UntypedAtomic,
            value: value.into(),
        }
    }

    pub fn integer(value: i64) -> Self {
        Self::Integer {
            tag: ValueTag::Integer,
            value,
        }
    }

    /// A normalized decimal from mantissa and scale
    pub fn decimal(mantissa: i64, scale: i8) -> Self {
        Self::Decimal(XsDecimal::from_parts(mantissa, scale).normalized())
    }

    pub fn date(year: i16, month: u8, day: u8) -> Self {
        Self::Date {
            tag: ValueTag::Date,
            value: XsDate::new(year, month, day),
        }
    }

    /// The value's type tag
    pub fn tag(&self) -> ValueTag {
        match self {
            Self::String { tag, .. }
            | Self::Integer { tag, .. }
            | Self::Date { tag, .. }
            | Self::Binary { tag, .. } => *tag,
            Self::Boolean(_) => ValueTag::Boolean,
            Self::Decimal(_) => ValueTag::Decimal,
            Self::Float(_) => ValueTag::Float,
            Self::Double(_) => ValueTag::Double,
            Self::DateTime(_) => ValueTag::DateTime,
            Self::Time(_) => ValueTag::Time,
            Self::Duration(_) => ValueTag::Duration,
            Self::YearMonthDuration(_) => ValueTag::YearMonthDuration,
            Self::DayTimeDuration(_) => ValueTag::DayTimeDuration,
            Self::QName(_) => ValueTag::QName,
        }
    }

    /// Append the tagged encoding to a sink
    pub fn encode(&self, sink: &mut (impl ValueSink + ?Sized)) -> Result<()> {
        match self {
            Self::String { tag, value } => writer::write_string(sink, *tag, value)?,
            Self::Boolean(b) => writer::write_boolean(sink, *b),
            Self::Integer { tag, value } => {
                let (min, max) = tag
                    .integer_range()
                    .ok_or_else(|| XqError::internal(format!("{tag} is not an integer type")))?;
                if *value < min || *value > max {
                    return Err(XqError::internal(format!("{value} is outside the range of {tag}")));
                }
                writer::write_integer(sink, *tag, *value)?
            }
            Self::Decimal(d) => writer::write_decimal(sink, d.normalized()),
            Self::Float(f) => writer::write_float(sink, *f),
            Self::Double(d) => writer::write_double(sink, *d),
            Self::DateTime(dt) => writer::write_date_time(sink, dt),
            Self::Date { tag, value } => writer::write_date(sink, *tag, value)?,
            Self::Time(t) => writer::write_time(sink, t),
            Self::Duration(d) => writer::write_duration(sink, *d),
            Self::YearMonthDuration(m) => writer::write_year_month_duration(sink, *m),
            Self::DayTimeDuration(ms) => writer::write_day_time_duration(sink, *ms),
            Self::QName(q) => writer::write_qname(sink, &q.uri, &q.prefix, &q.local)?,
            Self::Binary { tag, bytes } => writer::write_binary(sink, *tag, bytes)?,
        }
        Ok(())
    }

    /// Encode into a fresh buffer
    pub fn to_buffer(&self) -> Result<ValueBuffer> {
        let mut buffer = ValueBuffer::new();
        self.encode(&mut buffer)?;
        Ok(buffer)
    }

    /// Decode one tagged value
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::from_tagged(TaggedValue::new(bytes)?)
    }

    /// Copy a viewed value out into an owned one
    pub fn from_tagged(value: TaggedValue<'_>) -> Result<Self> {
        let tag = value.tag();
        Ok(match tag {
            t if t.has_string_payload() => Self::String {
                tag,
                value: value.view::<StringView<'_>>()?.as_str().to_owned(),
            },
            t if t.is_integer_family() => Self::Integer {
                tag,
                value: value.view::<IntegerView<'_>>()?.get(),
            },
            t if t.has_date_payload() => Self::Date {
                tag,
                value: value.view::<DateView<'_>>()?.get(),
            },
            t if t.is_binary() => Self::Binary {
                tag,
                bytes: value.view::<BinaryView<'_>>()?.as_bytes().to_vec(),
            },
            ValueTag::Boolean => Self::Boolean(value.view::<BooleanView<'_>>()?.get()),
            ValueTag::Decimal => Self::Decimal(value.view::<DecimalView<'_>>()?.get()),
            ValueTag::Float => Self::Float(value.view::<FloatView<'_>>()?.get()),
            ValueTag::Double => Self::Double(value.view::<DoubleView<'_>>()?.get()),
            ValueTag::DateTime => Self::DateTime(value.view::<DateTimeView<'_>>()?.get()),
            ValueTag::Time => Self::Time(value.view::<TimeView<'_>>()?.get()),
            ValueTag::Duration => Self::Duration(value.view::<DurationView<'_>>()?.get()),
            ValueTag::YearMonthDuration => {
                Self::YearMonthDuration(value.view::<DurationView<'_>>()?.months())
            }
            ValueTag::DayTimeDuration => Self::DayTimeDuration(value.view::<DurationView<'_>>()?.millis()),
            ValueTag::QName => {
                let q = value.view::<QNameView<'_>>()?;
                Self::QName(XsQName::new(q.uri(), q.prefix(), q.local_name()))
            }
            other => {
                return Err(XqError::malformed(format!("{other} is not an atomic value")));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::Timezone;

    fn round_trip(value: AtomicValue) {
        let buffer = value.to_buffer().unwrap();
        assert_eq!(AtomicValue::decode(buffer.as_bytes()).unwrap(), value);
    }

    #[test]
    fn test_every_layout_reads_back() {
        round_trip(AtomicValue::string("héllo"));
        round_trip(AtomicValue::untyped_atomic(""));
        round_trip(AtomicValue::Boolean(true));
        round_trip(AtomicValue::Integer {
            tag: ValueTag::UnsignedShort,
            value: 65_535,
        });
        round_trip(AtomicValue::decimal(-125, 2));
        round_trip(AtomicValue::Float(1.5));
        round_trip(AtomicValue::Double(-0.0));
        round_trip(AtomicValue::DateTime(XsDateTime {
            year: -44,
            month: 3,
            day: 15,
            hour: 12,
            minute: 0,
            millisecond: 0,
            timezone: Some(Timezone::UTC),
        }));
        round_trip(AtomicValue::Date {
            tag: ValueTag::GMonthDay,
            value: XsDate::new(1972, 2, 29),
        });
        round_trip(AtomicValue::Time(XsTime::new(23, 59, 59_999)));
        round_trip(AtomicValue::Duration(XsDuration::new(-14, -3_600_000)));
        round_trip(AtomicValue::YearMonthDuration(13));
        round_trip(AtomicValue::DayTimeDuration(90_061_001));
        round_trip(AtomicValue::QName(XsQName::new("urn:x", "x", "item")));
        round_trip(AtomicValue::Binary {
            tag: ValueTag::HexBinary,
            bytes: vec![0, 255, 16],
        });
    }

    #[test]
    fn test_integer_range_checked_on_encode() {
        let value = AtomicValue::Integer {
            tag: ValueTag::PositiveInteger,
            value: 0,
        };
        assert!(value.to_buffer().is_err());
    }

    #[test]
    fn test_structural_tag_is_not_atomic() {
        let bytes = [ValueTag::TextNode.as_u8()];
        assert!(AtomicValue::decode(&bytes).is_err());
    }
}
