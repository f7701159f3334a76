//! Zero-copy read views over encoded values
//!
//! A view borrows a byte range and interprets it in place; nothing is copied.
//! Views are validated when they are bound, so getters never read outside the
//! bound range. A view can be rebound to another range with `set`, which
//! lets an evaluator keep one view per operand and reuse it for every tuple.

use crate::decimal::XsDecimal;
use crate::tag::ValueTag;
use crate::temporal::{Timezone, XsDate, XsDateTime, XsDuration, XsTime};
use xqvalue_diagnostics::{Result, XqError};

// ============================================================================
// Byte readers
// ============================================================================

fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

fn read_i16(bytes: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes(read_array(bytes, offset))
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_be_bytes(read_array(bytes, offset))
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes(read_array(bytes, offset))
}

fn read_i64(bytes: &[u8], offset: usize) -> i64 {
    i64::from_be_bytes(read_array(bytes, offset))
}

fn expect_len(kind: &str, payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() != expected {
        return Err(XqError::malformed(format!(
            "{kind} payload must be {expected} bytes, found {}",
            payload.len()
        )));
    }
    Ok(())
}

fn read_timezone(kind: &str, payload: &[u8], offset: usize) -> Result<Option<Timezone>> {
    Timezone::from_wire(payload[offset] as i8, payload[offset + 1] as i8).map_err(|(h, m)| {
        XqError::malformed(format!("{kind} has invalid timezone bytes ({h}, {m})"))
    })
}

/// Split one length-prefixed field off the front of `bytes`
fn split_prefixed<'a>(kind: &str, bytes: &'a [u8]) -> Result<(&'a [u8], &'a [u8])> {
    if bytes.len() < 4 {
        return Err(XqError::malformed(format!("{kind} length prefix is truncated")));
    }
    let len = read_u32(bytes, 0) as usize;
    let rest = &bytes[4..];
    if rest.len() < len {
        return Err(XqError::malformed(format!(
            "{kind} declares {len} bytes but only {} remain",
            rest.len()
        )));
    }
    Ok(rest.split_at(len))
}

fn utf8<'a>(kind: &str, bytes: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|e| XqError::malformed(format!("{kind} is not valid UTF-8: {e}")))
}

// ============================================================================
// Tagged value
// ============================================================================

/// A tag byte plus its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedValue<'a> {
    tag: ValueTag,
    bytes: &'a [u8],
}

impl<'a> TaggedValue<'a> {
    /// Bind to a whole slice holding exactly one tagged value
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let first = *bytes
            .first()
            .ok_or_else(|| XqError::malformed("empty buffer has no value tag"))?;
        Ok(Self {
            tag: ValueTag::try_from(first)?,
            bytes,
        })
    }

    /// Bind to `length` bytes of `buffer` starting at `offset`
    pub fn bind(buffer: &'a [u8], offset: usize, length: usize) -> Result<Self> {
        let range = offset
            .checked_add(length)
            .and_then(|end| buffer.get(offset..end))
            .ok_or_else(|| {
                XqError::malformed(format!(
                    "range {offset}+{length} is outside a buffer of {} bytes",
                    buffer.len()
                ))
            })?;
        Self::new(range)
    }

    /// Rebind this view to another range
    pub fn set(&mut self, buffer: &'a [u8], offset: usize, length: usize) -> Result<()> {
        *self = Self::bind(buffer, offset, length)?;
        Ok(())
    }

    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    /// The payload after the tag byte
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[1..]
    }

    /// The whole encoding, tag included
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Interpret the payload through a typed view
    pub fn view<V: ValueView<'a>>(&self) -> Result<V> {
        if !V::accepts(self.tag) {
            return Err(XqError::malformed(format!(
                "{} view cannot read a {} value",
                V::KIND,
                self.tag
            )));
        }
        V::bind_payload(self.tag, self.payload())
    }
}

/// A typed zero-copy view over a value payload
pub trait ValueView<'a>: Sized {
    /// Name used in error messages
    const KIND: &'static str;

    /// Check if a value with this tag can be read through this view
    fn accepts(tag: ValueTag) -> bool;

    /// Validate and bind a payload
    fn bind_payload(tag: ValueTag, payload: &'a [u8]) -> Result<Self>;

    /// Rebind to another payload
    fn set(&mut self, tag: ValueTag, payload: &'a [u8]) -> Result<()> {
        if !Self::accepts(tag) {
            return Err(XqError::malformed(format!("{} view cannot read a {tag} value", Self::KIND)));
        }
        *self = Self::bind_payload(tag, payload)?;
        Ok(())
    }
}

// ============================================================================
// Scalar views
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct BooleanView<'a> {
    bytes: &'a [u8],
}

impl BooleanView<'_> {
    pub fn get(&self) -> bool {
        self.bytes[0] != 0
    }
}

impl<'a> ValueView<'a> for BooleanView<'a> {
    const KIND: &'static str = "xs:boolean";

    fn accepts(tag: ValueTag) -> bool {
        tag == ValueTag::Boolean
    }

    fn bind_payload(_tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        expect_len(Self::KIND, payload, 1)?;
        Ok(Self { bytes: payload })
    }
}

/// View over any integer-family value; the width follows the tag
#[derive(Debug, Clone, Copy)]
pub struct IntegerView<'a> {
    tag: ValueTag,
    bytes: &'a [u8],
}

impl IntegerView<'_> {
    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    pub fn get(&self) -> i64 {
        match self.bytes.len() {
            1 => self.bytes[0] as i8 as i64,
            2 => read_i16(self.bytes, 0) as i64,
            4 => read_i32(self.bytes, 0) as i64,
            _ => read_i64(self.bytes, 0),
        }
    }
}

impl<'a> ValueView<'a> for IntegerView<'a> {
    const KIND: &'static str = "xs:integer";

    fn accepts(tag: ValueTag) -> bool {
        tag.is_integer_family()
    }

    fn bind_payload(tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        let width = tag
            .integer_width()
            .ok_or_else(|| XqError::malformed(format!("{tag} is not an integer type")))?;
        expect_len(tag.name(), payload, width)?;
        Ok(Self { tag, bytes: payload })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FloatView<'a> {
    bytes: &'a [u8],
}

impl FloatView<'_> {
    pub fn get(&self) -> f32 {
        f32::from_be_bytes(read_array(self.bytes, 0))
    }
}

impl<'a> ValueView<'a> for FloatView<'a> {
    const KIND: &'static str = "xs:float";

    fn accepts(tag: ValueTag) -> bool {
        tag == ValueTag::Float
    }

    fn bind_payload(_tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        expect_len(Self::KIND, payload, 4)?;
        Ok(Self { bytes: payload })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DoubleView<'a> {
    bytes: &'a [u8],
}

impl DoubleView<'_> {
    pub fn get(&self) -> f64 {
        f64::from_be_bytes(read_array(self.bytes, 0))
    }
}

impl<'a> ValueView<'a> for DoubleView<'a> {
    const KIND: &'static str = "xs:double";

    fn accepts(tag: ValueTag) -> bool {
        tag == ValueTag::Double
    }

    fn bind_payload(_tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        expect_len(Self::KIND, payload, 8)?;
        Ok(Self { bytes: payload })
    }
}

/// View over an xs:decimal: scale byte then 8-byte mantissa
#[derive(Debug, Clone, Copy)]
pub struct DecimalView<'a> {
    bytes: &'a [u8],
}

impl DecimalView<'_> {
    pub fn scale(&self) -> i8 {
        self.bytes[0] as i8
    }

    pub fn mantissa(&self) -> i64 {
        read_i64(self.bytes, 1)
    }

    pub fn get(&self) -> XsDecimal {
        XsDecimal::from_parts(self.mantissa(), self.scale())
    }

    pub fn digit_count(&self) -> u32 {
        self.get().digit_count()
    }
}

impl<'a> ValueView<'a> for DecimalView<'a> {
    const KIND: &'static str = "xs:decimal";

    fn accepts(tag: ValueTag) -> bool {
        tag == ValueTag::Decimal
    }

    fn bind_payload(_tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        expect_len(Self::KIND, payload, 9)?;
        Ok(Self { bytes: payload })
    }
}

// ============================================================================
// Temporal views
// ============================================================================

/// View over an xs:dateTime
#[derive(Debug, Clone, Copy)]
pub struct DateTimeView<'a> {
    bytes: &'a [u8],
    timezone: Option<Timezone>,
}

impl DateTimeView<'_> {
    pub fn year(&self) -> i16 {
        read_i16(self.bytes, 0)
    }

    pub fn month(&self) -> u8 {
        self.bytes[2]
    }

    pub fn day(&self) -> u8 {
        self.bytes[3]
    }

    pub fn hour(&self) -> u8 {
        self.bytes[4]
    }

    pub fn minute(&self) -> u8 {
        self.bytes[5]
    }

    /// Seconds and milliseconds within the minute
    pub fn millisecond(&self) -> i32 {
        read_i32(self.bytes, 6)
    }

    pub fn timezone(&self) -> Option<Timezone> {
        self.timezone
    }

    pub fn get(&self) -> XsDateTime {
        XsDateTime {
            year: self.year(),
            month: self.month(),
            day: self.day(),
            hour: self.hour(),
            minute: self.minute(),
            millisecond: self.millisecond(),
            timezone: self.timezone,
        }
    }
}

impl<'a> ValueView<'a> for DateTimeView<'a> {
    const KIND: &'static str = "xs:dateTime";

    fn accepts(tag: ValueTag) -> bool {
        tag == ValueTag::DateTime
    }

    fn bind_payload(_tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        expect_len(Self::KIND, payload, 12)?;
        let timezone = read_timezone(Self::KIND, payload, 10)?;
        let view = Self {
            bytes: payload,
            timezone,
        };
        if !view.get().is_valid() {
            return Err(XqError::malformed("xs:dateTime fields are outside the calendar"));
        }
        Ok(view)
    }
}

/// View over an xs:date or any gregorian fragment type
#[derive(Debug, Clone, Copy)]
pub struct DateView<'a> {
    tag: ValueTag,
    bytes: &'a [u8],
    timezone: Option<Timezone>,
}

impl DateView<'_> {
    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    pub fn year(&self) -> i16 {
        read_i16(self.bytes, 0)
    }

    pub fn month(&self) -> u8 {
        self.bytes[2]
    }

    pub fn day(&self) -> u8 {
        self.bytes[3]
    }

    pub fn timezone(&self) -> Option<Timezone> {
        self.timezone
    }

    pub fn get(&self) -> XsDate {
        XsDate {
            year: self.year(),
            month: self.month(),
            day: self.day(),
            timezone: self.timezone,
        }
    }
}

impl<'a> ValueView<'a> for DateView<'a> {
    const KIND: &'static str = "xs:date";

    fn accepts(tag: ValueTag) -> bool {
        tag.has_date_payload()
    }

    fn bind_payload(tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        expect_len(tag.name(), payload, 6)?;
        let timezone = read_timezone(tag.name(), payload, 4)?;
        let view = Self {
            tag,
            bytes: payload,
            timezone,
        };
        if !view.get().is_valid() {
            return Err(XqError::malformed(format!("{tag} fields are outside the calendar")));
        }
        Ok(view)
    }
}

/// View over an xs:time
#[derive(Debug, Clone, Copy)]
pub struct TimeView<'a> {
    bytes: &'a [u8],
    timezone: Option<Timezone>,
}

impl TimeView<'_> {
    pub fn hour(&self) -> u8 {
        self.bytes[0]
    }

    pub fn minute(&self) -> u8 {
        self.bytes[1]
    }

    pub fn millisecond(&self) -> i32 {
        read_i32(self.bytes, 2)
    }

    pub fn timezone(&self) -> Option<Timezone> {
        self.timezone
    }

    pub fn get(&self) -> XsTime {
        XsTime {
            hour: self.hour(),
            minute: self.minute(),
            millisecond: self.millisecond(),
            timezone: self.timezone,
        }
    }
}

impl<'a> ValueView<'a> for TimeView<'a> {
    const KIND: &'static str = "xs:time";

    fn accepts(tag: ValueTag) -> bool {
        tag == ValueTag::Time
    }

    fn bind_payload(_tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        expect_len(Self::KIND, payload, 8)?;
        let timezone = read_timezone(Self::KIND, payload, 6)?;
        let view = Self {
            bytes: payload,
            timezone,
        };
        if !view.get().is_valid() {
            return Err(XqError::malformed("xs:time fields are out of range"));
        }
        Ok(view)
    }
}

/// View over any duration tag
///
/// An xs:yearMonthDuration reads as zero milliseconds and an
/// xs:dayTimeDuration as zero months.
#[derive(Debug, Clone, Copy)]
pub struct DurationView<'a> {
    tag: ValueTag,
    bytes: &'a [u8],
}

impl DurationView<'_> {
    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    pub fn months(&self) -> i32 {
        match self.tag {
            ValueTag::Duration | ValueTag::YearMonthDuration => read_i32(self.bytes, 0),
            _ => 0,
        }
    }

    pub fn millis(&self) -> i64 {
        match self.tag {
            ValueTag::Duration => read_i64(self.bytes, 4),
            ValueTag::DayTimeDuration => read_i64(self.bytes, 0),
            _ => 0,
        }
    }

    pub fn get(&self) -> XsDuration {
        XsDuration::new(self.months(), self.millis())
    }
}

impl<'a> ValueView<'a> for DurationView<'a> {
    const KIND: &'static str = "xs:duration";

    fn accepts(tag: ValueTag) -> bool {
        tag.is_duration()
    }

    fn bind_payload(tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        let width = match tag {
            ValueTag::Duration => 12,
            ValueTag::YearMonthDuration => 4,
            _ => 8,
        };
        expect_len(tag.name(), payload, width)?;
        let view = Self { tag, bytes: payload };
        if !view.get().is_valid() {
            return Err(XqError::malformed("xs:duration halves carry opposite signs"));
        }
        Ok(view)
    }
}

// ============================================================================
// Variable-length views
// ============================================================================

/// View over a length-prefixed UTF-8 payload (string family, untypedAtomic,
/// anyURI, NOTATION)
#[derive(Debug, Clone, Copy)]
pub struct StringView<'a> {
    value: &'a str,
}

impl<'a> StringView<'a> {
    pub fn as_str(&self) -> &'a str {
        self.value
    }

    /// Length in UTF-8 bytes
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl<'a> ValueView<'a> for StringView<'a> {
    const KIND: &'static str = "xs:string";

    fn accepts(tag: ValueTag) -> bool {
        tag.has_string_payload()
    }

    fn bind_payload(tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        let (body, rest) = split_prefixed(tag.name(), payload)?;
        if !rest.is_empty() {
            return Err(XqError::malformed(format!("{tag} has {} trailing bytes", rest.len())));
        }
        Ok(Self {
            value: utf8(tag.name(), body)?,
        })
    }
}

/// View over an xs:QName: namespace URI, prefix and local name
#[derive(Debug, Clone, Copy)]
pub struct QNameView<'a> {
    uri: &'a str,
    prefix: &'a str,
    local: &'a str,
}

impl<'a> QNameView<'a> {
    pub fn uri(&self) -> &'a str {
        self.uri
    }

    pub fn prefix(&self) -> &'a str {
        self.prefix
    }

    pub fn local_name(&self) -> &'a str {
        self.local
    }
}

impl<'a> ValueView<'a> for QNameView<'a> {
    const KIND: &'static str = "xs:QName";

    fn accepts(tag: ValueTag) -> bool {
        tag == ValueTag::QName
    }

    fn bind_payload(_tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        let (uri, rest) = split_prefixed("xs:QName uri", payload)?;
        let (prefix, rest) = split_prefixed("xs:QName prefix", rest)?;
        let (local, rest) = split_prefixed("xs:QName local name", rest)?;
        if !rest.is_empty() {
            return Err(XqError::malformed("xs:QName has trailing bytes"));
        }
        Ok(Self {
            uri: utf8("xs:QName uri", uri)?,
            prefix: utf8("xs:QName prefix", prefix)?,
            local: utf8("xs:QName local name", local)?,
        })
    }
}

/// View over xs:hexBinary or xs:base64Binary octets
#[derive(Debug, Clone, Copy)]
pub struct BinaryView<'a> {
    bytes: &'a [u8],
}

impl<'a> BinaryView<'a> {
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl<'a> ValueView<'a> for BinaryView<'a> {
    const KIND: &'static str = "binary";

    fn accepts(tag: ValueTag) -> bool {
        tag.is_binary()
    }

    fn bind_payload(tag: ValueTag, payload: &'a [u8]) -> Result<Self> {
        let (body, rest) = split_prefixed(tag.name(), payload)?;
        if !rest.is_empty() {
            return Err(XqError::malformed(format!("{tag} has trailing bytes")));
        }
        Ok(Self { bytes: body })
    }
}

pub(crate) fn split_length_prefixed<'a>(kind: &str, bytes: &'a [u8]) -> Result<(&'a [u8], &'a [u8])> {
    split_prefixed(kind, bytes)
}

pub(crate) fn read_count(bytes: &[u8]) -> u32 {
    read_u32(bytes, 0)
}
