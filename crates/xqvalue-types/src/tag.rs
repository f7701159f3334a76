//! Value type tags
//!
//! Every tagged value starts with one of these bytes. Atomic tags share their
//! numbering with the built-in schema type ids; structural tags start at 100
//! and are opaque to this layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use xqvalue_diagnostics::XqError;

/// One-byte type tag of an encoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ValueTag {
    // Type hierarchy roots (never carried by a value)
    AnyType = 0,
    AnySimpleType = 1,
    Untyped = 2,
    AnyAtomicType = 3,

    // String family
    String = 4,
    NormalizedString = 5,
    Token = 6,
    Language = 7,
    NmToken = 8,
    Name = 9,
    NcName = 10,
    Id = 11,
    IdRef = 12,
    Entity = 13,
    UntypedAtomic = 14,

    // Date, time and durations
    DateTime = 15,
    Date = 16,
    Time = 17,
    Duration = 18,
    YearMonthDuration = 19,
    DayTimeDuration = 20,

    // Numerics
    Float = 22,
    Double = 23,
    Decimal = 24,
    Integer = 25,
    NonPositiveInteger = 26,
    NegativeInteger = 27,
    Long = 28,
    Int = 29,
    Short = 30,
    Byte = 31,
    NonNegativeInteger = 32,
    UnsignedLong = 33,
    UnsignedInt = 34,
    UnsignedShort = 35,
    UnsignedByte = 36,
    PositiveInteger = 37,

    // Gregorian fragments
    GYearMonth = 38,
    GYear = 39,
    GMonthDay = 40,
    GDay = 41,
    GMonth = 42,

    // Remaining primitives
    Boolean = 43,
    Base64Binary = 44,
    HexBinary = 45,
    AnyUri = 46,
    QName = 47,
    Notation = 48,

    // Structural tags
    Sequence = 100,
    DocumentNode = 101,
    ElementNode = 102,
    AttributeNode = 103,
    TextNode = 104,
    CommentNode = 105,
    PiNode = 106,
    NodeTree = 107,
    Array = 108,
    Object = 109,
}

impl ValueTag {
    /// Every tag that can prefix an atomic value
    pub const ATOMIC: [ValueTag; 44] = [
        Self::String,
        Self::NormalizedString,
        Self::Token,
        Self::Language,
        Self::NmToken,
        Self::Name,
        Self::NcName,
        Self::Id,
        Self::IdRef,
        Self::Entity,
        Self::UntypedAtomic,
        Self::DateTime,
        Self::Date,
        Self::Time,
        Self::Duration,
        Self::YearMonthDuration,
        Self::DayTimeDuration,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::Integer,
        Self::NonPositiveInteger,
        Self::NegativeInteger,
        Self::Long,
        Self::Int,
        Self::Short,
        Self::Byte,
        Self::NonNegativeInteger,
        Self::UnsignedLong,
        Self::UnsignedInt,
        Self::UnsignedShort,
        Self::UnsignedByte,
        Self::PositiveInteger,
        Self::GYearMonth,
        Self::GYear,
        Self::GMonthDay,
        Self::GDay,
        Self::GMonth,
        Self::Boolean,
        Self::Base64Binary,
        Self::HexBinary,
        Self::AnyUri,
        Self::QName,
        Self::Notation,
    ];

    /// The primitive types the cast and arithmetic matrices are keyed on
    pub const PRIMITIVES: [ValueTag; 23] = [
        Self::UntypedAtomic,
        Self::String,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::Integer,
        Self::Duration,
        Self::YearMonthDuration,
        Self::DayTimeDuration,
        Self::DateTime,
        Self::Time,
        Self::Date,
        Self::GYearMonth,
        Self::GYear,
        Self::GMonthDay,
        Self::GDay,
        Self::GMonth,
        Self::Boolean,
        Self::Base64Binary,
        Self::HexBinary,
        Self::AnyUri,
        Self::QName,
        Self::Notation,
    ];

    /// Decode a tag byte
    pub const fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::AnyType,
            1 => Self::AnySimpleType,
            2 => Self::Untyped,
            3 => Self::AnyAtomicType,
            4 => Self::String,
            5 => Self::NormalizedString,
            6 => Self::Token,
            7 => Self::Language,
            8 => Self::NmToken,
            9 => Self::Name,
            10 => Self::NcName,
            11 => Self::Id,
            12 => Self::IdRef,
            13 => Self::Entity,
            14 => Self::UntypedAtomic,
            15 => Self::DateTime,
            16 => Self::Date,
            17 => Self::Time,
            18 => Self::Duration,
            19 => Self::YearMonthDuration,
            20 => Self::DayTimeDuration,
            22 => Self::Float,
            23 => Self::Double,
            24 => Self::Decimal,
            25 => Self::Integer,
            26 => Self::NonPositiveInteger,
            27 => Self::NegativeInteger,
            28 => Self::Long,
            29 => Self::Int,
            30 => Self::Short,
            31 => Self::Byte,
            32 => Self::NonNegativeInteger,
            33 => Self::UnsignedLong,
            34 => Self::UnsignedInt,
            35 => Self::UnsignedShort,
            36 => Self::UnsignedByte,
            37 => Self::PositiveInteger,
            38 => Self::GYearMonth,
            39 => Self::GYear,
            40 => Self::GMonthDay,
            41 => Self::GDay,
            42 => Self::GMonth,
            43 => Self::Boolean,
            44 => Self::Base64Binary,
            45 => Self::HexBinary,
            46 => Self::AnyUri,
            47 => Self::QName,
            48 => Self::Notation,
            100 => Self::Sequence,
            101 => Self::DocumentNode,
            102 => Self::ElementNode,
            103 => Self::AttributeNode,
            104 => Self::TextNode,
            105 => Self::CommentNode,
            106 => Self::PiNode,
            107 => Self::NodeTree,
            108 => Self::Array,
            109 => Self::Object,
            _ => return None,
        })
    }

    /// The tag byte
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// The schema type name, e.g. `xs:integer`
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AnyType => "xs:anyType",
            Self::AnySimpleType => "xs:anySimpleType",
            Self::Untyped => "xs:untyped",
            Self::AnyAtomicType => "xs:anyAtomicType",
            Self::String => "xs:string",
            Self::NormalizedString => "xs:normalizedString",
            Self::Token => "xs:token",
            Self::Language => "xs:language",
            Self::NmToken => "xs:NMTOKEN",
            Self::Name => "xs:Name",
            Self::NcName => "xs:NCName",
            Self::Id => "xs:ID",
            Self::IdRef => "xs:IDREF",
            Self::Entity => "xs:ENTITY",
            Self::UntypedAtomic => "xs:untypedAtomic",
            Self::DateTime => "xs:dateTime",
            Self::Date => "xs:date",
            Self::Time => "xs:time",
            Self::Duration => "xs:duration",
            Self::YearMonthDuration => "xs:yearMonthDuration",
            Self::DayTimeDuration => "xs:dayTimeDuration",
            Self::Float => "xs:float",
            Self::Double => "xs:double",
            Self::Decimal => "xs:decimal",
            Self::Integer => "xs:integer",
            Self::NonPositiveInteger => "xs:nonPositiveInteger",
            Self::NegativeInteger => "xs:negativeInteger",
            Self::Long => "xs:long",
            Self::Int => "xs:int",
            Self::Short => "xs:short",
            Self::Byte => "xs:byte",
            Self::NonNegativeInteger => "xs:nonNegativeInteger",
            Self::UnsignedLong => "xs:unsignedLong",
            Self::UnsignedInt => "xs:unsignedInt",
            Self::UnsignedShort => "xs:unsignedShort",
            Self::UnsignedByte => "xs:unsignedByte",
            Self::PositiveInteger => "xs:positiveInteger",
            Self::GYearMonth => "xs:gYearMonth",
            Self::GYear => "xs:gYear",
            Self::GMonthDay => "xs:gMonthDay",
            Self::GDay => "xs:gDay",
            Self::GMonth => "xs:gMonth",
            Self::Boolean => "xs:boolean",
            Self::Base64Binary => "xs:base64Binary",
            Self::HexBinary => "xs:hexBinary",
            Self::AnyUri => "xs:anyURI",
            Self::QName => "xs:QName",
            Self::Notation => "xs:NOTATION",
            Self::Sequence => "sequence",
            Self::DocumentNode => "document-node()",
            Self::ElementNode => "element()",
            Self::AttributeNode => "attribute()",
            Self::TextNode => "text()",
            Self::CommentNode => "comment()",
            Self::PiNode => "processing-instruction()",
            Self::NodeTree => "node-tree",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Check if this tag prefixes an atomic value
    pub const fn is_atomic(&self) -> bool {
        let byte = *self as u8;
        byte >= Self::String as u8 && byte <= Self::Notation as u8
    }

    /// Check if this is a structural (sequence, node, array, object) tag
    pub const fn is_structural(&self) -> bool {
        *self as u8 >= Self::Sequence as u8
    }

    /// Check if this is one of the types the cast and arithmetic matrices
    /// dispatch on
    pub const fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::UntypedAtomic
                | Self::String
                | Self::Float
                | Self::Double
                | Self::Decimal
                | Self::Integer
                | Self::Duration
                | Self::YearMonthDuration
                | Self::DayTimeDuration
                | Self::DateTime
                | Self::Time
                | Self::Date
                | Self::GYearMonth
                | Self::GYear
                | Self::GMonthDay
                | Self::GDay
                | Self::GMonth
                | Self::Boolean
                | Self::Base64Binary
                | Self::HexBinary
                | Self::AnyUri
                | Self::QName
                | Self::Notation
        )
    }

    /// Check if this is xs:integer or one of its derived types
    pub const fn is_integer_family(&self) -> bool {
        let byte = *self as u8;
        byte >= Self::Integer as u8 && byte <= Self::PositiveInteger as u8
    }

    /// Check if this is xs:string or one of its derived types
    pub const fn is_string_family(&self) -> bool {
        let byte = *self as u8;
        byte >= Self::String as u8 && byte <= Self::Entity as u8
    }

    /// Check if values with this tag carry a length-prefixed UTF-8 payload
    pub const fn has_string_payload(&self) -> bool {
        self.is_string_family() || matches!(self, Self::UntypedAtomic | Self::AnyUri | Self::Notation)
    }

    /// Check if this tag is numeric
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Float | Self::Double | Self::Decimal) || self.is_integer_family()
    }

    /// Check if this is one of the five gregorian fragment types
    pub const fn is_gregorian(&self) -> bool {
        matches!(
            self,
            Self::GYearMonth | Self::GYear | Self::GMonthDay | Self::GDay | Self::GMonth
        )
    }

    /// Check if values with this tag use the date payload layout
    pub const fn has_date_payload(&self) -> bool {
        matches!(self, Self::Date) || self.is_gregorian()
    }

    /// Check if this is a duration tag
    pub const fn is_duration(&self) -> bool {
        matches!(
            self,
            Self::Duration | Self::YearMonthDuration | Self::DayTimeDuration
        )
    }

    /// Check if this is a binary tag
    pub const fn is_binary(&self) -> bool {
        matches!(self, Self::Base64Binary | Self::HexBinary)
    }

    /// Payload width in bytes of an integer-family tag
    pub const fn integer_width(&self) -> Option<usize> {
        match self {
            Self::Byte => Some(1),
            Self::Short | Self::UnsignedByte => Some(2),
            Self::Int | Self::UnsignedShort => Some(4),
            Self::Integer
            | Self::NonPositiveInteger
            | Self::NegativeInteger
            | Self::Long
            | Self::NonNegativeInteger
            | Self::UnsignedLong
            | Self::UnsignedInt
            | Self::PositiveInteger => Some(8),
            _ => None,
        }
    }

    /// Inclusive value range of an integer-family tag
    ///
    /// Values are carried as signed 64-bit integers, so `xs:unsignedLong`
    /// and the unbounded types are capped at the `i64` range.
    pub const fn integer_range(&self) -> Option<(i64, i64)> {
        match self {
            Self::Integer | Self::Long => Some((i64::MIN, i64::MAX)),
            Self::NonPositiveInteger => Some((i64::MIN, 0)),
            Self::NegativeInteger => Some((i64::MIN, -1)),
            Self::Int => Some((i32::MIN as i64, i32::MAX as i64)),
            Self::Short => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
            Self::NonNegativeInteger | Self::UnsignedLong => Some((0, i64::MAX)),
            Self::UnsignedInt => Some((0, u32::MAX as i64)),
            Self::UnsignedShort => Some((0, u16::MAX as i64)),
            Self::UnsignedByte => Some((0, u8::MAX as i64)),
            Self::PositiveInteger => Some((1, i64::MAX)),
            _ => None,
        }
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for ValueTag {
    type Error = XqError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::from_u8(byte).ok_or_else(|| XqError::malformed(format!("unknown value tag {byte}")))
    }
}

impl From<ValueTag> for u8 {
    fn from(tag: ValueTag) -> Self {
        tag as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_byte_round_trip() {
        for tag in ValueTag::ATOMIC {
            assert_eq!(ValueTag::from_u8(tag.as_u8()), Some(tag));
        }
        assert_eq!(ValueTag::from_u8(21), None);
        assert_eq!(ValueTag::from_u8(200), None);
    }

    #[test]
    fn test_families() {
        assert!(ValueTag::UnsignedByte.is_integer_family());
        assert!(!ValueTag::Decimal.is_integer_family());
        assert!(ValueTag::Entity.is_string_family());
        assert!(!ValueTag::UntypedAtomic.is_string_family());
        assert!(ValueTag::UntypedAtomic.has_string_payload());
        assert!(ValueTag::GMonthDay.has_date_payload());
        assert!(ValueTag::NodeTree.is_structural());
        assert!(!ValueTag::AnyAtomicType.is_atomic());
    }

    #[test]
    fn test_every_primitive_is_atomic() {
        for tag in ValueTag::PRIMITIVES {
            assert!(tag.is_primitive());
            assert!(tag.is_atomic());
        }
    }

    #[test]
    fn test_integer_widths_cover_ranges() {
        for tag in ValueTag::ATOMIC.iter().filter(|t| t.is_integer_family()) {
            let width = tag.integer_width().unwrap();
            let (min, max) = tag.integer_range().unwrap();
            let bits = (width * 8) as u32;
            if bits < 64 {
                assert!(min >= -(1i64 << (bits - 1)), "{tag}");
                assert!(max < (1i64 << (bits - 1)), "{tag}");
            }
        }
    }
}
