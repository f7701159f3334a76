//! XQuery atomic value representation
//!
//! This crate defines how every XML Schema atomic value is laid out as a
//! self-describing byte sequence and how it is read back without copying:
//! - Type tags for atomic and structural values
//! - Fixed-width big-endian payload writers and an append-only output sink
//! - Zero-copy, rebindable views per payload layout
//! - Owned values for literal construction and inspection
//! - The schema type registry and primitive type resolution

pub mod calendar;
pub mod decimal;
pub mod registry;
pub mod sequence;
pub mod sink;
pub mod tag;
pub mod temporal;
pub mod value;
pub mod view;
pub mod writer;

pub use decimal::{DECIMAL_PRECISION, XsDecimal};
pub use registry::{TypeId, TypeInfo, TypeRegistry};
pub use sequence::{SequenceBuilder, SequenceView, write_empty_sequence};
pub use sink::{ValueBuffer, ValueSink};
pub use tag::ValueTag;
pub use temporal::{Timezone, XsDate, XsDateTime, XsDuration, XsTime};
pub use value::{AtomicValue, XsQName};
pub use view::{
    BinaryView, BooleanView, DateTimeView, DateView, DecimalView, DoubleView, DurationView, FloatView,
    IntegerView, QNameView, StringView, TaggedValue, TimeView, ValueView,
};
