//! Casts into xs:base64Binary and xs:hexBinary
//!
//! Between the two binary types only the tag changes; the octets are the
//! value.

use super::lexical;
use super::text_of;
use crate::error::EvalResult;
use xqvalue_types::writer;
use xqvalue_types::{BinaryView, TaggedValue, ValueSink, ValueTag};

pub(super) fn base64_from_text(value: TaggedValue<'_>, target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    let bytes = lexical::parse_base64_binary(text_of(value)?)?;
    writer::write_binary(sink, target, &bytes)?;
    Ok(())
}

pub(super) fn hex_from_text(value: TaggedValue<'_>, target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    let bytes = lexical::parse_hex_binary(text_of(value)?)?;
    writer::write_binary(sink, target, &bytes)?;
    Ok(())
}

pub(super) fn from_binary(value: TaggedValue<'_>, target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    let bytes = value.view::<BinaryView<'_>>()?.as_bytes();
    writer::write_binary(sink, target, bytes)?;
    Ok(())
}
