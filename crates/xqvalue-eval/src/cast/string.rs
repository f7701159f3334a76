//! Casts into the string-like types and xs:QName

use super::canonical;
use super::lexical;
use super::text_of;
use crate::error::{EvalError, EvalResult};
use std::borrow::Cow;
use xqvalue_types::writer;
use xqvalue_types::{QNameView, TaggedValue, ValueSink, ValueTag};

/// Apply the target's whitespace facet and lexical pattern, then write
///
/// xs:string and xs:untypedAtomic preserve whitespace, xs:normalizedString
/// replaces it, and every other string-like type collapses it.
pub(crate) fn write_string_target(sink: &mut dyn ValueSink, target: ValueTag, text: &str) -> EvalResult<()> {
    let normalized: Cow<'_, str> = match target {
        ValueTag::String | ValueTag::UntypedAtomic => Cow::Borrowed(text),
        ValueTag::NormalizedString => Cow::Owned(lexical::replace_whitespace(text)),
        _ => Cow::Owned(lexical::collapse_whitespace(text)),
    };
    let valid = match target {
        ValueTag::Language => lexical::is_language(&normalized)?,
        ValueTag::NmToken => lexical::is_nmtoken(&normalized)?,
        ValueTag::Name => lexical::is_name(&normalized)?,
        ValueTag::NcName | ValueTag::Id | ValueTag::IdRef | ValueTag::Entity => lexical::is_ncname(&normalized)?,
        _ => true,
    };
    if !valid {
        return Err(EvalError::invalid_lexical(target.name(), text));
    }
    writer::write_string(sink, target, &normalized)?;
    Ok(())
}

/// Any atomic value to its canonical lexical form
pub(super) fn to_string_like(value: TaggedValue<'_>, target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    let text = canonical::lexical_form(value)?;
    write_string_target(sink, target, &text)
}

/// `prefix:local` or `local`; no namespace bindings are in scope here, so
/// the namespace URI is left empty
pub(super) fn qname_from_text(value: TaggedValue<'_>, _target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    let (prefix, local) = lexical::parse_qname(text_of(value)?)?;
    writer::write_qname(sink, "", prefix, local)?;
    Ok(())
}

pub(super) fn qname_from_qname(value: TaggedValue<'_>, _target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    let qname = value.view::<QNameView<'_>>()?;
    writer::write_qname(sink, qname.uri(), qname.prefix(), qname.local_name())?;
    Ok(())
}

pub(super) fn notation_from_notation(
    value: TaggedValue<'_>,
    target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    writer::write_string(sink, target, text_of(value)?)?;
    Ok(())
}
