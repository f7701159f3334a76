//! Casts into xs:duration, xs:yearMonthDuration and xs:dayTimeDuration

use super::lexical;
use super::text_of;
use crate::error::{EvalError, EvalResult};
use xqvalue_types::writer;
use xqvalue_types::{DurationView, TaggedValue, ValueSink, ValueTag, XsDuration};

fn write_duration_target(sink: &mut dyn ValueSink, target: ValueTag, value: XsDuration) -> EvalResult<()> {
    match target {
        ValueTag::Duration => writer::write_duration(sink, value),
        ValueTag::YearMonthDuration => writer::write_year_month_duration(sink, value.months),
        ValueTag::DayTimeDuration => writer::write_day_time_duration(sink, value.millis),
        other => return Err(EvalError::internal(format!("{other} is not a duration type"))),
    }
    Ok(())
}

pub(super) fn from_text(value: TaggedValue<'_>, target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    let text = text_of(value)?;
    let duration = match target {
        ValueTag::YearMonthDuration => XsDuration::new(lexical::parse_year_month_duration(text)?, 0),
        ValueTag::DayTimeDuration => XsDuration::new(0, lexical::parse_day_time_duration(text)?),
        _ => lexical::parse_duration(text)?,
    };
    write_duration_target(sink, target, duration)
}

/// Between duration kinds the half the target does not carry is dropped
pub(super) fn from_duration(value: TaggedValue<'_>, target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    let duration = value.view::<DurationView<'_>>()?.get();
    write_duration_target(sink, target, duration)
}
