//! Casts into xs:dateTime, xs:date, xs:time and the gregorian types

use super::lexical;
use super::text_of;
use crate::error::{EvalError, EvalResult};
use xqvalue_types::writer;
use xqvalue_types::{DateTimeView, DateView, TaggedValue, TimeView, ValueSink, ValueTag, XsDate};

pub(super) fn date_time_from_text(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    writer::write_date_time(sink, &lexical::parse_date_time(text_of(value)?)?);
    Ok(())
}

pub(super) fn date_time_from_date_time(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    writer::write_date_time(sink, &value.view::<DateTimeView<'_>>()?.get());
    Ok(())
}

/// A date becomes the instant at midnight starting that day
pub(super) fn date_time_from_date(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    let date = value.view::<DateView<'_>>()?.get();
    writer::write_date_time(sink, &date.at_midnight());
    Ok(())
}

pub(super) fn date_from_text(value: TaggedValue<'_>, _target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    writer::write_date(sink, ValueTag::Date, &lexical::parse_date(text_of(value)?)?)?;
    Ok(())
}

pub(super) fn date_from_date_time(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    let date_time = value.view::<DateTimeView<'_>>()?.get();
    writer::write_date(sink, ValueTag::Date, &date_time.date())?;
    Ok(())
}

pub(super) fn date_from_date(value: TaggedValue<'_>, _target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    writer::write_date(sink, ValueTag::Date, &value.view::<DateView<'_>>()?.get())?;
    Ok(())
}

pub(super) fn time_from_text(value: TaggedValue<'_>, _target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    writer::write_time(sink, &lexical::parse_time(text_of(value)?)?);
    Ok(())
}

pub(super) fn time_from_date_time(
    value: TaggedValue<'_>,
    _target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    let date_time = value.view::<DateTimeView<'_>>()?.get();
    writer::write_time(sink, &date_time.time());
    Ok(())
}

pub(super) fn time_from_time(value: TaggedValue<'_>, _target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
    writer::write_time(sink, &value.view::<TimeView<'_>>()?.get());
    Ok(())
}

/// Keep the fields a gregorian type carries and reset the rest to its
/// defaults
pub(crate) fn project_gregorian(date: XsDate, target: ValueTag) -> EvalResult<XsDate> {
    let reference = XsDate::REFERENCE_YEAR;
    let (year, month, day) = match target {
        ValueTag::GYear => (date.year, 1, 1),
        ValueTag::GYearMonth => (date.year, date.month, 1),
        ValueTag::GMonthDay => (reference, date.month, date.day),
        ValueTag::GDay => (reference, 12, date.day),
        ValueTag::GMonth => (reference, date.month, 1),
        other => return Err(EvalError::internal(format!("{other} is not a gregorian type"))),
    };
    Ok(XsDate::new(year, month, day).with_timezone(date.timezone))
}

pub(super) fn gregorian_from_text(
    value: TaggedValue<'_>,
    target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    let date = lexical::parse_gregorian(text_of(value)?, target)?;
    writer::write_date(sink, target, &date)?;
    Ok(())
}

pub(super) fn gregorian_from_date_time(
    value: TaggedValue<'_>,
    target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    let date = value.view::<DateTimeView<'_>>()?.get().date();
    writer::write_date(sink, target, &project_gregorian(date, target)?)?;
    Ok(())
}

pub(super) fn gregorian_from_date(
    value: TaggedValue<'_>,
    target: ValueTag,
    sink: &mut dyn ValueSink,
) -> EvalResult<()> {
    let date = value.view::<DateView<'_>>()?.get();
    writer::write_date(sink, target, &project_gregorian(date, target)?)?;
    Ok(())
}
