//! Arithmetic Engine
//!
//! Each operator has its own dispatch over the ordered pair of operand
//! primitives. Mixed numeric pairs are promoted to the wider type and then
//! share the same-type arithmetic. Date/time and duration entries that
//! appear in both operand orders delegate to one implementation. A pair an
//! operator does not declare fails with XPTY0004; no pair panics.

mod numeric;
mod temporal;

use crate::context::DynamicContext;
use crate::error::{EvalError, EvalResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use xqvalue_types::writer;
use xqvalue_types::{
    AtomicValue, DateTimeView, DateView, DecimalView, DoubleView, DurationView, FloatView, IntegerView, TaggedValue,
    TimeView, TypeRegistry, ValueBuffer, ValueSink, ValueTag, XsDate, XsDateTime, XsDecimal, XsDuration, XsTime,
};

/// The four arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOperator {
    pub const ALL: [ArithmeticOperator; 4] = [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "div",
        }
    }
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// Operands
// ============================================================================

/// An operand or result, read by its primitive type
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Operand {
    Integer(i64),
    Decimal(XsDecimal),
    Float(f32),
    Double(f64),
    YearMonthDuration(i32),
    DayTimeDuration(i64),
    Duration(XsDuration),
    DateTime(XsDateTime),
    Date(XsDate),
    Time(XsTime),
    /// A primitive no operator accepts
    Other(ValueTag),
}

impl Operand {
    fn read(value: TaggedValue<'_>, primitive: ValueTag) -> EvalResult<Self> {
        Ok(match primitive {
            ValueTag::Integer => Self::Integer(value.view::<IntegerView<'_>>()?.get()),
            ValueTag::Decimal => Self::Decimal(value.view::<DecimalView<'_>>()?.get()),
            ValueTag::Float => Self::Float(value.view::<FloatView<'_>>()?.get()),
            ValueTag::Double => Self::Double(value.view::<DoubleView<'_>>()?.get()),
            ValueTag::YearMonthDuration => Self::YearMonthDuration(value.view::<DurationView<'_>>()?.months()),
            ValueTag::DayTimeDuration => Self::DayTimeDuration(value.view::<DurationView<'_>>()?.millis()),
            ValueTag::Duration => Self::Duration(value.view::<DurationView<'_>>()?.get()),
            ValueTag::DateTime => Self::DateTime(value.view::<DateTimeView<'_>>()?.get()),
            ValueTag::Date => Self::Date(value.view::<DateView<'_>>()?.get()),
            ValueTag::Time => Self::Time(value.view::<TimeView<'_>>()?.get()),
            other => Self::Other(other),
        })
    }

    pub(crate) fn tag(&self) -> ValueTag {
        match self {
            Self::Integer(_) => ValueTag::Integer,
            Self::Decimal(_) => ValueTag::Decimal,
            Self::Float(_) => ValueTag::Float,
            Self::Double(_) => ValueTag::Double,
            Self::YearMonthDuration(_) => ValueTag::YearMonthDuration,
            Self::DayTimeDuration(_) => ValueTag::DayTimeDuration,
            Self::Duration(_) => ValueTag::Duration,
            Self::DateTime(_) => ValueTag::DateTime,
            Self::Date(_) => ValueTag::Date,
            Self::Time(_) => ValueTag::Time,
            Self::Other(tag) => *tag,
        }
    }

    /// A numeric operand as a duration scaling factor
    fn factor(&self) -> Option<f64> {
        match *self {
            Self::Integer(v) => Some(v as f64),
            Self::Decimal(d) => Some(d.to_f64()),
            Self::Float(v) => Some(v as f64),
            Self::Double(v) => Some(v),
            _ => None,
        }
    }

    fn write(&self, sink: &mut dyn ValueSink) -> EvalResult<()> {
        match self {
            Self::Integer(v) => writer::write_integer(sink, ValueTag::Integer, *v)?,
            Self::Decimal(d) => writer::write_decimal(sink, *d),
            Self::Float(v) => writer::write_float(sink, *v),
            Self::Double(v) => writer::write_double(sink, *v),
            Self::YearMonthDuration(m) => writer::write_year_month_duration(sink, *m),
            Self::DayTimeDuration(ms) => writer::write_day_time_duration(sink, *ms),
            Self::Duration(d) => writer::write_duration(sink, *d),
            Self::DateTime(dt) => writer::write_date_time(sink, dt),
            Self::Date(d) => writer::write_date(sink, ValueTag::Date, d)?,
            Self::Time(t) => writer::write_time(sink, t),
            Self::Other(tag) => return Err(EvalError::internal(format!("{tag} is not an arithmetic result"))),
        }
        Ok(())
    }
}

fn unsupported(op: ArithmeticOperator, left: &Operand, right: &Operand) -> EvalError {
    log::warn!("arithmetic {} reached with {} and {}", op.name(), left.tag(), right.tag());
    EvalError::unsupported_operator(op.symbol(), format!("{}, {}", left.tag().name(), right.tag().name()))
}

fn negate_months(months: i32) -> EvalResult<i32> {
    months.checked_neg().ok_or_else(|| EvalError::duration_overflow("subtract"))
}

fn negate_millis(millis: i64) -> EvalResult<i64> {
    millis.checked_neg().ok_or_else(|| EvalError::duration_overflow("subtract"))
}

fn scale_months(months: i32, factor: f64, op: ArithmeticOperator) -> EvalResult<Operand> {
    let scaled = temporal::scale_component(months as i64, factor, op, i32::MIN as i64, i32::MAX as i64)?;
    Ok(Operand::YearMonthDuration(scaled as i32))
}

fn scale_millis(millis: i64, factor: f64, op: ArithmeticOperator) -> EvalResult<Operand> {
    temporal::scale_component(millis, factor, op, i64::MIN, i64::MAX).map(Operand::DayTimeDuration)
}

// ============================================================================
// Per-operator dispatch
// ============================================================================

fn add(left: &Operand, right: &Operand) -> EvalResult<Operand> {
    let op = ArithmeticOperator::Add;
    if let Some(promoted) = numeric::promote(left, right, op)? {
        return numeric::apply(op, promoted);
    }
    match (*left, *right) {
        (Operand::YearMonthDuration(a), Operand::YearMonthDuration(b)) => {
            temporal::add_months(a, b, op).map(Operand::YearMonthDuration)
        }
        (Operand::DayTimeDuration(a), Operand::DayTimeDuration(b)) => {
            temporal::add_millis(a, b, op).map(Operand::DayTimeDuration)
        }
        (Operand::Date(d), Operand::YearMonthDuration(m)) | (Operand::YearMonthDuration(m), Operand::Date(d)) => {
            temporal::add_months_to_date(d, m, "xs:date").map(Operand::Date)
        }
        (Operand::Date(d), Operand::DayTimeDuration(ms)) | (Operand::DayTimeDuration(ms), Operand::Date(d)) => {
            temporal::add_millis_to_date(d, ms).map(Operand::Date)
        }
        (Operand::DateTime(dt), Operand::YearMonthDuration(m))
        | (Operand::YearMonthDuration(m), Operand::DateTime(dt)) => {
            temporal::add_months_to_date_time(dt, m).map(Operand::DateTime)
        }
        (Operand::DateTime(dt), Operand::DayTimeDuration(ms))
        | (Operand::DayTimeDuration(ms), Operand::DateTime(dt)) => {
            temporal::add_millis_to_date_time(dt, ms).map(Operand::DateTime)
        }
        (Operand::Time(t), Operand::DayTimeDuration(ms)) | (Operand::DayTimeDuration(ms), Operand::Time(t)) => {
            Ok(Operand::Time(temporal::add_millis_to_time(t, ms)))
        }
        _ => Err(unsupported(op, left, right)),
    }
}

fn subtract(left: &Operand, right: &Operand, ctx: &DynamicContext) -> EvalResult<Operand> {
    let op = ArithmeticOperator::Subtract;
    if let Some(promoted) = numeric::promote(left, right, op)? {
        return numeric::apply(op, promoted);
    }
    match (*left, *right) {
        (Operand::YearMonthDuration(a), Operand::YearMonthDuration(b)) => {
            temporal::add_months(a, b, op).map(Operand::YearMonthDuration)
        }
        (Operand::DayTimeDuration(a), Operand::DayTimeDuration(b)) => {
            temporal::add_millis(a, b, op).map(Operand::DayTimeDuration)
        }
        (Operand::Date(d), Operand::YearMonthDuration(m)) => {
            temporal::add_months_to_date(d, negate_months(m)?, "xs:date").map(Operand::Date)
        }
        (Operand::Date(d), Operand::DayTimeDuration(ms)) => {
            temporal::add_millis_to_date(d, negate_millis(ms)?).map(Operand::Date)
        }
        (Operand::DateTime(dt), Operand::YearMonthDuration(m)) => {
            temporal::add_months_to_date_time(dt, negate_months(m)?).map(Operand::DateTime)
        }
        (Operand::DateTime(dt), Operand::DayTimeDuration(ms)) => {
            temporal::add_millis_to_date_time(dt, negate_millis(ms)?).map(Operand::DateTime)
        }
        (Operand::Time(t), Operand::DayTimeDuration(ms)) => {
            Ok(Operand::Time(temporal::add_millis_to_time(t, negate_millis(ms)?)))
        }
        (Operand::Date(a), Operand::Date(b)) => temporal::date_difference(a, b, ctx).map(Operand::DayTimeDuration),
        (Operand::DateTime(a), Operand::DateTime(b)) => {
            temporal::date_time_difference(a, b, ctx).map(Operand::DayTimeDuration)
        }
        (Operand::Time(a), Operand::Time(b)) => Ok(Operand::DayTimeDuration(temporal::time_difference(a, b, ctx))),
        _ => Err(unsupported(op, left, right)),
    }
}

fn multiply(left: &Operand, right: &Operand) -> EvalResult<Operand> {
    let op = ArithmeticOperator::Multiply;
    if let Some(promoted) = numeric::promote(left, right, op)? {
        return numeric::apply(op, promoted);
    }
    match (*left, *right) {
        (Operand::YearMonthDuration(m), n) | (n, Operand::YearMonthDuration(m)) => match n.factor() {
            Some(factor) => scale_months(m, factor, op),
            None => Err(unsupported(op, left, right)),
        },
        (Operand::DayTimeDuration(ms), n) | (n, Operand::DayTimeDuration(ms)) => match n.factor() {
            Some(factor) => scale_millis(ms, factor, op),
            None => Err(unsupported(op, left, right)),
        },
        _ => Err(unsupported(op, left, right)),
    }
}

fn divide(left: &Operand, right: &Operand) -> EvalResult<Operand> {
    let op = ArithmeticOperator::Divide;
    if let Some(promoted) = numeric::promote(left, right, op)? {
        return numeric::apply(op, promoted);
    }
    match (*left, *right) {
        (Operand::YearMonthDuration(a), Operand::YearMonthDuration(b)) => {
            temporal::duration_ratio(a as i64, b as i64).map(Operand::Decimal)
        }
        (Operand::DayTimeDuration(a), Operand::DayTimeDuration(b)) => {
            temporal::duration_ratio(a, b).map(Operand::Decimal)
        }
        (Operand::YearMonthDuration(m), n) => match n.factor() {
            Some(factor) => scale_months(m, factor, op),
            None => Err(unsupported(op, left, right)),
        },
        (Operand::DayTimeDuration(ms), n) => match n.factor() {
            Some(factor) => scale_millis(ms, factor, op),
            None => Err(unsupported(op, left, right)),
        },
        _ => Err(unsupported(op, left, right)),
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Applies arithmetic operators to tagged values
#[derive(Debug, Clone, Copy)]
pub struct ArithmeticEngine<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> ArithmeticEngine<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    fn operand(&self, op: ArithmeticOperator, value: TaggedValue<'_>) -> EvalResult<Operand> {
        let tag = value.tag();
        if !tag.is_atomic() {
            return Err(EvalError::invalid_operand(op.symbol(), format!("{tag} is not an atomic value")));
        }
        let primitive = self.registry.base_primitive_of(tag)?;
        Operand::read(value, primitive)
    }

    /// Apply `op` to two atomic values, appending the result to `sink`
    pub fn apply(
        &self,
        op: ArithmeticOperator,
        left: TaggedValue<'_>,
        right: TaggedValue<'_>,
        ctx: &DynamicContext,
        sink: &mut dyn ValueSink,
    ) -> EvalResult<()> {
        let l = self.operand(op, left)?;
        let r = self.operand(op, right)?;
        log::trace!("{} {} on {} ({}) and {} ({})", op.name(), op, left.tag(), l.tag(), right.tag(), r.tag());

        let result = match op {
            ArithmeticOperator::Add => add(&l, &r)?,
            ArithmeticOperator::Subtract => subtract(&l, &r, ctx)?,
            ArithmeticOperator::Multiply => multiply(&l, &r)?,
            ArithmeticOperator::Divide => divide(&l, &r)?,
        };
        result.write(sink)
    }

    /// Apply `op` to two owned values
    pub fn evaluate(
        &self,
        op: ArithmeticOperator,
        left: &AtomicValue,
        right: &AtomicValue,
        ctx: &DynamicContext,
    ) -> EvalResult<AtomicValue> {
        let left = left.to_buffer()?;
        let right = right.to_buffer()?;
        let mut output = ValueBuffer::new();
        self.apply(op, left.as_tagged()?, right.as_tagged()?, ctx, &mut output)?;
        Ok(AtomicValue::decode(output.as_ref())?)
    }
}
