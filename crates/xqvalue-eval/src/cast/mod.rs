//! Cast Engine
//!
//! Casting dispatches in two steps. The source tag is resolved to its base
//! primitive through the type registry, and the target type selects one
//! [`CastTable`]. The table holds an entry only for the source primitives
//! XML Schema allows for that target; every other source is XPTY0004.
//!
//! Derived targets (`xs:token`, `xs:positiveInteger`, user types) share
//! the table of their primitive. The entry receives the requested target
//! tag and applies the target's facets itself.

pub mod canonical;
pub mod lexical;
mod binary;
mod duration;
mod numeric;
mod string;
mod table;
mod temporal;

pub use table::{CastTable, ConvertFn};

use crate::error::{EvalError, EvalResult};
use indexmap::IndexMap;
use xqvalue_types::{AtomicValue, StringView, TaggedValue, TypeId, TypeRegistry, ValueBuffer, ValueSink, ValueTag};

/// Text of a string-payload source (xs:string family, untypedAtomic,
/// anyURI, NOTATION)
pub(super) fn text_of(value: TaggedValue<'_>) -> EvalResult<&str> {
    Ok(value.view::<StringView<'_>>()?.as_str())
}

// ============================================================================
// Table construction
// ============================================================================

/// Sources that are parsed from their lexical form
const TEXT: [ValueTag; 2] = [ValueTag::String, ValueTag::UntypedAtomic];

const NUMERIC: [ValueTag; 4] = [ValueTag::Float, ValueTag::Double, ValueTag::Decimal, ValueTag::Integer];

const DURATIONS: [ValueTag; 3] = [
    ValueTag::Duration,
    ValueTag::YearMonthDuration,
    ValueTag::DayTimeDuration,
];

const GREGORIAN: [ValueTag; 5] = [
    ValueTag::GYearMonth,
    ValueTag::GYear,
    ValueTag::GMonthDay,
    ValueTag::GDay,
    ValueTag::GMonth,
];

const BINARY: [ValueTag; 2] = [ValueTag::Base64Binary, ValueTag::HexBinary];

fn build_tables() -> IndexMap<ValueTag, CastTable> {
    let mut tables = IndexMap::new();
    let mut add = |table: CastTable| {
        tables.insert(table.target(), table);
    };

    // Every primitive has a string form
    for target in [ValueTag::String, ValueTag::UntypedAtomic] {
        add(CastTable::new(target).with_all(&ValueTag::PRIMITIVES, string::to_string_like));
    }
    add(CastTable::new(ValueTag::AnyUri)
        .with_all(&TEXT, string::to_string_like)
        .with(ValueTag::AnyUri, string::to_string_like));
    add(CastTable::new(ValueTag::QName)
        .with(ValueTag::String, string::qname_from_text)
        .with(ValueTag::QName, string::qname_from_qname));
    add(CastTable::new(ValueTag::Notation).with(ValueTag::Notation, string::notation_from_notation));

    add(CastTable::new(ValueTag::Boolean)
        .with_all(&TEXT, numeric::boolean_from_text)
        .with_all(&NUMERIC, numeric::boolean_from_numeric)
        .with(ValueTag::Boolean, numeric::boolean_from_boolean));
    add(CastTable::new(ValueTag::Double)
        .with_all(&TEXT, numeric::double_from_text)
        .with_all(&NUMERIC, numeric::double_from_numeric)
        .with(ValueTag::Boolean, numeric::double_from_boolean));
    add(CastTable::new(ValueTag::Float)
        .with_all(&TEXT, numeric::float_from_text)
        .with_all(&NUMERIC, numeric::float_from_numeric)
        .with(ValueTag::Boolean, numeric::float_from_boolean));
    add(CastTable::new(ValueTag::Decimal)
        .with_all(&TEXT, numeric::decimal_from_text)
        .with_all(&NUMERIC, numeric::decimal_from_numeric)
        .with(ValueTag::Boolean, numeric::decimal_from_boolean));
    add(CastTable::new(ValueTag::Integer)
        .with_all(&TEXT, numeric::integer_from_text)
        .with_all(&NUMERIC, numeric::integer_from_numeric)
        .with(ValueTag::Boolean, numeric::integer_from_boolean));

    for target in DURATIONS {
        add(CastTable::new(target)
            .with_all(&TEXT, duration::from_text)
            .with_all(&DURATIONS, duration::from_duration));
    }

    add(CastTable::new(ValueTag::DateTime)
        .with_all(&TEXT, temporal::date_time_from_text)
        .with(ValueTag::DateTime, temporal::date_time_from_date_time)
        .with(ValueTag::Date, temporal::date_time_from_date));
    add(CastTable::new(ValueTag::Date)
        .with_all(&TEXT, temporal::date_from_text)
        .with(ValueTag::DateTime, temporal::date_from_date_time)
        .with(ValueTag::Date, temporal::date_from_date));
    add(CastTable::new(ValueTag::Time)
        .with_all(&TEXT, temporal::time_from_text)
        .with(ValueTag::DateTime, temporal::time_from_date_time)
        .with(ValueTag::Time, temporal::time_from_time));
    for target in GREGORIAN {
        add(CastTable::new(target)
            .with_all(&TEXT, temporal::gregorian_from_text)
            .with(ValueTag::DateTime, temporal::gregorian_from_date_time)
            .with(ValueTag::Date, temporal::gregorian_from_date)
            .with(target, temporal::gregorian_from_date));
    }

    add(CastTable::new(ValueTag::Base64Binary)
        .with_all(&TEXT, binary::base64_from_text)
        .with_all(&BINARY, binary::from_binary));
    add(CastTable::new(ValueTag::HexBinary)
        .with_all(&TEXT, binary::hex_from_text)
        .with_all(&BINARY, binary::from_binary));

    tables
}

// ============================================================================
// Engine
// ============================================================================

/// Casts tagged values between atomic types
///
/// Built once per query from a read-only registry; the tables are
/// immutable after construction.
#[derive(Debug)]
pub struct CastEngine<'r> {
    registry: &'r TypeRegistry,
    tables: IndexMap<ValueTag, CastTable>,
}

impl<'r> CastEngine<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        let tables = build_tables();
        log::debug!("built {} cast tables", tables.len());
        Self { registry, tables }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// The table for a primitive target, if casting to it is defined at all
    pub fn table(&self, target: ValueTag) -> Option<&CastTable> {
        self.tables.get(&target)
    }

    /// Cast `value` to the built-in atomic type `target`, appending the
    /// result to `sink`
    pub fn cast(&self, value: TaggedValue<'_>, target: ValueTag, sink: &mut dyn ValueSink) -> EvalResult<()> {
        let source = value.tag();
        if !source.is_atomic() {
            return Err(EvalError::invalid_operand("cast", format!("{source} is not an atomic value")));
        }
        if !target.is_atomic() {
            return Err(EvalError::cast_not_defined(source.name(), target.name()));
        }
        let source_primitive = self.registry.base_primitive_of(source)?;
        let target_primitive = self.registry.base_primitive_of(target)?;
        log::trace!("cast {source} ({source_primitive}) to {target} ({target_primitive})");

        let table = self
            .tables
            .get(&target_primitive)
            .ok_or_else(|| EvalError::cast_not_defined(source.name(), target.name()))?;
        table.convert(source_primitive, value, target, sink)
    }

    /// Cast to a registered type, user-derived types included
    ///
    /// The value is produced with the tag of the nearest built-in atomic
    /// type the target derives from.
    pub fn cast_to_type(&self, value: TaggedValue<'_>, target: TypeId, sink: &mut dyn ValueSink) -> EvalResult<()> {
        let tag = self.registry.builtin_atomic_of(target)?;
        self.cast(value, tag, sink)
    }

    /// Cast an owned value
    pub fn cast_value(&self, value: &AtomicValue, target: ValueTag) -> EvalResult<AtomicValue> {
        let input = value.to_buffer()?;
        let mut output = ValueBuffer::new();
        self.cast(input.as_tagged()?, target, &mut output)?;
        Ok(AtomicValue::decode(output.as_ref())?)
    }

    /// Check whether the cast of this value would succeed
    pub fn is_castable(&self, value: TaggedValue<'_>, target: ValueTag) -> bool {
        let mut scratch = ValueBuffer::new();
        self.cast(value, target, &mut scratch).is_ok()
    }

    /// Check whether any value of `source` can be cast to `target`
    pub fn is_defined(&self, source: ValueTag, target: ValueTag) -> bool {
        let (Ok(source), Ok(target)) = (
            self.registry.base_primitive_of(source),
            self.registry.base_primitive_of(target),
        ) else {
            return false;
        };
        self.tables
            .get(&target)
            .is_some_and(|table| table.lookup(source).is_some())
    }
}
