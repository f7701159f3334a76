//! Sparse per-target conversion tables

use crate::error::{EvalError, EvalResult};
use xqvalue_types::{TaggedValue, ValueSink, ValueTag};

/// One conversion entry
///
/// Receives the source value (tagged with its own, possibly derived, tag)
/// and the requested target tag, and appends the converted value to the
/// sink.
pub type ConvertFn = fn(TaggedValue<'_>, ValueTag, &mut dyn ValueSink) -> EvalResult<()>;

const SLOTS: usize = 64;

/// Conversions into one primitive target, keyed by source primitive
///
/// Only the pairs the casting rules permit have an entry; looking up any
/// other source yields XPTY0004.
#[derive(Clone)]
pub struct CastTable {
    target: ValueTag,
    entries: [Option<ConvertFn>; SLOTS],
}

impl CastTable {
    pub fn new(target: ValueTag) -> Self {
        Self {
            target,
            entries: [None; SLOTS],
        }
    }

    /// Add an entry for one source primitive
    pub fn with(mut self, source: ValueTag, convert: ConvertFn) -> Self {
        self.entries[source.as_u8() as usize % SLOTS] = Some(convert);
        self
    }

    /// Add the same entry for several source primitives
    pub fn with_all(self, sources: &[ValueTag], convert: ConvertFn) -> Self {
        sources.iter().fold(self, |table, source| table.with(*source, convert))
    }

    pub fn target(&self) -> ValueTag {
        self.target
    }

    pub fn lookup(&self, source: ValueTag) -> Option<ConvertFn> {
        if source.is_primitive() {
            self.entries[source.as_u8() as usize % SLOTS]
        } else {
            None
        }
    }

    /// Sources that have an entry
    pub fn sources(&self) -> impl Iterator<Item = ValueTag> + '_ {
        ValueTag::PRIMITIVES
            .into_iter()
            .filter(|source| self.lookup(*source).is_some())
    }

    /// Run the entry for `source`, or fail with XPTY0004
    pub fn convert(
        &self,
        source: ValueTag,
        value: TaggedValue<'_>,
        target: ValueTag,
        sink: &mut dyn ValueSink,
    ) -> EvalResult<()> {
        let convert = self
            .lookup(source)
            .ok_or_else(|| EvalError::cast_not_defined(value.tag().name(), target.name()))?;
        convert(value, target, sink)
    }
}

impl std::fmt::Debug for CastTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CastTable")
            .field("target", &self.target)
            .field("sources", &self.sources().collect::<Vec<_>>())
            .finish()
    }
}
