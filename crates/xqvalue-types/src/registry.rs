//! Schema type registry and type hierarchy resolution
//!
//! The registry records, for every known type, its declared base type and
//! the built-in atomic type it corresponds to. It is an explicit value built
//! once per query compilation and passed down by reference.

use crate::tag::ValueTag;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use xqvalue_diagnostics::{Result, XPTY0004, XqError};

/// Identifier of a schema type
///
/// Built-in types use their tag number; user-derived types are numbered
/// from [`TypeId::FIRST_USER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    pub const FIRST_USER: u32 = 1_000;

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl From<ValueTag> for TypeId {
    fn from(tag: ValueTag) -> Self {
        Self(tag.as_u8() as u32)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registry entry for one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Qualified type name
    pub name: String,
    /// Declared base type; `None` only for the root
    pub base: Option<TypeId>,
    /// The built-in type this entry is, if it is one
    pub builtin: Option<ValueTag>,
}

/// Read-only schema type registry
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<TypeId, TypeInfo>,
    next_user_id: u32,
}

/// Declared base of every built-in type
const BUILTIN_BASES: &[(ValueTag, Option<ValueTag>)] = &[
    (ValueTag::AnyType, None),
    (ValueTag::AnySimpleType, Some(ValueTag::AnyType)),
    (ValueTag::Untyped, Some(ValueTag::AnyType)),
    (ValueTag::AnyAtomicType, Some(ValueTag::AnySimpleType)),
    (ValueTag::String, Some(ValueTag::AnyAtomicType)),
    (ValueTag::NormalizedString, Some(ValueTag::String)),
    (ValueTag::Token, Some(ValueTag::NormalizedString)),
    (ValueTag::Language, Some(ValueTag::Token)),
    (ValueTag::NmToken, Some(ValueTag::Token)),
    (ValueTag::Name, Some(ValueTag::Token)),
    (ValueTag::NcName, Some(ValueTag::Name)),
    (ValueTag::Id, Some(ValueTag::NcName)),
    (ValueTag::IdRef, Some(ValueTag::NcName)),
    (ValueTag::Entity, Some(ValueTag::NcName)),
    (ValueTag::UntypedAtomic, Some(ValueTag::AnyAtomicType)),
    (ValueTag::DateTime, Some(ValueTag::AnyAtomicType)),
    (ValueTag::Date, Some(ValueTag::AnyAtomicType)),
    (ValueTag::Time, Some(ValueTag::AnyAtomicType)),
    (ValueTag::Duration, Some(ValueTag::AnyAtomicType)),
    (ValueTag::YearMonthDuration, Some(ValueTag::Duration)),
    (ValueTag::DayTimeDuration, Some(ValueTag::Duration)),
    (ValueTag::Float, Some(ValueTag::AnyAtomicType)),
    (ValueTag::Double, Some(ValueTag::AnyAtomicType)),
    (ValueTag::Decimal, Some(ValueTag::AnyAtomicType)),
    (ValueTag::Integer, Some(ValueTag::Decimal)),
    (ValueTag::NonPositiveInteger, Some(ValueTag::Integer)),
    (ValueTag::NegativeInteger, Some(ValueTag::NonPositiveInteger)),
    (ValueTag::Long, Some(ValueTag::Integer)),
    (ValueTag::Int, Some(ValueTag::Long)),
    (ValueTag::Short, Some(ValueTag::Int)),
    (ValueTag::Byte, Some(ValueTag::Short)),
    (ValueTag::NonNegativeInteger, Some(ValueTag::Integer)),
    (ValueTag::UnsignedLong, Some(ValueTag::NonNegativeInteger)),
    (ValueTag::UnsignedInt, Some(ValueTag::UnsignedLong)),
    (ValueTag::UnsignedShort, Some(ValueTag::UnsignedInt)),
    (ValueTag::UnsignedByte, Some(ValueTag::UnsignedShort)),
    (ValueTag::PositiveInteger, Some(ValueTag::NonNegativeInteger)),
    (ValueTag::GYearMonth, Some(ValueTag::AnyAtomicType)),
    (ValueTag::GYear, Some(ValueTag::AnyAtomicType)),
    (ValueTag::GMonthDay, Some(ValueTag::AnyAtomicType)),
    (ValueTag::GDay, Some(ValueTag::AnyAtomicType)),
    (ValueTag::GMonth, Some(ValueTag::AnyAtomicType)),
    (ValueTag::Boolean, Some(ValueTag::AnyAtomicType)),
    (ValueTag::Base64Binary, Some(ValueTag::AnyAtomicType)),
    (ValueTag::HexBinary, Some(ValueTag::AnyAtomicType)),
    (ValueTag::AnyUri, Some(ValueTag::AnyAtomicType)),
    (ValueTag::QName, Some(ValueTag::AnyAtomicType)),
    (ValueTag::Notation, Some(ValueTag::AnyAtomicType)),
];

impl TypeRegistry {
    /// Registry holding the built-in XML Schema hierarchy
    pub fn builtin() -> Self {
        let types = BUILTIN_BASES
            .iter()
            .map(|(tag, base)| {
                (
                    TypeId::from(*tag),
                    TypeInfo {
                        name: tag.name().to_string(),
                        base: base.map(TypeId::from),
                        builtin: Some(*tag),
                    },
                )
            })
            .collect();
        Self {
            types,
            next_user_id: TypeId::FIRST_USER,
        }
    }

    /// Build a registry from externally supplied entries
    ///
    /// The entries are taken as they are; a cyclic derivation chain is only
    /// detected when resolution walks it.
    pub fn from_entries(entries: impl IntoIterator<Item = (TypeId, TypeInfo)>) -> Self {
        let types: IndexMap<TypeId, TypeInfo> = entries.into_iter().collect();
        let next_user_id = types
            .keys()
            .map(|id| id.get() + 1)
            .max()
            .unwrap_or(0)
            .max(TypeId::FIRST_USER);
        Self { types, next_user_id }
    }

    /// Register a user-derived type restricting `base`
    pub fn register_derived(&mut self, name: impl Into<String>, base: TypeId) -> Result<TypeId> {
        if !self.types.contains_key(&base) {
            return Err(XqError::internal(format!("base type {base} is not registered")));
        }
        let id = TypeId::new(self.next_user_id);
        self.next_user_id += 1;
        self.types.insert(
            id,
            TypeInfo {
                name: name.into(),
                base: Some(base),
                builtin: None,
            },
        );
        Ok(id)
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeInfo> {
        self.types.get(&id)
    }

    /// Declared base type
    pub fn base_of(&self, id: TypeId) -> Option<TypeId> {
        self.types.get(&id).and_then(|info| info.base)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Walk the derivation chain of `id`, yielding each visited entry
    ///
    /// `stop` decides when the walk has arrived. The walk fails with XPTY0004
    /// on reaching xs:anyAtomicType (or a root) first, and with an internal
    /// error on an unknown id or a chain longer than the registry.
    fn walk(&self, id: TypeId, stop: impl Fn(&TypeInfo) -> Option<ValueTag>) -> Result<ValueTag> {
        let mut current = id;
        for _ in 0..=self.types.len() {
            let info = self
                .types
                .get(&current)
                .ok_or_else(|| XqError::internal(format!("type {current} is not registered")))?;
            if let Some(tag) = stop(info) {
                return Ok(tag);
            }
            if info.builtin == Some(ValueTag::AnyAtomicType) {
                return Err(XqError::new(
                    XPTY0004,
                    format!("{} has no primitive base below xs:anyAtomicType", self.name_of(id)),
                ));
            }
            match info.base {
                Some(base) => current = base,
                None => {
                    return Err(XqError::new(
                        XPTY0004,
                        format!("{} is not an atomic type", self.name_of(id)),
                    ));
                }
            }
        }
        Err(XqError::internal(format!(
            "type derivation chain of {} is cyclic",
            self.name_of(id)
        )))
    }

    fn name_of(&self, id: TypeId) -> String {
        self.types
            .get(&id)
            .map_or_else(|| id.to_string(), |info| info.name.clone())
    }

    /// Resolve a type to the primitive type the cast and arithmetic
    /// matrices dispatch on
    pub fn resolve_primitive(&self, id: TypeId) -> Result<ValueTag> {
        let tag = self.walk(id, |info| info.builtin.filter(ValueTag::is_primitive))?;
        log::trace!("resolved {} to primitive {tag}", self.name_of(id));
        Ok(tag)
    }

    /// Resolve the base primitive of a value tag
    pub fn base_primitive_of(&self, tag: ValueTag) -> Result<ValueTag> {
        if tag.is_primitive() {
            return Ok(tag);
        }
        log::debug!("walking derivation chain of {tag}");
        self.resolve_primitive(TypeId::from(tag))
    }

    /// Resolve a type to the nearest built-in atomic type, the type its
    /// values are tagged with
    pub fn builtin_atomic_of(&self, id: TypeId) -> Result<ValueTag> {
        self.walk(id, |info| info.builtin.filter(ValueTag::is_atomic))
    }
}
