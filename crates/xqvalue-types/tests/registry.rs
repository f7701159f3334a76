//! Type hierarchy resolution tests
//!
//! Tests for: built-in derivation chains, user-derived types, the
//! anyAtomicType root and cyclic registry data

use pretty_assertions::assert_eq;
use rstest::rstest;
use xqvalue_diagnostics::{SYSE0001, XPTY0004};
use xqvalue_types::{TypeId, TypeInfo, TypeRegistry, ValueTag};

// ============================================================================
// Built-in hierarchy
// ============================================================================

#[rstest]
#[case(ValueTag::PositiveInteger, ValueTag::Integer)]
#[case(ValueTag::UnsignedByte, ValueTag::Integer)]
#[case(ValueTag::Byte, ValueTag::Integer)]
#[case(ValueTag::NegativeInteger, ValueTag::Integer)]
#[case(ValueTag::Id, ValueTag::String)]
#[case(ValueTag::Language, ValueTag::String)]
#[case(ValueTag::NormalizedString, ValueTag::String)]
#[case(ValueTag::Integer, ValueTag::Integer)]
#[case(ValueTag::YearMonthDuration, ValueTag::YearMonthDuration)]
#[case(ValueTag::Duration, ValueTag::Duration)]
#[case(ValueTag::UntypedAtomic, ValueTag::UntypedAtomic)]
fn test_base_primitive_of_builtin(#[case] tag: ValueTag, #[case] expected: ValueTag) {
    let registry = TypeRegistry::builtin();
    assert_eq!(registry.base_primitive_of(tag).unwrap(), expected);
}

#[test]
fn test_every_atomic_tag_resolves() {
    let registry = TypeRegistry::builtin();
    for tag in ValueTag::ATOMIC {
        let primitive = registry.base_primitive_of(tag).unwrap();
        assert!(primitive.is_primitive(), "{tag} resolved to {primitive}");
    }
}

#[test]
fn test_declared_bases() {
    let registry = TypeRegistry::builtin();
    assert_eq!(
        registry.base_of(ValueTag::PositiveInteger.into()),
        Some(TypeId::from(ValueTag::NonNegativeInteger))
    );
    assert_eq!(
        registry.base_of(ValueTag::Integer.into()),
        Some(TypeId::from(ValueTag::Decimal))
    );
    assert_eq!(registry.base_of(ValueTag::AnyType.into()), None);
    assert_eq!(registry.get(ValueTag::Token.into()).unwrap().name, "xs:token");
}

#[rstest]
#[case(ValueTag::AnyAtomicType)]
#[case(ValueTag::AnySimpleType)]
#[case(ValueTag::AnyType)]
fn test_roots_are_type_errors(#[case] tag: ValueTag) {
    let registry = TypeRegistry::builtin();
    let err = registry.base_primitive_of(tag).unwrap_err();
    assert_eq!(err.code(), XPTY0004);
}

// ============================================================================
// User-derived types
// ============================================================================

#[test]
fn test_user_derived_chain() {
    let mut registry = TypeRegistry::builtin();
    let percentage = registry
        .register_derived("my:percentage", ValueTag::NonNegativeInteger.into())
        .unwrap();
    let small = registry.register_derived("my:smallPercentage", percentage).unwrap();

    assert_eq!(percentage.get(), TypeId::FIRST_USER);
    assert_eq!(small.get(), TypeId::FIRST_USER + 1);
    assert_eq!(registry.resolve_primitive(small).unwrap(), ValueTag::Integer);
    assert_eq!(
        registry.builtin_atomic_of(small).unwrap(),
        ValueTag::NonNegativeInteger
    );
}

#[test]
fn test_derived_from_unknown_base_fails() {
    let mut registry = TypeRegistry::builtin();
    assert!(registry.register_derived("my:orphan", TypeId::new(999)).is_err());
}

#[test]
fn test_user_type_under_any_atomic_is_type_error() {
    let mut registry = TypeRegistry::builtin();
    let loose = registry
        .register_derived("my:loose", ValueTag::AnyAtomicType.into())
        .unwrap();
    assert_eq!(registry.resolve_primitive(loose).unwrap_err().code(), XPTY0004);
}

// ============================================================================
// Malformed registry data
// ============================================================================

fn user(name: &str, base: u32) -> TypeInfo {
    TypeInfo {
        name: name.to_string(),
        base: Some(TypeId::new(base)),
        builtin: None,
    }
}

#[test]
fn test_cyclic_chain_is_internal_error() {
    let registry = TypeRegistry::from_entries([
        (TypeId::new(1000), user("my:a", 1001)),
        (TypeId::new(1001), user("my:b", 1002)),
        (TypeId::new(1002), user("my:c", 1000)),
    ]);
    let err = registry.resolve_primitive(TypeId::new(1000)).unwrap_err();
    assert_eq!(err.code(), SYSE0001);
}

#[test]
fn test_unknown_type_is_internal_error() {
    let registry = TypeRegistry::builtin();
    let err = registry.resolve_primitive(TypeId::new(4242)).unwrap_err();
    assert_eq!(err.code(), SYSE0001);
}

#[test]
fn test_from_entries_numbers_after_largest_id() {
    let mut registry = TypeRegistry::from_entries([(
        TypeId::new(2000),
        TypeInfo {
            name: "xs:string".to_string(),
            base: None,
            builtin: Some(ValueTag::String),
        },
    )]);
    let id = registry.register_derived("my:text", TypeId::new(2000)).unwrap();
    assert_eq!(id.get(), 2001);
    assert_eq!(registry.resolve_primitive(id).unwrap(), ValueTag::String);
}

#[test]
fn test_type_info_serializes() {
    let registry = TypeRegistry::builtin();
    let info = registry.get(ValueTag::UnsignedInt.into()).unwrap();
    let json = serde_json::to_string(info).unwrap();
    let back: TypeInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(&back, info);
    assert_eq!(back.base, Some(TypeId::from(ValueTag::UnsignedLong)));
}
