//! Evaluator adapter tests
//!
//! Tests for: single-item unwrapping, empty sequence short-circuiting,
//! result sink reuse, untypedAtomic promotion and castable semantics

use pretty_assertions::assert_eq;
use xqvalue_diagnostics::{FORG0001, SYSE0002, XPTY0004};
use xqvalue_eval::{
    ArithmeticEngine, ArithmeticEvaluator, ArithmeticOperator, CastEngine, CastEvaluator, CastableEvaluator,
    DynamicContext,
};
use xqvalue_types::{
    AtomicValue, SequenceBuilder, TaggedValue, TypeRegistry, ValueBuffer, ValueTag, write_empty_sequence,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn encode(value: &AtomicValue) -> Vec<u8> {
    value.to_buffer().unwrap().to_vec()
}

fn sequence(items: &[AtomicValue]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut builder = SequenceBuilder::new(&mut out);
    for item in items {
        builder.push(&encode(item)).unwrap();
    }
    builder.finish().unwrap();
    out
}

fn empty_sequence() -> Vec<u8> {
    let mut out = Vec::new();
    write_empty_sequence(&mut out);
    out
}

fn tagged(bytes: &[u8]) -> TaggedValue<'_> {
    TaggedValue::new(bytes).unwrap()
}

fn decode(buffer: &ValueBuffer) -> AtomicValue {
    AtomicValue::decode(buffer.as_ref()).unwrap()
}

// ============================================================================
// Cast
// ============================================================================

#[test]
fn test_cast_unwraps_single_item() {
    let registry = TypeRegistry::builtin();
    let engine = CastEngine::new(&registry);
    let mut evaluator = CastEvaluator::new(&engine, ValueTag::Integer);
    let mut result = ValueBuffer::new();

    let bare = encode(&AtomicValue::string("12"));
    evaluator.evaluate(tagged(&bare), &mut result).unwrap();
    assert_eq!(decode(&result), AtomicValue::integer(12));

    let wrapped = sequence(&[AtomicValue::untyped_atomic(" 7 ")]);
    evaluator.evaluate(tagged(&wrapped), &mut result).unwrap();
    assert_eq!(decode(&result), AtomicValue::integer(7));
}

#[test]
fn test_cast_of_empty_sequence_is_empty() {
    let registry = TypeRegistry::builtin();
    let engine = CastEngine::new(&registry);
    let mut evaluator = CastEvaluator::new(&engine, ValueTag::Date);
    let mut result = ValueBuffer::new();

    let input = empty_sequence();
    evaluator.evaluate(tagged(&input), &mut result).unwrap();
    assert_eq!(result.to_vec(), empty_sequence());
}

#[test]
fn test_cast_rejects_multiple_items_and_nodes() {
    let registry = TypeRegistry::builtin();
    let engine = CastEngine::new(&registry);
    let mut evaluator = CastEvaluator::new(&engine, ValueTag::String);
    let mut result = ValueBuffer::new();

    let pair = sequence(&[AtomicValue::integer(1), AtomicValue::integer(2)]);
    let err = evaluator.evaluate(tagged(&pair), &mut result).unwrap_err();
    assert_eq!(err.code(), XPTY0004);

    let node = [ValueTag::ElementNode.as_u8()];
    let err = evaluator.evaluate(tagged(&node), &mut result).unwrap_err();
    assert_eq!(err.code(), XPTY0004);
}

#[test]
fn test_cast_resets_result_between_calls() {
    let registry = TypeRegistry::builtin();
    let engine = CastEngine::new(&registry);
    let mut evaluator = CastEvaluator::new(&engine, ValueTag::Double);
    let mut result = ValueBuffer::new();

    for (input, expected) in [("1", 1.0), ("2.5", 2.5), ("-INF", f64::NEG_INFINITY)] {
        let bytes = encode(&AtomicValue::string(input));
        evaluator.evaluate(tagged(&bytes), &mut result).unwrap();
        assert_eq!(decode(&result), AtomicValue::Double(expected));
    }
}

#[test]
fn test_cast_to_user_derived_type() {
    let mut registry = TypeRegistry::builtin();
    let code = registry.register_derived("my:code", ValueTag::Token.into()).unwrap();
    let engine = CastEngine::new(&registry);
    let mut evaluator = CastEvaluator::for_type(&engine, code).unwrap();
    assert_eq!(evaluator.target(), ValueTag::Token);

    let mut result = ValueBuffer::new();
    let input = encode(&AtomicValue::string("  A  B "));
    evaluator.evaluate(tagged(&input), &mut result).unwrap();
    assert_eq!(
        decode(&result),
        AtomicValue::String {
            tag: ValueTag::Token,
            value: "A B".to_string()
        }
    );
}

// ============================================================================
// Castable
// ============================================================================

fn castable(target: ValueTag, allow_empty: bool, input: &[u8]) -> bool {
    let registry = TypeRegistry::builtin();
    let engine = CastEngine::new(&registry);
    let mut evaluator = CastableEvaluator::new(&engine, target, allow_empty);
    let mut result = ValueBuffer::new();
    evaluator.evaluate(tagged(input), &mut result).unwrap();
    match decode(&result) {
        AtomicValue::Boolean(value) => value,
        other => panic!("expected a boolean, got {other:?}"),
    }
}

#[test]
fn test_castable() {
    assert!(castable(ValueTag::Integer, false, &encode(&AtomicValue::string("12"))));
    assert!(!castable(ValueTag::Integer, false, &encode(&AtomicValue::string("1.5"))));
    assert!(!castable(ValueTag::Byte, false, &encode(&AtomicValue::integer(1000))));
    assert!(!castable(ValueTag::Date, false, &encode(&AtomicValue::Boolean(true))));
    assert!(castable(ValueTag::Date, false, &sequence(&[AtomicValue::string("2024-02-29")])));
}

#[test]
fn test_castable_empty_and_multiple() {
    assert!(castable(ValueTag::Integer, true, &empty_sequence()));
    assert!(!castable(ValueTag::Integer, false, &empty_sequence()));
    let pair = sequence(&[AtomicValue::string("1"), AtomicValue::string("2")]);
    assert!(!castable(ValueTag::Integer, true, &pair));
}

#[test]
fn test_castable_propagates_malformed_input() {
    let registry = TypeRegistry::builtin();
    let engine = CastEngine::new(&registry);
    let mut evaluator = CastableEvaluator::new(&engine, ValueTag::Integer, false);
    let mut result = ValueBuffer::new();

    let truncated = [ValueTag::Decimal.as_u8(), 0];
    let err = evaluator.evaluate(tagged(&truncated), &mut result).unwrap_err();
    assert_eq!(err.code(), SYSE0002);
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_arithmetic_promotes_untyped_operands() {
    let registry = TypeRegistry::builtin();
    let cast = CastEngine::new(&registry);
    let engine = ArithmeticEngine::new(&registry);
    let mut evaluator = ArithmeticEvaluator::new(&engine, &cast, ArithmeticOperator::Add, DynamicContext::utc());
    let mut result = ValueBuffer::new();

    let left = encode(&AtomicValue::untyped_atomic("1.5"));
    let right = sequence(&[AtomicValue::integer(1)]);
    evaluator.evaluate(tagged(&left), tagged(&right), &mut result).unwrap();
    assert_eq!(decode(&result), AtomicValue::Double(2.5));

    let left = encode(&AtomicValue::untyped_atomic("abc"));
    let err = evaluator.evaluate(tagged(&left), tagged(&right), &mut result).unwrap_err();
    assert_eq!(err.code(), FORG0001);
}

#[test]
fn test_arithmetic_with_empty_operand() {
    let registry = TypeRegistry::builtin();
    let cast = CastEngine::new(&registry);
    let engine = ArithmeticEngine::new(&registry);
    let mut evaluator =
        ArithmeticEvaluator::new(&engine, &cast, ArithmeticOperator::Multiply, DynamicContext::utc());
    assert_eq!(evaluator.operator(), ArithmeticOperator::Multiply);
    let mut result = ValueBuffer::new();

    let empty = empty_sequence();
    let value = encode(&AtomicValue::integer(4));
    evaluator.evaluate(tagged(&empty), tagged(&value), &mut result).unwrap();
    assert_eq!(result.to_vec(), empty_sequence());
    evaluator.evaluate(tagged(&value), tagged(&empty), &mut result).unwrap();
    assert_eq!(result.to_vec(), empty_sequence());

    evaluator.evaluate(tagged(&value), tagged(&value), &mut result).unwrap();
    assert_eq!(decode(&result), AtomicValue::integer(16));
}

#[test]
fn test_arithmetic_rejects_non_atomic_operands() {
    let registry = TypeRegistry::builtin();
    let cast = CastEngine::new(&registry);
    let engine = ArithmeticEngine::new(&registry);
    let mut evaluator = ArithmeticEvaluator::new(&engine, &cast, ArithmeticOperator::Subtract, DynamicContext::utc());
    let mut result = ValueBuffer::new();

    let value = encode(&AtomicValue::integer(4));
    let node = [ValueTag::TextNode.as_u8()];
    let err = evaluator.evaluate(tagged(&node), tagged(&value), &mut result).unwrap_err();
    assert_eq!(err.code(), XPTY0004);

    let pair = sequence(&[AtomicValue::integer(1), AtomicValue::integer(2)]);
    let err = evaluator.evaluate(tagged(&value), tagged(&pair), &mut result).unwrap_err();
    assert_eq!(err.code(), XPTY0004);
}
