//! End-to-end tests
//!
//! Tests for: literal values flowing through the cast and arithmetic
//! adapters the way a query engine drives them, and serialized contexts

use pretty_assertions::assert_eq;
use xqvalue::types::{SequenceBuilder, Timezone};
use xqvalue::{
    ArithmeticEngine, ArithmeticEvaluator, ArithmeticOperator, AtomicValue, CastEngine, CastEvaluator,
    DynamicContext, TaggedValue, TypeRegistry, ValueBuffer, ValueTag,
};

fn encode(value: &AtomicValue) -> Vec<u8> {
    value.to_buffer().unwrap().to_vec()
}

#[test]
fn test_due_date_from_untyped_input() {
    // xs:date($row/@issued) + xs:yearMonthDuration($row/@term)
    let registry = TypeRegistry::builtin();
    let cast = CastEngine::new(&registry);
    let arithmetic = ArithmeticEngine::new(&registry);

    let mut to_date = CastEvaluator::new(&cast, ValueTag::Date);
    let mut to_term = CastEvaluator::new(&cast, ValueTag::YearMonthDuration);
    let mut plus = ArithmeticEvaluator::new(&arithmetic, &cast, ArithmeticOperator::Add, DynamicContext::utc());

    let mut issued = ValueBuffer::new();
    let mut term = ValueBuffer::new();
    let mut due = ValueBuffer::new();

    for (issued_text, term_text, expected) in [
        ("2024-01-31", "P1M", "2024-02-29"),
        ("2023-11-30", "P1Y3M", "2025-02-28"),
        (" 2024-05-15Z ", "-P2M", "2024-03-15Z"),
    ] {
        let mut row = Vec::new();
        let mut builder = SequenceBuilder::new(&mut row);
        builder.push(&encode(&AtomicValue::untyped_atomic(issued_text))).unwrap();
        builder.finish().unwrap();
        to_date.evaluate(TaggedValue::new(&row).unwrap(), &mut issued).unwrap();

        let term_input = encode(&AtomicValue::untyped_atomic(term_text));
        to_term.evaluate(TaggedValue::new(&term_input).unwrap(), &mut term).unwrap();

        plus.evaluate(issued.as_tagged().unwrap(), term.as_tagged().unwrap(), &mut due)
            .unwrap();

        let rendered = cast
            .cast_value(&AtomicValue::decode(due.as_ref()).unwrap(), ValueTag::String)
            .unwrap();
        assert_eq!(rendered, AtomicValue::string(expected));
    }
}

#[test]
fn test_context_serializes() {
    let ctx = DynamicContext::builder()
        .implicit_timezone(Timezone::new(9, 30).unwrap())
        .build();
    let json = serde_json::to_string(&ctx).unwrap();
    let back: DynamicContext = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ctx);
    assert_eq!(back.implicit_timezone().offset_minutes(), 570);
}

#[test]
fn test_atomic_value_serializes() {
    let value = AtomicValue::decimal(-125, 2);
    let json = serde_json::to_string(&value).unwrap();
    let back: AtomicValue = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);
}
