//! Arithmetic benchmarks using divan
//!
//! Benchmarks for numeric and calendar arithmetic on encoded operands.

use xqvalue::{
    ArithmeticEngine, ArithmeticEvaluator, ArithmeticOperator, AtomicValue, CastEngine, DynamicContext,
    TaggedValue, TypeRegistry, ValueBuffer, ValueSink,
};

fn main() {
    divan::main();
}

fn encode(value: &AtomicValue) -> Vec<u8> {
    value.to_buffer().map(|buffer| buffer.to_vec()).unwrap_or_default()
}

fn bench_pair(bencher: divan::Bencher, op: ArithmeticOperator, left: AtomicValue, right: AtomicValue) {
    let registry = TypeRegistry::builtin();
    let engine = ArithmeticEngine::new(&registry);
    let ctx = DynamicContext::utc();
    let left = encode(&left);
    let right = encode(&right);
    let mut output = ValueBuffer::new();

    bencher.bench_local(|| {
        let l = TaggedValue::new(divan::black_box(&left))?;
        let r = TaggedValue::new(divan::black_box(&right))?;
        output.reset();
        engine.apply(op, l, r, &ctx, &mut output)
    });
}

// === Numeric Benchmarks ===

mod numeric {
    use super::*;

    #[divan::bench(args = ArithmeticOperator::ALL)]
    fn integer(bencher: divan::Bencher, op: ArithmeticOperator) {
        bench_pair(bencher, op, AtomicValue::integer(1_234_567), AtomicValue::integer(89));
    }

    #[divan::bench(args = ArithmeticOperator::ALL)]
    fn decimal(bencher: divan::Bencher, op: ArithmeticOperator) {
        bench_pair(bencher, op, AtomicValue::decimal(31_415_926, 7), AtomicValue::decimal(271_828, 5));
    }

    #[divan::bench]
    fn mixed_promotion(bencher: divan::Bencher) {
        bench_pair(
            bencher,
            ArithmeticOperator::Multiply,
            AtomicValue::decimal(15, 1),
            AtomicValue::Double(2.0),
        );
    }
}

// === Calendar Benchmarks ===

mod calendar {
    use super::*;

    #[divan::bench]
    fn date_plus_year_month(bencher: divan::Bencher) {
        bench_pair(
            bencher,
            ArithmeticOperator::Add,
            AtomicValue::date(2024, 1, 31),
            AtomicValue::YearMonthDuration(13),
        );
    }

    #[divan::bench]
    fn date_difference(bencher: divan::Bencher) {
        bench_pair(
            bencher,
            ArithmeticOperator::Subtract,
            AtomicValue::date(2024, 12, 25),
            AtomicValue::date(1970, 1, 1),
        );
    }

    #[divan::bench]
    fn scale_day_time(bencher: divan::Bencher) {
        bench_pair(
            bencher,
            ArithmeticOperator::Multiply,
            AtomicValue::DayTimeDuration(5_400_000),
            AtomicValue::Double(1.5),
        );
    }
}

// === Adapter Benchmarks ===

#[divan::bench]
fn untyped_promotion(bencher: divan::Bencher) {
    let registry = TypeRegistry::builtin();
    let cast = CastEngine::new(&registry);
    let engine = ArithmeticEngine::new(&registry);
    let mut evaluator = ArithmeticEvaluator::new(&engine, &cast, ArithmeticOperator::Add, DynamicContext::utc());
    let left = encode(&AtomicValue::untyped_atomic("12.5"));
    let right = encode(&AtomicValue::integer(3));
    let mut result = ValueBuffer::new();

    bencher.bench_local(|| {
        let l = TaggedValue::new(divan::black_box(&left))?;
        let r = TaggedValue::new(divan::black_box(&right))?;
        evaluator.evaluate(l, r, &mut result)
    });
}
