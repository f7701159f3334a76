//! Cast benchmarks using divan
//!
//! Benchmarks for lexical parsing, canonical formatting and the cast
//! adapter's per-tuple path.

use xqvalue::types::SequenceBuilder;
use xqvalue::{AtomicValue, CastEngine, CastEvaluator, TaggedValue, TypeRegistry, ValueBuffer, ValueSink, ValueTag};

fn main() {
    divan::main();
}

fn encode(value: &AtomicValue) -> Vec<u8> {
    value.to_buffer().map(|buffer| buffer.to_vec()).unwrap_or_default()
}

// === Lexical Parsing Benchmarks ===

mod from_string {
    use super::*;

    #[divan::bench(args = [
        ("xs:integer", "-9223372036854775808", ValueTag::Integer),
        ("xs:decimal", "12345.678901234", ValueTag::Decimal),
        ("xs:double", "6.02214076E23", ValueTag::Double),
        ("xs:dateTime", "2024-02-29T23:59:59.999+05:30", ValueTag::DateTime),
        ("xs:dayTimeDuration", "P12DT7H30M15.25S", ValueTag::DayTimeDuration),
        ("xs:NCName", "  element-name  ", ValueTag::NcName),
    ])]
    fn parse(bencher: divan::Bencher, (_, text, target): (&str, &str, ValueTag)) {
        let registry = TypeRegistry::builtin();
        let engine = CastEngine::new(&registry);
        let input = encode(&AtomicValue::string(text));
        let mut output = ValueBuffer::new();

        bencher.bench_local(|| {
            let value = TaggedValue::new(divan::black_box(&input))?;
            output.reset();
            engine.cast(value, target, &mut output)
        });
    }
}

// === Canonical Formatting Benchmarks ===

mod to_string {
    use super::*;

    fn bench_format(bencher: divan::Bencher, value: AtomicValue) {
        let registry = TypeRegistry::builtin();
        let engine = CastEngine::new(&registry);
        let input = encode(&value);
        let mut output = ValueBuffer::new();

        bencher.bench_local(|| {
            let value = TaggedValue::new(divan::black_box(&input))?;
            output.reset();
            engine.cast(value, ValueTag::String, &mut output)
        });
    }

    #[divan::bench]
    fn double(bencher: divan::Bencher) {
        bench_format(bencher, AtomicValue::Double(1.0e-7));
    }

    #[divan::bench]
    fn decimal(bencher: divan::Bencher) {
        bench_format(bencher, AtomicValue::decimal(-123_456_789, 4));
    }

    #[divan::bench]
    fn date(bencher: divan::Bencher) {
        bench_format(bencher, AtomicValue::date(-44, 3, 15));
    }

    #[divan::bench]
    fn year_month_duration(bencher: divan::Bencher) {
        bench_format(bencher, AtomicValue::YearMonthDuration(-27));
    }
}

// === Adapter Benchmarks ===

mod adapter {
    use super::*;

    #[divan::bench]
    fn single_item_sequence(bencher: divan::Bencher) {
        let registry = TypeRegistry::builtin();
        let engine = CastEngine::new(&registry);
        let mut evaluator = CastEvaluator::new(&engine, ValueTag::Integer);
        let mut input = Vec::new();
        let mut builder = SequenceBuilder::new(&mut input);
        let _ = builder.push(&encode(&AtomicValue::untyped_atomic("42")));
        let _ = builder.finish();
        let mut result = ValueBuffer::new();

        bencher.bench_local(|| {
            let value = TaggedValue::new(divan::black_box(&input))?;
            evaluator.evaluate(value, &mut result)
        });
    }
}
