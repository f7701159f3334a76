//! Runtime value layer for XQuery
//!
//! This crate bundles the pieces a query engine needs to store, convert and
//! combine XML Schema atomic values:
//! - A self-describing byte encoding with zero-copy views
//! - The schema type hierarchy and primitive type resolution
//! - The cast engine and its `cast as` / `castable as` adapters
//! - The arithmetic engine and its per-operator adapters
//!
//! # Example
//!
//! ```
//! use xqvalue::{AtomicValue, CastEngine, TypeRegistry, ValueTag};
//!
//! let registry = TypeRegistry::builtin();
//! let engine = CastEngine::new(&registry);
//! let value = engine.cast_value(&AtomicValue::string("2024-02-29"), ValueTag::Date)?;
//! assert_eq!(value, AtomicValue::date(2024, 2, 29));
//! # Ok::<(), xqvalue::EvalError>(())
//! ```

// Re-export all public APIs from internal crates
pub use xqvalue_diagnostics as diagnostics;
pub use xqvalue_eval as eval;
pub use xqvalue_types as types;

// Convenience re-exports
pub use xqvalue_diagnostics::{ErrorCode, XqError};
pub use xqvalue_eval::{
    ArithmeticEngine, ArithmeticEvaluator, ArithmeticOperator, CastEngine, CastEvaluator, CastableEvaluator,
    DynamicContext, EvalError, EvalResult,
};
pub use xqvalue_types::{AtomicValue, TaggedValue, TypeId, TypeRegistry, ValueBuffer, ValueSink, ValueTag};
