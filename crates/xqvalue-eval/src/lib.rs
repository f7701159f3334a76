//! XQuery value evaluation
//!
//! This crate turns the tagged value codec into the runtime value layer of
//! a query engine:
//! - The Cast Engine, with one sparse conversion table per target type
//! - The Arithmetic Engine for numeric, duration and date/time operands
//! - Evaluator adapters binding both into per-tuple evaluation
//! - The dynamic context supplying the implicit timezone

pub mod adapters;
pub mod arithmetic;
pub mod cast;
pub mod context;
pub mod error;

pub use adapters::{ArithmeticEvaluator, CastEvaluator, CastableEvaluator};
pub use arithmetic::{ArithmeticEngine, ArithmeticOperator};
pub use cast::{CastEngine, CastTable, ConvertFn};
pub use context::{DynamicContext, DynamicContextBuilder};
pub use error::{EvalError, EvalResult};
