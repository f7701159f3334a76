//! Evaluator adapters
//!
//! An adapter binds one engine call into the per-tuple protocol of the
//! surrounding query engine. Each instance is created once per operator and
//! partition, then invoked once per tuple: arguments arrive as tagged
//! values (possibly one-item sequences), the empty sequence short-circuits
//! to the empty sequence, and the result is written to a sink the adapter
//! resets first. Only the scratch buffers survive between calls.

use crate::arithmetic::{ArithmeticEngine, ArithmeticOperator};
use crate::cast::CastEngine;
use crate::context::DynamicContext;
use crate::error::{EvalError, EvalResult};
use xqvalue_types::writer;
use xqvalue_types::{SequenceView, TaggedValue, TypeId, ValueBuffer, ValueSink, ValueTag, write_empty_sequence};

/// Unwrap an argument to its single atomic item, or `None` for the empty
/// sequence
fn unwrap_argument<'a>(operator: &str, value: TaggedValue<'a>) -> EvalResult<Option<TaggedValue<'a>>> {
    let item = match value.tag() {
        ValueTag::Sequence => {
            let sequence = value.view::<SequenceView<'a>>()?;
            if sequence.len() > 1 {
                return Err(EvalError::invalid_operand(
                    operator,
                    format!("expected at most one item, found {}", sequence.len()),
                ));
            }
            match sequence.single()? {
                Some(item) => item,
                None => return Ok(None),
            }
        }
        _ => value,
    };
    if !item.tag().is_atomic() {
        return Err(EvalError::invalid_operand(
            operator,
            format!("{} must be atomized before evaluation", item.tag()),
        ));
    }
    Ok(Some(item))
}

// ============================================================================
// Cast
// ============================================================================

/// `$arg cast as T`
#[derive(Debug)]
pub struct CastEvaluator<'a> {
    engine: &'a CastEngine<'a>,
    target: ValueTag,
}

impl<'a> CastEvaluator<'a> {
    pub fn new(engine: &'a CastEngine<'a>, target: ValueTag) -> Self {
        Self { engine, target }
    }

    /// Adapter for a registered target type, user-derived types included
    pub fn for_type(engine: &'a CastEngine<'a>, target: TypeId) -> EvalResult<Self> {
        let target = engine.registry().builtin_atomic_of(target)?;
        Ok(Self::new(engine, target))
    }

    pub fn target(&self) -> ValueTag {
        self.target
    }

    pub fn evaluate(&mut self, argument: TaggedValue<'_>, result: &mut dyn ValueSink) -> EvalResult<()> {
        result.reset();
        match unwrap_argument("cast as", argument)? {
            Some(item) => self.engine.cast(item, self.target, result),
            None => {
                log::debug!("cast to {} of the empty sequence", self.target);
                write_empty_sequence(result);
                Ok(())
            }
        }
    }
}

// ============================================================================
// Castable
// ============================================================================

/// `$arg castable as T` and `$arg castable as T?`
///
/// Produces a boolean. A failed cast is `false`; encoding and internal
/// errors still propagate.
#[derive(Debug)]
pub struct CastableEvaluator<'a> {
    engine: &'a CastEngine<'a>,
    target: ValueTag,
    allow_empty: bool,
    scratch: ValueBuffer,
}

impl<'a> CastableEvaluator<'a> {
    pub fn new(engine: &'a CastEngine<'a>, target: ValueTag, allow_empty: bool) -> Self {
        Self {
            engine,
            target,
            allow_empty,
            scratch: ValueBuffer::new(),
        }
    }

    pub fn evaluate(&mut self, argument: TaggedValue<'_>, result: &mut dyn ValueSink) -> EvalResult<()> {
        result.reset();
        if argument.tag() == ValueTag::Sequence && argument.view::<SequenceView<'_>>()?.len() > 1 {
            writer::write_boolean(result, false);
            return Ok(());
        }
        let castable = match unwrap_argument("castable as", argument)? {
            None => {
                log::debug!("castable to {} of the empty sequence", self.target);
                self.allow_empty
            }
            Some(item) => {
                self.scratch.reset();
                match self.engine.cast(item, self.target, &mut self.scratch) {
                    Ok(()) => true,
                    Err(err) if err.code().is_system_error() => return Err(err),
                    Err(_) => false,
                }
            }
        };
        writer::write_boolean(result, castable);
        Ok(())
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

/// Promote an untypedAtomic operand to xs:double through the cast engine
fn promote_untyped<'s>(
    cast: &CastEngine<'_>,
    value: TaggedValue<'s>,
    scratch: &'s mut ValueBuffer,
) -> EvalResult<TaggedValue<'s>> {
    if value.tag() != ValueTag::UntypedAtomic {
        return Ok(value);
    }
    scratch.reset();
    cast.cast(value, ValueTag::Double, scratch)?;
    let scratch: &'s ValueBuffer = scratch;
    Ok(scratch.as_tagged()?)
}

/// `$left op $right` for one arithmetic operator
#[derive(Debug)]
pub struct ArithmeticEvaluator<'a> {
    engine: &'a ArithmeticEngine<'a>,
    cast: &'a CastEngine<'a>,
    operator: ArithmeticOperator,
    context: DynamicContext,
    left_scratch: ValueBuffer,
    right_scratch: ValueBuffer,
}

impl<'a> ArithmeticEvaluator<'a> {
    pub fn new(
        engine: &'a ArithmeticEngine<'a>,
        cast: &'a CastEngine<'a>,
        operator: ArithmeticOperator,
        context: DynamicContext,
    ) -> Self {
        Self {
            engine,
            cast,
            operator,
            context,
            left_scratch: ValueBuffer::new(),
            right_scratch: ValueBuffer::new(),
        }
    }

    pub fn operator(&self) -> ArithmeticOperator {
        self.operator
    }

    pub fn evaluate(
        &mut self,
        left: TaggedValue<'_>,
        right: TaggedValue<'_>,
        result: &mut dyn ValueSink,
    ) -> EvalResult<()> {
        result.reset();
        let symbol = self.operator.symbol();
        let (Some(left), Some(right)) = (unwrap_argument(symbol, left)?, unwrap_argument(symbol, right)?) else {
            log::debug!("{} with an empty operand", self.operator.name());
            write_empty_sequence(result);
            return Ok(());
        };
        let left = promote_untyped(self.cast, left, &mut self.left_scratch)?;
        let right = promote_untyped(self.cast, right, &mut self.right_scratch)?;
        self.engine.apply(self.operator, left, right, &self.context, result)
    }
}
