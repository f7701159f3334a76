//! Evaluation errors for the cast and arithmetic engines

use thiserror::Error;
use xqvalue_diagnostics::{
    ErrorCode, FOAR0001, FOCA0002, FOCA0003, FOCA0005, FOCA0006, FODT0001, FODT0002, FORG0001,
    SYSE0001, XPDY0002, XPTY0004, XqError,
};

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur while casting or combining values
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Lexical form not accepted by the target type
    #[error("Invalid lexical form for {type_name}: {value:?}")]
    InvalidLexical { type_name: String, value: String },

    /// Value outside the value space of the target type
    #[error("Value {value} is outside the range of {type_name}")]
    OutOfRange { type_name: String, value: String },

    /// Infinite or NaN value cast to a type without such values
    #[error("Cannot cast {value} to {type_name}")]
    NonFiniteValue { type_name: String, value: String },

    /// Numeric value too large for the target type
    #[error("Numeric overflow casting {value} to {type_name}")]
    NumericOverflow { type_name: String, value: String },

    /// Decimal lexical form with more digits than can be held
    #[error("Decimal {value:?} has more digits than supported")]
    TooManyDigits { value: String },

    /// Date or time fields that do not name a calendar instant
    #[error("Invalid {type_name}: {message}")]
    InvalidDateTime { type_name: String, message: String },

    /// Duration result outside the representable range
    #[error("Duration overflow in {operation}")]
    DurationOverflow { operation: String },

    /// NaN factor in duration multiplication or division
    #[error("NaN operand in {operation}")]
    NaNOperand { operation: String },

    /// Cast not defined for the type pair
    #[error("Cannot cast {from_type} to {to_type}")]
    CastNotDefined { from_type: String, to_type: String },

    /// Arithmetic operator not defined for the operand types
    #[error("Unsupported operator: {operator} for types {types}")]
    UnsupportedOperator { operator: String, types: String },

    /// Operand that is not a single atomic value
    #[error("Invalid operand for {operator}: {message}")]
    InvalidOperand { operator: String, message: String },

    /// Decimal result needing more digits than can be held
    #[error("Decimal precision exceeded in {operation}")]
    PrecisionExceeded { operation: String },

    /// Integer arithmetic overflow
    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: String },

    /// Exact division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Codec or registry error
    #[error(transparent)]
    Value(#[from] XqError),

    /// Internal error (should not happen)
    #[error("Internal evaluation error: {message}")]
    Internal { message: String },
}

impl EvalError {
    /// The error code reported to the enclosing query
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidLexical { .. } | Self::OutOfRange { .. } => FORG0001,
            Self::NonFiniteValue { .. } => FOCA0002,
            Self::NumericOverflow { .. } => FOCA0003,
            Self::NaNOperand { .. } => FOCA0005,
            Self::TooManyDigits { .. } => FOCA0006,
            Self::InvalidDateTime { .. } => FODT0001,
            Self::DurationOverflow { .. } => FODT0002,
            Self::CastNotDefined { .. } | Self::UnsupportedOperator { .. } | Self::InvalidOperand { .. } => {
                XPTY0004
            }
            Self::PrecisionExceeded { .. } | Self::Overflow { .. } => XPDY0002,
            Self::DivisionByZero => FOAR0001,
            Self::Value(err) => err.code(),
            Self::Internal { .. } => SYSE0001,
        }
    }

    /// Create an invalid lexical form error
    pub fn invalid_lexical(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidLexical {
            type_name: type_name.into(),
            value: value.into(),
        }
    }

    /// Create an out of range error
    pub fn out_of_range(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::OutOfRange {
            type_name: type_name.into(),
            value: value.into(),
        }
    }

    pub fn non_finite(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NonFiniteValue {
            type_name: type_name.into(),
            value: value.into(),
        }
    }

    pub fn numeric_overflow(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NumericOverflow {
            type_name: type_name.into(),
            value: value.into(),
        }
    }

    pub fn too_many_digits(value: impl Into<String>) -> Self {
        Self::TooManyDigits { value: value.into() }
    }

    /// Create an invalid date/time error
    pub fn invalid_date_time(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDateTime {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub fn duration_overflow(operation: impl Into<String>) -> Self {
        Self::DurationOverflow {
            operation: operation.into(),
        }
    }

    pub fn nan_operand(operation: impl Into<String>) -> Self {
        Self::NaNOperand {
            operation: operation.into(),
        }
    }

    /// Create a cast-not-defined error
    pub fn cast_not_defined(from_type: impl Into<String>, to_type: impl Into<String>) -> Self {
        Self::CastNotDefined {
            from_type: from_type.into(),
            to_type: to_type.into(),
        }
    }

    /// Create an unsupported operator error
    pub fn unsupported_operator(operator: impl Into<String>, types: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
            types: types.into(),
        }
    }

    /// Create an invalid operand error
    pub fn invalid_operand(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOperand {
            operator: operator.into(),
            message: message.into(),
        }
    }

    pub fn precision_exceeded(operation: impl Into<String>) -> Self {
        Self::PrecisionExceeded {
            operation: operation.into(),
        }
    }

    /// Create an overflow error
    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<EvalError> for XqError {
    fn from(err: EvalError) -> Self {
        match err {
            EvalError::Value(inner) => inner,
            other => XqError::new(other.code(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_has_one_code() {
        assert_eq!(EvalError::invalid_lexical("xs:integer", "1x").code(), FORG0001);
        assert_eq!(EvalError::non_finite("xs:decimal", "INF").code(), FOCA0002);
        assert_eq!(EvalError::cast_not_defined("xs:date", "xs:time").code(), XPTY0004);
        assert_eq!(EvalError::precision_exceeded("add").code(), XPDY0002);
        assert_eq!(EvalError::DivisionByZero.code(), FOAR0001);
    }

    #[test]
    fn test_conversion_keeps_code() {
        let err: XqError = EvalError::invalid_date_time("xs:date", "day 30 of February").into();
        assert_eq!(err.code(), FODT0001);
        assert!(err.message().contains("February"));

        let inner = XqError::malformed("truncated");
        let err: XqError = EvalError::from(inner.clone()).into();
        assert_eq!(err, inner);
    }
}
