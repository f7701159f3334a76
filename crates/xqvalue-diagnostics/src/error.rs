//! Structured errors surfaced by the value layer

use crate::{ErrorCode, ErrorFamily};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main value layer error type
///
/// Every failure carries exactly one W3C code. The variant is picked from the
/// code's family so that callers can branch on the error category without
/// inspecting the code itself.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum XqError {
    /// Type error: the operation is not defined for the operand types
    #[error("{code}: {message}")]
    Type {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Dynamic error raised while computing a value
    #[error("{code}: {message}")]
    Dynamic {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Function/operator error (casting, arithmetic, date/time)
    #[error("{code}: {message}")]
    Function {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Internal error: contract violation or malformed encoding
    #[error("{code}: {message}")]
    System {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },
}

impl XqError {
    /// Create an error, choosing the category from the code family
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match code.family() {
            ErrorFamily::Xpty => Self::Type {
                code,
                message,
                context: None,
            },
            ErrorFamily::Xpdy => Self::Dynamic {
                code,
                message,
                context: None,
            },
            ErrorFamily::Syse => Self::System {
                code,
                message,
                context: None,
            },
            ErrorFamily::Forg | ErrorFamily::Foca | ErrorFamily::Foar | ErrorFamily::Fodt => {
                Self::Function {
                    code,
                    message,
                    context: None,
                }
            }
        }
    }

    /// Create a malformed-encoding error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(crate::SYSE0002, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(crate::SYSE0001, message)
    }

    /// Attach context describing where the error surfaced
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        match &mut self {
            Self::Type { context, .. }
            | Self::Dynamic { context, .. }
            | Self::Function { context, .. }
            | Self::System { context, .. } => *context = Some(ctx.into()),
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Type { code, .. }
            | Self::Dynamic { code, .. }
            | Self::Function { code, .. }
            | Self::System { code, .. } => *code,
        }
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        match self {
            Self::Type { message, .. }
            | Self::Dynamic { message, .. }
            | Self::Function { message, .. }
            | Self::System { message, .. } => message,
        }
    }

    /// Get the attached context, if any
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Type { context, .. }
            | Self::Dynamic { context, .. }
            | Self::Function { context, .. }
            | Self::System { context, .. } => context.as_deref(),
        }
    }
}
