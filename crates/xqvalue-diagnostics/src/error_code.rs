//! W3C error codes raised by the value layer
//!
//! Codes are grouped by family, mirroring the XQuery error namespace:
//! - FOxx: function and operator errors (casting, arithmetic, date/time)
//! - XPTY: type errors (operation undefined for the operand types)
//! - XPDY: dynamic errors (precision or overflow violations)
//! - SYSE: internal errors (contract violations, malformed encodings)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code family, the four-letter prefix of a W3C code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorFamily {
    /// General function errors
    Forg,
    /// Casting errors
    Foca,
    /// Arithmetic errors
    Foar,
    /// Date/time errors
    Fodt,
    /// Type errors
    Xpty,
    /// Dynamic errors
    Xpdy,
    /// Internal system errors
    Syse,
}

impl ErrorFamily {
    /// The code prefix as written in W3C error names
    pub const fn prefix(&self) -> &'static str {
        match self {
            ErrorFamily::Forg => "FORG",
            ErrorFamily::Foca => "FOCA",
            ErrorFamily::Foar => "FOAR",
            ErrorFamily::Fodt => "FODT",
            ErrorFamily::Xpty => "XPTY",
            ErrorFamily::Xpdy => "XPDY",
            ErrorFamily::Syse => "SYSE",
        }
    }
}

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode {
    family: ErrorFamily,
    number: u16,
}

impl ErrorCode {
    /// Create a new error code
    pub const fn new(family: ErrorFamily, number: u16) -> Self {
        Self { family, number }
    }

    /// Get the code family
    pub const fn family(&self) -> ErrorFamily {
        self.family
    }

    /// Get the numeric part of the code
    pub const fn number(&self) -> u16 {
        self.number
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(self).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a type error (XPTY)
    pub const fn is_type_error(&self) -> bool {
        matches!(self.family, ErrorFamily::Xpty)
    }

    /// Check if this is a dynamic error (XPDY)
    pub const fn is_dynamic_error(&self) -> bool {
        matches!(self.family, ErrorFamily::Xpdy)
    }

    /// Check if this is a function/operator error (FO**)
    pub const fn is_function_error(&self) -> bool {
        matches!(
            self.family,
            ErrorFamily::Forg | ErrorFamily::Foca | ErrorFamily::Foar | ErrorFamily::Fodt
        )
    }

    /// Check if this is an internal error (SYSE)
    pub const fn is_system_error(&self) -> bool {
        matches!(self.family, ErrorFamily::Syse)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", self.family.prefix(), self.number)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<ErrorCode, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Function and operator errors
    map.insert(
        FORG0001,
        ErrorInfo::new("Invalid value for cast/constructor")
            .with_help("The lexical form is not valid for the target type, or the value is outside its range"),
    );
    map.insert(FOCA0002, ErrorInfo::new("Invalid lexical value")
        .with_help("INF and NaN cannot be cast to xs:decimal or xs:integer"));
    map.insert(FOCA0003, ErrorInfo::new("Input value too large for integer or decimal"));
    map.insert(FOCA0005, ErrorInfo::new("NaN supplied as float/double value"));
    map.insert(FOCA0006, ErrorInfo::new("String to be cast to decimal has too many digits of precision"));
    map.insert(FOAR0001, ErrorInfo::new("Division by zero"));
    map.insert(
        FODT0001,
        ErrorInfo::new("Overflow/underflow in date/time operation")
            .with_help("Check that every field is within its calendar range (month 1-12, day within the month)"),
    );
    map.insert(FODT0002, ErrorInfo::new("Overflow/underflow in duration operation"));

    // Type errors
    map.insert(
        XPTY0004,
        ErrorInfo::new("Operation is not defined for the operand types")
            .with_help("The cast or arithmetic operator has no entry for this pair of types"),
    );

    // Dynamic errors
    map.insert(XPDY0002, ErrorInfo::new("Arithmetic overflow or precision exceeded"));

    // Internal errors
    map.insert(SYSE0001, ErrorInfo::new("Internal error"));
    map.insert(SYSE0002, ErrorInfo::new("Malformed value encoding"));

    map
});

// Function and operator errors
pub const FORG0001: ErrorCode = ErrorCode::new(ErrorFamily::Forg, 1);
pub const FOCA0002: ErrorCode = ErrorCode::new(ErrorFamily::Foca, 2);
pub const FOCA0003: ErrorCode = ErrorCode::new(ErrorFamily::Foca, 3);
pub const FOCA0005: ErrorCode = ErrorCode::new(ErrorFamily::Foca, 5);
pub const FOCA0006: ErrorCode = ErrorCode::new(ErrorFamily::Foca, 6);
pub const FOAR0001: ErrorCode = ErrorCode::new(ErrorFamily::Foar, 1);
pub const FODT0001: ErrorCode = ErrorCode::new(ErrorFamily::Fodt, 1);
pub const FODT0002: ErrorCode = ErrorCode::new(ErrorFamily::Fodt, 2);

// Type errors
pub const XPTY0004: ErrorCode = ErrorCode::new(ErrorFamily::Xpty, 4);

// Dynamic errors
pub const XPDY0002: ErrorCode = ErrorCode::new(ErrorFamily::Xpdy, 2);

// Internal errors
pub const SYSE0001: ErrorCode = ErrorCode::new(ErrorFamily::Syse, 1);
pub const SYSE0002: ErrorCode = ErrorCode::new(ErrorFamily::Syse, 2);
