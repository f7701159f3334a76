//! XQuery value layer diagnostics
//!
//! This crate provides the error infrastructure shared by the value codec,
//! the cast engine and the arithmetic engine: W3C error codes, their
//! descriptions, and the structured error surfaced to the enclosing query.

mod error;
mod error_code;

pub use error::*;
pub use error_code::*;

/// Result type for value layer operations
pub type Result<T> = std::result::Result<T, XqError>;
