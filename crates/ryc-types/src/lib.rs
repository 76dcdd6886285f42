//! Shared types for the ryc interpreter.
//!
//! This crate defines the AST node types, source spans, the error type,
//! and the numeric kernel that both the constant folder and the evaluator
//! use, so the two can never disagree about arithmetic.

mod error;
mod span;
pub mod ast;
pub mod numeric;
pub mod stack;

pub use error::{ErrorCode, ErrorKind, RycError};
pub use span::{SourceFile, Span};

/// Result type used throughout the interpreter.
pub type Result<T> = std::result::Result<T, RycError>;
