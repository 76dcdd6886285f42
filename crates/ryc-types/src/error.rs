use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two fatal error families of the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Raised by the lexer or parser: the input does not match the grammar.
    Syntax,
    /// Raised while evaluating a well-formed program.
    Runtime,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => f.write_str("Syntax"),
            Self::Runtime => f.write_str("Runtime"),
        }
    }
}

/// Numeric error code (E100–E299).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Lexical errors (E100–E119) ──
    pub const UNEXPECTED_CHARACTER: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const UNTERMINATED_CHAR: Self = Self(102);
    pub const UNTERMINATED_COMMENT: Self = Self(103);
    pub const MALFORMED_NUMBER: Self = Self(104);
    pub const INVALID_ESCAPE: Self = Self(105);
    pub const INVALID_CHAR_LITERAL: Self = Self(106);

    // ── Grammar errors (E120–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(120);
    pub const MISSING_INITIALIZER: Self = Self(121);
    pub const INVALID_TYPE: Self = Self(122);
    pub const INVALID_ARRAY_SIZE: Self = Self(123);

    // ── Name resolution (E200–E209) ──
    pub const UNDEFINED_SYMBOL: Self = Self(200);
    pub const REDECLARATION: Self = Self(201);
    pub const CONST_ASSIGNMENT: Self = Self(202);
    pub const DANGLING_SCOPE: Self = Self(203);

    // ── Types & operators (E210–E229) ──
    pub const TYPE_MISMATCH: Self = Self(210);
    pub const INVALID_CAST: Self = Self(211);
    pub const DIVISION_BY_ZERO: Self = Self(212);
    pub const ARITHMETIC_OVERFLOW: Self = Self(213);
    pub const UNSUPPORTED_OPERATOR: Self = Self(214);
    pub const INVALID_ASSIGNMENT_TARGET: Self = Self(215);

    // ── Arrays (E230–E239) ──
    pub const INDEX_OUT_OF_BOUNDS: Self = Self(230);
    pub const TOO_MANY_INITIALIZERS: Self = Self(231);
    pub const NOT_AN_ARRAY: Self = Self(232);
    pub const CYCLIC_ARRAY: Self = Self(233);

    // ── Calls & control flow (E240–E259) ──
    pub const NOT_CALLABLE: Self = Self(240);
    pub const ARGUMENT_COUNT: Self = Self(241);
    pub const VOID_RETURN_VALUE: Self = Self(242);
    pub const CONTROL_OUTSIDE_LOOP: Self = Self(243);
    pub const RETURN_OUTSIDE_FUNCTION: Self = Self(244);
    pub const CALL_DEPTH_EXCEEDED: Self = Self(245);

    // ── Natives (E260–E269) ──
    pub const NATIVE_ARGUMENT: Self = Self(260);
    pub const FORMAT_ERROR: Self = Self(261);
    pub const HOST_IO: Self = Self(262);

    /// The error family this code belongs to.
    pub fn kind(self) -> ErrorKind {
        match self.0 {
            100..=199 => ErrorKind::Syntax,
            _ => ErrorKind::Runtime,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured interpreter error: syntax or runtime, always fatal.
///
/// Every stage returns this through `Result`; only the binary turns it into
/// a process exit status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind} Error: line {line}, {message}", line = .span.start_line)]
pub struct RycError {
    /// Syntax or runtime (derived from `code`).
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// Source file name, filled in once the error reaches a stage that knows it.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub file: String,
    /// The offending source line, for context.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub source_line: String,
}

impl RycError {
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: code.kind(),
            code,
            message: message.into(),
            span,
            file: String::new(),
            source_line: String::new(),
        }
    }

    /// Shorthand for a runtime error reported against a bare line number.
    pub fn runtime(code: ErrorCode, message: impl Into<String>, line: u32) -> Self {
        Self::new(code, message, Span::point(line, 1))
    }

    /// The 1-based line the error refers to.
    pub fn line(&self) -> u32 {
        self.span.start_line
    }

    /// Attach file name and source line from the file the error came from.
    pub fn with_source(mut self, source: &crate::SourceFile) -> Self {
        self.file = source.name.clone();
        self.source_line = source.line(self.span.start_line).unwrap_or("").to_string();
        self
    }
}
