//! Numeric kernel shared by the constant folder and the runtime.
//!
//! `Int op Int` stays integral for `+ - * %`, `/` always produces a float,
//! any float operand promotes the result. Division or modulo by zero and
//! integer overflow are errors, never `Infinity`/`NaN`/wrap-around.

use std::cmp::Ordering;
use std::fmt;

/// A numeric literal or runtime number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i32),
    Float(f64),
}

impl Number {
    /// Classify a literal value: integral values that fit in 32 bits are
    /// `Int`, everything else is `Float`.
    pub fn from_literal(value: f64) -> Number {
        if value.fract() == 0.0 && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
            Number::Int(value as i32)
        } else {
            Number::Float(value)
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => f64::from(i),
            Number::Float(f) => f,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Arithmetic operators understood by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Rem => "%",
        }
    }
}

/// Why an arithmetic operation has no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithError {
    DivisionByZero,
    Overflow,
}

impl fmt::Display for ArithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithError::DivisionByZero => f.write_str("division by zero"),
            ArithError::Overflow => f.write_str("integer overflow"),
        }
    }
}

/// Apply `op` to two numbers.
pub fn arith(op: ArithOp, lhs: Number, rhs: Number) -> Result<Number, ArithError> {
    if matches!(op, ArithOp::Div | ArithOp::Rem) && rhs.is_zero() {
        return Err(ArithError::DivisionByZero);
    }
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => {
            let result = match op {
                ArithOp::Add => a.checked_add(b),
                ArithOp::Sub => a.checked_sub(b),
                ArithOp::Mul => a.checked_mul(b),
                ArithOp::Rem => a.checked_rem(b),
                ArithOp::Div => return Ok(Number::Float(f64::from(a) / f64::from(b))),
            };
            result.map(Number::Int).ok_or(ArithError::Overflow)
        }
        _ => {
            let (a, b) = (lhs.as_f64(), rhs.as_f64());
            Ok(Number::Float(match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div => a / b,
                ArithOp::Rem => a % b,
            }))
        }
    }
}

/// Order two numbers; mixed int/float compares as float.
pub fn compare(lhs: Number, rhs: Number) -> Option<Ordering> {
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
        _ => lhs.as_f64().partial_cmp(&rhs.as_f64()),
    }
}
