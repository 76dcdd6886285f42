//! Operator dispatch on runtime values.
//!
//! Binary operators dispatch on the left operand's kind. Arithmetic goes
//! through `ryc_types::numeric`, the same kernel the constant folder uses.
//! The evaluator short-circuits `&&` and `||` before they get here.

use std::cmp::Ordering;

use ryc_types::ast::{BinOp, UnaryOp, UpdateOp};
use ryc_types::numeric::{self, ArithError, ArithOp, Number};
use ryc_types::{ErrorCode, Result, RycError};

use crate::value::Value;

/// Apply a binary operator to two evaluated operands.
pub fn binary(op: BinOp, left: &Value, right: &Value, line: u32) -> Result<Value> {
    match op {
        BinOp::Eq => equals(left, right, line).map(Value::Bool),
        BinOp::NotEq => equals(left, right, line).map(|eq| Value::Bool(!eq)),
        BinOp::Greater | BinOp::Less | BinOp::GreaterEq | BinOp::LessEq => {
            let ord = order(op, left, right, line)?;
            Ok(Value::Bool(ord.is_some_and(|ord| op.test_ordering(ord))))
        }
        BinOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        BinOp::Add => match (left, right) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
            _ => arithmetic(ArithOp::Add, op, left, right, line),
        },
        BinOp::Sub => arithmetic(ArithOp::Sub, op, left, right, line),
        BinOp::Mul => arithmetic(ArithOp::Mul, op, left, right, line),
        BinOp::Div => arithmetic(ArithOp::Div, op, left, right, line),
        BinOp::Mod => arithmetic(ArithOp::Rem, op, left, right, line),
    }
}

/// Apply a prefix operator.
pub fn unary(op: UnaryOp, operand: &Value, line: u32) -> Result<Value> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Plus => match numeric_of(operand) {
            Some(n) => Ok(from_number(n)),
            None => Err(unary_mismatch(op, operand, line)),
        },
        UnaryOp::Neg => match numeric_of(operand) {
            Some(Number::Int(i)) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| arith_error(ArithError::Overflow, line)),
            Some(Number::Float(f)) => Ok(Value::Float(-f)),
            None => Err(unary_mismatch(op, operand, line)),
        },
        UnaryOp::Deref | UnaryOp::AddrOf => Err(RycError::runtime(
            ErrorCode::UNSUPPORTED_OPERATOR,
            format!("operator '{}' is not supported: the language has no pointers", op.as_str()),
            line,
        )),
    }
}

/// The value `++`/`--` stores back into its target.
pub fn step(op: UpdateOp, current: &Value, line: u32) -> Result<Value> {
    let number = match current {
        Value::Int(i) => Number::Int(*i),
        Value::Float(f) => Number::Float(*f),
        Value::Char(c) => {
            let next = match op {
                UpdateOp::Inc => c.checked_add(1),
                UpdateOp::Dec => c.checked_sub(1),
            };
            return next
                .map(Value::Char)
                .ok_or_else(|| arith_error(ArithError::Overflow, line));
        }
        other => {
            return Err(RycError::runtime(
                ErrorCode::TYPE_MISMATCH,
                format!("cannot apply '{}' to {}", op.as_str(), other.kind_name()),
                line,
            ))
        }
    };
    numeric::arith(op.arith(), number, Number::Int(1))
        .map(from_number)
        .map_err(|e| arith_error(e, line))
}

/// `==` semantics; `!=` is its negation.
pub fn equals(left: &Value, right: &Value, line: u32) -> Result<bool> {
    match (left, right) {
        (Value::Null, other) | (other, Value::Null) => Ok(other.is_null()),
        (Value::Int(_) | Value::Float(_) | Value::Char(_), _) if numeric_of(right).is_some() => {
            Ok(compare_numbers(left, right) == Some(Ordering::Equal))
        }
        (Value::Int(_) | Value::Float(_), Value::Bool(b)) | (Value::Bool(b), Value::Int(_) | Value::Float(_)) => {
            let number = if matches!(left, Value::Bool(_)) { right } else { left };
            let flag = Value::Int(i32::from(*b));
            Ok(compare_numbers(number, &flag) == Some(Ordering::Equal))
        }
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::String(a), Value::String(b)) => Ok(a == b),
        (Value::Array(a), Value::Array(b)) => {
            if a.ptr_eq(b) {
                return Ok(true);
            }
            let (a, b) = (a.borrow().clone(), b.borrow().clone());
            if a.len() != b.len() {
                return Ok(false);
            }
            for (x, y) in a.iter().zip(&b) {
                if !equals(x, y, line)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Err(mismatch(BinOp::Eq, left, right, line)),
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn arithmetic(kernel: ArithOp, op: BinOp, left: &Value, right: &Value, line: u32) -> Result<Value> {
    match (numeric_of(left), numeric_of(right)) {
        (Some(a), Some(b)) => numeric::arith(kernel, a, b)
            .map(from_number)
            .map_err(|e| arith_error(e, line)),
        _ => Err(mismatch(op, left, right, line)),
    }
}

fn order(op: BinOp, left: &Value, right: &Value, line: u32) -> Result<Option<Ordering>> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        _ if numeric_of(left).is_some() && numeric_of(right).is_some() => {
            Ok(compare_numbers(left, right))
        }
        _ => Err(mismatch(op, left, right, line)),
    }
}

fn compare_numbers(left: &Value, right: &Value) -> Option<Ordering> {
    numeric::compare(numeric_of(left)?, numeric_of(right)?)
}

/// Numeric view of a value; chars count by their ordinal.
fn numeric_of(value: &Value) -> Option<Number> {
    match value {
        Value::Int(i) => Some(Number::Int(*i)),
        Value::Float(f) => Some(Number::Float(*f)),
        Value::Char(c) => Some(Number::Int(i32::from(*c))),
        _ => None,
    }
}

fn from_number(n: Number) -> Value {
    match n {
        Number::Int(i) => Value::Int(i),
        Number::Float(f) => Value::Float(f),
    }
}

fn arith_error(err: ArithError, line: u32) -> RycError {
    let code = match err {
        ArithError::DivisionByZero => ErrorCode::DIVISION_BY_ZERO,
        ArithError::Overflow => ErrorCode::ARITHMETIC_OVERFLOW,
    };
    RycError::runtime(code, err.to_string(), line)
}

fn mismatch(op: BinOp, left: &Value, right: &Value, line: u32) -> RycError {
    RycError::runtime(
        ErrorCode::TYPE_MISMATCH,
        format!(
            "cannot apply '{op}' to {} and {}",
            left.kind_name(),
            right.kind_name()
        ),
        line,
    )
}

fn unary_mismatch(op: UnaryOp, operand: &Value, line: u32) -> RycError {
    RycError::runtime(
        ErrorCode::TYPE_MISMATCH,
        format!("cannot apply unary '{}' to {}", op.as_str(), operand.kind_name()),
        line,
    )
}
