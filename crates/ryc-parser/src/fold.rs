//! Constant folding applied at each operator reduction.
//!
//! Numbers go through the shared numeric kernel, so a folded result is the
//! value the evaluator would have produced. A fold that would fail (division
//! by zero, overflow) is skipped and the error surfaces at run time instead.

use ryc_types::ast::{BinOp, Expr, ExprKind, UnaryOp};
use ryc_types::numeric::{self, Number};
use tracing::trace;

/// Fold `left op right` if both sides are literals of a foldable kind.
pub(crate) fn fold_binary(op: BinOp, left: &Expr, right: &Expr) -> Option<ExprKind> {
    let folded = match (&left.kind, &right.kind) {
        (ExprKind::NumberLit(a), ExprKind::NumberLit(b)) => fold_numbers(op, *a, *b),
        (ExprKind::StringLit(a), ExprKind::StringLit(b)) => fold_strings(op, a, b),
        (ExprKind::BoolLit(a), ExprKind::BoolLit(b)) => fold_bools(op, *a, *b),
        _ => None,
    };
    if let Some(kind) = &folded {
        trace!(op = op.as_str(), result = ?kind, "folded constant");
    }
    folded
}

/// Fold `-n` / `+n` on a numeric literal.
pub(crate) fn fold_unary(op: UnaryOp, operand: &Expr) -> Option<ExprKind> {
    let ExprKind::NumberLit(n) = operand.kind else {
        return None;
    };
    let result = match (op, n) {
        (UnaryOp::Plus, n) => n,
        (UnaryOp::Neg, Number::Int(i)) => Number::Int(i.checked_neg()?),
        (UnaryOp::Neg, Number::Float(f)) => Number::Float(-f),
        _ => return None,
    };
    Some(ExprKind::NumberLit(result))
}

fn fold_numbers(op: BinOp, a: Number, b: Number) -> Option<ExprKind> {
    if let Some(arith) = op.arith() {
        return numeric::arith(arith, a, b).ok().map(ExprKind::NumberLit);
    }
    if op.is_comparison() {
        return numeric::compare(a, b).map(|ord| ExprKind::BoolLit(op.test_ordering(ord)));
    }
    None
}

fn fold_strings(op: BinOp, a: &str, b: &str) -> Option<ExprKind> {
    match op {
        BinOp::Add => Some(ExprKind::StringLit(format!("{a}{b}"))),
        _ if op.is_comparison() => Some(ExprKind::BoolLit(op.test_ordering(a.cmp(b)))),
        _ => None,
    }
}

fn fold_bools(op: BinOp, a: bool, b: bool) -> Option<ExprKind> {
    let value = match op {
        BinOp::And => a && b,
        BinOp::Or => a || b,
        BinOp::Eq => a == b,
        BinOp::NotEq => a != b,
        _ => return None,
    };
    Some(ExprKind::BoolLit(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ryc_types::Span;

    fn lit(kind: ExprKind) -> Expr {
        Expr::new(kind, Span::point(1, 1))
    }

    fn int(i: i32) -> Expr {
        lit(ExprKind::NumberLit(Number::Int(i)))
    }

    #[test]
    fn test_int_arithmetic_folds_to_int() {
        assert_eq!(
            fold_binary(BinOp::Mul, &int(6), &int(7)),
            Some(ExprKind::NumberLit(Number::Int(42)))
        );
        assert_eq!(
            fold_binary(BinOp::Mod, &int(7), &int(4)),
            Some(ExprKind::NumberLit(Number::Int(3)))
        );
    }

    #[test]
    fn test_division_folds_to_float() {
        assert_eq!(
            fold_binary(BinOp::Div, &int(8), &int(2)),
            Some(ExprKind::NumberLit(Number::Float(4.0)))
        );
    }

    #[test]
    fn test_failing_folds_are_skipped() {
        assert_eq!(fold_binary(BinOp::Div, &int(1), &int(0)), None);
        assert_eq!(fold_binary(BinOp::Mod, &int(1), &int(0)), None);
        assert_eq!(fold_binary(BinOp::Add, &int(i32::MAX), &int(1)), None);
        assert_eq!(fold_unary(UnaryOp::Neg, &int(i32::MIN)), None);
    }

    #[test]
    fn test_string_folds() {
        let a = lit(ExprKind::StringLit("ab".into()));
        let b = lit(ExprKind::StringLit("b".into()));
        assert_eq!(
            fold_binary(BinOp::Add, &a, &b),
            Some(ExprKind::StringLit("abb".into()))
        );
        assert_eq!(fold_binary(BinOp::Less, &a, &b), Some(ExprKind::BoolLit(true)));
        assert_eq!(fold_binary(BinOp::Sub, &a, &b), None);
    }

    #[test]
    fn test_bool_folds() {
        let t = lit(ExprKind::BoolLit(true));
        let f = lit(ExprKind::BoolLit(false));
        assert_eq!(fold_binary(BinOp::And, &t, &f), Some(ExprKind::BoolLit(false)));
        assert_eq!(fold_binary(BinOp::Or, &t, &f), Some(ExprKind::BoolLit(true)));
        assert_eq!(fold_binary(BinOp::NotEq, &t, &f), Some(ExprKind::BoolLit(true)));
        assert_eq!(fold_binary(BinOp::Less, &t, &f), None);
    }

    #[test]
    fn test_mixed_kinds_do_not_fold() {
        let s = lit(ExprKind::StringLit("abc".into()));
        assert_eq!(fold_binary(BinOp::Add, &s, &int(1)), None);
        assert_eq!(fold_binary(BinOp::Eq, &lit(ExprKind::NullLit), &int(1)), None);
        assert_eq!(fold_binary(BinOp::Add, &lit(ExprKind::CharLit(b'a')), &int(1)), None);
    }
}
