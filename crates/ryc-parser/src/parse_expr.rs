//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 9. `=` (right-associative)
//! 8. `||`
//! 7. `&&`
//! 6. `==`, `!=`
//! 5. `>`, `<`, `>=`, `<=`
//! 4. `+`, `-`
//! 3. `*`, `/`, `%`
//! 2. prefix `-`, `+`, `!`, `++`, `--`, `*`, `&`
//! 1. postfix `[index]`, `(call)`, `++`, `--`
//!
//! Every binary reduction goes through the constant folder.

use ryc_lexer::token::TokenKind;
use ryc_types::ast::*;
use ryc_types::numeric::Number;
use ryc_types::stack::ensure_sufficient_stack;
use ryc_types::{ErrorCode, Result};

use crate::fold;
use crate::parse_type::TypePosition;
use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) -> Result<Expr> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `Assign = OrExpr [ "=" Assign ]`
    fn parse_assignment(&mut self) -> Result<Expr> {
        let target = self.parse_or()?;
        if self.eat(&TokenKind::Eq) {
            let value = self.parse_expression()?;
            let span = target.span.merge(value.span);
            return Ok(Expr::new(
                ExprKind::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                },
                span,
            ));
        }
        Ok(target)
    }

    /// Build a binary node, folding it when both sides are literals.
    fn binary(&self, left: Expr, op: BinOp, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        if let Some(kind) = fold::fold_binary(op, &left, &right) {
            return Expr::new(kind, span);
        }
        Expr::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        )
    }

    /// Parse a left-associative level: `Next { op Next }`.
    fn parse_left_assoc(
        &mut self,
        next: fn(&mut Self) -> Result<Expr>,
        op_for: fn(&TokenKind) -> Option<BinOp>,
    ) -> Result<Expr> {
        let mut left = next(self)?;
        while let Some(op) = op_for(self.peek_kind()) {
            self.advance();
            let right = next(self)?;
            left = self.binary(left, op, right);
        }
        Ok(left)
    }

    /// `OrExpr = AndExpr { "||" AndExpr }`
    fn parse_or(&mut self) -> Result<Expr> {
        self.parse_left_assoc(Self::parse_and, |kind| match kind {
            TokenKind::OrOr => Some(BinOp::Or),
            _ => None,
        })
    }

    /// `AndExpr = EqExpr { "&&" EqExpr }`
    fn parse_and(&mut self) -> Result<Expr> {
        self.parse_left_assoc(Self::parse_equality, |kind| match kind {
            TokenKind::AndAnd => Some(BinOp::And),
            _ => None,
        })
    }

    /// `EqExpr = RelExpr { ("==" | "!=") RelExpr }`
    fn parse_equality(&mut self) -> Result<Expr> {
        self.parse_left_assoc(Self::parse_relational, |kind| match kind {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::BangEq => Some(BinOp::NotEq),
            _ => None,
        })
    }

    /// `RelExpr = AddExpr { (">" | "<" | ">=" | "<=") AddExpr }`
    fn parse_relational(&mut self) -> Result<Expr> {
        self.parse_left_assoc(Self::parse_add, |kind| match kind {
            TokenKind::Greater => Some(BinOp::Greater),
            TokenKind::Less => Some(BinOp::Less),
            TokenKind::GreaterEq => Some(BinOp::GreaterEq),
            TokenKind::LessEq => Some(BinOp::LessEq),
            _ => None,
        })
    }

    /// `AddExpr = MulExpr { ("+" | "-") MulExpr }`
    fn parse_add(&mut self) -> Result<Expr> {
        self.parse_left_assoc(Self::parse_mul, |kind| match kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    /// `MulExpr = UnaryExpr { ("*" | "/" | "%") UnaryExpr }`
    fn parse_mul(&mut self) -> Result<Expr> {
        self.parse_left_assoc(Self::parse_unary, |kind| match kind {
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Mod),
            _ => None,
        })
    }

    /// `UnaryExpr = ( "-" | "+" | "!" | "*" | "&" | "++" | "--" ) UnaryExpr | PostfixExpr`
    fn parse_unary(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Star => UnaryOp::Deref,
            TokenKind::Amp => UnaryOp::AddrOf,
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.advance().kind == TokenKind::PlusPlus {
                    UpdateOp::Inc
                } else {
                    UpdateOp::Dec
                };
                let target = ensure_sufficient_stack(|| self.parse_unary())?;
                let span = start.merge(target.span);
                return Ok(Expr::new(
                    ExprKind::Update {
                        op,
                        prefix: true,
                        target: Box::new(target),
                    },
                    span,
                ));
            }
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = start.merge(operand.span);
        if let Some(kind) = fold::fold_unary(op, &operand) {
            return Ok(Expr::new(kind, span));
        }
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// `PostfixExpr = PrimaryExpr { "[" Expr "]" | "(" ArgList ")" | "++" | "--" }`
    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(&TokenKind::RBracket, "to close the index")?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_arg_list()?;
                    self.expect(&TokenKind::RParen, "to close the argument list")?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.advance().kind == TokenKind::PlusPlus {
                        UpdateOp::Inc
                    } else {
                        UpdateOp::Dec
                    };
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Update {
                            op,
                            prefix: false,
                            target: Box::new(expr),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a primary expression.
    fn parse_primary(&mut self) -> Result<Expr> {
        let start = self.current_span();
        let kind = match self.peek_kind() {
            // ── Literals ────────────────────────────────────────────────
            TokenKind::NumberLit(n) => ExprKind::NumberLit(Number::from_literal(*n)),
            TokenKind::StringLit(s) => ExprKind::StringLit(s.clone()),
            TokenKind::CharLit(c) => ExprKind::CharLit(*c),
            TokenKind::True => ExprKind::BoolLit(true),
            TokenKind::False => ExprKind::BoolLit(false),
            TokenKind::Null => ExprKind::NullLit,
            TokenKind::Identifier(name) => ExprKind::Identifier(name.clone()),

            // ── Compound ────────────────────────────────────────────────
            TokenKind::LBrace => return self.parse_array_literal(),
            TokenKind::StaticCast => return self.parse_cast(),
            TokenKind::LParen => {
                self.advance(); // eat `(`
                let mut inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "to close the parenthesized expression")?;
                inner.span = start.merge(self.previous_span());
                return Ok(inner);
            }

            _ => {
                return Err(self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected expression, got {}", self.describe_current()),
                ))
            }
        };
        self.advance();
        Ok(Expr::new(kind, start))
    }

    /// `"{" [ Expr { "," Expr } ] "}"`
    fn parse_array_literal(&mut self) -> Result<Expr> {
        let start = self.current_span();
        self.advance(); // eat `{`
        let mut elements = Vec::new();
        if !self.check_exact(&TokenKind::RBrace) {
            loop {
                elements.push(self.parse_expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RBrace, "to close the array literal")?;
        let span = start.merge(self.previous_span());
        Ok(Expr::new(ExprKind::ArrayLit(elements), span))
    }

    /// `"static_cast" "<" Type ">" "(" Expr ")"`
    fn parse_cast(&mut self) -> Result<Expr> {
        let start = self.current_span();
        self.advance(); // eat `static_cast`
        self.expect(&TokenKind::Less, "after 'static_cast'")?;
        let target = self.parse_type_annotation(TypePosition::Cast)?;
        self.expect(&TokenKind::Greater, "to close the cast type")?;
        self.expect(&TokenKind::LParen, "before the cast operand")?;
        let expr = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "to close the cast")?;
        let span = start.merge(self.previous_span());
        Ok(Expr::new(
            ExprKind::Cast {
                target,
                expr: Box::new(expr),
            },
            span,
        ))
    }

    /// Parse a comma-separated argument list (inside parens).
    fn parse_arg_list(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check_exact(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }
}
