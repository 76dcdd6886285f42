//! Type annotation parsing.

use ryc_lexer::token::TokenKind;
use ryc_types::ast::*;
use ryc_types::{ErrorCode, Result};

use crate::parser::Parser;

/// Where a type annotation appears; decides which forms are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypePosition {
    /// `var x: T[N]`
    Variable,
    /// `func f(var p: T[])`
    Parameter,
    /// `-> T[]`
    Return,
    /// `static_cast<T[]>`
    Cast,
}

impl<'src> Parser<'src> {
    /// Parse a type annotation.
    ///
    /// ```ebnf
    /// Type   = TypeName [ "[" [ Number ] "]" ] ;
    /// TypeName = "int" | "float" | "bool" | "string" | "char" | "auto" | "void" ;
    /// ```
    pub(crate) fn parse_type_annotation(&mut self, position: TypePosition) -> Result<TypeAnnotation> {
        let start = self.current_span();
        let Some(base) = self.peek_kind().type_name() else {
            return Err(self.error_at_current(
                ErrorCode::INVALID_TYPE,
                format!("expected type name, got {}", self.describe_current()),
            ));
        };
        self.advance();

        match (base, position) {
            (TypeName::Void, TypePosition::Return) => {}
            (TypeName::Void, _) => {
                return Err(self.error_at(
                    ErrorCode::INVALID_TYPE,
                    "'void' is only valid as a function return type",
                    start,
                ))
            }
            (TypeName::Auto, TypePosition::Return) => {
                return Err(self.error_at(
                    ErrorCode::INVALID_TYPE,
                    "a function return type cannot be 'auto'",
                    start,
                ))
            }
            (TypeName::Auto, TypePosition::Cast) => {
                return Err(self.error_at(
                    ErrorCode::INVALID_TYPE,
                    "cannot cast to 'auto'",
                    start,
                ))
            }
            _ => {}
        }

        let array = if self.eat(&TokenKind::LBracket) {
            if base == TypeName::Void {
                return Err(self.error_at(
                    ErrorCode::INVALID_TYPE,
                    "'void' cannot be an array element type",
                    start,
                ));
            }
            let size = self.parse_array_size(position)?;
            self.expect(&TokenKind::RBracket, "to close the array type")?;
            Some(ArraySuffix { size })
        } else {
            None
        };

        let span = start.merge(self.previous_span());
        Ok(TypeAnnotation { base, array, span })
    }

    /// The optional `N` inside `T[N]`; only variable declarations take one.
    fn parse_array_size(&mut self, position: TypePosition) -> Result<Option<usize>> {
        let TokenKind::NumberLit(value) = *self.peek_kind() else {
            return Ok(None);
        };
        let span = self.current_span();
        if position != TypePosition::Variable {
            return Err(self.error_at(
                ErrorCode::INVALID_ARRAY_SIZE,
                "an array size is only allowed in a variable declaration",
                span,
            ));
        }
        if value.fract() != 0.0 || value < 0.0 {
            return Err(self.error_at(
                ErrorCode::INVALID_ARRAY_SIZE,
                format!("invalid array size '{}'", self.peek().lexeme),
                span,
            ));
        }
        if value > MAX_ARRAY_SIZE as f64 {
            return Err(self.error_at(
                ErrorCode::INVALID_ARRAY_SIZE,
                format!(
                    "array size '{}' exceeds the maximum of {MAX_ARRAY_SIZE}",
                    self.peek().lexeme
                ),
                span,
            ));
        }
        self.advance();
        Ok(Some(value as usize))
    }
}
