//! Declaration parsing: variables, constants and functions.

use std::rc::Rc;

use ryc_lexer::token::TokenKind;
use ryc_types::ast::*;
use ryc_types::{ErrorCode, Result};

use crate::parse_type::TypePosition;
use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Variables
    // ══════════════════════════════════════════════════════════════════════════

    /// `("var" | "const") Identifier ":" Type [ "=" Expr ]`
    ///
    /// The terminating `;` is left to the caller so the same rule serves the
    /// `for` init clause.
    pub(crate) fn parse_var_decl(&mut self) -> Result<VarDecl> {
        let start = self.current_span();
        let is_const = self.advance().kind == TokenKind::Const;
        let keyword = if is_const { "const" } else { "var" };

        let name = self.expect_identifier(&format!("after '{keyword}'"))?;
        self.expect(&TokenKind::Colon, &format!("after '{}'", name.name))?;
        let ty = self.parse_type_annotation(TypePosition::Variable)?;

        let init = if self.eat(&TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        if init.is_none() {
            if is_const {
                return Err(self.error_at(
                    ErrorCode::MISSING_INITIALIZER,
                    format!("const '{}' must be initialized", name.name),
                    name.span,
                ));
            }
            if ty.base == TypeName::Auto {
                return Err(self.error_at(
                    ErrorCode::MISSING_INITIALIZER,
                    format!("'{}' is declared 'auto' and must be initialized", name.name),
                    name.span,
                ));
            }
        }

        let span = start.merge(self.previous_span());
        Ok(VarDecl {
            name,
            ty,
            init,
            is_const,
            span,
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Functions
    // ══════════════════════════════════════════════════════════════════════════

    /// `"func" Identifier "(" [ Param { "," Param } ] ")" [ "->" Type ] Block`
    pub(crate) fn parse_func_decl(&mut self) -> Result<Rc<FuncDecl>> {
        let start = self.current_span();
        self.advance(); // eat `func`
        let name = self.expect_identifier("after 'func'")?;
        self.expect(&TokenKind::LParen, &format!("after function name '{}'", name.name))?;
        let params = self.parse_param_list()?;
        self.expect(&TokenKind::RParen, "to close the parameter list")?;

        let return_type = if self.eat(&TokenKind::Arrow) {
            self.parse_type_annotation(TypePosition::Return)?
        } else {
            TypeAnnotation::scalar(TypeName::Void, self.previous_span())
        };

        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(Rc::new(FuncDecl {
            name,
            params,
            return_type,
            body,
            span,
        }))
    }

    /// Parse a comma-separated parameter list (without the parentheses).
    fn parse_param_list(&mut self) -> Result<Vec<Param>> {
        let mut params: Vec<Param> = Vec::new();
        if self.check_exact(&TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let param = self.parse_param()?;
            if params.iter().any(|p| p.name.name == param.name.name) {
                return Err(self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("duplicate parameter '{}'", param.name.name),
                    param.name.span,
                ));
            }
            params.push(param);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    /// `"var" Identifier ":" Type [ "[" "]" ]`
    fn parse_param(&mut self) -> Result<Param> {
        let start = self.current_span();
        self.expect(&TokenKind::Var, "before parameter name")?;
        let name = self.expect_identifier("for parameter")?;
        self.expect(&TokenKind::Colon, &format!("after parameter '{}'", name.name))?;
        let ty = self.parse_type_annotation(TypePosition::Parameter)?;
        let span = start.merge(self.previous_span());
        Ok(Param { name, ty, span })
    }
}
