//! Statement parsing.

use ryc_lexer::token::TokenKind;
use ryc_types::ast::*;
use ryc_types::stack::ensure_sufficient_stack;
use ryc_types::Result;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse a block of statements: `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Result<Block> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace, "to open a block")?;
        let mut stmts = Vec::new();
        while !self.check_exact(&TokenKind::RBrace) && !self.at_end() {
            stmts.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::RBrace, "to close the block")?;
        let span = start.merge(self.previous_span());
        Ok(Block { stmts, span })
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt> {
        ensure_sufficient_stack(|| self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt> {
        match self.peek_kind() {
            TokenKind::LBrace => self.parse_block().map(Stmt::Block),
            TokenKind::Var | TokenKind::Const => {
                let decl = self.parse_var_decl()?;
                self.expect(&TokenKind::Semicolon, "after variable declaration")?;
                Ok(Stmt::VarDecl(decl))
            }
            TokenKind::If => self.parse_if_stmt().map(Stmt::If),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Func => self.parse_func_decl().map(Stmt::FuncDecl),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Break => {
                let span = self.advance().span;
                self.expect(&TokenKind::Semicolon, "after 'break'")?;
                Ok(Stmt::Break(span))
            }
            TokenKind::Continue => {
                let span = self.advance().span;
                self.expect(&TokenKind::Semicolon, "after 'continue'")?;
                Ok(Stmt::Continue(span))
            }
            _ => {
                let expr = self.parse_expression()?;
                let span = expr.span;
                self.expect(&TokenKind::Semicolon, "after expression statement")?;
                Ok(Stmt::Expr(ExprStmt { expr, span }))
            }
        }
    }

    /// `"(" Expr ")"` around a condition.
    fn parse_condition(&mut self, keyword: &str) -> Result<Expr> {
        self.expect(&TokenKind::LParen, &format!("after '{keyword}'"))?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, &format!("to close the '{keyword}' condition"))?;
        Ok(condition)
    }

    /// `if (cond) { ... } [else { ... } | else if ...]`
    fn parse_if_stmt(&mut self) -> Result<IfStmt> {
        let start = self.current_span();
        self.advance(); // eat `if`
        let condition = self.parse_condition("if")?;
        let then_block = self.parse_block()?;
        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check_exact(&TokenKind::If) {
                Some(ElseBranch::ElseIf(Box::new(self.parse_if_stmt()?)))
            } else {
                Some(ElseBranch::Block(self.parse_block()?))
            }
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Ok(IfStmt {
            condition,
            then_block,
            else_branch,
            span,
        })
    }

    /// `while (cond) { ... }`
    fn parse_while_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.advance(); // eat `while`
        let condition = self.parse_condition("while")?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(Stmt::While(WhileStmt {
            condition,
            body,
            span,
        }))
    }

    /// `for ([init]; [cond]; [update]) { ... }`
    fn parse_for_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.advance(); // eat `for`
        self.expect(&TokenKind::LParen, "after 'for'")?;

        let init = match self.peek_kind() {
            TokenKind::Semicolon => None,
            TokenKind::Var | TokenKind::Const => {
                Some(Box::new(ForInit::VarDecl(self.parse_var_decl()?)))
            }
            _ => Some(Box::new(ForInit::Expr(self.parse_expression()?))),
        };
        self.expect(&TokenKind::Semicolon, "after the 'for' initializer")?;

        let condition = if self.check_exact(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semicolon, "after the 'for' condition")?;

        let update = if self.check_exact(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::RParen, "to close the 'for' header")?;

        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Ok(Stmt::For(ForStmt {
            init,
            condition,
            update,
            body,
            span,
        }))
    }

    /// `return [expr];`
    fn parse_return_stmt(&mut self) -> Result<Stmt> {
        let start = self.advance().span; // eat `return`
        let value = if self.check_exact(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let span = start.merge(self.previous_span());
        self.expect(&TokenKind::Semicolon, "after return statement")?;
        Ok(Stmt::Return(ReturnStmt { value, span }))
    }
}
