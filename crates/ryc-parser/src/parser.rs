//! Core parser infrastructure: token cursor, error reporting, helpers.

use ryc_lexer::token::{Token, TokenKind};
use ryc_types::ast::{Ident, Program};
use ryc_types::{ErrorCode, Result, RycError, SourceFile, Span};
use tracing::debug;

/// The ryc parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Stops at the first malformed construct; there is no recovery.
pub struct Parser<'src> {
    /// The token stream (always ends with `Eof`).
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source file for error context.
    source_file: &'src SourceFile,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(mut tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map_or(Span::point(1, 1), |t| t.span);
            tokens.push(Token::new(TokenKind::Eof, "", span));
        }
        Self {
            tokens,
            pos: 0,
            source_file,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(1, 1)
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind, naming what it terminates in the error.
    pub(crate) fn expect(&mut self, expected: &TokenKind, context: &str) -> Result<Token> {
        if self.check_exact(expected) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{expected}' {context}, got {}", self.describe_current()),
            ))
        }
    }

    /// Expect an identifier token.
    pub(crate) fn expect_identifier(&mut self, context: &str) -> Result<Ident> {
        match self.peek_kind() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Ok(Ident::new(name, span))
            }
            _ => Err(self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected identifier {context}, got {}", self.describe_current()),
            )),
        }
    }

    /// The current token as shown in error messages.
    pub(crate) fn describe_current(&self) -> String {
        match self.peek_kind() {
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("'{}'", self.peek().lexeme),
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Build an error at the current token position.
    pub(crate) fn error_at_current(&self, code: ErrorCode, message: impl Into<String>) -> RycError {
        self.error_at(code, message, self.current_span())
    }

    /// Build an error at a specific span.
    pub(crate) fn error_at(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> RycError {
        RycError::new(code, message, span).with_source(self.source_file)
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a `Program` AST.
    pub fn parse(mut self) -> Result<Program> {
        let start = self.current_span();
        let mut stmts = Vec::new();
        while !self.at_end() {
            stmts.push(self.parse_statement()?);
        }
        let span = start.merge(self.previous_span());
        debug!(
            file = %self.source_file.name,
            statements = stmts.len(),
            "parsed program"
        );
        Ok(Program { stmts, span })
    }
}
