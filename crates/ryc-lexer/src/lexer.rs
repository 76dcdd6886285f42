//! Core lexer: converts source text to a token stream.
//!
//! Features:
//! - Keywords, type names, one- and two-character operators, punctuation
//! - Number, string and char literals with escape processing
//! - Line (`//`) and block (`/* */`) comments stripped
//! - Fails at the first malformed token with a Syntax error

use ryc_types::{ErrorCode, Result, RycError, SourceFile, Span};
use tracing::trace;

use crate::token::{Token, TokenKind};

/// The ryc lexer.
///
/// Walks the source bytes once, tracking line and column for every token.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Lex the entire source into a token stream ending with [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            trace!(kind = ?token.kind, line = token.span.start_line, "token");
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    /// Consume the next byte if it equals `expected`.
    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn text_from(&self, start: usize) -> &'src str {
        std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("")
    }

    fn error(&self, code: ErrorCode, message: impl Into<String>, line: u32, col: u32) -> RycError {
        RycError::new(code, message, self.span_from(line, col))
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace and comments until the next significant byte.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n'), _) => {
                    self.advance();
                }
                (Some(b'/'), Some(b'/')) => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some(b'/'), Some(b'*')) => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let (start_line, start_col) = (self.line, self.col);
        self.advance();
        self.advance();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error(
                        ErrorCode::UNTERMINATED_COMMENT,
                        "unterminated block comment",
                        start_line,
                        start_col,
                    ))
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.advance();
                    self.advance();
                    return Ok(());
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia()?;

        let start = self.pos;
        let start_line = self.line;
        let start_col = self.col;

        let Some(ch) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, "", self.current_span()));
        };

        let kind = match ch {
            b'"' => return self.scan_string(start, start_line, start_col),
            b'\'' => return self.scan_char(start, start_line, start_col),
            b'0'..=b'9' => return self.scan_number(start, start_line, start_col),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                return self.scan_identifier(start, start_line, start_col)
            }

            b'+' if self.eat(b'+') => TokenKind::PlusPlus,
            b'+' => TokenKind::Plus,
            b'-' if self.eat(b'-') => TokenKind::MinusMinus,
            b'-' if self.eat(b'>') => TokenKind::Arrow,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'=' if self.eat(b'=') => TokenKind::EqEq,
            b'=' => TokenKind::Eq,
            b'!' if self.eat(b'=') => TokenKind::BangEq,
            b'!' => TokenKind::Bang,
            b'<' if self.eat(b'=') => TokenKind::LessEq,
            b'<' => TokenKind::Less,
            b'>' if self.eat(b'=') => TokenKind::GreaterEq,
            b'>' => TokenKind::Greater,
            b'&' if self.eat(b'&') => TokenKind::AndAnd,
            b'&' => TokenKind::Amp,
            b'|' if self.eat(b'|') => TokenKind::OrOr,

            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b':' => TokenKind::Colon,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,

            _ => {
                let shown = if ch.is_ascii_graphic() {
                    format!("'{}'", ch as char)
                } else {
                    format!("byte 0x{ch:02x}")
                };
                return Err(self.error(
                    ErrorCode::UNEXPECTED_CHARACTER,
                    format!("unexpected character {shown}"),
                    start_line,
                    start_col,
                ));
            }
        };
        Ok(Token::new(
            kind,
            self.text_from(start),
            self.span_from(start_line, start_col),
        ))
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    /// Digits with at most one `.`; `3.` is accepted as `3.0`.
    fn scan_number(&mut self, start: usize, start_line: u32, start_col: u32) -> Result<Token> {
        let mut seen_dot = false;
        while let Some(ch) = self.peek() {
            match ch {
                b'0'..=b'9' => {
                    self.advance();
                }
                b'.' if !seen_dot => {
                    seen_dot = true;
                    self.advance();
                }
                b'.' => {
                    self.advance();
                    return Err(self.error(
                        ErrorCode::MALFORMED_NUMBER,
                        format!("malformed number '{}'", self.text_from(start)),
                        start_line,
                        start_col,
                    ));
                }
                _ => break,
            }
        }

        let text = self.text_from(start);
        let value: f64 = text.trim_end_matches('.').parse().map_err(|_| {
            self.error(
                ErrorCode::MALFORMED_NUMBER,
                format!("malformed number '{text}'"),
                start_line,
                start_col,
            )
        })?;
        Ok(Token::new(
            TokenKind::NumberLit(value),
            text,
            self.span_from(start_line, start_col),
        ))
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self, start: usize, start_line: u32, start_col: u32) -> Result<Token> {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = self.text_from(start);
        if !text.bytes().any(|b| b.is_ascii_alphanumeric()) {
            return Err(self.error(
                ErrorCode::UNEXPECTED_CHARACTER,
                format!("invalid identifier '{text}'"),
                start_line,
                start_col,
            ));
        }
        let kind =
            TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        Ok(Token::new(kind, text, self.span_from(start_line, start_col)))
    }

    // ─────────────────────────────────────────────────────────────
    // String & char literals
    // ─────────────────────────────────────────────────────────────

    /// Read one escape sequence; the backslash is already consumed.
    fn scan_escape(&mut self, start_line: u32, start_col: u32) -> Result<u8> {
        let (esc_line, esc_col) = (self.line, self.col);
        match self.advance() {
            Some(b'n') => Ok(b'\n'),
            Some(b't') => Ok(b'\t'),
            Some(b'r') => Ok(b'\r'),
            Some(b'0') => Ok(0),
            Some(b'"') => Ok(b'"'),
            Some(b'\'') => Ok(b'\''),
            Some(b'\\') => Ok(b'\\'),
            Some(other) if other != b'\n' => Err(RycError::new(
                ErrorCode::INVALID_ESCAPE,
                format!("unknown escape sequence '\\{}'", other as char),
                Span::new(esc_line, esc_col.saturating_sub(1).max(1), esc_line, esc_col),
            )),
            _ => Err(self.error(
                ErrorCode::UNTERMINATED_STRING,
                "unterminated literal",
                start_line,
                start_col,
            )),
        }
    }

    fn scan_string(&mut self, start: usize, start_line: u32, start_col: u32) -> Result<Token> {
        let mut buf = Vec::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    return Err(self.error(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        start_line,
                        start_col,
                    ))
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    buf.push(self.scan_escape(start_line, start_col)?);
                }
                Some(ch) => {
                    self.advance();
                    buf.push(ch);
                }
            }
        }
        let value = String::from_utf8_lossy(&buf).into_owned();
        Ok(Token::new(
            TokenKind::StringLit(value),
            self.text_from(start),
            self.span_from(start_line, start_col),
        ))
    }

    fn scan_char(&mut self, start: usize, start_line: u32, start_col: u32) -> Result<Token> {
        let unterminated = |lexer: &Self| {
            lexer.error(
                ErrorCode::UNTERMINATED_CHAR,
                "unterminated character literal",
                start_line,
                start_col,
            )
        };

        let value = match self.peek() {
            None | Some(b'\n') => return Err(unterminated(self)),
            Some(b'\'') => {
                self.advance();
                return Err(self.error(
                    ErrorCode::INVALID_CHAR_LITERAL,
                    "empty character literal",
                    start_line,
                    start_col,
                ));
            }
            Some(b'\\') => {
                self.advance();
                self.scan_escape(start_line, start_col)?
            }
            Some(ch) => {
                self.advance();
                ch
            }
        };

        match self.peek() {
            Some(b'\'') => {
                self.advance();
            }
            None | Some(b'\n') => return Err(unterminated(self)),
            Some(_) => {
                // Consume up to the closing quote so the message can show it.
                while !matches!(self.peek(), None | Some(b'\n' | b'\'')) {
                    self.advance();
                }
                if !self.eat(b'\'') {
                    return Err(unterminated(self));
                }
                return Err(self.error(
                    ErrorCode::INVALID_CHAR_LITERAL,
                    format!(
                        "character literal {} must contain exactly one character",
                        self.text_from(start)
                    ),
                    start_line,
                    start_col,
                ));
            }
        }

        Ok(Token::new(
            TokenKind::CharLit(value),
            self.text_from(start),
            self.span_from(start_line, start_col),
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
