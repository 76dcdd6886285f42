//! Token types for the ryc lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the language and
//! [`Token`], which pairs a kind with its source text and [`Span`].

use ryc_types::ast::TypeName;
use ryc_types::Span;
use std::fmt;

/// All 21 reserved words.
///
/// These cannot be used as user-defined names. The lexer recognises each
/// one and emits a specific keyword token instead of [`TokenKind::Identifier`].
pub const ALL_KEYWORDS: &[&str] = &[
    // Declarations & control flow (11)
    "var", "const", "if", "else", "while", "for", "func", "return", "break", "continue",
    "static_cast",
    // Literals (3)
    "true", "false", "null",
    // Type names (7)
    "int", "float", "bool", "string", "char", "auto", "void",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text of the token (quotes included for literals).
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    /// Returns `true` if this token is a reserved keyword.
    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind in the language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────

    /// Numeric literal: `42`, `3.14`, `3.`
    NumberLit(f64),
    /// String literal with escapes processed: `"hi\n"`
    StringLit(String),
    /// Character literal: `'a'`, `'\0'`
    CharLit(u8),

    /// User-defined identifier: `count`, `_tmp1`
    Identifier(String),

    // ── Keywords ─────────────────────────────────────────────

    Var,
    Const,
    If,
    Else,
    While,
    For,
    Func,
    Return,
    Break,
    Continue,
    StaticCast,
    True,
    False,
    Null,

    // ── Type names ───────────────────────────────────────────

    KwInt,
    KwFloat,
    KwBool,
    KwString,
    KwChar,
    KwAuto,
    KwVoid,

    // ── Operators ────────────────────────────────────────────

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `=`
    Eq,
    /// `==`
    EqEq,
    /// `!`
    Bang,
    /// `!=`
    BangEq,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEq,
    /// `>=`
    GreaterEq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `&`
    Amp,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `->`
    Arrow,

    // ── Punctuation ──────────────────────────────────────────

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Semicolon,
    Comma,

    /// End of file
    Eof,
}

impl TokenKind {
    /// Look up a reserved word. Returns `None` for user identifiers.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "var" => TokenKind::Var,
            "const" => TokenKind::Const,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "func" => TokenKind::Func,
            "return" => TokenKind::Return,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "static_cast" => TokenKind::StaticCast,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "int" => TokenKind::KwInt,
            "float" => TokenKind::KwFloat,
            "bool" => TokenKind::KwBool,
            "string" => TokenKind::KwString,
            "char" => TokenKind::KwChar,
            "auto" => TokenKind::KwAuto,
            "void" => TokenKind::KwVoid,
            _ => return None,
        })
    }

    /// Returns `true` if this token kind is a reserved word.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Var
                | TokenKind::Const
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Func
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::StaticCast
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        ) || self.type_name().is_some()
    }

    /// The built-in type a type-name keyword denotes.
    pub fn type_name(&self) -> Option<TypeName> {
        Some(match self {
            TokenKind::KwInt => TypeName::Int,
            TokenKind::KwFloat => TypeName::Float,
            TokenKind::KwBool => TypeName::Bool,
            TokenKind::KwString => TypeName::String,
            TokenKind::KwChar => TypeName::Char,
            TokenKind::KwAuto => TypeName::Auto,
            TokenKind::KwVoid => TypeName::Void,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::NumberLit(n) => return write!(f, "{n}"),
            TokenKind::StringLit(s) => return write!(f, "\"{s}\""),
            TokenKind::CharLit(c) => return write!(f, "'{}'", char::from(*c).escape_default()),
            TokenKind::Identifier(s) => s.as_str(),
            TokenKind::Var => "var",
            TokenKind::Const => "const",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Func => "func",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::StaticCast => "static_cast",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::KwInt => "int",
            TokenKind::KwFloat => "float",
            TokenKind::KwBool => "bool",
            TokenKind::KwString => "string",
            TokenKind::KwChar => "char",
            TokenKind::KwAuto => "auto",
            TokenKind::KwVoid => "void",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::Bang => "!",
            TokenKind::BangEq => "!=",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::LessEq => "<=",
            TokenKind::GreaterEq => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Amp => "&",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Arrow => "->",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Eof => "end of file",
        };
        f.write_str(text)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
