//! ryc lexer: converts source text into a token stream.

pub mod lexer;
pub mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind, ALL_KEYWORDS};

/// Tokenize a whole source file.
pub fn tokenize(source: &ryc_types::SourceFile) -> ryc_types::Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}
