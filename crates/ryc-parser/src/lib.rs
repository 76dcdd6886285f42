//! ryc parser: converts a token stream into an AST.
//!
//! Recursive descent with one function per precedence level; literal
//! operands are folded as each operator is reduced.

mod fold;
mod parse_decl;
mod parse_expr;
mod parse_stmt;
mod parse_type;
mod parser;

pub use parser::Parser;

use ryc_types::ast::Program;
use ryc_types::{Result, SourceFile};

/// Lex and parse a whole source file.
pub fn parse(source: &SourceFile) -> Result<Program> {
    let tokens = ryc_lexer::tokenize(source)?;
    Parser::new(tokens, source).parse()
}
