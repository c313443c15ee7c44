//! Reading the AST text form back into a tree
//!
//! The AST file holds the infix rendering written by `Display for Expr`.
//! It is re-lexed and run through the same parser, which reproduces every
//! tree shape the parser itself builds. The multi-line `If-else` rendering
//! is display-only and does not read back.

use crate::parser::ast::Expr;
use crate::parser::lexer::{Lexer, TokenKind};
use crate::parser::parse::{ParseError, Parser};

/// Render a tree in the AST text form.
pub fn write(expr: &Expr) -> String {
    expr.to_string()
}

/// Parse the AST text form.
pub fn read(text: &str) -> Result<Expr, ParseError> {
    let tokens = Lexer::new(text).tokenize();

    if let Some(bad) = tokens.iter().find(|t| t.kind == TokenKind::Error) {
        return Err(ParseError::new(
            format!("AST text contains {}", bad),
            bad.location,
        ));
    }

    Parser::new(tokens).parse()
}
