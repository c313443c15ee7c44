//! Front end: source text → tokens → expression tree
//!
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST)
//! - [`ast`]: AST node definitions and the infix rendering
//!
//! # Language
//!
//! Integers, identifiers, the four arithmetic operators, assignment and an
//! `if`/`else` form. All arithmetic operators share one precedence level.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with a single forward cursor.
//! No external parser generator dependencies.

pub mod ast;
pub mod lexer;
pub mod parse;
