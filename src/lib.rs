//! # Introduction
//!
//! stackc is a miniature compiler for a small expression language. It lexes
//! integers, identifiers, arithmetic operators, assignment and `if`/`else`,
//! parses one statement into an expression tree, lowers the tree to postfix
//! (reverse Polish) form and emits stack-machine assembly.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Parser → AST
//!        → Lowering → Postfix → Generator → Assembly
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds an [`parser::ast::Expr`].
//! 2. [`codegen`]: lowers the tree to [`codegen::postfix::Postfix`] and
//!    generates an [`codegen::asm::Assembly`] listing (`mov`, `push`, `add`,
//!    `sub`, `mul`, `div`).
//! 3. [`text`]: the text formats the stages exchange when run file to file.
//! 4. [`pipeline`]: in-memory [`pipeline::compile`] and the file-based
//!    [`pipeline::Pipeline`] stage drivers.
//! 5. [`config`]: language constants, stage file layout and log settings.
//!
//! ## Example
//!
//! ```
//! let compiled = stackc::pipeline::compile("x = 2 + 3").unwrap();
//! assert_eq!(compiled.postfix.to_string(), "2 3 + x =");
//! assert_eq!(
//!     compiled.assembly.to_string(),
//!     "push 2\npush 3\nadd\nmov x, result\n"
//! );
//! ```

pub mod codegen;
pub mod config;
pub mod parser;
pub mod pipeline;
pub mod text;
