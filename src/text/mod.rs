//! Stage-boundary text formats
//!
//! Each pipeline stage hands its result to the next through a plain text
//! file. The formats are:
//! - [`tokens`]: one `TokenType::<Kind> ,"<value>"` line per token
//! - [`ast`]: the infix rendering produced by `Display for Expr`
//! - postfix: space-separated items on one line (`Display`/`FromStr` on
//!   [`crate::codegen::postfix::Postfix`])
//! - assembly: one instruction per line (`Display`/`FromStr` on
//!   [`crate::codegen::asm::Assembly`])

pub mod ast;
pub mod tokens;

use thiserror::Error;

/// A malformed line in one of the text formats
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct TextError {
    pub line: usize,
    pub message: String,
}

impl TextError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}
