//! Error types for the back half of the pipeline
//!
//! Lowering and code generation are fail-fast: the first error aborts the
//! stage and nothing partial is returned.

use thiserror::Error;

/// Errors raised while lowering an AST to postfix form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LowerError {
    /// Conditionals have no representation in the postfix instruction set
    #[error("if/else expressions cannot be lowered to postfix form")]
    UnsupportedConditional,
}

/// Errors raised while generating assembly from postfix text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// An instruction needed an operand but the operand stack was empty
    #[error("operand stack underflow at offset {position} while emitting '{instruction}'")]
    StackUnderflow {
        position: usize,
        instruction: &'static str,
    },

    /// A character that is not an operand, operator or separator
    #[error("unexpected character '{ch}' at offset {position}")]
    UnexpectedCharacter { ch: char, position: usize },
}

impl GenerateError {
    /// Character offset into the postfix text where generation stopped.
    pub fn position(&self) -> usize {
        match self {
            GenerateError::StackUnderflow { position, .. } => *position,
            GenerateError::UnexpectedCharacter { position, .. } => *position,
        }
    }
}
