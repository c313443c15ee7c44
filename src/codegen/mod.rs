//! Back end: expression tree → postfix → stack-machine assembly
//!
//! - [`postfix`]: post-order lowering of the AST to a postfix stream
//! - [`asm`]: assembly generation from postfix text with an operand stack
//! - [`errors`]: lowering and generation error types

pub mod asm;
pub mod errors;
pub mod postfix;
