//! Postfix → stack-machine assembly
//!
//! The generator scans postfix text left to right and keeps a stack of
//! operand *names*; nothing is evaluated. Each arithmetic operator pops two
//! names, emits `push` for both followed by the mnemonic, and leaves the
//! placeholder operand `result` in their place. An `=` pops the target name
//! and then the value and emits `mov target, value`.
//!
//! ```text
//! 2 3 + x =   →   push 2
//!                 push 3
//!                 add
//!                 mov x, result
//! ```
//!
//! Operands still on the stack once the input is exhausted are flushed as
//! trailing `push` instructions (top of stack first), skipping `result`.
//!
//! `mov` pushes nothing back, so an assignment cannot feed another
//! instruction. Trees the parser accepts with an assignment as an operand,
//! such as `x = y = 3` (`3 y = x =`) or `1 + y = 2`, fail here with
//! [`GenerateError::StackUnderflow`].

use super::errors::GenerateError;
use super::postfix::Postfix;
use crate::config::RESULT_OPERAND;
use crate::parser::ast::BinOp;
use crate::text::TextError;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// Stack-machine instructions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Mov { target: String, value: String },
    Push(String),
    Add,
    Sub,
    Mul,
    Div,
}

impl Instr {
    pub fn arithmetic(op: BinOp) -> Self {
        match op {
            BinOp::Add => Instr::Add,
            BinOp::Sub => Instr::Sub,
            BinOp::Mul => Instr::Mul,
            BinOp::Div => Instr::Div,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instr::Mov { .. } => "mov",
            Instr::Push(_) => "push",
            Instr::Add => "add",
            Instr::Sub => "sub",
            Instr::Mul => "mul",
            Instr::Div => "div",
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Mov { target, value } => write!(f, "mov {}, {}", target, value),
            Instr::Push(operand) => write!(f, "push {}", operand),
            other => f.write_str(other.mnemonic()),
        }
    }
}

impl FromStr for Instr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (mnemonic, operands) = match s.split_once(char::is_whitespace) {
            Some((mnemonic, rest)) => (mnemonic, rest.trim()),
            None => (s, ""),
        };

        let instr = match mnemonic {
            "mov" => {
                let (target, value) = operands
                    .split_once(',')
                    .ok_or_else(|| format!("'mov' needs two operands: '{}'", s))?;
                Instr::Mov {
                    target: target.trim().to_string(),
                    value: value.trim().to_string(),
                }
            }
            "push" if !operands.is_empty() => Instr::Push(operands.to_string()),
            "push" => return Err("'push' needs an operand".to_string()),
            "add" => Instr::Add,
            "sub" => Instr::Sub,
            "mul" => Instr::Mul,
            "div" => Instr::Div,
            other => return Err(format!("unknown mnemonic '{}'", other)),
        };

        let arithmetic = matches!(instr, Instr::Add | Instr::Sub | Instr::Mul | Instr::Div);
        if arithmetic && !operands.is_empty() {
            return Err(format!("'{}' takes no operands", mnemonic));
        }

        Ok(instr)
    }
}

/// An ordered list of generated instructions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    pub instructions: Vec<Instr>,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instr: Instr) {
        trace!(instruction = %instr, "emit");
        self.instructions.push(instr);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Assembly text form: one instruction per line, each newline-terminated.
impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instructions {
            writeln!(f, "{}", instr)?;
        }
        Ok(())
    }
}

impl FromStr for Assembly {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut instructions = Vec::new();
        for (index, line) in s.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let instr = line
                .parse()
                .map_err(|message| TextError::new(index + 1, message))?;
            instructions.push(instr);
        }
        Ok(Self { instructions })
    }
}

/// Operand names awaiting an instruction. Popping an empty stack is an error.
#[derive(Debug, Clone, Default)]
pub struct OperandStack {
    operands: Vec<String>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operand: impl Into<String>) {
        self.operands.push(operand.into());
    }

    /// Pop the top operand, reporting which instruction needed it.
    pub fn pop(
        &mut self,
        position: usize,
        instruction: &'static str,
    ) -> Result<String, GenerateError> {
        self.operands.pop().ok_or(GenerateError::StackUnderflow {
            position,
            instruction,
        })
    }

    pub fn depth(&self) -> usize {
        self.operands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operands.is_empty()
    }

    /// Remove all operands, top of stack first.
    pub fn drain_top_first(&mut self) -> impl Iterator<Item = String> + '_ {
        self.operands.drain(..).rev()
    }
}

/// Generate assembly from postfix text.
pub fn generate(postfix: &str) -> Result<Assembly, GenerateError> {
    let chars: Vec<char> = postfix.chars().collect();
    let mut stack = OperandStack::new();
    let mut asm = Assembly::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
        } else if c == '=' {
            let target = stack.pop(i, "mov")?;
            let value = stack.pop(i, "mov")?;
            asm.push(Instr::Mov { target, value });
            i += 1;
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            stack.push(chars[start..i].iter().collect::<String>());
        } else if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            stack.push(chars[start..i].iter().collect::<String>());
        } else if let Some(op) = BinOp::from_symbol(c.encode_utf8(&mut [0; 4])) {
            let instr = Instr::arithmetic(op);
            let operand1 = stack.pop(i, instr.mnemonic())?;
            let operand2 = stack.pop(i, instr.mnemonic())?;
            asm.push(Instr::Push(operand2));
            asm.push(Instr::Push(operand1));
            asm.push(instr);
            stack.push(RESULT_OPERAND);
            i += 1;
        } else {
            return Err(GenerateError::UnexpectedCharacter { ch: c, position: i });
        }
    }

    if !stack.is_empty() {
        debug!(remaining = stack.depth(), "flushing residual operands");
    }
    for operand in stack.drain_top_first() {
        if operand != RESULT_OPERAND {
            asm.push(Instr::Push(operand));
        }
    }

    Ok(asm)
}

/// Generate assembly from an in-memory postfix stream.
pub fn generate_postfix(postfix: &Postfix) -> Result<Assembly, GenerateError> {
    generate(&postfix.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(asm: &Assembly) -> Vec<String> {
        asm.instructions.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_assignment_of_sum() {
        let asm = generate("2 3 + x =").unwrap();
        assert_eq!(lines(&asm), vec!["push 2", "push 3", "add", "mov x, result"]);
    }

    #[test]
    fn test_chained_operators() {
        let asm = generate("1 2 + 3 * x =").unwrap();
        assert_eq!(
            lines(&asm),
            vec![
                "push 1",
                "push 2",
                "add",
                "push result",
                "push 3",
                "mul",
                "mov x, result",
            ]
        );
    }

    #[test]
    fn test_operand_order_for_non_commutative_ops() {
        let asm = generate("8 2 -").unwrap();
        assert_eq!(lines(&asm), vec!["push 8", "push 2", "sub"]);

        let asm = generate("a b /").unwrap();
        assert_eq!(lines(&asm), vec!["push a", "push b", "div"]);
    }

    #[test]
    fn test_multi_digit_literals_stay_whole() {
        let asm = generate("12 345 + total =").unwrap();
        assert_eq!(
            lines(&asm),
            vec!["push 12", "push 345", "add", "mov total, result"]
        );
    }

    #[test]
    fn test_plain_assignment() {
        let asm = generate("7 y =").unwrap();
        assert_eq!(lines(&asm), vec!["mov y, 7"]);
    }

    #[test]
    fn test_residual_operands_flushed_top_first() {
        let asm = generate("1 2 3 +").unwrap();
        assert_eq!(lines(&asm), vec!["push 2", "push 3", "add", "push 1"]);

        let asm = generate("a b").unwrap();
        assert_eq!(lines(&asm), vec!["push b", "push a"]);
    }

    #[test]
    fn test_stack_underflow_is_an_error() {
        let err = generate("1 +").unwrap_err();
        assert_eq!(
            err,
            GenerateError::StackUnderflow {
                position: 2,
                instruction: "add",
            }
        );

        let err = generate("=").unwrap_err();
        assert!(matches!(err, GenerateError::StackUnderflow { instruction: "mov", .. }));
    }

    #[test]
    fn test_unexpected_character() {
        let err = generate("1 2 %").unwrap_err();
        assert_eq!(err, GenerateError::UnexpectedCharacter { ch: '%', position: 4 });
        assert_eq!(err.position(), 4);
    }

    #[test]
    fn test_empty_input() {
        assert!(generate("").unwrap().is_empty());
    }

    #[test]
    fn test_assembly_text_round_trip() {
        let asm = generate("1 2 + 3 * x =").unwrap();
        let text = asm.to_string();
        assert!(text.ends_with("mov x, result\n"));
        assert_eq!(text.parse::<Assembly>().unwrap(), asm);
    }

    #[test]
    fn test_assembly_text_rejects_bad_lines() {
        let err = "push 1\njmp 4\n".parse::<Assembly>().unwrap_err();
        assert_eq!(err.line, 2);
        assert!("mov x".parse::<Instr>().is_err());
        assert!("add 3".parse::<Instr>().is_err());
        assert!("push".parse::<Instr>().is_err());
    }
}
