//! AST → postfix lowering
//!
//! A post-order walk of the expression tree: operands first, operator last.
//! Assignments lower to `<value> <target> =`, so `x = 2 + 3` becomes
//! `2 3 + x =`.

use super::errors::LowerError;
use crate::parser::ast::{BinOp, Expr};
use crate::text::TextError;
use std::fmt;
use std::str::FromStr;

/// One item of a postfix instruction stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostfixToken {
    Int(i64),
    Name(String),
    Op(BinOp),
    Assign,
}

impl PostfixToken {
    /// True for items that consume operands (`+ - * /` and `=`).
    pub fn is_operator(&self) -> bool {
        matches!(self, PostfixToken::Op(_) | PostfixToken::Assign)
    }
}

impl fmt::Display for PostfixToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostfixToken::Int(value) => write!(f, "{}", value),
            PostfixToken::Name(name) => write!(f, "{}", name),
            PostfixToken::Op(op) => write!(f, "{}", op),
            PostfixToken::Assign => write!(f, "="),
        }
    }
}

impl FromStr for PostfixToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "=" {
            return Ok(PostfixToken::Assign);
        }
        if let Some(op) = BinOp::from_symbol(s) {
            return Ok(PostfixToken::Op(op));
        }
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            return s
                .parse()
                .map(PostfixToken::Int)
                .map_err(|e| format!("integer '{}' out of range: {}", s, e));
        }
        let mut chars = s.chars();
        if chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric())
        {
            return Ok(PostfixToken::Name(s.to_string()));
        }
        Err(format!("invalid postfix item '{}'", s))
    }
}

/// A linearised expression, append-only while it is being built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Postfix {
    tokens: Vec<PostfixToken>,
}

impl Postfix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: PostfixToken) {
        self.tokens.push(token);
    }

    pub fn tokens(&self) -> &[PostfixToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl From<Vec<PostfixToken>> for Postfix {
    fn from(tokens: Vec<PostfixToken>) -> Self {
        Self { tokens }
    }
}

/// Postfix text form: items separated by single spaces, on one line.
impl fmt::Display for Postfix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl FromStr for Postfix {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut postfix = Postfix::new();
        for (index, line) in s.lines().enumerate() {
            for item in line.split_whitespace() {
                let token = item
                    .parse()
                    .map_err(|message| TextError::new(index + 1, message))?;
                postfix.push(token);
            }
        }
        Ok(postfix)
    }
}

/// Lower an expression tree to postfix order.
pub fn lower(root: &Expr) -> Result<Postfix, LowerError> {
    let mut postfix = Postfix::new();
    emit(root, &mut postfix)?;
    Ok(postfix)
}

fn emit(expr: &Expr, out: &mut Postfix) -> Result<(), LowerError> {
    match expr {
        Expr::IntLiteral(value) => out.push(PostfixToken::Int(*value)),
        Expr::Identifier(name) => out.push(PostfixToken::Name(name.clone())),
        Expr::BinaryOp { op, left, right } => {
            emit(left, out)?;
            emit(right, out)?;
            out.push(PostfixToken::Op(*op));
        }
        Expr::Assignment { target, value } => {
            emit(value, out)?;
            out.push(PostfixToken::Name(target.clone()));
            out.push(PostfixToken::Assign);
        }
        Expr::IfElse { .. } => return Err(LowerError::UnsupportedConditional),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_assignment() {
        let expr = Expr::assign(
            "x",
            Expr::binary(BinOp::Add, Expr::IntLiteral(2), Expr::IntLiteral(3)),
        );
        assert_eq!(lower(&expr).unwrap().to_string(), "2 3 + x =");
    }

    #[test]
    fn test_lower_is_postorder_concatenation() {
        let left = Expr::binary(BinOp::Sub, Expr::IntLiteral(10), Expr::Identifier("a".into()));
        let right = Expr::assign("b", Expr::IntLiteral(4));
        let expr = Expr::binary(BinOp::Div, left.clone(), right.clone());

        let mut expected = lower(&left).unwrap().tokens().to_vec();
        expected.extend_from_slice(lower(&right).unwrap().tokens());
        expected.push(PostfixToken::Op(BinOp::Div));

        assert_eq!(lower(&expr).unwrap().tokens(), expected.as_slice());
    }

    #[test]
    fn test_lower_if_else_is_rejected() {
        let expr = Expr::IfElse {
            condition: Box::new(Expr::IntLiteral(1)),
            then_branch: Box::new(Expr::IntLiteral(2)),
            else_branch: None,
        };
        assert_eq!(lower(&expr), Err(LowerError::UnsupportedConditional));
    }

    #[test]
    fn test_postfix_text_round_trip() {
        let postfix: Postfix = "12 b * total =".parse().unwrap();
        assert_eq!(
            postfix.tokens(),
            &[
                PostfixToken::Int(12),
                PostfixToken::Name("b".into()),
                PostfixToken::Op(BinOp::Mul),
                PostfixToken::Name("total".into()),
                PostfixToken::Assign,
            ]
        );
        assert_eq!(postfix.to_string(), "12 b * total =");
    }

    #[test]
    fn test_postfix_text_rejects_unknown_item() {
        let err = "1 2 %".parse::<Postfix>().unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("'%'"));
    }
}
