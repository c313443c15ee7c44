//! Recursive descent parser
//!
//! Builds an [`Expr`] tree from a token sequence with a single forward cursor.
//!
//! # Grammar
//!
//! ```text
//! statement  := if_form | expression
//! expression := term (('+' | '-' | '*' | '/') term)* [';']
//! term       := integer
//!             | identifier '=' expression
//! if_form    := 'if' expression expression ['else' expression]
//! ```
//!
//! All four arithmetic operators share one precedence level and fold
//! left-associatively, so `1 + 2 * 3` is `(1 + 2) * 3`.
//!
//! The `if` form reads its *then* branch before its condition:
//! `if a = 1; c = 0; else a = 2;` has condition `c = 0`.
//!
//! There is no error recovery: the first grammar violation aborts the parse
//! and is returned as a [`ParseError`]. Tokens left over after the statement
//! are a violation too, and so is nesting deeper than [`MAX_NESTING_DEPTH`].

use crate::config::MAX_NESTING_DEPTH;
use crate::parser::ast::{BinOp, Expr, SourceLocation};
use crate::parser::lexer::{Lexer, Token, TokenKind};
use thiserror::Error;
use tracing::debug;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at {location}: {message}")]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }

    /// Prefix the message with the construct that was being parsed.
    pub fn context(mut self, context: &str) -> Self {
        self.message = format!("{}: {}", context, self.message);
        self
    }
}

/// Recursive descent parser over a lexed token sequence
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Lex `source` and build a parser over the result.
    pub fn from_source(source: &str) -> Self {
        Self::new(Lexer::new(source).tokenize())
    }

    /// Parse one statement: the `if` form when the input starts with the
    /// `if` keyword, otherwise an expression.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        self.depth = 0;
        let expr = if self.check(TokenKind::Keyword, "if") {
            self.parse_if_statement()?
        } else {
            self.parse_expression()?
        };

        if let Some(token) = self.peek() {
            return Err(ParseError::new(
                format!("Unexpected {} after expression", token),
                token.location,
            ));
        }

        Ok(expr)
    }

    /// Parse `if <then> <condition> [else <else>]`.
    pub fn parse_if_statement(&mut self) -> Result<Expr, ParseError> {
        if !self.match_token(TokenKind::Keyword, "if") {
            return Err(self.error_here("Expected 'if'"));
        }
        debug!(line = self.previous_location().line, "parsing if statement");

        let then_branch = self
            .parse_expression()
            .map_err(|e| e.context("Missing if branch in if statement"))?;

        let condition = self
            .parse_expression()
            .map_err(|e| e.context("Invalid condition in if statement"))?;

        let else_branch = if self.match_token(TokenKind::Keyword, "else") {
            let branch = self
                .parse_expression()
                .map_err(|e| e.context("Missing else branch in if statement"))?;
            Some(Box::new(branch))
        } else {
            None
        };

        Ok(Expr::IfElse {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    /// Parse `term (operator term)* [';']`, folding left.
    ///
    /// Every fold adds a level to the tree's left spine, so it counts toward
    /// the nesting depth just like a nested assignment does.
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let entry_depth = self.depth;
        self.enter()?;
        let mut left = self.parse_term()?;

        while let Some(op) = self.match_binary_operator() {
            self.enter()?;
            let right = self.parse_term()?;
            left = Expr::binary(op, left, right);
        }

        self.match_token(TokenKind::Delimiter, ";");

        self.depth = entry_depth;
        Ok(left)
    }

    /// Parse an integer literal or an assignment.
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.error_here("Expected integer or identifier, found end of input"));
        };

        match token.kind {
            TokenKind::Integer => {
                let value = token.text.parse::<i64>().map_err(|e| {
                    ParseError::new(
                        format!("Failed to parse integer '{}': {}", token.text, e),
                        token.location,
                    )
                })?;
                self.advance();
                Ok(Expr::IntLiteral(value))
            }
            TokenKind::Identifier => {
                let target = token.text.clone();
                self.advance();

                if !self.match_token(TokenKind::Operator, "=") {
                    return Err(
                        self.error_here(&format!("Expected '=' after identifier '{}'", target))
                    );
                }

                let value = self.parse_expression()?;
                Ok(Expr::assign(target, value))
            }
            _ => Err(ParseError::new(
                format!("Expected integer or identifier, found {}", token),
                token.location,
            )),
        }
    }

    // ===== Helper methods =====

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::new(
                format!("Expression nested too deeply (limit {})", MAX_NESTING_DEPTH),
                self.current_location(),
            ));
        }
        Ok(())
    }

    fn match_binary_operator(&mut self) -> Option<BinOp> {
        let token = self.peek()?;
        if token.kind != TokenKind::Operator {
            return None;
        }
        let op = BinOp::from_symbol(&token.text)?;
        self.advance();
        Some(op)
    }

    fn match_token(&mut self, kind: TokenKind, text: &str) -> bool {
        if self.check(kind, text) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is(kind, text))
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn previous_location(&self) -> SourceLocation {
        self.position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.location)
            .unwrap_or_default()
    }

    /// Location of the current token, or just past the last one at end of input.
    fn current_location(&self) -> SourceLocation {
        match self.peek() {
            Some(token) => token.location,
            None => self
                .tokens
                .last()
                .map(|t| {
                    SourceLocation::new(t.location.line, t.location.column + t.text.chars().count())
                })
                .unwrap_or_else(|| SourceLocation::new(1, 1)),
        }
    }

    fn error_here(&self, message: &str) -> ParseError {
        let message = match self.peek() {
            Some(token) => format!("{}, found {}", message, token),
            None => message.to_string(),
        };
        ParseError::new(message, self.current_location())
    }
}

/// Parse a complete token sequence into one expression tree.
pub fn parse(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    Parser::new(tokens).parse()
}
