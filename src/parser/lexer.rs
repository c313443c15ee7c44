//! Lexer (tokenizer) for the expression language
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Lexing never fails: a character the lexer does not recognise becomes an
//! [`TokenKind::Error`] token and the scan carries on after it.
//!
//! A run of digits directly followed by `[]` is an array declaration. It is
//! recorded in the lexer's [`SymbolRegistry`] and emitted as an identifier
//! followed by the two bracket delimiters.

use super::ast::SourceLocation;
use crate::config::{DELIMITER_CHARS, OPERATOR_CHARS, RESERVED_WORDS};
use rustc_hash::FxHashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Token classification, matching the names used by the token text format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Integer,
    Operator,
    Keyword,
    Identifier,
    Delimiter,
    Print,
    StringLiteral,
    Error,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Integer => "Integer",
            TokenKind::Operator => "Operator",
            TokenKind::Keyword => "Keyword",
            TokenKind::Identifier => "Identifier",
            TokenKind::Delimiter => "Delimiter",
            TokenKind::Print => "Print",
            TokenKind::StringLiteral => "StringLiteral",
            TokenKind::Error => "Error",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Integer" => Ok(TokenKind::Integer),
            "Operator" => Ok(TokenKind::Operator),
            "Keyword" => Ok(TokenKind::Keyword),
            "Identifier" => Ok(TokenKind::Identifier),
            "Delimiter" => Ok(TokenKind::Delimiter),
            "Print" => Ok(TokenKind::Print),
            "StringLiteral" => Ok(TokenKind::StringLiteral),
            "Error" => Ok(TokenKind::Error),
            other => Err(format!("unknown token kind '{}'", other)),
        }
    }
}

/// A classified slice of source text.
///
/// The location is where the token starts so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }

    /// True when this token has the given kind and text.
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Integer => write!(f, "integer {}", self.text),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            TokenKind::StringLiteral => write!(f, "string literal \"{}\"", self.text),
            TokenKind::Error => write!(f, "invalid character '{}'", self.text),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

/// Array declarations seen by the lexer: name → declared size.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    arrays: FxHashMap<String, usize>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_array(&mut self, name: &str, size: usize) {
        self.arrays.insert(name.to_string(), size);
    }

    pub fn array_size(&self, name: &str) -> Option<usize> {
        self.arrays.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .arrays
            .iter()
            .map(|(name, size)| (name.as_str(), *size))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}

/// Lexer for the expression language
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    symbols: SymbolRegistry,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            symbols: SymbolRegistry::new(),
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            let Some(ch) = self.peek() else {
                break;
            };

            if ch.is_ascii_alphabetic() {
                tokens.push(self.identifier_or_keyword());
            } else if ch.is_ascii_digit() {
                self.number_or_array(&mut tokens);
            } else if ch == '"' {
                tokens.push(self.string_literal());
            } else {
                tokens.push(self.symbol());
            }
        }

        tokens
    }

    /// Array declarations registered while tokenizing.
    pub fn symbols(&self) -> &SymbolRegistry {
        &self.symbols
    }

    fn identifier_or_keyword(&mut self) -> Token {
        let loc = self.current_location();
        let mut ident = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = if RESERVED_WORDS.contains(&ident.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };

        Token::new(kind, ident, loc)
    }

    /// Integer literal, or the `N[]` array declaration form.
    fn number_or_array(&mut self, tokens: &mut Vec<Token>) {
        let loc = self.current_location();
        let mut number = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self.peek() == Some('[') && self.peek_ahead(1) == Some(']') {
            match number.parse::<usize>() {
                Ok(size) => {
                    debug!(name = %number, size, line = loc.line, "registered array declaration");
                    self.symbols.register_array(&number, size);
                }
                Err(_) => {
                    warn!(
                        name = %number,
                        line = loc.line,
                        "array size out of range, not registered"
                    );
                }
            }
            tokens.push(Token::new(TokenKind::Identifier, number, loc));

            let open = self.current_location();
            self.advance();
            tokens.push(Token::new(TokenKind::Delimiter, "[", open));

            let close = self.current_location();
            self.advance();
            tokens.push(Token::new(TokenKind::Delimiter, "]", close));
        } else {
            tokens.push(Token::new(TokenKind::Integer, number, loc));
        }
    }

    /// String literal. An unterminated literal becomes one error token
    /// holding the raw text from the opening quote.
    fn string_literal(&mut self) -> Token {
        let loc = self.current_location();
        let mut raw = String::new();
        let mut value = String::new();

        if let Some(quote) = self.advance() {
            raw.push(quote);
        }

        while let Some(ch) = self.advance() {
            raw.push(ch);
            match ch {
                '"' => return Token::new(TokenKind::StringLiteral, value, loc),
                '\\' => {
                    let Some(escaped) = self.advance() else {
                        break;
                    };
                    raw.push(escaped);
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                }
                _ => value.push(ch),
            }
        }

        warn!(line = loc.line, column = loc.column, "unterminated string literal");
        Token::new(TokenKind::Error, raw, loc)
    }

    /// Operators, delimiters, and anything unrecognised.
    fn symbol(&mut self) -> Token {
        let loc = self.current_location();
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Error, "", loc);
        };

        let kind = if OPERATOR_CHARS.contains(&ch) {
            TokenKind::Operator
        } else if DELIMITER_CHARS.contains(&ch) {
            TokenKind::Delimiter
        } else {
            warn!(
                character = %ch.escape_debug(),
                line = loc.line,
                column = loc.column,
                "unrecognised character"
            );
            TokenKind::Error
        };

        Token::new(kind, ch.to_string(), loc)
    }

    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r' | '\n') = self.peek() {
            self.advance();
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Tokenize `source` with a fresh lexer.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
