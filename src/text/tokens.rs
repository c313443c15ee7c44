//! Token text format
//!
//! ```text
//! TokenType::Identifier ,"x"
//! TokenType::Operator ,"="
//! TokenType::Integer ,"2"
//! ```
//!
//! The value is everything between the first and the last `"` on the line, so
//! quotes inside a string literal survive. Backslash, newline and tab are
//! escaped so every token stays on one line.

use super::TextError;
use crate::parser::ast::SourceLocation;
use crate::parser::lexer::{Token, TokenKind};

const KIND_PREFIX: &str = "TokenType::";

/// Render a token sequence, one token per line.
pub fn encode(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&encode_token(token));
        out.push('\n');
    }
    out
}

pub fn encode_token(token: &Token) -> String {
    format!("{}{} ,\"{}\"", KIND_PREFIX, token.kind, escape(&token.text))
}

/// Read tokens back. Blank lines are skipped; each token's location is the
/// line it was read from.
pub fn decode(text: &str) -> Result<Vec<Token>, TextError> {
    let mut tokens = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        tokens.push(decode_line(line, index + 1)?);
    }
    Ok(tokens)
}

fn decode_line(line: &str, line_number: usize) -> Result<Token, TextError> {
    let record = line.trim();
    let rest = record
        .strip_prefix(KIND_PREFIX)
        .ok_or_else(|| TextError::new(line_number, format!("missing '{}' prefix", KIND_PREFIX)))?;

    let (kind, value) = rest
        .split_once(',')
        .ok_or_else(|| TextError::new(line_number, "missing ',' between kind and value"))?;

    let kind: TokenKind = kind
        .trim()
        .parse()
        .map_err(|message: String| TextError::new(line_number, message))?;

    let value = value.trim();
    let (start, end) = match (value.find('"'), value.rfind('"')) {
        (Some(start), Some(end)) if start == 0 && end > start && end == value.len() - 1 => {
            (start, end)
        }
        _ => return Err(TextError::new(line_number, "value must be enclosed in double quotes")),
    };

    let text = unescape(&value[start + 1..end])
        .map_err(|message| TextError::new(line_number, message))?;

    Ok(Token::new(kind, text, SourceLocation::new(line_number, 1)))
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(value: &str) -> Result<String, String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => return Err(format!("unknown escape sequence '\\{}'", other)),
            None => return Err("dangling '\\' at end of value".to_string()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    #[test]
    fn test_encode_exact_format() {
        let text = encode(&tokenize("x = 2 + 3"));
        assert_eq!(
            text,
            "TokenType::Identifier ,\"x\"\n\
             TokenType::Operator ,\"=\"\n\
             TokenType::Integer ,\"2\"\n\
             TokenType::Operator ,\"+\"\n\
             TokenType::Integer ,\"3\"\n"
        );
    }

    #[test]
    fn test_decode_tolerates_padding() {
        let tokens = decode(" TokenType::Keyword ,\"if\" \n\n TokenType::Error ,\"@\" \n").unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(tokens[0].is(TokenKind::Keyword, "if"));
        assert!(tokens[1].is(TokenKind::Error, "@"));
        assert_eq!(tokens[1].location, SourceLocation::new(3, 1));
    }

    #[test]
    fn test_string_values_survive() {
        let original = tokenize(r#""say \"hi\"\n""#);
        assert_eq!(original[0].kind, TokenKind::StringLiteral);

        let decoded = decode(&encode(&original)).unwrap();
        assert_eq!(decoded[0].kind, TokenKind::StringLiteral);
        assert_eq!(decoded[0].text, original[0].text);
    }

    #[test]
    fn test_quote_and_comma_values() {
        let tokens = vec![
            Token::new(TokenKind::Error, "\"", SourceLocation::new(1, 1)),
            Token::new(TokenKind::Error, ",", SourceLocation::new(1, 2)),
        ];
        let decoded = decode(&encode(&tokens)).unwrap();
        assert_eq!(decoded[0].text, "\"");
        assert_eq!(decoded[1].text, ",");
    }

    #[test]
    fn test_decode_errors() {
        let err = decode("Identifier ,\"x\"").unwrap_err();
        assert_eq!(err.line, 1);

        let err = decode("TokenType::Identifier ,\"x\"\nTokenType::Widget ,\"y\"").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("Widget"));

        assert!(decode("TokenType::Integer ,2").is_err());
        assert!(decode("TokenType::Integer \"2\"").is_err());
    }
}
