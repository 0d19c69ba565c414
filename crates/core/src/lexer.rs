use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Decimal literal. Unsigned; sign is handled by the parser.
    Number(Decimal),
    /// Variable name
    Ident(String),
    /// Quoted string literal (content without quotes, no escapes)
    Str(String),
    /// `LOOKUP`, matched case-insensitively
    Lookup,
    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    // Punctuation
    LParen,
    RParen,
    Comma,
    // End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Lookup => write!(f, "LOOKUP"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    /// Zero-based character offset of the token's first character.
    pub offset: usize,
}

/// Tokenize a formula.
///
/// Unrecognized characters are skipped rather than rejected, so
/// `"2 # 3"` lexes the same as `"2 3"`. The returned stream always ends
/// with [`Token::Eof`].
pub fn lex(src: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;

        // String literal: either quote style, closed by the same quote
        if c == '"' || c == '\'' {
            pos += 1;
            let mut s = String::new();
            while pos < chars.len() && chars[pos] != c {
                s.push(chars[pos]);
                pos += 1;
            }
            // Skip the closing quote if present; an unterminated literal runs to the end.
            if pos < chars.len() {
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                offset: start,
            });
            continue;
        }

        // Number: a run of digits and dots
        if c.is_ascii_digit() || c == '.' {
            while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                pos += 1;
            }
            let text: String = chars[start..pos].iter().collect();
            let value = parse_number(&text).map_err(|msg| ParseError::new(start, msg))?;
            tokens.push(Spanned {
                token: Token::Number(value),
                offset: start,
            });
            continue;
        }

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push(Spanned {
                token,
                offset: start,
            });
            pos += 1;
            continue;
        }

        // Identifier / keyword
        if c.is_ascii_alphabetic() || c == '_' {
            while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            let token = if word.eq_ignore_ascii_case("lookup") {
                Token::Lookup
            } else {
                Token::Ident(word)
            };
            tokens.push(Spanned {
                token,
                offset: start,
            });
            continue;
        }

        pos += 1;
    }

    tokens.push(Spanned {
        token: Token::Eof,
        offset: chars.len(),
    });
    Ok(tokens)
}

/// Parse a `[0-9.]+` run. Accepts `.5` and `5.`; rejects runs with more
/// than one dot or no digits, and values a `Decimal` cannot hold.
fn parse_number(text: &str) -> Result<Decimal, String> {
    if text.matches('.').count() > 1 || !text.chars().any(|c| c.is_ascii_digit()) {
        return Err(format!("invalid number '{}'", text));
    }
    let mut normalized = text.trim_end_matches('.').to_string();
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }
    Decimal::from_str(&normalized).map_err(|_| {
        format!(
            "number '{}' is out of range (at most 28 significant digits)",
            text
        )
    })
}
