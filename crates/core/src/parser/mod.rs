/// Recursive-descent parser for formulas.
///
/// Grammar (left-associative, standard precedence):
///
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := factor (('*' | '/') factor)*
/// factor := ('+' | '-') factor
///         | number
///         | identifier
///         | LOOKUP '(' string ',' string ',' string ',' expr ')'
///         | '(' expr ')'
/// ```
use crate::ast::Expr;
use crate::error::ParseError;
use crate::lexer::{lex, Spanned, Token};

mod expressions;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

/// Deepest allowed nesting of parentheses, unary signs and LOOKUP keys.
pub const MAX_NESTING: usize = 128;

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn cur_offset(&self) -> usize {
        self.cur().offset
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::new(self.cur_offset(), msg)
    }

    /// Error for whatever token sits at the cursor.
    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Token::Eof => self.err(format!("unexpected end of input, expected {}", expected)),
            other => self.err(format!("unexpected token '{}', expected {}", other, expected)),
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<(), ParseError> {
        if self.peek() == &token {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn take_str(&mut self, what: &str) -> Result<String, ParseError> {
        if let Token::Str(s) = self.peek().clone() {
            self.advance();
            Ok(s)
        } else {
            Err(self.unexpected(&format!("string literal for {}", what)))
        }
    }

    fn parse_formula(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr()?;
        if self.peek() != &Token::Eof {
            return Err(self.unexpected("operator or end of input"));
        }
        Ok(expr)
    }
}

// ──────────────────────────────────────────────
// Public entry points
// ──────────────────────────────────────────────

/// Parse a formula string into an AST.
///
/// Fails on the first malformed construct; nothing is evaluated and no
/// table is read when this returns an error.
pub fn parse(src: &str) -> Result<Expr, ParseError> {
    let tokens = lex(src)?;
    parse_tokens(&tokens)
}

/// Parse an already-lexed token stream. The stream must end with `Eof`.
pub fn parse_tokens(tokens: &[Spanned]) -> Result<Expr, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::new(0, "unexpected end of input"));
    }
    Parser::new(tokens).parse_formula()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
