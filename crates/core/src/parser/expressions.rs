use super::{Parser, MAX_NESTING};
use crate::ast::{BinaryOp, Expr, LookupCall, UnaryOp};
use crate::error::ParseError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Expression parsing --------------------------------------

    pub(super) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.err(format!(
                "formula nested too deeply (more than {} levels)",
                MAX_NESTING
            )));
        }
        self.depth += 1;
        let factor = self.parse_primary();
        self.depth -= 1;
        factor
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Token::Plus => {
                self.advance();
                Ok(Expr::unary(UnaryOp::Plus, self.parse_factor()?))
            }
            Token::Minus => {
                self.advance();
                Ok(Expr::unary(UnaryOp::Minus, self.parse_factor()?))
            }
            Token::Number(n) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Expr::Variable(name))
            }
            Token::Lookup => self.parse_lookup(),
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.unexpected("number, variable, LOOKUP or '('")),
        }
    }

    fn parse_lookup(&mut self) -> Result<Expr, ParseError> {
        self.advance(); // LOOKUP
        self.expect(Token::LParen, "'(' after LOOKUP")?;
        let table = self.take_str("LOOKUP table name")?;
        self.expect(Token::Comma, "','")?;
        let key_column = self.take_str("LOOKUP key column")?;
        self.expect(Token::Comma, "','")?;
        let value_column = self.take_str("LOOKUP value column")?;
        self.expect(Token::Comma, "','")?;
        let key = self.parse_expr()?;
        self.expect(Token::RParen, "')' to close LOOKUP")?;
        Ok(Expr::Lookup(LookupCall {
            table,
            key_column,
            value_column,
            key: Box::new(key),
        }))
    }
}
