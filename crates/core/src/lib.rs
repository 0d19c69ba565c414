//! relocost-core: formula language front end.
//!
//! Turns formula strings such as
//! `base * LOOKUP("Tiers", "tier", "rate", tier)` into an [`Expr`] tree.
//! Evaluation lives in `relocost-eval`; this crate performs no I/O.
//!
//! # Public API
//!
//! - [`parse()`] -- tokenize and parse a formula
//! - [`lex()`] -- tokenize only
//! - [`inspect::inputs()`] -- variables and tables a formula references
//! - [`ParseError`] -- the single error type of this crate

pub mod ast;
pub mod error;
pub mod inspect;
pub mod lexer;
pub mod parser;

// ── Convenience re-exports ───────────────────────────────────────────

pub use ast::{BinaryOp, Expr, LookupCall, UnaryOp};
pub use error::ParseError;
pub use inspect::FormulaInputs;
pub use lexer::{lex, Spanned, Token};
pub use parser::{parse, parse_tokens, MAX_NESTING};
