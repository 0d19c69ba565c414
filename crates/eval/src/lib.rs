//! relocost-eval: formula evaluation and rate resolution.
//!
//! Evaluates formulas parsed by `relocost-core` against a variable map,
//! resolving `LOOKUP(...)` calls through a [`TableStore`], and picks the
//! best-matching entries of a rate table.
//!
//! Both entry points have a never-failing form that reports errors as a
//! string field ([`evaluate`], [`resolve_rate`]) and a typed form
//! ([`try_evaluate`], [`resolve`]).
//!
//! [`TableStore`]: relocost_storage::TableStore

pub mod engine;
pub mod error;
pub mod formula;
pub mod lookup;
pub mod numeric;
pub mod rate;

pub use engine::Engine;
pub use error::EvalError;
pub use formula::{
    evaluate, evaluate_expr, try_evaluate, EvalFailure, Evaluation, FormulaResult, Variables,
};
pub use lookup::{lookup, LookupDiagnostic};
pub use numeric::coerce_numeric;
pub use rate::{
    resolve, resolve_rate, Comparison, FilterCriteria, RateRequest, RateResolution, RateResponse,
    ScoredEntry, TableRef,
};
