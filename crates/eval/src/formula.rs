//! Async tree-walking formula evaluator.
//!
//! Evaluation is pure arithmetic except at `LOOKUP` nodes, which await the
//! table store. Binary operands are evaluated left then right, so the
//! order of `lookup_calls` follows the formula text.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use relocost_core::{parse, Expr, UnaryOp};
use relocost_storage::TableStore;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::EvalError;
use crate::lookup::{lookup, LookupDiagnostic};
use crate::numeric;

/// Variable name → value. Supplied fresh for every evaluation.
pub type Variables = HashMap<String, Decimal>;

/// Outcome of [`evaluate`]. Always produced, even on failure.
///
/// On failure `value` is zero and `error` is set, so callers must check
/// `error` before trusting `value`. `lookup_calls` holds every lookup
/// attempted before the failure, and is empty when the formula did not
/// parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaResult {
    pub value: Decimal,
    pub lookup_calls: Vec<LookupDiagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A successful evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Decimal,
    pub lookup_calls: Vec<LookupDiagnostic>,
}

/// A failed evaluation, with the lookups attempted before it failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error}")]
pub struct EvalFailure {
    pub error: EvalError,
    pub lookup_calls: Vec<LookupDiagnostic>,
}

impl From<Result<Evaluation, EvalFailure>> for FormulaResult {
    fn from(outcome: Result<Evaluation, EvalFailure>) -> Self {
        match outcome {
            Ok(eval) => FormulaResult {
                value: eval.value,
                lookup_calls: eval.lookup_calls,
                error: None,
            },
            Err(failure) => FormulaResult {
                value: Decimal::ZERO,
                lookup_calls: failure.lookup_calls,
                error: Some(failure.error.to_string()),
            },
        }
    }
}

/// Parse and evaluate `formula`. Never fails; see [`FormulaResult`].
pub async fn evaluate<S>(store: &S, formula: &str, variables: &Variables) -> FormulaResult
where
    S: TableStore + ?Sized,
{
    let outcome = try_evaluate(store, formula, variables).await;
    if let Err(failure) = &outcome {
        warn!(formula, error = %failure.error, "formula evaluation failed");
    }
    outcome.into()
}

/// Parse and evaluate `formula`, returning the typed error on failure.
pub async fn try_evaluate<S>(
    store: &S,
    formula: &str,
    variables: &Variables,
) -> Result<Evaluation, EvalFailure>
where
    S: TableStore + ?Sized,
{
    let expr = parse(formula).map_err(|e| EvalFailure {
        error: e.into(),
        lookup_calls: Vec::new(),
    })?;
    evaluate_expr(store, &expr, variables).await
}

/// Evaluate an already parsed formula.
pub async fn evaluate_expr<S>(
    store: &S,
    expr: &Expr,
    variables: &Variables,
) -> Result<Evaluation, EvalFailure>
where
    S: TableStore + ?Sized,
{
    let mut evaluator = Evaluator {
        store,
        variables,
        lookup_calls: Vec::new(),
    };
    match evaluator.eval(expr).await {
        Ok(value) => {
            debug!(%value, lookups = evaluator.lookup_calls.len(), "formula evaluated");
            Ok(Evaluation {
                value,
                lookup_calls: evaluator.lookup_calls,
            })
        }
        Err(error) => Err(EvalFailure {
            error,
            lookup_calls: evaluator.lookup_calls,
        }),
    }
}

type EvalFuture<'b> = Pin<Box<dyn Future<Output = Result<Decimal, EvalError>> + Send + 'b>>;

struct Evaluator<'a, S: ?Sized> {
    store: &'a S,
    variables: &'a Variables,
    lookup_calls: Vec<LookupDiagnostic>,
}

impl<'a, S> Evaluator<'a, S>
where
    S: TableStore + ?Sized,
{
    // Boxed so the recursion has a sized future type.
    fn eval<'b>(&'b mut self, expr: &'b Expr) -> EvalFuture<'b> {
        Box::pin(async move {
            match expr {
                Expr::Number(n) => Ok(*n),
                Expr::Variable(name) => {
                    self.variables
                        .get(name)
                        .copied()
                        .ok_or_else(|| EvalError::UnknownVariable { name: name.clone() })
                }
                Expr::Unary { op, operand } => {
                    let v = self.eval(operand).await?;
                    Ok(match op {
                        UnaryOp::Plus => v,
                        UnaryOp::Minus => -v,
                    })
                }
                Expr::Binary { op, left, right } => {
                    let l = self.eval(left).await?;
                    let r = self.eval(right).await?;
                    numeric::apply(*op, l, r)
                }
                Expr::Lookup(call) => {
                    let key = self.eval(&call.key).await?;
                    let outcome = lookup(
                        self.store,
                        &call.table,
                        &call.key_column,
                        &call.value_column,
                        key,
                    )
                    .await;
                    self.lookup_calls.push(LookupDiagnostic::new(
                        &call.table,
                        &call.key_column,
                        &call.value_column,
                        key,
                        &outcome,
                    ));
                    outcome
                }
            }
        })
    }
}
