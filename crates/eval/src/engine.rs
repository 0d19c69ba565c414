use relocost_storage::TableStore;

use crate::formula::{self, Evaluation, EvalFailure, FormulaResult, Variables};
use crate::rate::{self, RateRequest, RateResolution, RateResponse};
use crate::EvalError;

/// A table store bundled with the engine's two entry points.
///
/// Holds no state besides the store: every call reads tables afresh.
#[derive(Debug, Clone)]
pub struct Engine<S> {
    store: S,
}

impl<S: TableStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Engine { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn evaluate(&self, formula: &str, variables: &Variables) -> FormulaResult {
        formula::evaluate(&self.store, formula, variables).await
    }

    pub async fn try_evaluate(
        &self,
        formula: &str,
        variables: &Variables,
    ) -> Result<Evaluation, EvalFailure> {
        formula::try_evaluate(&self.store, formula, variables).await
    }

    pub async fn resolve_rate(&self, request: &RateRequest) -> RateResponse {
        rate::resolve_rate(&self.store, request).await
    }

    pub async fn resolve(&self, request: &RateRequest) -> Result<RateResolution, EvalError> {
        rate::resolve(&self.store, request).await
    }
}
