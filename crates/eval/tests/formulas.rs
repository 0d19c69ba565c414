//! End-to-end formula evaluation against an in-memory table store.
//!
//! Organized by category:
//!   A. Arithmetic
//!   B. Variables
//!   C. LOOKUP
//!   D. Failure reporting
//!   E. Store failures

use std::str::FromStr;

use async_trait::async_trait;
use relocost_eval::{evaluate, try_evaluate, Engine, EvalError, Variables};
use relocost_storage::{MemoryTableStore, RateEntry, Row, StorageError, TableData, TableId, TableStore};
use rust_decimal::Decimal;

// ──────────────────────────────────────────────
// Test helpers
// ──────────────────────────────────────────────

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn vars(pairs: &[(&str, &str)]) -> Variables {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), dec(v)))
        .collect()
}

fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn tiers_store() -> MemoryTableStore {
    MemoryTableStore::from_tables(vec![
        TableData::lookup(
            "tbl-tiers",
            "Tiers",
            vec![
                row(&[("tier", "1"), ("rate", "5000")]),
                row(&[("tier", "2"), ("rate", "3500")]),
            ],
        ),
        TableData::lookup(
            "tbl-fees",
            "Fees",
            vec![
                row(&[("code", "A"), ("fee", "$1,250.00")]),
                row(&[("code", "7"), ("fee", "12.5%")]),
            ],
        ),
    ])
}

async fn value_of(formula: &str, variables: &[(&str, &str)]) -> Decimal {
    let result = evaluate(&tiers_store(), formula, &vars(variables)).await;
    assert_eq!(result.error, None, "formula {formula:?} failed");
    result.value
}

async fn error_of(formula: &str, variables: &[(&str, &str)]) -> String {
    let result = evaluate(&tiers_store(), formula, &vars(variables)).await;
    assert_eq!(result.value, Decimal::ZERO);
    result
        .error
        .unwrap_or_else(|| panic!("formula {formula:?} should fail"))
}

// ──────────────────────────────────────────────
// A. Arithmetic
// ──────────────────────────────────────────────

#[tokio::test]
async fn a01_multiplication_binds_tighter() {
    assert_eq!(value_of("2 + 3 * 4", &[]).await, dec("14"));
}

#[tokio::test]
async fn a02_parentheses_override_precedence() {
    assert_eq!(value_of("(2+3)*4", &[]).await, dec("20"));
}

#[tokio::test]
async fn a03_left_associative_subtraction_and_division() {
    assert_eq!(value_of("10 - 4 - 3", &[]).await, dec("3"));
    assert_eq!(value_of("100 / 10 / 2", &[]).await, dec("5"));
}

#[tokio::test]
async fn a04_decimal_literals_are_exact() {
    assert_eq!(value_of("0.1 + 0.2", &[]).await, dec("0.3"));
    assert_eq!(value_of(".5 * 4", &[]).await, dec("2"));
}

#[tokio::test]
async fn a05_unary_minus_in_expressions() {
    assert_eq!(value_of("-(2 + 3) * 2", &[]).await, dec("-10"));
    assert_eq!(value_of("3 - -2", &[]).await, dec("5"));
}

#[tokio::test]
async fn a06_unknown_characters_are_skipped() {
    assert_eq!(value_of("2 +# 3 ;", &[]).await, dec("5"));
}

// ──────────────────────────────────────────────
// B. Variables
// ──────────────────────────────────────────────

#[tokio::test]
async fn b01_variables_from_context() {
    assert_eq!(
        value_of("base * rate", &[("base", "1000"), ("rate", "0.3")]).await,
        dec("300")
    );
}

#[tokio::test]
async fn b02_variable_names_are_case_sensitive() {
    let err = error_of("Base * 2", &[("base", "1")]).await;
    assert_eq!(err, "unknown variable: Base");
}

#[tokio::test]
async fn b03_unknown_variable() {
    let err = error_of("x + 1", &[]).await;
    assert!(err.contains("unknown variable"));
}

// ──────────────────────────────────────────────
// C. LOOKUP
// ──────────────────────────────────────────────

#[tokio::test]
async fn c01_lookup_by_variable_key() {
    assert_eq!(
        value_of("LOOKUP(\"Tiers\",\"tier\",\"rate\", tier)", &[("tier", "1")]).await,
        dec("5000")
    );
}

#[tokio::test]
async fn c02_lookup_in_arithmetic() {
    assert_eq!(
        value_of(
            "base + LOOKUP('Tiers', 'tier', 'rate', 1 + 1) * 2",
            &[("base", "100")]
        )
        .await,
        dec("7100")
    );
}

#[tokio::test]
async fn c03_keyword_is_case_insensitive() {
    assert_eq!(
        value_of("lookup(\"Tiers\",\"tier\",\"rate\", 2)", &[]).await,
        dec("3500")
    );
}

#[tokio::test]
async fn c04_values_are_coerced() {
    assert_eq!(value_of("LOOKUP('Fees', 'code', 'fee', 7)", &[]).await, dec("12.5"));
}

#[tokio::test]
async fn c05_no_match_reports_key_and_one_diagnostic() {
    let result = evaluate(
        &tiers_store(),
        "LOOKUP(\"Tiers\",\"tier\",\"rate\", tier)",
        &vars(&[("tier", "99")]),
    )
    .await;
    let error = result.error.unwrap();
    assert!(error.contains("no row where tier = 99"), "{error}");
    assert_eq!(result.lookup_calls.len(), 1);
    let diag = &result.lookup_calls[0];
    assert_eq!(diag.table, "Tiers");
    assert_eq!(diag.key, dec("99"));
    assert_eq!(diag.result, None);
    assert_eq!(diag.error.as_deref(), Some(error.as_str()));
}

#[tokio::test]
async fn c06_unknown_table() {
    let err = error_of("LOOKUP('Nope', 'k', 'v', 1)", &[]).await;
    assert_eq!(err, "lookup table not found: Nope");
}

#[tokio::test]
async fn c07_duplicate_table_names_use_first() {
    let store = MemoryTableStore::from_tables(vec![
        TableData::lookup("a", "Dup", vec![row(&[("k", "1"), ("v", "10")])]),
        TableData::lookup("b", "Dup", vec![row(&[("k", "1"), ("v", "20")])]),
    ]);
    let result = evaluate(&store, "LOOKUP('Dup', 'k', 'v', 1)", &Variables::new()).await;
    assert_eq!(result.value, dec("10"));
}

#[tokio::test]
async fn c08_table_changes_are_seen_by_the_next_evaluation() {
    let engine = Engine::new(tiers_store());
    let formula = "LOOKUP('Tiers', 'tier', 'rate', 1)";
    assert_eq!(engine.evaluate(formula, &Variables::new()).await.value, dec("5000"));

    engine
        .store()
        .replace_rows("tbl-tiers", vec![row(&[("tier", "1"), ("rate", "5200")])])
        .await
        .unwrap();
    assert_eq!(engine.evaluate(formula, &Variables::new()).await.value, dec("5200"));
}

// ──────────────────────────────────────────────
// D. Failure reporting
// ──────────────────────────────────────────────

#[tokio::test]
async fn d01_division_by_zero() {
    let err = error_of("5/0", &[]).await;
    assert_eq!(err, "division by zero");
}

#[tokio::test]
async fn d02_empty_formula_is_a_parse_error() {
    let err = error_of("", &[]).await;
    assert!(err.contains("unexpected end of input"), "{err}");
}

#[tokio::test]
async fn d03_leftover_tokens_are_a_parse_error() {
    let err = error_of("1 2", &[]).await;
    assert!(err.starts_with("parse error at position 2"), "{err}");
}

#[tokio::test]
async fn d04_parse_errors_do_no_io() {
    let result = evaluate(&FailingStore, "LOOKUP('T', 'k', 'v', 1) * (", &Variables::new()).await;
    assert!(result.error.unwrap().starts_with("parse error"));
    assert!(result.lookup_calls.is_empty());
}

#[tokio::test]
async fn d05_typed_errors() {
    let store = tiers_store();
    let failure = try_evaluate(&store, "LOOKUP('Tiers', 'level', 'rate', 1)", &Variables::new())
        .await
        .unwrap_err();
    assert_eq!(
        failure.error,
        EvalError::LookupColumnNotFound {
            table: "Tiers".to_string(),
            column: "level".to_string(),
        }
    );
    assert_eq!(failure.error.kind(), "LookupColumnNotFound");
    assert_eq!(failure.lookup_calls.len(), 1);
}

#[tokio::test]
async fn d06_evaluation_is_deterministic() {
    let store = tiers_store();
    let variables = vars(&[("tier", "2"), ("qty", "3")]);
    let formula = "LOOKUP('Tiers', 'tier', 'rate', tier) * qty";
    let first = evaluate(&store, formula, &variables).await;
    for _ in 0..5 {
        assert_eq!(evaluate(&store, formula, &variables).await, first);
    }
}

#[tokio::test]
async fn d07_deep_nesting_is_reported_not_fatal() {
    let depth = 10_000;
    let formula = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let err = error_of(&formula, &[]).await;
    assert!(err.contains("nested too deeply"), "{err}");

    let signs = format!("{}2", "-".repeat(depth));
    assert!(error_of(&signs, &[]).await.contains("nested too deeply"));
}

#[tokio::test]
async fn d08_nesting_below_the_limit_evaluates() {
    let formula = format!("{}2{}", "(-".repeat(60), ")".repeat(60));
    assert_eq!(value_of(&formula, &[]).await, dec("2"));
}

// ──────────────────────────────────────────────
// E. Store failures
// ──────────────────────────────────────────────

struct FailingStore;

#[async_trait]
impl TableStore for FailingStore {
    async fn find_table_by_name(&self, _name: &str) -> Result<Option<TableId>, StorageError> {
        Err(StorageError::Backend("connection refused".to_string()))
    }

    async fn list_rows(&self, _table_id: &str) -> Result<Vec<Row>, StorageError> {
        Err(StorageError::Backend("connection refused".to_string()))
    }

    async fn list_active_entries(
        &self,
        _table_id: &str,
        _tenant_id: &str,
    ) -> Result<Vec<RateEntry>, StorageError> {
        Err(StorageError::Backend("connection refused".to_string()))
    }
}

#[tokio::test]
async fn e01_store_errors_abort_evaluation() {
    let result = evaluate(&FailingStore, "1 + LOOKUP('T', 'k', 'v', 1)", &Variables::new()).await;
    assert_eq!(
        result.error.as_deref(),
        Some("storage error: storage backend error: connection refused")
    );
    assert_eq!(result.lookup_calls.len(), 1);
}

#[tokio::test]
async fn e02_pure_formulas_never_touch_the_store() {
    let result = evaluate(&FailingStore, "2 * (3 + 4)", &Variables::new()).await;
    assert_eq!(result.value, dec("14"));
    assert_eq!(result.error, None);
}
