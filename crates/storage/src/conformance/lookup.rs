use std::future::Future;

use super::{fixture, make_row, standard_fixture, TestResult};
use crate::record::{TableData, TableFixture};
use crate::TableStore;

pub(super) async fn run_lookup_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    // Name resolution
    results.push(TestResult::from_result(
        "lookup",
        "find_by_exact_name",
        find_by_exact_name(factory).await,
    ));
    results.push(TestResult::from_result(
        "lookup",
        "find_is_case_sensitive",
        find_is_case_sensitive(factory).await,
    ));
    results.push(TestResult::from_result(
        "lookup",
        "unknown_name_is_none",
        unknown_name_is_none(factory).await,
    ));
    results.push(TestResult::from_result(
        "lookup",
        "duplicate_name_returns_first",
        duplicate_name_returns_first(factory).await,
    ));

    // Rows
    results.push(TestResult::from_result(
        "lookup",
        "rows_in_storage_order",
        rows_in_storage_order(factory).await,
    ));
    results.push(TestResult::from_result(
        "lookup",
        "rows_keep_cell_text",
        rows_keep_cell_text(factory).await,
    ));
    results.push(TestResult::from_result(
        "lookup",
        "row_order_is_repeatable",
        row_order_is_repeatable(factory).await,
    ));
    results.push(TestResult::from_result(
        "lookup",
        "empty_table_has_no_rows",
        empty_table_has_no_rows(factory).await,
    ));

    results
}

// ── Name resolution ──────────────────────────────────────────────────────────

async fn find_by_exact_name<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(standard_fixture()).await;
    let id = s
        .find_table_by_name("Regions")
        .await
        .map_err(|e| e.to_string())?;
    if id.as_deref() != Some("tbl-regions") {
        return Err(format!("expected Some(\"tbl-regions\"), got {id:?}"));
    }
    Ok(())
}

/// "tiers" must not resolve to "Tiers".
async fn find_is_case_sensitive<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(standard_fixture()).await;
    let id = s
        .find_table_by_name("tiers")
        .await
        .map_err(|e| e.to_string())?;
    if id.is_some() {
        return Err(format!("expected None for differently cased name, got {id:?}"));
    }
    Ok(())
}

async fn unknown_name_is_none<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(standard_fixture()).await;
    let id = s
        .find_table_by_name("Nope")
        .await
        .map_err(|e| e.to_string())?;
    if id.is_some() {
        return Err(format!("expected None, got {id:?}"));
    }
    Ok(())
}

async fn duplicate_name_returns_first<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(fixture(vec![
        TableData::lookup("first", "Dup", vec![make_row(&[("k", "1")])]),
        TableData::lookup("second", "Dup", vec![make_row(&[("k", "2")])]),
    ]))
    .await;
    let id = s
        .find_table_by_name("Dup")
        .await
        .map_err(|e| e.to_string())?;
    if id.as_deref() != Some("first") {
        return Err(format!("expected the first stored table, got {id:?}"));
    }
    Ok(())
}

// ── Rows ─────────────────────────────────────────────────────────────────────

async fn rows_in_storage_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(standard_fixture()).await;
    let rows = s.list_rows("tbl-tiers").await.map_err(|e| e.to_string())?;
    let tiers: Vec<_> = rows
        .iter()
        .map(|r| r.get("tier").map(String::as_str).unwrap_or(""))
        .collect();
    if tiers != ["1", "2", "3"] {
        return Err(format!("expected tiers [1, 2, 3], got {tiers:?}"));
    }
    Ok(())
}

/// Cells come back as stored text, with no numeric normalization.
async fn rows_keep_cell_text<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(fixture(vec![TableData::lookup(
        "t",
        "Raw",
        vec![make_row(&[("key", " 01 "), ("value", "$1,250.00")])],
    )]))
    .await;
    let rows = s.list_rows("t").await.map_err(|e| e.to_string())?;
    let row = rows.first().ok_or("expected one row")?;
    if row.get("key").map(String::as_str) != Some(" 01 ") {
        return Err(format!("key cell changed: {:?}", row.get("key")));
    }
    if row.get("value").map(String::as_str) != Some("$1,250.00") {
        return Err(format!("value cell changed: {:?}", row.get("value")));
    }
    Ok(())
}

async fn row_order_is_repeatable<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(standard_fixture()).await;
    let first = s.list_rows("tbl-tiers").await.map_err(|e| e.to_string())?;
    for _ in 0..5 {
        let again = s.list_rows("tbl-tiers").await.map_err(|e| e.to_string())?;
        if again != first {
            return Err("row order changed between calls".to_string());
        }
    }
    Ok(())
}

async fn empty_table_has_no_rows<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(fixture(vec![TableData::lookup("t", "Empty", Vec::new())])).await;
    let rows = s.list_rows("t").await.map_err(|e| e.to_string())?;
    if !rows.is_empty() {
        return Err(format!("expected no rows, got {}", rows.len()));
    }
    Ok(())
}
