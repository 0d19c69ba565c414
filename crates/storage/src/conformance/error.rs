use std::future::Future;

use super::{standard_fixture, TestResult};
use crate::record::TableFixture;
use crate::{StorageError, TableStore};

pub(super) async fn run_error_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "error",
        "list_rows_unknown_table",
        list_rows_unknown_table(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "list_entries_unknown_table",
        list_entries_unknown_table(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "table_not_found_has_correct_id",
        table_not_found_has_correct_id(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "name_is_not_an_id",
        name_is_not_an_id(factory).await,
    ));

    results
}

async fn list_rows_unknown_table<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(standard_fixture()).await;
    match s.list_rows("missing").await {
        Err(StorageError::TableNotFound { .. }) => Ok(()),
        Err(e) => Err(format!("expected TableNotFound, got {e}")),
        Ok(rows) => Err(format!("expected TableNotFound, got {} rows", rows.len())),
    }
}

async fn list_entries_unknown_table<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(standard_fixture()).await;
    match s.list_active_entries("missing", "acme").await {
        Err(StorageError::TableNotFound { .. }) => Ok(()),
        Err(e) => Err(format!("expected TableNotFound, got {e}")),
        Ok(entries) => Err(format!(
            "expected TableNotFound, got {} entries",
            entries.len()
        )),
    }
}

async fn table_not_found_has_correct_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(standard_fixture()).await;
    match s.list_rows("missing-42").await {
        Err(StorageError::TableNotFound { table_id }) if table_id == "missing-42" => Ok(()),
        Err(e) => Err(format!("unexpected error: {e}")),
        Ok(_) => Err("expected TableNotFound".to_string()),
    }
}

/// Ids and names are separate namespaces.
async fn name_is_not_an_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(standard_fixture()).await;
    match s.list_rows("Tiers").await {
        Err(StorageError::TableNotFound { .. }) => Ok(()),
        Err(e) => Err(format!("expected TableNotFound, got {e}")),
        Ok(_) => Err("table name was accepted as an id".to_string()),
    }
}
