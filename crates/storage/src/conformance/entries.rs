use std::future::Future;

use super::{fixture, make_entry, standard_fixture, TestResult};
use crate::record::{RateEntry, TableData, TableFixture};
use crate::TableStore;

pub(super) async fn run_entry_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "entries",
        "entries_in_storage_order",
        entries_in_storage_order(factory).await,
    ));
    results.push(TestResult::from_result(
        "entries",
        "archived_entries_excluded",
        archived_entries_excluded(factory).await,
    ));
    results.push(TestResult::from_result(
        "entries",
        "other_tenants_excluded",
        other_tenants_excluded(factory).await,
    ));
    results.push(TestResult::from_result(
        "entries",
        "entry_fields_preserved",
        entry_fields_preserved(factory).await,
    ));
    results.push(TestResult::from_result(
        "entries",
        "lookup_table_has_no_entries",
        lookup_table_has_no_entries(factory).await,
    ));

    results
}

fn ids(entries: &[RateEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.id.as_str()).collect()
}

async fn entries_in_storage_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(standard_fixture()).await;
    let entries = s
        .list_active_entries("tbl-moving", "acme")
        .await
        .map_err(|e| e.to_string())?;
    if ids(&entries) != ["e1", "e2", "e3"] {
        return Err(format!("expected [e1, e2, e3], got {:?}", ids(&entries)));
    }
    Ok(())
}

async fn archived_entries_excluded<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let mut archived = make_entry("old", "acme");
    archived.archived = true;
    let s = factory(fixture(vec![TableData::rates(
        "t",
        "Moving",
        vec![make_entry("live", "acme"), archived],
    )]))
    .await;
    let entries = s
        .list_active_entries("t", "acme")
        .await
        .map_err(|e| e.to_string())?;
    if ids(&entries) != ["live"] {
        return Err(format!("expected [live], got {:?}", ids(&entries)));
    }
    Ok(())
}

async fn other_tenants_excluded<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(fixture(vec![TableData::rates(
        "t",
        "Moving",
        vec![
            make_entry("a1", "acme"),
            make_entry("g1", "globex"),
            make_entry("a2", "acme"),
        ],
    )]))
    .await;
    let acme = s
        .list_active_entries("t", "acme")
        .await
        .map_err(|e| e.to_string())?;
    if ids(&acme) != ["a1", "a2"] {
        return Err(format!("expected [a1, a2] for acme, got {:?}", ids(&acme)));
    }
    let nobody = s
        .list_active_entries("t", "initech")
        .await
        .map_err(|e| e.to_string())?;
    if !nobody.is_empty() {
        return Err(format!("expected no entries, got {:?}", ids(&nobody)));
    }
    Ok(())
}

async fn entry_fields_preserved<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let mut entry = make_entry("e1", "acme");
    entry.location_id = Some("NYC".to_string());
    entry.customer_code = Some("C-100".to_string());
    entry.amount = Some(rust_decimal::Decimal::new(125050, 2));
    entry.valid_from = Some("2024-01-01".to_string());
    entry
        .dimensions
        .insert("vehicle".to_string(), Some("truck".to_string()));
    entry.dimensions.insert("crew".to_string(), None);

    let s = factory(fixture(vec![TableData::rates(
        "t",
        "Moving",
        vec![entry.clone()],
    )]))
    .await;
    let entries = s
        .list_active_entries("t", "acme")
        .await
        .map_err(|e| e.to_string())?;
    match entries.as_slice() {
        [got] if *got == entry => Ok(()),
        other => Err(format!("entry not preserved: {other:?}")),
    }
}

async fn lookup_table_has_no_entries<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory(standard_fixture()).await;
    let entries = s
        .list_active_entries("tbl-tiers", "acme")
        .await
        .map_err(|e| e.to_string())?;
    if !entries.is_empty() {
        return Err(format!("expected no entries, got {}", entries.len()));
    }
    Ok(())
}
