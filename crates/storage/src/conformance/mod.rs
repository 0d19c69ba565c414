//! Conformance test suite for `TableStore` implementations.
//!
//! Any backend can run this suite to check the read contract the engine
//! depends on:
//!
//! - **Lookup**: name resolution, row contents and row order
//! - **Entries**: archive and tenant filtering, entry order
//! - **Error handling**: unknown table ids
//! - **Concurrent reads**: many tasks reading one store agree
//!
//! # Usage
//!
//! The factory receives the tables a test needs and returns a store
//! holding exactly those tables, in that order:
//!
//! ```ignore
//! use relocost_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn sql_conformance() {
//!     let report = run_conformance_suite(|fixture| async move {
//!         seed_test_database(fixture).await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod concurrent;
mod entries;
mod error;
mod lookup;

use std::fmt;
use std::future::Future;

use crate::record::{RateEntry, Row, TableData, TableFixture};
use crate::TableStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "lookup", "entries").
    pub category: String,
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// `factory` is called once per test with that test's tables and must
/// return a store containing exactly those tables.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(lookup::run_lookup_tests(&factory).await);
    results.extend(entries::run_entry_tests(&factory).await);
    results.extend(error::run_error_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers: fixtures with sensible defaults ─────────────────────────────────

fn make_row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn make_entry(id: &str, tenant_id: &str) -> RateEntry {
    RateEntry {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        ..Default::default()
    }
}

fn fixture(tables: Vec<TableData>) -> TableFixture {
    TableFixture { tables }
}

/// Two lookup tables and one rate table, as most tests need.
fn standard_fixture() -> TableFixture {
    fixture(vec![
        TableData::lookup(
            "tbl-tiers",
            "Tiers",
            vec![
                make_row(&[("tier", "1"), ("rate", "5000")]),
                make_row(&[("tier", "2"), ("rate", "7500")]),
                make_row(&[("tier", "3"), ("rate", "9000")]),
            ],
        ),
        TableData::lookup(
            "tbl-regions",
            "Regions",
            vec![make_row(&[("region", "west"), ("factor", "1.1")])],
        ),
        TableData::rates(
            "tbl-moving",
            "Moving",
            vec![
                make_entry("e1", "acme"),
                make_entry("e2", "acme"),
                make_entry("e3", "acme"),
            ],
        ),
    ])
}
