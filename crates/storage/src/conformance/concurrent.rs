use std::future::Future;
use std::sync::Arc;

use super::{standard_fixture, TestResult};
use crate::record::TableFixture;
use crate::TableStore;

/// Number of concurrent readers in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    vec![TestResult::from_result(
        "concurrent",
        "concurrent_reads_agree",
        concurrent_reads_agree(factory).await,
    )]
}

/// N spawned tasks read the same table; every task sees the same rows.
async fn concurrent_reads_agree<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: TableStore,
    F: Fn(TableFixture) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory(standard_fixture()).await);
    let expected = storage
        .list_rows("tbl-tiers")
        .await
        .map_err(|e| e.to_string())?;

    let mut handles = Vec::new();
    for _ in 0..N {
        let s = storage.clone();
        handles.push(tokio::spawn(async move { s.list_rows("tbl-tiers").await }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let rows = handle
            .await
            .map_err(|e| format!("task {i} panicked: {e}"))?
            .map_err(|e| format!("task {i}: {e}"))?;
        if rows != expected {
            return Err(format!("task {i} saw different rows"));
        }
    }
    Ok(())
}
