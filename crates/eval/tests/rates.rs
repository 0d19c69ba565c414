//! Rate resolution against an in-memory table store.
//!
//! Organized by category:
//!   A. Wildcards and specificity
//!   B. Customer tier precedence
//!   C. Effective dates
//!   D. Table resolution, limits and failures

use relocost_eval::{
    resolve, resolve_rate, EvalError, FilterCriteria, RateRequest, RateResponse, TableRef,
};
use relocost_storage::{MemoryTableStore, RateEntry, TableData};
use rust_decimal::Decimal;
use time::macros::date;

// ──────────────────────────────────────────────
// Test helpers
// ──────────────────────────────────────────────

const TENANT: &str = "acme";

fn entry(id: &str) -> RateEntry {
    RateEntry {
        id: id.to_string(),
        tenant_id: TENANT.to_string(),
        amount: Some(Decimal::from(100)),
        ..Default::default()
    }
}

fn at(id: &str, location: &str) -> RateEntry {
    RateEntry {
        location_id: Some(location.to_string()),
        ..entry(id)
    }
}

fn store(entries: Vec<RateEntry>) -> MemoryTableStore {
    MemoryTableStore::from_tables(vec![TableData::rates("tbl-moving", "Moving", entries)])
}

fn request() -> RateRequest {
    RateRequest::new(TableRef::Name("Moving".to_string()), TENANT)
}

fn ids(resolution: &relocost_eval::RateResolution) -> Vec<&str> {
    resolution
        .content
        .iter()
        .map(|s| s.entry.id.as_str())
        .collect()
}

// ──────────────────────────────────────────────
// A. Wildcards and specificity
// ──────────────────────────────────────────────

#[tokio::test]
async fn a01_concrete_match_outranks_wildcard() {
    let s = store(vec![entry("A"), at("B", "NYC")]);
    let r = resolve(&s, &request().filter(FilterCriteria::eq("location_id", "NYC")))
        .await
        .unwrap();
    assert_eq!(ids(&r), vec!["B", "A"]);
    // both carry an amount; B also pins its location
    assert_eq!(r.content[0].score, 20);
    assert_eq!(r.content[1].score, 10);
}

#[tokio::test]
async fn a02_wildcard_never_outranks_concrete_regardless_of_order() {
    for entries in [
        vec![entry("A"), at("B", "NYC")],
        vec![at("B", "NYC"), entry("A")],
    ] {
        let r = resolve(
            &store(entries),
            &request().filter(FilterCriteria::eq("location_id", "NYC")),
        )
        .await
        .unwrap();
        assert_eq!(r.content[0].entry.id, "B");
    }
}

#[tokio::test]
async fn a03_mismatched_entries_are_dropped() {
    let s = store(vec![at("nyc", "NYC"), at("lax", "LAX"), entry("any")]);
    let r = resolve(&s, &request().filter(FilterCriteria::eq("location_id", "NYC")))
        .await
        .unwrap();
    assert_eq!(ids(&r), vec!["nyc", "any"]);
    assert_eq!(r.total_matches, 2);
}

#[tokio::test]
async fn a04_in_filter_and_dimensions() {
    let mut van = entry("van");
    van.dimensions
        .insert("vehicle".to_string(), Some("van".to_string()));
    let mut bike = entry("bike");
    bike.dimensions
        .insert("vehicle".to_string(), Some("bike".to_string()));
    let mut open = entry("open");
    open.dimensions.insert("vehicle".to_string(), None);

    let r = resolve(
        &store(vec![open, bike, van]),
        &request().filter(FilterCriteria::one_of("vehicle", &["van", "truck"])),
    )
    .await
    .unwrap();
    assert_eq!(ids(&r), vec!["van", "open"]);
    assert_eq!(r.content[0].score, 15);
}

#[tokio::test]
async fn a05_equal_scores_keep_storage_order() {
    let s = store(vec![at("first", "NYC"), at("second", "NYC"), at("third", "NYC")]);
    let r = resolve(&s, &request()).await.unwrap();
    assert_eq!(ids(&r), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn a06_score_counts_all_concrete_fields() {
    let mut pinned = at("pinned", "NYC");
    pinned.currency = Some("USD".to_string());
    pinned.scope = Some("local".to_string());
    pinned
        .dimensions
        .insert("crew".to_string(), Some("2".to_string()));
    let r = resolve(&store(vec![pinned]), &request()).await.unwrap();
    assert_eq!(r.content[0].score, 45);
}

#[tokio::test]
async fn a07_values_and_validity_bounds_add_specificity() {
    let plain = at("plain", "NYC");
    let mut dated = at("dated", "NYC");
    dated.valid_from = Some("2024-01-01".to_string());
    dated.valid_to = Some("2024-12-31".to_string());
    dated.percentage = Some(Decimal::new(5, 0));
    let r = resolve(&store(vec![plain, dated]), &request()).await.unwrap();
    assert_eq!(ids(&r), vec!["dated", "plain"]);
    assert_eq!(r.content[0].score, 50);
    assert_eq!(r.content[1].score, 20);
}

// ──────────────────────────────────────────────
// B. Customer tier precedence
// ──────────────────────────────────────────────

fn tiered() -> MemoryTableStore {
    let mut vip = entry("vip");
    vip.customer_code = Some("C-1".to_string());

    let mut precise = at("precise", "NYC");
    precise.currency = Some("USD".to_string());
    precise.status = Some("active".to_string());

    let mut other = at("other", "NYC");
    other.customer_code = Some("C-2".to_string());

    store(vec![precise, vip, other, entry("generic")])
}

#[tokio::test]
async fn b01_customer_entries_exclude_standard_entries() {
    let r = resolve(
        &tiered(),
        &request()
            .customer("C-1")
            .filter(FilterCriteria::eq("location_id", "NYC")),
    )
    .await
    .unwrap();
    assert_eq!(ids(&r), vec!["vip"]);
    // tier bonus + customer_code + amount
    assert_eq!(r.content[0].score, 1020);
    assert_eq!(r.customer_matches, 1);
    assert_eq!(r.standard_matches, 2);
    assert_eq!(r.total_matches, 3);
}

#[tokio::test]
async fn b02_standard_tier_when_customer_has_no_entries() {
    let r = resolve(&tiered(), &request().customer("C-9")).await.unwrap();
    assert_eq!(ids(&r), vec!["precise", "generic"]);
    assert_eq!(r.customer_matches, 0);
}

#[tokio::test]
async fn b03_other_customers_never_match() {
    let r = resolve(&tiered(), &request()).await.unwrap();
    assert!(ids(&r).iter().all(|id| *id != "other" && *id != "vip"));
}

// ──────────────────────────────────────────────
// C. Effective dates
// ──────────────────────────────────────────────

fn dated(id: &str, from: Option<&str>, to: Option<&str>) -> RateEntry {
    RateEntry {
        valid_from: from.map(str::to_string),
        valid_to: to.map(str::to_string),
        ..entry(id)
    }
}

#[tokio::test]
async fn c01_window_bounds_are_inclusive() {
    let s = store(vec![
        dated("starts-today", Some("2024-03-01"), None),
        dated("ended", None, Some("2024-02-29")),
        dated("ends-today", Some("2024-01-01"), Some("2024-03-01")),
        dated("future", Some("2024-03-02"), None),
        dated("always", None, None),
    ]);
    let r = resolve(&s, &request().on(date!(2024 - 03 - 01))).await.unwrap();
    assert_eq!(ids(&r), vec!["starts-today", "ends-today", "always"]);
}

#[tokio::test]
async fn c02_no_date_ignores_windows() {
    let s = store(vec![dated("ended", None, Some("2000-01-01"))]);
    let r = resolve(&s, &request()).await.unwrap();
    assert_eq!(r.total_matches, 1);
}

#[tokio::test]
async fn c03_malformed_stored_date() {
    let s = store(vec![dated("bad", Some("March 1st"), None)]);
    let err = resolve(&s, &request().on(date!(2024 - 03 - 01)))
        .await
        .unwrap_err();
    assert!(matches!(err, EvalError::InvalidDate { ref entry_id, .. } if entry_id == "bad"));
}

// ──────────────────────────────────────────────
// D. Table resolution, limits and failures
// ──────────────────────────────────────────────

#[tokio::test]
async fn d01_limit_truncates_after_ranking() {
    let s = store(vec![entry("w1"), at("nyc", "NYC"), entry("w2")]);
    let r = resolve(&s, &request().limit(1)).await.unwrap();
    assert_eq!(ids(&r), vec!["nyc"]);
    assert_eq!(r.total_matches, 3);
}

#[tokio::test]
async fn d02_zero_limit_returns_everything() {
    let s = store(vec![entry("a"), entry("b"), entry("c")]);
    let r = resolve(&s, &request().limit(0)).await.unwrap();
    assert_eq!(r.content.len(), 3);
}

#[tokio::test]
async fn d03_table_by_id() {
    let s = store(vec![entry("a")]);
    let req = RateRequest::new(TableRef::Id("tbl-moving".to_string()), TENANT);
    assert_eq!(resolve(&s, &req).await.unwrap().total_matches, 1);
}

#[tokio::test]
async fn d04_unknown_table_by_name_or_id() {
    let s = store(Vec::new());
    for table in [
        TableRef::Name("Nope".to_string()),
        TableRef::Id("nope".to_string()),
    ] {
        let err = resolve(&s, &RateRequest::new(table, TENANT))
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::RateTableNotFound { .. }));
    }
}

#[tokio::test]
async fn d05_response_reports_errors_as_text() {
    let s = store(Vec::new());
    let req = RateRequest::new(TableRef::Name("Nope".to_string()), TENANT);
    let response = resolve_rate(&s, &req).await;
    assert_eq!(
        response,
        RateResponse::Failed {
            error: "rate table not found: 'Nope'".to_string()
        }
    );
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({"error": "rate table not found: 'Nope'"})
    );
}

#[tokio::test]
async fn d06_other_tenants_and_archived_entries_are_invisible() {
    let mut foreign = at("foreign", "NYC");
    foreign.tenant_id = "globex".to_string();
    let mut archived = at("archived", "NYC");
    archived.archived = true;
    let s = store(vec![foreign, archived, entry("mine")]);
    let r = resolve(&s, &request()).await.unwrap();
    assert_eq!(ids(&r), vec!["mine"]);
}

#[tokio::test]
async fn d07_resolution_is_idempotent() {
    let s = tiered();
    let req = request()
        .customer("C-9")
        .filter(FilterCriteria::eq("location_id", "NYC"))
        .limit(5);
    let first = resolve_rate(&s, &req).await;
    for _ in 0..5 {
        assert_eq!(resolve_rate(&s, &req).await, first);
    }
}

#[tokio::test]
async fn d08_resolved_response_serializes_flat() {
    let s = store(vec![at("nyc", "NYC")]);
    let response = resolve_rate(&s, &request()).await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["total_matches"], 1);
    assert_eq!(json["content"][0]["id"], "nyc");
    assert_eq!(json["content"][0]["score"], 20);
    assert_eq!(json["content"][0]["amount"], "100");
}
