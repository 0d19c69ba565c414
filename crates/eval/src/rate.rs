//! Wildcard rate resolution.
//!
//! A rate table holds [`RateEntry`] records whose null attributes are
//! wildcards. Resolution filters entries against the request, splits them
//! into a customer tier and a standard tier, scores them by how many
//! attributes they pin, and returns them best first.
//!
//! Steps:
//! 1. keep entries that satisfy every filter and whose validity window
//!    contains the effective date
//! 2. customer tier = entries with the requested customer code; standard
//!    tier = entries with no customer code; other customers' entries drop
//! 3. a non-empty customer tier replaces the standard tier
//! 4. score = 1000 for the customer tier + 10 per concrete standard
//!    field (customer code, values and validity bounds included) + 5 per
//!    concrete dimension
//! 5. stable sort by score, descending; truncate to `limit` (0 = all)

use relocost_storage::{RateEntry, StorageError, TableStore};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::Date;
use tracing::{debug, warn};

use crate::error::EvalError;

pub const CUSTOMER_TIER_BONUS: u32 = 1000;
pub const ATTRIBUTE_WEIGHT: u32 = 10;
pub const DIMENSION_WEIGHT: u32 = 5;

// ──────────────────────────────────────────────
// Request
// ──────────────────────────────────────────────

/// How a filter compares an entry's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// Exact string equality.
    #[serde(rename = "eq")]
    Equals(String),
    /// Membership in a set of values.
    In(Vec<String>),
}

/// One filter on a standard attribute or a dimension.
///
/// An entry whose value for `key` is null (or absent) passes every filter
/// on that key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub key: String,
    pub comparison: Comparison,
}

impl FilterCriteria {
    pub fn eq(key: &str, value: &str) -> Self {
        FilterCriteria {
            key: key.to_string(),
            comparison: Comparison::Equals(value.to_string()),
        }
    }

    pub fn one_of(key: &str, values: &[&str]) -> Self {
        FilterCriteria {
            key: key.to_string(),
            comparison: Comparison::In(values.iter().map(|v| v.to_string()).collect()),
        }
    }

    pub fn matches(&self, entry: &RateEntry) -> bool {
        match entry.match_value(&self.key) {
            None => true,
            Some(value) => match &self.comparison {
                Comparison::Equals(expected) => value == expected,
                Comparison::In(allowed) => allowed.iter().any(|a| a == value),
            },
        }
    }
}

/// Which rate table to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableRef {
    Id(String),
    Name(String),
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableRef::Id(id) => write!(f, "id {}", id),
            TableRef::Name(name) => write!(f, "'{}'", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    pub table: TableRef,
    pub tenant_id: String,
    pub customer_code: Option<String>,
    /// Applied in order; all must pass.
    pub filters: Vec<FilterCriteria>,
    pub effective_date: Option<Date>,
    /// Maximum entries returned; 0 returns all.
    pub limit: usize,
}

impl RateRequest {
    pub fn new(table: TableRef, tenant_id: &str) -> Self {
        RateRequest {
            table,
            tenant_id: tenant_id.to_string(),
            customer_code: None,
            filters: Vec::new(),
            effective_date: None,
            limit: 0,
        }
    }

    pub fn customer(mut self, code: &str) -> Self {
        self.customer_code = Some(code.to_string());
        self
    }

    pub fn filter(mut self, filter: FilterCriteria) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn on(mut self, date: Date) -> Self {
        self.effective_date = Some(date);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

// ──────────────────────────────────────────────
// Response
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntry {
    #[serde(flatten)]
    pub entry: RateEntry,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateResolution {
    pub content: Vec<ScoredEntry>,
    /// Customer plus standard matches, counted before tier exclusion.
    pub total_matches: usize,
    pub customer_matches: usize,
    pub standard_matches: usize,
}

/// What [`resolve_rate`] returns: a resolution or an error message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RateResponse {
    Resolved(RateResolution),
    Failed { error: String },
}

impl From<Result<RateResolution, EvalError>> for RateResponse {
    fn from(result: Result<RateResolution, EvalError>) -> Self {
        match result {
            Ok(resolution) => RateResponse::Resolved(resolution),
            Err(e) => RateResponse::Failed {
                error: e.to_string(),
            },
        }
    }
}

// ──────────────────────────────────────────────
// Resolution
// ──────────────────────────────────────────────

/// Resolve rates, reporting failures as [`RateResponse::Failed`].
pub async fn resolve_rate<S>(store: &S, request: &RateRequest) -> RateResponse
where
    S: TableStore + ?Sized,
{
    let result = resolve(store, request).await;
    if let Err(e) = &result {
        warn!(table = %request.table, error = %e, "rate resolution failed");
    }
    result.into()
}

/// Resolve rates, returning the typed error on failure.
///
/// An empty `content` is not an error: callers see zero matches in the
/// counts.
pub async fn resolve<S>(store: &S, request: &RateRequest) -> Result<RateResolution, EvalError>
where
    S: TableStore + ?Sized,
{
    let entries = load_entries(store, request).await?;

    let mut customer = Vec::new();
    let mut standard = Vec::new();
    for entry in entries {
        if !request.filters.iter().all(|f| f.matches(&entry)) {
            continue;
        }
        if let Some(date) = request.effective_date {
            if !in_window(&entry, date)? {
                continue;
            }
        }
        match (&entry.customer_code, &request.customer_code) {
            (None, _) => standard.push(entry),
            (Some(code), Some(wanted)) if code == wanted => customer.push(entry),
            _ => {}
        }
    }

    let customer_matches = customer.len();
    let standard_matches = standard.len();
    let (tier, bonus) = if customer.is_empty() {
        (standard, 0)
    } else {
        (customer, CUSTOMER_TIER_BONUS)
    };

    let mut content: Vec<ScoredEntry> = tier
        .into_iter()
        .map(|entry| ScoredEntry {
            score: bonus + specificity(&entry),
            entry,
        })
        .collect();
    // Vec::sort_by is stable: equal scores keep storage order.
    content.sort_by(|a, b| b.score.cmp(&a.score));
    if request.limit > 0 {
        content.truncate(request.limit);
    }

    debug!(
        table = %request.table,
        customer_matches,
        standard_matches,
        returned = content.len(),
        "rates resolved"
    );
    Ok(RateResolution {
        content,
        total_matches: customer_matches + standard_matches,
        customer_matches,
        standard_matches,
    })
}

/// Score without the tier bonus.
pub fn specificity(entry: &RateEntry) -> u32 {
    let fields = entry.concrete_field_count() as u32;
    let dimensions = entry.concrete_dimension_count() as u32;
    ATTRIBUTE_WEIGHT * fields + DIMENSION_WEIGHT * dimensions
}

async fn load_entries<S>(store: &S, request: &RateRequest) -> Result<Vec<RateEntry>, EvalError>
where
    S: TableStore + ?Sized,
{
    let not_found = || EvalError::RateTableNotFound {
        table: request.table.to_string(),
    };
    let table_id = match &request.table {
        TableRef::Id(id) => id.clone(),
        TableRef::Name(name) => store.find_table_by_name(name).await?.ok_or_else(not_found)?,
    };
    match store.list_active_entries(&table_id, &request.tenant_id).await {
        Ok(entries) => Ok(entries),
        Err(StorageError::TableNotFound { .. }) => Err(not_found()),
        Err(e) => Err(e.into()),
    }
}

/// Whether `date` falls inside the entry's inclusive validity window.
/// A missing bound leaves that side open.
fn in_window(entry: &RateEntry, date: Date) -> Result<bool, EvalError> {
    if let Some(from) = parse_bound(entry, "valid_from", entry.valid_from.as_deref())? {
        if date < from {
            return Ok(false);
        }
    }
    if let Some(to) = parse_bound(entry, "valid_to", entry.valid_to.as_deref())? {
        if date > to {
            return Ok(false);
        }
    }
    Ok(true)
}

fn parse_bound(
    entry: &RateEntry,
    field: &str,
    value: Option<&str>,
) -> Result<Option<Date>, EvalError> {
    let Some(text) = value else {
        return Ok(None);
    };
    parse_date(text)
        .map(Some)
        .map_err(|_| EvalError::InvalidDate {
            entry_id: entry.id.clone(),
            field: field.to_string(),
            value: text.to_string(),
        })
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
}
