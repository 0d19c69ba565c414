//! Single-key lookup into a named table.
//!
//! `LOOKUP("Tiers", "tier", "rate", tier)` resolves `Tiers` by exact name,
//! scans its rows in storage order and returns the `rate` cell of the
//! first row whose `tier` cell matches the key.

use relocost_storage::TableStore;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::error::EvalError;
use crate::numeric::{canonical_key, coerce_numeric, key_matches};

/// Audit record for one `LOOKUP` call, kept whether or not it succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupDiagnostic {
    pub table: String,
    pub key_column: String,
    pub value_column: String,
    pub key: Decimal,
    pub result: Option<Decimal>,
    pub error: Option<String>,
}

impl LookupDiagnostic {
    pub fn new(
        table: &str,
        key_column: &str,
        value_column: &str,
        key: Decimal,
        outcome: &Result<Decimal, EvalError>,
    ) -> Self {
        let (result, error) = match outcome {
            Ok(value) => (Some(*value), None),
            Err(e) => (None, Some(e.to_string())),
        };
        LookupDiagnostic {
            table: table.to_string(),
            key_column: key_column.to_string(),
            value_column: value_column.to_string(),
            key,
            result,
            error,
        }
    }
}

/// Resolve one lookup against the store.
///
/// Errors:
/// - `LookupTableNotFound` if no table has this exact name
/// - `LookupColumnNotFound` if no row has `key_column`, or the matching
///   row has no `value_column`
/// - `LookupNoMatch` if no row's key cell matches
/// - `LookupValueNotNumeric` if the matching cell is not a number
pub async fn lookup<S>(
    store: &S,
    table: &str,
    key_column: &str,
    value_column: &str,
    key: Decimal,
) -> Result<Decimal, EvalError>
where
    S: TableStore + ?Sized,
{
    let table_id = store
        .find_table_by_name(table)
        .await?
        .ok_or_else(|| EvalError::LookupTableNotFound {
            table: table.to_string(),
        })?;
    let rows = store.list_rows(&table_id).await?;
    debug!(table, table_id = %table_id, rows = rows.len(), %key, "lookup");

    let mut saw_key_column = false;
    for row in &rows {
        let Some(cell) = row.get(key_column) else {
            continue;
        };
        saw_key_column = true;
        if !key_matches(cell, key) {
            continue;
        }
        let raw = row
            .get(value_column)
            .ok_or_else(|| EvalError::LookupColumnNotFound {
                table: table.to_string(),
                column: value_column.to_string(),
            })?;
        return coerce_numeric(raw).ok_or_else(|| EvalError::LookupValueNotNumeric {
            table: table.to_string(),
            value_column: value_column.to_string(),
            value: raw.clone(),
        });
    }

    if !rows.is_empty() && !saw_key_column {
        return Err(EvalError::LookupColumnNotFound {
            table: table.to_string(),
            column: key_column.to_string(),
        });
    }
    Err(EvalError::LookupNoMatch {
        table: table.to_string(),
        key_column: key_column.to_string(),
        key: canonical_key(key),
    })
}
