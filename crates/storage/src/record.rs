use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a lookup table: column name → cell text.
pub type Row = BTreeMap<String, String>;

/// Identifier of a stored table, as returned by `find_table_by_name`.
pub type TableId = String;

/// A rate table entry.
///
/// Every attribute is optional. A `None` attribute (or a dimension that is
/// absent or null) is a wildcard: it matches any requested value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub id: String,
    #[serde(default)]
    pub tenant_id: String,
    /// Archived entries are never returned by `list_active_entries`.
    #[serde(default)]
    pub archived: bool,

    pub location_id: Option<String>,
    pub location_type: Option<String>,
    pub origin_location_id: Option<String>,
    pub origin_location_type: Option<String>,
    pub destination_location_id: Option<String>,
    pub destination_location_type: Option<String>,
    pub customer_code: Option<String>,
    pub status: Option<String>,
    pub time_span: Option<String>,
    pub currency: Option<String>,
    pub frequency: Option<String>,
    pub scope: Option<String>,
    pub scope_detail: Option<String>,

    pub amount: Option<Decimal>,
    pub percentage: Option<Decimal>,
    /// ISO 8601 date (`YYYY-MM-DD`), inclusive.
    pub valid_from: Option<String>,
    /// ISO 8601 date (`YYYY-MM-DD`), inclusive.
    pub valid_to: Option<String>,

    #[serde(default)]
    pub dimensions: BTreeMap<String, Option<String>>,
}

/// Standard attribute names that filters can match against.
///
/// `customer_code` selects the tier and is not listed. Neither are the
/// values (`amount`, `percentage`) or the validity window. Scoring counts
/// those too; see [`RateEntry::concrete_field_count`].
pub const MATCH_ATTRIBUTES: &[&str] = &[
    "location_id",
    "location_type",
    "origin_location_id",
    "origin_location_type",
    "destination_location_id",
    "destination_location_type",
    "status",
    "time_span",
    "currency",
    "frequency",
    "scope",
    "scope_detail",
];

impl RateEntry {
    /// Look up a standard attribute by name.
    ///
    /// Names are compared ignoring case and underscores, so `locationId`,
    /// `LOCATION_ID` and `location_id` are the same attribute. Returns
    /// `None` when `name` is not a standard attribute (callers then look in
    /// `dimensions`), `Some(None)` when the attribute is a wildcard.
    pub fn attribute(&self, name: &str) -> Option<Option<&str>> {
        let value = match normalize_key(name).as_str() {
            "locationid" => &self.location_id,
            "locationtype" => &self.location_type,
            "originlocationid" => &self.origin_location_id,
            "originlocationtype" => &self.origin_location_type,
            "destinationlocationid" => &self.destination_location_id,
            "destinationlocationtype" => &self.destination_location_type,
            "status" => &self.status,
            "timespan" => &self.time_span,
            "currency" => &self.currency,
            "frequency" => &self.frequency,
            "scope" => &self.scope,
            "scopedetail" => &self.scope_detail,
            _ => return None,
        };
        Some(value.as_deref())
    }

    /// A filterable value: standard attribute first, then dimension.
    /// Absent dimensions read as `None` (wildcard).
    pub fn match_value(&self, key: &str) -> Option<&str> {
        match self.attribute(key) {
            Some(value) => value,
            None => self.dimensions.get(key).and_then(|v| v.as_deref()),
        }
    }

    /// Number of standard fields holding a concrete value: the match
    /// attributes plus `customer_code`, `amount`, `percentage` and the
    /// validity bounds.
    pub fn concrete_field_count(&self) -> usize {
        let attributes = MATCH_ATTRIBUTES
            .iter()
            .filter(|name| matches!(self.attribute(name), Some(Some(_))))
            .count();
        let others = [
            self.customer_code.is_some(),
            self.amount.is_some(),
            self.percentage.is_some(),
            self.valid_from.is_some(),
            self.valid_to.is_some(),
        ];
        attributes + others.iter().filter(|set| **set).count()
    }

    /// Number of dimensions holding a concrete value.
    pub fn concrete_dimension_count(&self) -> usize {
        self.dimensions.values().filter(|v| v.is_some()).count()
    }
}

fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A stored table. Lookup tables carry `rows`; rate tables carry `entries`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub id: TableId,
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub entries: Vec<RateEntry>,
}

impl TableData {
    pub fn lookup(id: &str, name: &str, rows: Vec<Row>) -> Self {
        TableData {
            id: id.to_string(),
            name: name.to_string(),
            rows,
            entries: Vec::new(),
        }
    }

    pub fn rates(id: &str, name: &str, entries: Vec<RateEntry>) -> Self {
        TableData {
            id: id.to_string(),
            name: name.to_string(),
            rows: Vec::new(),
            entries,
        }
    }
}

/// A serialized set of tables, e.g. a `tables.json` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableFixture {
    #[serde(default)]
    pub tables: Vec<TableData>,
}
