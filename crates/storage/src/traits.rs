use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{RateEntry, Row, TableId};

/// Read-only access to named lookup and rate tables.
///
/// The engine never writes through this trait. Writers are external and may
/// change a table between (or during) calls; implementations provide no
/// snapshot isolation.
///
/// ## Ordering
///
/// `list_rows` and `list_active_entries` must return records in a stable
/// storage order: two calls against unchanged data return the same
/// sequence. The engine relies on that order for first-match lookups and
/// for tie-breaks between equally specific rate entries.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so one store can be
/// shared across async tasks.
#[async_trait]
pub trait TableStore: Send + Sync + 'static {
    /// Resolve a table name to its id.
    ///
    /// Names are matched exactly. When several tables share a name the
    /// first one in storage order is returned.
    async fn find_table_by_name(&self, name: &str) -> Result<Option<TableId>, StorageError>;

    /// All rows of a lookup table, in storage order.
    ///
    /// Returns `Err(StorageError::TableNotFound)` for an unknown id.
    async fn list_rows(&self, table_id: &str) -> Result<Vec<Row>, StorageError>;

    /// Non-archived rate entries of `table_id` belonging to `tenant_id`,
    /// in storage order.
    ///
    /// Returns `Err(StorageError::TableNotFound)` for an unknown id.
    async fn list_active_entries(
        &self,
        table_id: &str,
        tenant_id: &str,
    ) -> Result<Vec<RateEntry>, StorageError>;
}
