//! In-memory `TableStore`, backed by a `TableFixture`.
//!
//! Used by the CLI (tables loaded from a JSON file) and by tests. Tables and
//! records keep their insertion order, which is the storage order the trait
//! requires.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::record::{RateEntry, Row, TableData, TableFixture, TableId};
use crate::traits::TableStore;

/// A cloneable handle to shared in-memory tables.
///
/// Clones share the same data, so a writer holding one handle can replace
/// tables while readers use another.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    tables: Arc<RwLock<Vec<TableData>>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: TableFixture) -> Self {
        MemoryTableStore {
            tables: Arc::new(RwLock::new(fixture.tables)),
        }
    }

    /// Decode a fixture from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, StorageError> {
        let fixture: TableFixture =
            serde_json::from_str(json).map_err(|e| StorageError::Fixture(e.to_string()))?;
        Ok(Self::from_fixture(fixture))
    }

    /// Read and decode a fixture file.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            StorageError::Fixture(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// A store holding `tables` in the given order.
    pub fn from_tables(tables: Vec<TableData>) -> Self {
        Self::from_fixture(TableFixture { tables })
    }

    /// Append a table, keeping any existing table with the same name.
    pub async fn insert_table(&self, table: TableData) {
        self.tables.write().await.push(table);
    }

    /// Replace the rows of an existing table.
    pub async fn replace_rows(&self, table_id: &str, rows: Vec<Row>) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        let table = tables
            .iter_mut()
            .find(|t| t.id == table_id)
            .ok_or_else(|| StorageError::TableNotFound {
                table_id: table_id.to_string(),
            })?;
        table.rows = rows;
        Ok(())
    }

    /// Snapshot the current contents as a fixture.
    pub async fn to_fixture(&self) -> TableFixture {
        TableFixture {
            tables: self.tables.read().await.clone(),
        }
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn find_table_by_name(&self, name: &str) -> Result<Option<TableId>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.iter().find(|t| t.name == name).map(|t| t.id.clone()))
    }

    async fn list_rows(&self, table_id: &str) -> Result<Vec<Row>, StorageError> {
        let tables = self.tables.read().await;
        tables
            .iter()
            .find(|t| t.id == table_id)
            .map(|t| t.rows.clone())
            .ok_or_else(|| StorageError::TableNotFound {
                table_id: table_id.to_string(),
            })
    }

    async fn list_active_entries(
        &self,
        table_id: &str,
        tenant_id: &str,
    ) -> Result<Vec<RateEntry>, StorageError> {
        let tables = self.tables.read().await;
        let table = tables
            .iter()
            .find(|t| t.id == table_id)
            .ok_or_else(|| StorageError::TableNotFound {
                table_id: table_id.to_string(),
            })?;
        Ok(table
            .entries
            .iter()
            .filter(|e| !e.archived && e.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
