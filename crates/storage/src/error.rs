/// All errors that can be returned by a TableStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No table with the given id exists.
    #[error("table not found: {table_id}")]
    TableNotFound { table_id: String },

    /// A table fixture could not be read or decoded.
    #[error("invalid table fixture: {0}")]
    Fixture(String),

    /// A backend-specific storage error (DB connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
