//! Table storage for the relocost engine.
//!
//! The engine reads lookup tables (rows of column → text cells) and rate
//! tables (structured [`RateEntry`] records) through the [`TableStore`]
//! trait. [`MemoryTableStore`] is a shared in-memory implementation loaded
//! from a JSON [`TableFixture`]; other backends can check themselves
//! against [`conformance::run_conformance_suite`].

pub mod conformance;
mod error;
mod memory;
mod record;
mod traits;

pub use error::StorageError;
pub use memory::MemoryTableStore;
pub use record::{RateEntry, Row, TableData, TableFixture, TableId, MATCH_ATTRIBUTES};
pub use traits::TableStore;
