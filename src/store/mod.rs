//! Table store - "create or fully replace by name" persistence
//!
//! Two backends implement [`TableStore`]:
//! - [`SqliteStore`] - file-backed store used by both binaries
//! - [`MemoryStore`] - in-process store used by unit-test fixtures

pub mod memory;
pub mod sqlite;
pub mod table;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use table::{ColumnType, GroupKey, Table, Value};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table {table} row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        table: String,
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Backend trait for named-table persistence
///
/// Writes are whole-table replacements; there is no append or upsert.
pub trait TableStore {
    /// Create `table.name`, dropping any existing table of that name first
    fn replace_table(&mut self, table: &Table) -> Result<(), StoreError>;

    /// Read every row of a table in storage order
    fn read_table(&self, name: &str) -> Result<Table, StoreError>;

    fn table_exists(&self, name: &str) -> Result<bool, StoreError>;

    fn table_names(&self) -> Result<Vec<String>, StoreError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}

/// Reject rows whose arity differs from the column list
pub(crate) fn check_arity(table: &Table) -> Result<(), StoreError> {
    let expected = table.columns.len();
    match table.rows.iter().position(|row| row.len() != expected) {
        Some(row) => Err(StoreError::RaggedRow {
            table: table.name.clone(),
            row,
            expected,
            found: table.rows[row].len(),
        }),
        None => Ok(()),
    }
}
