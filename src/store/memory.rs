//! In-memory table store

use super::{check_arity, StoreError, Table, TableStore};
use std::collections::HashMap;

/// Tables keyed by lower-cased name, matching SQLite's case-insensitive lookup
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: HashMap<String, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used to assemble fixtures
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.insert(table.name.to_lowercase(), table);
        self
    }
}

impl TableStore for MemoryStore {
    fn replace_table(&mut self, table: &Table) -> Result<(), StoreError> {
        check_arity(table)?;
        self.tables.insert(table.name.to_lowercase(), table.clone());
        Ok(())
    }

    fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        self.tables
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.tables.contains_key(&name.to_lowercase()))
    }

    fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self.tables.values().map(|t| t.name.clone()).collect();
        names.sort();
        Ok(names)
    }

    fn backend_type(&self) -> &'static str {
        "Memory"
    }
}
