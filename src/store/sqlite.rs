//! SQLite-backed table store
//!
//! Each `replace_table` runs DROP + CREATE + INSERT inside one transaction, so a
//! failed write leaves the previous contents of the table untouched.

use super::{check_arity, StoreError, Table, TableStore, Value};
use crate::sqlite_pragma::apply_optimized_pragmas;
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::time::Instant;

/// Quote an identifier for SQLite (`"` doubled inside)
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        apply_optimized_pragmas(&conn)?;

        log::info!("✅ SQLite store opened: {}", db_path.display());

        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        apply_optimized_pragmas(&conn)?;
        Ok(Self { conn })
    }

    /// Underlying connection, for ad-hoc queries in tests and tooling
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Stored name of a table, resolved case-insensitively
    fn resolve_name(&self, name: &str) -> Result<Option<String>, StoreError> {
        let stored = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(stored)
    }
}

impl TableStore for SqliteStore {
    fn replace_table(&mut self, table: &Table) -> Result<(), StoreError> {
        check_arity(table)?;
        let started = Instant::now();
        let ident = quote_ident(&table.name);

        let column_defs: Vec<String> = table
            .columns
            .iter()
            .enumerate()
            .map(|(idx, col)| format!("{} {}", quote_ident(col), table.column_type(idx).as_sql()))
            .collect();

        let placeholders: Vec<String> = (1..=table.columns.len()).map(|i| format!("?{}", i)).collect();

        let tx = self.conn.transaction()?;

        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {ident};
             CREATE TABLE {ident} ({});",
            column_defs.join(", ")
        ))?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {ident} VALUES ({})",
                placeholders.join(", ")
            ))?;

            for row in &table.rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }

        tx.commit()?;

        log::debug!(
            "✅ Replaced table {} ({} rows, {} columns) in {:?}",
            table.name,
            table.rows.len(),
            table.columns.len(),
            started.elapsed()
        );

        Ok(())
    }

    fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        let stored = self
            .resolve_name(name)?
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))?;

        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_ident(&stored)))?;

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width).map(|i| row.get::<_, Value>(i)).collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        log::debug!("📥 Read table {} ({} rows)", stored, rows.len());

        Ok(Table {
            name: stored,
            columns,
            rows,
        })
    }

    fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.resolve_name(name)?.is_some())
    }

    fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn purchases() -> Table {
        Table::new(
            "Purchases",
            vec![
                "VendorNumber".into(),
                "VendorName".into(),
                "PurchasePrice".into(),
                "Volume".into(),
            ],
        )
        .with_rows(vec![
            vec![
                Value::Integer(105),
                Value::text("ALTAMAR BRANDS LLC   "),
                Value::Real(26.27),
                Value::text("750"),
            ],
            vec![Value::Integer(4466), Value::Null, Value::Real(0.0), Value::text("1750")],
        ])
    }

    #[test]
    fn test_round_trip_preserves_values_and_columns() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("inventory.db");

        let mut store = SqliteStore::open(&db_path).unwrap();
        store.replace_table(&purchases()).unwrap();
        drop(store);

        let store = SqliteStore::open(&db_path).unwrap();
        let read = store.read_table("Purchases").unwrap();

        assert_eq!(read, purchases());
    }

    #[test]
    fn test_replace_drops_previous_contents() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.replace_table(&purchases()).unwrap();

        let replacement = Table::new("purchases", vec!["Brand".into()])
            .with_rows(vec![vec![Value::Integer(8412)]]);
        store.replace_table(&replacement).unwrap();

        let read = store.read_table("PURCHASES").unwrap();
        assert_eq!(read.columns, vec!["Brand".to_string()]);
        assert_eq!(read.rows, vec![vec![Value::Integer(8412)]]);
        assert_eq!(store.table_names().unwrap(), vec!["purchases".to_string()]);
    }

    #[test]
    fn test_failed_replace_keeps_old_table() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.replace_table(&purchases()).unwrap();

        // Duplicate column names make CREATE TABLE fail inside the transaction
        let broken = Table::new("Purchases", vec!["a".into(), "A".into()]);
        assert!(store.replace_table(&broken).is_err());

        assert_eq!(store.read_table("Purchases").unwrap(), purchases());
    }

    #[test]
    fn test_missing_table() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.read_table("vendor_invoice"),
            Err(StoreError::TableNotFound(name)) if name == "vendor_invoice"
        ));
    }

    #[test]
    fn test_quoted_identifiers() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let odd = Table::new("order", vec!["group".into(), "say \"hi\"".into()])
            .with_rows(vec![vec![Value::Integer(1), Value::text("x")]]);

        store.replace_table(&odd).unwrap();
        assert_eq!(store.read_table("order").unwrap(), odd);
    }

    #[test]
    fn test_infinity_survives_storage() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let table = Table::new("m", vec!["ProfitMargin".into()]).with_rows(vec![
            vec![Value::Real(f64::NEG_INFINITY)],
            vec![Value::Real(12.5)],
        ]);

        store.replace_table(&table).unwrap();
        assert_eq!(store.read_table("m").unwrap(), table);
    }
}
