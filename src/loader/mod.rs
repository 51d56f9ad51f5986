//! Loader - source directory → one store table per file
//!
//! Every matching file is read and written independently: a failure on one
//! file is logged and skipped, the rest of the directory is still loaded.

pub mod csv_source;

pub use csv_source::{read_source, read_source_from};

use crate::config::PipelineConfig;
use crate::store::{SqliteStore, StoreError, Table, TableStore};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Error reading {file}: {source}")]
    SourceRead {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("Error writing {file} to table {table}: {source}")]
    SourceWrite {
        file: String,
        table: String,
        #[source]
        source: StoreError,
    },

    #[error("Cannot list source directory {dir}: {source}")]
    SourceDirectory {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot derive a table name from {0}")]
    InvalidSourceName(String),

    #[error("Store unavailable: {0}")]
    Store(#[from] StoreError),
}

fn non_word_runs() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\W+").expect("static pattern is valid"))
}

/// Table name for a source file: suffix stripped, `\W+` runs collapsed to `_`
///
/// `"Purchase prices (2024).csv"` → `"Purchase_prices_2024_"`
pub fn table_name_for(path: impl AsRef<Path>) -> Option<String> {
    let stem = path.as_ref().file_stem()?.to_str()?;
    if stem.is_empty() {
        return None;
    }
    Some(non_word_runs().replace_all(stem, "_").into_owned())
}

/// Replace any table named `table_name` in `store` with `table` in full
pub fn load_table<S>(table: Table, table_name: &str, store: &mut S) -> Result<usize, StoreError>
where
    S: TableStore + ?Sized,
{
    let table = table.renamed(table_name);
    store.replace_table(&table)?;
    Ok(table.len())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedSource {
    pub file: String,
    pub table: String,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedSource {
    pub file: String,
    pub error: String,
}

/// Outcome of one Loader run
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<LoadedSource>,
    pub failed: Vec<FailedSource>,
    pub elapsed_secs: f64,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Loader {
    config: PipelineConfig,
}

impl Loader {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Matching files in the source directory, sorted by file name
    pub fn source_files(&self) -> Result<Vec<PathBuf>, LoaderError> {
        let dir = &self.config.source_dir;
        let entries = fs::read_dir(dir).map_err(|source| LoaderError::SourceDirectory {
            dir: dir.clone(),
            source,
        })?;

        let ext = self.config.source_extension.as_str();
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(ext))
            })
            .collect();

        files.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));
        Ok(files)
    }

    /// Read one source file and replace its table
    pub fn load_source<S>(&self, path: &Path, store: &mut S) -> Result<LoadedSource, LoaderError>
    where
        S: TableStore + ?Sized,
    {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let table_name =
            table_name_for(path).ok_or_else(|| LoaderError::InvalidSourceName(file.clone()))?;

        let table = read_source(path, &table_name).map_err(|source| LoaderError::SourceRead {
            file: file.clone(),
            source,
        })?;

        log::info!("Ingesting {} in db", file);

        let rows = load_table(table, &table_name, store).map_err(|source| {
            LoaderError::SourceWrite {
                file: file.clone(),
                table: table_name.clone(),
                source,
            }
        })?;

        Ok(LoadedSource {
            file,
            table: table_name,
            rows,
        })
    }

    /// Load every source file into `store`, isolating per-file failures
    ///
    /// Only a missing or unreadable source directory fails the whole run.
    pub fn load_directory<S>(&self, store: &mut S) -> Result<LoadReport, LoaderError>
    where
        S: TableStore + ?Sized,
    {
        let started = Instant::now();
        let files = self.source_files()?;

        log::info!(
            "📂 {} source files in {} ({} backend)",
            files.len(),
            self.config.source_dir.display(),
            store.backend_type()
        );

        let mut report = LoadReport::default();
        let mut claimed: HashMap<String, String> = HashMap::new();

        for path in files {
            match self.load_source(&path, store) {
                Ok(loaded) => {
                    if let Some(previous) = claimed.insert(loaded.table.to_lowercase(), loaded.file.clone()) {
                        log::warn!(
                            "Table {} from {} replaced the one loaded from {}",
                            loaded.table,
                            loaded.file,
                            previous
                        );
                    }
                    log::debug!("✅ {} → {} ({} rows)", loaded.file, loaded.table, loaded.rows);
                    report.loaded.push(loaded);
                }
                Err(e) => {
                    log::error!("{}", e);
                    report.failed.push(FailedSource {
                        file: path.display().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report.elapsed_secs = started.elapsed().as_secs_f64();

        log::info!("---------------Ingestion Complete---------------");
        log::info!("Total Time Taken: {} minutes", report.elapsed_secs / 60.0);
        if !report.is_clean() {
            log::warn!(
                "⚠️  {} of {} sources skipped",
                report.failed.len(),
                report.failed.len() + report.loaded.len()
            );
        }

        Ok(report)
    }

    /// Open the configured SQLite store and load the whole directory
    pub fn run(&self) -> Result<LoadReport, LoaderError> {
        let mut store = SqliteStore::open(&self.config.db_path)?;
        self.load_directory(&mut store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Value};
    use tempfile::tempdir;

    fn config_for(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            source_dir: dir.to_path_buf(),
            db_path: dir.join("inventory.db"),
            log_dir: dir.join("logs"),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_table_names() {
        assert_eq!(table_name_for("data/vendor_invoice.csv").as_deref(), Some("vendor_invoice"));
        assert_eq!(table_name_for("sales.csv").as_deref(), Some("sales"));
        assert_eq!(
            table_name_for("Purchase prices (2024).csv").as_deref(),
            Some("Purchase_prices_2024_")
        );
        assert_eq!(table_name_for("begin-inventory--final.csv").as_deref(), Some("begin_inventory_final"));
    }

    #[test]
    fn test_load_table_replaces_by_name() {
        let mut store = MemoryStore::new();
        let table = Table::new("ignored", vec!["Brand".into()]).with_rows(vec![vec![Value::Integer(1)]]);

        assert_eq!(load_table(table, "Purchase_prices", &mut store).unwrap(), 1);

        let read = store.read_table("Purchase_prices").unwrap();
        assert_eq!(read.name, "Purchase_prices");
        assert!(!store.table_exists("ignored").unwrap());
    }

    #[test]
    fn test_bad_file_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("sales.csv"), "VendorNo,Brand\n1,10\n").unwrap();
        fs::write(dir.path().join("broken.csv"), "a,b\n1,2\n3\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a source").unwrap();

        let loader = Loader::new(config_for(dir.path()));
        let mut store = MemoryStore::new();
        let report = loader.load_directory(&mut store).unwrap();

        assert_eq!(report.loaded.len(), 1);
        assert_eq!(report.loaded[0].table, "sales");
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].file.ends_with("broken.csv"));
        assert!(report.failed[0].error.contains("Error reading broken.csv"));

        assert!(store.table_exists("sales").unwrap());
        assert!(!store.table_exists("broken").unwrap());
        assert!(!store.table_exists("notes").unwrap());
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let loader = Loader::new(config_for(&dir.path().join("absent")));

        let result = loader.load_directory(&mut MemoryStore::new());
        assert!(matches!(result, Err(LoaderError::SourceDirectory { .. })));
    }

    #[test]
    fn test_files_processed_in_name_order() {
        let dir = tempdir().unwrap();
        for name in ["vendor_invoice.csv", "Purchases.csv", "sales.csv"] {
            fs::write(dir.path().join(name), "x\n1\n").unwrap();
        }

        let loader = Loader::new(config_for(dir.path()));
        let report = loader.load_directory(&mut MemoryStore::new()).unwrap();

        let tables: Vec<&str> = report.loaded.iter().map(|l| l.table.as_str()).collect();
        assert_eq!(tables, vec!["Purchases", "sales", "vendor_invoice"]);
    }
}
