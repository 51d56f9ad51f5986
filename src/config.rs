//! Pipeline configuration from environment variables
//!
//! Both components take a `PipelineConfig` at construction; nothing reads the
//! environment after startup.

use std::env;
use std::path::PathBuf;

/// Log file stem for the Loader component
pub const LOADER_COMPONENT: &str = "ingestion_db";

/// Log file stem for the Summarizer component
pub const SUMMARIZER_COMPONENT: &str = "get_vendor_summary";

/// Configuration shared by the Loader and the Summarizer
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Path to SQLite database file
    pub db_path: PathBuf,

    /// Directory holding the delimited source files
    pub source_dir: PathBuf,

    /// Directory receiving one append-only log file per component
    pub log_dir: PathBuf,

    /// File extension (without dot) of source files to ingest
    pub source_extension: String,

    /// Log filter, `env_logger` syntax
    pub rust_log: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("inventory.db"),
            source_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
            source_extension: "csv".to_string(),
            rust_log: "debug".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `VENDOR_DB_PATH` (default: inventory.db)
    /// - `VENDOR_DATA_DIR` (default: data)
    /// - `VENDOR_LOG_DIR` (default: logs)
    /// - `VENDOR_SOURCE_EXT` (default: csv)
    /// - `RUST_LOG` (default: debug)
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            db_path: non_empty("VENDOR_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            source_dir: non_empty("VENDOR_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.source_dir),

            log_dir: non_empty("VENDOR_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),

            source_extension: non_empty("VENDOR_SOURCE_EXT")
                .map(|ext| ext.trim().trim_start_matches('.').to_string())
                .unwrap_or(defaults.source_extension),

            rust_log: non_empty("RUST_LOG").unwrap_or(defaults.rust_log),
        }
    }

    /// Path of the append-only log file for a component
    pub fn log_file(&self, component: &str) -> PathBuf {
        self.log_dir.join(format!("{}.log", component))
    }
}
