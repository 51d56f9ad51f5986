//! Ingest Binary - source directory → SQLite tables
//!
//! Loads every source file in the data directory as its own table, replacing
//! any previous table of the same name.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin ingest
//! ```
//!
//! ## Environment Variables
//!
//! - VENDOR_DB_PATH - SQLite database path (default: inventory.db)
//! - VENDOR_DATA_DIR - Directory of source files (default: data)
//! - VENDOR_LOG_DIR - Log directory, writes ingestion_db.log (default: logs)
//! - VENDOR_SOURCE_EXT - Source file extension (default: csv)
//! - RUST_LOG - Logging level (optional, default: debug)

use vendorflow::config::{PipelineConfig, LOADER_COMPONENT};
use vendorflow::{logging, Loader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = PipelineConfig::from_env();
    let log_path = logging::init(&config, LOADER_COMPONENT)?;

    log::info!("🚀 Starting ingestion");
    log::info!("   Source dir: {}", config.source_dir.display());
    log::info!("   Database: {}", config.db_path.display());
    log::info!("   Log file: {}", log_path.display());

    let loader = Loader::new(config);
    match loader.run() {
        Ok(report) => {
            if let Ok(json) = serde_json::to_string(&report) {
                log::debug!("Load report: {}", json);
            }
            log::info!(
                "✅ Loaded {} tables, skipped {} sources",
                report.loaded.len(),
                report.failed.len()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("❌ Ingestion aborted: {}", e);
            Err(e.into())
        }
    }
}
