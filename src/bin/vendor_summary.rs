//! Vendor Summary Binary - base tables → vendor_sales_summary
//!
//! Reads Purchases, Purchase_prices, sales and vendor_invoice from the store,
//! builds the per-vendor/per-brand summary with profitability metrics and
//! replaces the `vendor_sales_summary` table.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin vendor_summary
//! ```
//!
//! ## Environment Variables
//!
//! - VENDOR_DB_PATH - SQLite database path (default: inventory.db)
//! - VENDOR_LOG_DIR - Log directory, writes get_vendor_summary.log (default: logs)
//! - RUST_LOG - Logging level (optional, default: debug)

use vendorflow::config::{PipelineConfig, SUMMARIZER_COMPONENT};
use vendorflow::{logging, Summarizer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = PipelineConfig::from_env();
    logging::init(&config, SUMMARIZER_COMPONENT)?;

    log::info!("🚀 Starting vendor summary ({})", config.db_path.display());

    let summarizer = Summarizer::new(config);
    if let Err(e) = summarizer.run() {
        log::error!("❌ Vendor summary failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}
