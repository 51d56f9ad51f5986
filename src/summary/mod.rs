//! Summarizer - base tables → `vendor_sales_summary`
//!
//! # Architecture
//!
//! ```text
//! TableStore → InputTables (typed records)
//!     ↓
//! freight_summary / purchase_summary / sale_summary
//!     ↓
//! merge (left outer joins, TotalPurchaseDollars DESC)
//!     ↓
//! enrich (Volume → f64, zero-fill, trim, derived metrics)
//!     ↓
//! TableStore::replace_table("vendor_sales_summary")
//! ```
//!
//! The run is all-or-nothing: any error aborts before the output table is
//! touched.

pub mod aggregate;
pub mod metrics;
pub mod output;
pub mod records;

pub use aggregate::{
    build_summary, freight_summary, merge, purchase_summary, sale_summary, FreightSummary,
    PurchaseSummary, SaleSummary, SummaryRow,
};
pub use metrics::{enrich, DerivedMetrics};
pub use output::{to_table, VendorSalesSummary, OUTPUT_COLUMNS};
pub use records::InputTables;

use crate::config::PipelineConfig;
use crate::store::{SqliteStore, StoreError, TableStore};
use serde::Serialize;

pub const PURCHASES_TABLE: &str = "Purchases";
pub const PURCHASE_PRICES_TABLE: &str = "Purchase_prices";
pub const SALES_TABLE: &str = "sales";
pub const VENDOR_INVOICE_TABLE: &str = "vendor_invoice";
pub const VENDOR_SALES_SUMMARY_TABLE: &str = "vendor_sales_summary";

/// Rows shown in progress logs
const LOG_HEAD_ROWS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Required table {table} is not available")]
    DataUnavailable { table: String },

    #[error("Table {table} has no column {column}")]
    MissingColumn { table: String, column: String },

    #[error("Cannot convert {column} value {value:?} to float (row {row}, brand {brand})")]
    TypeCoercion {
        column: String,
        value: String,
        row: usize,
        brand: String,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Log the first rows of a stage as JSON lines
fn log_head<T: Serialize>(stage: &str, rows: &[T]) {
    log::info!("{}: {} rows", stage, rows.len());
    for row in rows.iter().take(LOG_HEAD_ROWS) {
        match serde_json::to_string(row) {
            Ok(json) => log::info!("   {}", json),
            Err(e) => log::warn!("   <unprintable row: {}>", e),
        }
    }
}

pub struct Summarizer {
    config: PipelineConfig,
}

impl Summarizer {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Aggregate and merge the base tables in `store`
    pub fn build_summary<S: TableStore + ?Sized>(&self, store: &S) -> Result<Vec<SummaryRow>, SummaryError> {
        build_summary(store)
    }

    /// Build, enrich and write `vendor_sales_summary` into `store`
    pub fn summarize<S: TableStore + ?Sized>(
        &self,
        store: &mut S,
    ) -> Result<Vec<VendorSalesSummary>, SummaryError> {
        log::info!("Creating vendor summary table.......");
        let merged = self.build_summary(&*store)?;
        log_head("Vendor summary", &merged);

        log::info!("Cleaning Data.......");
        let cleaned = enrich(merged)?;
        log_head("Cleaned summary", &cleaned);

        log::info!("Ingesting data........");
        store.replace_table(&to_table(&cleaned))?;

        log::info!(
            "✅ Completed: {} rows written to {} ({} backend)",
            cleaned.len(),
            VENDOR_SALES_SUMMARY_TABLE,
            store.backend_type()
        );

        Ok(cleaned)
    }

    /// Open the configured SQLite store and run the whole stage
    pub fn run(&self) -> Result<Vec<VendorSalesSummary>, SummaryError> {
        let mut store = SqliteStore::open(&self.config.db_path)?;
        self.summarize(&mut store)
    }
}
