//! Vendorflow - vendor purchase/sales summary pipeline
//!
//! Two batch components share a SQLite store:
//!
//! ```text
//! CSV directory → Loader (one table per file, full replace)
//!     ↓
//! SQLite: Purchases, Purchase_prices, sales, vendor_invoice
//!     ↓
//! Summarizer: freight / purchase / sale aggregations → outer-join merge
//!     ↓
//! Metric enrichment (GrossProfit, ProfitMargin, StockTurnover, SalestoPurchaseRatio)
//!     ↓
//! SQLite: vendor_sales_summary
//! ```

pub mod config;
pub mod loader;
pub mod logging;
pub mod sqlite_pragma;
pub mod store;
pub mod summary;

pub use config::PipelineConfig;
pub use loader::{LoadReport, Loader, LoaderError};
pub use store::{MemoryStore, SqliteStore, StoreError, Table, TableStore, Value};
pub use summary::{Summarizer, SummaryError, VendorSalesSummary};
