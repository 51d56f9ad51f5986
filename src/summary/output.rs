//! Analysis-ready summary rows and their table layout

use super::VENDOR_SALES_SUMMARY_TABLE;
use crate::store::{Table, Value};
use serde::Serialize;

/// Column order of `vendor_sales_summary`
pub const OUTPUT_COLUMNS: [&str; 18] = [
    "VendorNumber",
    "VendorName",
    "Brand",
    "Description",
    "Volume",
    "PurchasePrice",
    "ActualPrice",
    "TotalPurchaseQuantity",
    "TotalPurchaseDollars",
    "TotalSalesQuantity",
    "TotalSalesPrice",
    "TotalSalesDollars",
    "TotalExciseTax",
    "FreightCost",
    "GrossProfit",
    "ProfitMargin",
    "StockTurnover",
    "SalestoPurchaseRatio",
];

/// One row of `vendor_sales_summary`
///
/// Every numeric column is filled; ratio columns may hold NaN or ±inf when a
/// denominator is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VendorSalesSummary {
    pub vendor_number: Value,
    pub vendor_name: String,
    pub brand: Value,
    pub description: String,
    pub volume: f64,
    pub purchase_price: f64,
    pub actual_price: f64,
    pub total_purchase_quantity: f64,
    pub total_purchase_dollars: f64,
    pub total_sales_quantity: f64,
    pub total_sales_price: f64,
    pub total_sales_dollars: f64,
    pub total_excise_tax: f64,
    pub freight_cost: f64,
    pub gross_profit: f64,
    pub profit_margin: f64,
    pub stock_turnover: f64,
    #[serde(rename = "SalestoPurchaseRatio")]
    pub sales_to_purchase_ratio: f64,
}

impl VendorSalesSummary {
    /// Cells in [`OUTPUT_COLUMNS`] order
    pub fn to_row(&self) -> Vec<Value> {
        vec![
            self.vendor_number.clone(),
            Value::text(self.vendor_name.as_str()),
            self.brand.clone(),
            Value::text(self.description.as_str()),
            Value::Real(self.volume),
            Value::Real(self.purchase_price),
            Value::Real(self.actual_price),
            Value::Real(self.total_purchase_quantity),
            Value::Real(self.total_purchase_dollars),
            Value::Real(self.total_sales_quantity),
            Value::Real(self.total_sales_price),
            Value::Real(self.total_sales_dollars),
            Value::Real(self.total_excise_tax),
            Value::Real(self.freight_cost),
            Value::Real(self.gross_profit),
            Value::Real(self.profit_margin),
            Value::Real(self.stock_turnover),
            Value::Real(self.sales_to_purchase_ratio),
        ]
    }
}

/// Build the `vendor_sales_summary` table, preserving row order
pub fn to_table(rows: &[VendorSalesSummary]) -> Table {
    Table::new(
        VENDOR_SALES_SUMMARY_TABLE,
        OUTPUT_COLUMNS.iter().map(|c| c.to_string()).collect(),
    )
    .with_rows(rows.iter().map(VendorSalesSummary::to_row).collect())
}
