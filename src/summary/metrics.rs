//! Metric enrichment - the cleaning stage after the merge
//!
//! Steps run in a fixed order: Volume coercion, zero-fill, whitespace trim,
//! then the four derived columns. Divisions are plain IEEE-754: a zero
//! denominator yields NaN or ±inf, never an error.

use super::aggregate::SummaryRow;
use super::output::VendorSalesSummary;
use super::SummaryError;
use crate::store::Value;

/// Profitability columns appended to every summary row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    pub gross_profit: f64,
    pub profit_margin: f64,
    pub stock_turnover: f64,
    pub sales_to_purchase_ratio: f64,
}

impl DerivedMetrics {
    pub fn compute(
        total_sales_dollars: f64,
        total_purchase_dollars: f64,
        total_sales_quantity: f64,
        total_purchase_quantity: f64,
    ) -> Self {
        let gross_profit = total_sales_dollars - total_purchase_dollars;

        Self {
            gross_profit,
            profit_margin: (gross_profit / total_sales_dollars) * 100.0,
            stock_turnover: total_sales_quantity / total_purchase_quantity,
            sales_to_purchase_ratio: total_sales_dollars / total_purchase_dollars,
        }
    }
}

/// Coerce every Volume cell to f64; `None` stays absent until zero-fill
pub fn coerce_volume(rows: &[SummaryRow]) -> Result<Vec<Option<f64>>, SummaryError> {
    rows.iter()
        .enumerate()
        .map(|(row, r)| {
            r.volume.parse_f64().map_err(|_| SummaryError::TypeCoercion {
                column: "Volume".to_string(),
                value: r.volume.to_string(),
                row,
                brand: r.brand.to_string(),
            })
        })
        .collect()
}

fn fill_key(value: Value) -> Value {
    if value.is_null() {
        Value::Integer(0)
    } else {
        value
    }
}

fn fill_text(value: &Value) -> String {
    value.as_text().map(|s| s.trim().to_string()).unwrap_or_default()
}

/// NaN counts as missing, like a dataframe `fillna`
fn fill_number(value: Option<f64>) -> f64 {
    value.filter(|v| !v.is_nan()).unwrap_or(0.0)
}

/// Turn merged rows into analysis-ready rows, preserving order
pub fn enrich(rows: Vec<SummaryRow>) -> Result<Vec<VendorSalesSummary>, SummaryError> {
    let volumes = coerce_volume(&rows)?;

    let enriched = rows
        .into_iter()
        .zip(volumes)
        .map(|(row, volume)| {
            let total_purchase_quantity = fill_number(row.total_purchase_quantity);
            let total_purchase_dollars = fill_number(row.total_purchase_dollars);
            let total_sales_quantity = fill_number(row.total_sales_quantity);
            let total_sales_dollars = fill_number(row.total_sales_dollars);

            let metrics = DerivedMetrics::compute(
                total_sales_dollars,
                total_purchase_dollars,
                total_sales_quantity,
                total_purchase_quantity,
            );

            VendorSalesSummary {
                vendor_name: fill_text(&row.vendor_name),
                description: fill_text(&row.description),
                vendor_number: fill_key(row.vendor_number),
                brand: fill_key(row.brand),
                volume: fill_number(volume),
                purchase_price: fill_number(row.purchase_price.as_number()),
                actual_price: fill_number(row.actual_price.as_number()),
                total_purchase_quantity,
                total_purchase_dollars,
                total_sales_quantity,
                total_sales_price: fill_number(row.total_sales_price),
                total_sales_dollars,
                total_excise_tax: fill_number(row.total_excise_tax),
                freight_cost: fill_number(row.freight_cost),
                gross_profit: metrics.gross_profit,
                profit_margin: metrics.profit_margin,
                stock_turnover: metrics.stock_turnover,
                sales_to_purchase_ratio: metrics.sales_to_purchase_ratio,
            }
        })
        .collect();

    Ok(enriched)
}
