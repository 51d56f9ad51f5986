//! Aggregation/join engine
//!
//! Three independent aggregations over the base tables, merged by an explicit
//! outer join:
//!
//! ```text
//! vendor_invoice ──► freight_summary   (VendorNumber)              ─┐
//! Purchases ⋈ Purchase_prices ──► purchase_summary                  ├─► merge ──► Vec<SummaryRow>
//!                     (VendorNumber, VendorName, Brand)             │
//! sales ──► sale_summary (VendorNo, Brand)                         ─┘
//! ```
//!
//! SQL semantics are kept where they matter to the numbers: `SUM` skips NULLs
//! and is NULL for an all-NULL group, NULL keys form their own group but never
//! join, and ordering puts NULLs first ascending / last descending.

use super::records::{InputTables, InvoiceRecord, PriceRecord, PurchaseRecord, SaleRecord};
use super::SummaryError;
use crate::store::{GroupKey, TableStore, Value};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Per-vendor freight total
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FreightSummary {
    pub vendor_number: Value,
    pub freight_cost: Option<f64>,
}

/// Per (VendorNumber, VendorName, Brand) purchase totals
///
/// `purchase_price`, `description`, `volume` and `actual_price` come from the
/// first joined row of the group in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PurchaseSummary {
    pub vendor_number: Value,
    pub vendor_name: Value,
    pub brand: Value,
    pub purchase_price: Value,
    pub description: Value,
    pub volume: Value,
    pub actual_price: Value,
    pub total_purchase_quantity: Option<f64>,
    pub total_purchase_dollars: Option<f64>,
}

/// Per (VendorNo, Brand) sales totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SaleSummary {
    pub vendor_no: Value,
    pub brand: Value,
    pub total_sales_dollars: Option<f64>,
    pub total_sales_price: Option<f64>,
    pub total_sales_quantity: Option<f64>,
    pub total_excise_tax: Option<f64>,
}

/// Merged row before cleaning: sale and freight columns are `None` when the
/// outer join found no match
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SummaryRow {
    pub vendor_number: Value,
    pub vendor_name: Value,
    pub brand: Value,
    pub description: Value,
    pub volume: Value,
    pub purchase_price: Value,
    pub actual_price: Value,
    pub total_purchase_quantity: Option<f64>,
    pub total_purchase_dollars: Option<f64>,
    pub total_sales_quantity: Option<f64>,
    pub total_sales_price: Option<f64>,
    pub total_sales_dollars: Option<f64>,
    pub total_excise_tax: Option<f64>,
    pub freight_cost: Option<f64>,
}

/// SQL `SUM` step: NULL inputs are skipped
fn accumulate(acc: &mut Option<f64>, value: &Value) {
    if let Some(x) = value.as_number() {
        *acc = Some(acc.unwrap_or(0.0) + x);
    }
}

/// Ascending order with NULLs first
///
/// `+ 0.0` folds -0.0 onto 0.0 so the two compare equal, as they do in SQL.
fn cmp_nulls_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => (x + 0.0).total_cmp(&(y + 0.0)),
    }
}

/// Group `vendor_invoice` by VendorNumber, summing Freight
pub fn freight_summary(invoices: &[InvoiceRecord]) -> Vec<FreightSummary> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<FreightSummary> = Vec::new();

    for invoice in invoices {
        let slot = *index
            .entry(invoice.vendor_number.group_key())
            .or_insert_with(|| {
                groups.push(FreightSummary {
                    vendor_number: invoice.vendor_number.clone(),
                    freight_cost: None,
                });
                groups.len() - 1
            });
        accumulate(&mut groups[slot].freight_cost, &invoice.freight);
    }

    groups
}

/// Priced purchases joined to Purchase_prices, grouped by (VendorNumber, VendorName, Brand)
///
/// Rows with PurchasePrice ≤ 0 (or NULL) are dropped before the join; a
/// purchase whose Brand has no Purchase_prices row is dropped by the inner join.
/// Ordered by TotalPurchaseDollars ascending, ties in first-seen order.
pub fn purchase_summary(purchases: &[PurchaseRecord], prices: &[PriceRecord]) -> Vec<PurchaseSummary> {
    let mut price_index: HashMap<GroupKey, Vec<&PriceRecord>> = HashMap::new();
    for price in prices {
        if let Some(key) = price.brand.join_key() {
            price_index.entry(key).or_default().push(price);
        }
    }

    let mut index: HashMap<(GroupKey, GroupKey, GroupKey), usize> = HashMap::new();
    let mut groups: Vec<PurchaseSummary> = Vec::new();

    for purchase in purchases {
        let priced = purchase.purchase_price.as_number().is_some_and(|p| p > 0.0);
        if !priced {
            continue;
        }

        let Some(matches) = purchase.brand.join_key().and_then(|k| price_index.get(&k)) else {
            continue;
        };

        let key = (
            purchase.vendor_number.group_key(),
            purchase.vendor_name.group_key(),
            purchase.brand.group_key(),
        );

        // Inner join: one joined row per matching price row
        for price in matches {
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                groups.push(PurchaseSummary {
                    vendor_number: purchase.vendor_number.clone(),
                    vendor_name: purchase.vendor_name.clone(),
                    brand: purchase.brand.clone(),
                    purchase_price: purchase.purchase_price.clone(),
                    description: price.description.clone(),
                    volume: price.volume.clone(),
                    actual_price: price.price.clone(),
                    total_purchase_quantity: None,
                    total_purchase_dollars: None,
                });
                groups.len() - 1
            });

            let group = &mut groups[slot];
            accumulate(&mut group.total_purchase_quantity, &purchase.quantity);
            accumulate(&mut group.total_purchase_dollars, &purchase.dollars);
        }
    }

    groups.sort_by(|a, b| cmp_nulls_first(a.total_purchase_dollars, b.total_purchase_dollars));
    groups
}

/// Group `sales` by (VendorNo, Brand), ordered by TotalSalesDollars ascending
pub fn sale_summary(sales: &[SaleRecord]) -> Vec<SaleSummary> {
    let mut index: HashMap<(GroupKey, GroupKey), usize> = HashMap::new();
    let mut groups: Vec<SaleSummary> = Vec::new();

    for sale in sales {
        let key = (sale.vendor_no.group_key(), sale.brand.group_key());
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(SaleSummary {
                vendor_no: sale.vendor_no.clone(),
                brand: sale.brand.clone(),
                total_sales_dollars: None,
                total_sales_price: None,
                total_sales_quantity: None,
                total_excise_tax: None,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        accumulate(&mut group.total_sales_dollars, &sale.sales_dollars);
        accumulate(&mut group.total_sales_price, &sale.sales_price);
        accumulate(&mut group.total_sales_quantity, &sale.sales_quantity);
        accumulate(&mut group.total_excise_tax, &sale.excise_tax);
    }

    groups.sort_by(|a, b| cmp_nulls_first(a.total_sales_dollars, b.total_sales_dollars));
    groups
}

/// Left-outer-join sales on (VendorNumber = VendorNo, Brand) and freight on
/// VendorNumber, driven by the purchase summary
///
/// Result ordered by TotalPurchaseDollars descending, NULLs last, ties stable.
pub fn merge(
    purchases: Vec<PurchaseSummary>,
    sales: &[SaleSummary],
    freight: &[FreightSummary],
) -> Vec<SummaryRow> {
    let sales_by_key: HashMap<(GroupKey, GroupKey), &SaleSummary> = sales
        .iter()
        .filter_map(|s| Some(((s.vendor_no.join_key()?, s.brand.join_key()?), s)))
        .collect();

    let freight_by_vendor: HashMap<GroupKey, &FreightSummary> = freight
        .iter()
        .filter_map(|f| Some((f.vendor_number.join_key()?, f)))
        .collect();

    let mut rows: Vec<SummaryRow> = purchases
        .into_iter()
        .map(|ps| {
            let sale = ps
                .vendor_number
                .join_key()
                .zip(ps.brand.join_key())
                .and_then(|key| sales_by_key.get(&key).copied());
            let fs = ps
                .vendor_number
                .join_key()
                .and_then(|key| freight_by_vendor.get(&key).copied());

            SummaryRow {
                vendor_number: ps.vendor_number,
                vendor_name: ps.vendor_name,
                brand: ps.brand,
                description: ps.description,
                volume: ps.volume,
                purchase_price: ps.purchase_price,
                actual_price: ps.actual_price,
                total_purchase_quantity: ps.total_purchase_quantity,
                total_purchase_dollars: ps.total_purchase_dollars,
                total_sales_quantity: sale.and_then(|s| s.total_sales_quantity),
                total_sales_price: sale.and_then(|s| s.total_sales_price),
                total_sales_dollars: sale.and_then(|s| s.total_sales_dollars),
                total_excise_tax: sale.and_then(|s| s.total_excise_tax),
                freight_cost: fs.and_then(|f| f.freight_cost),
            }
        })
        .collect();

    rows.sort_by(|a, b| cmp_nulls_first(b.total_purchase_dollars, a.total_purchase_dollars));
    rows
}

/// Read the base tables from `store` and produce the merged summary rows
pub fn build_summary<S: TableStore + ?Sized>(store: &S) -> Result<Vec<SummaryRow>, SummaryError> {
    let inputs = InputTables::fetch(store)?;

    let freight = freight_summary(&inputs.invoices);
    let purchases = purchase_summary(&inputs.purchases, &inputs.prices);
    let sales = sale_summary(&inputs.sales);

    log::info!(
        "📊 Aggregated {} freight vendors, {} purchase groups, {} sale groups",
        freight.len(),
        purchases.len(),
        sales.len()
    );

    Ok(merge(purchases, &sales, &freight))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(vendor: i64, name: &str, brand: i64, price: f64, qty: i64, dollars: f64) -> PurchaseRecord {
        PurchaseRecord {
            vendor_number: Value::Integer(vendor),
            vendor_name: Value::text(name),
            brand: Value::Integer(brand),
            purchase_price: Value::Real(price),
            quantity: Value::Integer(qty),
            dollars: Value::Real(dollars),
        }
    }

    fn price(brand: i64, description: &str, volume: &str, price: f64) -> PriceRecord {
        PriceRecord {
            brand: Value::Integer(brand),
            description: Value::text(description),
            volume: Value::text(volume),
            price: Value::Real(price),
        }
    }

    fn sale(vendor: i64, brand: i64, dollars: f64, quantity: i64) -> SaleRecord {
        SaleRecord {
            vendor_no: Value::Integer(vendor),
            brand: Value::Integer(brand),
            sales_dollars: Value::Real(dollars),
            sales_price: Value::Real(1.0),
            sales_quantity: Value::Integer(quantity),
            excise_tax: Value::Real(0.5),
        }
    }

    fn invoice(vendor: i64, freight: f64) -> InvoiceRecord {
        InvoiceRecord {
            vendor_number: Value::Integer(vendor),
            freight: Value::Real(freight),
        }
    }

    #[test]
    fn test_freight_summary_groups_by_vendor() {
        let freight = freight_summary(&[invoice(1, 10.0), invoice(2, 1.0), invoice(1, 5.0)]);

        assert_eq!(freight.len(), 2);
        assert_eq!(freight[0].vendor_number, Value::Integer(1));
        assert_eq!(freight[0].freight_cost, Some(15.0));
        assert_eq!(freight[1].freight_cost, Some(1.0));
    }

    #[test]
    fn test_freight_all_null_sums_to_null() {
        let freight = freight_summary(&[InvoiceRecord {
            vendor_number: Value::Integer(7),
            freight: Value::Null,
        }]);
        assert_eq!(freight[0].freight_cost, None);
    }

    #[test]
    fn test_purchase_summary_filters_unpriced_rows() {
        let purchases = [
            purchase(1, "A", 10, 2.0, 100, 200.0),
            purchase(1, "A", 10, 0.0, 999, 999.0),
            purchase(1, "A", 10, -1.0, 999, 999.0),
            purchase(1, "A", 10, 2.0, 50, 100.0),
        ];
        let summary = purchase_summary(&purchases, &[price(10, "Widget", "750", 3.0)]);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].total_purchase_quantity, Some(150.0));
        assert_eq!(summary[0].total_purchase_dollars, Some(300.0));
        assert_eq!(summary[0].actual_price, Value::Real(3.0));
    }

    #[test]
    fn test_purchase_summary_inner_join_drops_unknown_brands() {
        let purchases = [purchase(1, "A", 10, 2.0, 1, 2.0), purchase(1, "A", 11, 2.0, 1, 2.0)];
        let summary = purchase_summary(&purchases, &[price(10, "Widget", "750", 3.0)]);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].brand, Value::Integer(10));
    }

    #[test]
    fn test_purchase_summary_groups_include_vendor_name() {
        let purchases = [
            purchase(1, "ACME", 10, 2.0, 1, 2.0),
            purchase(1, "ACME INC", 10, 2.0, 1, 3.0),
        ];
        let summary = purchase_summary(&purchases, &[price(10, "Widget", "750", 3.0)]);
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn test_purchase_summary_first_row_wins_passthrough() {
        let purchases = [
            purchase(1, "A", 10, 2.0, 1, 2.0),
            purchase(1, "A", 10, 2.5, 1, 2.5),
        ];
        let summary = purchase_summary(&purchases, &[price(10, "Widget", "750", 3.0)]);

        assert_eq!(summary[0].purchase_price, Value::Real(2.0));
    }

    #[test]
    fn test_purchase_summary_ascending_by_dollars() {
        let purchases = [
            purchase(1, "A", 10, 2.0, 1, 500.0),
            purchase(2, "B", 10, 2.0, 1, 50.0),
            purchase(3, "C", 10, 2.0, 1, 5000.0),
        ];
        let summary = purchase_summary(&purchases, &[price(10, "Widget", "750", 3.0)]);

        let dollars: Vec<_> = summary.iter().map(|s| s.total_purchase_dollars).collect();
        assert_eq!(dollars, vec![Some(50.0), Some(500.0), Some(5000.0)]);
    }

    #[test]
    fn test_null_brand_never_joins() {
        let mut p = purchase(1, "A", 10, 2.0, 1, 2.0);
        p.brand = Value::Null;
        let mut pp = price(10, "Widget", "750", 3.0);
        pp.brand = Value::Null;

        assert!(purchase_summary(&[p], &[pp]).is_empty());
    }

    #[test]
    fn test_sale_summary_sums_per_vendor_brand() {
        let sales = sale_summary(&[sale(1, 10, 100.0, 5), sale(1, 10, 200.0, 4), sale(1, 11, 50.0, 1)]);

        assert_eq!(sales.len(), 2);
        // Ascending by TotalSalesDollars
        assert_eq!(sales[0].brand, Value::Integer(11));
        assert_eq!(sales[1].total_sales_dollars, Some(300.0));
        assert_eq!(sales[1].total_sales_quantity, Some(9.0));
        assert_eq!(sales[1].total_excise_tax, Some(1.0));
    }

    #[test]
    fn test_merge_left_joins_and_broadcasts_freight() {
        let purchases = purchase_summary(
            &[
                purchase(1, "A", 10, 2.0, 100, 200.0),
                purchase(1, "A", 11, 2.0, 10, 20.0),
                purchase(2, "B", 10, 2.0, 1, 2000.0),
            ],
            &[price(10, "Widget", "750", 3.0), price(11, "Gadget", "1000", 4.0)],
        );
        let sales = sale_summary(&[sale(1, 10, 300.0, 90)]);
        let freight = freight_summary(&[invoice(1, 10.0), invoice(1, 5.0)]);

        let rows = merge(purchases, &sales, &freight);

        assert_eq!(rows.len(), 3);
        // Descending by TotalPurchaseDollars
        assert_eq!(rows[0].vendor_number, Value::Integer(2));
        assert_eq!(rows[1].brand, Value::Integer(10));
        assert_eq!(rows[2].brand, Value::Integer(11));

        // Vendor 2 has neither sales nor freight
        assert_eq!(rows[0].total_sales_dollars, None);
        assert_eq!(rows[0].freight_cost, None);

        // Freight is per vendor, repeated on every brand
        assert_eq!(rows[1].freight_cost, Some(15.0));
        assert_eq!(rows[2].freight_cost, Some(15.0));

        // Sales matched on (vendor, brand) only
        assert_eq!(rows[1].total_sales_dollars, Some(300.0));
        assert_eq!(rows[2].total_sales_dollars, None);
    }

    #[test]
    fn test_integral_real_vendor_joins_integer_vendor() {
        let purchases = purchase_summary(&[purchase(105, "A", 10, 2.0, 1, 2.0)], &[price(10, "W", "750", 3.0)]);
        let freight = freight_summary(&[InvoiceRecord {
            vendor_number: Value::Real(105.0),
            freight: Value::Real(7.5),
        }]);

        let rows = merge(purchases, &[], &freight);
        assert_eq!(rows[0].freight_cost, Some(7.5));
    }

    #[test]
    fn test_text_keys_join_numeric_keys() {
        // A stray non-numeric Brand turns the whole prices column into text
        let mut priced = price(58, "Widget", "750", 3.0);
        priced.brand = Value::text("58");
        let mut stray = price(0, "Mystery", "750", 1.0);
        stray.brand = Value::text("X1");

        let purchases = purchase_summary(&[purchase(1, "A", 58, 2.0, 100, 200.0)], &[priced, stray]);
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].description, Value::text("Widget"));

        let mut s = sale(1, 58, 300.0, 90);
        s.vendor_no = Value::text("1");
        let sales = sale_summary(&[s]);
        let freight = freight_summary(&[InvoiceRecord {
            vendor_number: Value::text("1.0"),
            freight: Value::Real(15.0),
        }]);

        let rows = merge(purchases, &sales, &freight);
        assert_eq!(rows[0].total_sales_dollars, Some(300.0));
        assert_eq!(rows[0].freight_cost, Some(15.0));
    }

    #[test]
    fn test_null_ordering() {
        assert_eq!(cmp_nulls_first(None, Some(-1.0)), Ordering::Less);
        assert_eq!(cmp_nulls_first(Some(-0.0), Some(0.0)), Ordering::Equal);
        assert_eq!(cmp_nulls_first(Some(2.0), Some(1.0)), Ordering::Greater);
    }
}
