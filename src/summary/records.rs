//! Typed views over the four base tables
//!
//! Cells stay as [`Value`] so the aggregations see exactly what the store holds;
//! numeric interpretation happens at aggregation time.

use super::{SummaryError, PURCHASES_TABLE, PURCHASE_PRICES_TABLE, SALES_TABLE, VENDOR_INVOICE_TABLE};
use crate::store::{StoreError, Table, TableStore, Value};

/// One Purchases line item
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRecord {
    pub vendor_number: Value,
    pub vendor_name: Value,
    pub brand: Value,
    pub purchase_price: Value,
    pub quantity: Value,
    pub dollars: Value,
}

/// One Purchase_prices row (one per Brand)
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub brand: Value,
    pub description: Value,
    pub volume: Value,
    pub price: Value,
}

/// One sales line item
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    pub vendor_no: Value,
    pub brand: Value,
    pub sales_dollars: Value,
    pub sales_price: Value,
    pub sales_quantity: Value,
    pub excise_tax: Value,
}

/// One vendor_invoice row
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecord {
    pub vendor_number: Value,
    pub freight: Value,
}

/// Resolve `columns` in `table`, failing on the first one that is missing
fn project(table: &Table, columns: &[&str]) -> Result<Vec<usize>, SummaryError> {
    columns
        .iter()
        .map(|col| {
            table.column_index(col).ok_or_else(|| SummaryError::MissingColumn {
                table: table.name.clone(),
                column: col.to_string(),
            })
        })
        .collect()
}

/// Rows of `table` restricted to `columns`, in that order
fn projected_rows<'a>(
    table: &'a Table,
    columns: &[&str],
) -> Result<impl Iterator<Item = Vec<Value>> + 'a, SummaryError> {
    let idx = project(table, columns)?;
    Ok(table
        .rows
        .iter()
        .map(move |row| idx.iter().map(|&i| row[i].clone()).collect()))
}

impl PurchaseRecord {
    pub const COLUMNS: [&'static str; 6] = [
        "VendorNumber",
        "VendorName",
        "Brand",
        "PurchasePrice",
        "Quantity",
        "Dollars",
    ];

    pub fn from_table(table: &Table) -> Result<Vec<Self>, SummaryError> {
        Ok(projected_rows(table, &Self::COLUMNS)?
            .map(|mut c| {
                let mut take = |i: usize| std::mem::replace(&mut c[i], Value::Null);
                Self {
                    vendor_number: take(0),
                    vendor_name: take(1),
                    brand: take(2),
                    purchase_price: take(3),
                    quantity: take(4),
                    dollars: take(5),
                }
            })
            .collect())
    }
}

impl PriceRecord {
    pub const COLUMNS: [&'static str; 4] = ["Brand", "Description", "Volume", "Price"];

    pub fn from_table(table: &Table) -> Result<Vec<Self>, SummaryError> {
        Ok(projected_rows(table, &Self::COLUMNS)?
            .map(|mut c| {
                let mut take = |i: usize| std::mem::replace(&mut c[i], Value::Null);
                Self {
                    brand: take(0),
                    description: take(1),
                    volume: take(2),
                    price: take(3),
                }
            })
            .collect())
    }
}

impl SaleRecord {
    pub const COLUMNS: [&'static str; 6] = [
        "VendorNo",
        "Brand",
        "SalesDollars",
        "SalesPrice",
        "SalesQuantity",
        "ExciseTax",
    ];

    pub fn from_table(table: &Table) -> Result<Vec<Self>, SummaryError> {
        Ok(projected_rows(table, &Self::COLUMNS)?
            .map(|mut c| {
                let mut take = |i: usize| std::mem::replace(&mut c[i], Value::Null);
                Self {
                    vendor_no: take(0),
                    brand: take(1),
                    sales_dollars: take(2),
                    sales_price: take(3),
                    sales_quantity: take(4),
                    excise_tax: take(5),
                }
            })
            .collect())
    }
}

impl InvoiceRecord {
    pub const COLUMNS: [&'static str; 2] = ["VendorNumber", "Freight"];

    pub fn from_table(table: &Table) -> Result<Vec<Self>, SummaryError> {
        Ok(projected_rows(table, &Self::COLUMNS)?
            .map(|mut c| {
                let mut take = |i: usize| std::mem::replace(&mut c[i], Value::Null);
                Self {
                    vendor_number: take(0),
                    freight: take(1),
                }
            })
            .collect())
    }
}

/// The four base tables the summary is derived from
#[derive(Debug, Clone, Default)]
pub struct InputTables {
    pub invoices: Vec<InvoiceRecord>,
    pub purchases: Vec<PurchaseRecord>,
    pub prices: Vec<PriceRecord>,
    pub sales: Vec<SaleRecord>,
}

fn fetch<S: TableStore + ?Sized>(store: &S, name: &str) -> Result<Table, SummaryError> {
    store.read_table(name).map_err(|e| match e {
        StoreError::TableNotFound(_) => SummaryError::DataUnavailable {
            table: name.to_string(),
        },
        other => SummaryError::Store(other),
    })
}

impl InputTables {
    /// Read all four base tables; any absent table aborts with `DataUnavailable`
    pub fn fetch<S: TableStore + ?Sized>(store: &S) -> Result<Self, SummaryError> {
        let invoices = InvoiceRecord::from_table(&fetch(store, VENDOR_INVOICE_TABLE)?)?;
        let purchases = PurchaseRecord::from_table(&fetch(store, PURCHASES_TABLE)?)?;
        let prices = PriceRecord::from_table(&fetch(store, PURCHASE_PRICES_TABLE)?)?;
        let sales = SaleRecord::from_table(&fetch(store, SALES_TABLE)?)?;

        log::debug!(
            "📥 Base tables: {} invoices, {} purchases, {} prices, {} sales",
            invoices.len(),
            purchases.len(),
            prices.len(),
            sales.len()
        );

        Ok(Self {
            invoices,
            purchases,
            prices,
            sales,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_projection_ignores_extra_columns_and_case() {
        let table = Table::new(
            VENDOR_INVOICE_TABLE,
            vec!["PONumber".into(), "freight".into(), "VENDORNUMBER".into()],
        )
        .with_rows(vec![vec![Value::Integer(8124), Value::Real(3.47), Value::Integer(105)]]);

        let invoices = InvoiceRecord::from_table(&table).unwrap();
        assert_eq!(
            invoices,
            vec![InvoiceRecord {
                vendor_number: Value::Integer(105),
                freight: Value::Real(3.47),
            }]
        );
    }

    #[test]
    fn test_missing_column() {
        let table = Table::new(SALES_TABLE, vec!["VendorNo".into(), "Brand".into()]);

        match SaleRecord::from_table(&table) {
            Err(SummaryError::MissingColumn { table, column }) => {
                assert_eq!(table, "sales");
                assert_eq!(column, "SalesDollars");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_table_is_data_unavailable() {
        let store = MemoryStore::new().with_table(Table::new(
            VENDOR_INVOICE_TABLE,
            InvoiceRecord::COLUMNS.iter().map(|c| c.to_string()).collect(),
        ));

        match InputTables::fetch(&store) {
            Err(SummaryError::DataUnavailable { table }) => assert_eq!(table, "Purchases"),
            other => panic!("expected DataUnavailable, got {:?}", other),
        }
    }
}
