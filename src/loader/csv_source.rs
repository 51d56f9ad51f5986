//! Delimited source file → [`Table`]
//!
//! Column types are inferred per column, not per cell: a column is INTEGER
//! when every non-empty cell parses as `i64`, REAL when every non-empty cell
//! parses as `f64`, TEXT otherwise (cells kept verbatim, untrimmed). Empty
//! cells become `NULL`.

use crate::store::{ColumnType, Table, Value};
use std::io::Read;
use std::path::Path;

/// Read a headered CSV file into a table named `table_name`
pub fn read_source(path: impl AsRef<Path>, table_name: &str) -> Result<Table, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    read_records(reader, table_name)
}

/// Same as [`read_source`], from any reader
pub fn read_source_from<R: Read>(input: R, table_name: &str) -> Result<Table, csv::Error> {
    let reader = csv::ReaderBuilder::new().has_headers(true).from_reader(input);
    read_records(reader, table_name)
}

fn read_records<R: Read>(mut reader: csv::Reader<R>, table_name: &str) -> Result<Table, csv::Error> {
    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut raw: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        raw.push(record.iter().map(|s| s.to_string()).collect());
    }

    let types: Vec<ColumnType> = (0..columns.len())
        .map(|idx| infer_column(raw.iter().map(|row| row[idx].as_str())))
        .collect();

    let rows = raw
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&types)
                .map(|(cell, ty)| convert_cell(cell, *ty))
                .collect()
        })
        .collect();

    Ok(Table::new(table_name, columns).with_rows(rows))
}

fn infer_column<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut ty = ColumnType::Integer;
    let mut seen = false;

    for cell in cells {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        seen = true;

        if ty == ColumnType::Integer && cell.parse::<i64>().is_ok() {
            continue;
        }
        if cell.parse::<f64>().is_ok() {
            ty = ColumnType::Real;
            continue;
        }
        return ColumnType::Text;
    }

    if seen {
        ty
    } else {
        ColumnType::Text
    }
}

fn convert_cell(cell: String, ty: ColumnType) -> Value {
    if cell.trim().is_empty() {
        return Value::Null;
    }
    // Parses cannot fail here: the column type was inferred from these cells
    match ty {
        ColumnType::Integer => cell.trim().parse().map(Value::Integer).unwrap_or(Value::Text(cell)),
        ColumnType::Real => cell.trim().parse().map(Value::Real).unwrap_or(Value::Text(cell)),
        ColumnType::Text => Value::Text(cell),
    }
}
