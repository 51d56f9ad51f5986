//! In-memory table representation shared by the Loader and the Summarizer

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::Serialize;
use std::fmt;

/// A single cell, mirroring SQLite storage classes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Hashable key used for grouping and joining
///
/// Integral reals collapse onto `Int` so `105` and `105.0` group together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Null,
    Int(i64),
    Real(u64),
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric reading with SQLite `SUM` semantics
    ///
    /// `Null` is absent; text that does not parse as a number reads as 0.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            Value::Text(s) => Some(numeric_text(s).unwrap_or(0.0)),
        }
    }

    /// Strict numeric parse: `Ok(None)` for `Null`, `Err` for non-numeric text
    pub fn parse_f64(&self) -> Result<Option<f64>, std::num::ParseFloatError> {
        match self {
            Value::Null => Ok(None),
            Value::Integer(i) => Ok(Some(*i as f64)),
            Value::Real(r) => Ok(Some(*r)),
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed.parse::<f64>().map(Some)
            }
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn group_key(&self) -> GroupKey {
        match self {
            Value::Null => GroupKey::Null,
            Value::Integer(i) => GroupKey::Int(*i),
            Value::Real(r) => {
                if r.fract() == 0.0 && r.abs() < i64::MAX as f64 {
                    GroupKey::Int(*r as i64)
                } else {
                    GroupKey::Real(r.to_bits())
                }
            }
            Value::Text(s) => GroupKey::Text(s.clone()),
        }
    }

    /// Key for join equality; `Null` never joins (SQL `NULL = NULL` is not true)
    ///
    /// Text that reads as a number joins as that number, the way SQLite applies
    /// numeric affinity when a TEXT column meets an INTEGER one: `'58' = 58`.
    pub fn join_key(&self) -> Option<GroupKey> {
        match self {
            Value::Null => None,
            Value::Text(s) => Some(match s.trim().parse::<i64>() {
                Ok(i) => GroupKey::Int(i),
                Err(_) => match numeric_text(s) {
                    Some(r) => Value::Real(r).group_key(),
                    None => GroupKey::Text(s.clone()),
                },
            }),
            other => Some(other.group_key()),
        }
    }
}

/// Finite number written as text; "nan", "inf" and friends are not numbers to SQLite
fn numeric_text(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(r) => ToSqlOutput::from(*r),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
        })
    }
}

/// Declared SQLite column type, picked from the values a column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// Named table: ordered columns plus rows of equal arity
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, ASCII case-insensitive like SQLite identifiers
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }

    /// Same rows under another name
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declared type for a column: INTEGER if every non-null cell is an integer,
    /// REAL if every non-null cell is numeric, TEXT otherwise
    pub fn column_type(&self, index: usize) -> ColumnType {
        let mut ty: Option<ColumnType> = None;

        for cell in self.rows.iter().filter_map(|row| row.get(index)) {
            let cell_ty = match cell {
                Value::Null => continue,
                Value::Integer(_) => ColumnType::Integer,
                Value::Real(_) => ColumnType::Real,
                Value::Text(_) => return ColumnType::Text,
            };
            ty = Some(match (ty, cell_ty) {
                (None, t) => t,
                (Some(ColumnType::Integer), ColumnType::Integer) => ColumnType::Integer,
                _ => ColumnType::Real,
            });
        }

        ty.unwrap_or(ColumnType::Text)
    }
}
