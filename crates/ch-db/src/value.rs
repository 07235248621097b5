//! Typed cell values for parameters and query results.

use duckdb::types::{ToSql, ToSqlOutput, Value, ValueRef};

/// A single SQL value, used both as a bound parameter and as a result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Double(v) => Some(*v),
            SqlValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Text form of any non-null value.
    pub fn to_text(&self) -> Option<String> {
        match self {
            SqlValue::Null => None,
            SqlValue::Bool(b) => Some(b.to_string()),
            SqlValue::Int(v) => Some(v.to_string()),
            SqlValue::Double(v) => Some(v.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
        }
    }

    /// Read column `idx` of a DuckDB row.
    ///
    /// Integer types widen to `Int`, floating types to `Double`. Other types
    /// (decimals, huge integers) are read as a float when possible and
    /// otherwise as `Null`.
    pub(crate) fn from_row(row: &duckdb::Row<'_>, idx: usize) -> Self {
        match row.get_ref(idx) {
            Ok(ValueRef::Null) => SqlValue::Null,
            Ok(ValueRef::Boolean(b)) => SqlValue::Bool(b),
            Ok(ValueRef::TinyInt(v)) => SqlValue::Int(v.into()),
            Ok(ValueRef::SmallInt(v)) => SqlValue::Int(v.into()),
            Ok(ValueRef::Int(v)) => SqlValue::Int(v.into()),
            Ok(ValueRef::BigInt(v)) => SqlValue::Int(v),
            Ok(ValueRef::UTinyInt(v)) => SqlValue::Int(v.into()),
            Ok(ValueRef::USmallInt(v)) => SqlValue::Int(v.into()),
            Ok(ValueRef::UInt(v)) => SqlValue::Int(v.into()),
            Ok(ValueRef::Float(v)) => SqlValue::Double(v.into()),
            Ok(ValueRef::Double(v)) => SqlValue::Double(v),
            Ok(ValueRef::Text(bytes)) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            _ => row
                .get::<_, Option<f64>>(idx)
                .ok()
                .flatten()
                .map_or(SqlValue::Null, SqlValue::Double),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Double(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        let value = match self {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Boolean(*b),
            SqlValue::Int(v) => Value::BigInt(*v),
            SqlValue::Double(v) => Value::Double(*v),
            SqlValue::Text(s) => Value::Text(s.clone()),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

/// Materialized result of a query: column names plus rows of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl QueryRows {
    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row, if any.
    pub fn first(&self) -> Option<&[SqlValue]> {
        self.rows.first().map(Vec::as_slice)
    }
}
