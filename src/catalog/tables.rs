use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Represents a SQL table schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnDef>,
}

/// Represents a column definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: SqlType,
    /// Type exactly as declared in the CREATE TABLE statement
    pub declared_type: String,
    pub nullable: bool,
}

impl ColumnDef {
    pub fn new(name: &str, declared_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: SqlType::from_declared(declared_type),
            declared_type: declared_type.to_string(),
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Represents SQL data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SqlType {
    Integer,
    Float,
    Text,
    Boolean,
    Date,
    Timestamp,
}

impl SqlType {
    /// Classify a declared column type by its name, ignoring length and precision arguments.
    /// Unknown names are stored as text.
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.trim().to_ascii_uppercase();
        let base = upper
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or("");

        match base {
            "INT" | "INTEGER" | "BIGINT" | "SMALLINT" | "TINYINT" | "INT8" | "INT16" | "INT32"
            | "INT64" | "UINT8" | "UINT16" | "UINT32" | "UINT64" => SqlType::Integer,
            "FLOAT" | "DOUBLE" | "REAL" | "DECIMAL" | "NUMERIC" | "FLOAT32" | "FLOAT64" => {
                SqlType::Float
            }
            "BOOL" | "BOOLEAN" => SqlType::Boolean,
            "DATE" => SqlType::Date,
            "TIMESTAMP" | "DATETIME" => SqlType::Timestamp,
            _ => SqlType::Text,
        }
    }
}

/// A single stored value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

pub type Row = Vec<Value>;

/// A table: its schema plus the rows currently stored in it
#[derive(Debug, Clone)]
pub struct Table {
    pub id: u64,
    pub name: String,
    pub schema: TableSchema,
    pub created_at: DateTime<Utc>,
    rows: Vec<Row>,
}

impl Table {
    pub(crate) fn new(id: u64, name: &str, columns: Vec<ColumnDef>) -> Self {
        Self {
            id,
            name: name.to_string(),
            schema: TableSchema { columns },
            created_at: Utc::now(),
            rows: Vec::new(),
        }
    }

    /// Get column names in schema order
    pub fn column_names(&self) -> Vec<String> {
        self.schema.columns.iter().map(|col| col.name.clone()).collect()
    }

    /// Position of a column in the schema
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.columns.iter().position(|col| col.name == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn append(&mut self, rows: Vec<Row>) {
        self.rows.extend(rows);
    }

    /// Remove every row, returning how many were removed
    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.rows.len();
        self.rows.clear();
        removed
    }
}

/// Summary of a table as reported by catalog listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInfo {
    pub database: String,
    pub name: String,
    pub table_id: u64,
    pub columns: Vec<ColumnDef>,
    pub row_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Summary of a database as reported by catalog listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub database_id: u64,
    pub table_count: usize,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("varchar", SqlType::Text ; "bare varchar")]
    #[test_case("VARCHAR(255)", SqlType::Text ; "sized varchar")]
    #[test_case("int", SqlType::Integer ; "int")]
    #[test_case("BIGINT UNSIGNED", SqlType::Integer ; "unsigned bigint")]
    #[test_case("Decimal(10, 2)", SqlType::Float ; "decimal")]
    #[test_case("boolean", SqlType::Boolean ; "boolean")]
    #[test_case("DATETIME", SqlType::Timestamp ; "datetime")]
    #[test_case("geometry", SqlType::Text ; "unknown falls back to text")]
    fn test_sql_type_from_declared(declared: &str, expected: SqlType) {
        assert_eq!(SqlType::from_declared(declared), expected);
    }

    #[test]
    fn test_clear_keeps_schema() {
        let mut table = Table::new(
            1,
            "t",
            vec![ColumnDef::new("a", "varchar"), ColumnDef::new("b", "varchar")],
        );
        table.append(vec![vec!["1".into(), "v1".into()]]);

        assert_eq!(table.clear(), 1);
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_names(), vec!["a", "b"]);
    }
}
