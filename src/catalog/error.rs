use std::fmt;
use thiserror::Error;

/// Kind of catalog object named by an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Database,
    Table,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Database => write!(f, "database"),
            ObjectKind::Table => write!(f, "table"),
        }
    }
}

/// Errors raised by catalog operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("{kind} '{name}' already exists")]
    ObjectAlreadyExists { kind: ObjectKind, name: String },

    #[error("unknown {kind} '{name}'")]
    ObjectNotFound { kind: ObjectKind, name: String },

    #[error("unknown table id {0}")]
    UnknownTableId(u64),

    #[error("no database selected")]
    NoDatabaseSelected,

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

impl CatalogError {
    pub fn unknown_database(name: &str) -> Self {
        CatalogError::ObjectNotFound {
            kind: ObjectKind::Database,
            name: name.to_string(),
        }
    }

    pub fn unknown_table(database: &str, table: &str) -> Self {
        CatalogError::ObjectNotFound {
            kind: ObjectKind::Table,
            name: format!("{}.{}", database, table),
        }
    }

    pub fn database_exists(name: &str) -> Self {
        CatalogError::ObjectAlreadyExists {
            kind: ObjectKind::Database,
            name: name.to_string(),
        }
    }

    pub fn table_exists(database: &str, table: &str) -> Self {
        CatalogError::ObjectAlreadyExists {
            kind: ObjectKind::Table,
            name: format!("{}.{}", database, table),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
