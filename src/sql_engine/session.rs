use tracing::debug;

use crate::catalog::{Catalog, CatalogError, Result};

/// A table reference as written in a statement, optionally qualified by database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub database: Option<String>,
    pub table: String,
}

impl TableRef {
    pub fn new(database: Option<&str>, table: &str) -> Self {
        Self {
            database: database.map(str::to_string),
            table: table.to_string(),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.database {
            Some(db) => write!(f, "{}.{}", db, self.table),
            None => write!(f, "{}", self.table),
        }
    }
}

/// Per-connection state: the selected database
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    current_database: Option<String>,
}

impl Session {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            current_database: None,
        }
    }

    pub fn with_database(id: &str, database: &str) -> Self {
        Self {
            id: id.to_string(),
            current_database: Some(database.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn current_database(&self) -> Option<&str> {
        self.current_database.as_deref()
    }

    /// Switch to an existing database
    pub fn use_database(&mut self, catalog: &Catalog, name: &str) -> Result<()> {
        catalog.database(name)?;
        debug!(session = %self.id, database = name, "switched database");
        self.current_database = Some(name.to_string());
        Ok(())
    }

    /// Database a reference points at. Existence is checked by the catalog.
    pub fn resolve_database<'a>(&'a self, table: &'a TableRef) -> Result<&'a str> {
        self.resolve_database_name(table.database.as_deref())
    }

    /// An explicit database name, else the selected one
    pub fn resolve_database_name<'a>(&'a self, database: Option<&'a str>) -> Result<&'a str> {
        database
            .or(self.current_database.as_deref())
            .ok_or(CatalogError::NoDatabaseSelected)
    }
}
