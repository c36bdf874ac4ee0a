//! Catalog of databases and tables
//!
//! Every operation checks the existence of the database before the table, so a
//! reference through a missing database never reports a missing table.

pub mod error;
pub mod tables;

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

pub use error::{CatalogError, ObjectKind, Result};
pub use tables::{ColumnDef, DatabaseInfo, Row, SqlType, Table, TableInfo, TableSchema, Value};

/// What to do when CREATE DATABASE finds the name already taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateDatabasePolicy {
    /// Fail with `ObjectAlreadyExists`
    Create,
    /// Leave the existing database untouched
    IfNotExists,
    /// Destroy the existing database and its tables, then create a fresh one
    DropIfExists,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    tables: BTreeMap<String, Table>,
}

impl Database {
    fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            created_at: Utc::now(),
            tables: BTreeMap::new(),
        }
    }

    /// Get all table names, sorted
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    fn info(&self) -> DatabaseInfo {
        DatabaseInfo {
            name: self.name.clone(),
            database_id: self.id,
            table_count: self.tables.len(),
            created_at: self.created_at,
        }
    }
}

/// In-memory registry of databases and their tables
#[derive(Debug, Default)]
pub struct Catalog {
    databases: BTreeMap<String, Database>,
    next_id: u64,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            databases: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Create a database. Returns false when an existing database was kept.
    pub fn create_database(&mut self, name: &str, policy: CreateDatabasePolicy) -> Result<bool> {
        if self.databases.contains_key(name) {
            match policy {
                CreateDatabasePolicy::Create => return Err(CatalogError::database_exists(name)),
                CreateDatabasePolicy::IfNotExists => return Ok(false),
                CreateDatabasePolicy::DropIfExists => {
                    self.drop_database(name, false)?;
                }
            }
        }

        let id = self.allocate_id();
        self.databases.insert(name.to_string(), Database::new(id, name));
        info!(database = name, database_id = id, "created database");
        Ok(true)
    }

    /// Drop a database with all of its tables. Returns false when `if_exists` skipped it.
    pub fn drop_database(&mut self, name: &str, if_exists: bool) -> Result<bool> {
        match self.databases.remove(name) {
            Some(db) => {
                info!(database = name, tables = db.tables.len(), "dropped database");
                Ok(true)
            }
            None if if_exists => Ok(false),
            None => Err(CatalogError::unknown_database(name)),
        }
    }

    pub fn database(&self, name: &str) -> Result<&Database> {
        self.databases
            .get(name)
            .ok_or_else(|| CatalogError::unknown_database(name))
    }

    fn database_mut(&mut self, name: &str) -> Result<&mut Database> {
        self.databases
            .get_mut(name)
            .ok_or_else(|| CatalogError::unknown_database(name))
    }

    /// List every database, sorted by name
    pub fn list_databases(&self) -> Vec<DatabaseInfo> {
        self.databases.values().map(Database::info).collect()
    }

    /// Create a table. Returns false when `if_not_exists` kept an existing table.
    pub fn create_table(
        &mut self,
        database: &str,
        table: &str,
        columns: Vec<ColumnDef>,
        if_not_exists: bool,
    ) -> Result<bool> {
        // Existence checks run before the id is allocated so failures leave no gaps.
        let db = self.database(database)?;
        if db.tables.contains_key(table) {
            if if_not_exists {
                debug!(database, table, "table already exists, skipping");
                return Ok(false);
            }
            return Err(CatalogError::table_exists(database, table));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = columns.iter().find(|col| !seen.insert(col.name.as_str())) {
            return Err(CatalogError::SchemaMismatch(format!(
                "duplicate column '{}' in table {}.{}",
                dup.name, database, table
            )));
        }

        let id = self.allocate_id();
        let db = self.database_mut(database)?;
        db.tables
            .insert(table.to_string(), Table::new(id, table, columns));
        info!(database, table, table_id = id, "created table");
        Ok(true)
    }

    /// Drop a table. Returns false when `if_exists` skipped a missing table.
    pub fn drop_table(&mut self, database: &str, table: &str, if_exists: bool) -> Result<bool> {
        let db = self.database_mut(database)?;
        match db.tables.remove(table) {
            Some(_) => {
                info!(database, table, "dropped table");
                Ok(true)
            }
            None if if_exists => Ok(false),
            None => Err(CatalogError::unknown_table(database, table)),
        }
    }

    /// Resolve a table, database first
    pub fn table(&self, database: &str, table: &str) -> Result<&Table> {
        self.database(database)?
            .tables
            .get(table)
            .ok_or_else(|| CatalogError::unknown_table(database, table))
    }

    /// Find a table by its catalog-wide id, along with the name of its database
    pub fn table_by_id(&self, id: u64) -> Result<(&str, &Table)> {
        self.databases
            .values()
            .find_map(|db| {
                db.tables
                    .values()
                    .find(|t| t.id == id)
                    .map(|t| (db.name.as_str(), t))
            })
            .ok_or(CatalogError::UnknownTableId(id))
    }

    fn table_mut(&mut self, database: &str, table: &str) -> Result<&mut Table> {
        self.database_mut(database)?
            .tables
            .get_mut(table)
            .ok_or_else(|| CatalogError::unknown_table(database, table))
    }

    /// List the tables of one database, sorted by name
    pub fn list_tables(&self, database: &str) -> Result<Vec<TableInfo>> {
        let db = self.database(database)?;
        Ok(db
            .tables
            .values()
            .map(|t| TableInfo {
                database: database.to_string(),
                name: t.name.clone(),
                table_id: t.id,
                columns: t.schema.columns.clone(),
                row_count: t.row_count(),
                created_at: t.created_at,
            })
            .collect())
    }

    /// Append rows in schema order. Every row is validated before any is stored.
    pub fn insert(&mut self, database: &str, table: &str, rows: Vec<Row>) -> Result<usize> {
        let target = self.table_mut(database, table)?;
        let columns = &target.schema.columns;

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(CatalogError::SchemaMismatch(format!(
                    "row {} has {} values but table {}.{} has {} columns",
                    i + 1,
                    row.len(),
                    database,
                    table,
                    columns.len()
                )));
            }
            if let Some(col) = columns
                .iter()
                .zip(row)
                .find(|(col, value)| !col.nullable && value.is_null())
                .map(|(col, _)| col)
            {
                return Err(CatalogError::SchemaMismatch(format!(
                    "column '{}' of table {}.{} cannot be NULL",
                    col.name, database, table
                )));
            }
        }

        let count = rows.len();
        target.append(rows);
        debug!(database, table, rows = count, "inserted rows");
        Ok(count)
    }

    /// Full scan in insertion order
    pub fn select_all(&self, database: &str, table: &str) -> Result<&[Row]> {
        Ok(self.table(database, table)?.rows())
    }

    /// Remove every row of an existing table, keeping its schema
    pub fn truncate_table(&mut self, database: &str, table: &str) -> Result<usize> {
        let removed = self.table_mut(database, table)?.clear();
        info!(database, table, rows = removed, "truncated table");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn columns() -> Vec<ColumnDef> {
        vec![ColumnDef::new("a", "varchar"), ColumnDef::new("b", "varchar")]
    }

    fn catalog_with_table() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .create_database("db1", CreateDatabasePolicy::Create)
            .unwrap();
        catalog.create_table("db1", "t", columns(), false).unwrap();
        catalog
    }

    #[test]
    fn test_create_database_twice_fails() {
        let mut catalog = Catalog::new();
        catalog
            .create_database("db1", CreateDatabasePolicy::Create)
            .unwrap();

        let err = catalog
            .create_database("db1", CreateDatabasePolicy::Create)
            .unwrap_err();
        assert_eq!(err, CatalogError::database_exists("db1"));
        assert!(!catalog
            .create_database("db1", CreateDatabasePolicy::IfNotExists)
            .unwrap());
    }

    #[test]
    fn test_drop_if_exists_policy_recreates_empty() {
        let mut catalog = catalog_with_table();
        let old_id = catalog.database("db1").unwrap().id;

        assert!(catalog
            .create_database("db1", CreateDatabasePolicy::DropIfExists)
            .unwrap());

        let db = catalog.database("db1").unwrap();
        assert!(db.table_names().is_empty());
        assert_ne!(db.id, old_id);
    }

    #[test]
    fn test_create_table_if_not_exists_is_idempotent() {
        let mut catalog = catalog_with_table();
        catalog
            .insert("db1", "t", vec![vec!["1".into(), "v1".into()]])
            .unwrap();

        assert!(!catalog.create_table("db1", "t", columns(), true).unwrap());
        assert_eq!(catalog.database("db1").unwrap().table_names(), vec!["t"]);
        assert_eq!(catalog.select_all("db1", "t").unwrap().len(), 1);

        let err = catalog.create_table("db1", "t", columns(), false).unwrap_err();
        assert_eq!(err, CatalogError::table_exists("db1", "t"));
    }

    #[test]
    fn test_create_table_rejects_duplicate_columns() {
        let mut catalog = catalog_with_table();
        let cols = vec![ColumnDef::new("a", "int"), ColumnDef::new("a", "int")];

        let err = catalog.create_table("db1", "dup", cols, false).unwrap_err();
        assert!(matches!(err, CatalogError::SchemaMismatch(_)));
    }

    #[test]
    fn test_insert_is_all_or_nothing() {
        let mut catalog = catalog_with_table();
        let rows = vec![
            vec!["1".into(), "v1".into()],
            vec!["2".into()],
        ];

        let err = catalog.insert("db1", "t", rows).unwrap_err();
        assert!(matches!(err, CatalogError::SchemaMismatch(_)));
        assert!(catalog.select_all("db1", "t").unwrap().is_empty());
    }

    #[test]
    fn test_insert_rejects_null_in_not_null_column() {
        let mut catalog = catalog_with_table();
        let cols = vec![ColumnDef::new("id", "int").not_null()];
        catalog.create_table("db1", "ids", cols, false).unwrap();

        let err = catalog
            .insert("db1", "ids", vec![vec![Value::Null]])
            .unwrap_err();
        assert!(matches!(err, CatalogError::SchemaMismatch(_)));
    }

    #[test]
    fn test_truncate_keeps_table() {
        let mut catalog = catalog_with_table();
        catalog
            .insert(
                "db1",
                "t",
                vec![vec!["1".into(), "v1".into()], vec!["2".into(), "v2".into()]],
            )
            .unwrap();

        assert_eq!(catalog.truncate_table("db1", "t").unwrap(), 2);
        assert!(catalog.select_all("db1", "t").unwrap().is_empty());

        catalog
            .insert("db1", "t", vec![vec!["3".into(), "v3".into()]])
            .unwrap();
        assert_eq!(catalog.select_all("db1", "t").unwrap().len(), 1);
    }

    #[test]
    fn test_truncate_reports_first_missing_link() {
        let mut catalog = catalog_with_table();
        catalog.drop_table("db1", "t", false).unwrap();

        assert_eq!(
            catalog.truncate_table("db1", "t").unwrap_err(),
            CatalogError::unknown_table("db1", "t")
        );

        catalog.drop_database("db1", false).unwrap();
        assert_eq!(
            catalog.truncate_table("db1", "t").unwrap_err(),
            CatalogError::unknown_database("db1")
        );
    }

    #[test]
    fn test_table_by_id() {
        let mut catalog = catalog_with_table();
        catalog
            .create_database("db2", CreateDatabasePolicy::Create)
            .unwrap();
        catalog.create_table("db2", "u", columns(), false).unwrap();

        let t_id = catalog.table("db1", "t").unwrap().id;
        let u_id = catalog.table("db2", "u").unwrap().id;
        let (database, table) = catalog.table_by_id(u_id).unwrap();
        assert_eq!((database, table.name.as_str()), ("db2", "u"));

        catalog.drop_table("db2", "u", false).unwrap();
        assert_eq!(
            catalog.table_by_id(u_id).unwrap_err(),
            CatalogError::UnknownTableId(u_id)
        );

        assert_eq!(catalog.table_by_id(t_id).unwrap().0, "db1");
        catalog.drop_database("db1", false).unwrap();
        assert_eq!(
            catalog.table_by_id(t_id).unwrap_err(),
            CatalogError::UnknownTableId(t_id)
        );
    }

    #[test]
    fn test_drop_table_if_exists() {
        let mut catalog = catalog_with_table();

        assert!(catalog.drop_table("db1", "t", true).unwrap());
        assert!(!catalog.drop_table("db1", "t", true).unwrap());
        assert_eq!(
            catalog.drop_table("db1", "t", false).unwrap_err(),
            CatalogError::unknown_table("db1", "t")
        );
        assert_eq!(
            catalog.drop_table("nope", "t", true).unwrap_err(),
            CatalogError::unknown_database("nope")
        );
    }

    #[test]
    fn test_drop_database_removes_tables() {
        let mut catalog = catalog_with_table();

        assert!(catalog.drop_database("db1", false).unwrap());
        assert!(!catalog.drop_database("db1", true).unwrap());
        assert_eq!(
            catalog.drop_database("db1", false).unwrap_err(),
            CatalogError::unknown_database("db1")
        );

        catalog
            .create_database("db1", CreateDatabasePolicy::Create)
            .unwrap();
        assert_eq!(
            catalog.select_all("db1", "t").unwrap_err(),
            CatalogError::unknown_table("db1", "t")
        );
    }

    #[test]
    fn test_listings_are_sorted() {
        let mut catalog = catalog_with_table();
        catalog
            .create_database("alpha", CreateDatabasePolicy::Create)
            .unwrap();
        catalog.create_table("db1", "a_table", columns(), false).unwrap();

        let dbs: Vec<String> = catalog.list_databases().into_iter().map(|d| d.name).collect();
        assert_eq!(dbs, vec!["alpha", "db1"]);

        let tables = catalog.list_tables("db1").unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a_table", "t"]);
        assert!(tables[0].table_id > tables[1].table_id);
    }
}
