use serde::Serialize;
use sqlparser::dialect::{Dialect, MySqlDialect};
use sqlparser::parser::Parser as SqlParser;
use tracing::{debug, warn};

use super::error::EngineError;
use super::session::Session;
use super::statement::Statement;
use crate::catalog::{
    Catalog, CatalogError, CreateDatabasePolicy, Row, Table, Value,
};

/// Result of one executed statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryResult {
    Done { affected_rows: usize },
    Rows { columns: Vec<String>, rows: Vec<Row> },
}

impl QueryResult {
    fn done() -> Self {
        QueryResult::Done { affected_rows: 0 }
    }
}

/// Single-session SQL engine over an in-memory catalog
pub struct Engine {
    catalog: Catalog,
    session: Session,
    dialect: Box<dyn Dialect>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_dialect(Box::new(MySqlDialect {}))
    }

    pub fn with_dialect(dialect: Box<dyn Dialect>) -> Self {
        Self {
            catalog: Catalog::new(),
            session: Session::new("default"),
            dialect,
        }
    }

    /// Create `name` if needed and select it for the session
    pub fn with_default_database(mut self, name: &str) -> Result<Self, EngineError> {
        self.catalog
            .create_database(name, CreateDatabasePolicy::IfNotExists)?;
        self.session.use_database(&self.catalog, name)?;
        Ok(self)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Parse and execute SQL text, stopping at the first failing statement
    pub fn execute(&mut self, sql: &str) -> Result<Vec<QueryResult>, EngineError> {
        let statements = SqlParser::parse_sql(self.dialect.as_ref(), sql)
            .inspect_err(|err| warn!(error = %err, "failed to parse statement"))?;

        let mut results = Vec::with_capacity(statements.len());
        for statement in &statements {
            debug!(session = self.session.id(), sql = %statement, "executing statement");
            let result = Statement::try_from(statement)
                .and_then(|bound| self.execute_statement(bound))
                .inspect_err(|err| {
                    warn!(code = err.code().value(), error = %err, sql = %statement, "statement failed")
                })?;
            results.push(result);
        }

        Ok(results)
    }

    /// Execute one bound statement against the catalog
    pub fn execute_statement(&mut self, statement: Statement) -> Result<QueryResult, EngineError> {
        let result = match statement {
            Statement::CreateDatabase {
                name,
                if_not_exists,
            } => {
                let policy = if if_not_exists {
                    CreateDatabasePolicy::IfNotExists
                } else {
                    CreateDatabasePolicy::Create
                };
                self.catalog.create_database(&name, policy)?;
                QueryResult::done()
            }
            Statement::DropDatabase { name, if_exists } => {
                self.catalog.drop_database(&name, if_exists)?;
                QueryResult::done()
            }
            Statement::UseDatabase { name } => {
                self.session.use_database(&self.catalog, &name)?;
                QueryResult::done()
            }
            Statement::CreateTable {
                table,
                columns,
                if_not_exists,
            } => {
                let database = self.session.resolve_database(&table)?;
                self.catalog
                    .create_table(database, &table.table, columns, if_not_exists)?;
                QueryResult::done()
            }
            Statement::DropTable { table, if_exists } => {
                let database = self.session.resolve_database(&table)?;
                self.catalog.drop_table(database, &table.table, if_exists)?;
                QueryResult::done()
            }
            Statement::Insert {
                table,
                columns,
                rows,
            } => {
                let database = self.session.resolve_database(&table)?;
                let target = self.catalog.table(database, &table.table)?;
                let rows = arrange_rows(target, &columns, rows)?;
                let affected_rows = self.catalog.insert(database, &table.table, rows)?;
                QueryResult::Done { affected_rows }
            }
            Statement::SelectAll { table } => {
                let database = self.session.resolve_database(&table)?;
                let rows = self.catalog.select_all(database, &table.table)?.to_vec();
                QueryResult::Rows {
                    columns: self.catalog.table(database, &table.table)?.column_names(),
                    rows,
                }
            }
            Statement::Truncate { table } => {
                let database = self.session.resolve_database(&table)?;
                let affected_rows = self.catalog.truncate_table(database, &table.table)?;
                QueryResult::Done { affected_rows }
            }
            Statement::ShowDatabases => QueryResult::Rows {
                columns: vec!["name".to_string()],
                rows: self
                    .catalog
                    .list_databases()
                    .into_iter()
                    .map(|db| vec![Value::String(db.name)])
                    .collect(),
            },
            Statement::ShowTables { database } => {
                let database = self.session.resolve_database_name(database.as_deref())?;
                QueryResult::Rows {
                    columns: vec!["name".to_string()],
                    rows: self
                        .catalog
                        .list_tables(database)?
                        .into_iter()
                        .map(|t| vec![Value::String(t.name)])
                        .collect(),
                }
            }
        };

        Ok(result)
    }
}

/// Reorder rows written against an explicit column list into schema order.
/// Columns missing from the list are filled with NULL.
fn arrange_rows(target: &Table, columns: &[String], rows: Vec<Row>) -> Result<Vec<Row>, CatalogError> {
    if columns.is_empty() {
        return Ok(rows);
    }

    let mut positions = Vec::with_capacity(columns.len());
    for name in columns {
        let index = target.column_index(name).ok_or_else(|| {
            CatalogError::SchemaMismatch(format!(
                "unknown column '{}' in table {}",
                name, target.name
            ))
        })?;
        if positions.contains(&index) {
            return Err(CatalogError::SchemaMismatch(format!(
                "column '{}' listed more than once",
                name
            )));
        }
        positions.push(index);
    }

    let width = target.schema.columns.len();
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            if row.len() != positions.len() {
                return Err(CatalogError::SchemaMismatch(format!(
                    "row {} has {} values but {} columns were listed",
                    i + 1,
                    row.len(),
                    positions.len()
                )));
            }
            let mut arranged = vec![Value::Null; width];
            for (&position, value) in positions.iter().zip(row) {
                arranged[position] = value;
            }
            Ok(arranged)
        })
        .collect()
}
