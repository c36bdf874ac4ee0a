//! Binding of parsed SQL statements to catalog operations
use sqlparser::ast::{
    self, visit_relations, ColumnOption, Expr, GroupByExpr, ObjectName, ObjectType, SelectItem,
    SetExpr, ShowStatementInParentType, ShowStatementOptions, TableFactor, UnaryOperator,
};
use std::ops::ControlFlow;

use super::error::EngineError;
use super::session::TableRef;
use crate::catalog::{ColumnDef, Row, Value};

/// A statement the catalog knows how to execute
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateDatabase {
        name: String,
        if_not_exists: bool,
    },
    DropDatabase {
        name: String,
        if_exists: bool,
    },
    UseDatabase {
        name: String,
    },
    CreateTable {
        table: TableRef,
        columns: Vec<ColumnDef>,
        if_not_exists: bool,
    },
    DropTable {
        table: TableRef,
        if_exists: bool,
    },
    Insert {
        table: TableRef,
        /// Explicit column list, empty when the statement lists none
        columns: Vec<String>,
        rows: Vec<Row>,
    },
    SelectAll {
        table: TableRef,
    },
    Truncate {
        table: TableRef,
    },
    ShowDatabases,
    /// Tables of `database`, or of the selected database when absent
    ShowTables {
        database: Option<String>,
    },
}

impl TryFrom<&ast::Statement> for Statement {
    type Error = EngineError;

    fn try_from(statement: &ast::Statement) -> Result<Self, Self::Error> {
        match statement {
            ast::Statement::CreateDatabase {
                db_name,
                if_not_exists,
                ..
            } => Ok(Statement::CreateDatabase {
                name: database_name(db_name)?,
                if_not_exists: *if_not_exists,
            }),
            ast::Statement::Drop {
                object_type,
                if_exists,
                names,
                ..
            } => bind_drop(object_type, *if_exists, names),
            ast::Statement::Use(use_stmt) => match use_stmt {
                ast::Use::Object(name) | ast::Use::Database(name) => Ok(Statement::UseDatabase {
                    name: database_name(name)?,
                }),
                other => Err(unsupported(other)),
            },
            ast::Statement::CreateTable(create) => {
                if create.query.is_some() {
                    return Err(EngineError::Unsupported(
                        "CREATE TABLE ... AS SELECT".to_string(),
                    ));
                }
                Ok(Statement::CreateTable {
                    table: table_ref(&create.name)?,
                    columns: create.columns.iter().map(column_def).collect(),
                    if_not_exists: create.if_not_exists,
                })
            }
            ast::Statement::Insert(insert) => {
                let source = insert
                    .source
                    .as_ref()
                    .ok_or_else(|| EngineError::Unsupported("INSERT without VALUES".to_string()))?;
                let rows = match source.body.as_ref() {
                    SetExpr::Values(values) => values
                        .rows
                        .iter()
                        .map(|row| row.iter().map(literal).collect::<Result<Row, _>>())
                        .collect::<Result<Vec<_>, _>>()?,
                    other => return Err(unsupported(format!("INSERT source {}", other))),
                };
                Ok(Statement::Insert {
                    table: first_relation(statement)?,
                    columns: insert.columns.iter().map(|c| c.value.clone()).collect(),
                    rows,
                })
            }
            ast::Statement::Query(query) => bind_select(query),
            ast::Statement::Truncate { table_names, .. } => match table_names.as_slice() {
                [target] => Ok(Statement::Truncate {
                    table: table_ref(&target.name)?,
                }),
                _ => Err(EngineError::Unsupported(
                    "TRUNCATE of more than one table".to_string(),
                )),
            },
            ast::Statement::ShowDatabases { show_options, .. } => {
                if has_show_filter(show_options) || show_options.show_in.is_some() {
                    return Err(unsupported(statement));
                }
                Ok(Statement::ShowDatabases)
            }
            ast::Statement::ShowTables {
                full,
                extended,
                show_options,
                ..
            } => {
                if *full || *extended || has_show_filter(show_options) {
                    return Err(unsupported(statement));
                }
                let database = match &show_options.show_in {
                    Some(show_in) => match (&show_in.parent_type, &show_in.parent_name) {
                        (
                            None
                            | Some(ShowStatementInParentType::Database)
                            | Some(ShowStatementInParentType::Schema),
                            Some(name),
                        ) => Some(database_name(name)?),
                        _ => return Err(unsupported(statement)),
                    },
                    None => None,
                };
                Ok(Statement::ShowTables { database })
            }
            other => Err(unsupported(statement_keyword(other))),
        }
    }
}

fn unsupported(what: impl std::fmt::Display) -> EngineError {
    EngineError::Unsupported(what.to_string())
}

/// LIKE/WHERE filters, STARTS WITH and LIMIT of a SHOW statement
fn has_show_filter(options: &ShowStatementOptions) -> bool {
    options.filter_position.is_some()
        || options.starts_with.is_some()
        || options.limit.is_some()
        || options.limit_from.is_some()
}

/// Leading keywords of a statement, used to name it in errors
fn statement_keyword(statement: &ast::Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

fn bind_drop(
    object_type: &ObjectType,
    if_exists: bool,
    names: &[ObjectName],
) -> Result<Statement, EngineError> {
    let name = match names {
        [name] => name,
        _ => return Err(unsupported(format!("DROP {} of several objects", object_type))),
    };

    match object_type {
        ObjectType::Database | ObjectType::Schema => Ok(Statement::DropDatabase {
            name: database_name(name)?,
            if_exists,
        }),
        ObjectType::Table => Ok(Statement::DropTable {
            table: table_ref(name)?,
            if_exists,
        }),
        other => Err(unsupported(format!("DROP {}", other))),
    }
}

/// Only `SELECT * FROM <table>` is supported: a full scan with no filter
fn bind_select(query: &ast::Query) -> Result<Statement, EngineError> {
    let select = match query.body.as_ref() {
        SetExpr::Select(select) if query.with.is_none() => select,
        _ => return Err(unsupported(query)),
    };

    let is_wildcard = matches!(select.projection.as_slice(), [SelectItem::Wildcard(_)]);
    let is_grouped = !matches!(
        &select.group_by,
        GroupByExpr::Expressions(exprs, ..) if exprs.is_empty()
    );
    let shapes_rows = query.order_by.is_some()
        || query.limit.is_some()
        || !query.limit_by.is_empty()
        || query.offset.is_some()
        || query.fetch.is_some()
        || !query.locks.is_empty()
        || select.distinct.is_some()
        || select.top.is_some()
        || select.into.is_some()
        || select.having.is_some()
        || select.qualify.is_some()
        || is_grouped;
    if !is_wildcard || select.selection.is_some() || shapes_rows {
        return Err(unsupported(query));
    }

    match select.from.as_slice() {
        [from] if from.joins.is_empty() => match &from.relation {
            TableFactor::Table { name, .. } => Ok(Statement::SelectAll {
                table: table_ref(name)?,
            }),
            _ => Err(unsupported(query)),
        },
        _ => Err(unsupported(query)),
    }
}

/// The first table named by a statement, which for INSERT is its target
fn first_relation(statement: &ast::Statement) -> Result<TableRef, EngineError> {
    let mut target = None;
    let _ = visit_relations(statement, |relation| {
        target = Some(relation.clone());
        ControlFlow::<()>::Break(())
    });

    match target {
        Some(name) => table_ref(&name),
        None => Err(unsupported(statement_keyword(statement))),
    }
}

fn database_name(name: &ObjectName) -> Result<String, EngineError> {
    match name.0.as_slice() {
        [db] => Ok(db.value.clone()),
        _ => Err(unsupported(format!("database name {}", name))),
    }
}

fn table_ref(name: &ObjectName) -> Result<TableRef, EngineError> {
    match name.0.as_slice() {
        [table] => Ok(TableRef::new(None, &table.value)),
        [db, table] => Ok(TableRef::new(Some(&db.value), &table.value)),
        _ => Err(unsupported(format!("table name {}", name))),
    }
}

fn column_def(column: &ast::ColumnDef) -> ColumnDef {
    let def = ColumnDef::new(&column.name.value, &column.data_type.to_string());
    let not_null = column
        .options
        .iter()
        .any(|opt| matches!(opt.option, ColumnOption::NotNull));

    if not_null {
        def.not_null()
    } else {
        def
    }
}

fn literal(expr: &Expr) -> Result<Value, EngineError> {
    match expr {
        Expr::Value(value) => literal_value(value),
        Expr::Nested(inner) => literal(inner),
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr: inner,
        } => match inner.as_ref() {
            Expr::Value(ast::Value::Number(n, _)) => number(&format!("-{}", n)),
            other => Err(unsupported(format!("expression -{}", other))),
        },
        other => Err(unsupported(format!("expression {}", other))),
    }
}

fn literal_value(value: &ast::Value) -> Result<Value, EngineError> {
    match value {
        ast::Value::Number(n, _) => number(n),
        ast::Value::SingleQuotedString(s) | ast::Value::DoubleQuotedString(s) => {
            Ok(Value::String(s.clone()))
        }
        ast::Value::Boolean(b) => Ok(Value::Boolean(*b)),
        ast::Value::Null => Ok(Value::Null),
        other => Err(unsupported(format!("literal {}", other))),
    }
}

fn number(text: &str) -> Result<Value, EngineError> {
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Integer(i));
    }
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| unsupported(format!("numeric literal {}", text)))
}
