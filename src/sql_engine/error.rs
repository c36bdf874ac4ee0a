//! Engine errors and their numeric codes

use serde::Serialize;
use sqlparser::parser::ParserError;
use std::fmt;
use thiserror::Error;

use crate::catalog::{CatalogError, ObjectKind};

/// Numeric error code reported for a failed statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    pub const UNIMPLEMENTED: ErrorCode = ErrorCode(2);
    pub const UNKNOWN_DATABASE: ErrorCode = ErrorCode(3);
    pub const SYNTAX_ERROR: ErrorCode = ErrorCode(5);
    pub const SCHEMA_MISMATCH: ErrorCode = ErrorCode(17);
    pub const UNKNOWN_TABLE: ErrorCode = ErrorCode(25);
    pub const DATABASE_ALREADY_EXISTS: ErrorCode = ErrorCode(2301);
    pub const TABLE_ALREADY_EXISTS: ErrorCode = ErrorCode(2302);

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&CatalogError> for ErrorCode {
    fn from(err: &CatalogError) -> Self {
        match err {
            CatalogError::ObjectNotFound {
                kind: ObjectKind::Database,
                ..
            } => ErrorCode::UNKNOWN_DATABASE,
            CatalogError::ObjectNotFound {
                kind: ObjectKind::Table,
                ..
            }
            | CatalogError::UnknownTableId(_) => ErrorCode::UNKNOWN_TABLE,
            CatalogError::ObjectAlreadyExists {
                kind: ObjectKind::Database,
                ..
            } => ErrorCode::DATABASE_ALREADY_EXISTS,
            CatalogError::ObjectAlreadyExists {
                kind: ObjectKind::Table,
                ..
            } => ErrorCode::TABLE_ALREADY_EXISTS,
            // The database link of the reference is missing, same as an unknown database.
            CatalogError::NoDatabaseSelected => ErrorCode::UNKNOWN_DATABASE,
            CatalogError::SchemaMismatch(_) => ErrorCode::SCHEMA_MISMATCH,
        }
    }
}

/// Errors returned by the engine for a single statement
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("syntax error: {0}")]
    Syntax(#[from] ParserError),

    #[error("unsupported statement: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Syntax(_) => ErrorCode::SYNTAX_ERROR,
            EngineError::Unsupported(_) => ErrorCode::UNIMPLEMENTED,
            EngineError::Catalog(err) => ErrorCode::from(err),
        }
    }
}
