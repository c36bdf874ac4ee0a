//! SQL engine module for binding parsed statements to the catalog and running fixtures

pub mod error;
pub mod executor;
pub mod fixture;
pub mod session;
pub mod statement;

pub use error::{EngineError, ErrorCode};
pub use executor::{Engine, QueryResult};

#[cfg(test)]
mod tests;
