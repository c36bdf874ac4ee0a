//! FeatherCatalog: an in-memory SQL catalog engine with a fixture runner

pub mod catalog;
pub mod commands;
pub mod display;
pub mod sql_engine;
