//! Subcommands of the `fc` binary

pub mod check;
pub mod config;
pub mod repl;
pub mod run;
