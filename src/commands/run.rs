use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use crate::display::{render_results, OutputFormat};
use crate::sql_engine::fixture::split_statements;
use crate::sql_engine::Engine;

/// Execute every statement of a SQL script and print the results.
/// Stops at the first failing statement.
pub fn run_command(engine: &mut Engine, script_path: &Path, format: OutputFormat) -> Result<()> {
    let script = fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read SQL file: {}", script_path.display()))?;

    let statements = split_statements(engine.dialect(), &script).map_err(|err| {
        anyhow!(
            "{}: ErrorCode {}: {}",
            script_path.display(),
            err.code(),
            err
        )
    })?;

    for statement in statements {
        let results = engine.execute(&statement.sql).map_err(|err| {
            anyhow!(
                "{}:{}: ErrorCode {}: {}",
                script_path.display(),
                statement.line,
                err.code(),
                err
            )
        })?;

        if format == OutputFormat::Text {
            println!("{}", statement.sql.dimmed());
        }
        print!("{}", render_results(&results, format)?);
    }

    Ok(())
}
