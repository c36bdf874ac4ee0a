use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use serde::{Deserialize, Serialize};

use crate::catalog::Row;
use crate::sql_engine::fixture::{rows_to_tsv, Expectation, FixtureReport, Outcome};
use crate::sql_engine::QueryResult;

/// How query results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned table with a header row
    #[default]
    Text,
    /// Tab-separated rows, the format of `.result` files
    Tsv,
    Csv,
    Json,
}

/// Returns the compact FeatherCatalog logo
pub fn get_compact_logo() -> String {
    let logo = r#"
   ___         _   _             ___      _        _
  | __|__ __ _| |_| |_  ___ _ _ / __|__ _| |_ __ _| |___  __ _
  | _/ -_) _` |  _| ' \/ -_) '_| (__/ _` |  _/ _` | / _ \/ _` |
  |_|\___\__,_|\__|_||_\___|_|  \___\__,_|\__\__,_|_\___/\__, |
                                                         |___/
    "#;

    logo.to_string()
}

/// Returns a colored version of the compact logo
pub fn get_compact_colored_logo() -> ColoredString {
    get_compact_logo().bright_cyan()
}

/// Display version information with the logo
pub fn display_version() {
    println!("{}", get_compact_colored_logo());
    println!("FeatherCatalog CLI version {}", env!("CARGO_PKG_VERSION"));
    println!("A Rust-based SQL catalog engine and fixture runner");
    println!("Repository: {}", env!("CARGO_PKG_REPOSITORY"));
}

/// Render the results of one statement batch
pub fn render_results(results: &[QueryResult], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
        OutputFormat::Text => Ok(results.iter().map(render_text).collect()),
        OutputFormat::Tsv => Ok(results
            .iter()
            .filter_map(|r| match r {
                QueryResult::Rows { rows, .. } => Some(rows_to_tsv(rows)),
                QueryResult::Done { .. } => None,
            })
            .collect()),
        OutputFormat::Csv => {
            let mut out = String::new();
            for result in results {
                if let QueryResult::Rows { columns, rows } = result {
                    out.push_str(&render_csv(columns, rows)?);
                }
            }
            Ok(out)
        }
    }
}

fn render_text(result: &QueryResult) -> String {
    match result {
        QueryResult::Done { affected_rows } => {
            format!("{} ({} rows affected)\n", "OK".green(), affected_rows)
        }
        QueryResult::Rows { columns, rows } => {
            let cells: Vec<Vec<String>> = rows
                .iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect();

            let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
            for row in &cells {
                for (width, cell) in widths.iter_mut().zip(row) {
                    *width = (*width).max(cell.chars().count());
                }
            }

            let format_line = |values: &[String]| {
                values
                    .iter()
                    .zip(&widths)
                    .map(|(v, w)| format!("{:<width$}", v, width = *w))
                    .collect::<Vec<_>>()
                    .join(" | ")
            };
            let separator = widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-");

            let mut out = String::new();
            out.push_str(&format!("{}\n", format_line(columns).bold()));
            out.push_str(&separator);
            out.push('\n');
            for row in &cells {
                out.push_str(&format_line(row));
                out.push('\n');
            }
            out.push_str(&format!("({} rows)\n", rows.len()));
            out
        }
    }
}

fn render_csv(columns: &[String], rows: &[Row]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(String::from_utf8(bytes)?)
}

fn describe_expectation(expected: &Expectation) -> String {
    match expected {
        Expectation::Success => "success".to_string(),
        Expectation::Error(code) => format!("ErrorCode {}", code),
    }
}

fn describe_outcome(actual: &Outcome) -> String {
    match actual {
        Outcome::Success => "success".to_string(),
        Outcome::Error { code, message } => format!("ErrorCode {} ({})", code, message),
    }
}

/// Print the result of a fixture run
pub fn display_report(report: &FixtureReport, quiet: bool) {
    if report.passed() {
        if !quiet {
            println!(
                "✅ {} ({} statements)",
                report.name,
                report.statements.len()
            );
        }
        return;
    }

    eprintln!("❌ {}", report.name.red());
    for failure in report.failures() {
        eprintln!("   - line {}: {}", failure.line, failure.sql);
        eprintln!(
            "     expected {}, got {}",
            describe_expectation(&failure.expected),
            describe_outcome(&failure.actual)
        );
    }
    if let Some(expected) = &report.expected_output {
        eprintln!("   - output differs from the .result file");
        eprintln!("     expected:\n{}", indent(expected));
        eprintln!("     actual:\n{}", indent(&report.output));
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("       {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
