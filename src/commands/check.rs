use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use walkdir::WalkDir;

use super::config::FeatherCatalogConfig;
use crate::display::display_report;
use crate::sql_engine::fixture::{run_fixture, FixtureReport};

/// Run the fixture at `path`, or every fixture below it when it is a directory.
/// Returns whether all fixtures passed.
pub fn check_command(
    config: &FeatherCatalogConfig,
    path: &Path,
    quiet: bool,
    json: bool,
) -> Result<bool> {
    let start_time = Instant::now();
    let fixtures = find_fixtures(path)?;
    if fixtures.is_empty() {
        return Err(anyhow!("No .sql fixtures found in: {}", path.display()));
    }

    let mut reports = Vec::with_capacity(fixtures.len());
    for fixture in &fixtures {
        reports.push(check_fixture(config, fixture)?);
    }

    let failed = reports.iter().filter(|r| !r.passed()).count();
    info!(fixtures = reports.len(), failed, "checked fixtures");

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            display_report(report, quiet);
        }

        if !quiet || failed > 0 {
            println!("\nFixture summary:");
            println!("  Passed: {}", (reports.len() - failed).to_string().green());
            println!("  Failed: {}", failed.to_string().red());
            println!(
                "  Total fixtures checked: {} in {:.2?}",
                reports.len(),
                start_time.elapsed()
            );
        }
    }

    Ok(failed == 0)
}

/// Run one fixture on a fresh engine, comparing against a sibling `.result` file if present
pub fn check_fixture(config: &FeatherCatalogConfig, path: &Path) -> Result<FixtureReport> {
    let script = fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture: {}", path.display()))?;
    let mut engine = config.build_engine()?;

    let mut report = run_fixture(&mut engine, &path.display().to_string(), &script)
        .with_context(|| format!("Failed to split fixture: {}", path.display()))?;

    let result_path = path.with_extension("result");
    if result_path.exists() {
        let expected = fs::read_to_string(&result_path)
            .with_context(|| format!("Failed to read result file: {}", result_path.display()))?;
        report.compare_output(&expected);
    }

    Ok(report)
}

/// Find all SQL fixtures at the given path (recursively), sorted by path
pub fn find_fixtures(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(anyhow!("Fixture path does not exist: {}", path.display()));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut fixtures: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    fixtures.sort();

    Ok(fixtures)
}
