//! Fixture scripts: statements annotated with the error code they must raise
//!
//! A statement is expected to fail when the rest of the line after its `;`
//! holds a single-line comment of the form `-- {ErrorCode N}`. Every other
//! statement is expected to succeed. Row output of all queries is collected as
//! tab-separated text so it can be compared with a `.result` file.

use serde::Serialize;
use sqlparser::dialect::Dialect;
use sqlparser::parser::ParserError;
use sqlparser::tokenizer::{Location, Token, TokenWithSpan, Tokenizer, Whitespace};
use tracing::{debug, warn};

use super::error::{EngineError, ErrorCode};
use super::executor::{Engine, QueryResult};
use crate::catalog::Row;

/// What a fixture statement is expected to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "expect", content = "code", rename_all = "snake_case")]
pub enum Expectation {
    Success,
    Error(ErrorCode),
}

impl Expectation {
    pub fn matches(&self, outcome: &Outcome) -> bool {
        match (self, outcome) {
            (Expectation::Success, Outcome::Success) => true,
            (Expectation::Error(expected), Outcome::Error { code, .. }) => expected == code,
            _ => false,
        }
    }
}

/// One statement of a fixture script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureStatement {
    /// Line the statement starts on, 1-based
    pub line: usize,
    pub sql: String,
    pub expected: Expectation,
}

/// What actually happened when a statement ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Error { code: ErrorCode, message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StatementOutcome {
    pub line: usize,
    pub sql: String,
    pub expected: Expectation,
    pub actual: Outcome,
    pub passed: bool,
}

/// Outcome of running a whole fixture
#[derive(Debug, Clone, Serialize)]
pub struct FixtureReport {
    pub name: String,
    pub statements: Vec<StatementOutcome>,
    /// Tab-separated rows produced by the fixture's queries
    pub output: String,
    /// Expected output, set only when it differs from `output`
    pub expected_output: Option<String>,
}

impl FixtureReport {
    pub fn passed(&self) -> bool {
        self.expected_output.is_none() && self.statements.iter().all(|s| s.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &StatementOutcome> {
        self.statements.iter().filter(|s| !s.passed)
    }

    /// Compare the collected output with a `.result` file, ignoring trailing whitespace
    pub fn compare_output(&mut self, expected: &str) {
        if self.output.trim_end() != expected.trim_end() {
            warn!(fixture = %self.name, "output differs from expected result");
            self.expected_output = Some(expected.to_string());
        }
    }
}

/// Render rows as tab-separated lines. Backslashes, tabs and line breaks
/// inside values are escaped so every line keeps one field per column.
pub fn rows_to_tsv(rows: &[Row]) -> String {
    let mut out = String::new();
    for row in rows {
        let line = row
            .iter()
            .map(|v| escape_field(&v.to_string()))
            .collect::<Vec<_>>()
            .join("\t");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn escape_field(field: &str) -> String {
    let mut escaped = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Byte offsets of line starts, to map token locations back into the script
struct LineOffsets<'a> {
    script: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineOffsets<'a> {
    fn new(script: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(script.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { script, starts }
    }

    /// Locations are 1-based and count columns in characters
    fn byte_offset(&self, location: &Location) -> usize {
        let line = (location.line as usize).saturating_sub(1);
        let Some(&start) = self.starts.get(line) else {
            return self.script.len();
        };
        let column = (location.column as usize).saturating_sub(1);
        self.script[start..]
            .char_indices()
            .nth(column)
            .map(|(i, _)| start + i)
            .unwrap_or(self.script.len())
    }
}

/// Split a script into statements on the dialect's `;` tokens, keeping the
/// annotation comment that follows each `;` on the same line. Comments and
/// quoting follow the dialect's tokenizer.
pub fn split_statements(
    dialect: &dyn Dialect,
    script: &str,
) -> Result<Vec<FixtureStatement>, EngineError> {
    let tokens = Tokenizer::new(dialect, script)
        .tokenize_with_location()
        .map_err(ParserError::from)?;
    let offsets = LineOffsets::new(script);

    let mut statements = Vec::new();
    let mut start: Option<Location> = None;
    let mut end: Option<Location> = None;

    for (i, token) in tokens.iter().enumerate() {
        match &token.token {
            Token::SemiColon => {
                let expected = trailing_annotation(&tokens[i + 1..]);
                push_statement(&mut statements, &offsets, start.take(), end.take(), expected);
            }
            Token::Whitespace(_) => {}
            _ => {
                if start.is_none() {
                    start = Some(token.span.start);
                }
                end = Some(token.span.end);
            }
        }
    }

    push_statement(&mut statements, &offsets, start, end, Expectation::Success);
    Ok(statements)
}

/// Expectation set by a single-line comment directly after a `;`
fn trailing_annotation(rest: &[TokenWithSpan]) -> Expectation {
    for token in rest {
        match &token.token {
            Token::Whitespace(Whitespace::Space | Whitespace::Tab) => continue,
            Token::Whitespace(Whitespace::SingleLineComment { comment, .. }) => {
                return parse_annotation(comment)
                    .map(|code| Expectation::Error(ErrorCode(code)))
                    .unwrap_or(Expectation::Success);
            }
            _ => break,
        }
    }
    Expectation::Success
}

fn push_statement(
    statements: &mut Vec<FixtureStatement>,
    offsets: &LineOffsets<'_>,
    start: Option<Location>,
    end: Option<Location>,
    expected: Expectation,
) {
    let (Some(start), Some(end)) = (start, end) else {
        return;
    };
    let sql = offsets.script[offsets.byte_offset(&start)..offsets.byte_offset(&end)].trim();
    if !sql.is_empty() {
        statements.push(FixtureStatement {
            line: start.line as usize,
            sql: sql.to_string(),
            expected,
        });
    }
}

/// Whether the last token of `text` is a `;`, ignoring trailing whitespace and
/// comments. Unterminated quotes or comments never end a statement.
pub fn ends_with_terminator(dialect: &dyn Dialect, text: &str) -> bool {
    match Tokenizer::new(dialect, text).tokenize() {
        Ok(tokens) => matches!(
            tokens
                .iter()
                .rev()
                .find(|token| !matches!(token, Token::Whitespace(_))),
            Some(Token::SemiColon)
        ),
        Err(_) => false,
    }
}

/// Parse the body of a `{ErrorCode N}` comment into `N`
fn parse_annotation(comment: &str) -> Option<u16> {
    let inner = comment.trim().strip_prefix('{')?.strip_suffix('}')?.trim();
    inner.strip_prefix("ErrorCode")?.trim().parse().ok()
}

/// Run every statement of a fixture in order, continuing past mismatches.
/// Fails only when the script cannot be tokenized.
pub fn run_fixture(
    engine: &mut Engine,
    name: &str,
    script: &str,
) -> Result<FixtureReport, EngineError> {
    let mut statements = Vec::new();
    let mut output = String::new();

    for statement in split_statements(engine.dialect(), script)? {
        let actual = match engine.execute(&statement.sql) {
            Ok(results) => {
                for result in &results {
                    if let QueryResult::Rows { rows, .. } = result {
                        output.push_str(&rows_to_tsv(rows));
                    }
                }
                Outcome::Success
            }
            Err(err) => Outcome::Error {
                code: err.code(),
                message: err.to_string(),
            },
        };

        let passed = statement.expected.matches(&actual);
        if passed {
            debug!(fixture = name, line = statement.line, "statement matched expectation");
        } else {
            warn!(
                fixture = name,
                line = statement.line,
                sql = %statement.sql,
                "statement did not match expectation"
            );
        }

        statements.push(StatementOutcome {
            line: statement.line,
            sql: statement.sql,
            expected: statement.expected,
            actual,
            passed,
        });
    }

    Ok(FixtureReport {
        name: name.to_string(),
        statements,
        output,
        expected_output: None,
    })
}
