use std::io::{BufRead, Write};

use crate::display::{render_results, OutputFormat};
use crate::sql_engine::fixture::{ends_with_terminator, split_statements};
use crate::sql_engine::Engine;

pub const PROMPT: &str = "fc> ";
pub const CONTINUATION_PROMPT: &str = "..> ";

/// Starts the REPL (Read-Eval-Print Loop).
///
/// Input is buffered until it ends with a `;` (trailing comments allowed), then every statement
/// is executed. Errors are printed as `ERROR <code>: <message>` and do not end
/// the loop.
pub fn start<R: BufRead, W: Write>(
    engine: &mut Engine,
    mut input: R,
    output: &mut W,
    format: OutputFormat,
) -> std::io::Result<()> {
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.trim().is_empty() {
            PROMPT
        } else {
            CONTINUATION_PROMPT
        };
        write!(output, "{}", prompt)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        buffer.push_str(&line);

        if !ends_with_terminator(engine.dialect(), &buffer) {
            continue;
        }

        let statements = match split_statements(engine.dialect(), &buffer) {
            Ok(statements) => statements,
            Err(err) => {
                writeln!(output, "ERROR {}: {}", err.code(), err)?;
                Vec::new()
            }
        };
        for statement in statements {
            match engine.execute(&statement.sql) {
                Ok(results) => match render_results(&results, format) {
                    Ok(text) => write!(output, "{}", text)?,
                    Err(err) => writeln!(output, "ERROR: {}", err)?,
                },
                Err(err) => writeln!(output, "ERROR {}: {}", err.code(), err)?,
            }
        }
        buffer.clear();
    }

    writeln!(output)?;
    Ok(())
}
