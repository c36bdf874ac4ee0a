use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use feather_catalog::commands::{self, config::FeatherCatalogConfig};
use feather_catalog::display::{self, OutputFormat};

/// FeatherCatalog (fc) CLI - SQL catalog engine and fixture runner
#[derive(Parser)]
#[clap(name = "fc", about = "FeatherCatalog - SQL catalog engine and fixture runner", version)]
struct Cli {
    /// Path to the project configuration (defaults to ./feather_catalog.yaml)
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a SQL script and print the results
    Run {
        /// Path to the SQL script
        script: PathBuf,

        /// Output format for query results (overrides the configuration)
        #[clap(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Run SQL fixtures and compare each statement with its expected error code
    Check {
        /// Fixture file or directory of fixtures
        path: PathBuf,

        /// Quiet mode - only output failures
        #[clap(short, long)]
        quiet: bool,

        /// Print the fixture reports as JSON
        #[clap(long)]
        json: bool,
    },

    /// Read statements from standard input
    Repl {
        /// Output format for query results (overrides the configuration)
        #[clap(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show version information
    Version,
}

fn init_logging(config: &FeatherCatalogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    let config = match commands::config::read_config(cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            process::exit(1);
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Run { script, format } => config.build_engine().and_then(|mut engine| {
            commands::run::run_command(
                &mut engine,
                &script,
                format.unwrap_or(config.output_format),
            )
        }),
        Command::Check { path, quiet, json } => {
            match commands::check::check_command(&config, &path, quiet, json) {
                Ok(true) => Ok(()),
                Ok(false) => process::exit(1),
                Err(err) => Err(err),
            }
        }
        Command::Repl { format } => config.build_engine().and_then(|mut engine| {
            let stdin = io::stdin();
            commands::repl::start(
                &mut engine,
                stdin.lock(),
                &mut io::stdout(),
                format.unwrap_or(config.output_format),
            )
            .map_err(Into::into)
        }),
        Command::Version => {
            display::display_version();
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}
