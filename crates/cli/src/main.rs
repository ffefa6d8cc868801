// Pleiades sidebar CLI - reconcile external gazetteers against Pleiades

mod exit_codes;
mod pipeline;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use sidebar_io::IoError;
use sidebar_recon::ReconError;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use exit_codes::{io_exit_code, recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "sidebar")]
#[command(about = "Build the Pleiades sidebar from external gazetteer exports")]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log level filter (error, warn, info, debug, trace); RUST_LOG wins
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every configured source against the canonical gazetteer
    #[command(after_help = "\
Examples:
  sidebar generate pleiades.sidebar.toml
  sidebar generate pleiades.sidebar.toml --output sidebar/
  sidebar generate pleiades.sidebar.toml --namespaces itinere,nomisma --use-cache
  PLEIADES_PATH=~/pleiades/json sidebar generate pleiades.sidebar.toml --json")]
    Generate {
        /// Path to the .sidebar.toml run configuration
        config: PathBuf,

        /// Only run these sources (comma-separated config keys)
        #[arg(long, env = "SIDEBAR_NAMESPACES", value_delimiter = ',')]
        namespaces: Vec<String>,

        /// Load parsed sources from the dataset cache when present
        #[arg(long)]
        use_cache: bool,

        /// Dataset cache directory
        #[arg(long, env = "SIDEBAR_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        /// Root of the Pleiades JSON tree (overrides canonical.path)
        #[arg(long, env = "PLEIADES_PATH")]
        pleiades_path: Option<PathBuf>,

        /// Write the sidebar tree and unreciprocated files under DIR
        #[arg(long, short = 'o', value_name = "DIR")]
        output: Option<PathBuf>,

        /// Print the result JSON to stdout (default when --output is absent)
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a run configuration without running it
    #[command(after_help = "\
Examples:
  sidebar validate pleiades.sidebar.toml")]
    Validate {
        /// Path to the .sidebar.toml run configuration
        config: PathBuf,
    },

    /// Export one source's items as a Linked Places FeatureCollection
    #[command(after_help = "\
Examples:
  sidebar export pleiades.sidebar.toml itinere
  sidebar export pleiades.sidebar.toml nomisma --use-cache -o nomisma.lpf.json")]
    Export {
        /// Path to the .sidebar.toml run configuration
        config: PathBuf,

        /// Source (config key) to export
        namespace: String,

        /// Load the parsed source from the dataset cache when present
        #[arg(long)]
        use_cache: bool,

        /// Dataset cache directory
        #[arg(long, env = "SIDEBAR_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Convert unreciprocated_*.json files into sibling CSV files
    #[command(name = "unrecip-csv")]
    #[command(after_help = "\
Examples:
  sidebar unrecip-csv sidebar/")]
    UnrecipCsv {
        /// Directory holding unreciprocated_<namespace>.json files
        dir: PathBuf,

        /// Canonical domain used to pick the pleiades_uri column
        #[arg(long, default_value = "pleiades.stoa.org")]
        domain: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose, cli.log_level.as_deref()) {
        eprintln!("error: {}", err.message);
        return ExitCode::from(err.code);
    }

    let result = match cli.command {
        Commands::Generate {
            config,
            namespaces,
            use_cache,
            cache_dir,
            pleiades_path,
            output,
            json,
        } => pipeline::cmd_generate(pipeline::GenerateArgs {
            config,
            namespaces,
            use_cache,
            cache_dir,
            pleiades_path,
            output,
            json,
        }),
        Commands::Validate { config } => pipeline::cmd_validate(config),
        Commands::Export {
            config,
            namespace,
            use_cache,
            cache_dir,
            output,
        } => pipeline::cmd_export(config, namespace, use_cache, cache_dir, output),
        Commands::UnrecipCsv { dir, domain } => pipeline::cmd_unrecip_csv(dir, domain),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` takes precedence over the
/// flags; with neither, only warnings and errors are shown.
fn init_logging(verbose: u8, log_level: Option<&str>) -> Result<(), CliError> {
    let fallback = match (log_level, verbose) {
        (Some(level), _) => level.to_string(),
        (None, 0) => "warn".to_string(),
        (None, 1) => "info".to_string(),
        (None, _) => "debug".to_string(),
    };

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&fallback).map_err(|e| {
            CliError::usage(format!("invalid log level '{fallback}': {e}"))
                .with_hint("use one of error, warn, info, debug, trace")
        })?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .try_init()
        .map_err(|e| CliError::new(exit_codes::EXIT_ERROR, format!("cannot install logger: {e}")))
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::UnknownAdapter { .. } => Some(format!(
                "known adapters: {}",
                sidebar_recon::AdapterRegistry::builtin().names().collect::<Vec<_>>().join(", ")
            )),
            ReconError::UnknownNamespace { abbrev, .. } => Some(format!(
                "add `{abbrev} = \"<base uri>\"` or `{abbrev} = \"unsupported\"` under [namespaces]"
            )),
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        Self::new(io_exit_code(&err), err.to_string())
    }
}
