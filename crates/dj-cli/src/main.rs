//! # djs CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dj_cli::{inspect, validate};
use tracing_subscriber::EnvFilter;

/// DataJunction schema tool.
///
/// Validates API payloads against the DataJunction model declarations and
/// inspects the declarations themselves.
#[derive(Parser, Debug)]
#[command(name = "djs", version, about)]
struct Cli {
    /// Extra declaration directory merged into the built-in models.
    #[arg(long, global = true, env = "DJS_SCHEMA_DIR")]
    schemas: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate a JSON or YAML payload against a named model.
    Validate(validate::ValidateArgs),
    /// List registered schema names.
    List,
    /// Print the declaration summary of a schema.
    Show(inspect::ModelArgs),
    /// Print typed-wrapper Rust source for a composite.
    Codegen(inspect::ModelArgs),
}

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let registry = dj_cli::load_registry(cli.schemas.as_deref())?;
    let mut out = io::stdout().lock();

    match &cli.command {
        Commands::Validate(args) => {
            if !validate::run(args, &registry, &mut out)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::List => inspect::list(&registry, &mut out)?,
        Commands::Show(args) => inspect::show(args, &registry, &mut out)?,
        Commands::Codegen(args) => inspect::codegen(args, &registry, &mut out)?,
    }

    Ok(ExitCode::SUCCESS)
}
