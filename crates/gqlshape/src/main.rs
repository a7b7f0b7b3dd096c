mod commands;
mod config;
mod introspect;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// gqlshape: typed Rust response shapes for GraphQL operations
#[derive(Debug, Parser)]
#[command(name = "gqlshape", version, about)]
struct Cli {
    /// Config file (defaults to ./gqlshape.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate Rust types from a schema and query documents.
    Generate(commands::generate::GenerateCmd),
    /// Fetch a schema from a live endpoint and save it as SDL.
    Introspect(commands::introspect::IntrospectCmd),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = config::Config::load(cli.config.as_deref())
        .map_err(anyhow::Error::from)
        .and_then(|config| match cli.command {
            Command::Generate(cmd) => commands::generate::run(cmd, &config),
            Command::Introspect(cmd) => commands::introspect::run(cmd, &config),
        });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
