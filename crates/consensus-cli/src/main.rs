//! Oracle CLI - resolve consensus rounds from JSON files

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use consensus_core::{Oracle, OracleConfig, RoundInput};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oracle")]
#[command(about = "Weighted-consensus oracle - resolve votes into outcomes and reputation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Resolve a round and print the report as JSON
    Resolve {
        /// Round file (JSON)
        #[arg(short, long)]
        input: PathBuf,
        /// Configuration file path (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },
    /// Validate a round without resolving it
    Check {
        /// Round file (JSON)
        #[arg(short, long)]
        input: PathBuf,
        /// Configuration file path (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the default configuration as TOML
    Defaults,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Resolve {
            input,
            config,
            pretty,
        }) => {
            let oracle = load_oracle(config.as_deref())?;
            let round = load_round(&input)?;
            let report = oracle
                .resolve(&round)
                .with_context(|| format!("failed to resolve {}", input.display()))?;
            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", json);
        }
        Some(Commands::Check { input, config }) => {
            let oracle = load_oracle(config.as_deref())?;
            let round = load_round(&input)?;
            oracle
                .check(&round)
                .with_context(|| format!("{} is not a valid round", input.display()))?;
            let decisions = round.votes.first().map_or(0, Vec::len);
            println!(
                "OK: {} reporters, {} decisions",
                round.votes.len(),
                decisions
            );
        }
        Some(Commands::Defaults) => {
            print!("{}", toml::to_string(&OracleConfig::default())?);
        }
        None => {
            println!("oracle v{} - Use --help for commands", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn load_oracle(path: Option<&Path>) -> anyhow::Result<Oracle> {
    let config = match path {
        Some(path) => OracleConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => OracleConfig::default(),
    };
    info!(catch_p = config.catch_p, alpha = config.alpha, "configuration loaded");
    Ok(Oracle::new(config)?)
}

fn load_round(path: &Path) -> anyhow::Result<RoundInput> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}
