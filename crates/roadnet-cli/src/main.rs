//! roadnet CLI - drive the road editing core from the command line

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, replay, synthesize};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roadnet")]
#[command(about = "Road network geometry and transactional editing", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a reference line from control points
    Synthesize {
        /// Path to a TOML file with `points` (and optionally `category`)
        points: String,

        /// Output format (json or toml)
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file (defaults to the layered config)
        #[arg(long)]
        config: Option<String>,
    },

    /// Run an edit script and print the resulting export snapshot
    Replay {
        /// Path to the TOML script
        script: String,

        /// Config file (defaults to the layered config)
        #[arg(long)]
        config: Option<String>,
    },

    /// Print the resolved configuration
    Config {
        /// Config file (defaults to the layered config)
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Synthesize {
            points,
            format,
            config,
        } => synthesize::run(&points, &format, config.as_deref()),
        Commands::Replay { script, config } => replay::run(&script, config.as_deref()),
        Commands::Config { config } => config::run(config.as_deref()),
    }
}
