//! rankcast CLI: render a leaderboard and stream it as live video.
//!
//! Usage:
//!   rankcast run                 Refresh the image and stream it until stopped
//!   rankcast render [--output]   Render the leaderboard once
//!   rankcast standings [--top]   Print the current standings as JSON
//!   rankcast check               Check encoder, assets and ranking store
//!   rankcast init [--output]     Write a default configuration file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use rankcast_common::config::AppConfig;

mod commands;
mod pipeline;

#[derive(Parser)]
#[command(
    name = "rankcast",
    about = "Render a leaderboard to an image and stream it over RTMP",
    version,
    author
)]
struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/rankcast/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the leaderboard image on an interval and stream it
    Run,

    /// Fetch standings and render the image once
    Render {
        /// Write the image here instead of the configured path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the ranked standings as JSON
    Standings {
        /// Number of rows (default: render.top_n)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Check encoder, font, backgrounds and ranking store
    Check,

    /// Write a default configuration file
    Init {
        /// Destination (default: the standard config location)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => Ok(AppConfig::load_from(path)?),
        None => Ok(AppConfig::load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `init` must work without a readable config.
    let mut config = match &cli.command {
        Commands::Init { .. } => AppConfig::default(),
        _ => load_config(cli.config.as_ref())?,
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    rankcast_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Run => commands::run::run(config).await,
        Commands::Render { output } => commands::render::run(config, output).await,
        Commands::Standings { top } => commands::standings::run(config, top).await,
        Commands::Check => commands::check::run(config).await,
        Commands::Init { output, force } => commands::init::run(output, force),
    }
}
