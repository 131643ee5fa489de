//! CobbleMind CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize the config file
//! - `run`     — Connect to the sidecar and start the whisper loop
//! - `send`    — Drive a single whisper through one conversation
//! - `doctor`  — Diagnose gateway and sidecar health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cobblemind",
    about = "CobbleMind — a whisper-driven Minecraft agent runtime",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the configuration file
    Onboard,

    /// Connect to the game sidecar and process whispers until Ctrl-C
    Run,

    /// Drive a single whisper through one conversation and exit
    Send {
        /// The player the whisper is from
        originator: String,

        /// The whisper text
        text: String,
    },

    /// Diagnose gateway and sidecar health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Run => commands::run::run().await?,
        Commands::Send { originator, text } => commands::send::run(originator, text).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
