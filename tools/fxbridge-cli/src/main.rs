//! fxbridge CLI - inspect authoring exports and drive a native particle engine
//!
//! # Commands
//!
//! - `fxbridge inspect` - assemble an authoring export and print the result
//! - `fxbridge simulate` - run emitters through the frame loop for N frames
//! - `fxbridge check-config` - validate a bridge config, or write the default
//!
//! # Usage
//!
//! ```bash
//! # Show what the native engine would receive for an export
//! fxbridge inspect fire.json
//!
//! # Full record as JSON
//! fxbridge inspect fire.json --json
//!
//! # Drive three copies of an emitter for 120 frames on the headless engine
//! fxbridge simulate fire.json --count 3 --frames 120
//! ```

mod check_config;
mod inspect;
mod simulate;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use fxbridge_core::BridgeConfig;

/// fxbridge - authoring-to-native particle bridge tools
#[derive(Parser)]
#[command(name = "fxbridge")]
#[command(about = "Inspect authoring exports and drive emitters against a native particle engine")]
#[command(version)]
struct Cli {
    /// Bridge config file (defaults apply when it does not exist)
    #[arg(short, long, global = true, default_value = "fxbridge.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble an authoring export and print the native record
    Inspect(inspect::InspectArgs),

    /// Run emitters through the frame loop
    Simulate(simulate::SimulateArgs),

    /// Validate the bridge config
    CheckConfig(check_config::CheckConfigArgs),
}

fn init_logging(config: &BridgeConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .init();
}

fn load_config(path: &Path) -> Result<BridgeConfig> {
    let config = BridgeConfig::load_or_default(path)?;
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.command {
        // check-config reports on a broken file instead of failing up front
        Commands::CheckConfig(args) => {
            init_logging(&BridgeConfig::default());
            return check_config::execute(&cli.config, args);
        }
        _ => load_config(&cli.config)?,
    };
    init_logging(&config);

    match cli.command {
        Commands::Inspect(args) => inspect::execute(&config, args),
        Commands::Simulate(args) => simulate::execute(&config, args),
        Commands::CheckConfig(_) => Ok(()),
    }
}
