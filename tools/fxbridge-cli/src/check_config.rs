//! Check-config command - validate a bridge config or write the default one

use std::path::Path;

use anyhow::{Result, bail};
use clap::Args;
use fxbridge_core::BridgeConfig;

/// Arguments for the check-config command
#[derive(Args)]
pub struct CheckConfigArgs {
    /// Write the default config when the file does not exist
    #[arg(long)]
    pub init: bool,

    /// Print the effective config
    #[arg(long)]
    pub print: bool,
}

/// Execute the check-config command
pub fn execute(path: &Path, args: CheckConfigArgs) -> Result<()> {
    if !path.exists() {
        if !args.init {
            bail!(
                "{} does not exist (run with --init to create it)",
                path.display()
            );
        }
        BridgeConfig::default().save(path)?;
        println!("Wrote default config to {}", path.display());
    }

    let config = BridgeConfig::load(path)?;
    config.validate()?;
    tracing::info!("Config {} is valid", path.display());

    if args.print {
        print!("{}", config.to_toml_string()?);
    }
    Ok(())
}
