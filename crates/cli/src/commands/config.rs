//! Configuration commands

use anyhow::Result;
use clap::Subcommand;

use tlverify_common::Config;

use crate::output::OutputFormat;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (file values over defaults)
    Show,
}

pub fn execute(cmd: ConfigCommands, config: &Config, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(config)?,
                _ => config.to_toml()?,
            };
            println!("{}", rendered);
        }
    }
    Ok(())
}
