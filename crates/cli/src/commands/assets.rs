//! Asset reference check
//!
//! Extracts image references from the configured data sources and checks
//! each basename against the asset directory.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

use tlverify_common::{check_assets, AssetsConfig, Config};

use super::Outcome;
use crate::output::{render_asset_report, OutputFormat};

#[derive(Args, Debug, Default)]
pub struct AssetsArgs {
    /// Data source to scan; repeat for several. Replaces the configured list.
    #[arg(short, long = "source")]
    pub sources: Vec<PathBuf>,

    /// Asset directory holding the image files
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Field whose quoted value is an image reference
    #[arg(short, long)]
    pub field: Option<String>,

    /// Leave http(s) references out of the check
    #[arg(long)]
    pub skip_remote: bool,

    /// Also list image files that nothing references
    #[arg(long)]
    pub unreferenced: bool,
}

impl AssetsArgs {
    /// Apply flags on top of the file configuration
    pub fn apply(&self, mut config: AssetsConfig) -> AssetsConfig {
        if !self.sources.is_empty() {
            config.sources = self.sources.clone();
        }
        if let Some(dir) = &self.dir {
            config.directory = dir.clone();
        }
        if let Some(field) = &self.field {
            config.field = field.clone();
        }
        config.skip_remote |= self.skip_remote;
        config.report_unreferenced |= self.unreferenced;
        config
    }
}

pub fn execute(args: AssetsArgs, config: &Config, format: OutputFormat) -> Result<Outcome> {
    let assets = args.apply(config.assets.clone());
    debug!(
        "Scanning {} source(s) for '{}' against {}",
        assets.sources.len(),
        assets.field,
        assets.directory.display()
    );

    let report = check_assets(&assets)?;
    println!("{}", render_asset_report(&report, format));

    Ok(if report.is_success() {
        Outcome::Passed
    } else {
        Outcome::Failed
    })
}
