//! Browser interaction check
//!
//! Launches a headless browser through the Playwright bridge, runs the
//! interaction script against the running app and saves screenshots.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use tlverify_common::{BrowserConfig, Config};
use tlverify_e2e::{
    Browser, InteractionDriver, InteractionScript, PlaywrightConfig, PlaywrightSession,
};

use super::Outcome;
use crate::output::{print_error, render_run_report, OutputFormat};

#[derive(Args, Debug, Default)]
pub struct InteractArgs {
    /// Base URL of the running app
    #[arg(long, env = "TLVERIFY_BASE_URL")]
    pub base_url: Option<String>,

    /// YAML interaction script (default: built-in highlighter walk-through)
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Directory for screenshots with relative paths
    #[arg(long)]
    pub artifact_dir: Option<PathBuf>,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    pub browser: String,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Node.js executable
    #[arg(long)]
    pub node: Option<PathBuf>,

    /// Directory whose node_modules provides playwright
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Write the step report as JSON to this path
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// Time allowed to find an element before a click fails [default: 30000]
    #[arg(long)]
    pub action_timeout_ms: Option<u64>,
}

impl InteractArgs {
    /// Apply flags on top of the file configuration
    pub fn apply(&self, mut config: BrowserConfig) -> BrowserConfig {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(script) = &self.script {
            config.script = Some(script.clone());
        }
        if let Some(dir) = &self.artifact_dir {
            config.artifact_dir = dir.clone();
        }
        if self.headed {
            config.headless = false;
        }
        if let Some(node) = &self.node {
            config.node_binary = node.clone();
        }
        if let Some(dir) = &self.working_dir {
            config.working_dir = dir.clone();
        }
        if let Some(ms) = self.action_timeout_ms {
            config.action_timeout_ms = ms;
        }
        if let Some(results) = &self.results {
            config.results_path = Some(results.clone());
        }
        config
    }
}

fn load_script(config: &BrowserConfig) -> Result<InteractionScript> {
    match &config.script {
        Some(path) => InteractionScript::from_file(path)
            .with_context(|| format!("Failed to load interaction script {}", path.display())),
        None => Ok(InteractionScript::highlighter()),
    }
}

pub async fn execute(args: InteractArgs, config: &Config, format: OutputFormat) -> Result<Outcome> {
    let browser_config = args.apply(config.browser.clone());
    let script = load_script(&browser_config)?;

    let playwright = PlaywrightConfig {
        node_binary: browser_config.node_binary.clone(),
        working_dir: browser_config.working_dir.clone(),
        browser: args.browser.parse::<Browser>()?,
        headless: browser_config.headless,
        viewport_width: browser_config.viewport_width,
        viewport_height: browser_config.viewport_height,
        action_timeout: Duration::from_millis(browser_config.action_timeout_ms),
    };

    let driver = InteractionDriver::new(&browser_config.base_url, &browser_config.artifact_dir);

    // Launch failures are setup errors, not check failures.
    let mut session = PlaywrightSession::launch(&playwright).await?;

    let (report, outcome) = driver.run_recorded(&mut session, &script).await;

    // Written on failure too, so the completed steps are kept.
    if let Some(path) = &browser_config.results_path {
        report.write_json(path)?;
    }

    match outcome {
        Ok(()) => {
            println!("{}", render_run_report(&report, format));
            Ok(Outcome::Passed)
        }
        Err(e) => {
            info!("Interaction check stopped at step {:?}", e.step_index());
            print_error(&e.to_string());
            Ok(Outcome::Failed)
        }
    }
}
