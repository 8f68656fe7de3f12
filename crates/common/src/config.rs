//! tlverify configuration
//!
//! Every option has a default, so an absent config file is equivalent to:
//!
//! ```toml
//! [assets]
//! sources = ["data/kingsData.ts", "data/partData.ts"]
//! directory = "public/images"
//! field = "imageUrl"
//! extensions = ["ts", "tsx", "js", "jsx", "json"]
//! skip_remote = false
//! report_unreferenced = false
//!
//! [browser]
//! base_url = "http://localhost:4173/TimelineHistory/"
//! artifact_dir = "verification"
//! headless = true
//! viewport_width = 1280
//! viewport_height = 720
//! node_binary = "node"
//! working_dir = "."
//! action_timeout_ms = 30000
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "tlverify.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Static asset reference check
    pub assets: AssetsConfig,

    /// Browser interaction check
    pub browser: BrowserConfig,
}

/// Options for the asset reference check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Data sources to scan, in order. Directories are walked.
    pub sources: Vec<PathBuf>,

    /// Directory whose filenames are the ground truth
    pub directory: PathBuf,

    /// Field whose quoted value is an image reference
    pub field: String,

    /// File extensions picked up when a source is a directory
    pub extensions: Vec<String>,

    /// Leave http(s) references out of the comparison
    pub skip_remote: bool,

    /// Also list files in the directory that nothing references
    pub report_unreferenced: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                PathBuf::from("data/kingsData.ts"),
                PathBuf::from("data/partData.ts"),
            ],
            directory: PathBuf::from("public/images"),
            field: "imageUrl".to_string(),
            extensions: ["ts", "tsx", "js", "jsx", "json"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            skip_remote: false,
            report_unreferenced: false,
        }
    }
}

/// Options for the browser interaction check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Where the application is served
    pub base_url: String,

    /// YAML interaction script; the built-in walk-through when unset
    pub script: Option<PathBuf>,

    /// Directory relative screenshot paths are resolved against
    pub artifact_dir: PathBuf,

    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Node.js executable hosting Playwright
    pub node_binary: PathBuf,

    /// Directory whose node_modules provides `playwright`
    pub working_dir: PathBuf,

    /// Time allowed to find an element before a click fails. Matches
    /// Playwright's own default action timeout.
    pub action_timeout_ms: u64,

    /// Write the step report as JSON here
    pub results_path: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4173/TimelineHistory/".to_string(),
            script: None,
            artifact_dir: PathBuf::from("verification"),
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            node_binary: PathBuf::from("node"),
            working_dir: PathBuf::from("."),
            action_timeout_ms: 30_000,
            results_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.assets.field.trim().is_empty() {
            return Err(Error::InvalidConfig("assets.field must not be empty".to_string()));
        }
        if self.browser.action_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "browser.action_timeout_ms must be positive".to_string(),
            ));
        }
        if self.browser.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("browser.base_url must not be empty".to_string()));
        }
        Ok(())
    }
}
