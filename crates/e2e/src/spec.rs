//! Declarative YAML interaction scripts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{E2eError, E2eResult};

/// An ordered interaction script parsed from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionScript {
    /// Unique name for this script
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Steps to execute in order
    pub steps: Vec<InteractionStep>,
}

/// How a step finds its element.
///
/// `selector` alone matches a structural selector, `text` alone matches
/// visible text, and both together match the selector filtered by text.
/// When several elements match, `nth` picks one by document order; the
/// default of 0 is the first match.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Locator {
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub nth: usize,
}

impl Locator {
    pub fn selector(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Default::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn nth(mut self, nth: usize) -> Self {
        self.nth = nth;
        self
    }

    fn validate(&self) -> E2eResult<()> {
        let empty = |s: &Option<String>| s.as_deref().map_or(true, |s| s.trim().is_empty());
        if empty(&self.selector) && empty(&self.text) {
            return Err(E2eError::ScriptParse(
                "locator needs a selector, a text, or both".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.selector, &self.text) {
            (Some(sel), Some(text)) => write!(f, "{} >> text=\"{}\"", sel, text)?,
            (Some(sel), None) => write!(f, "{}", sel)?,
            (None, Some(text)) => write!(f, "text=\"{}\"", text)?,
            (None, None) => write!(f, "<empty>")?,
        }
        if self.nth > 0 {
            write!(f, " [nth={}]", self.nth)?;
        }
        Ok(())
    }
}

/// A single step in a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InteractionStep {
    /// Navigate to a URL; relative URLs are joined to the base URL
    Navigate {
        #[serde(default)]
        url: String,
    },

    /// Click the element picked by `target`
    Click { target: Locator },

    /// Pause for `ms`, or with `until` set, wait up to `ms` for it to be visible
    Wait {
        ms: u64,
        #[serde(default)]
        until: Option<Locator>,
    },

    /// Mouse wheel scroll
    Scroll {
        #[serde(default)]
        dx: i64,
        #[serde(default)]
        dy: i64,
    },

    /// Capture the viewport (or full page) to `path`
    Screenshot {
        path: PathBuf,
        #[serde(default)]
        full_page: bool,
    },
}

impl InteractionStep {
    /// Short name used in logs and errors
    pub fn name(&self) -> String {
        match self {
            InteractionStep::Navigate { url } if url.is_empty() => "navigate:<base>".to_string(),
            InteractionStep::Navigate { url } => format!("navigate:{}", url),
            InteractionStep::Click { target } => format!("click:{}", target),
            InteractionStep::Wait { ms, until: None } => format!("wait:{}ms", ms),
            InteractionStep::Wait { ms, until: Some(target) } => {
                format!("wait:{} (<= {}ms)", target, ms)
            }
            InteractionStep::Scroll { dx, dy } => format!("scroll:{},{}", dx, dy),
            InteractionStep::Screenshot { path, .. } => format!("screenshot:{}", path.display()),
        }
    }
}

impl InteractionScript {
    /// Parse a script from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let script: Self = serde_yaml::from_str(yaml)?;
        script.validate()?;
        Ok(script)
    }

    /// Parse a script from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.steps.is_empty() {
            return Err(E2eError::ScriptParse(format!("script '{}' has no steps", self.name)));
        }
        for (i, step) in self.steps.iter().enumerate() {
            let target = match step {
                InteractionStep::Click { target } => Some(target),
                InteractionStep::Wait { until, .. } => until.as_ref(),
                _ => None,
            };
            if let Some(target) = target {
                target.validate().map_err(|e| {
                    E2eError::ScriptParse(format!("step {} ({}): {}", i + 1, step.name(), e))
                })?;
            }
        }
        Ok(())
    }

    /// The glossary highlighter walk-through: open the Mauryan Empire era
    /// from its dashboard card, then the Ashoka entry, with fixed settle
    /// times between steps.
    pub fn highlighter() -> Self {
        Self {
            name: "glossary-highlighter".to_string(),
            description: "Era card to era detail to king detail, capturing highlighted terms"
                .to_string(),
            steps: vec![
                InteractionStep::Navigate { url: String::new() },
                InteractionStep::Wait { ms: 3000, until: None },
                InteractionStep::Click {
                    target: Locator::selector("h3").with_text("Mauryan Empire"),
                },
                InteractionStep::Wait { ms: 2000, until: None },
                InteractionStep::Scroll { dx: 0, dy: 500 },
                InteractionStep::Wait { ms: 1000, until: None },
                InteractionStep::Screenshot {
                    path: PathBuf::from("mauryan_highlight.png"),
                    full_page: false,
                },
                InteractionStep::Click {
                    target: Locator::text("Ashoka the Great"),
                },
                InteractionStep::Wait { ms: 2000, until: None },
                InteractionStep::Screenshot {
                    path: PathBuf::from("ashoka_highlight.png"),
                    full_page: false,
                },
            ],
        }
    }
}
