//! Error types for browser interaction checks

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Node.js not found at '{0}'. Install Node.js and run: npx playwright install chromium")]
    NodeNotFound(String),

    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Navigation to {url} failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Browser session closed unexpectedly: {0}")]
    SessionClosedUnexpectedly(String),

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Interaction script error: {0}")]
    ScriptParse(String),

    #[error("Step {index} ({step}) failed: {source}")]
    StepFailed {
        index: usize,
        step: String,
        #[source]
        source: Box<E2eError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl E2eError {
    /// The underlying error, looking through a step wrapper
    pub fn root(&self) -> &E2eError {
        match self {
            E2eError::StepFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// 1-based index of the failing step, if this came from a step
    pub fn step_index(&self) -> Option<usize> {
        match self {
            E2eError::StepFailed { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
