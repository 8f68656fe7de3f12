//! Interaction driver: runs a script against a browser session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::session::BrowserSession;
use crate::spec::{InteractionScript, InteractionStep};

/// Result of a completed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// 1-based position in the script
    pub index: usize,
    pub step_name: String,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_sha256: Option<String>,
}

/// Steps completed by a run, plus the error that stopped it, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub script: String,
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    /// Screenshots written during the run, in step order
    pub fn screenshots(&self) -> impl Iterator<Item = &Path> {
        self.steps.iter().filter_map(|s| s.screenshot_path.as_deref())
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> E2eResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Results written to: {}", path.display());
        Ok(())
    }
}

/// Runs interaction scripts one step at a time
#[derive(Debug, Clone)]
pub struct InteractionDriver {
    base_url: String,
    artifact_dir: PathBuf,
}

impl InteractionDriver {
    pub fn new(base_url: impl Into<String>, artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            artifact_dir: artifact_dir.into(),
        }
    }

    /// Absolute URLs pass through; anything else is joined to the base URL
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        if url.is_empty() {
            return self.base_url.clone();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }

    /// Relative screenshot paths land in the artifact directory
    pub fn resolve_artifact(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.artifact_dir.join(path)
        }
    }

    /// Run `script` against `session`, closing the session on every exit path.
    ///
    /// Stops at the first failing step; the error names that step and is
    /// returned only after the session has been closed.
    pub async fn run<S>(&self, session: &mut S, script: &InteractionScript) -> E2eResult<RunReport>
    where
        S: BrowserSession + ?Sized,
    {
        let (report, outcome) = self.run_recorded(session, script).await;
        outcome.map(|()| report)
    }

    /// Like [`Self::run`], but the report of the completed steps is kept
    /// when a step fails. Its `failure` field carries the error text.
    pub async fn run_recorded<S>(
        &self,
        session: &mut S,
        script: &InteractionScript,
    ) -> (RunReport, E2eResult<()>)
    where
        S: BrowserSession + ?Sized,
    {
        info!("Running '{}' ({} steps) against {}", script.name, script.steps.len(), self.base_url);

        let started_at = Utc::now();
        let start = Instant::now();
        let mut steps = Vec::with_capacity(script.steps.len());

        let outcome = self.run_steps(session, script, &mut steps).await;
        let closed = session.close().await;

        let outcome = match (outcome, closed) {
            (Err(e), Err(close_err)) => {
                warn!("Closing the session after a failed step also failed: {}", close_err);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), closed) => closed,
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        if outcome.is_ok() {
            info!("✓ {} ({} ms)", script.name, duration_ms);
        }

        let report = RunReport {
            script: script.name.clone(),
            base_url: self.base_url.clone(),
            started_at,
            duration_ms,
            steps,
            failure: outcome.as_ref().err().map(|e| e.to_string()),
        };
        (report, outcome)
    }

    async fn run_steps<S>(
        &self,
        session: &mut S,
        script: &InteractionScript,
        results: &mut Vec<StepResult>,
    ) -> E2eResult<()>
    where
        S: BrowserSession + ?Sized,
    {
        for (i, step) in script.steps.iter().enumerate() {
            let index = i + 1;
            let step_name = step.name();
            debug!("Step {}/{}: {}", index, script.steps.len(), step_name);

            let start = Instant::now();
            let screenshot_path = match self.execute_step(session, step).await {
                Ok(path) => path,
                Err(e) => {
                    error!("✗ step {} ({}) - {}", index, step_name, e);
                    return Err(E2eError::StepFailed {
                        index,
                        step: step_name,
                        source: Box::new(e),
                    });
                }
            };

            let screenshot_sha256 = screenshot_path.as_deref().and_then(hash_artifact);
            results.push(StepResult {
                index,
                step_name,
                duration_ms: start.elapsed().as_millis() as u64,
                screenshot_path,
                screenshot_sha256,
            });
        }
        Ok(())
    }

    /// Execute a single step; returns the artifact path for screenshots
    async fn execute_step<S>(&self, session: &mut S, step: &InteractionStep) -> E2eResult<Option<PathBuf>>
    where
        S: BrowserSession + ?Sized,
    {
        match step {
            InteractionStep::Navigate { url } => {
                session.navigate(&self.resolve_url(url)).await?;
                Ok(None)
            }
            InteractionStep::Click { target } => {
                session.click(target).await?;
                Ok(None)
            }
            InteractionStep::Wait { ms, until: None } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(None)
            }
            InteractionStep::Wait { ms, until: Some(target) } => {
                session.wait_visible(target, Duration::from_millis(*ms)).await?;
                Ok(None)
            }
            InteractionStep::Scroll { dx, dy } => {
                session.scroll(*dx, *dy).await?;
                Ok(None)
            }
            InteractionStep::Screenshot { path, full_page } => {
                let path = self.resolve_artifact(path);
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                session.screenshot(&path, *full_page).await?;
                Ok(Some(path))
            }
        }
    }
}

/// SHA-256 of a written artifact; capture is best-effort, so a missing file is not an error
fn hash_artifact(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(hex::encode(Sha256::digest(&bytes))),
        Err(e) => {
            debug!("Could not hash {}: {}", path.display(), e);
            None
        }
    }
}
