//! Playwright browser automation
//!
//! A [`PlaywrightSession`] owns a `node` child process running the
//! embedded bridge script. Requests go out as one JSON line on the
//! child's stdin; each gets exactly one JSON reply line on stdout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::session::BrowserSession;
use crate::spec::Locator;

const BRIDGE_SCRIPT: &str = include_str!("bridge.js");

/// Time the bridge gets to exit after a close request
const CLOSE_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::LaunchFailed(format!("unknown browser '{}'", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    /// Node.js executable
    pub node_binary: PathBuf,
    /// Directory whose node_modules provides `playwright`
    pub working_dir: PathBuf,
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Upper bound for locating an element before a click
    pub action_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            node_binary: PathBuf::from("node"),
            working_dir: PathBuf::from("."),
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout: Duration::from_secs(30),
        }
    }
}

/// Options handed to the bridge on its command line
#[derive(Debug, Serialize)]
struct LaunchOptions {
    browser: Browser,
    headless: bool,
    viewport_width: u32,
    viewport_height: u32,
}

/// A request sent to the bridge
#[derive(Debug, Serialize)]
pub(crate) struct BridgeRequest<'a> {
    pub id: u64,
    pub command: BridgeCommand<'a>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(crate) enum BridgeCommand<'a> {
    Navigate { url: &'a str },
    Click { target: &'a Locator, timeout_ms: u64 },
    WaitVisible { target: &'a Locator, timeout_ms: u64 },
    Scroll { dx: i64, dy: i64 },
    Screenshot { path: &'a Path, full_page: bool },
    Close,
}

/// A reply line from the bridge
#[derive(Debug, Deserialize)]
pub(crate) struct BridgeReply {
    #[serde(default)]
    pub id: Option<u64>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<BridgeFailure>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BridgeFailure {
    pub kind: FailureKind,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FailureKind {
    LaunchFailed,
    NavigationFailed,
    ElementNotFound,
    #[serde(other)]
    Other,
}

impl BridgeReply {
    /// Parse a reply line and check it answers request `id`
    pub(crate) fn parse(line: &str, id: u64, context: &str) -> E2eResult<()> {
        let reply: BridgeReply = serde_json::from_str(line).map_err(|e| {
            E2eError::Playwright(format!("unreadable bridge reply '{}': {}", line, e))
        })?;

        if reply.id != Some(id) {
            return Err(E2eError::Playwright(format!(
                "bridge replied to request {:?}, expected {}",
                reply.id, id
            )));
        }
        if reply.ok {
            return Ok(());
        }

        let failure = reply.error.unwrap_or(BridgeFailure {
            kind: FailureKind::Other,
            message: "no error detail".to_string(),
        });
        Err(match failure.kind {
            FailureKind::LaunchFailed => E2eError::LaunchFailed(failure.message),
            FailureKind::NavigationFailed => E2eError::NavigationFailed {
                url: context.to_string(),
                reason: failure.message,
            },
            FailureKind::ElementNotFound => E2eError::ElementNotFound(failure.message),
            FailureKind::Other => E2eError::Playwright(failure.message),
        })
    }
}

/// Browser session backed by the Playwright bridge process
pub struct PlaywrightSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    action_timeout: Duration,
    closed: bool,
    // Holds the staged bridge script until the session ends
    _script_dir: tempfile::TempDir,
}

impl PlaywrightSession {
    /// Spawn the bridge and wait for the browser to come up
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("tlverify-bridge.js");
        std::fs::write(&script_path, BRIDGE_SCRIPT)?;

        let options = serde_json::to_string(&LaunchOptions {
            browser: config.browser,
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
        })?;

        debug!("Launching Playwright bridge: {}", script_path.display());

        let mut child = Command::new(&config.node_binary)
            .arg(&script_path)
            .arg(options)
            .current_dir(&config.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    E2eError::NodeNotFound(config.node_binary.display().to_string())
                }
                _ => E2eError::LaunchFailed(e.to_string()),
            })?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::LaunchFailed("bridge stdout not captured".to_string()))?;

        let mut session = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            action_timeout: config.action_timeout,
            closed: false,
            _script_dir: script_dir,
        };

        // The bridge announces launch success or failure as reply 0.
        let ready = match session.read_reply_line().await {
            Ok(line) => BridgeReply::parse(&line, 0, "launch"),
            Err(E2eError::SessionClosedUnexpectedly(_)) => Err(E2eError::LaunchFailed(
                "bridge exited before the browser started".to_string(),
            )),
            Err(e) => Err(e),
        };
        if let Err(e) = ready {
            session.close().await.ok();
            return Err(match e {
                E2eError::LaunchFailed(_) => e,
                other => E2eError::LaunchFailed(other.to_string()),
            });
        }

        info!("Browser session started ({:?}, headless={})", config.browser, config.headless);
        Ok(session)
    }

    async fn read_reply_line(&mut self) -> E2eResult<String> {
        match self.stdout.next_line().await {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(E2eError::SessionClosedUnexpectedly(
                "bridge closed its output".to_string(),
            )),
            Err(e) => Err(E2eError::SessionClosedUnexpectedly(e.to_string())),
        }
    }

    async fn send(&mut self, request: &BridgeRequest<'_>) -> E2eResult<()> {
        let mut line = serde_json::to_string(request)?;
        line.push('\n');

        let stdin = self.stdin.as_mut().ok_or_else(|| {
            E2eError::SessionClosedUnexpectedly("session already closed".to_string())
        })?;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| E2eError::SessionClosedUnexpectedly(e.to_string()))?;
        stdin
            .flush()
            .await
            .map_err(|e| E2eError::SessionClosedUnexpectedly(e.to_string()))
    }

    /// Send one command and wait for its reply
    async fn request(&mut self, command: BridgeCommand<'_>, context: &str) -> E2eResult<()> {
        if self.closed {
            return Err(E2eError::SessionClosedUnexpectedly(
                "session already closed".to_string(),
            ));
        }

        let id = self.next_id;
        self.next_id += 1;

        self.send(&BridgeRequest { id, command }).await?;
        let line = self.read_reply_line().await?;
        BridgeReply::parse(&line, id, context)
    }

    fn timeout_ms(timeout: Duration) -> u64 {
        u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// SIGTERM first, then kill
    async fn terminate(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok()
                    && tokio::time::timeout(Duration::from_millis(500), self.child.wait())
                        .await
                        .is_ok()
                {
                    return;
                }
            }
        }

        if let Err(e) = self.child.kill().await {
            warn!("Failed to kill Playwright bridge: {}", e);
        }
    }
}

#[async_trait]
impl BrowserSession for PlaywrightSession {
    async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        self.request(BridgeCommand::Navigate { url }, url).await
    }

    async fn click(&mut self, target: &Locator) -> E2eResult<()> {
        let timeout_ms = Self::timeout_ms(self.action_timeout);
        self.request(BridgeCommand::Click { target, timeout_ms }, "click").await
    }

    async fn wait_visible(&mut self, target: &Locator, timeout: Duration) -> E2eResult<()> {
        let timeout_ms = Self::timeout_ms(timeout);
        self.request(BridgeCommand::WaitVisible { target, timeout_ms }, "wait").await
    }

    async fn scroll(&mut self, dx: i64, dy: i64) -> E2eResult<()> {
        self.request(BridgeCommand::Scroll { dx, dy }, "scroll").await
    }

    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()> {
        self.request(BridgeCommand::Screenshot { path, full_page }, "screenshot").await
    }

    async fn close(&mut self) -> E2eResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // A dead bridge cannot take the request; reaping it below is enough.
        let id = self.next_id;
        if let Err(e) = self.send(&BridgeRequest { id, command: BridgeCommand::Close }).await {
            debug!("Close request not delivered: {}", e);
        }
        self.stdin = None;

        match tokio::time::timeout(CLOSE_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!("Playwright bridge exited with {}", status);
            }
            Ok(Err(e)) => {
                warn!("Waiting for Playwright bridge failed: {}", e);
                self.terminate().await;
            }
            Err(_) => {
                warn!("Playwright bridge did not exit within {:?}; terminating", CLOSE_GRACE);
                self.terminate().await;
            }
        }

        info!("Browser session closed");
        Ok(())
    }
}

impl Drop for PlaywrightSession {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.child.start_kill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let target = Locator::selector("h3").with_text("Mauryan Empire");
        let request = BridgeRequest {
            id: 3,
            command: BridgeCommand::Click { target: &target, timeout_ms: 5000 },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 3,
                "command": {
                    "op": "click",
                    "target": { "selector": "h3", "text": "Mauryan Empire", "nth": 0 },
                    "timeout_ms": 5000
                }
            })
        );

        let close = serde_json::to_value(BridgeRequest { id: 9, command: BridgeCommand::Close }).unwrap();
        assert_eq!(close, serde_json::json!({ "id": 9, "command": { "op": "close" } }));
    }

    #[test]
    fn test_reply_ok() {
        BridgeReply::parse(r#"{"id":4,"ok":true}"#, 4, "x").unwrap();
    }

    #[test]
    fn test_reply_id_mismatch() {
        let err = BridgeReply::parse(r#"{"id":5,"ok":true}"#, 4, "x").unwrap_err();
        assert!(matches!(err, E2eError::Playwright(_)));
    }

    #[test]
    fn test_reply_failure_kinds() {
        let err = BridgeReply::parse(
            r#"{"id":1,"ok":false,"error":{"kind":"navigation_failed","message":"net::ERR_CONNECTION_REFUSED"}}"#,
            1,
            "http://localhost:4173/TimelineHistory/",
        )
        .unwrap_err();
        match err {
            E2eError::NavigationFailed { url, reason } => {
                assert_eq!(url, "http://localhost:4173/TimelineHistory/");
                assert!(reason.contains("ERR_CONNECTION_REFUSED"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = BridgeReply::parse(
            r#"{"id":2,"ok":false,"error":{"kind":"element_not_found","message":"h3"}}"#,
            2,
            "click",
        )
        .unwrap_err();
        assert!(matches!(err, E2eError::ElementNotFound(_)));

        let err = BridgeReply::parse(
            r#"{"id":2,"ok":false,"error":{"kind":"something_new","message":"boom"}}"#,
            2,
            "click",
        )
        .unwrap_err();
        assert!(matches!(err, E2eError::Playwright(ref m) if m == "boom"));
    }

    #[test]
    fn test_reply_garbage() {
        let err = BridgeReply::parse("Debugger attached.", 1, "x").unwrap_err();
        assert!(matches!(err, E2eError::Playwright(_)));
    }

    #[test]
    fn test_browser_from_str() {
        assert_eq!("webkit".parse::<Browser>().unwrap(), Browser::Webkit);
        assert!("safari".parse::<Browser>().is_err());
    }

    #[tokio::test]
    async fn test_missing_node_binary() {
        let config = PlaywrightConfig {
            node_binary: PathBuf::from("/nonexistent/tlverify-node"),
            ..Default::default()
        };
        let err = PlaywrightSession::launch(&config).await.err().unwrap();
        assert!(matches!(err, E2eError::NodeNotFound(_)));
    }
}
