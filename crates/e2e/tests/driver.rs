//! Driver behaviour against an in-memory browser session
//!
//! The recording session stands in for Playwright so step ordering,
//! wait timing and cleanup on failure can be checked without a browser.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;

use tlverify_e2e::{
    BrowserSession, E2eError, E2eResult, InteractionDriver, InteractionScript, InteractionStep,
    Locator,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Navigate(String),
    Click(Locator),
    WaitVisible(Locator, Duration),
    Scroll(i64, i64),
    Screenshot(PathBuf, bool),
}

/// Records every call with the (paused) clock offset it happened at
struct RecordingSession {
    origin: Instant,
    calls: Vec<(Duration, Call)>,
    /// Locators that match nothing
    absent: Vec<Locator>,
    unreachable: bool,
    close_calls: usize,
    fail_close: bool,
}

impl RecordingSession {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            calls: Vec::new(),
            absent: Vec::new(),
            unreachable: false,
            close_calls: 0,
            fail_close: false,
        }
    }

    fn record(&mut self, call: Call) {
        self.calls.push((self.origin.elapsed(), call));
    }

    fn calls(&self) -> Vec<&Call> {
        self.calls.iter().map(|(_, c)| c).collect()
    }
}

#[async_trait]
impl BrowserSession for RecordingSession {
    async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        self.record(Call::Navigate(url.to_string()));
        if self.unreachable {
            return Err(E2eError::NavigationFailed {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }
        Ok(())
    }

    async fn click(&mut self, target: &Locator) -> E2eResult<()> {
        self.record(Call::Click(target.clone()));
        if self.absent.contains(target) {
            return Err(E2eError::ElementNotFound(target.to_string()));
        }
        Ok(())
    }

    async fn wait_visible(&mut self, target: &Locator, timeout: Duration) -> E2eResult<()> {
        self.record(Call::WaitVisible(target.clone(), timeout));
        if self.absent.contains(target) {
            tokio::time::sleep(timeout).await;
            return Err(E2eError::ElementNotFound(target.to_string()));
        }
        Ok(())
    }

    async fn scroll(&mut self, dx: i64, dy: i64) -> E2eResult<()> {
        self.record(Call::Scroll(dx, dy));
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()> {
        self.record(Call::Screenshot(path.to_path_buf(), full_page));
        std::fs::write(path, b"\x89PNG")?;
        Ok(())
    }

    async fn close(&mut self) -> E2eResult<()> {
        self.close_calls += 1;
        if self.fail_close {
            return Err(E2eError::SessionClosedUnexpectedly("bridge already gone".to_string()));
        }
        Ok(())
    }
}

fn five_step_script() -> InteractionScript {
    InteractionScript {
        name: "five".to_string(),
        description: String::new(),
        steps: vec![
            InteractionStep::Navigate { url: String::new() },
            InteractionStep::Click { target: Locator::selector(".group.relative") },
            InteractionStep::Wait { ms: 2000, until: None },
            InteractionStep::Scroll { dx: 0, dy: 500 },
            InteractionStep::Screenshot { path: PathBuf::from("era_detail.png"), full_page: false },
        ],
    }
}

const BASE_URL: &str = "http://localhost:4173/TimelineHistory/";

#[tokio::test(start_paused = true)]
async fn highlighter_script_runs_in_order_with_its_waits() {
    let artifacts = tempfile::tempdir().unwrap();
    let driver = InteractionDriver::new(BASE_URL, artifacts.path());
    let mut session = RecordingSession::new();

    let report = driver
        .run(&mut session, &InteractionScript::highlighter())
        .await
        .unwrap();

    let mauryan = artifacts.path().join("mauryan_highlight.png");
    let ashoka = artifacts.path().join("ashoka_highlight.png");

    let expected = vec![
        (Duration::from_millis(0), Call::Navigate(BASE_URL.to_string())),
        (
            Duration::from_millis(3000),
            Call::Click(Locator::selector("h3").with_text("Mauryan Empire")),
        ),
        (Duration::from_millis(5000), Call::Scroll(0, 500)),
        (Duration::from_millis(6000), Call::Screenshot(mauryan.clone(), false)),
        (Duration::from_millis(6000), Call::Click(Locator::text("Ashoka the Great"))),
        (Duration::from_millis(8000), Call::Screenshot(ashoka.clone(), false)),
    ];
    assert_eq!(session.calls, expected);
    assert_eq!(session.close_calls, 1);

    assert_eq!(report.steps.len(), 10);
    let shots: Vec<&Path> = report.screenshots().collect();
    assert_eq!(shots, vec![mauryan.as_path(), ashoka.as_path()]);
    assert!(report.steps[6].screenshot_sha256.is_some());
}

#[tokio::test(start_paused = true)]
async fn element_not_found_stops_the_run_and_closes_the_session() {
    let artifacts = tempfile::tempdir().unwrap();
    let driver = InteractionDriver::new(BASE_URL, artifacts.path());
    let mut session = RecordingSession::new();
    session.absent.push(Locator::selector(".group.relative"));

    let err = driver.run(&mut session, &five_step_script()).await.unwrap_err();

    assert_eq!(err.step_index(), Some(2));
    assert!(matches!(err.root(), E2eError::ElementNotFound(_)));
    assert!(err.to_string().starts_with("Step 2 (click:.group.relative) failed"));

    // Steps 3-5 never ran: no scroll, no screenshot, no time spent waiting.
    assert_eq!(session.calls().len(), 2);
    assert_eq!(session.calls.last().unwrap().0, Duration::ZERO);
    assert!(!artifacts.path().join("era_detail.png").exists());
    assert_eq!(session.close_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn unreachable_app_fails_on_navigation() {
    let artifacts = tempfile::tempdir().unwrap();
    let driver = InteractionDriver::new(BASE_URL, artifacts.path());
    let mut session = RecordingSession::new();
    session.unreachable = true;

    let err = driver.run(&mut session, &five_step_script()).await.unwrap_err();

    assert_eq!(err.step_index(), Some(1));
    assert!(matches!(err.root(), E2eError::NavigationFailed { url, .. } if url == BASE_URL));
    assert_eq!(session.calls().len(), 1);
    assert_eq!(session.close_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn step_error_wins_over_close_error() {
    let artifacts = tempfile::tempdir().unwrap();
    let driver = InteractionDriver::new(BASE_URL, artifacts.path());
    let mut session = RecordingSession::new();
    session.absent.push(Locator::selector(".group.relative"));
    session.fail_close = true;

    let err = driver.run(&mut session, &five_step_script()).await.unwrap_err();

    assert!(matches!(err.root(), E2eError::ElementNotFound(_)));
    assert_eq!(session.close_calls, 1);
}

#[tokio::test(start_paused = true)]
async fn close_failure_after_clean_run_is_reported() {
    let artifacts = tempfile::tempdir().unwrap();
    let driver = InteractionDriver::new(BASE_URL, artifacts.path());
    let mut session = RecordingSession::new();
    session.fail_close = true;

    let err = driver.run(&mut session, &five_step_script()).await.unwrap_err();

    assert!(matches!(err, E2eError::SessionClosedUnexpectedly(_)));
    assert_eq!(session.calls().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn conditional_wait_times_out_as_element_not_found() {
    let artifacts = tempfile::tempdir().unwrap();
    let driver = InteractionDriver::new(BASE_URL, artifacts.path());
    let mut session = RecordingSession::new();
    let banner = Locator::selector("[data-testid=era-detail]");
    session.absent.push(banner.clone());

    let script = InteractionScript {
        name: "conditional".to_string(),
        description: String::new(),
        steps: vec![
            InteractionStep::Navigate { url: "era/3".to_string() },
            InteractionStep::Wait { ms: 4000, until: Some(banner.clone()) },
            InteractionStep::Screenshot { path: PathBuf::from("never.png"), full_page: true },
        ],
    };

    let err = driver.run(&mut session, &script).await.unwrap_err();

    assert_eq!(err.step_index(), Some(2));
    assert!(matches!(err.root(), E2eError::ElementNotFound(_)));
    assert_eq!(
        session.calls(),
        vec![
            &Call::Navigate(format!("{}era/3", BASE_URL)),
            &Call::WaitVisible(banner, Duration::from_millis(4000)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn report_serializes_to_json() {
    let artifacts = tempfile::tempdir().unwrap();
    let driver = InteractionDriver::new(BASE_URL, artifacts.path());
    let mut session = RecordingSession::new();

    let report = driver.run(&mut session, &five_step_script()).await.unwrap();
    let results = artifacts.path().join("results/interaction.json");
    report.write_json(&results).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&results).unwrap()).unwrap();
    assert_eq!(value["script"], "five");
    assert_eq!(value["steps"].as_array().unwrap().len(), 5);
    assert_eq!(value["steps"][4]["step_name"], "screenshot:era_detail.png");
    assert!(value.get("failure").is_none());
}

#[tokio::test(start_paused = true)]
async fn failed_run_keeps_completed_steps_in_its_report() {
    let artifacts = tempfile::tempdir().unwrap();
    let driver = InteractionDriver::new(BASE_URL, artifacts.path());
    let mut session = RecordingSession::new();
    session.absent.push(Locator::selector(".group.relative"));

    let (report, outcome) = driver.run_recorded(&mut session, &five_step_script()).await;

    let err = outcome.unwrap_err();
    assert_eq!(err.step_index(), Some(2));
    assert!(!report.passed());
    assert_eq!(report.failure.as_deref(), Some(err.to_string().as_str()));
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].index, 1);
    assert_eq!(session.close_calls, 1);

    let results = artifacts.path().join("results.json");
    report.write_json(&results).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&results).unwrap()).unwrap();
    assert_eq!(value["steps"].as_array().unwrap().len(), 1);
    assert!(value["failure"].as_str().unwrap().starts_with("Step 2"));
}
