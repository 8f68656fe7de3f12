//! Browser session abstraction

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::error::E2eResult;
use crate::spec::Locator;

/// One exclusively owned browser page.
///
/// Every call completes (including any navigation or DOM settling the
/// backend performs) before it returns, so steps never overlap.
#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url` and wait for the load event
    async fn navigate(&mut self, url: &str) -> E2eResult<()>;

    /// Click the `target.nth` match of `target`, in document order
    async fn click(&mut self, target: &Locator) -> E2eResult<()>;

    /// Wait until the `target.nth` match is visible
    async fn wait_visible(&mut self, target: &Locator, timeout: Duration) -> E2eResult<()>;

    async fn scroll(&mut self, dx: i64, dy: i64) -> E2eResult<()>;

    /// Write a PNG of the viewport, or the full page, to `path`
    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()>;

    /// Release the browser. Safe to call more than once.
    async fn close(&mut self) -> E2eResult<()>;
}
