//! tlverify browser interaction checks
//!
//! This crate drives a headless browser through a scripted interaction
//! against a running instance of the timeline app:
//! - Parses declarative YAML interaction scripts
//! - Controls Playwright through a line-delimited JSON bridge process
//! - Runs steps strictly in order and always closes the browser
//! - Records per-step timings and screenshot hashes
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  InteractionDriver (Rust)                   │
//! │    run(session, script) -> RunReport                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserSession (trait)                                     │
//! │    └── PlaywrightSession ── stdin/stdout JSON ── node       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  InteractionScript (YAML)                                   │
//! │    ├── name, description                                    │
//! │    └── steps: [InteractionStep]                             │
//! │          ├── navigate { url }                               │
//! │          ├── click { target }                               │
//! │          ├── wait { ms, until? }                            │
//! │          ├── scroll { dx, dy }                              │
//! │          └── screenshot { path, full_page }                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod playwright;
pub mod runner;
pub mod session;
pub mod spec;

pub use error::{E2eError, E2eResult};
pub use playwright::{Browser, PlaywrightConfig, PlaywrightSession};
pub use runner::{InteractionDriver, RunReport, StepResult};
pub use session::BrowserSession;
pub use spec::{InteractionScript, InteractionStep, Locator};
