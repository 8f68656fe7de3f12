//! CLI Commands

pub mod assets;
pub mod config;
pub mod interact;

/// How a check ended, mapped to the process exit status by `main`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything verified
    Passed,
    /// The check ran and found a problem
    Failed,
}
