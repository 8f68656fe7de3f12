//! tlverify CLI
//!
//! Command-line interface for the timeline app checks: asset reference
//! integrity and scripted browser interaction.

pub mod commands;
pub mod output;
