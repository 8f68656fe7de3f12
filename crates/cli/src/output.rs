//! Output formatting for CLI

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use std::path::Path;

use tlverify_common::{MissingReference, ReconciliationReport};
use tlverify_e2e::{RunReport, StepResult};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Line-oriented text
    #[default]
    Plain,
    /// Human-readable table format
    Table,
    /// JSON format
    Json,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for MissingReference {
    fn headers() -> Vec<&'static str> {
        vec!["Source", "Reference", "File"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.source.clone(), self.raw_path.clone(), self.file_name.clone()]
    }
}

impl TableDisplay for StepResult {
    fn headers() -> Vec<&'static str> {
        vec!["#", "Step", "Duration", "Artifact"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.index.to_string(),
            self.step_name.clone(),
            format!("{} ms", self.duration_ms),
            self.screenshot_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        ]
    }
}

/// Render items as a table
pub fn table<T: TableDisplay>(items: &[T]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(T::headers());
    for item in items {
        table.add_row(item.row());
    }
    table
}

fn json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// `public/images` renders as `public/images/`
fn dir_display(dir: &Path) -> String {
    let shown = dir.display().to_string();
    if shown.ends_with('/') {
        shown
    } else {
        format!("{}/", shown)
    }
}

/// One line per missing reference, as printed by the plain format
pub fn missing_line(entry: &MissingReference, directory: &Path) -> String {
    format!(
        "{}: References '{}' (File '{}' not found in {})",
        entry.source,
        entry.raw_path,
        entry.file_name,
        directory.display()
    )
}

/// Render the asset check report
pub fn render_asset_report(report: &ReconciliationReport, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return json(report);
    }

    let mut lines = vec!["Checking image references...".to_string()];
    for warning in &report.warnings {
        lines.push(format!("Warning: {}", warning));
    }
    lines.push(String::new());

    if report.missing.is_empty() {
        lines.push(format!(
            "SUCCESS: All image references match files in {}",
            dir_display(&report.directory)
        ));
    } else {
        lines.push("FOUND MISSING IMAGES:".to_string());
        match format {
            OutputFormat::Table => lines.push(table(&report.missing).to_string()),
            _ => lines.extend(report.missing.iter().map(|m| missing_line(m, &report.directory))),
        }
    }

    if report.skipped_remote > 0 {
        lines.push(format!("Skipped {} remote reference(s)", report.skipped_remote));
    }

    if !report.unreferenced.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "UNREFERENCED FILES in {} ({}):",
            dir_display(&report.directory),
            report.unreferenced.len()
        ));
        lines.extend(report.unreferenced.iter().map(|name| format!("  {}", name)));
    }

    lines.join("\n")
}

/// Render a completed interaction run
pub fn render_run_report(report: &RunReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json(report),
        OutputFormat::Table => format!(
            "{}\n✅ {} completed in {} ms",
            table(&report.steps),
            report.script,
            report.duration_ms
        ),
        OutputFormat::Plain => {
            let mut lines: Vec<String> = report
                .steps
                .iter()
                .map(|s| format!("✓ step {} {} ({} ms)", s.index, s.step_name, s.duration_ms))
                .collect();
            for shot in report.screenshots() {
                lines.push(format!("Screenshot: {}", shot.display()));
            }
            lines.push(format!("✅ {} completed in {} ms", report.script, report.duration_ms));
            lines.join("\n")
        }
    }
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}
