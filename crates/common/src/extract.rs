//! Reference extraction
//!
//! Scans data sources for `field: "value"` / `field: 'value'` pairs and
//! collects the quoted values as [`AssetReference`]s. Unreadable sources
//! are recorded as warnings and never stop the scan.

use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::AssetsConfig;
use crate::error::Result;
use crate::types::{AssetReference, Extraction, SourceReferences, SourceWarning, SourceWarningReason};

/// Finds image references for one field name
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    field: String,
    pattern: Regex,
    extensions: Vec<String>,
}

impl ReferenceExtractor {
    /// Build an extractor for `field`, matched literally.
    ///
    /// A field starting with a word character must begin at a word
    /// boundary, so `heroimageUrl` and `hero_imageUrl` do not count as
    /// `imageUrl`. A plain substring match would have picked them up.
    pub fn new(field: &str) -> Result<Self> {
        let escaped = regex::escape(field);
        let boundary = if field.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
            r"\b"
        } else {
            ""
        };
        // The field may be quoted itself, as in JSON content files.
        let pattern = Regex::new(&format!(
            r#"{boundary}{escaped}["']?\s*:\s*(?:"([^"]+)"|'([^']+)')"#
        ))?;

        Ok(Self {
            field: field.to_string(),
            pattern,
            extensions: Vec::new(),
        })
    }

    /// Build an extractor from the `[assets]` config section
    pub fn from_config(config: &AssetsConfig) -> Result<Self> {
        Ok(Self::new(&config.field)?.with_extensions(config.extensions.clone()))
    }

    /// Extensions picked up when a source is a directory
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// All references in `text`, in occurrence order
    pub fn extract_text(&self, text: &str) -> Vec<AssetReference> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| AssetReference::new(m.as_str()))
            .collect()
    }

    /// Scan every source in order
    pub fn extract<P: AsRef<Path>>(&self, sources: &[P]) -> Extraction {
        let mut extraction = Extraction::default();

        for source in sources {
            let source = source.as_ref();
            if source.is_dir() {
                self.extract_dir(source, &mut extraction);
            } else {
                self.extract_source(source, &mut extraction);
            }
        }

        extraction
    }

    fn extract_source(&self, path: &Path, extraction: &mut Extraction) {
        let source = path.display().to_string();

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let references = self.extract_text(&content);
                debug!("{}: {} reference(s) to '{}'", source, references.len(), self.field);
                extraction.sources.push(SourceReferences { source, references });
            }
            Err(e) => {
                let reason = if e.kind() == std::io::ErrorKind::NotFound {
                    SourceWarningReason::NotFound
                } else {
                    SourceWarningReason::Unreadable(e.to_string())
                };
                record_warning(SourceWarning { source, reason }, extraction);
            }
        }
    }

    /// Scan files below `dir` with a configured extension, sorted by path.
    ///
    /// Symlinks are handed to [`Self::extract_source`] like regular files,
    /// so a dangling link shows up as a warning. Entries the walk cannot
    /// read become warnings too.
    fn extract_dir(&self, dir: &Path, extraction: &mut Extraction) {
        for entry in WalkDir::new(dir).sort_by_file_name() {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_dir() && self.wants(entry.path()) {
                        self.extract_source(entry.path(), extraction);
                    }
                }
                Err(e) => {
                    let source = e.path().unwrap_or(dir).display().to_string();
                    let reason = SourceWarningReason::Unreadable(e.to_string());
                    record_warning(SourceWarning { source, reason }, extraction);
                }
            }
        }
    }

    fn wants(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| self.extensions.iter().any(|x| ext == x.as_str()))
            .unwrap_or(false)
    }
}

/// An unreadable source keeps its slot with no references
fn record_warning(warning: SourceWarning, extraction: &mut Extraction) {
    warn!("{}", warning);
    extraction.sources.push(SourceReferences {
        source: warning.source.clone(),
        references: Vec::new(),
    });
    extraction.warnings.push(warning);
}
