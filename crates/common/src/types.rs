//! Core types for tlverify

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Final path component of a reference: everything after the last `/`,
/// or the whole string when there is no separator.
pub fn file_name(raw_path: &str) -> &str {
    match raw_path.rfind('/') {
        Some(idx) => &raw_path[idx + 1..],
        None => raw_path,
    }
}

/// An image path declared in a data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReference {
    /// Path as written in the source
    pub raw_path: String,
    /// Basename used for matching
    pub file_name: String,
}

impl AssetReference {
    pub fn new(raw_path: impl Into<String>) -> Self {
        let raw_path = raw_path.into();
        let file_name = file_name(&raw_path).to_string();
        Self { raw_path, file_name }
    }

    /// Absolute http(s) URLs point outside the asset directory
    pub fn is_remote(&self) -> bool {
        self.raw_path.starts_with("http://") || self.raw_path.starts_with("https://")
    }
}

/// References found in one data source, in occurrence order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceReferences {
    pub source: String,
    pub references: Vec<AssetReference>,
}

/// A data source that could not be read. Recorded and reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceWarning {
    pub source: String,
    pub reason: SourceWarningReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SourceWarningReason {
    NotFound,
    Unreadable(String),
}

impl std::fmt::Display for SourceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            SourceWarningReason::NotFound => write!(f, "Data file {} not found.", self.source),
            SourceWarningReason::Unreadable(reason) => {
                write!(f, "Data file {} could not be read: {}", self.source, reason)
            }
        }
    }
}

/// Output of the extractor: every readable source plus the ones that failed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    pub sources: Vec<SourceReferences>,
    pub warnings: Vec<SourceWarning>,
}

impl Extraction {
    /// Total number of references across all sources
    pub fn reference_count(&self) -> usize {
        self.sources.iter().map(|s| s.references.len()).sum()
    }

    /// Iterate `(source, reference)` pairs in scan order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AssetReference)> {
        self.sources
            .iter()
            .flat_map(|s| s.references.iter().map(move |r| (s.source.as_str(), r)))
    }
}

/// Snapshot of the filenames in the asset directory, taken once per run
#[derive(Debug, Clone)]
pub struct AssetDirectoryListing {
    directory: PathBuf,
    files: HashSet<String>,
}

impl AssetDirectoryListing {
    /// List `directory` once. A missing or unlistable directory is fatal.
    pub fn read(directory: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(directory).map_err(|source| Error::DirectoryNotFound {
            path: directory.to_path_buf(),
            source,
        })?;

        let mut files = HashSet::new();
        for entry in entries {
            let entry = entry?;
            files.insert(entry.file_name().to_string_lossy().into_owned());
        }

        Ok(Self {
            directory: directory.to_path_buf(),
            files,
        })
    }

    /// Build a listing from known names, without touching the filesystem
    pub fn from_names<I, S>(directory: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            directory: directory.into(),
            files: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.files.contains(file_name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }
}

/// A reference whose file is absent from the asset directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingReference {
    pub source: String,
    pub raw_path: String,
    pub file_name: String,
}

/// Result of reconciling an extraction against a directory listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Directory the listing was taken from
    pub directory: PathBuf,
    /// Number of references compared against the listing
    pub checked: usize,
    /// Remote references left out of the comparison
    pub skipped_remote: usize,
    pub missing: Vec<MissingReference>,
    pub warnings: Vec<SourceWarning>,
    /// Files nobody references; only filled when requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unreferenced: Vec<String>,
}

impl ReconciliationReport {
    /// True when every checked reference resolved
    pub fn is_success(&self) -> bool {
        self.missing.is_empty()
    }
}
