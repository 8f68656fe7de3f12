//! Reconciliation of extracted references against the asset directory
//!
//! Matching is basename-only: `images/a.jpg` and `/other/a.jpg` are both
//! satisfied by `a.jpg` in the listing. The directory part of a reference
//! is never validated.

use std::collections::HashSet;
use tracing::{debug, info};

use crate::config::AssetsConfig;
use crate::error::Result;
use crate::extract::ReferenceExtractor;
use crate::types::{AssetDirectoryListing, Extraction, MissingReference, ReconciliationReport};

/// Compares references against a directory snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    skip_remote: bool,
    report_unreferenced: bool,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AssetsConfig) -> Self {
        Self {
            skip_remote: config.skip_remote,
            report_unreferenced: config.report_unreferenced,
        }
    }

    pub fn skip_remote(mut self, skip: bool) -> Self {
        self.skip_remote = skip;
        self
    }

    pub fn report_unreferenced(mut self, report: bool) -> Self {
        self.report_unreferenced = report;
        self
    }

    /// Pure comparison of an extraction against a listing
    pub fn reconcile(&self, listing: &AssetDirectoryListing, extraction: Extraction) -> ReconciliationReport {
        let mut report = ReconciliationReport {
            directory: listing.directory().to_path_buf(),
            ..Default::default()
        };
        let mut seen: HashSet<&str> = HashSet::new();

        for (source, reference) in extraction.iter() {
            if self.skip_remote && reference.is_remote() {
                report.skipped_remote += 1;
                continue;
            }

            report.checked += 1;
            seen.insert(reference.file_name.as_str());

            if !listing.contains(&reference.file_name) {
                report.missing.push(MissingReference {
                    source: source.to_string(),
                    raw_path: reference.raw_path.clone(),
                    file_name: reference.file_name.clone(),
                });
            }
        }

        if self.report_unreferenced {
            let mut unreferenced: Vec<String> = listing
                .names()
                .filter(|name| !seen.contains(name))
                .map(String::from)
                .collect();
            unreferenced.sort();
            report.unreferenced = unreferenced;
        }

        info!(
            "Checked {} reference(s): {} missing, {} unreadable source(s)",
            report.checked,
            report.missing.len(),
            extraction.warnings.len()
        );

        report.warnings = extraction.warnings;
        report
    }
}

/// Extract from the configured sources and reconcile against the configured directory
pub fn check_assets(config: &AssetsConfig) -> Result<ReconciliationReport> {
    // Ground truth first: without the directory there is nothing to check.
    let listing = AssetDirectoryListing::read(&config.directory)?;
    debug!("{} file(s) in {}", listing.len(), config.directory.display());

    let extractor = ReferenceExtractor::from_config(config)?;
    let extraction = extractor.extract(&config.sources);
    debug!(
        "{} reference(s) in {} source(s), {} warning(s)",
        extraction.reference_count(),
        extraction.sources.len(),
        extraction.warnings.len()
    );

    Ok(Reconciler::from_config(config).reconcile(&listing, extraction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetReference, SourceReferences};

    fn extraction(sources: Vec<(&str, Vec<&str>)>) -> Extraction {
        Extraction {
            sources: sources
                .into_iter()
                .map(|(source, refs)| SourceReferences {
                    source: source.to_string(),
                    references: refs.into_iter().map(AssetReference::new).collect(),
                })
                .collect(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_all_present() {
        let listing = AssetDirectoryListing::from_names("public/images", ["era_01.jpg", "era_02.jpg"]);
        let report = Reconciler::new().reconcile(
            &listing,
            extraction(vec![("data/partData.ts", vec!["images/era_01.jpg", "/images/era_02.jpg"])]),
        );
        assert!(report.is_success());
        assert_eq!(report.checked, 2);
    }

    #[test]
    fn test_basename_only_matching() {
        let listing = AssetDirectoryListing::from_names("public/images", ["era_01.jpg"]);
        let report = Reconciler::new().reconcile(
            &listing,
            extraction(vec![("a.ts", vec!["somewhere/else/era_01.jpg", "era_01.jpg"])]),
        );
        assert!(report.is_success());
    }

    #[test]
    fn test_order_and_cardinality() {
        let listing = AssetDirectoryListing::from_names("public/images", ["ok.jpg"]);
        let report = Reconciler::new().reconcile(
            &listing,
            extraction(vec![
                ("a.ts", vec!["images/x.jpg", "images/ok.jpg", "images/x.jpg"]),
                ("b.ts", vec!["images/y.jpg", "images/x.jpg"]),
            ]),
        );

        let got: Vec<(&str, &str)> = report
            .missing
            .iter()
            .map(|m| (m.source.as_str(), m.raw_path.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("a.ts", "images/x.jpg"),
                ("a.ts", "images/x.jpg"),
                ("b.ts", "images/y.jpg"),
                ("b.ts", "images/x.jpg"),
            ]
        );
    }

    #[test]
    fn test_skip_remote() {
        let listing = AssetDirectoryListing::from_names("public/images", Vec::<String>::new());
        let refs = extraction(vec![("a.ts", vec!["https://cdn.example.com/a.jpg", "images/b.jpg"])]);

        let strict = Reconciler::new().reconcile(&listing, refs.clone());
        assert_eq!(strict.missing.len(), 2);

        let lenient = Reconciler::new().skip_remote(true).reconcile(&listing, refs);
        assert_eq!(lenient.missing.len(), 1);
        assert_eq!(lenient.skipped_remote, 1);
        assert_eq!(lenient.missing[0].file_name, "b.jpg");
    }

    #[test]
    fn test_unreferenced_listing() {
        let listing = AssetDirectoryListing::from_names("public/images", ["c.jpg", "a.jpg", "b.jpg"]);
        let refs = extraction(vec![("a.ts", vec!["images/b.jpg"])]);

        let report = Reconciler::new().report_unreferenced(true).reconcile(&listing, refs.clone());
        assert_eq!(report.unreferenced, vec!["a.jpg", "c.jpg"]);
        assert!(report.is_success());

        let report = Reconciler::new().reconcile(&listing, refs);
        assert!(report.unreferenced.is_empty());
    }
}
