//! Bundle creation: scan one module's artifact directory and analyze
//! every matching probe map against the merged execution data.

use super::analyzer::Analyzer;
use super::bundle::BundleCoverage;
use super::probe_map::ARTIFACT_EXTENSION;
use crate::exec::ExecutionDataStore;
use crate::filter::ArtifactFilter;
use crate::graph::Module;
use crate::result::SumarResult;
use std::path::PathBuf;
use tracing::warn;
use walkdir::WalkDir;

/// Creates a [`BundleCoverage`] for one module.
#[derive(Debug)]
pub struct BundleCreator<'a> {
    module: &'a Module,
    filter: &'a ArtifactFilter,
}

impl<'a> BundleCreator<'a> {
    /// Create a bundle creator for a module and artifact filter
    #[must_use]
    pub fn new(module: &'a Module, filter: &'a ArtifactFilter) -> Self {
        Self { module, filter }
    }

    /// Scan, filter, sort and analyze the module's artifacts.
    ///
    /// Discovered paths are sorted lexicographically by their path relative
    /// to the artifact directory, so bundle counters are identical across
    /// runs regardless of filesystem iteration order. An artifact the
    /// analyzer rejects is logged and skipped; it never aborts the bundle.
    pub fn create_bundle(&self, store: &ExecutionDataStore) -> SumarResult<BundleCoverage> {
        let root = self.module.artifact_dir();
        let mut artifacts: Vec<(String, PathBuf)> = Vec::new();

        for entry in WalkDir::new(&root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(module = %self.module.id, "unable to scan artifact directory: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) != Some(ARTIFACT_EXTENSION) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&root) else {
                continue;
            };
            if self.filter.matches(relative) {
                let key = relative.to_string_lossy().replace('\\', "/");
                artifacts.push((key, entry.path().to_path_buf()));
            }
        }
        artifacts.sort_by(|a, b| a.0.cmp(&b.0));

        let analyzer = Analyzer::new(store);
        let mut classes = Vec::new();
        for (_, path) in &artifacts {
            match analyzer.analyze_file(path) {
                Ok(class) => classes.push(class),
                Err(e) => {
                    warn!(module = %self.module.id, "skipping artifact: {e}");
                }
            }
        }

        Ok(BundleCoverage::new(self.module.display_name(), classes))
    }
}
