//! Include/exclude glob filtering of compiled artifacts.

use crate::result::{SumarError, SumarResult};
use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Glob lists selecting which artifacts participate in analysis.
///
/// Empty includes means everything is included; empty excludes means
/// nothing is excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilterSpec {
    /// Include patterns (`*` within a segment, `**` across segments, `?`)
    #[serde(default)]
    pub includes: Vec<String>,
    /// Exclude patterns, taking precedence over includes
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl FileFilterSpec {
    /// Build a spec from include/exclude lists
    #[must_use]
    pub fn new(includes: Vec<String>, excludes: Vec<String>) -> Self {
        Self { includes, excludes }
    }
}

/// A compiled artifact filter.
#[derive(Debug)]
pub struct ArtifactFilter {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl ArtifactFilter {
    /// Compile the spec's globs once.
    ///
    /// An unparsable pattern is a configuration error naming the pattern.
    pub fn new(spec: &FileFilterSpec) -> SumarResult<Self> {
        Ok(Self {
            includes: Self::compile(&spec.includes)?,
            excludes: Self::compile(&spec.excludes)?,
        })
    }

    /// Filter accepting everything
    #[must_use]
    pub fn match_all() -> Self {
        Self {
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }

    fn compile(patterns: &[String]) -> SumarResult<Vec<Pattern>> {
        patterns
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| SumarError::config(format!("invalid glob pattern {p:?}: {e}")))
            })
            .collect()
    }

    /// Whether a path, relative to the artifact root, passes the filter.
    #[must_use]
    pub fn matches(&self, relative_path: &Path) -> bool {
        // `*` and `?` stay inside one path segment; only `**` crosses.
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        let normalized = relative_path.to_string_lossy().replace('\\', "/");

        let included = self.includes.is_empty()
            || self
                .includes
                .iter()
                .any(|p| p.matches_with(&normalized, options));
        let excluded = self
            .excludes
            .iter()
            .any(|p| p.matches_with(&normalized, options));

        included && !excluded
    }
}
