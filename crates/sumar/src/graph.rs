//! The module graph: a read-only snapshot of the build modules
//! participating in one run.

use crate::result::{SumarError, SumarResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a module packages its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Packaging {
    /// A module with its own compiled artifacts
    #[default]
    Leaf,
    /// A parent/aggregator module without compiled artifacts of its own
    Aggregator,
}

/// One build module. All paths except `basedir` are interpreted relative
/// to `basedir` unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Short module identifier (the artifact id)
    pub id: String,
    /// Owning group identifier, used for the qualified id
    #[serde(default)]
    pub group: String,
    /// Human-readable name used for bundle and group titles
    #[serde(default)]
    pub name: Option<String>,
    /// Module base directory
    pub basedir: PathBuf,
    /// Packaging kind
    #[serde(default)]
    pub packaging: Packaging,
    /// Directory report output is written under
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,
    /// Directory holding the module's compiled artifacts
    #[serde(rename = "artifact-dir")]
    pub artifact_dir: PathBuf,
    /// Ordered source roots for source-annotated rendering
    #[serde(rename = "source-roots", default)]
    pub source_roots: Vec<PathBuf>,
    /// Whether this module is the designated execution root
    #[serde(rename = "execution-root", default)]
    pub execution_root: bool,
}

impl Module {
    /// `group:artifact`-style qualified identifier
    #[must_use]
    pub fn qualified_id(&self) -> String {
        format!("{}:{}", self.group, self.id)
    }

    /// Display name, falling back to the id
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Whether this module aggregates children without own artifacts
    #[must_use]
    pub fn is_aggregator(&self) -> bool {
        self.packaging == Packaging::Aggregator
    }

    /// Resolve a possibly-relative path against the module base directory
    #[must_use]
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.basedir.join(path)
        }
    }

    /// Absolute artifact directory
    #[must_use]
    pub fn artifact_dir(&self) -> PathBuf {
        self.resolve(&self.artifact_dir)
    }

    /// Absolute report output directory
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    /// Absolute source roots, declaration order preserved
    #[must_use]
    pub fn source_roots(&self) -> Vec<PathBuf> {
        self.source_roots.iter().map(|r| self.resolve(r)).collect()
    }
}

/// Ordered list of modules with one designated execution root.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    modules: Vec<Module>,
}

impl ModuleGraph {
    /// Build a graph from an ordered module list
    #[must_use]
    pub fn new(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    /// Modules in traversal order
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// The single module flagged as execution root.
    ///
    /// Zero or more than one flagged module is a configuration error.
    pub fn root(&self) -> SumarResult<&Module> {
        let mut roots = self.modules.iter().filter(|m| m.execution_root);
        let first = roots
            .next()
            .ok_or_else(|| SumarError::config("unable to determine the execution root module"))?;
        if let Some(second) = roots.next() {
            return Err(SumarError::config(format!(
                "multiple execution root modules: {} and {}",
                first.id, second.id
            )));
        }
        Ok(first)
    }
}
