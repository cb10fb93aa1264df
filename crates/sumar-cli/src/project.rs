//! Project manifest (`sumar.toml`) describing the module graph.
//!
//! ```toml
//! group-name = "Integration"
//! group-directory = "it"
//!
//! [[module]]
//! id = "mod-a"
//! group = "demo"
//! basedir = "mod-a"
//! packaging = "leaf"
//! output-dir = "target/reports"
//! artifact-dir = "target/probemaps"
//! source-roots = ["src"]
//! execution-root = false
//!
//! [[merge]]
//! inputs = ["target/it.exec"]
//! output = "merged/it.exec"
//! ```

use crate::error::{CliError, CliResult};
use serde::Deserialize;
use std::path::Path;
use sumar::{MergeSpec, Module, ModuleGraph};

/// The parsed project manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectManifest {
    /// Optional report title postfix
    pub group_name: Option<String>,
    /// Optional subdirectory under each module's output directory
    pub group_directory: Option<String>,
    /// Modules in traversal order
    #[serde(default, rename = "module")]
    pub modules: Vec<Module>,
    /// Merge jobs for the merge command
    #[serde(default, rename = "merge")]
    pub merges: Vec<MergeSpec>,
}

impl ProjectManifest {
    /// Load and parse a manifest file
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("unable to read manifest {}: {e}", path.display()))
        })?;
        let manifest: Self = toml::from_str(&text).map_err(|e| {
            CliError::config(format!("invalid manifest {}: {e}", path.display()))
        })?;
        if manifest.modules.is_empty() {
            return Err(CliError::config(format!(
                "manifest {} declares no modules",
                path.display()
            )));
        }
        Ok(manifest)
    }

    /// Build the module graph, resolving relative base directories against
    /// the manifest's own directory.
    #[must_use]
    pub fn to_graph(&self, manifest_dir: &Path) -> ModuleGraph {
        let modules = self
            .modules
            .iter()
            .cloned()
            .map(|mut module| {
                if module.basedir.is_relative() {
                    module.basedir = manifest_dir.join(&module.basedir);
                }
                module
            })
            .collect();
        ModuleGraph::new(modules)
    }
}
