//! Merge-only export: combine named sets of recording files across the
//! module graph into new merged recording files, without rendering.

use crate::exec::ExecFileLoader;
use crate::graph::{Module, ModuleGraph};
use crate::result::{SumarError, SumarResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// One merge job: input recording paths (resolved per contributing
/// module) and the relative output path to write the merged result to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSpec {
    /// Recording files, resolved relative to each contributing module
    pub inputs: Vec<String>,
    /// Output file, relative to the merge output directory
    pub output: String,
}

/// Configuration for a merge run.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Merge jobs, processed in order
    pub specs: Vec<MergeSpec>,
    /// Fail on missing inputs and empty results instead of warning
    pub strict: bool,
    /// Directory merged outputs are written under
    pub output_dir: PathBuf,
}

impl MergeConfig {
    /// Create a merge configuration; `strict` defaults to on.
    #[must_use]
    pub fn new(specs: Vec<MergeSpec>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            specs,
            strict: true,
            output_dir: output_dir.into(),
        }
    }

    /// Toggle strict mode
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// What a merge run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Output files written
    pub written: Vec<PathBuf>,
    /// Specs skipped because no input data was found (non-strict only)
    pub skipped: usize,
}

/// Runs merge jobs over the module graph.
///
/// The execution root and aggregator-packaged modules contribute no
/// inputs; every other module contributes each input path resolved
/// against its base directory.
#[derive(Debug)]
pub struct MergeRunner<'a> {
    config: &'a MergeConfig,
    graph: &'a ModuleGraph,
}

impl<'a> MergeRunner<'a> {
    /// Create a merge runner for one run
    #[must_use]
    pub fn new(config: &'a MergeConfig, graph: &'a ModuleGraph) -> Self {
        Self { config, graph }
    }

    /// Process every merge spec. No specs means nothing to do.
    pub fn run(&self) -> SumarResult<MergeSummary> {
        let mut summary = MergeSummary::default();
        if self.config.specs.is_empty() {
            info!("no merge outputs configured, skipping");
            return Ok(summary);
        }

        let root = self.graph.root()?;
        for spec in &self.config.specs {
            let loader = self.load_spec(spec, root)?;
            let destination = self.config.output_dir.join(&spec.output);

            if loader.execution_data().is_empty() {
                if self.config.strict {
                    return Err(SumarError::config(format!(
                        "no execution data found to write {}",
                        destination.display()
                    )));
                }
                warn!("no execution data found to write {}", destination.display());
                summary.skipped += 1;
                continue;
            }

            info!("writing merged execution data to {}", destination.display());
            loader.save(&destination, false)?;
            summary.written.push(destination);
        }
        Ok(summary)
    }

    /// Load every contributing module's inputs for one spec.
    fn load_spec(&self, spec: &MergeSpec, root: &Module) -> SumarResult<ExecFileLoader> {
        let mut loader = ExecFileLoader::new();
        for module in self.graph.modules() {
            if module.id == root.id || module.is_aggregator() {
                continue;
            }
            for input in &spec.inputs {
                let path = module.resolve(input);
                if !path.is_file() {
                    if self.config.strict {
                        return Err(SumarError::file(
                            &path,
                            std::io::Error::new(
                                std::io::ErrorKind::NotFound,
                                "not found or not a file",
                            ),
                        ));
                    }
                    warn!(module = %module.id, "skipping missing input {}", path.display());
                    continue;
                }
                info!(module = %module.id, "loading execution data from {}", path.display());
                loader.load_file(&path)?;
            }
        }
        Ok(loader)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::exec::{ExecutionData, SessionInfo};
    use crate::graph::Packaging;
    use std::path::Path;
    use tempfile::TempDir;

    fn module_at(base: &Path, id: &str, root: bool) -> Module {
        Module {
            id: id.to_string(),
            group: "demo".to_string(),
            name: None,
            basedir: base.join(id),
            packaging: Packaging::Leaf,
            output_dir: "target/reports".into(),
            artifact_dir: "target/probemaps".into(),
            source_roots: vec!["src".into()],
            execution_root: root,
        }
    }

    fn write_recording(path: &Path, records: &[ExecutionData]) {
        let mut buf = Vec::new();
        let mut writer = crate::exec::ExecutionDataWriter::new(&mut buf).unwrap();
        writer
            .write_session_info(&SessionInfo::new("seed", 1, 2))
            .unwrap();
        for r in records {
            writer.write_execution_data(r).unwrap();
        }
        writer.flush().unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, buf).unwrap();
    }

    fn graph_with_data(dir: &TempDir) -> ModuleGraph {
        let base = dir.path();
        let graph = ModuleGraph::new(vec![
            module_at(base, "root", true),
            module_at(base, "mod-a", false),
            module_at(base, "mod-b", false),
        ]);
        write_recording(
            &base.join("mod-a/target/it.exec"),
            &[ExecutionData::new(1, "demo/Foo", vec![true, false])],
        );
        write_recording(
            &base.join("mod-b/target/it.exec"),
            &[ExecutionData::new(1, "demo/Foo", vec![false, true])],
        );
        graph
    }

    fn spec() -> MergeSpec {
        MergeSpec {
            inputs: vec!["target/it.exec".to_string()],
            output: "merged/it.exec".to_string(),
        }
    }

    #[test]
    fn test_merge_combines_module_inputs() {
        let dir = TempDir::new().unwrap();
        let graph = graph_with_data(&dir);
        let config = MergeConfig::new(vec![spec()], dir.path().join("out"));

        let summary = MergeRunner::new(&config, &graph).run().unwrap();
        assert_eq!(summary.written.len(), 1);

        let mut reloaded = ExecFileLoader::new();
        reloaded.load_file(&summary.written[0]).unwrap();
        // probes OR-merged across both modules
        assert_eq!(
            reloaded.execution_data().get(1).unwrap().probes(),
            &[true, true]
        );
        // one session per contributing recording, order preserved
        assert_eq!(reloaded.session_infos().infos().len(), 2);
    }

    #[test]
    fn test_strict_missing_input_is_fatal_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let graph = graph_with_data(&dir);
        std::fs::remove_file(dir.path().join("mod-b/target/it.exec")).unwrap();

        let out = dir.path().join("out");
        let config = MergeConfig::new(vec![spec()], &out);
        let err = MergeRunner::new(&config, &graph).run().unwrap_err();
        assert!(matches!(err, SumarError::File { .. }));
        assert!(!out.join("merged/it.exec").exists());
    }

    #[test]
    fn test_non_strict_missing_input_merges_the_rest() {
        let dir = TempDir::new().unwrap();
        let graph = graph_with_data(&dir);
        std::fs::remove_file(dir.path().join("mod-b/target/it.exec")).unwrap();

        let config = MergeConfig::new(vec![spec()], dir.path().join("out")).with_strict(false);
        let summary = MergeRunner::new(&config, &graph).run().unwrap();
        assert_eq!(summary.written.len(), 1);

        let mut reloaded = ExecFileLoader::new();
        reloaded.load_file(&summary.written[0]).unwrap();
        assert_eq!(
            reloaded.execution_data().get(1).unwrap().probes(),
            &[true, false]
        );
    }

    #[test]
    fn test_empty_result_skips_in_non_strict_mode() {
        let dir = TempDir::new().unwrap();
        let graph = ModuleGraph::new(vec![
            module_at(dir.path(), "root", true),
            module_at(dir.path(), "mod-a", false),
        ]);

        let out = dir.path().join("out");
        let config = MergeConfig::new(vec![spec()], &out).with_strict(false);
        let summary = MergeRunner::new(&config, &graph).run().unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(summary.written.is_empty());
        assert!(!out.join("merged/it.exec").exists());
    }

    #[test]
    fn test_empty_result_fails_in_strict_mode() {
        let dir = TempDir::new().unwrap();
        let graph = ModuleGraph::new(vec![module_at(dir.path(), "root", true)]);
        let config = MergeConfig::new(vec![spec()], dir.path().join("out"));
        assert!(MergeRunner::new(&config, &graph).run().is_err());
    }

    #[test]
    fn test_root_and_aggregator_modules_do_not_contribute() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        let mut aggregator = module_at(base, "parent", false);
        aggregator.packaging = Packaging::Aggregator;
        let graph = ModuleGraph::new(vec![
            module_at(base, "root", true),
            aggregator,
            module_at(base, "mod-a", false),
        ]);
        // recordings under the root and the aggregator must be ignored
        write_recording(
            &base.join("root/target/it.exec"),
            &[ExecutionData::new(9, "demo/Root", vec![true])],
        );
        write_recording(
            &base.join("parent/target/it.exec"),
            &[ExecutionData::new(8, "demo/Parent", vec![true])],
        );
        write_recording(
            &base.join("mod-a/target/it.exec"),
            &[ExecutionData::new(1, "demo/Foo", vec![true])],
        );

        let config = MergeConfig::new(vec![spec()], base.join("out"));
        let summary = MergeRunner::new(&config, &graph).run().unwrap();

        let mut reloaded = ExecFileLoader::new();
        reloaded.load_file(&summary.written[0]).unwrap();
        assert_eq!(reloaded.execution_data().len(), 1);
        assert!(reloaded.execution_data().get(1).is_some());
    }
}
