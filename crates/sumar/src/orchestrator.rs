//! Top-level report driver: walks the module graph and runs the
//! per-module and aggregate report phases.

use crate::analysis::BundleCreator;
use crate::exec::ExecFileLoader;
use crate::filter::{ArtifactFilter, FileFilterSpec};
use crate::graph::{Module, ModuleGraph};
use crate::report::{MultiReportVisitor, ReportFormat, ReportVisitor};
use crate::result::{SumarError, SumarResult};
use crate::source::SourceFileCollection;
use regex::Regex;
use std::path::PathBuf;
use tracing::{info, warn};

/// Data file assumed when no inputs are configured.
pub const DEFAULT_DATA_FILE: &str = "target/sumar.exec";

/// Configuration for a report run.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Recording files, resolved relative to each contributing module
    pub data_files: Vec<String>,
    /// Artifact include globs; empty includes everything
    pub includes: Vec<String>,
    /// Artifact exclude globs, taking precedence over includes
    pub excludes: Vec<String>,
    /// Fail on missing data files instead of warning
    pub strict: bool,
    /// Suppress the whole run
    pub skip: bool,
    /// Suppress per-module reports
    pub skip_module: bool,
    /// Render the aggregate report at the execution root
    pub aggregate: bool,
    /// Regexes dropping whole modules from the aggregate, matched against
    /// the module id and the `group:artifact` qualified id
    pub exclude_modules: Vec<String>,
    /// Renderers to run, in order
    pub formats: Vec<ReportFormat>,
    /// Encoding of generated reports
    pub output_encoding: String,
    /// Encoding of source files
    pub source_encoding: String,
    /// Optional report title postfix
    pub group_name: Option<String>,
    /// Subdirectory under each module's output directory
    pub group_directory: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_files: Vec::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            strict: false,
            skip: false,
            skip_module: false,
            aggregate: true,
            exclude_modules: Vec::new(),
            formats: vec![ReportFormat::Xml, ReportFormat::Html],
            output_encoding: "UTF-8".to_string(),
            source_encoding: "UTF-8".to_string(),
            group_name: None,
            group_directory: String::new(),
        }
    }
}

/// What a report run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Per-module reports rendered
    pub module_reports: usize,
    /// Modules visited by the aggregate report (0 when the aggregate phase
    /// did not run or visited nothing)
    pub aggregate_modules: usize,
}

/// Drives the per-module and aggregate report phases over a module graph.
#[derive(Debug)]
pub struct ReportOrchestrator<'a> {
    config: &'a ReportConfig,
    graph: &'a ModuleGraph,
}

impl<'a> ReportOrchestrator<'a> {
    /// Create an orchestrator for one run
    #[must_use]
    pub fn new(config: &'a ReportConfig, graph: &'a ModuleGraph) -> Self {
        Self { config, graph }
    }

    /// Run the configured phases.
    pub fn run(&self) -> SumarResult<RunSummary> {
        let mut summary = RunSummary::default();
        if self.config.skip {
            info!("Skipping coverage run");
            return Ok(summary);
        }

        let filter = ArtifactFilter::new(&FileFilterSpec::new(
            self.config.includes.clone(),
            self.config.excludes.clone(),
        ))?;
        let exclusions = self.compile_module_exclusions()?;

        if !self.config.skip_module {
            for module in self.graph.modules() {
                if !Self::is_reportable(module) {
                    continue;
                }
                if self.render_module_report(module, &filter)? {
                    summary.module_reports += 1;
                }
            }
        }

        if self.config.aggregate {
            summary.aggregate_modules = self.render_aggregate_report(&filter, &exclusions)?;
        }

        Ok(summary)
    }

    /// A module contributes a bundle when it has its own compiled
    /// artifacts: aggregator packaging or a missing artifact directory
    /// means nothing to report, silently.
    fn is_reportable(module: &Module) -> bool {
        !module.is_aggregator() && module.artifact_dir().is_dir()
    }

    fn compile_module_exclusions(&self) -> SumarResult<Vec<Regex>> {
        self.config
            .exclude_modules
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    SumarError::config(format!("invalid module exclusion {pattern:?}: {e}"))
                })
            })
            .collect()
    }

    fn is_excluded(module: &Module, exclusions: &[Regex]) -> bool {
        exclusions
            .iter()
            .any(|re| re.is_match(&module.id) || re.is_match(&module.qualified_id()))
    }

    fn data_files(&self) -> Vec<String> {
        if self.config.data_files.is_empty() {
            vec![DEFAULT_DATA_FILE.to_string()]
        } else {
            self.config.data_files.clone()
        }
    }

    /// Load execution data contributed by the given modules.
    ///
    /// A missing data file is fatal only in strict mode; corrupt data is
    /// always fatal.
    fn load_execution_data(&self, modules: &[&Module]) -> SumarResult<ExecFileLoader> {
        let mut loader = ExecFileLoader::new();
        for module in modules {
            for data_file in self.data_files() {
                let path = module.resolve(&data_file);
                if path.is_file() {
                    loader.load_file(&path)?;
                } else if self.config.strict {
                    return Err(SumarError::file(
                        &path,
                        std::io::Error::new(std::io::ErrorKind::NotFound, "missing data file"),
                    ));
                } else {
                    warn!(module = %module.id, "skipping missing data file {}", path.display());
                }
            }
        }
        Ok(loader)
    }

    fn output_dir(&self, module: &Module) -> PathBuf {
        let base = module.output_dir();
        if self.config.group_directory.is_empty() {
            base
        } else {
            base.join(&self.config.group_directory)
        }
    }

    /// Render one module's own report from its own data files.
    fn render_module_report(&self, module: &Module, filter: &ArtifactFilter) -> SumarResult<bool> {
        let loader = self.load_execution_data(&[module])?;
        let output_dir = self.output_dir(module);
        info!(module = %module.id, "generating report to {}", output_dir.display());

        let mut visitor = MultiReportVisitor::create(
            &self.config.formats,
            &output_dir,
            self.config.group_name.as_deref(),
            &self.config.output_encoding,
        )?;
        visitor.visit_info(loader.session_infos(), loader.execution_data())?;
        let visited = self.visit_module(&loader, &mut visitor, module, filter)?;
        if visited {
            visitor.visit_end()?;
        }
        Ok(visited)
    }

    /// Render the aggregate report at the execution root, spanning every
    /// non-excluded module. Returns the number of modules visited.
    fn render_aggregate_report(
        &self,
        filter: &ArtifactFilter,
        exclusions: &[Regex],
    ) -> SumarResult<usize> {
        let root = self.graph.root()?;
        let contributors: Vec<&Module> = self.graph.modules().iter().collect();
        let loader = self.load_execution_data(&contributors)?;

        let output_dir = self.output_dir(root);
        info!(module = %root.id, "generating aggregate report to {}", output_dir.display());

        let mut visitor = MultiReportVisitor::create(
            &self.config.formats,
            &output_dir,
            self.config.group_name.as_deref(),
            &self.config.output_encoding,
        )?;
        visitor.visit_info(loader.session_infos(), loader.execution_data())?;
        visitor.visit_group(root.display_name())?;

        let mut visited = 0;
        for module in self.graph.modules() {
            if Self::is_excluded(module, exclusions) {
                info!(module = %module.id, "excluded from aggregate report");
                continue;
            }
            if self.visit_module(&loader, &mut visitor, module, filter)? {
                visited += 1;
            }
        }

        if visited > 0 {
            visitor.visit_end()?;
        }
        Ok(visited)
    }

    /// Visit one module: create its bundle and hand it to the renderers.
    /// Returns false for modules with nothing to report.
    fn visit_module(
        &self,
        loader: &ExecFileLoader,
        visitor: &mut MultiReportVisitor,
        module: &Module,
        filter: &ArtifactFilter,
    ) -> SumarResult<bool> {
        if !Self::is_reportable(module) {
            return Ok(false);
        }

        let creator = BundleCreator::new(module, filter);
        let bundle = creator.create_bundle(loader.execution_data())?;
        if bundle.missing_debug_info() {
            warn!(
                module = %module.id,
                "classes report no line data; artifacts were built without debug information"
            );
        }

        let locator = SourceFileCollection::new(module.source_roots());
        visitor.visit_bundle(&bundle, &locator)?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::graph::Packaging;

    fn module(id: &str, root: bool) -> Module {
        Module {
            id: id.to_string(),
            group: "demo".to_string(),
            name: None,
            basedir: PathBuf::from(format!("/work/{id}")),
            packaging: Packaging::Leaf,
            output_dir: PathBuf::from("target/reports"),
            artifact_dir: PathBuf::from("target/probemaps"),
            source_roots: vec![PathBuf::from("src")],
            execution_root: root,
        }
    }

    #[test]
    fn test_aggregator_module_is_not_reportable() {
        let mut m = module("parent", true);
        m.packaging = Packaging::Aggregator;
        assert!(!ReportOrchestrator::is_reportable(&m));
    }

    #[test]
    fn test_missing_artifact_dir_is_not_reportable() {
        let m = module("mod-a", false);
        assert!(!ReportOrchestrator::is_reportable(&m));
    }

    #[test]
    fn test_module_exclusion_matches_id_and_qualified_id() {
        let a = module("mod-a", false);
        let b = module("mod-b", false);
        let by_id = vec![Regex::new("^mod-b$").unwrap()];
        assert!(!ReportOrchestrator::is_excluded(&a, &by_id));
        assert!(ReportOrchestrator::is_excluded(&b, &by_id));

        let by_qualified = vec![Regex::new("^demo:mod-a$").unwrap()];
        assert!(ReportOrchestrator::is_excluded(&a, &by_qualified));
        assert!(!ReportOrchestrator::is_excluded(&b, &by_qualified));
    }

    #[test]
    fn test_invalid_exclusion_regex_is_config_error() {
        let config = ReportConfig {
            exclude_modules: vec!["(".to_string()],
            ..ReportConfig::default()
        };
        let graph = ModuleGraph::new(vec![module("root", true)]);
        let err = ReportOrchestrator::new(&config, &graph).run().unwrap_err();
        assert!(matches!(err, SumarError::Config { .. }));
    }

    #[test]
    fn test_skip_flag_short_circuits() {
        let config = ReportConfig {
            skip: true,
            ..ReportConfig::default()
        };
        // an unrootable graph does not matter when skipped
        let graph = ModuleGraph::new(vec![module("mod-a", false)]);
        let summary = ReportOrchestrator::new(&config, &graph).run().unwrap();
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn test_aggregate_without_root_is_config_error() {
        let config = ReportConfig::default();
        let graph = ModuleGraph::new(vec![module("mod-a", false)]);
        let err = ReportOrchestrator::new(&config, &graph).run().unwrap_err();
        assert!(matches!(err, SumarError::Config { .. }));
    }

    #[test]
    fn test_default_data_file_fallback() {
        let config = ReportConfig::default();
        let graph = ModuleGraph::default();
        let orchestrator = ReportOrchestrator::new(&config, &graph);
        assert_eq!(orchestrator.data_files(), vec![DEFAULT_DATA_FILE.to_string()]);
    }

    #[test]
    fn test_output_dir_group_directory() {
        let graph = ModuleGraph::default();
        let m = module("mod-a", false);

        let plain = ReportConfig::default();
        assert_eq!(
            ReportOrchestrator::new(&plain, &graph).output_dir(&m),
            PathBuf::from("/work/mod-a/target/reports")
        );

        let grouped = ReportConfig {
            group_directory: "it".to_string(),
            ..ReportConfig::default()
        };
        assert_eq!(
            ReportOrchestrator::new(&grouped, &graph).output_dir(&m),
            PathBuf::from("/work/mod-a/target/reports/it")
        );
    }
}
