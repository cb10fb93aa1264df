//! Report command handler

use crate::commands::ReportArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::project::ProjectManifest;
use std::path::Path;
use sumar::{ReportConfig, ReportOrchestrator};

/// Execute the report command
pub fn execute_report(config: &CliConfig, args: &ReportArgs) -> CliResult<()> {
    let manifest = ProjectManifest::load(&args.project)?;
    let manifest_dir = args.project.parent().unwrap_or_else(|| Path::new("."));
    let graph = manifest.to_graph(manifest_dir);

    let report_config = build_report_config(args, &manifest);
    let summary = ReportOrchestrator::new(&report_config, &graph).run()?;

    if !config.verbosity.is_quiet() {
        println!(
            "Rendered {} module report(s); aggregate visited {} module(s)",
            summary.module_reports, summary.aggregate_modules
        );
    }
    Ok(())
}

/// Merge CLI arguments with manifest-level settings.
fn build_report_config(args: &ReportArgs, manifest: &ProjectManifest) -> ReportConfig {
    ReportConfig {
        data_files: args.data_files.clone(),
        includes: args.includes.clone(),
        excludes: args.excludes.clone(),
        strict: args.strict,
        skip: args.skip,
        skip_module: args.skip_module,
        aggregate: !args.no_aggregate,
        exclude_modules: args.exclude_modules.clone(),
        formats: args.formats.iter().map(|f| (*f).into()).collect(),
        output_encoding: args.output_encoding.clone(),
        source_encoding: args.source_encoding.clone(),
        group_name: args.group_name.clone().or_else(|| manifest.group_name.clone()),
        group_directory: args
            .group_directory
            .clone()
            .or_else(|| manifest.group_directory.clone())
            .unwrap_or_default(),
    }
}
