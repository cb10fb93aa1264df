//! Merge command handler

use crate::commands::MergeArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::project::ProjectManifest;
use std::path::Path;
use sumar::{MergeConfig, MergeRunner, MergeSpec};

/// Execute the merge command
pub fn execute_merge(config: &CliConfig, args: &MergeArgs) -> CliResult<()> {
    let manifest = ProjectManifest::load(&args.project)?;
    let manifest_dir = args.project.parent().unwrap_or_else(|| Path::new("."));
    let graph = manifest.to_graph(manifest_dir);

    let specs = merge_specs(args, &manifest)?;
    if specs.is_empty() {
        if !config.verbosity.is_quiet() {
            println!("No merge outputs configured, nothing to do");
        }
        return Ok(());
    }

    // relative output directories land under the execution root module
    let output_dir = if args.output_dir.is_absolute() {
        args.output_dir.clone()
    } else {
        graph.root().map_err(CliError::from)?.resolve(&args.output_dir)
    };

    let merge_config =
        MergeConfig::new(specs, output_dir).with_strict(!args.no_strict);
    let summary = MergeRunner::new(&merge_config, &graph).run()?;

    if !config.verbosity.is_quiet() {
        println!(
            "Wrote {} merged recording(s), skipped {}",
            summary.written.len(),
            summary.skipped
        );
        for path in &summary.written {
            println!("  {}", path.display());
        }
    }
    Ok(())
}

/// A single spec from `--input`/`--output`, or the manifest's merge list.
fn merge_specs(args: &MergeArgs, manifest: &ProjectManifest) -> CliResult<Vec<MergeSpec>> {
    if args.inputs.is_empty() {
        if args.output.is_some() {
            return Err(CliError::invalid_argument(
                "--output requires at least one --input",
            ));
        }
        return Ok(manifest.merges.clone());
    }
    let Some(output) = args.output.clone() else {
        return Err(CliError::invalid_argument(
            "--input requires --output for the merged file",
        ));
    };
    Ok(vec![MergeSpec {
        inputs: args.inputs.clone(),
        output,
    }])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::Parser;

    fn manifest() -> ProjectManifest {
        toml::from_str(
            r#"
[[module]]
id = "root"
basedir = "."
output-dir = "target/reports"
artifact-dir = "target/probemaps"
execution-root = true

[[merge]]
inputs = ["target/it.exec"]
output = "merged/it.exec"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_manifest_specs_used_by_default() {
        let args = MergeArgs::parse_from(["merge"]);
        let specs = merge_specs(&args, &manifest()).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].output, "merged/it.exec");
    }

    #[test]
    fn test_cli_spec_overrides_manifest() {
        let args = MergeArgs::parse_from([
            "merge",
            "--input",
            "target/unit.exec",
            "--input",
            "target/it.exec",
            "--output",
            "all.exec",
        ]);
        let specs = merge_specs(&args, &manifest()).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].inputs.len(), 2);
        assert_eq!(specs[0].output, "all.exec");
    }

    #[test]
    fn test_input_without_output_is_invalid() {
        let args = MergeArgs::parse_from(["merge", "--input", "target/it.exec"]);
        assert!(merge_specs(&args, &manifest()).is_err());
    }

    #[test]
    fn test_output_without_input_is_invalid() {
        let args = MergeArgs::parse_from(["merge", "--output", "all.exec"]);
        assert!(merge_specs(&args, &manifest()).is_err());
    }
}
