//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use sumar::ReportFormat;

/// Sumador: CLI for Sumar - multi-module coverage aggregation and reporting
#[derive(Parser, Debug)]
#[command(name = "sumador")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate per-module and aggregate coverage reports
    Report(ReportArgs),

    /// Merge recording files across modules without rendering
    Merge(MergeArgs),
}

/// Report output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    /// Structured markup (coverage.xml)
    Xml,
    /// Tabular (coverage.csv)
    Csv,
    /// Navigable page set (index.html)
    Html,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Xml => Self::Xml,
            FormatArg::Csv => Self::Csv,
            FormatArg::Html => Self::Html,
        }
    }
}

impl std::fmt::Display for FormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Xml => "xml",
            Self::Csv => "csv",
            Self::Html => "html",
        };
        write!(f, "{name}")
    }
}

/// Arguments for the report command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReportArgs {
    /// Project manifest describing the module graph
    #[arg(short, long, default_value = "sumar.toml")]
    pub project: PathBuf,

    /// Recording files, relative to each contributing module
    #[arg(long = "data-file")]
    pub data_files: Vec<String>,

    /// Artifact include globs (everything when omitted)
    #[arg(long = "include")]
    pub includes: Vec<String>,

    /// Artifact exclude globs
    #[arg(long = "exclude")]
    pub excludes: Vec<String>,

    /// Fail on missing data files instead of warning
    #[arg(long)]
    pub strict: bool,

    /// Suppress the whole run
    #[arg(long)]
    pub skip: bool,

    /// Do not produce a report for each module
    #[arg(long)]
    pub skip_module: bool,

    /// Do not produce the aggregate report at the execution root
    #[arg(long)]
    pub no_aggregate: bool,

    /// Regexes dropping whole modules from the aggregate report
    #[arg(long = "exclude-module")]
    pub exclude_modules: Vec<String>,

    /// Report formats to render
    #[arg(long = "format", value_enum, default_values_t = [FormatArg::Xml, FormatArg::Html])]
    pub formats: Vec<FormatArg>,

    /// Encoding of the generated reports
    #[arg(long, default_value = "UTF-8")]
    pub output_encoding: String,

    /// Encoding of the source files
    #[arg(long, default_value = "UTF-8")]
    pub source_encoding: String,

    /// Report title postfix (overrides the manifest)
    #[arg(long)]
    pub group_name: Option<String>,

    /// Subdirectory under each module's output directory (overrides the
    /// manifest)
    #[arg(long)]
    pub group_directory: Option<String>,
}

/// Arguments for the merge command
#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// Project manifest describing the module graph
    #[arg(short, long, default_value = "sumar.toml")]
    pub project: PathBuf,

    /// Input recording files for a single merge job, relative to each
    /// contributing module (manifest merge entries are used when omitted)
    #[arg(long = "input")]
    pub inputs: Vec<String>,

    /// Output file for the single merge job given with --input
    #[arg(long)]
    pub output: Option<String>,

    /// Directory merged outputs are written under, relative to the
    /// execution root module
    #[arg(long, default_value = "target/sumar")]
    pub output_dir: PathBuf,

    /// Treat missing inputs and empty results as warnings
    #[arg(long)]
    pub no_strict: bool,
}
