//! Sumador CLI library: command definitions, configuration and handlers.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
mod project;

pub mod handlers;

pub use commands::{Cli, Commands, FormatArg, MergeArgs, ReportArgs};
pub use config::{CliConfig, Verbosity};
pub use error::{CliError, CliResult};
pub use project::ProjectManifest;
