//! Sumar: coverage aggregation and reporting for multi-module projects.
//!
//! Sumar merges binary probe recordings produced by the modules of a
//! build, correlates them with each module's compiled artifacts and
//! source tree, and renders consolidated coverage reports.
//!
//! # Architecture
//!
//! ```text
//! recordings (*.exec) ──► ExecFileLoader ──► Execution/Session stores
//!                                                   │
//! artifacts (*.probemap) ──► BundleCreator ◄────────┘
//!                                  │
//!                           BundleCoverage ──► MultiReportVisitor
//!                                                │    │    │
//!                                               xml  csv  html
//! ```
//!
//! The [`orchestrator::ReportOrchestrator`] drives the per-module and
//! aggregate phases over a [`graph::ModuleGraph`]; the
//! [`merge::MergeRunner`] shares the loader but terminates at a merged
//! recording file instead of a report.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod analysis;
pub mod exec;
pub mod filter;
pub mod graph;
pub mod merge;
pub mod orchestrator;
pub mod report;
pub mod result;
pub mod source;

pub use analysis::{Analyzer, BundleCoverage, BundleCreator, Counter, Counters, ProbeMap};
pub use exec::{ExecFileLoader, ExecutionData, ExecutionDataStore, SessionInfo, SessionInfoStore};
pub use filter::{ArtifactFilter, FileFilterSpec};
pub use graph::{Module, ModuleGraph, Packaging};
pub use merge::{MergeConfig, MergeRunner, MergeSpec, MergeSummary};
pub use orchestrator::{ReportConfig, ReportOrchestrator, RunSummary, DEFAULT_DATA_FILE};
pub use report::{MultiReportVisitor, ReportFormat, ReportVisitor};
pub use result::{SumarError, SumarResult};
pub use source::{SourceFileCollection, SourceLocator, TAB_WIDTH};
