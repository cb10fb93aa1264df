//! Coverage analysis: probe-map artifacts, counters, the hierarchical
//! bundle tree, and the analyzer correlating recordings with artifacts.

mod analyzer;
mod bundle;
mod bundler;
mod counter;
mod probe_map;

pub use analyzer::Analyzer;
pub use bundle::{
    BundleCoverage, ClassCoverage, LineCoverage, LineStatus, MethodCoverage, PackageCoverage,
};
pub use bundler::BundleCreator;
pub use counter::{Counter, Counters};
pub use probe_map::{LineProbes, MethodProbes, ProbeMap, ARTIFACT_EXTENSION};
