//! Probe-map artifacts: per-class metadata emitted at build time mapping
//! probe indices to methods and source lines.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// File extension of probe-map artifacts
pub const ARTIFACT_EXTENSION: &str = "probemap";

/// Probe indices attached to one source line of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineProbes {
    /// 1-based source line number
    pub line: u32,
    /// Probe indices recorded on this line
    pub probes: Vec<u32>,
}

/// One method of an instrumented class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodProbes {
    /// Method name
    pub name: String,
    /// Parameter/return descriptor, free-form
    #[serde(default)]
    pub desc: String,
    /// Line-to-probe mapping; empty when compiled without debug info
    #[serde(default)]
    pub lines: Vec<LineProbes>,
}

/// Metadata for one instrumented class-like unit.
///
/// Identity is derived from this content, not assigned: recompiling a class
/// with a different probe layout yields a different [`Self::class_id`], so
/// stale recordings can never be merged into the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeMap {
    /// Class name in `/`-separated package form, e.g. `demo/util/Parser`
    pub name: String,
    /// Simple source file name, e.g. `parser.rs`
    pub source_file: String,
    /// Methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodProbes>,
    /// Total number of probes instrumented into the class
    pub probe_count: u32,
}

impl ProbeMap {
    /// Parse a probe map from its JSON encoding
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Content-derived 64-bit class identity.
    ///
    /// First 8 bytes (big-endian) of the SHA-256 digest over the canonical
    /// encoding of name, probe count and the method/line/probe layout.
    #[must_use]
    pub fn class_id(&self) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update([0]);
        hasher.update(self.probe_count.to_be_bytes());
        for method in &self.methods {
            hasher.update(method.name.as_bytes());
            hasher.update([0]);
            hasher.update(method.desc.as_bytes());
            hasher.update([0]);
            for line in &method.lines {
                hasher.update(line.line.to_be_bytes());
                for probe in &line.probes {
                    hasher.update(probe.to_be_bytes());
                }
            }
        }
        let digest = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(prefix)
    }

    /// Package part of the name, empty for the default package
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.name.rsplit_once('/').map_or("", |(pkg, _)| pkg)
    }

    /// Simple class name without the package
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit_once('/').map_or(&*self.name, |(_, n)| n)
    }

    /// Check that every referenced probe index is within `probe_count`.
    pub fn validate(&self) -> Result<(), String> {
        for method in &self.methods {
            for line in &method.lines {
                if let Some(bad) = line.probes.iter().find(|p| **p >= self.probe_count) {
                    return Err(format!(
                        "method {} references probe {bad} but only {} probes exist",
                        method.name, self.probe_count
                    ));
                }
            }
        }
        Ok(())
    }
}
