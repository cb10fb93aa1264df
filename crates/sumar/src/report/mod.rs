//! Report rendering: a visitor contract shared by all output formats and
//! a composite fanning one visit sequence out to every configured format.
//!
//! Call order per report: `visit_info` once, optionally `visit_group`
//! (aggregate reports), `visit_bundle` per module, `visit_end` once and
//! only if at least one bundle was visited.

mod csv;
mod html;
mod xml;

pub use csv::CsvReportVisitor;
pub use html::HtmlReportVisitor;
pub use xml::XmlReportVisitor;

use crate::analysis::BundleCoverage;
use crate::exec::{ExecutionDataStore, SessionInfoStore};
use crate::result::{SumarError, SumarResult};
use crate::source::SourceLocator;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Report output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Structured markup (`coverage.xml`)
    Xml,
    /// Tabular (`coverage.csv`)
    Csv,
    /// Navigable page set (`index.html` and friends)
    Html,
}

impl std::str::FromStr for ReportFormat {
    type Err = SumarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(Self::Xml),
            "csv" => Ok(Self::Csv),
            "html" => Ok(Self::Html),
            other => Err(SumarError::config(format!(
                "unknown report format {other:?} (expected xml, csv or html)"
            ))),
        }
    }
}

/// One renderer's view of a report.
pub trait ReportVisitor {
    /// Called once before any bundle, with the sessions and merged
    /// execution data backing the report.
    fn visit_info(
        &mut self,
        sessions: &SessionInfoStore,
        executions: &ExecutionDataStore,
    ) -> SumarResult<()>;

    /// Enter the named group an aggregate report nests its bundles under.
    fn visit_group(&mut self, name: &str) -> SumarResult<()>;

    /// Render one module's bundle.
    fn visit_bundle(
        &mut self,
        bundle: &BundleCoverage,
        sources: &dyn SourceLocator,
    ) -> SumarResult<()>;

    /// Finalize the report. Only called when at least one bundle was
    /// visited.
    fn visit_end(&mut self) -> SumarResult<()>;
}

/// A configured renderer; formats are a closed set of variants.
#[derive(Debug)]
pub enum FormatVisitor {
    /// Structured markup renderer
    Xml(XmlReportVisitor),
    /// Tabular renderer
    Csv(CsvReportVisitor),
    /// Navigable page-set renderer
    Html(HtmlReportVisitor),
}

impl FormatVisitor {
    /// Construct the renderer for a format, opening its output eagerly.
    ///
    /// A failure to create the output directory or open a stream is a
    /// fatal I/O error.
    pub fn create(
        format: ReportFormat,
        output_dir: &Path,
        group_name: Option<&str>,
        output_encoding: &str,
    ) -> SumarResult<Self> {
        std::fs::create_dir_all(output_dir).map_err(|e| SumarError::file(output_dir, e))?;
        match format {
            ReportFormat::Xml => Ok(Self::Xml(XmlReportVisitor::create(
                output_dir,
                output_encoding,
            )?)),
            ReportFormat::Csv => Ok(Self::Csv(CsvReportVisitor::create(output_dir)?)),
            ReportFormat::Html => Ok(Self::Html(HtmlReportVisitor::create(
                output_dir,
                group_name,
                output_encoding,
            )?)),
        }
    }
}

impl ReportVisitor for FormatVisitor {
    fn visit_info(
        &mut self,
        sessions: &SessionInfoStore,
        executions: &ExecutionDataStore,
    ) -> SumarResult<()> {
        match self {
            Self::Xml(v) => v.visit_info(sessions, executions),
            Self::Csv(v) => v.visit_info(sessions, executions),
            Self::Html(v) => v.visit_info(sessions, executions),
        }
    }

    fn visit_group(&mut self, name: &str) -> SumarResult<()> {
        match self {
            Self::Xml(v) => v.visit_group(name),
            Self::Csv(v) => v.visit_group(name),
            Self::Html(v) => v.visit_group(name),
        }
    }

    fn visit_bundle(
        &mut self,
        bundle: &BundleCoverage,
        sources: &dyn SourceLocator,
    ) -> SumarResult<()> {
        match self {
            Self::Xml(v) => v.visit_bundle(bundle, sources),
            Self::Csv(v) => v.visit_bundle(bundle, sources),
            Self::Html(v) => v.visit_bundle(bundle, sources),
        }
    }

    fn visit_end(&mut self) -> SumarResult<()> {
        match self {
            Self::Xml(v) => v.visit_end(),
            Self::Csv(v) => v.visit_end(),
            Self::Html(v) => v.visit_end(),
        }
    }
}

/// Fans every visit call out to the configured renderers, in order.
///
/// The first renderer failure aborts the sequence; formats that already
/// flushed keep their output.
#[derive(Debug, Default)]
pub struct MultiReportVisitor {
    visitors: Vec<FormatVisitor>,
}

impl MultiReportVisitor {
    /// Build the renderer set for the configured formats.
    pub fn create(
        formats: &[ReportFormat],
        output_dir: &Path,
        group_name: Option<&str>,
        output_encoding: &str,
    ) -> SumarResult<Self> {
        let visitors = formats
            .iter()
            .map(|format| FormatVisitor::create(*format, output_dir, group_name, output_encoding))
            .collect::<SumarResult<Vec<_>>>()?;
        Ok(Self { visitors })
    }

    /// Number of configured renderers
    #[must_use]
    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    /// Whether no renderer is configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }
}

impl ReportVisitor for MultiReportVisitor {
    fn visit_info(
        &mut self,
        sessions: &SessionInfoStore,
        executions: &ExecutionDataStore,
    ) -> SumarResult<()> {
        for visitor in &mut self.visitors {
            visitor.visit_info(sessions, executions)?;
        }
        Ok(())
    }

    fn visit_group(&mut self, name: &str) -> SumarResult<()> {
        for visitor in &mut self.visitors {
            visitor.visit_group(name)?;
        }
        Ok(())
    }

    fn visit_bundle(
        &mut self,
        bundle: &BundleCoverage,
        sources: &dyn SourceLocator,
    ) -> SumarResult<()> {
        for visitor in &mut self.visitors {
            visitor.visit_bundle(bundle, sources)?;
        }
        Ok(())
    }

    fn visit_end(&mut self) -> SumarResult<()> {
        for visitor in &mut self.visitors {
            visitor.visit_end()?;
        }
        Ok(())
    }
}

/// Escape text for XML/HTML body and attribute positions.
pub(crate) fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
