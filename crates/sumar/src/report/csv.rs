//! Tabular renderer: one `coverage.csv` row per class.

use super::ReportVisitor;
use crate::analysis::BundleCoverage;
use crate::exec::{ExecutionDataStore, SessionInfoStore};
use crate::result::{SumarError, SumarResult};
use crate::source::SourceLocator;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const HEADER: &str = "GROUP,PACKAGE,CLASS,LINE_MISSED,LINE_COVERED,\
METHOD_MISSED,METHOD_COVERED,CLASS_MISSED,CLASS_COVERED";

/// Renders the tabular report.
#[derive(Debug)]
pub struct CsvReportVisitor {
    output: BufWriter<File>,
}

impl CsvReportVisitor {
    /// Open `coverage.csv` in the output directory and write the header
    pub fn create(output_dir: &Path) -> SumarResult<Self> {
        let path = output_dir.join("coverage.csv");
        let file = File::create(&path).map_err(|e| SumarError::file(&path, e))?;
        let mut output = BufWriter::new(file);
        writeln!(output, "{HEADER}")?;
        Ok(Self { output })
    }

    fn quote(field: &str) -> String {
        if field.contains([',', '"', '\n']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}

impl ReportVisitor for CsvReportVisitor {
    fn visit_info(
        &mut self,
        _sessions: &SessionInfoStore,
        _executions: &ExecutionDataStore,
    ) -> SumarResult<()> {
        Ok(())
    }

    fn visit_group(&mut self, _name: &str) -> SumarResult<()> {
        Ok(())
    }

    fn visit_bundle(
        &mut self,
        bundle: &BundleCoverage,
        _sources: &dyn SourceLocator,
    ) -> SumarResult<()> {
        for package in bundle.packages() {
            for class in package.classes() {
                let c = class.counters();
                writeln!(
                    self.output,
                    "{},{},{},{},{},{},{},{},{}",
                    Self::quote(bundle.name()),
                    Self::quote(package.name()),
                    Self::quote(class.simple_name()),
                    c.lines.missed(),
                    c.lines.covered(),
                    c.methods.missed(),
                    c.methods.covered(),
                    c.classes.missed(),
                    c.classes.covered(),
                )?;
            }
        }
        Ok(())
    }

    fn visit_end(&mut self) -> SumarResult<()> {
        self.output.flush()?;
        Ok(())
    }
}
