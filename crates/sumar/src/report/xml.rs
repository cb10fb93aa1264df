//! Structured-markup renderer: one `coverage.xml` per report.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <report name="demo">
//!   <sessioninfo id="host-1" start="..." dump="..."/>
//!   <group name="mod-a">
//!     <package name="demo/util">
//!       <class name="demo/util/Parser" sourcefilename="parser.rs">
//!         <method name="parse" line="10">...</method>
//!         <counter type="LINE" missed="1" covered="2"/>
//!       </class>
//!     </package>
//!   </group>
//! </report>
//! ```

use super::{escape_markup, ReportVisitor};
use crate::analysis::{BundleCoverage, Counter, Counters};
use crate::exec::{ExecutionDataStore, SessionInfoStore};
use crate::result::{SumarError, SumarResult};
use crate::source::SourceLocator;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write as _;
use std::path::Path;

/// Renders the structured-markup report.
#[derive(Debug)]
pub struct XmlReportVisitor {
    output: File,
    encoding: String,
    sessions_xml: String,
    body: String,
    root_name: Option<String>,
    grouped: bool,
    totals: Counters,
}

impl XmlReportVisitor {
    /// Open `coverage.xml` in the output directory
    pub fn create(output_dir: &Path, output_encoding: &str) -> SumarResult<Self> {
        let path = output_dir.join("coverage.xml");
        let output = File::create(&path).map_err(|e| SumarError::file(&path, e))?;
        Ok(Self {
            output,
            encoding: output_encoding.to_string(),
            sessions_xml: String::new(),
            body: String::new(),
            root_name: None,
            grouped: false,
            totals: Counters::default(),
        })
    }

    fn write_counters(out: &mut String, counters: &Counters, indent: &str) {
        for (kind, counter) in [
            ("LINE", counters.lines),
            ("METHOD", counters.methods),
            ("CLASS", counters.classes),
        ] {
            Self::write_counter(out, kind, counter, indent);
        }
    }

    fn write_counter(out: &mut String, kind: &str, counter: Counter, indent: &str) {
        if counter.total() > 0 {
            let _ = writeln!(
                out,
                r#"{indent}<counter type="{kind}" missed="{}" covered="{}"/>"#,
                counter.missed(),
                counter.covered()
            );
        }
    }

    fn render_packages(out: &mut String, bundle: &BundleCoverage, indent: &str) {
        for package in bundle.packages() {
            let _ = writeln!(
                out,
                r#"{indent}<package name="{}">"#,
                escape_markup(package.name())
            );
            for class in package.classes() {
                let _ = writeln!(
                    out,
                    r#"{indent}  <class name="{}" sourcefilename="{}">"#,
                    escape_markup(class.name()),
                    escape_markup(class.source_file())
                );
                for method in class.methods() {
                    let line_attr = method
                        .first_line()
                        .map_or(String::new(), |l| format!(r#" line="{l}""#));
                    let _ = writeln!(
                        out,
                        r#"{indent}    <method name="{}" desc="{}"{line_attr}>"#,
                        escape_markup(method.name()),
                        escape_markup(method.desc())
                    );
                    Self::write_counter(
                        out,
                        "LINE",
                        method.counters().lines,
                        &format!("{indent}      "),
                    );
                    Self::write_counter(
                        out,
                        "METHOD",
                        method.counters().methods,
                        &format!("{indent}      "),
                    );
                    let _ = writeln!(out, "{indent}    </method>");
                }
                Self::write_counters(out, class.counters(), &format!("{indent}    "));
                let _ = writeln!(out, "{indent}  </class>");
            }
            Self::write_counters(out, package.counters(), &format!("{indent}  "));
            let _ = writeln!(out, "{indent}</package>");
        }
    }
}

impl ReportVisitor for XmlReportVisitor {
    fn visit_info(
        &mut self,
        sessions: &SessionInfoStore,
        _executions: &ExecutionDataStore,
    ) -> SumarResult<()> {
        for info in sessions.infos() {
            let _ = writeln!(
                self.sessions_xml,
                r#"  <sessioninfo id="{}" start="{}" dump="{}"/>"#,
                escape_markup(&info.id),
                info.start,
                info.dump
            );
        }
        Ok(())
    }

    fn visit_group(&mut self, name: &str) -> SumarResult<()> {
        self.root_name = Some(name.to_string());
        self.grouped = true;
        Ok(())
    }

    fn visit_bundle(
        &mut self,
        bundle: &BundleCoverage,
        _sources: &dyn SourceLocator,
    ) -> SumarResult<()> {
        self.totals.add(bundle.counters());
        if self.grouped {
            let _ = writeln!(
                self.body,
                r#"  <group name="{}">"#,
                escape_markup(bundle.name())
            );
            Self::render_packages(&mut self.body, bundle, "    ");
            Self::write_counters(&mut self.body, bundle.counters(), "    ");
            let _ = writeln!(self.body, "  </group>");
        } else {
            if self.root_name.is_none() {
                self.root_name = Some(bundle.name().to_string());
            }
            Self::render_packages(&mut self.body, bundle, "  ");
        }
        Ok(())
    }

    fn visit_end(&mut self) -> SumarResult<()> {
        let name = self.root_name.clone().unwrap_or_default();
        let mut document = format!("<?xml version=\"1.0\" encoding=\"{}\"?>\n", self.encoding);
        let _ = writeln!(document, r#"<report name="{}">"#, escape_markup(&name));
        document.push_str(&self.sessions_xml);
        document.push_str(&self.body);
        Self::write_counters(&mut document, &self.totals, "  ");
        document.push_str("</report>\n");

        self.output.write_all(document.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }
}
