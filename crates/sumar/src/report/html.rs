//! Navigable page-set renderer.
//!
//! Page layout per report directory:
//!
//! ```text
//! index.html            bundle overview, or group overview for aggregates
//! sessions.html         recording sessions backing the report
//! style.css
//! <bundle>/index.html   per-bundle page (aggregate reports only)
//! <package>/index.html  classes of one package
//! <package>/<file>.html annotated source listing
//! ```

use super::{escape_markup, ReportVisitor};
use crate::analysis::{BundleCoverage, ClassCoverage, Counter, Counters, LineStatus, PackageCoverage};
use crate::exec::{ExecutionDataStore, SessionInfo, SessionInfoStore};
use crate::result::{SumarError, SumarResult};
use crate::source::SourceLocator;
use chrono::DateTime;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const STYLE: &str = "\
body { font-family: sans-serif; margin: 1.5em; color: #222; }
h1 { font-size: 1.3em; }
table { border-collapse: collapse; min-width: 40em; }
th, td { border: 1px solid #ccc; padding: 0.3em 0.6em; text-align: left; }
td.ctr, th.ctr { text-align: right; }
tfoot td { font-weight: bold; }
pre.source { font-family: monospace; line-height: 1.35; }
pre.source span.covered { background: #cfc; display: block; }
pre.source span.partial { background: #ffc; display: block; }
pre.source span.missed { background: #fcc; display: block; }
pre.source span.nocode { display: block; }
.footer { margin-top: 2em; font-size: 0.8em; color: #777; }
";

/// Per-bundle entry collected for the group overview page.
#[derive(Debug)]
struct BundleEntry {
    name: String,
    href: String,
    counters: Counters,
}

/// Renders the navigable page set.
#[derive(Debug)]
pub struct HtmlReportVisitor {
    root: PathBuf,
    title_postfix: String,
    encoding: String,
    group: Option<String>,
    entries: Vec<BundleEntry>,
    sessions: Vec<SessionInfo>,
}

impl HtmlReportVisitor {
    /// Prepare the output directory and write the stylesheet
    pub fn create(
        output_dir: &Path,
        group_name: Option<&str>,
        output_encoding: &str,
    ) -> SumarResult<Self> {
        let style_path = output_dir.join("style.css");
        std::fs::write(&style_path, STYLE).map_err(|e| SumarError::file(&style_path, e))?;
        Ok(Self {
            root: output_dir.to_path_buf(),
            title_postfix: group_name.map_or_else(String::new, |g| format!(" ({g})")),
            encoding: output_encoding.to_string(),
            group: None,
            entries: Vec::new(),
            sessions: Vec::new(),
        })
    }

    /// Directory-safe name: `/` becomes `.`, anything exotic `_`.
    fn sanitize(name: &str) -> String {
        if name.is_empty() {
            return "default".to_string();
        }
        name.chars()
            .map(|c| match c {
                '/' => '.',
                c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' => c,
                _ => '_',
            })
            .collect()
    }

    fn write_page(
        path: &Path,
        title: &str,
        css_href: &str,
        encoding: &str,
        body: &str,
    ) -> SumarResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SumarError::file(parent, e))?;
        }
        let mut page = String::new();
        let _ = writeln!(page, "<!DOCTYPE html>");
        let _ = writeln!(page, "<html><head><meta charset=\"{encoding}\"/>");
        let _ = writeln!(page, "<title>{}</title>", escape_markup(title));
        let _ = writeln!(
            page,
            "<link rel=\"stylesheet\" href=\"{css_href}\"/></head><body>"
        );
        let _ = writeln!(page, "<h1>{}</h1>", escape_markup(title));
        page.push_str(body);
        page.push_str("<p class=\"footer\">Generated by sumar</p></body></html>\n");
        std::fs::write(path, page).map_err(|e| SumarError::file(path, e))
    }

    fn counter_cells(out: &mut String, counters: &Counters) {
        for counter in [counters.lines, counters.methods, counters.classes] {
            Self::counter_cell(out, counter);
        }
    }

    fn counter_cell(out: &mut String, counter: Counter) {
        if counter.total() == 0 {
            out.push_str("<td class=\"ctr\">-</td><td class=\"ctr\">n/a</td>");
        } else {
            let _ = write!(
                out,
                "<td class=\"ctr\">{} / {}</td><td class=\"ctr\">{:.0}%</td>",
                counter.missed(),
                counter.total(),
                counter.covered_ratio() * 100.0
            );
        }
    }

    const COUNTER_HEADER: &'static str = "<th class=\"ctr\">Missed Lines</th>\
<th class=\"ctr\">Lines</th>\
<th class=\"ctr\">Missed Methods</th>\
<th class=\"ctr\">Methods</th>\
<th class=\"ctr\">Missed Classes</th>\
<th class=\"ctr\">Classes</th>";

    /// Render one bundle's pages under `dir`; `depth` is the directory
    /// depth of `dir` below the report root.
    fn render_bundle(
        &self,
        dir: &Path,
        depth: usize,
        bundle: &BundleCoverage,
        sources: &dyn SourceLocator,
    ) -> SumarResult<()> {
        let css = "../".repeat(depth) + "style.css";
        let mut body = String::new();
        let _ = writeln!(
            body,
            "<table><thead><tr><th>Package</th>{}</tr></thead><tbody>",
            Self::COUNTER_HEADER
        );
        for package in bundle.packages() {
            let pkg_dir = Self::sanitize(package.name());
            let display = if package.name().is_empty() {
                "(default)"
            } else {
                package.name()
            };
            let _ = write!(
                body,
                "<tr><td><a href=\"{pkg_dir}/index.html\">{}</a></td>",
                escape_markup(display)
            );
            Self::counter_cells(&mut body, package.counters());
            body.push_str("</tr>\n");

            self.render_package(&dir.join(&pkg_dir), depth + 1, package, sources)?;
        }
        body.push_str("</tbody><tfoot><tr><td>Total</td>");
        Self::counter_cells(&mut body, bundle.counters());
        body.push_str("</tr></tfoot></table>\n");
        let _ = writeln!(
            body,
            "<p><a href=\"{}sessions.html\">Sessions</a></p>",
            "../".repeat(depth)
        );

        Self::write_page(
            &dir.join("index.html"),
            &format!("{}{}", bundle.name(), self.title_postfix),
            &css,
            &self.encoding,
            &body,
        )
    }

    fn render_package(
        &self,
        dir: &Path,
        depth: usize,
        package: &PackageCoverage,
        sources: &dyn SourceLocator,
    ) -> SumarResult<()> {
        let css = "../".repeat(depth) + "style.css";
        let mut body = String::new();
        let _ = writeln!(
            body,
            "<table><thead><tr><th>Class</th>{}</tr></thead><tbody>",
            Self::COUNTER_HEADER
        );

        // classes sharing a source file are annotated onto one listing
        let mut by_source: BTreeMap<&str, Vec<&ClassCoverage>> = BTreeMap::new();
        for class in package.classes() {
            by_source.entry(class.source_file()).or_default().push(class);

            let source_page = format!("{}.html", Self::sanitize(class.source_file()));
            let has_source = sources
                .read_source(package.name(), class.source_file())
                .is_some();
            let cell = if has_source {
                format!(
                    "<a href=\"{source_page}\">{}</a>",
                    escape_markup(class.simple_name())
                )
            } else {
                escape_markup(class.simple_name())
            };
            let _ = write!(body, "<tr><td>{cell}</td>");
            Self::counter_cells(&mut body, class.counters());
            body.push_str("</tr>\n");
        }
        body.push_str("</tbody><tfoot><tr><td>Total</td>");
        Self::counter_cells(&mut body, package.counters());
        body.push_str("</tr></tfoot></table>\n");
        let _ = writeln!(body, "<p><a href=\"index.html\">Back</a></p>");

        for (source_file, classes) in by_source {
            if let Some(text) = sources.read_source(package.name(), source_file) {
                let page = dir.join(format!("{}.html", Self::sanitize(source_file)));
                self.render_source(&page, &css, source_file, &text, &classes, sources)?;
            }
        }

        let display = if package.name().is_empty() {
            "(default)".to_string()
        } else {
            package.name().to_string()
        };
        Self::write_page(
            &dir.join("index.html"),
            &format!("{display}{}", self.title_postfix),
            &css,
            &self.encoding,
            &body,
        )
    }

    fn render_source(
        &self,
        path: &Path,
        css_href: &str,
        source_file: &str,
        text: &str,
        classes: &[&ClassCoverage],
        sources: &dyn SourceLocator,
    ) -> SumarResult<()> {
        // merged per-line status across all classes of this source file
        let mut statuses: BTreeMap<u32, LineStatus> = BTreeMap::new();
        for class in classes {
            for method in class.methods() {
                for line in method.lines() {
                    let status = line.status();
                    let merged = match (statuses.get(&line.line()), status) {
                        (None, s) => s,
                        (Some(LineStatus::Covered), LineStatus::Covered) => LineStatus::Covered,
                        (Some(LineStatus::Missed), LineStatus::Missed) => LineStatus::Missed,
                        _ => LineStatus::Partial,
                    };
                    let _ = statuses.insert(line.line(), merged);
                }
            }
        }

        let tab = " ".repeat(sources.tab_width());
        let mut body = String::from("<pre class=\"source\">\n");
        for (index, raw) in text.lines().enumerate() {
            let number = (index + 1) as u32;
            let class = match statuses.get(&number) {
                Some(LineStatus::Covered) => "covered",
                Some(LineStatus::Partial) => "partial",
                Some(LineStatus::Missed) => "missed",
                None => "nocode",
            };
            let rendered = escape_markup(&raw.replace('\t', &tab));
            let _ = writeln!(
                body,
                "<span class=\"{class}\" id=\"L{number}\">{number:>5} | {rendered}</span>"
            );
        }
        body.push_str("</pre>\n<p><a href=\"index.html\">Back</a></p>\n");

        Self::write_page(path, source_file, css_href, &self.encoding, &body)
    }

    fn render_group_index(&self) -> SumarResult<()> {
        let Some(group) = &self.group else {
            return Ok(());
        };
        let mut body = String::new();
        let _ = writeln!(
            body,
            "<table><thead><tr><th>Module</th>{}</tr></thead><tbody>",
            Self::COUNTER_HEADER
        );
        let mut totals = Counters::default();
        for entry in &self.entries {
            totals.add(&entry.counters);
            let _ = write!(
                body,
                "<tr><td><a href=\"{}\">{}</a></td>",
                entry.href,
                escape_markup(&entry.name)
            );
            Self::counter_cells(&mut body, &entry.counters);
            body.push_str("</tr>\n");
        }
        body.push_str("</tbody><tfoot><tr><td>Total</td>");
        Self::counter_cells(&mut body, &totals);
        body.push_str("</tr></tfoot></table>\n");
        body.push_str("<p><a href=\"sessions.html\">Sessions</a></p>\n");

        Self::write_page(
            &self.root.join("index.html"),
            &format!("{group}{}", self.title_postfix),
            "style.css",
            &self.encoding,
            &body,
        )
    }

    fn render_sessions(&self) -> SumarResult<()> {
        let mut body = String::new();
        if self.sessions.is_empty() {
            body.push_str("<p>No sessions recorded.</p>\n");
        } else {
            body.push_str(
                "<table><thead><tr><th>Session</th><th>Start</th><th>Dump</th></tr></thead><tbody>\n",
            );
            for info in &self.sessions {
                let _ = writeln!(
                    body,
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_markup(&info.id),
                    format_millis(info.start),
                    format_millis(info.dump)
                );
            }
            body.push_str("</tbody></table>\n");
        }
        body.push_str("<p><a href=\"index.html\">Back</a></p>\n");
        Self::write_page(
            &self.root.join("sessions.html"),
            &format!("Sessions{}", self.title_postfix),
            "style.css",
            &self.encoding,
            &body,
        )
    }
}

fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis).map_or_else(
        || millis.to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
    )
}

impl ReportVisitor for HtmlReportVisitor {
    fn visit_info(
        &mut self,
        sessions: &SessionInfoStore,
        _executions: &ExecutionDataStore,
    ) -> SumarResult<()> {
        self.sessions = sessions.infos().to_vec();
        Ok(())
    }

    fn visit_group(&mut self, name: &str) -> SumarResult<()> {
        self.group = Some(name.to_string());
        Ok(())
    }

    fn visit_bundle(
        &mut self,
        bundle: &BundleCoverage,
        sources: &dyn SourceLocator,
    ) -> SumarResult<()> {
        if self.group.is_some() {
            let bundle_dir = Self::sanitize(bundle.name());
            self.render_bundle(&self.root.join(&bundle_dir), 1, bundle, sources)?;
            self.entries.push(BundleEntry {
                name: bundle.name().to_string(),
                href: format!("{bundle_dir}/index.html"),
                counters: *bundle.counters(),
            });
        } else {
            let dir = self.root.clone();
            self.render_bundle(&dir, 0, bundle, sources)?;
        }
        Ok(())
    }

    fn visit_end(&mut self) -> SumarResult<()> {
        self.render_group_index()?;
        self.render_sessions()
    }
}
