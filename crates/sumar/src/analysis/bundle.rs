//! The hierarchical coverage result for one module:
//! bundle → package → class → method → line, counters aggregated
//! bottom-up at construction time and immutable afterwards.

use super::counter::Counters;
use std::collections::BTreeMap;

/// Coverage status of one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// No probe on this line was hit
    Missed,
    /// Some but not all probes on this line were hit
    Partial,
    /// Every probe on this line was hit
    Covered,
}

/// Probe outcome for one source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCoverage {
    line: u32,
    covered_probes: u32,
    missed_probes: u32,
}

impl LineCoverage {
    /// Create a line result from its probe outcome
    #[must_use]
    pub fn new(line: u32, covered_probes: u32, missed_probes: u32) -> Self {
        Self {
            line,
            covered_probes,
            missed_probes,
        }
    }

    /// 1-based source line number
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Line status derived from its probe counts
    #[must_use]
    pub fn status(&self) -> LineStatus {
        match (self.covered_probes, self.missed_probes) {
            (0, _) => LineStatus::Missed,
            (_, 0) => LineStatus::Covered,
            _ => LineStatus::Partial,
        }
    }

    /// Whether at least one probe on this line was hit
    #[must_use]
    pub fn is_covered(&self) -> bool {
        self.covered_probes > 0
    }
}

/// Coverage of one method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCoverage {
    name: String,
    desc: String,
    lines: Vec<LineCoverage>,
    counters: Counters,
}

impl MethodCoverage {
    /// Build a method node; `executed` is whether any of the method's
    /// probes were hit (meaningful even without line information).
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        desc: impl Into<String>,
        mut lines: Vec<LineCoverage>,
        executed: bool,
    ) -> Self {
        lines.sort_by_key(LineCoverage::line);
        let mut counters = Counters::default();
        for line in &lines {
            counters.lines.increment(line.is_covered());
        }
        counters.methods.increment(executed);
        Self {
            name: name.into(),
            desc: desc.into(),
            lines,
            counters,
        }
    }

    /// Method name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form descriptor
    #[must_use]
    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// Line results, ordered by line number
    #[must_use]
    pub fn lines(&self) -> &[LineCoverage] {
        &self.lines
    }

    /// First source line, if line information exists
    #[must_use]
    pub fn first_line(&self) -> Option<u32> {
        self.lines.first().map(LineCoverage::line)
    }

    /// Whether any probe of the method was hit
    #[must_use]
    pub fn is_executed(&self) -> bool {
        self.counters.methods.covered() > 0
    }

    /// Aggregated counters
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.counters
    }
}

/// Coverage of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCoverage {
    name: String,
    source_file: String,
    methods: Vec<MethodCoverage>,
    counters: Counters,
}

impl ClassCoverage {
    /// Build a class node from its analyzed methods
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source_file: impl Into<String>,
        methods: Vec<MethodCoverage>,
    ) -> Self {
        let mut counters = Counters::default();
        for method in &methods {
            counters.add(method.counters());
        }
        let executed = methods.iter().any(MethodCoverage::is_executed);
        counters.classes.increment(executed);
        Self {
            name: name.into(),
            source_file: source_file.into(),
            methods,
            counters,
        }
    }

    /// Class name in `/`-separated package form
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
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

    /// Simple source file name
    #[must_use]
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Methods in declaration order
    #[must_use]
    pub fn methods(&self) -> &[MethodCoverage] {
        &self.methods
    }

    /// Aggregated counters
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.counters
    }
}

/// Coverage of one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCoverage {
    name: String,
    classes: Vec<ClassCoverage>,
    counters: Counters,
}

impl PackageCoverage {
    /// Build a package node; classes are ordered by name.
    #[must_use]
    pub fn new(name: impl Into<String>, mut classes: Vec<ClassCoverage>) -> Self {
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        let mut counters = Counters::default();
        for class in &classes {
            counters.add(class.counters());
        }
        Self {
            name: name.into(),
            classes,
            counters,
        }
    }

    /// Package name, empty for the default package
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classes ordered by name
    #[must_use]
    pub fn classes(&self) -> &[ClassCoverage] {
        &self.classes
    }

    /// Aggregated counters
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.counters
    }
}

/// The coverage result for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleCoverage {
    name: String,
    packages: Vec<PackageCoverage>,
    counters: Counters,
}

impl BundleCoverage {
    /// Build a bundle from analyzed classes, grouped into packages.
    #[must_use]
    pub fn new(name: impl Into<String>, classes: Vec<ClassCoverage>) -> Self {
        let mut by_package: BTreeMap<String, Vec<ClassCoverage>> = BTreeMap::new();
        for class in classes {
            by_package
                .entry(class.package_name().to_string())
                .or_default()
                .push(class);
        }
        let packages: Vec<PackageCoverage> = by_package
            .into_iter()
            .map(|(pkg, classes)| PackageCoverage::new(pkg, classes))
            .collect();

        let mut counters = Counters::default();
        for package in &packages {
            counters.add(package.counters());
        }
        Self {
            name: name.into(),
            packages,
            counters,
        }
    }

    /// Bundle name (the module's display name)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Packages ordered by name
    #[must_use]
    pub fn packages(&self) -> &[PackageCoverage] {
        &self.packages
    }

    /// Aggregated counters
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Whether classes were counted but no line information was seen,
    /// the signature of artifacts compiled without debug information.
    #[must_use]
    pub fn missing_debug_info(&self) -> bool {
        self.counters.classes.total() > 0 && self.counters.lines.total() == 0
    }
}
