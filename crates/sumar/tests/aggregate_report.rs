//! End-to-end report generation over a fixture multi-module project.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use sumar::exec::ExecutionDataWriter;
use sumar::{
    ExecutionData, Module, ModuleGraph, Packaging, ProbeMap, ReportConfig, ReportFormat,
    ReportOrchestrator, SessionInfo, SumarError,
};
use tempfile::TempDir;

fn module(base: &Path, id: &str, root: bool) -> Module {
    Module {
        id: id.to_string(),
        group: "demo".to_string(),
        name: None,
        basedir: base.join(id),
        packaging: Packaging::Leaf,
        output_dir: "target/reports".into(),
        artifact_dir: "target/probemaps".into(),
        source_roots: vec!["src".into()],
        execution_root: root,
    }
}

/// One class with `probes` lines, one probe per line, lines starting at 1.
fn probe_map(name: &str, probes: u32) -> ProbeMap {
    ProbeMap {
        name: name.to_string(),
        source_file: format!(
            "{}.rs",
            name.rsplit('/').next().unwrap().to_ascii_lowercase()
        ),
        methods: vec![sumar::analysis::MethodProbes {
            name: "run".to_string(),
            desc: String::new(),
            lines: (0..probes)
                .map(|i| sumar::analysis::LineProbes {
                    line: i + 1,
                    probes: vec![i],
                })
                .collect(),
        }],
        probe_count: probes,
    }
}

fn write_artifact(module: &Module, map: &ProbeMap) {
    let path = module
        .artifact_dir()
        .join(format!("{}.probemap", map.name));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string(map).unwrap()).unwrap();
}

/// Record `hit` of the class's probes as executed.
fn record(map: &ProbeMap, hit: u32) -> ExecutionData {
    let probes = (0..map.probe_count).map(|i| i < hit).collect();
    ExecutionData::new(map.class_id(), map.name.clone(), probes)
}

fn write_recording(module: &Module, rel: &str, records: &[ExecutionData]) {
    let path = module.resolve(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut buf = Vec::new();
    let mut writer = ExecutionDataWriter::new(&mut buf).unwrap();
    writer
        .write_session_info(&SessionInfo::new(format!("{}-it", module.id), 1_000, 2_000))
        .unwrap();
    for r in records {
        writer.write_execution_data(r).unwrap();
    }
    writer.flush().unwrap();
    std::fs::write(path, buf).unwrap();
}

/// Root + two leaves. `mod-a` has 3 classes of 5 probes with 4 hit each
/// (80%); `mod-b` has 2 classes of 4 probes with 2 hit each (50%). The
/// root has an existing but empty artifact directory.
fn fixture(dir: &TempDir) -> ModuleGraph {
    let base = dir.path();
    let root = module(base, "root", true);
    let mod_a = module(base, "mod-a", false);
    let mod_b = module(base, "mod-b", false);
    std::fs::create_dir_all(root.artifact_dir()).unwrap();

    let mut a_records = Vec::new();
    for name in ["demo/a/One", "demo/a/Two", "demo/a/Three"] {
        let map = probe_map(name, 5);
        write_artifact(&mod_a, &map);
        a_records.push(record(&map, 4));
    }
    write_recording(&mod_a, "target/sumar.exec", &a_records);

    let mut b_records = Vec::new();
    for name in ["demo/b/Four", "demo/b/Five"] {
        let map = probe_map(name, 4);
        write_artifact(&mod_b, &map);
        b_records.push(record(&map, 2));
    }
    write_recording(&mod_b, "target/sumar.exec", &b_records);

    ModuleGraph::new(vec![root, mod_a, mod_b])
}

fn config() -> ReportConfig {
    ReportConfig {
        includes: vec!["**".to_string()],
        formats: vec![ReportFormat::Xml, ReportFormat::Csv, ReportFormat::Html],
        ..ReportConfig::default()
    }
}

fn report_dir(dir: &TempDir, id: &str) -> PathBuf {
    dir.path().join(id).join("target/reports")
}

#[test]
fn aggregate_and_module_reports_render_matching_counters() {
    let dir = TempDir::new().unwrap();
    let graph = fixture(&dir);

    let summary = ReportOrchestrator::new(&config(), &graph).run().unwrap();
    // root counts as visited: its artifact directory exists
    assert_eq!(summary.aggregate_modules, 3);
    assert_eq!(summary.module_reports, 3);

    // per-module counters match each module's own recording
    let xml_a = std::fs::read_to_string(report_dir(&dir, "mod-a").join("coverage.xml")).unwrap();
    assert!(xml_a.contains(r#"<report name="mod-a">"#));
    assert!(xml_a.contains(r#"<counter type="LINE" missed="3" covered="12"/>"#));
    assert!(xml_a.contains(r#"<counter type="CLASS" missed="0" covered="3"/>"#));

    let xml_b = std::fs::read_to_string(report_dir(&dir, "mod-b").join("coverage.xml")).unwrap();
    assert!(xml_b.contains(r#"<counter type="LINE" missed="4" covered="4"/>"#));

    // aggregate counters equal the sum of both modules
    let xml_root = std::fs::read_to_string(report_dir(&dir, "root").join("coverage.xml")).unwrap();
    assert!(xml_root.contains(r#"<report name="root">"#));
    assert!(xml_root.contains(r#"<group name="mod-a">"#));
    assert!(xml_root.contains(r#"<group name="mod-b">"#));
    assert!(xml_root.contains(r#"<counter type="LINE" missed="7" covered="16"/>"#));
    assert!(xml_root.contains(r#"<counter type="CLASS" missed="0" covered="5"/>"#));

    // tabular report carries one row per class plus the header
    let csv_root = std::fs::read_to_string(report_dir(&dir, "root").join("coverage.csv")).unwrap();
    assert_eq!(csv_root.lines().count(), 6);

    // navigable page set exists for the aggregate
    assert!(report_dir(&dir, "root").join("index.html").exists());
    assert!(report_dir(&dir, "root").join("mod-a/index.html").exists());
}

#[test]
fn module_exclusion_drops_only_the_matching_module() {
    let dir = TempDir::new().unwrap();
    let graph = fixture(&dir);

    let cfg = ReportConfig {
        exclude_modules: vec!["^mod-b$".to_string()],
        skip_module: true,
        ..config()
    };
    let summary = ReportOrchestrator::new(&cfg, &graph).run().unwrap();
    assert_eq!(summary.aggregate_modules, 2);
    assert_eq!(summary.module_reports, 0);

    let xml_root = std::fs::read_to_string(report_dir(&dir, "root").join("coverage.xml")).unwrap();
    assert!(xml_root.contains(r#"<group name="mod-a">"#));
    assert!(!xml_root.contains(r#"<group name="mod-b">"#));
    // mod-a counters unaffected by the exclusion
    assert!(xml_root.contains(r#"<counter type="LINE" missed="3" covered="12"/>"#));
}

#[test]
fn strict_mode_fails_on_missing_data_file() {
    let dir = TempDir::new().unwrap();
    let graph = fixture(&dir);
    std::fs::remove_file(dir.path().join("mod-b/target/sumar.exec")).unwrap();

    let cfg = ReportConfig {
        strict: true,
        ..config()
    };
    let err = ReportOrchestrator::new(&cfg, &graph).run().unwrap_err();
    assert!(matches!(err, SumarError::File { .. }));
}

#[test]
fn missing_data_file_is_skipped_without_strict() {
    let dir = TempDir::new().unwrap();
    let graph = fixture(&dir);
    std::fs::remove_file(dir.path().join("mod-b/target/sumar.exec")).unwrap();

    let summary = ReportOrchestrator::new(&config(), &graph).run().unwrap();
    assert_eq!(summary.aggregate_modules, 3);

    // mod-b renders fully missed instead of failing the run
    let xml_b = std::fs::read_to_string(report_dir(&dir, "mod-b").join("coverage.xml")).unwrap();
    assert!(xml_b.contains(r#"<counter type="LINE" missed="8" covered="0"/>"#));
}

#[test]
fn aggregator_packaging_contributes_no_bundle() {
    let dir = TempDir::new().unwrap();
    let mut graph_modules = fixture(&dir).modules().to_vec();
    graph_modules[0].packaging = Packaging::Aggregator;
    let graph = ModuleGraph::new(graph_modules);

    let summary = ReportOrchestrator::new(&config(), &graph).run().unwrap();
    // siblings are still visited
    assert_eq!(summary.aggregate_modules, 2);
    assert_eq!(summary.module_reports, 2);
}

#[test]
fn corrupt_recording_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    let graph = fixture(&dir);
    std::fs::write(dir.path().join("mod-a/target/sumar.exec"), b"\x7fgarbage").unwrap();

    let err = ReportOrchestrator::new(&config(), &graph).run().unwrap_err();
    assert!(matches!(err, SumarError::CorruptData { .. }));
}

#[test]
fn source_annotated_pages_render_when_sources_resolve() {
    let dir = TempDir::new().unwrap();
    let graph = fixture(&dir);

    // provide source for one class of mod-a
    let src = dir.path().join("mod-a/src/demo/a");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("one.rs"), "line 1\nline 2\nline 3\nline 4\nline 5\n").unwrap();

    ReportOrchestrator::new(&config(), &graph).run().unwrap();

    let page = report_dir(&dir, "mod-a").join("demo.a/one.rs.html");
    let html = std::fs::read_to_string(page).unwrap();
    assert!(html.contains(r#"<span class="covered" id="L1">"#));
    assert!(html.contains(r#"<span class="missed" id="L5">"#));
}
