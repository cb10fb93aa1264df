//! Correlates merged execution data with probe-map artifacts.

use super::bundle::{ClassCoverage, LineCoverage, MethodCoverage};
use super::probe_map::ProbeMap;
use crate::exec::ExecutionDataStore;
use crate::result::{SumarError, SumarResult};
use std::path::Path;

/// Analyzes probe-map artifacts against an execution data store.
///
/// A class without execution data is analyzed as fully missed; a class
/// whose recording disagrees with the artifact's probe layout is an
/// analysis error (callers skip-and-warn, see
/// [`super::bundler::BundleCreator`]).
#[derive(Debug)]
pub struct Analyzer<'a> {
    store: &'a ExecutionDataStore,
}

impl<'a> Analyzer<'a> {
    /// Create an analyzer over the merged execution data
    #[must_use]
    pub fn new(store: &'a ExecutionDataStore) -> Self {
        Self { store }
    }

    /// Read and analyze one probe-map artifact file
    pub fn analyze_file(&self, path: &Path) -> SumarResult<ClassCoverage> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SumarError::analysis(path, format!("unreadable artifact: {e}")))?;
        let map = ProbeMap::from_json(&text)
            .map_err(|e| SumarError::analysis(path, format!("malformed probe map: {e}")))?;
        map.validate()
            .map_err(|message| SumarError::analysis(path, message))?;
        self.analyze(&map, path)
    }

    /// Analyze a parsed probe map
    pub fn analyze(&self, map: &ProbeMap, origin: &Path) -> SumarResult<ClassCoverage> {
        let probes = match self.store.get(map.class_id()) {
            Some(data) => {
                if data.probes().len() != map.probe_count as usize {
                    return Err(SumarError::analysis(
                        origin,
                        format!(
                            "recording carries {} probes for {} but the artifact defines {}",
                            data.probes().len(),
                            map.name,
                            map.probe_count
                        ),
                    ));
                }
                data.probes().to_vec()
            }
            None => vec![false; map.probe_count as usize],
        };

        let methods = map
            .methods
            .iter()
            .map(|method| {
                let mut executed = false;
                let lines = method
                    .lines
                    .iter()
                    .map(|line| {
                        let covered = line.probes.iter().filter(|p| probes[**p as usize]).count();
                        let missed = line.probes.len() - covered;
                        executed |= covered > 0;
                        LineCoverage::new(line.line, covered as u32, missed as u32)
                    })
                    .collect();
                MethodCoverage::new(&method.name, &method.desc, lines, executed)
            })
            .collect();

        Ok(ClassCoverage::new(&map.name, &map.source_file, methods))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::analysis::probe_map::tests::sample_map;
    use crate::analysis::Counter;
    use crate::exec::ExecutionData;

    fn store_for(map: &ProbeMap, probes: Vec<bool>) -> ExecutionDataStore {
        let mut store = ExecutionDataStore::new();
        store
            .put(ExecutionData::new(map.class_id(), map.name.clone(), probes))
            .unwrap();
        store
    }

    #[test]
    fn test_no_execution_data_means_fully_missed() {
        let map = sample_map();
        let store = ExecutionDataStore::new();
        let class = Analyzer::new(&store)
            .analyze(&map, Path::new("parser.probemap"))
            .unwrap();
        assert_eq!(class.counters().lines, Counter::new(3, 0));
        assert_eq!(class.counters().methods, Counter::new(2, 0));
        assert_eq!(class.counters().classes, Counter::new(1, 0));
    }

    #[test]
    fn test_hits_produce_covered_counters() {
        let map = sample_map();
        // probe 0 covers line 10; probes 1,2 line 11; probe 3 line 20
        let store = store_for(&map, vec![true, true, false, false]);
        let class = Analyzer::new(&store)
            .analyze(&map, Path::new("parser.probemap"))
            .unwrap();
        // lines 10 covered, 11 partial (counts covered), 20 missed
        assert_eq!(class.counters().lines, Counter::new(1, 2));
        assert_eq!(class.counters().methods, Counter::new(1, 1));
        assert_eq!(class.counters().classes, Counter::new(0, 1));
    }

    #[test]
    fn test_probe_count_mismatch_is_analysis_error() {
        let map = sample_map();
        let store = store_for(&map, vec![true; 9]);
        let err = Analyzer::new(&store)
            .analyze(&map, Path::new("parser.probemap"))
            .unwrap_err();
        assert!(matches!(err, SumarError::Analysis { .. }));
    }

    #[test]
    fn test_analyze_file_reports_malformed_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.probemap");
        std::fs::write(&path, "{not json").unwrap();
        let store = ExecutionDataStore::new();
        let err = Analyzer::new(&store).analyze_file(&path).unwrap_err();
        assert!(matches!(err, SumarError::Analysis { .. }));
        assert!(err.to_string().contains("broken.probemap"));
    }
}
