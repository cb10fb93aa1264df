//! Execution data model: probe-hit records and their in-memory stores.
//!
//! A recording file contributes two kinds of records: session metadata and
//! per-class probe arrays. Loading is append-only; records for the same
//! class identity are merged by OR-ing probes index-wise, so the final
//! store contents do not depend on load order.

mod io;
mod loader;

pub use io::{ExecutionDataReader, ExecutionDataWriter, FORMAT_VERSION, MAGIC};
pub use loader::ExecFileLoader;

use crate::result::{SumarError, SumarResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Probe hits recorded for one class-like unit.
///
/// The id is content-derived (see [`crate::analysis::ProbeMap::class_id`]),
/// so two recordings of the same compiled unit share an id while a
/// recompiled unit gets a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionData {
    id: u64,
    name: String,
    probes: Vec<bool>,
}

impl ExecutionData {
    /// Create a new record
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, probes: Vec<bool>) -> Self {
        Self {
            id,
            name: name.into(),
            probes,
        }
    }

    /// Content-derived class identity
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Class name in `/`-separated package form
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Probe array, one flag per monitored location
    #[must_use]
    pub fn probes(&self) -> &[bool] {
        &self.probes
    }

    /// Fail unless `other` describes the same compiled unit.
    ///
    /// Equal ids with different names or probe counts indicate recordings
    /// taken against incompatible compilations of a class.
    pub fn assert_compatible(&self, other: &ExecutionData) -> SumarResult<()> {
        if self.name != other.name {
            return Err(SumarError::corrupt(format!(
                "class {:#018x} recorded under two names ({:?} and {:?})",
                self.id, self.name, other.name
            )));
        }
        if self.probes.len() != other.probes.len() {
            return Err(SumarError::corrupt(format!(
                "incompatible probe count for class {} ({} and {})",
                self.name,
                self.probes.len(),
                other.probes.len()
            )));
        }
        Ok(())
    }

    /// Merge another recording of the same unit into this one (probe OR).
    pub fn merge(&mut self, other: &ExecutionData) -> SumarResult<()> {
        self.assert_compatible(other)?;
        for (mine, theirs) in self.probes.iter_mut().zip(other.probes.iter()) {
            *mine |= *theirs;
        }
        Ok(())
    }
}

/// Merge target for execution records, keyed by class identity.
///
/// Backed by a `BTreeMap` so that iteration order is stable and independent
/// of the order recording files were loaded in.
#[derive(Debug, Default)]
pub struct ExecutionDataStore {
    entries: BTreeMap<u64, ExecutionData>,
}

impl ExecutionDataStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the store, merging probes on id collision.
    pub fn put(&mut self, data: ExecutionData) -> SumarResult<()> {
        match self.entries.get_mut(&data.id) {
            Some(existing) => existing.merge(&data),
            None => {
                let _ = self.entries.insert(data.id, data);
                Ok(())
            }
        }
    }

    /// Look up a record by class identity
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&ExecutionData> {
        self.entries.get(&id)
    }

    /// All records, ordered by class identity
    pub fn contents(&self) -> impl Iterator<Item = &ExecutionData> {
        self.entries.values()
    }

    /// Number of distinct classes recorded
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no records were loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Metadata for one recording session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Session identifier as written by the recorder
    pub id: String,
    /// Session start, epoch millis
    pub start: i64,
    /// Execution data dump time, epoch millis
    pub dump: i64,
}

impl SessionInfo {
    /// Create a new session descriptor
    #[must_use]
    pub fn new(id: impl Into<String>, start: i64, dump: i64) -> Self {
        Self {
            id: id.into(),
            start,
            dump,
        }
    }
}

/// Append-only list of sessions in load order. Sessions are never merged
/// or deduplicated; multiple sessions may share an id.
#[derive(Debug, Default)]
pub struct SessionInfoStore {
    infos: Vec<SessionInfo>,
}

impl SessionInfoStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one session record
    pub fn push(&mut self, info: SessionInfo) {
        self.infos.push(info);
    }

    /// Sessions in the order they were loaded
    #[must_use]
    pub fn infos(&self) -> &[SessionInfo] {
        &self.infos
    }

    /// Whether no sessions were loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(id: u64, name: &str, probes: &[bool]) -> ExecutionData {
        ExecutionData::new(id, name, probes.to_vec())
    }

    #[test]
    fn test_merge_ors_probes() {
        let mut a = record(1, "demo/Foo", &[true, false, false]);
        let b = record(1, "demo/Foo", &[false, true, false]);
        a.merge(&b).unwrap();
        assert_eq!(a.probes(), &[true, true, false]);
    }

    #[test]
    fn test_merge_rejects_probe_count_mismatch() {
        let mut a = record(1, "demo/Foo", &[true, false]);
        let b = record(1, "demo/Foo", &[true, false, true]);
        let err = a.merge(&b).unwrap_err();
        assert!(err.to_string().contains("incompatible probe count"));
    }

    #[test]
    fn test_merge_rejects_name_mismatch() {
        let mut a = record(1, "demo/Foo", &[true]);
        let b = record(1, "demo/Bar", &[true]);
        assert!(a.merge(&b).is_err());
    }

    #[test]
    fn test_store_put_merges_on_collision() {
        let mut store = ExecutionDataStore::new();
        store.put(record(7, "demo/Foo", &[true, false])).unwrap();
        store.put(record(7, "demo/Foo", &[false, true])).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(7).unwrap().probes(), &[true, true]);
    }

    #[test]
    fn test_store_disjoint_inputs_sum() {
        let mut store = ExecutionDataStore::new();
        store.put(record(1, "a/A", &[true])).unwrap();
        store.put(record(2, "a/B", &[false])).unwrap();
        store.put(record(3, "b/C", &[true, true])).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_store_contents_ordered_by_id() {
        let mut store = ExecutionDataStore::new();
        store.put(record(9, "z/Z", &[true])).unwrap();
        store.put(record(2, "a/A", &[true])).unwrap();
        let ids: Vec<u64> = store.contents().map(ExecutionData::id).collect();
        assert_eq!(ids, vec![2, 9]);
    }

    #[test]
    fn test_session_store_preserves_order_and_duplicates() {
        let mut store = SessionInfoStore::new();
        store.push(SessionInfo::new("s1", 10, 20));
        store.push(SessionInfo::new("s1", 30, 40));
        store.push(SessionInfo::new("s0", 5, 6));
        let ids: Vec<&str> = store.infos().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s1", "s0"]);
    }

    fn probe_vec() -> impl Strategy<Value = Vec<bool>> {
        proptest::collection::vec(any::<bool>(), 4)
    }

    proptest! {
        /// Loading the same two records in either order yields identical stores.
        #[test]
        fn prop_merge_commutative(p1 in probe_vec(), p2 in probe_vec()) {
            let mut ab = ExecutionDataStore::new();
            ab.put(record(1, "demo/Foo", &p1)).unwrap();
            ab.put(record(1, "demo/Foo", &p2)).unwrap();

            let mut ba = ExecutionDataStore::new();
            ba.put(record(1, "demo/Foo", &p2)).unwrap();
            ba.put(record(1, "demo/Foo", &p1)).unwrap();

            prop_assert_eq!(ab.get(1).unwrap(), ba.get(1).unwrap());
        }

        /// Merging a record with itself changes nothing.
        #[test]
        fn prop_merge_idempotent(p in probe_vec()) {
            let mut store = ExecutionDataStore::new();
            store.put(record(1, "demo/Foo", &p)).unwrap();
            store.put(record(1, "demo/Foo", &p)).unwrap();
            prop_assert_eq!(store.get(1).unwrap().probes(), p.as_slice());
        }
    }
}
