//! Missed/covered counter pairs aggregated bottom-up through the
//! coverage tree.

use serde::{Deserialize, Serialize};

/// A missed/covered pair for one counted entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    missed: u32,
    covered: u32,
}

impl Counter {
    /// Create a counter from missed/covered counts
    #[must_use]
    pub fn new(missed: u32, covered: u32) -> Self {
        Self { missed, covered }
    }

    /// Entities not executed
    #[must_use]
    pub fn missed(&self) -> u32 {
        self.missed
    }

    /// Entities executed at least once
    #[must_use]
    pub fn covered(&self) -> u32 {
        self.covered
    }

    /// Total entities counted
    #[must_use]
    pub fn total(&self) -> u32 {
        self.missed + self.covered
    }

    /// Covered share in `[0, 1]`; 1.0 for an empty counter
    #[must_use]
    pub fn covered_ratio(&self) -> f64 {
        if self.total() == 0 {
            1.0
        } else {
            f64::from(self.covered) / f64::from(self.total())
        }
    }

    /// Count one more entity
    pub fn increment(&mut self, covered: bool) {
        if covered {
            self.covered += 1;
        } else {
            self.missed += 1;
        }
    }

    /// Fold another counter into this one
    pub fn add(&mut self, other: Counter) {
        self.missed += other.missed;
        self.covered += other.covered;
    }
}

/// The counter triple every coverage node carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Source lines
    pub lines: Counter,
    /// Methods
    pub methods: Counter,
    /// Classes
    pub classes: Counter,
}

impl Counters {
    /// Fold another node's counters into this one
    pub fn add(&mut self, other: &Counters) {
        self.lines.add(other.lines);
        self.methods.add(other.methods);
        self.classes.add(other.classes);
    }
}
