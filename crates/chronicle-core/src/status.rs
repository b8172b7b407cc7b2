/// Per-line gutter status merged from the unsaved and uncommitted layers.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::diff::{DiffSource, LineChanges};

/// Which layer a line's change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    /// Edited since the last save.
    Unsaved,
    /// Saved but not yet committed.
    Uncommitted,
}

/// 1-based line number → status.
pub type LineStatusMap = BTreeMap<usize, LineStatus>;

/// 0-based gap position → status.
pub type DeletionMarkerMap = BTreeMap<usize, LineStatus>;

/// Gutter state for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStatusReport {
    pub lines: LineStatusMap,
    pub deletions: DeletionMarkerMap,
}

impl LineStatusReport {
    /// Merges both layers. Unsaved entries win over uncommitted ones on the
    /// same line or gap.
    pub fn merge(unsaved: &LineChanges, uncommitted: &LineChanges) -> Self {
        let mut report = Self::default();
        report.apply(uncommitted, LineStatus::Uncommitted);
        report.apply(unsaved, LineStatus::Unsaved);
        report
    }

    /// Merges the changes of two diff sources.
    pub fn from_sources(unsaved: &dyn DiffSource, uncommitted: &dyn DiffSource) -> Self {
        Self::merge(&unsaved.changes(), &uncommitted.changes())
    }

    fn apply(&mut self, changes: &LineChanges, status: LineStatus) {
        for &line in &changes.changed {
            self.lines.insert(line, status);
        }
        for &gap in &changes.deletions {
            self.deletions.insert(gap, status);
        }
    }

    /// Status of a 1-based line, if it changed.
    pub fn status_at(&self, line: usize) -> Option<LineStatus> {
        self.lines.get(&line).copied()
    }

    /// Status of the deletion marker at a gap, if any.
    pub fn deletion_at(&self, gap: usize) -> Option<LineStatus> {
        self.deletions.get(&gap).copied()
    }

    /// Returns true if no line or gap carries a status.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.deletions.is_empty()
    }
}
