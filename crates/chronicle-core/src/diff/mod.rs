/// Line-level diff engine.
///
/// Two sources of truth feed the editor gutter: the in-memory baseline
/// (last saved content, see [`UnsavedDiff`]) and the unified diff text
/// handed over by version control (see [`UnifiedDiff`]). Both implement
/// [`DiffSource`] so callers can treat them uniformly.
pub mod edit_script;
pub mod hunk;
pub mod lcs;
pub mod unified;
pub mod unsaved;

use std::collections::BTreeSet;

use chronicle_config::EngineConfig;
use serde::{Deserialize, Serialize};

pub use edit_script::{build_edit_script, EditOp};
pub use hunk::{group_hunks, Hunk};
pub use lcs::{lcs, LcsAlignment};
pub use unified::{DiffHunk, UnifiedDiff};
pub use unsaved::UnsavedDiff;

/// Line classification produced by a diff source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineChanges {
    /// 1-based line numbers that were inserted or modified.
    pub changed: BTreeSet<usize>,
    /// 0-based gap positions where lines were removed.
    pub deletions: BTreeSet<usize>,
}

impl LineChanges {
    /// Returns true if neither changed lines nor deletions were found.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.deletions.is_empty()
    }
}

/// Tunables for the diff algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Unchanged lines kept around each hunk.
    pub context_lines: usize,
    /// Largest table size for the exact LCS.
    pub exact_lcs_cell_limit: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for DiffOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            context_lines: config.context_lines,
            exact_lcs_cell_limit: config.exact_lcs_cell_limit,
        }
    }
}

/// A source of line-level change information for one document.
pub trait DiffSource {
    /// Changed lines and deletion markers, in body-relative coordinates.
    fn changes(&self) -> LineChanges;

    /// Diff text of the hunk covering a body line.
    ///
    /// `line` is 1-based for change lookups. For deletion lookups it is the
    /// gap position reported in [`LineChanges::deletions`].
    fn hunk_for_line(&self, line: usize, deletion: bool) -> Option<String>;
}

/// Splits a document into lines on `\n`, keeping a trailing empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}
