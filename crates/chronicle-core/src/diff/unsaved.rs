/// Changes between the last saved content and the editor's current text.
use std::collections::BTreeSet;

use super::edit_script::build_edit_script;
use super::hunk::{group_hunks, Hunk};
use super::lcs::{lcs, LcsAlignment};
use super::{split_lines, DiffOptions, DiffSource, LineChanges};

/// Diff of `current` against an in-memory `baseline`.
///
/// Every query recomputes from the two strings; nothing is cached.
#[derive(Debug, Clone, Copy)]
pub struct UnsavedDiff<'a> {
    baseline: &'a str,
    current: &'a str,
    options: DiffOptions,
}

impl<'a> UnsavedDiff<'a> {
    /// Creates a diff with default options.
    pub fn new(baseline: &'a str, current: &'a str) -> Self {
        Self {
            baseline,
            current,
            options: DiffOptions::default(),
        }
    }

    /// Replaces the diff options.
    pub fn with_options(mut self, options: DiffOptions) -> Self {
        self.options = options;
        self
    }

    fn is_identical(&self) -> bool {
        self.baseline == self.current
    }

    fn align(&self, a: &[&str], b: &[&str]) -> LcsAlignment {
        lcs(a, b, self.options.exact_lcs_cell_limit)
    }

    /// 1-based lines of `current` that are new or modified.
    pub fn changed_lines(&self) -> BTreeSet<usize> {
        self.changes().changed
    }

    /// Gap positions in `current` where baseline lines were removed without
    /// a replacement. A removal replaced by new lines shows up as changed
    /// lines instead.
    pub fn deletion_markers(&self) -> BTreeSet<usize> {
        self.changes().deletions
    }

    /// Changed lines and deletion markers from a single alignment.
    pub fn changes(&self) -> LineChanges {
        if self.is_identical() {
            return LineChanges::default();
        }
        let a = split_lines(self.baseline);
        let b = split_lines(self.current);
        let alignment = self.align(&a, &b);

        let mut changes = LineChanges::default();
        let mut next_a = 0;
        let mut next_b = 0;
        let anchors = alignment.pairs().chain(std::iter::once((a.len(), b.len())));
        for (i, j) in anchors {
            changes.changed.extend((next_b..j).map(|line| line + 1));
            if i > next_a && j == next_b {
                changes.deletions.insert(j);
            }
            next_a = i + 1;
            next_b = j + 1;
        }

        tracing::debug!(
            baseline_lines = a.len(),
            current_lines = b.len(),
            changed = changes.changed.len(),
            deletions = changes.deletions.len(),
            "computed unsaved changes"
        );
        changes
    }

    /// All hunks of the diff, in document order.
    pub fn hunks(&self) -> Vec<Hunk> {
        if self.is_identical() {
            return Vec::new();
        }
        let a = split_lines(self.baseline);
        let b = split_lines(self.current);
        let ops = build_edit_script(a.len(), b.len(), &self.align(&a, &b));
        group_hunks(&ops, b.len(), self.options.context_lines)
    }

    /// Renders the hunk covering `line` as diff text.
    ///
    /// For change lookups `line` is a 1-based line number; for deletion
    /// lookups it is a gap position, matched with one line of slack.
    pub fn hunk_for_line(&self, line: usize, deletion: bool) -> Option<String> {
        if self.is_identical() {
            return None;
        }
        let a = split_lines(self.baseline);
        let b = split_lines(self.current);
        let ops = build_edit_script(a.len(), b.len(), &self.align(&a, &b));
        let hunks = group_hunks(&ops, b.len(), self.options.context_lines);

        let hunk = if deletion {
            hunks.iter().find(|h| h.covers_deletion(line))
        } else {
            let target = line.checked_sub(1)?;
            hunks.iter().find(|h| h.covers_change(target))
        }?;
        Some(hunk.render(&a, &b))
    }
}

impl DiffSource for UnsavedDiff<'_> {
    fn changes(&self) -> LineChanges {
        UnsavedDiff::changes(self)
    }

    fn hunk_for_line(&self, line: usize, deletion: bool) -> Option<String> {
        UnsavedDiff::hunk_for_line(self, line, deletion)
    }
}
