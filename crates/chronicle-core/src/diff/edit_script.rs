/// Conversion of an LCS alignment into an ordered edit script.
use serde::{Deserialize, Serialize};

use super::lcs::LcsAlignment;

/// One step of an edit script between baseline `a` and current `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum EditOp {
    /// `a[a]` and `b[b]` are the same line.
    Equal { a: usize, b: usize },
    /// `b[b]` exists only in the current sequence.
    Insert { b: usize },
    /// `a[a]` exists only in the baseline sequence.
    Delete { a: usize },
}

impl EditOp {
    /// Baseline index touched by this op, if any.
    pub fn a_index(&self) -> Option<usize> {
        match *self {
            EditOp::Equal { a, .. } | EditOp::Delete { a } => Some(a),
            EditOp::Insert { .. } => None,
        }
    }

    /// Current-sequence index touched by this op, if any.
    pub fn b_index(&self) -> Option<usize> {
        match *self {
            EditOp::Equal { b, .. } | EditOp::Insert { b } => Some(b),
            EditOp::Delete { .. } => None,
        }
    }

    /// Returns true for `Equal`.
    pub fn is_equal(&self) -> bool {
        matches!(self, EditOp::Equal { .. })
    }
}

/// Builds the edit script for sequences of length `n` (baseline) and `m`
/// (current) from their alignment.
///
/// Within each gap between matched pairs, deletions come before insertions.
/// Every baseline index appears once as `Equal` or `Delete`, every current
/// index once as `Equal` or `Insert`.
pub fn build_edit_script(n: usize, m: usize, alignment: &LcsAlignment) -> Vec<EditOp> {
    let mut ops = Vec::with_capacity(n + m - alignment.len());
    let mut next_a = 0;
    let mut next_b = 0;

    for (i, j) in alignment.pairs() {
        ops.extend((next_a..i).map(|a| EditOp::Delete { a }));
        ops.extend((next_b..j).map(|b| EditOp::Insert { b }));
        ops.push(EditOp::Equal { a: i, b: j });
        next_a = i + 1;
        next_b = j + 1;
    }
    ops.extend((next_a..n).map(|a| EditOp::Delete { a }));
    ops.extend((next_b..m).map(|b| EditOp::Insert { b }));
    ops
}
