/// Grouping of edit scripts into hunks with bounded context.
use super::edit_script::EditOp;

/// A contiguous region of change with surrounding context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Ops in document order, including context `Equal` ops.
    pub ops: Vec<EditOp>,
    /// Baseline lines preceding the hunk.
    pub a_start: usize,
    /// First current-sequence index covered (0-indexed). For a hunk made only
    /// of deletions this is the index of the line following them.
    pub b_start: usize,
    /// Last current-sequence index covered, inclusive.
    pub b_end: usize,
}

impl Hunk {
    /// Number of baseline lines in the hunk.
    pub fn old_count(&self) -> usize {
        self.ops.iter().filter(|op| op.a_index().is_some()).count()
    }

    /// Number of current lines in the hunk.
    pub fn new_count(&self) -> usize {
        self.ops.iter().filter(|op| op.b_index().is_some()).count()
    }

    /// Returns true if the 0-indexed current line `target` lies in the hunk.
    /// A hunk of pure deletions holds no current lines and covers none.
    pub fn covers_change(&self, target: usize) -> bool {
        self.new_count() > 0 && (self.b_start..=self.b_end).contains(&target)
    }

    /// Returns true if the gap position `target` is within one line of the
    /// hunk. Deletion markers sit on line boundaries, hence the slack.
    pub fn covers_deletion(&self, target: usize) -> bool {
        (self.b_start.saturating_sub(1)..=self.b_end + 1).contains(&target)
    }

    /// Unified-diff hunk header, with 1-based starts.
    pub fn header(&self) -> String {
        let old_count = self.old_count();
        let new_count = self.new_count();
        let old_start = if old_count == 0 { self.a_start } else { self.a_start + 1 };
        let new_start = if new_count == 0 { self.b_start } else { self.b_start + 1 };
        format!("@@ -{old_start},{old_count} +{new_start},{new_count} @@")
    }

    /// Renders the hunk as unified diff text against the line sequences it
    /// was computed from.
    pub fn render(&self, a: &[&str], b: &[&str]) -> String {
        let mut out = self.header();
        for op in &self.ops {
            let (prefix, line) = match *op {
                EditOp::Equal { b: j, .. } => ("\n ", b[j]),
                EditOp::Delete { a: i } => ("\n-", a[i]),
                EditOp::Insert { b: j } => ("\n+", b[j]),
            };
            out.push_str(prefix);
            out.push_str(line);
        }
        out
    }
}

/// Clusters `ops` into hunks, padding each change run with up to `context`
/// equal lines on either side.
///
/// A hunk closes as soon as `context` equal lines follow its last change, so
/// changes separated by a longer unchanged run produce separate hunks. Hunks
/// never share ops and are returned in document order. `b_len` anchors a
/// hunk made only of trailing deletions.
pub fn group_hunks(ops: &[EditOp], b_len: usize, context: usize) -> Vec<Hunk> {
    let a_len = ops.iter().filter(|op| op.a_index().is_some()).count();
    let mut hunks = Vec::new();
    let mut open: Option<usize> = None;
    let mut last_end = 0;
    let mut trailing = 0;

    for (i, op) in ops.iter().enumerate() {
        if !op.is_equal() {
            if open.is_none() {
                let leading = context.min(i - last_end);
                open = Some(i - leading);
            }
            trailing = 0;
            continue;
        }
        let Some(start) = open else {
            continue;
        };
        trailing += 1;
        if trailing >= context {
            let end = i + 1 - (trailing - context);
            hunks.push(make_hunk(ops, start, end, a_len, b_len));
            open = None;
            last_end = end;
            trailing = 0;
        }
    }
    if let Some(start) = open {
        hunks.push(make_hunk(ops, start, ops.len(), a_len, b_len));
    }
    hunks
}

fn make_hunk(ops: &[EditOp], start: usize, end: usize, a_len: usize, b_len: usize) -> Hunk {
    let a_start = ops[start..]
        .iter()
        .find_map(EditOp::a_index)
        .unwrap_or(a_len);
    let b_start = ops[start..]
        .iter()
        .find_map(EditOp::b_index)
        .unwrap_or(b_len);
    let b_end = ops[start..end]
        .iter()
        .rev()
        .find_map(EditOp::b_index)
        .unwrap_or(b_start);
    Hunk {
        ops: ops[start..end].to_vec(),
        a_start,
        b_start,
        b_end,
    }
}
