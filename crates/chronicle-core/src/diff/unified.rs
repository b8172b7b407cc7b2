/// Parsing of unified diff text supplied by version control.
use std::sync::LazyLock;

use regex::Regex;

use super::{DiffSource, LineChanges};

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("hunk header pattern")
});

/// Start of the next file section in multi-file `git diff` output.
const FILE_SECTION_PREFIX: &str = "diff --git ";

/// Parsed `@@ -old_start,old_count +new_start,new_count @@` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HunkHeader {
    old_start: usize,
    old_count: usize,
    new_start: usize,
    new_count: usize,
}

/// Returns `None` for anything that isn't a well-formed header, including
/// numbers that overflow.
fn parse_header(line: &str) -> Option<HunkHeader> {
    let caps = HUNK_HEADER.captures(line)?;
    let number = |idx: usize| -> Option<usize> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(1),
        }
    };
    Some(HunkHeader {
        old_start: number(1)?,
        old_count: number(2)?,
        new_start: number(3)?,
        new_count: number(4)?,
    })
}

/// One hunk of a unified diff, with its header and body lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    /// Header line followed by the body lines, joined with `\n`.
    pub text: String,
}

impl DiffHunk {
    /// Returns true if the 1-based file line falls within the hunk's new-file
    /// range, widened by one line on each side.
    pub fn covers_file_line(&self, file_line: usize) -> bool {
        let first = self.new_start.saturating_sub(1);
        let last = self.new_start.saturating_add(self.new_count.max(1));
        (first..=last).contains(&file_line)
    }
}

/// Read-only view over the unified diff of a single file.
///
/// Line numbers in the diff are relative to the whole file, front matter
/// included. `frontmatter_offset` is the number of front-matter lines the
/// editor strips before numbering body lines.
#[derive(Debug, Clone, Copy)]
pub struct UnifiedDiff<'a> {
    text: &'a str,
    frontmatter_offset: usize,
}

impl<'a> UnifiedDiff<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            frontmatter_offset: 0,
        }
    }

    pub fn with_frontmatter_offset(mut self, offset: usize) -> Self {
        self.frontmatter_offset = offset;
        self
    }

    /// The diff text this view was built from.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Changed lines (1-based) and deletion markers (gap positions) in
    /// file-relative coordinates.
    ///
    /// Lines before the first hunk header are ignored. A run of removed lines
    /// leaves a marker just before the next context line, or at the end of
    /// the hunk.
    pub fn parse(&self) -> LineChanges {
        let mut changes = LineChanges::default();
        let mut counter = 0usize;
        let mut in_hunk = false;
        let mut pending_deletion = false;

        for line in self.text.lines() {
            if let Some(header) = parse_header(line) {
                if pending_deletion {
                    changes.deletions.insert(counter.saturating_sub(1));
                }
                counter = header.new_start;
                pending_deletion = false;
                in_hunk = true;
                continue;
            }
            if line.starts_with(FILE_SECTION_PREFIX) {
                if pending_deletion {
                    changes.deletions.insert(counter.saturating_sub(1));
                }
                pending_deletion = false;
                in_hunk = false;
                continue;
            }
            if !in_hunk {
                continue;
            }

            match line.as_bytes().first() {
                Some(b'+') => {
                    changes.changed.insert(counter);
                    counter = counter.saturating_add(1);
                }
                Some(b'-') => pending_deletion = true,
                // "\ No newline at end of file"
                Some(b'\\') => {}
                _ => {
                    if pending_deletion {
                        changes.deletions.insert(counter.saturating_sub(1));
                        pending_deletion = false;
                    }
                    counter = counter.saturating_add(1);
                }
            }
        }
        if pending_deletion {
            changes.deletions.insert(counter.saturating_sub(1));
        }

        tracing::debug!(
            changed = changes.changed.len(),
            deletions = changes.deletions.len(),
            "parsed unified diff"
        );
        changes
    }

    /// Same as [`parse`](Self::parse), translated to body-relative
    /// coordinates. Entries that fall inside the front matter are dropped.
    pub fn parse_body(&self) -> LineChanges {
        let offset = self.frontmatter_offset;
        let file = self.parse();
        LineChanges {
            changed: file
                .changed
                .into_iter()
                .filter(|&line| line > offset)
                .map(|line| line - offset)
                .collect(),
            deletions: file
                .deletions
                .into_iter()
                .filter(|&gap| gap >= offset)
                .map(|gap| gap - offset)
                .collect(),
        }
    }

    /// Splits the diff into its hunks.
    ///
    /// A hunk's body ends once the line counts announced by its header are
    /// used up; anything after that up to the next header (file metadata,
    /// the next file's `---`/`+++` lines) is skipped. A trailing
    /// `\ No newline at end of file` stays with the hunk.
    pub fn hunks(&self) -> Vec<DiffHunk> {
        let mut hunks = Vec::new();
        let mut current: Option<(DiffHunk, usize, usize)> = None;

        for line in self.text.lines() {
            if let Some(header) = parse_header(line) {
                if let Some((hunk, _, _)) = current.take() {
                    hunks.push(hunk);
                }
                let hunk = DiffHunk {
                    old_start: header.old_start,
                    old_count: header.old_count,
                    new_start: header.new_start,
                    new_count: header.new_count,
                    text: line.to_string(),
                };
                current = Some((hunk, header.old_count, header.new_count));
                continue;
            }
            let Some((hunk, old_left, new_left)) = current.as_mut() else {
                continue;
            };

            let exhausted = *old_left == 0 && *new_left == 0;
            let consumed = match line.as_bytes().first() {
                Some(b'\\') => true,
                _ if exhausted => false,
                Some(b'+') if *new_left > 0 => {
                    *new_left -= 1;
                    true
                }
                Some(b'-') if *old_left > 0 => {
                    *old_left -= 1;
                    true
                }
                Some(b'+') | Some(b'-') => false,
                _ => {
                    *old_left = old_left.saturating_sub(1);
                    *new_left = new_left.saturating_sub(1);
                    true
                }
            };
            if consumed {
                hunk.text.push('\n');
                hunk.text.push_str(line);
            }
        }
        if let Some((hunk, _, _)) = current {
            hunks.push(hunk);
        }
        hunks
    }

    /// Text of the first hunk covering a body line.
    ///
    /// The body line is translated to a file line by adding
    /// `frontmatter_offset` once.
    pub fn hunk_for_line(&self, body_line: usize, frontmatter_offset: usize) -> Option<String> {
        let file_line = body_line.checked_add(frontmatter_offset)?;
        self.hunks()
            .into_iter()
            .find(|hunk| hunk.covers_file_line(file_line))
            .map(|hunk| hunk.text)
    }
}

impl DiffSource for UnifiedDiff<'_> {
    fn changes(&self) -> LineChanges {
        self.parse_body()
    }

    fn hunk_for_line(&self, line: usize, _deletion: bool) -> Option<String> {
        UnifiedDiff::hunk_for_line(self, line, self.frontmatter_offset)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::diff::UnsavedDiff;

    fn set(items: &[usize]) -> BTreeSet<usize> {
        items.iter().copied().collect()
    }

    const TWO_HUNKS: &str = "diff --git a/note.md b/note.md
index 3b18e51..a9c2f07 100644
--- a/note.md
+++ b/note.md
@@ -1,4 +1,4 @@
 first
-second
+SECOND
 third
 fourth
@@ -20,3 +20,2 @@ heading context
 twenty
-gone
 twenty-two
";

    // ── Header parsing ───────────────────────────────────────────────

    #[test]
    fn header_with_counts() {
        let header = parse_header("@@ -3,7 +4,9 @@ fn main()").unwrap();
        assert_eq!(
            header,
            HunkHeader {
                old_start: 3,
                old_count: 7,
                new_start: 4,
                new_count: 9
            }
        );
    }

    #[test]
    fn header_counts_default_to_one() {
        let header = parse_header("@@ -3 +4 @@").unwrap();
        assert_eq!(header.old_count, 1);
        assert_eq!(header.new_count, 1);
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(parse_header("@@ -a,b +c,d @@").is_none());
        assert!(parse_header("@@ -1,2 +3,4").is_none());
        assert!(parse_header(" @@ -1,2 +3,4 @@").is_none());
        assert!(parse_header("@@ -99999999999999999999999 +1 @@").is_none());
    }

    // ── parse ────────────────────────────────────────────────────────

    #[test]
    fn added_line_is_changed() {
        let changes = UnifiedDiff::new("@@ -1,2 +1,3 @@\n a\n+new\n b\n").parse();
        assert_eq!(changes.changed, set(&[2]));
        assert!(changes.deletions.is_empty());
    }

    #[test]
    fn removed_line_marks_gap_before_next_context() {
        let changes = UnifiedDiff::new("@@ -1,3 +1,2 @@\n a\n-b\n c\n").parse();
        assert!(changes.changed.is_empty());
        assert_eq!(changes.deletions, set(&[1]));
    }

    #[test]
    fn removal_at_end_of_hunk_is_flushed() {
        let changes = UnifiedDiff::new("@@ -1,2 +1,1 @@\n a\n-b").parse();
        assert_eq!(changes.deletions, set(&[1]));
    }

    #[test]
    fn removal_before_next_header_is_flushed() {
        let text = "@@ -1,2 +1,1 @@\n a\n-b\n@@ -10,1 +9,2 @@\n x\n+y\n";
        let changes = UnifiedDiff::new(text).parse();
        assert_eq!(changes.deletions, set(&[1]));
        assert_eq!(changes.changed, set(&[10]));
    }

    #[test]
    fn metadata_before_first_hunk_is_ignored() {
        let changes = UnifiedDiff::new(TWO_HUNKS).parse();
        assert_eq!(changes.changed, set(&[2]));
        assert_eq!(changes.deletions, set(&[2, 20]));
    }

    #[test]
    fn malformed_input_reports_nothing() {
        let changes = UnifiedDiff::new("@@ garbage @@\n+added\n-removed\n").parse();
        assert!(changes.is_empty());
        assert!(UnifiedDiff::new("").parse().is_empty());
    }

    #[test]
    fn no_newline_marker_is_ignored() {
        let text = "@@ -1 +1 @@\n-old\n\\ No newline at end of file\n+new\n\\ No newline at end of file\n";
        let changes = UnifiedDiff::new(text).parse();
        assert_eq!(changes.changed, set(&[1]));
        assert_eq!(changes.deletions, set(&[1]));
    }

    #[test]
    fn next_file_section_closes_hunk() {
        let text = "@@ -1,2 +1,1 @@\n a\n-b\ndiff --git a/x b/x\n--- a/x\n+++ b/x\n";
        let changes = UnifiedDiff::new(text).parse();
        assert_eq!(changes.deletions, set(&[1]));
        assert!(changes.changed.is_empty());
    }

    #[test]
    fn crlf_diff_text() {
        let changes = UnifiedDiff::new("@@ -1,2 +1,3 @@\r\n a\r\n+new\r\n b\r\n").parse();
        assert_eq!(changes.changed, set(&[2]));
    }

    #[test]
    fn body_coordinates_subtract_frontmatter() {
        let text = "@@ -1,6 +1,7 @@\n ---\n+title: x\n ---\n a\n+b\n c\n-d\n";
        let diff = UnifiedDiff::new(text).with_frontmatter_offset(3);
        assert_eq!(diff.parse().changed, set(&[2, 5]));
        let body = diff.parse_body();
        assert_eq!(body.changed, set(&[2]));
        assert_eq!(body.deletions, set(&[3]));
    }

    // ── hunks ────────────────────────────────────────────────────────

    #[test]
    fn hunks_exclude_metadata() {
        let hunks = UnifiedDiff::new(TWO_HUNKS).hunks();
        assert_eq!(hunks.len(), 2);
        assert_eq!(
            hunks[0].text,
            "@@ -1,4 +1,4 @@\n first\n-second\n+SECOND\n third\n fourth"
        );
        assert_eq!(hunks[1].new_start, 20);
        assert_eq!(hunks[1].new_count, 2);
        assert!(hunks.iter().all(|h| !h.text.contains("index ")));
    }

    #[test]
    fn hunk_body_stops_at_next_file() {
        let text = "@@ -1,2 +1,2 @@\n-a\n+b\n c\ndiff --git a/y b/y\nindex 1..2\n--- a/y\n+++ b/y\n@@ -1 +1 @@\n-p\n+q\n";
        let hunks = UnifiedDiff::new(text).hunks();
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].text, "@@ -1,2 +1,2 @@\n-a\n+b\n c");
        assert_eq!(hunks[1].text, "@@ -1 +1 @@\n-p\n+q");
    }

    #[test]
    fn hunk_keeps_no_newline_marker() {
        let text = "@@ -1 +1 @@\n-old\n+new\n\\ No newline at end of file\n";
        let hunks = UnifiedDiff::new(text).hunks();
        assert!(hunks[0].text.ends_with("\\ No newline at end of file"));
    }

    #[test]
    fn hunk_for_line_uses_widened_range() {
        let diff = UnifiedDiff::new(TWO_HUNKS);
        assert!(diff.hunk_for_line(2, 0).unwrap().starts_with("@@ -1,4"));
        assert!(diff.hunk_for_line(5, 0).unwrap().starts_with("@@ -1,4"));
        assert_eq!(diff.hunk_for_line(10, 0), None);
        assert!(diff.hunk_for_line(19, 0).unwrap().starts_with("@@ -20,3"));
        assert!(diff.hunk_for_line(22, 0).unwrap().starts_with("@@ -20,3"));
        assert_eq!(diff.hunk_for_line(23, 0), None);
    }

    #[test]
    fn huge_header_numbers_do_not_overflow() {
        let max = usize::MAX;
        let changes = UnifiedDiff::new(&format!("@@ -1 +{max} @@\n+x\n+y\n ctx\n")).parse();
        assert_eq!(changes.changed, set(&[max]));

        let diff_text = format!("@@ -1 +{max},1 @@\n+x");
        let diff = UnifiedDiff::new(&diff_text);
        assert_eq!(diff.hunk_for_line(1, 0), None);
        assert!(diff.hunk_for_line(max, 0).is_some());
        assert_eq!(diff.hunk_for_line(max, 1), None);
    }

    #[test]
    fn hunk_for_line_adds_offset_once() {
        let diff = UnifiedDiff::new(TWO_HUNKS).with_frontmatter_offset(15);
        assert!(diff.hunk_for_line(5, 15).unwrap().starts_with("@@ -20,3"));
        let source: &dyn DiffSource = &diff;
        assert!(source.hunk_for_line(5, false).unwrap().starts_with("@@ -20,3"));
    }

    // ── Round trip with the in-memory diff ───────────────────────────

    #[test]
    fn rendered_hunks_parse_to_same_changed_lines() {
        let baseline = "# Title\n\nintro\nkeep\nremove me\nkeep too\n\n- item\n- item two\nend";
        let current = "# New title\n\nintro\nkeep\nkeep too\n\n- item\n- inserted\n- item two\nend\n";
        let unsaved = UnsavedDiff::new(baseline, current);
        let expected = unsaved.changed_lines();
        let hunks = unsaved.hunks();
        assert!(!hunks.is_empty());

        for hunk in &hunks {
            let a: Vec<&str> = baseline.split('\n').collect();
            let b: Vec<&str> = current.split('\n').collect();
            let text = hunk.render(&a, &b);
            let parsed = UnifiedDiff::new(&text).parse();
            let range = (hunk.b_start + 1)..=(hunk.b_end + 1);
            let in_range: BTreeSet<usize> = expected
                .iter()
                .copied()
                .filter(|line| range.contains(line))
                .collect();
            assert_eq!(parsed.changed, in_range, "hunk:\n{text}");
        }
    }
}
