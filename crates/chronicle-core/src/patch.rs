/// Splitting of multi-file patches (as produced by `git diff` or
/// `git show`) into per-file diffs.
use serde::{Deserialize, Serialize};

use crate::diff::UnifiedDiff;

const DEV_NULL: &str = "/dev/null";

/// How a file changed in a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    #[serde(rename = "A")]
    Added,
    #[serde(rename = "D")]
    Deleted,
    #[serde(rename = "M")]
    Modified,
    #[serde(rename = "R")]
    Renamed,
}

/// The diff of a single file within a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    /// Path after the change, or before it for deleted files.
    pub path: String,
    pub change_type: ChangeType,
    /// Hunks of this file, starting at the first `@@` header. Empty for
    /// binary files and pure renames.
    pub diff_text: String,
}

impl FileDiff {
    /// Parser view over this file's hunks.
    pub fn unified(&self) -> UnifiedDiff<'_> {
        UnifiedDiff::new(&self.diff_text)
    }
}

#[derive(Debug)]
struct FileSection<'a> {
    old_path: Option<String>,
    new_path: Option<String>,
    change_type: ChangeType,
    in_hunks: bool,
    body: Vec<&'a str>,
}

impl Default for FileSection<'_> {
    fn default() -> Self {
        Self {
            old_path: None,
            new_path: None,
            change_type: ChangeType::Modified,
            in_hunks: false,
            body: Vec::new(),
        }
    }
}

impl<'a> FileSection<'a> {
    /// Builds a section from the remainder of a `diff --git a/x b/y` line.
    fn from_git_header(rest: &str) -> Self {
        let mut section = Self::default();
        if let Some((old, new)) = rest.rsplit_once(" b/") {
            section.old_path = Some(old.strip_prefix("a/").unwrap_or(old).to_string());
            section.new_path = Some(new.to_string());
        }
        section
    }

    fn push(&mut self, line: &'a str) {
        if self.in_hunks {
            self.body.push(line);
            return;
        }
        if line.starts_with("@@") {
            self.in_hunks = true;
            self.body.push(line);
        } else if line.starts_with("new file mode") {
            self.change_type = ChangeType::Added;
        } else if line.starts_with("deleted file mode") {
            self.change_type = ChangeType::Deleted;
        } else if let Some(from) = line.strip_prefix("rename from ") {
            self.change_type = ChangeType::Renamed;
            self.old_path = Some(from.to_string());
        } else if let Some(to) = line.strip_prefix("rename to ") {
            self.change_type = ChangeType::Renamed;
            self.new_path = Some(to.to_string());
        } else if let Some(old) = line.strip_prefix("--- ") {
            if old == DEV_NULL {
                self.change_type = ChangeType::Added;
            } else {
                self.old_path = Some(old.strip_prefix("a/").unwrap_or(old).to_string());
            }
        } else if let Some(new) = line.strip_prefix("+++ ") {
            if new == DEV_NULL {
                self.change_type = ChangeType::Deleted;
                self.new_path = None;
            } else {
                self.new_path = Some(new.strip_prefix("b/").unwrap_or(new).to_string());
            }
        }
    }

    fn finish(self) -> Option<FileDiff> {
        let path = match self.change_type {
            ChangeType::Deleted => self.old_path.or(self.new_path),
            _ => self.new_path.or(self.old_path),
        }?;
        Some(FileDiff {
            path,
            change_type: self.change_type,
            diff_text: self.body.join("\n"),
        })
    }
}

/// Splits `text` into one [`FileDiff`] per file.
///
/// Text without `diff --git` headers is treated as a single file whose path
/// comes from the `---`/`+++` lines. Leading text that names no file (a
/// commit message, for instance) is dropped.
pub fn split_patch(text: &str) -> Vec<FileDiff> {
    let mut files = Vec::new();
    let mut current: Option<FileSection<'_>> = None;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some(file) = current.take().and_then(FileSection::finish) {
                files.push(file);
            }
            current = Some(FileSection::from_git_header(rest));
            continue;
        }
        current.get_or_insert_with(FileSection::default).push(line);
    }
    if let Some(file) = current.and_then(FileSection::finish) {
        files.push(file);
    }

    tracing::debug!(files = files.len(), "split patch");
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMIT: &str = "commit 1f2e3d
Author: Chronicle <chronicle@localhost>

    Update notes

diff --git a/journal/today.md b/journal/today.md
index 3b18e51..a9c2f07 100644
--- a/journal/today.md
+++ b/journal/today.md
@@ -1,2 +1,3 @@
 # Today
+- wrote tests
 done
diff --git a/ideas.md b/ideas.md
new file mode 100644
index 0000000..e69de29
--- /dev/null
+++ b/ideas.md
@@ -0,0 +1 @@
+first idea
diff --git a/old.md b/old.md
deleted file mode 100644
index e69de29..0000000
--- a/old.md
+++ /dev/null
@@ -1 +0,0 @@
-gone
diff --git a/a.md b/archive/a.md
similarity index 100%
rename from a.md
rename to archive/a.md
diff --git a/logo.png b/logo.png
index 1234567..89abcde 100644
Binary files a/logo.png and b/logo.png differ
";

    #[test]
    fn splits_every_file() {
        let files = split_patch(COMMIT);
        let summary: Vec<(&str, ChangeType)> = files
            .iter()
            .map(|f| (f.path.as_str(), f.change_type))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("journal/today.md", ChangeType::Modified),
                ("ideas.md", ChangeType::Added),
                ("old.md", ChangeType::Deleted),
                ("archive/a.md", ChangeType::Renamed),
                ("logo.png", ChangeType::Modified),
            ]
        );
    }

    #[test]
    fn diff_text_starts_at_first_hunk() {
        let files = split_patch(COMMIT);
        assert_eq!(
            files[0].diff_text,
            "@@ -1,2 +1,3 @@\n # Today\n+- wrote tests\n done"
        );
        assert!(files[3].diff_text.is_empty());
        assert!(files[4].diff_text.is_empty());
    }

    #[test]
    fn file_diff_feeds_parser() {
        let files = split_patch(COMMIT);
        let changes = files[0].unified().parse();
        assert_eq!(changes.changed.into_iter().collect::<Vec<_>>(), vec![2]);
        let removed = files[2].unified().parse();
        assert_eq!(removed.deletions.into_iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn plain_unified_diff_is_one_file() {
        let files = split_patch("--- a/note.md\n+++ b/note.md\n@@ -1 +1 @@\n-a\n+b\n");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "note.md");
        assert_eq!(files[0].change_type, ChangeType::Modified);
        assert_eq!(files[0].diff_text, "@@ -1 +1 @@\n-a\n+b");
    }

    #[test]
    fn text_without_files_yields_nothing() {
        assert!(split_patch("").is_empty());
        assert!(split_patch("just a commit message\n").is_empty());
    }

    #[test]
    fn change_type_serializes_as_letter() {
        let json = serde_json::to_string(&ChangeType::Renamed).unwrap();
        assert_eq!(json, "\"R\"");
    }
}
