/// Per-document change tracking for the editor gutter.
///
/// Holds the two snapshots the gutter is computed from (last saved body and
/// the version-control diff text) and recomputes everything from scratch on
/// request. Snapshots are replaced wholesale on save or reload.
use std::time::{Duration, Instant};

use chronicle_config::EngineConfig;

use crate::diff::{DiffOptions, DiffSource, UnifiedDiff, UnsavedDiff};
use crate::frontmatter;
use crate::status::LineStatusReport;

/// Gutter state source for one open document.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    options: DiffOptions,
    baseline: String,
    diff_text: String,
    frontmatter_offset: usize,
}

impl ChangeTracker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            options: DiffOptions::from(config),
            ..Default::default()
        }
    }

    /// Loads a freshly read file: its body becomes the baseline and its
    /// front-matter length the offset into `diff_text`.
    pub fn load(&mut self, file_text: &str, diff_text: impl Into<String>) {
        let split = frontmatter::split(file_text);
        self.baseline = split.body.to_string();
        self.diff_text = diff_text.into();
        self.frontmatter_offset = split.line_offset;
        tracing::debug!(
            baseline_len = self.baseline.len(),
            diff_len = self.diff_text.len(),
            frontmatter_offset = self.frontmatter_offset,
            "loaded document snapshots"
        );
    }

    /// Replaces the saved-body snapshot, e.g. after a save.
    pub fn set_baseline(&mut self, baseline: impl Into<String>) {
        self.baseline = baseline.into();
    }

    /// Replaces the version-control diff snapshot.
    pub fn set_diff_text(&mut self, diff_text: impl Into<String>, frontmatter_offset: usize) {
        self.diff_text = diff_text.into();
        self.frontmatter_offset = frontmatter_offset;
    }

    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    pub fn diff_text(&self) -> &str {
        &self.diff_text
    }

    pub fn frontmatter_offset(&self) -> usize {
        self.frontmatter_offset
    }

    fn unsaved<'a>(&'a self, current: &'a str) -> UnsavedDiff<'a> {
        UnsavedDiff::new(&self.baseline, current).with_options(self.options)
    }

    fn uncommitted(&self) -> UnifiedDiff<'_> {
        UnifiedDiff::new(&self.diff_text).with_frontmatter_offset(self.frontmatter_offset)
    }

    /// Full gutter state for the current body text.
    pub fn refresh(&self, current: &str) -> LineStatusReport {
        LineStatusReport::from_sources(&self.unsaved(current), &self.uncommitted())
    }

    /// Diff text to show for a gutter marker: the unsaved hunk if one covers
    /// the line, otherwise the uncommitted one.
    pub fn hunk_for_line(&self, current: &str, line: usize, deletion: bool) -> Option<String> {
        self.unsaved(current)
            .hunk_for_line(line, deletion)
            .or_else(|| DiffSource::hunk_for_line(&self.uncommitted(), line, deletion))
    }
}

/// Trailing-edge debounce driven by caller-supplied timestamps.
#[derive(Debug, Clone, Copy)]
pub struct Debounce {
    window: Duration,
    last_touch: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_touch: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.debounce())
    }

    /// Records activity, restarting the quiet period.
    pub fn touch(&mut self, now: Instant) {
        self.last_touch = Some(now);
    }

    /// Returns true once the quiet period after the last touch has passed.
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_touch
            .is_some_and(|last| now.saturating_duration_since(last) >= self.window)
    }

    /// Like [`is_due`](Self::is_due), but also clears the pending touch so
    /// the work runs once per pause.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.last_touch = None;
            true
        } else {
            false
        }
    }

    /// Returns true if activity is waiting for the quiet period to pass.
    pub fn is_pending(&self) -> bool {
        self.last_touch.is_some()
    }
}
