/// Change tracking and highlighting core for the Chronicle note editor.
///
/// Everything here is a pure function of its input strings: the engine
/// never touches files or repositories. Callers hand in the saved baseline,
/// the current text and the diff text produced by version control, and get
/// back gutter status, hunk text for popups and highlighted markup.
pub mod diff;
pub mod frontmatter;
pub mod highlight;
pub mod patch;
pub mod status;
pub mod tracker;

pub use diff::{DiffOptions, DiffSource, LineChanges, UnifiedDiff, UnsavedDiff};
pub use frontmatter::FrontMatter;
pub use highlight::Highlighter;
pub use patch::{split_patch, ChangeType, FileDiff};
pub use status::{DeletionMarkerMap, LineStatus, LineStatusMap, LineStatusReport};
pub use tracker::{ChangeTracker, Debounce};
