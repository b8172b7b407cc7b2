/// Inline tokenizer: code spans, images, links, strikethrough, bold, italic.
use std::sync::LazyLock;

use regex::{Match, Regex};

use super::escape_html;

/// Inline token kinds in priority order. When two patterns match at the same
/// position the earlier kind wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineKind {
    Code,
    Image,
    Link,
    Strike,
    Bold,
    Italic,
}

impl InlineKind {
    const ALL: [InlineKind; 6] = [
        InlineKind::Code,
        InlineKind::Image,
        InlineKind::Link,
        InlineKind::Strike,
        InlineKind::Bold,
        InlineKind::Italic,
    ];

    fn class(self) -> &'static str {
        match self {
            InlineKind::Code => "md-code",
            InlineKind::Image => "md-image",
            InlineKind::Link => "md-link",
            InlineKind::Strike => "md-strike",
            InlineKind::Bold => "md-bold",
            InlineKind::Italic => "md-italic",
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            InlineKind::Code => &CODE,
            InlineKind::Image => &IMAGE,
            InlineKind::Link => &LINK,
            InlineKind::Strike => &STRIKE,
            InlineKind::Bold => &BOLD,
            InlineKind::Italic => &ITALIC,
        }
    }

    /// Earliest acceptable match starting at or after `from`.
    fn find<'t>(self, text: &'t str, from: usize) -> Option<Match<'t>> {
        let regex = self.regex();
        if self != InlineKind::Italic {
            return regex.find_at(text, from);
        }
        let mut pos = from;
        while let Some(m) = regex.find_at(text, pos) {
            if is_standalone_emphasis(text, m) {
                return Some(m);
            }
            // Delimiters are ASCII, so the next byte is a char boundary
            pos = m.start() + 1;
        }
        None
    }
}

static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`]+`").expect("code pattern"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("image pattern"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]+\]\([^)]*\)").expect("link pattern"));
static STRIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~[^~]+~~").expect("strike pattern"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*[^*]+\*\*|__[^_]+__").expect("bold pattern"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*[^*\s][^*]*\*|_[^_\s][^_]*_").expect("italic pattern"));

/// Rejects single-marker matches that are really half of a doubled (bold)
/// delimiter, and underscores inside words such as `snake_case_name`.
fn is_standalone_emphasis(text: &str, m: Match<'_>) -> bool {
    let bytes = text.as_bytes();
    let marker = bytes[m.start()];
    let before = m.start().checked_sub(1).map(|i| bytes[i]);
    let after = bytes.get(m.end()).copied();

    if before == Some(marker) || after == Some(marker) {
        return false;
    }
    if marker == b'_' {
        let is_word = |b: Option<u8>| b.is_some_and(|b| b.is_ascii_alphanumeric());
        if is_word(before) || is_word(after) {
            return false;
        }
    }
    true
}

/// Appends `text` to `out` with inline tokens wrapped in styled spans and
/// everything else escaped.
pub fn render_inline(text: &str, out: &mut String) {
    let mut pos = 0;
    while pos < text.len() {
        let mut best: Option<(InlineKind, Match<'_>)> = None;
        for kind in InlineKind::ALL {
            let Some(m) = kind.find(text, pos) else {
                continue;
            };
            if best.is_none_or(|(_, b)| m.start() < b.start()) {
                best = Some((kind, m));
            }
        }
        let Some((kind, m)) = best else {
            break;
        };

        escape_html(&text[pos..m.start()], out);
        out.push_str("<span class=\"");
        out.push_str(kind.class());
        out.push_str("\">");
        escape_html(m.as_str(), out);
        out.push_str("</span>");
        pos = m.end();
    }
    escape_html(&text[pos..], out);
}
