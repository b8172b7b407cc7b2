/// Line-oriented markdown highlighter.
///
/// Produces escaped markup with `<span class="md-…">` styling for the
/// editor overlay. Output has exactly one rendered line per input line so it
/// can be laid over the text area. The highlighter keeps no state between
/// calls and is meant to run on every keystroke.
pub mod fence;
pub mod inline;

use std::sync::LazyLock;

use chronicle_config::EngineConfig;
use regex::Regex;

pub use fence::FenceHighlighter;
pub use inline::render_inline;

const FRONT_MATTER_DELIMITER: &str = "---";

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*`{3,}\s*([\w+#.-]*)\s*$").expect("fence open pattern"));
static FENCE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*`{3,}\s*$").expect("fence close pattern"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6}) ").expect("heading pattern"));
static THEMATIC_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(?:\*\s*){3,}|(?:-\s*){3,}|(?:_\s*){3,})$").expect("thematic break pattern")
});
static BLOCK_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*> ?").expect("block quote pattern"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+\.) ").expect("list item pattern"));

/// Appends `text` to `out`, escaping `&`, `<` and `>`.
pub fn escape_html(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn push_span(out: &mut String, class: &str, text: &str) {
    out.push_str("<span class=\"");
    out.push_str(class);
    out.push_str("\">");
    escape_html(text, out);
    out.push_str("</span>");
}

/// Markdown highlighter for the editor overlay.
#[derive(Debug)]
pub struct Highlighter {
    fences: FenceHighlighter,
    tokenize_fences: bool,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Creates a highlighter that tokenizes fenced code by language.
    pub fn new() -> Self {
        Self {
            fences: FenceHighlighter::new(),
            tokenize_fences: true,
        }
    }

    /// Creates a highlighter following `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            fences: FenceHighlighter::new(),
            tokenize_fences: config.highlight_code_fences,
        }
    }

    /// Renders the whole document.
    pub fn highlight(&self, text: &str) -> String {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut out = String::with_capacity(text.len() * 2);
        let mut idx = 0;

        if lines[0] == FRONT_MATTER_DELIMITER {
            push_span(&mut out, "md-frontmatter", lines[0]);
            idx = 1;
            while idx < lines.len() {
                out.push('\n');
                push_span(&mut out, "md-frontmatter", lines[idx]);
                idx += 1;
                if lines[idx - 1] == FRONT_MATTER_DELIMITER {
                    break;
                }
            }
        }

        while idx < lines.len() {
            if idx > 0 {
                out.push('\n');
            }
            let line = lines[idx];
            let Some(lang) = FENCE_OPEN.captures(line).map(|c| c.get(1).map_or("", |m| m.as_str()))
            else {
                self.render_line(line, &mut out);
                idx += 1;
                continue;
            };

            let content_start = idx + 1;
            let close = lines[content_start..]
                .iter()
                .position(|l| FENCE_CLOSE.is_match(l))
                .map(|offset| content_start + offset);
            let content_end = close.unwrap_or(lines.len());

            push_span(&mut out, "md-fence", line);
            if content_start < content_end {
                out.push('\n');
                self.render_code(lang, &lines[content_start..content_end], &mut out);
            }
            match close {
                Some(close_idx) => {
                    out.push('\n');
                    push_span(&mut out, "md-fence", lines[close_idx]);
                    idx = close_idx + 1;
                }
                // Unterminated: the fence runs to the end of the document
                None => idx = lines.len(),
            }
        }
        out
    }

    fn render_code(&self, lang: &str, lines: &[&str], out: &mut String) {
        out.push_str("<span class=\"md-code-block\">");
        let lang = if self.tokenize_fences { lang } else { "" };
        self.fences.render_block(lang, lines, out);
        out.push_str("</span>");
    }

    /// Renders one line outside front matter and code fences.
    fn render_line(&self, line: &str, out: &mut String) {
        if let Some(caps) = HEADING.captures(line) {
            let marker = &caps[0];
            let level = caps[1].len();
            push_span(out, "md-heading-marker", marker);
            out.push_str("<span class=\"md-heading md-h");
            out.push_str(&level.to_string());
            out.push_str("\">");
            render_inline(&line[marker.len()..], out);
            out.push_str("</span>");
        } else if THEMATIC_BREAK.is_match(line) {
            push_span(out, "md-hr", line);
        } else if let Some(m) = BLOCK_QUOTE.find(line) {
            push_span(out, "md-quote-marker", m.as_str());
            out.push_str("<span class=\"md-quote\">");
            render_inline(&line[m.end()..], out);
            out.push_str("</span>");
        } else if let Some(m) = LIST_ITEM.find(line) {
            push_span(out, "md-list-marker", m.as_str());
            render_inline(&line[m.end()..], out);
        } else {
            render_inline(line, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hl(text: &str) -> String {
        Highlighter::new().highlight(text)
    }

    // ── Block classification ─────────────────────────────────────────

    #[test]
    fn heading() {
        assert_eq!(
            hl("# Title"),
            "<span class=\"md-heading-marker\"># </span><span class=\"md-heading md-h1\">Title</span>"
        );
    }

    #[test]
    fn heading_levels_and_non_headings() {
        assert!(hl("###### six").contains("md-h6"));
        assert!(!hl("####### seven").contains("md-heading"));
        assert!(!hl("#hashtag").contains("md-heading"));
    }

    #[test]
    fn heading_content_is_inline_tokenized() {
        assert_eq!(
            hl("## A `b`"),
            "<span class=\"md-heading-marker\">## </span><span class=\"md-heading md-h2\">A <span class=\"md-code\">`b`</span></span>"
        );
    }

    #[test]
    fn thematic_breaks() {
        for line in ["***", "- - -", "___", "  ----  "] {
            assert_eq!(hl(&format!("x\n{line}")), format!("x\n<span class=\"md-hr\">{line}</span>"));
        }
        assert!(!hl("x\n**").contains("md-hr"));
        assert!(!hl("x\n-*-").contains("md-hr"));
    }

    #[test]
    fn block_quote() {
        assert_eq!(
            hl("> quoted *text*"),
            "<span class=\"md-quote-marker\">&gt; </span><span class=\"md-quote\">quoted <span class=\"md-italic\">*text*</span></span>"
        );
    }

    #[test]
    fn list_items() {
        assert_eq!(
            hl("- item"),
            "<span class=\"md-list-marker\">- </span>item"
        );
        assert_eq!(
            hl("  12. twelfth"),
            "<span class=\"md-list-marker\">  12. </span>twelfth"
        );
        assert_eq!(hl("-not a list"), "-not a list");
    }

    #[test]
    fn plain_lines_and_blank_lines() {
        assert_eq!(hl("one\n\ntwo"), "one\n\ntwo");
        assert_eq!(hl(""), "");
    }

    // ── Front matter ─────────────────────────────────────────────────

    #[test]
    fn front_matter_block() {
        assert_eq!(
            hl("---\ntitle: x\n---\n# H"),
            "<span class=\"md-frontmatter\">---</span>\n\
             <span class=\"md-frontmatter\">title: x</span>\n\
             <span class=\"md-frontmatter\">---</span>\n\
             <span class=\"md-heading-marker\"># </span><span class=\"md-heading md-h1\">H</span>"
        );
    }

    #[test]
    fn rule_after_first_line_is_not_front_matter() {
        assert_eq!(hl("x\n---"), "x\n<span class=\"md-hr\">---</span>");
    }

    // ── Code fences ──────────────────────────────────────────────────

    #[test]
    fn fence_uses_language_tokenizer() {
        let html = hl("```rust\nfn main() {}\n```\nafter");
        let lines: Vec<&str> = html.split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "<span class=\"md-fence\">```rust</span>");
        assert!(lines[1].starts_with("<span class=\"md-code-block\">"));
        assert!(lines[1].contains("hl-source hl-rust"));
        assert_eq!(lines[2], "<span class=\"md-fence\">```</span>");
        assert_eq!(lines[3], "after");
    }

    #[test]
    fn fence_content_is_not_markdown() {
        let html = hl("```\n# not a heading\n```");
        assert!(!html.contains("md-heading"));
        assert!(html.contains("# not a heading"));
    }

    #[test]
    fn unknown_fence_language_is_plain() {
        assert_eq!(
            hl("```nope\na < b\n```"),
            "<span class=\"md-fence\">```nope</span>\n<span class=\"md-code-block\">a &lt; b</span>\n<span class=\"md-fence\">```</span>"
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end() {
        let html = hl("text\n```rust\nlet x = 1;\nlet y = 2;");
        assert_eq!(html.split('\n').count(), 4);
        assert!(html.contains("hl-source hl-rust"));
    }

    #[test]
    fn empty_fence() {
        assert_eq!(
            hl("```\n```"),
            "<span class=\"md-fence\">```</span>\n<span class=\"md-fence\">```</span>"
        );
    }

    #[test]
    fn fence_tokenizing_can_be_disabled() {
        let config = EngineConfig {
            highlight_code_fences: false,
            ..Default::default()
        };
        let html = Highlighter::from_config(&config).highlight("```rust\nfn main() {}\n```");
        assert!(!html.contains("hl-"));
        assert!(html.contains("fn main() {}"));
    }

    // ── Escaping ─────────────────────────────────────────────────────

    #[test]
    fn script_tags_are_escaped_everywhere() {
        let doc = "---\n<script>\n---\n# <script>\n> <script>\n- <script>\n<script>alert(1)</script>\n```html\n<script>\n```\n```\n<script>";
        let html = hl(doc);
        assert!(!html.contains("<script>"), "{html}");
        assert_eq!(html.split('\n').count(), doc.split('\n').count());
    }

    #[test]
    fn escape_html_three_characters() {
        let mut out = String::new();
        escape_html("<a href=\"x\">&</a>", &mut out);
        assert_eq!(out, "&lt;a href=\"x\"&gt;&amp;&lt;/a&gt;");
    }
}
