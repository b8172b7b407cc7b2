/// Language-aware tokenizing of fenced code blocks using syntect.
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use super::escape_html;

/// Prefix for the CSS classes syntect derives from scope names.
pub const CLASS_PREFIX: &str = "hl-";

/// Tokenizes fenced code by language tag.
pub struct FenceHighlighter {
    syntax_set: SyntaxSet,
}

impl std::fmt::Debug for FenceHighlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FenceHighlighter")
            .field("syntaxes", &self.syntax_set.syntaxes().len())
            .finish()
    }
}

impl Default for FenceHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl FenceHighlighter {
    /// Creates a highlighter with the default syntax definitions.
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Syntax for a fence language tag (`rust`, `py`, `sh`, ...).
    pub fn find_syntax(&self, lang: &str) -> Option<&SyntaxReference> {
        if lang.is_empty() {
            return None;
        }
        self.syntax_set.find_syntax_by_token(lang)
    }

    /// Renders the content lines of one block, joined with `\n`.
    ///
    /// Unknown languages, and any tokenizer failure, fall back to escaped
    /// plain text.
    pub fn render_block(&self, lang: &str, lines: &[&str], out: &mut String) {
        let rendered = self
            .find_syntax(lang)
            .and_then(|syntax| self.tokenize(syntax, lines));
        match rendered {
            Some(html) => out.push_str(&html),
            None => render_plain(lines, out),
        }
    }

    fn tokenize(&self, syntax: &SyntaxReference, lines: &[&str]) -> Option<String> {
        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntax_set,
            ClassStyle::SpacedPrefixed {
                prefix: CLASS_PREFIX,
            },
        );
        for line in lines {
            let mut with_newline = String::with_capacity(line.len() + 1);
            with_newline.push_str(line);
            with_newline.push('\n');
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(&with_newline) {
                tracing::debug!("fence tokenizer failed for {}: {e}", syntax.name);
                return None;
            }
        }

        let mut html = generator.finalize();
        // Every fed line ended with a newline; the block itself must not, or
        // the rendered document gains a line. Closing tags contain no newline,
        // so the last one belongs to the last line.
        if let Some(pos) = html.rfind('\n') {
            html.remove(pos);
        }
        Some(html)
    }
}

fn render_plain(lines: &[&str], out: &mut String) {
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        escape_html(line, out);
    }
}
