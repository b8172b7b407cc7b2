/// Front matter: the `---`-delimited metadata block at the top of a note.
///
/// The editor numbers lines relative to the body, while version control
/// numbers them relative to the whole file. `line_offset` converts between
/// the two.
use serde_yaml::Value;

const DELIMITER: &str = "---";

/// A document split into its front matter and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// Lines between the delimiters, without the delimiters themselves.
    pub header: Option<&'a str>,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
    /// Number of file lines before the first body line.
    pub line_offset: usize,
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches('\n').trim_end_matches('\r') == DELIMITER
}

/// Splits `text` into front matter and body.
///
/// Front matter exists only if the first line is exactly `---` and a later
/// line is `---` as well. Otherwise the whole text is body.
pub fn split(text: &str) -> FrontMatter<'_> {
    let plain = FrontMatter {
        header: None,
        body: text,
        line_offset: 0,
    };

    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return plain;
    };
    if !is_delimiter(first) || !first.ends_with('\n') {
        return plain;
    }

    let mut offset = first.len();
    for (idx, line) in lines.enumerate() {
        if is_delimiter(line) {
            let header = text[first.len()..offset]
                .trim_end_matches('\n')
                .trim_end_matches('\r');
            return FrontMatter {
                header: Some(header),
                body: &text[offset + line.len()..],
                line_offset: idx + 2,
            };
        }
        offset += line.len();
    }
    plain
}

impl<'a> FrontMatter<'a> {
    /// Converts a 1-based body line to a 1-based file line.
    pub fn to_file_line(&self, body_line: usize) -> usize {
        body_line + self.line_offset
    }

    /// Converts a 1-based file line to a 1-based body line. Lines inside the
    /// front matter have no body line.
    pub fn to_body_line(&self, file_line: usize) -> Option<usize> {
        file_line
            .checked_sub(self.line_offset)
            .filter(|&line| line > 0)
    }

    /// Parsed YAML header. `None` without front matter or when the header
    /// is not valid YAML.
    pub fn metadata(&self) -> Option<Value> {
        let header = self.header?;
        match serde_yaml::from_str(header) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("invalid front matter: {e}");
                None
            }
        }
    }

    /// Value of a top-level scalar entry as text. Mappings, sequences and
    /// null values have no text.
    pub fn field(&self, key: &str) -> Option<String> {
        match self.metadata()?.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }
}
