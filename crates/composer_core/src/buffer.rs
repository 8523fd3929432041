use std::sync::LazyLock;

use regex::Regex;

static IMAGE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("valid image pattern"));
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank-run pattern"));

/// Markdown reference inserted for an uploaded image.
pub fn image_markdown(url: &str) -> String {
    format!("![image]({url})")
}

/// The single text buffer of a composition.
///
/// Offsets are byte offsets; out-of-range or mid-character offsets are
/// clamped down to the nearest char boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentBuffer {
    text: String,
}

impl ContentBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True when the buffer holds nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn clamp_offset(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    /// Inserts `text` on its own line at `offset` and returns the caret
    /// position just past the inserted text.
    pub fn insert_at(&mut self, offset: usize, text: &str) -> usize {
        let offset = self.clamp_offset(offset);
        let (before, after) = self.text.split_at(offset);

        let prefix = if !before.is_empty() && !before.ends_with('\n') {
            "\n"
        } else {
            ""
        };
        let suffix = if !after.is_empty() && !after.starts_with('\n') {
            "\n"
        } else {
            ""
        };

        let mut next = String::with_capacity(self.text.len() + text.len() + 2);
        next.push_str(before);
        next.push_str(prefix);
        next.push_str(text);
        next.push_str(suffix);
        next.push_str(after);
        self.text = next;

        offset + prefix.len() + text.len()
    }

    /// Removes every image reference pointing at `url`, then collapses blank
    /// runs to a single blank line and trims the buffer.
    pub fn remove_by_url(&mut self, url: &str) {
        let pattern = format!(r"!\[[^\]]*\]\({}\)", regex::escape(url));
        // An escaped literal always compiles; fall back to leaving the text alone.
        let Ok(matcher) = Regex::new(&pattern) else {
            return;
        };
        let stripped = matcher.replace_all(&self.text, "");
        let collapsed = BLANK_RUN.replace_all(&stripped, "\n\n");
        self.text = collapsed.trim().to_string();
    }

    /// URLs of every `![alt](url)` reference, in buffer order.
    pub fn image_urls(&self) -> Vec<String> {
        IMAGE_REF
            .captures_iter(&self.text)
            .map(|caps| caps[2].to_string())
            .collect()
    }
}
