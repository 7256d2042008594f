//! Code generation.
//!
//! `CodeBuffer` accumulates generated text and recovers the regions a user
//! may have edited in the previous generation of the same file. Regions are
//! delimited by literal tag strings and found by plain substring search, so
//! the buffer never needs to understand the language it writes. Tags must be
//! unique across the whole file.

pub mod scene;

/// Never present in generated text; marks "up to the end of the previous text".
const END_OF_DOCUMENT: &str = "papa(--o^^o--)pig";

/// Indentation is written lazily, when the first non-empty text of a line
/// arrives, so blank lines carry no trailing tabs. Right after `line`, the
/// next line's tabs are not written yet: `offset()` and `len()` point at the
/// start of that line, and a `cut` or `trim` from there never leaves stray
/// indentation behind.
#[derive(Debug, Clone)]
pub struct CodeBuffer {
    text: String,
    replace: String,
    indent: usize,
    line_start: bool,
}

impl CodeBuffer {
    /// `replace` is the previous generation, or `""` on the first compile.
    pub fn new(replace: impl Into<String>) -> Self {
        CodeBuffer {
            text: String::new(),
            replace: replace.into(),
            indent: 0,
            line_start: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Offset (in bytes) where the next write lands.
    pub fn offset(&self) -> usize {
        self.text.len()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    // -----------------------------------------------------------------------
    // Writing
    // -----------------------------------------------------------------------

    pub fn append(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if self.line_start {
            for _ in 0..self.indent {
                self.text.push('\t');
            }
            self.line_start = false;
        }
        self.text.push_str(s);
    }

    /// Write `s` and end the line. The next line starts at the current depth.
    pub fn line(&mut self, s: &str) {
        self.append(s);
        self.text.push('\n');
        self.line_start = true;
    }

    /// Write `s` at the current depth, then nest the following lines.
    pub fn open_indent(&mut self, s: &str) {
        self.append(s);
        self.indent += 1;
        self.line("");
    }

    /// Un-nest, end any pending line, and write `s` at the outer depth.
    pub fn close_indent(&mut self, s: &str) {
        self.indent = self.indent.saturating_sub(1);
        if !self.line_start {
            self.line("");
        }
        self.line(s);
    }

    /// Write verbatim text one line at a time, keeping its line breaks.
    pub fn user_code(&mut self, text: &str) {
        for line in text.split('\n') {
            self.line(line);
        }
    }

    /// Write the items separated by `", "`.
    pub fn join<S: AsRef<str>>(&mut self, items: &[S]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            self.append(item.as_ref());
        }
    }

    // -----------------------------------------------------------------------
    // Sections
    // -----------------------------------------------------------------------

    /// Everything before `end_tag` in the previous text, or `default_content`
    /// when there is no previous text or it lacks the tag.
    pub fn start_section_content<'a>(&'a self, end_tag: &str, default_content: &'a str) -> &'a str {
        match self.replace.find(end_tag) {
            Some(j) if !self.replace.is_empty() => &self.replace[..j],
            _ => default_content,
        }
    }

    /// The text strictly between `open_tag` and the first `close_tag` after
    /// it. A missing close tag extends the section to the end of the previous
    /// text; a missing open tag yields `default_content`.
    pub fn section_content<'a>(
        &'a self,
        open_tag: &str,
        close_tag: &str,
        default_content: &'a str,
    ) -> &'a str {
        let Some(i) = self.replace.find(open_tag) else {
            return default_content;
        };
        let start = i + open_tag.len();
        let end = self.replace[start..]
            .find(close_tag)
            .map_or(self.replace.len(), |j| start + j);
        &self.replace[start..end]
    }

    /// Keep the user-owned head of the file, up to and including `end_tag`.
    pub fn section_start(&mut self, end_tag: &str, default_content: &str) {
        let content = self.start_section_content(end_tag, default_content).to_string();
        self.append(&content);
        self.append(end_tag);
    }

    /// Keep the user-owned tail of the file, from `open_tag` to the end.
    pub fn section_end(&mut self, open_tag: &str, default_content: &str) {
        self.append(open_tag);
        let content = self
            .section_content(open_tag, END_OF_DOCUMENT, default_content)
            .to_string();
        self.append(&content);
    }

    /// Keep a user-owned region delimited by `open_tag` and `close_tag`.
    pub fn section(&mut self, open_tag: &str, close_tag: &str, default_content: &str) {
        let content = self
            .section_content(open_tag, close_tag, default_content)
            .to_string();
        self.append(open_tag);
        self.append(&content);
        self.append(close_tag);
    }

    // -----------------------------------------------------------------------
    // Editing written text
    // -----------------------------------------------------------------------

    /// Remove and return `start..end` of the written text. Offsets must come
    /// from `offset()`; invalid ranges return `None` and change nothing.
    pub fn cut(&mut self, start: usize, end: usize) -> Option<String> {
        let end = end.min(self.text.len());
        if start > end || !self.text.is_char_boundary(start) || !self.text.is_char_boundary(end) {
            return None;
        }
        let removed: String = self.text.drain(start..end).collect();
        if start == self.text.len() {
            self.line_start = self.text.is_empty() || self.text.ends_with('\n');
        }
        Some(removed)
    }

    /// Run `f`, then drop what it wrote if that is only whitespace.
    pub fn trim(&mut self, f: impl FnOnce(&mut Self)) {
        let a = self.len();
        let line_start = self.line_start;
        f(self);
        if self.len() >= a && self.text[a..].trim().is_empty() {
            self.text.truncate(a);
            self.line_start = line_start;
        }
    }
}

// ---------------------------------------------------------------------------
// String helpers
// ---------------------------------------------------------------------------

/// Escape text for use inside a quoted string literal. Every occurrence is
/// replaced.
pub fn escape_string_literals(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
}

/// `None` for strings that are empty or only whitespace.
pub fn empty_string_to_none(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// A double-quoted string literal.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", escape_string_literals(s))
}

/// Number literal: integral values print without a fractional part.
pub fn number(n: f64) -> String {
    if n.is_finite() {
        format!("{n}")
    } else {
        "0".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_indent_nesting() {
        let mut code = CodeBuffer::new("");
        code.open_indent("foo() {");
        code.line("a();");
        code.open_indent("if (x) {");
        code.line("b();");
        code.close_indent("}");
        code.close_indent("}");
        assert_eq!(code.text(), "foo() {\n\ta();\n\tif (x) {\n\t\tb();\n\t}\n}\n");
    }

    #[test]
    fn offsets_stop_before_pending_indentation() {
        let mut code = CodeBuffer::new("");
        code.open_indent("{");
        code.line("a();");
        let mark = code.offset();
        assert_eq!(code.text(), "{\n\ta();\n");
        assert_eq!(mark, code.len());

        code.line("");
        code.append("b();");
        assert_eq!(code.cut(mark, code.offset()).as_deref(), Some("\n\tb();"));
        assert_eq!(code.text(), "{\n\ta();\n");
    }

    #[test]
    fn user_code_keeps_line_breaks() {
        let mut code = CodeBuffer::new("");
        code.open_indent("{");
        code.user_code("one\n  two\n\nthree");
        assert_eq!(code.text(), "{\n\tone\n\t  two\n\n\tthree\n");
    }

    #[test]
    fn first_pass_uses_defaults() {
        let mut code = CodeBuffer::new("");
        code.section_start("/* START */", "HEAD");
        code.section("/* A */", "/* B */", "body");
        code.section_end("/* END */", "TAIL");
        assert_eq!(code.text(), "HEAD/* START *//* A */body/* B *//* END */TAIL");
    }

    #[test]
    fn section_preserves_user_text() {
        let previous = "generated\nBEGIN\n// custom\nEND\nmore generated";
        let mut code = CodeBuffer::new(previous);
        code.append("different prefix ");
        code.section("BEGIN", "END", "");
        assert_eq!(code.section_content("BEGIN", "END", "x"), "\n// custom\n");
        assert_eq!(code.text(), "different prefix BEGIN\n// custom\nEND");
    }

    #[test]
    fn missing_close_tag_preserves_to_end() {
        let previous = "head BEGIN\n// custom\nstill mine";
        let code = CodeBuffer::new(previous);
        assert_eq!(code.section_content("BEGIN", "END", "default"), "\n// custom\nstill mine");
    }

    #[test]
    fn missing_open_tag_uses_default() {
        let code = CodeBuffer::new("nothing here END");
        assert_eq!(code.section_content("BEGIN", "END", "default"), "default");
    }

    #[test]
    fn close_tag_is_searched_after_open_tag() {
        let code = CodeBuffer::new("END stray BEGIN kept END");
        assert_eq!(code.section_content("BEGIN", "END", ""), " kept ");
    }

    #[test]
    fn whitespace_only_section_is_still_preserved() {
        let code = CodeBuffer::new("BEGIN\n\n  END");
        assert_eq!(code.section_content("BEGIN", "END", "default"), "\n\n  ");
    }

    #[test]
    fn section_start_and_end_recover_head_and_tail() {
        let previous = "import x;\n/* START */generated/* END */\nextra();\n";
        let mut code = CodeBuffer::new(previous);
        code.section_start("/* START */", "default head");
        code.append("new");
        code.section_end("/* END */", "default tail");
        assert_eq!(code.text(), "import x;\n/* START */new/* END */\nextra();\n");

        let mut code = CodeBuffer::new("no tags at all");
        code.section_start("/* START */", "H");
        code.section_end("/* END */", "T");
        assert_eq!(code.text(), "H/* START *//* END */T");
    }

    #[test]
    fn trim_drops_blank_output_only() {
        let mut code = CodeBuffer::new("");
        code.append("keep");
        let before = code.len();
        code.trim(|c| {
            c.line("");
            c.append("  \t");
        });
        assert_eq!(code.len(), before);

        code.trim(|c| c.append(" kept"));
        assert_eq!(code.text(), "keep kept");
    }

    #[test]
    fn cut_removes_a_span() {
        let mut code = CodeBuffer::new("");
        code.append("abc");
        let start = code.offset();
        code.append("DEF");
        let end = code.offset();
        code.append("ghi");
        assert_eq!(code.cut(start, end).as_deref(), Some("DEF"));
        assert_eq!(code.text(), "abcghi");
        assert_eq!(code.cut(4, 2), None);
    }

    #[test]
    fn join_separates_with_commas() {
        let mut code = CodeBuffer::new("");
        code.join(&["1", "2", "\"k\""]);
        assert_eq!(code.text(), "1, 2, \"k\"");
    }

    #[test]
    fn escapes_every_occurrence() {
        assert_eq!(escape_string_literals(r#"a"b"c"#), r#"a\"b\"c"#);
        assert_eq!(escape_string_literals("it's 'x'"), "it\\'s \\'x\\'");
        assert_eq!(escape_string_literals("a\\b\\c"), "a\\\\b\\\\c");
        assert_eq!(escape_string_literals("one\ntwo\tthree"), "one\\ntwo\\tthree");
    }

    #[test]
    fn literals() {
        assert_eq!(quote("say \"hi\"\n"), r#""say \"hi\"\n""#);
        assert_eq!(quote("it's"), r#""it\'s""#);
        assert_eq!(number(400.0), "400");
        assert_eq!(number(0.5), "0.5");
        assert_eq!(number(-12.25), "-12.25");
        assert_eq!(empty_string_to_none(Some("  ")), None);
        assert_eq!(empty_string_to_none(Some("x")), Some("x"));
    }
}
