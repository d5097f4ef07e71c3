//! Streaming XML writer used by the dictionary serializer.
//!
//! Empty elements are written self-closing, text-only elements stay on one
//! line, and elements with element children are indented when pretty
//! printing is on.

use std::io::Write;

use crate::constants::{ATTR_XML_LANG, DEFAULT_ENCODING};

/// Options for writing a dictionary.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Whether to pretty-print with indentation.
    pub indent: bool,
    /// String written once per nesting level.
    pub indent_unit: String,
    /// Requested character encoding; unsupported ones fall back to UTF-8.
    pub encoding: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            indent: true,
            indent_unit: "  ".to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}

impl ExportOptions {
    /// Compact output on a single line.
    pub fn compact() -> Self {
        ExportOptions {
            indent: false,
            ..Default::default()
        }
    }
}

/// Encodings the writer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    /// Non-ASCII characters are written as character references.
    UsAscii,
}

impl Encoding {
    /// Looks up an encoding by any of its common labels.
    pub fn from_label(label: &str) -> Option<Encoding> {
        match label.trim().to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Some(Encoding::Utf8),
            "US-ASCII" | "ASCII" => Some(Encoding::UsAscii),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::UsAscii => "US-ASCII",
        }
    }
}

/// Per-element state kept while the element is open.
#[derive(Debug, Clone)]
struct Frame {
    has_children: bool,
    /// `xml:lang` in scope inside this element.
    lang: Option<String>,
}

/// Low-level XML writer.
pub struct XmlWriter<W: Write> {
    writer: W,
    indent: bool,
    indent_unit: String,
    encoding: Encoding,
    stack: Vec<Frame>,
    /// A start tag has been written without its closing `>`.
    tag_open: bool,
}

impl<W: Write> XmlWriter<W> {
    /// Creates a writer with the given options.
    pub fn new(writer: W, options: &ExportOptions) -> Self {
        let encoding = Encoding::from_label(&options.encoding).unwrap_or_else(|| {
            tracing::warn!(
                "unsupported encoding {:?}, falling back to {}",
                options.encoding,
                DEFAULT_ENCODING
            );
            Encoding::Utf8
        });
        XmlWriter {
            writer,
            indent: options.indent,
            indent_unit: options.indent_unit.clone(),
            encoding,
            stack: Vec::new(),
            tag_open: false,
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn start_document(&mut self) -> std::io::Result<()> {
        write!(
            self.writer,
            "<?xml version=\"1.0\" encoding=\"{}\"?>",
            self.encoding.label()
        )?;
        if self.indent {
            writeln!(self.writer)?;
        }
        Ok(())
    }

    pub fn end_document(&mut self) -> std::io::Result<()> {
        writeln!(self.writer)?;
        self.writer.flush()
    }

    /// Opens the document element.
    ///
    /// `lang` becomes the locale in scope without being written; the root's
    /// attributes are expected to carry it already.
    pub fn start_root(
        &mut self,
        qname: &str,
        attrs: &[(&str, &str)],
        lang: Option<&str>,
    ) -> std::io::Result<()> {
        self.open_tag(qname, attrs, None)?;
        self.push_frame(lang.map(str::to_string));
        Ok(())
    }

    /// Opens an element.
    ///
    /// `xml:lang` is written only when `lang` differs from the locale in scope.
    /// A `None` locale under a parent that has one is written as `xml:lang=""`.
    pub fn start_element(
        &mut self,
        qname: &str,
        attrs: &[(&str, &str)],
        lang: Option<&str>,
    ) -> std::io::Result<()> {
        let written_lang = match (lang, self.current_lang()) {
            (Some(l), Some(inherited)) if l == inherited => None,
            (Some(l), _) => Some(l),
            (None, Some(_)) => Some(""),
            (None, None) => None,
        };
        self.open_tag(qname, attrs, written_lang)?;
        self.push_frame(lang.map(str::to_string));
        Ok(())
    }

    /// Locale in scope inside the innermost open element.
    pub fn current_lang(&self) -> Option<&str> {
        self.stack.last().and_then(|f| f.lang.as_deref())
    }

    fn open_tag(
        &mut self,
        qname: &str,
        attrs: &[(&str, &str)],
        lang: Option<&str>,
    ) -> std::io::Result<()> {
        self.close_pending_tag()?;
        if let Some(parent) = self.stack.last_mut() {
            parent.has_children = true;
        }
        if self.indent && !self.stack.is_empty() {
            writeln!(self.writer)?;
            self.write_indent(self.stack.len())?;
        }

        let mut tag = String::new();
        tag.push('<');
        tag.push_str(qname);
        for (name, value) in attrs {
            self.push_attribute(&mut tag, name, value);
        }
        if let Some(lang) = lang {
            self.push_attribute(&mut tag, ATTR_XML_LANG, lang);
        }
        write!(self.writer, "{}", tag)?;
        self.tag_open = true;
        Ok(())
    }

    fn push_attribute(&self, tag: &mut String, name: &str, value: &str) {
        tag.push(' ');
        tag.push_str(name);
        tag.push_str("=\"");
        tag.push_str(&to_entities(value, self.encoding));
        tag.push('"');
    }

    fn push_frame(&mut self, lang: Option<String>) {
        self.stack.push(Frame {
            has_children: false,
            lang,
        });
    }

    /// Writes character data inside the current element.
    pub fn text(&mut self, text: &str) -> std::io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.close_pending_tag()?;
        let encoded = to_entities(text, self.encoding);
        write!(self.writer, "{}", encoded)
    }

    /// Closes the innermost open element.
    pub fn end_element(&mut self, qname: &str) -> std::io::Result<()> {
        let frame = self.stack.pop().unwrap_or(Frame {
            has_children: false,
            lang: None,
        });

        if self.tag_open {
            // No content - use self-closing tag
            self.tag_open = false;
            return write!(self.writer, " />");
        }

        if self.indent && frame.has_children {
            writeln!(self.writer)?;
            self.write_indent(self.stack.len())?;
        }
        write!(self.writer, "</{}>", qname)
    }

    /// Writes `<qname>text</qname>` in the locale of its parent.
    pub fn text_element(&mut self, qname: &str, text: &str) -> std::io::Result<()> {
        let lang = self.current_lang().map(str::to_string);
        self.start_element(qname, &[], lang.as_deref())?;
        self.text(text)?;
        self.end_element(qname)
    }

    fn close_pending_tag(&mut self) -> std::io::Result<()> {
        if self.tag_open {
            self.tag_open = false;
            write!(self.writer, ">")?;
        }
        Ok(())
    }

    fn write_indent(&mut self, level: usize) -> std::io::Result<()> {
        for _ in 0..level {
            self.writer.write_all(self.indent_unit.as_bytes())?;
        }
        Ok(())
    }
}

/// Converts special characters to XML entities.
fn to_entities(s: &str, encoding: Encoding) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\'' => result.push_str("&apos;"),
            '"' => result.push_str("&quot;"),
            c if encoding == Encoding::UsAscii && !c.is_ascii() => {
                result.push_str(&format!("&#x{:X};", c as u32));
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(options: ExportOptions, build: F) -> String
    where
        F: FnOnce(&mut XmlWriter<&mut Vec<u8>>) -> std::io::Result<()>,
    {
        let mut output = Vec::new();
        {
            let mut writer = XmlWriter::new(&mut output, &options);
            build(&mut writer).unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_compact_output() {
        let out = render(ExportOptions::compact(), |w| {
            w.start_document()?;
            w.start_root("root", &[("xmlns", "urn:x")], None)?;
            w.text_element("name", "Tool")?;
            w.start_element("empty", &[("a", "1")], None)?;
            w.end_element("empty")?;
            w.end_element("root")?;
            w.end_document()
        });
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><root xmlns=\"urn:x\"><name>Tool</name><empty a=\"1\" /></root>\n"
        );
    }

    #[test]
    fn test_pretty_output_uses_indent_unit() {
        let options = ExportOptions {
            indent_unit: "\t".to_string(),
            ..Default::default()
        };
        let out = render(options, |w| {
            w.start_document()?;
            w.start_root("a", &[], None)?;
            w.start_element("b", &[], None)?;
            w.text_element("c", "deep")?;
            w.end_element("b")?;
            w.end_element("a")?;
            w.end_document()
        });
        assert_eq!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a>\n\t<b>\n\t\t<c>deep</c>\n\t</b>\n</a>\n"
        );
    }

    #[test]
    fn test_lang_written_only_when_scope_changes() {
        let out = render(ExportOptions::compact(), |w| {
            w.start_root("r", &[], Some("en"))?;
            w.start_element("t", &[], Some("en"))?;
            w.end_element("t")?;
            w.start_element("u", &[], Some("de"))?;
            w.start_element("v", &[], Some("de"))?;
            w.end_element("v")?;
            w.end_element("u")?;
            w.end_element("r")
        });
        assert_eq!(out, "<r><t /><u xml:lang=\"de\"><v /></u></r>");
    }

    #[test]
    fn test_cleared_lang_written_empty() {
        let out = render(ExportOptions::compact(), |w| {
            w.start_root("r", &[], Some("en"))?;
            w.start_element("t", &[], None)?;
            w.start_element("u", &[], None)?;
            w.end_element("u")?;
            w.end_element("t")?;
            w.text_element("g", "x")?;
            w.end_element("r")
        });
        assert_eq!(out, "<r><t xml:lang=\"\"><u /></t><g>x</g></r>");
    }

    #[test]
    fn test_entity_encoding() {
        let out = render(ExportOptions::compact(), |w| {
            w.start_root("r", &[("q", "a\"b")], None)?;
            w.text("AT&T <x>")?;
            w.end_element("r")
        });
        assert_eq!(out, "<r q=\"a&quot;b\">AT&amp;T &lt;x&gt;</r>");
    }

    #[test]
    fn test_ascii_encoding_escapes_non_ascii() {
        let options = ExportOptions {
            indent: false,
            encoding: "us-ascii".to_string(),
            ..Default::default()
        };
        let out = render(options, |w| {
            w.start_document()?;
            w.start_root("r", &[], None)?;
            w.text("café")?;
            w.end_element("r")?;
            w.end_document()
        });
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"US-ASCII\"?>"));
        assert!(out.contains("caf&#xE9;"));
    }

    #[test]
    fn test_unknown_encoding_falls_back() {
        let options = ExportOptions {
            encoding: "EBCDIC-XYZ".to_string(),
            ..Default::default()
        };
        let mut output = Vec::new();
        let writer = XmlWriter::new(&mut output, &options);
        assert_eq!(writer.encoding(), Encoding::Utf8);
    }
}
