//! Forward-only token cursor over a quick-xml reader.
//!
//! The cursor flattens the event stream into start, end and text tokens and
//! keeps just enough state (the effective `xml:lang` of every open element)
//! to answer questions about the token it currently stands on.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::encoding::Decoder;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::constants::ATTR_XML_LANG;
use crate::error::{Error, Result};

/// Outcome of moving the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The cursor stands on a new token.
    Found,
    /// The stream is exhausted.
    Eof,
}

impl Advance {
    pub fn is_eof(&self) -> bool {
        matches!(self, Advance::Eof)
    }
}

/// Kind of the current token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Start,
    End,
    Text,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    prefix: Option<String>,
    local_name: String,
    attributes: Vec<(String, String)>,
    /// Nesting depth; the document element is 0 and an end token carries the
    /// depth of its start token.
    depth: usize,
    lang: Option<String>,
    text: String,
}

impl Token {
    fn text(text: String, depth: usize, lang: Option<String>) -> Self {
        Token {
            kind: TokenKind::Text,
            prefix: None,
            local_name: String::new(),
            attributes: Vec::new(),
            depth,
            lang,
            text,
        }
    }
}

/// Streaming cursor over an XML document.
pub struct TokenCursor<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    token: Option<Token>,
    /// Effective `xml:lang` of each open element, outermost first.
    open: Vec<Option<String>>,
}

impl<'a> TokenCursor<&'a [u8]> {
    /// Creates a cursor over an in-memory document.
    pub fn from_xml(xml: &'a str) -> Self {
        TokenCursor::new(Reader::from_str(xml))
    }
}

impl TokenCursor<BufReader<File>> {
    /// Opens a cursor over a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(TokenCursor::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> TokenCursor<R> {
    /// Creates a cursor over any buffered byte source.
    pub fn from_reader(source: R) -> Self {
        TokenCursor::new(Reader::from_reader(source))
    }

    fn new(mut reader: Reader<R>) -> Self {
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.check_end_names = true;
        // Text is trimmed per element, not per event, so entity references
        // in the middle of a sentence keep their surrounding spaces.
        config.trim_text_start = false;
        config.trim_text_end = false;
        TokenCursor {
            reader,
            buf: Vec::new(),
            token: None,
            open: Vec::new(),
        }
    }

    /// Moves to the next start-of-element token.
    pub fn advance_to_next_element(&mut self) -> Result<Advance> {
        loop {
            if self.advance_to_next_token()?.is_eof() {
                return Ok(Advance::Eof);
            }
            if self.current_kind() == Some(TokenKind::Start) {
                return Ok(Advance::Found);
            }
        }
    }

    /// Moves to the next token, skipping whitespace-only text.
    pub fn advance_to_next_token(&mut self) -> Result<Advance> {
        loop {
            if self.read_token()?.is_eof() {
                return Ok(Advance::Eof);
            }
            match &self.token {
                Some(t) if t.kind == TokenKind::Text && t.text.trim().is_empty() => continue,
                _ => return Ok(Advance::Found),
            }
        }
    }

    /// Reads the next raw token, including whitespace-only text.
    fn read_token(&mut self) -> Result<Advance> {
        loop {
            self.buf.clear();
            let decoder = self.reader.decoder();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| Error::FormatInvalid(e.to_string()))?;

            let token = match event {
                Event::Start(ref e) => {
                    let parent_lang = self.open.last().cloned().flatten();
                    let token = start_token(decoder, e, self.open.len(), parent_lang)?;
                    self.open.push(token.lang.clone());
                    token
                }
                Event::End(ref e) => {
                    let (prefix, local_name) = split_name(decoder, e.name().as_ref())?;
                    let lang = self.open.pop().flatten();
                    Token {
                        kind: TokenKind::End,
                        prefix,
                        local_name,
                        attributes: Vec::new(),
                        depth: self.open.len(),
                        lang,
                        text: String::new(),
                    }
                }
                Event::Text(ref e) => {
                    let raw = decode(decoder, e.as_ref())?;
                    let text = unescape(&raw)
                        .map_err(|e| Error::FormatInvalid(e.to_string()))?
                        .into_owned();
                    Token::text(text, self.open.len(), self.open.last().cloned().flatten())
                }
                Event::CData(ref e) => {
                    let text = decode(decoder, e.as_ref())?.into_owned();
                    Token::text(text, self.open.len(), self.open.last().cloned().flatten())
                }
                Event::GeneralRef(ref e) => {
                    let name = decode(decoder, e.as_ref())?;
                    let text = resolve_reference(&name)?;
                    Token::text(text, self.open.len(), self.open.last().cloned().flatten())
                }
                Event::Eof => {
                    if !self.open.is_empty() {
                        return Err(Error::FormatInvalid(format!(
                            "unexpected end of document, {} element(s) left open",
                            self.open.len()
                        )));
                    }
                    self.token = None;
                    return Ok(Advance::Eof);
                }
                Event::Empty(_)
                | Event::Comment(_)
                | Event::Decl(_)
                | Event::PI(_)
                | Event::DocType(_) => continue,
            };

            self.token = Some(token);
            return Ok(Advance::Found);
        }
    }

    pub fn current_kind(&self) -> Option<TokenKind> {
        self.token.as_ref().map(|t| t.kind)
    }

    /// Local name of the current element token (empty for text).
    pub fn current_local_name(&self) -> &str {
        self.token.as_ref().map_or("", |t| t.local_name.as_str())
    }

    pub fn current_namespace_prefix(&self) -> Option<&str> {
        self.token.as_ref().and_then(|t| t.prefix.as_deref())
    }

    /// Name of the current element as written, `prefix:local` or `local`.
    pub fn current_qualified_name(&self) -> String {
        match self.current_namespace_prefix() {
            Some(prefix) => format!("{}:{}", prefix, self.current_local_name()),
            None => self.current_local_name().to_string(),
        }
    }

    pub fn current_depth(&self) -> usize {
        self.token.as_ref().map_or(0, |t| t.depth)
    }

    /// Effective `xml:lang` of the current token, inherited from ancestors.
    pub fn current_locale_tag(&self) -> Option<&str> {
        self.token.as_ref().and_then(|t| t.lang.as_deref())
    }

    /// Returns true if the cursor is on the end token of the element opened at `depth`.
    pub fn is_closing(&self, depth: usize) -> bool {
        matches!(&self.token, Some(t) if t.kind == TokenKind::End && t.depth == depth)
    }

    /// Looks up an attribute of the current start token by its written name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.token.as_ref().and_then(|t| {
            t.attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        })
    }

    pub fn has_attributes(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.attributes.is_empty())
    }

    /// All attributes of the current start token in document order.
    pub fn attributes(&self) -> &[(String, String)] {
        match &self.token {
            Some(t) => &t.attributes,
            None => &[],
        }
    }

    /// Byte offset of the reader in the source.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Reads the text content of the current element and its descendants.
    ///
    /// The result is trimmed. The cursor is left on the element's end token.
    pub fn read_element_text(&mut self) -> Result<String> {
        let depth = match &self.token {
            Some(t) if t.kind == TokenKind::Start => t.depth,
            Some(t) if t.kind == TokenKind::Text => return Ok(t.text.trim().to_string()),
            _ => return Ok(String::new()),
        };

        let mut text = String::new();
        loop {
            if self.read_token()?.is_eof() {
                break;
            }
            if self.is_closing(depth) {
                break;
            }
            if let Some(t) = &self.token {
                if t.kind == TokenKind::Text {
                    text.push_str(&t.text);
                }
            }
        }
        Ok(text.trim().to_string())
    }

    /// Skips the subtree of the current start token, leaving the cursor on its end token.
    pub fn skip_element(&mut self) -> Result<()> {
        match &self.token {
            Some(t) if t.kind == TokenKind::Start => {
                let depth = t.depth;
                self.skip_to_close(depth)
            }
            _ => Ok(()),
        }
    }

    /// Advances until the end token of the element opened at `depth`.
    pub fn skip_to_close(&mut self, depth: usize) -> Result<()> {
        while !self.is_closing(depth) {
            if self.read_token()?.is_eof() {
                break;
            }
        }
        Ok(())
    }
}

fn decode<'b>(decoder: Decoder, bytes: &'b [u8]) -> Result<Cow<'b, str>> {
    decoder
        .decode(bytes)
        .map_err(|e| Error::FormatInvalid(e.to_string()))
}

fn split_name(decoder: Decoder, qname: &[u8]) -> Result<(Option<String>, String)> {
    let name = decode(decoder, qname)?;
    Ok(match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, name.into_owned()),
    })
}

fn start_token(
    decoder: Decoder,
    e: &BytesStart,
    depth: usize,
    parent_lang: Option<String>,
) -> Result<Token> {
    let (prefix, local_name) = split_name(decoder, e.name().as_ref())?;

    let mut attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr =
            attr_result.map_err(|e| Error::FormatInvalid(format!("attribute error: {}", e)))?;
        let key = decode(decoder, attr.key.as_ref())?.into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::FormatInvalid(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    // An empty xml:lang clears the inherited locale.
    let lang = match attributes.iter().find(|(key, _)| key == ATTR_XML_LANG) {
        Some((_, value)) if value.is_empty() => None,
        Some((_, value)) => Some(value.clone()),
        None => parent_lang,
    };

    Ok(Token {
        kind: TokenKind::Start,
        prefix,
        local_name,
        attributes,
        depth,
        lang,
        text: String::new(),
    })
}

/// Resolves a general entity reference (`amp`, `#38`, `#x26`, ...).
fn resolve_reference(name: &str) -> Result<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        };
        return value
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| Error::FormatInvalid(format!("invalid character reference &{};", name)));
    }
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| Error::FormatInvalid(format!("undefined entity &{};", name)))
}
