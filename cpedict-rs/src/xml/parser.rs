//! Streaming parser that builds a [`Dictionary`] from a token cursor.
//!
//! Every sub-parser starts on the start token of its element and stops on
//! the matching end token. That makes recovery structural: when an entry or
//! vendor fails, the walk skips to the failed element's end token and goes
//! on with the next sibling.

use std::io::BufRead;
use std::path::Path;

use super::cursor::{TokenCursor, TokenKind};
use super::validate;
use crate::constants::*;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{Error, Result};
use crate::model::{
    CatalogEntry, Check, Deprecation, Dictionary, Edition, Generator, Language, Metadata,
    NamespaceDecl, Part, Product, Reference, Title, Update, Vendor, Version, XmlMeta,
};
use crate::name::CpeName;

/// A parsed dictionary together with everything that was skipped on the way.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub dictionary: Dictionary,
    pub diagnostics: Diagnostics,
}

/// Options for parsing.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Run the grammar check before the streaming parse.
    pub validate: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { validate: true }
    }
}

/// Dictionary parser.
#[derive(Debug, Clone, Default)]
pub struct DictionaryParser {
    options: ParseOptions,
}

impl DictionaryParser {
    /// Creates a parser with default options.
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> Self {
        DictionaryParser { options }
    }

    /// Parses a dictionary from a string.
    pub fn parse_str(&self, xml: &str) -> Result<Parsed> {
        if self.options.validate {
            validate::validate_str(xml)?;
        }
        parse(&mut TokenCursor::from_xml(xml))
    }

    /// Parses a dictionary from a file.
    ///
    /// The grammar check reads the file once; the parse then reopens it.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Parsed> {
        let path = path.as_ref();
        if self.options.validate {
            validate::validate_file(path)?;
        }
        tracing::debug!("parsing {}", path.display());
        parse(&mut TokenCursor::open(path)?)
    }

    /// Parses a dictionary from a one-shot byte stream.
    ///
    /// A stream cannot be read twice, so the grammar check is not run here.
    pub fn parse_reader<R: BufRead>(&self, source: R) -> Result<Parsed> {
        parse(&mut TokenCursor::from_reader(source))
    }
}

/// Parses a dictionary from a string with default options.
pub fn parse_str(xml: &str) -> Result<Parsed> {
    DictionaryParser::new().parse_str(xml)
}

/// Parses a dictionary from a file with default options.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Parsed> {
    DictionaryParser::new().parse_file(path)
}

/// Parses a dictionary from a byte stream without the grammar check.
pub fn parse_reader<R: BufRead>(source: R) -> Result<Parsed> {
    DictionaryParser::new().parse_reader(source)
}

/// Builds a dictionary from the cursor.
///
/// Only a broken token stream or a missing `cpe-list` element fails the
/// whole parse; everything else is recorded in [`Parsed::diagnostics`].
pub fn parse<R: BufRead>(cursor: &mut TokenCursor<R>) -> Result<Parsed> {
    let mut state = ParseState {
        cursor,
        diagnostics: Diagnostics::new(),
    };
    let dictionary = state.parse_dictionary()?;
    tracing::info!(
        "parsed dictionary: {} items, {} vendors, {} diagnostics",
        dictionary.items().len(),
        dictionary.vendors().len(),
        state.diagnostics.len()
    );
    Ok(Parsed {
        dictionary,
        diagnostics: state.diagnostics,
    })
}

struct ParseState<'c, R: BufRead> {
    cursor: &'c mut TokenCursor<R>,
    diagnostics: Diagnostics,
}

impl<R: BufRead> ParseState<'_, R> {
    fn parse_dictionary(&mut self) -> Result<Dictionary> {
        loop {
            if self.cursor.advance_to_next_element()?.is_eof() {
                return Err(Error::RootElementMissing);
            }
            if self.cursor.current_local_name() == TAG_CPE_LIST {
                break;
            }
        }

        let mut dict = Dictionary::new();
        dict.xml = self.meta();
        for (name, value) in self.cursor.attributes() {
            dict.add_xmlns(NamespaceDecl::new(name.as_str(), value.as_str()));
        }

        while !self.cursor.advance_to_next_element()?.is_eof() {
            let depth = self.cursor.current_depth();
            match self.cursor.current_local_name() {
                TAG_GENERATOR => {
                    let generator = self.parse_generator()?;
                    dict.set_generator(Some(generator));
                }
                TAG_CPE_ITEM => match self.parse_item() {
                    Ok(item) => dict.add_item(item),
                    Err(e) if e.is_recoverable() => {
                        self.report(DiagnosticKind::EntrySkipped, e.to_string());
                        self.cursor.skip_to_close(depth)?;
                    }
                    Err(e) => return Err(e),
                },
                TAG_VENDOR => match self.parse_vendor() {
                    Ok(vendor) => dict.add_vendor(vendor),
                    Err(e) if e.is_recoverable() => {
                        self.report(DiagnosticKind::VendorSkipped, e.to_string());
                        self.cursor.skip_to_close(depth)?;
                    }
                    Err(e) => return Err(e),
                },
                TAG_COMPONENT_TREE => {
                    // Only groups vendors; step inside.
                    dict.component_tree = self.meta();
                }
                _ => {
                    self.report(
                        DiagnosticKind::UnknownElement,
                        "unknown XML element in CPE dictionary",
                    );
                    self.cursor.skip_element()?;
                }
            }
        }

        Ok(dict)
    }

    fn parse_generator(&mut self) -> Result<Generator> {
        let depth = self.cursor.current_depth();
        let mut generator = Generator {
            xml: self.meta(),
            ..Default::default()
        };

        while let Some(kind) = self.next_child(depth)? {
            if kind != TokenKind::Start {
                continue;
            }
            match self.cursor.current_local_name() {
                TAG_PRODUCT_NAME => generator.product_name = Some(self.cursor.read_element_text()?),
                TAG_PRODUCT_VERSION => {
                    generator.product_version = Some(self.cursor.read_element_text()?)
                }
                TAG_SCHEMA_VERSION => {
                    generator.schema_version = Some(self.cursor.read_element_text()?)
                }
                TAG_TIMESTAMP => generator.timestamp = Some(self.cursor.read_element_text()?),
                _ => {
                    self.report(
                        DiagnosticKind::UnknownElement,
                        "unknown XML element in CPE dictionary generator",
                    );
                    self.cursor.skip_element()?;
                }
            }
        }

        Ok(generator)
    }

    fn parse_item(&mut self) -> Result<CatalogEntry> {
        let depth = self.cursor.current_depth();
        let mut item = CatalogEntry::new(None);
        item.xml = self.meta();

        if let Some(uri) = self.cursor.get_attribute(ATTR_NAME) {
            match CpeName::parse(uri) {
                Ok(name) => item.set_name(Some(name)),
                Err(e) => self.report(DiagnosticKind::NameRejected, e.to_string()),
            }
        }

        if self.cursor.get_attribute(ATTR_DEPRECATED).is_some() {
            let incomplete = || Error::DeprecationIncomplete {
                name: item.name().map(CpeName::to_uri),
            };
            let by = self
                .cursor
                .get_attribute(ATTR_DEPRECATED_BY)
                .and_then(|uri| CpeName::parse(uri).ok())
                .ok_or_else(incomplete)?;
            let date = self
                .cursor
                .get_attribute(ATTR_DEPRECATION_DATE)
                .ok_or_else(incomplete)?
                .to_string();
            item.set_deprecation(Deprecation { by, date });
        }

        while let Some(kind) = self.next_child(depth)? {
            if kind != TokenKind::Start {
                continue;
            }
            match self.cursor.current_local_name() {
                TAG_TITLE => {
                    let title = self.parse_title()?;
                    item.add_title(title);
                }
                TAG_NOTE => {
                    let note = self.parse_title()?;
                    item.add_note(note);
                }
                TAG_CHECK => {
                    let check = self.parse_check()?;
                    item.add_check(check);
                }
                TAG_REFERENCE => {
                    let reference = self.parse_reference()?;
                    item.add_reference(reference);
                }
                TAG_ITEM_METADATA => {
                    let metadata = self.parse_metadata(&item)?;
                    item.set_metadata(Some(metadata));
                }
                TAG_REFERENCES | TAG_NOTES => {
                    // Grouping only; their children are handled above.
                }
                _ => {
                    // The entry ends at the first child it does not know and
                    // is kept as built so far.
                    self.report(
                        DiagnosticKind::EntryTruncated,
                        format!(
                            "entry {} stopped at unexpected child",
                            item.name().map_or_else(|| "<unnamed>".to_string(), CpeName::to_uri)
                        ),
                    );
                    self.cursor.skip_to_close(depth)?;
                    return Ok(item);
                }
            }
        }

        Ok(item)
    }

    fn parse_title(&mut self) -> Result<Title> {
        let xml = self.meta();
        let content = self.cursor.read_element_text()?;
        Ok(Title { xml, content })
    }

    fn parse_check(&mut self) -> Result<Check> {
        let xml = self.meta();
        let system = self
            .cursor
            .get_attribute(ATTR_SYSTEM)
            .ok_or(Error::MissingAttribute {
                element: TAG_CHECK,
                attribute: ATTR_SYSTEM,
            })?
            .to_string();
        let href = self.attribute(ATTR_HREF);
        let identifier = non_empty(self.cursor.read_element_text()?);
        Ok(Check {
            xml,
            system,
            href,
            identifier,
        })
    }

    fn parse_reference(&mut self) -> Result<Reference> {
        let xml = self.meta();
        let href = self.attribute(ATTR_HREF);
        let content = non_empty(self.cursor.read_element_text()?);
        Ok(Reference { xml, href, content })
    }

    fn parse_metadata(&mut self, item: &CatalogEntry) -> Result<Metadata> {
        let modification_date =
            self.attribute(ATTR_MODIFICATION_DATE)
                .ok_or_else(|| Error::MetadataIncomplete {
                    name: item.name().map(CpeName::to_uri),
                })?;
        Ok(Metadata {
            xml: self.meta(),
            modification_date,
            status: self.attribute(ATTR_STATUS),
            nvd_id: self.attribute(ATTR_NVD_ID),
            deprecated_by_nvd_id: self.attribute(ATTR_DEP_BY_NVD_ID),
        })
    }

    /// Parses one vendor subtree with an explicit stack of open nodes.
    ///
    /// A node opens only directly under the node kind that owns it, and is
    /// attached to that parent when its end token is reached.
    fn parse_vendor(&mut self) -> Result<Vendor> {
        let vendor = Vendor::with_meta(self.meta(), self.attribute(ATTR_VALUE));
        let mut stack: Vec<(OpenNode, usize)> =
            vec![(OpenNode::Vendor(vendor), self.cursor.current_depth())];

        while !self.cursor.advance_to_next_token()?.is_eof() {
            let depth = self.cursor.current_depth();
            match self.cursor.current_kind() {
                Some(TokenKind::End) => {
                    let closes_top = matches!(stack.last(), Some((_, open)) if *open == depth);
                    if !closes_top {
                        continue;
                    }
                    if let Some((node, _)) = stack.pop() {
                        match stack.last_mut() {
                            Some((parent, _)) => parent.attach(node),
                            None => {
                                if let OpenNode::Vendor(vendor) = node {
                                    return Ok(vendor);
                                }
                            }
                        }
                    }
                }
                Some(TokenKind::Start) => {
                    let local = self.cursor.current_local_name();
                    let top = match stack.last_mut() {
                        Some((top, _)) => top,
                        None => break,
                    };

                    if local == TAG_TITLE {
                        if let OpenNode::Vendor(vendor) = top {
                            let title = self.parse_title()?;
                            vendor.add_title(title);
                        } else {
                            self.report(
                                DiagnosticKind::MisplacedElement,
                                "title outside of vendor",
                            );
                            self.cursor.skip_element()?;
                        }
                    } else if !OpenNode::is_tree_tag(local) {
                        self.report(
                            DiagnosticKind::UnknownElement,
                            "unknown XML element in component tree",
                        );
                        self.cursor.skip_element()?;
                    } else if top.child_tag() == Some(local) {
                        let node = self.open_node()?;
                        stack.push((node, depth));
                    } else {
                        let message = format!(
                            "<{}> cannot appear inside <{}>",
                            local,
                            top.tag()
                        );
                        self.report(DiagnosticKind::MisplacedElement, message);
                        self.cursor.skip_element()?;
                    }
                }
                _ => {}
            }
        }

        Err(Error::FormatInvalid(
            "document ended inside a vendor element".to_string(),
        ))
    }

    /// Builds the tree node for the current start token.
    fn open_node(&self) -> Result<OpenNode> {
        let xml = self.meta();
        let value = self.attribute(ATTR_VALUE);
        Ok(match self.cursor.current_local_name() {
            TAG_PRODUCT => {
                let part = match self.cursor.get_attribute(ATTR_PART) {
                    Some(code) => Part::from_code(code)
                        .ok_or_else(|| Error::UnrecognizedPartCode(code.to_string()))?,
                    None => Part::Unspecified,
                };
                OpenNode::Product(Product::with_meta(xml, value, part))
            }
            TAG_VERSION => OpenNode::Version(Version::with_meta(xml, value)),
            TAG_UPDATE => OpenNode::Update(Update::with_meta(xml, value)),
            TAG_EDITION => OpenNode::Edition(Edition::with_meta(xml, value)),
            _ => OpenNode::Language(Language { xml, value }),
        })
    }

    /// Moves to the next token inside the element opened at `depth`.
    ///
    /// Returns `None` once that element's end token is reached.
    fn next_child(&mut self, depth: usize) -> Result<Option<TokenKind>> {
        if self.cursor.advance_to_next_token()?.is_eof() || self.cursor.is_closing(depth) {
            return Ok(None);
        }
        Ok(self.cursor.current_kind())
    }

    fn meta(&self) -> XmlMeta {
        XmlMeta::new(
            self.cursor.current_namespace_prefix(),
            self.cursor.current_locale_tag(),
        )
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.cursor.get_attribute(name).map(str::to_string)
    }

    fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let element = self.cursor.current_qualified_name();
        let position = self.cursor.position();
        self.diagnostics.record(kind, element, position, message);
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// A component tree node whose end token has not been reached yet.
enum OpenNode {
    Vendor(Vendor),
    Product(Product),
    Version(Version),
    Update(Update),
    Edition(Edition),
    Language(Language),
}

impl OpenNode {
    fn is_tree_tag(local: &str) -> bool {
        matches!(
            local,
            TAG_PRODUCT | TAG_VERSION | TAG_UPDATE | TAG_EDITION | TAG_LANGUAGE
        )
    }

    fn tag(&self) -> &'static str {
        match self {
            OpenNode::Vendor(_) => TAG_VENDOR,
            OpenNode::Product(_) => TAG_PRODUCT,
            OpenNode::Version(_) => TAG_VERSION,
            OpenNode::Update(_) => TAG_UPDATE,
            OpenNode::Edition(_) => TAG_EDITION,
            OpenNode::Language(_) => TAG_LANGUAGE,
        }
    }

    /// Local name of the node kind this node owns.
    fn child_tag(&self) -> Option<&'static str> {
        match self {
            OpenNode::Vendor(_) => Some(TAG_PRODUCT),
            OpenNode::Product(_) => Some(TAG_VERSION),
            OpenNode::Version(_) => Some(TAG_UPDATE),
            OpenNode::Update(_) => Some(TAG_EDITION),
            OpenNode::Edition(_) => Some(TAG_LANGUAGE),
            OpenNode::Language(_) => None,
        }
    }

    fn attach(&mut self, child: OpenNode) {
        match (self, child) {
            (OpenNode::Vendor(parent), OpenNode::Product(child)) => parent.add_product(child),
            (OpenNode::Product(parent), OpenNode::Version(child)) => parent.add_version(child),
            (OpenNode::Version(parent), OpenNode::Update(child)) => parent.add_update(child),
            (OpenNode::Update(parent), OpenNode::Edition(child)) => parent.add_edition(child),
            (OpenNode::Edition(parent), OpenNode::Language(child)) => parent.add_language(child),
            // Only the kind named by child_tag() is ever pushed above a node.
            _ => {}
        }
    }
}
