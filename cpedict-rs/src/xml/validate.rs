//! Whole-document grammar check run before the streaming parse.
//!
//! The grammar is deliberately lenient: it rejects documents that are not
//! well-formed, whose document element is not `cpe-list`, or that omit an
//! attribute the dictionary format requires. Elements it does not know are
//! allowed through; the parser reports those as diagnostics.

use std::io::BufRead;
use std::path::Path;

use super::cursor::{TokenCursor, TokenKind};
use crate::constants::{
    ATTR_MODIFICATION_DATE, ATTR_NAME, ATTR_SYSTEM, TAG_CHECK, TAG_CPE_ITEM, TAG_CPE_LIST,
    TAG_ITEM_METADATA,
};
use crate::error::{Error, Result};

/// Attributes that must be present on an element, by local name.
const REQUIRED_ATTRIBUTES: &[(&str, &str)] = &[
    (TAG_CPE_ITEM, ATTR_NAME),
    (TAG_CHECK, ATTR_SYSTEM),
    (TAG_ITEM_METADATA, ATTR_MODIFICATION_DATE),
];

/// Validates a document held in memory.
pub fn validate_str(xml: &str) -> Result<()> {
    validate(TokenCursor::from_xml(xml))
}

/// Validates a document stored in a file.
pub fn validate_file<P: AsRef<Path>>(path: P) -> Result<()> {
    validate(TokenCursor::open(path)?)
}

/// Consumes the cursor and checks the whole document against the grammar.
pub fn validate<R: BufRead>(mut cursor: TokenCursor<R>) -> Result<()> {
    let mut roots = 0usize;

    while !cursor.advance_to_next_token()?.is_eof() {
        match cursor.current_kind() {
            Some(TokenKind::Start) => {
                if cursor.current_depth() == 0 {
                    roots += 1;
                    if roots > 1 {
                        return Err(invalid(&cursor, "more than one document element"));
                    }
                    if cursor.current_local_name() != TAG_CPE_LIST {
                        return Err(invalid(
                            &cursor,
                            &format!(
                                "document element is <{}>, expected <{}>",
                                cursor.current_qualified_name(),
                                TAG_CPE_LIST
                            ),
                        ));
                    }
                }
                check_required_attributes(&cursor)?;
            }
            Some(TokenKind::Text) if cursor.current_depth() == 0 => {
                return Err(invalid(&cursor, "text outside the document element"));
            }
            _ => {}
        }
    }

    if roots == 0 {
        return Err(Error::FormatInvalid("document has no elements".to_string()));
    }
    tracing::debug!("document passed grammar check");
    Ok(())
}

fn check_required_attributes<R: BufRead>(cursor: &TokenCursor<R>) -> Result<()> {
    let local = cursor.current_local_name();
    for (element, attribute) in REQUIRED_ATTRIBUTES {
        if *element == local && cursor.get_attribute(attribute).is_none() {
            return Err(invalid(
                cursor,
                &format!("element <{}> requires attribute {:?}", local, attribute),
            ));
        }
    }
    Ok(())
}

fn invalid<R: BufRead>(cursor: &TokenCursor<R>, message: &str) -> Error {
    Error::FormatInvalid(format!("{} (at byte {})", message, cursor.position()))
}
