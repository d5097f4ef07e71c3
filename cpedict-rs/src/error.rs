//! Error types for CPE dictionary processing.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for dictionary operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing a dictionary.
///
/// Failures raised inside a single catalog entry or vendor subtree are
/// contained by the parser and turned into diagnostics; only
/// [`Error::SourceUnreadable`], [`Error::FormatInvalid`] and
/// [`Error::RootElementMissing`] ever reach the caller of a parse.
#[derive(Error, Debug)]
pub enum Error {
    /// The named source could not be opened.
    #[error("unable to open {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed or violates the dictionary grammar.
    #[error("invalid dictionary document: {0}")]
    FormatInvalid(String),

    /// End of stream was reached before a `cpe-list` element.
    #[error("there is no \"cpe-list\" element in the provided document")]
    RootElementMissing,

    /// A deprecated entry lacks its successor name or deprecation date.
    #[error("deprecated entry {name:?} must carry both deprecated_by and deprecation_date")]
    DeprecationIncomplete { name: Option<String> },

    /// An `item-metadata` block lacks its modification date.
    #[error("item metadata of {name:?} has no modification-date")]
    MetadataIncomplete { name: Option<String> },

    /// A product `part` attribute is not one of `h`, `o` or `a`.
    #[error("unrecognized part code: {0:?}")]
    UnrecognizedPartCode(String),

    /// A required attribute is missing.
    #[error("element <{element}> requires attribute {attribute:?}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// A platform name could not be parsed.
    #[error("invalid CPE name: {0:?}")]
    InvalidName(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for failures contained to a single entry or vendor.
    ///
    /// The parser drops the affected element and carries on; every other
    /// error ends the parse.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::DeprecationIncomplete { .. }
                | Error::MetadataIncomplete { .. }
                | Error::UnrecognizedPartCode(_)
                | Error::MissingAttribute { .. }
                | Error::InvalidName(_)
        )
    }
}
