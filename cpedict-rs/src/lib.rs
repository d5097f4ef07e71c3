//! CPE dictionary reader and writer
//!
//! This library reads Common Platform Enumeration (CPE) dictionary documents
//! into an in-memory model and writes that model back out as XML.
//!
//! # Overview
//!
//! A dictionary is a `cpe-list` document holding an optional generator
//! block, a sequence of catalog entries (`cpe-item`) and an optional
//! component tree that groups names by vendor, product, version, update,
//! edition and language.
//!
//! Parsing is tolerant. The document is first checked against the grammar;
//! after that, a malformed entry or vendor is skipped and reported in
//! [`Parsed::diagnostics`] while the rest of the document still loads.
//!
//! # Example
//!
//! ```
//! use cpe_dict::{parse_str, to_string, ExportOptions};
//!
//! let xml = r#"<cpe-list><cpe-item name="cpe:/a:vendor:product:1.0">
//!     <title>Example</title></cpe-item></cpe-list>"#;
//! let parsed = parse_str(xml).unwrap();
//! assert_eq!(parsed.dictionary.items().len(), 1);
//!
//! let out = to_string(&parsed.dictionary, &ExportOptions::default()).unwrap();
//! assert!(out.contains("<title>Example</title>"));
//! ```

pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod name;
pub mod xml;

// Re-export commonly used types
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{Error, Result};
pub use model::{
    CatalogEntry, Check, Deprecation, Dictionary, Edition, Generator, Language, Metadata,
    NamespaceDecl, Part, Product, Reference, Title, Update, Vendor, Version, XmlMeta,
};
pub use name::CpeName;
pub use xml::{
    export_file, parse_file, parse_reader, parse_str, serialize, to_string, validate_file,
    validate_str, DictionaryParser, ExportOptions, ParseOptions, Parsed, TokenCursor,
};
