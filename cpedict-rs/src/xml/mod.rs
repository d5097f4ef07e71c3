//! XML reading and writing for CPE dictionaries.
//!
//! Reading goes through [`TokenCursor`], a pull cursor over the document
//! that the grammar check and the dictionary parser both drive. Writing
//! goes through [`XmlWriter`], which the serializer walks the model into.

mod cursor;
mod parser;
mod serializer;
mod validate;
mod writer;

pub use cursor::{Advance, TokenCursor, TokenKind};
pub use parser::{
    parse, parse_file, parse_reader, parse_str, DictionaryParser, ParseOptions, Parsed,
};
pub use serializer::{export_file, serialize, to_string};
pub use validate::{validate, validate_file, validate_str};
pub use writer::{Encoding, ExportOptions, XmlWriter};
