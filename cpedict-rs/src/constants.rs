//! Element and attribute names of the CPE dictionary vocabulary.
//!
//! Names are matched against local names (prefix stripped) while parsing and
//! written verbatim, with the stored prefix, on export.

/// Document element.
pub const TAG_CPE_LIST: &str = "cpe-list";
pub const TAG_GENERATOR: &str = "generator";
pub const TAG_PRODUCT_NAME: &str = "product_name";
pub const TAG_PRODUCT_VERSION: &str = "product_version";
pub const TAG_SCHEMA_VERSION: &str = "schema_version";
pub const TAG_TIMESTAMP: &str = "timestamp";

pub const TAG_CPE_ITEM: &str = "cpe-item";
pub const TAG_TITLE: &str = "title";
pub const TAG_NOTES: &str = "notes";
pub const TAG_NOTE: &str = "note";
pub const TAG_REFERENCES: &str = "references";
pub const TAG_REFERENCE: &str = "reference";
pub const TAG_CHECK: &str = "check";
pub const TAG_ITEM_METADATA: &str = "item-metadata";

pub const TAG_COMPONENT_TREE: &str = "component-tree";
pub const TAG_VENDOR: &str = "vendor";
pub const TAG_PRODUCT: &str = "product";
pub const TAG_VERSION: &str = "version";
pub const TAG_UPDATE: &str = "update";
pub const TAG_EDITION: &str = "edition";
pub const TAG_LANGUAGE: &str = "language";

pub const ATTR_NAME: &str = "name";
pub const ATTR_DEPRECATED: &str = "deprecated";
pub const ATTR_DEPRECATED_BY: &str = "deprecated_by";
pub const ATTR_DEPRECATION_DATE: &str = "deprecation_date";
pub const ATTR_MODIFICATION_DATE: &str = "modification-date";
pub const ATTR_STATUS: &str = "status";
pub const ATTR_NVD_ID: &str = "nvd-id";
pub const ATTR_DEP_BY_NVD_ID: &str = "deprecated-by-nvd-id";
pub const ATTR_SYSTEM: &str = "system";
pub const ATTR_HREF: &str = "href";
pub const ATTR_VALUE: &str = "value";
pub const ATTR_PART: &str = "part";
pub const ATTR_XML_LANG: &str = "xml:lang";

/// Value written for the `deprecated` flag.
pub const VAL_TRUE: &str = "true";

/// Prefix used for the component tree when the source never supplied one.
pub const NS_META: &str = "meta";

/// Encoding declared when the requested one is unsupported.
pub const DEFAULT_ENCODING: &str = "UTF-8";
