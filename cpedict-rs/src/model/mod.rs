//! In-memory model of a CPE dictionary.
//!
//! The model is a strict tree: every node exclusively owns its children and
//! every collection keeps document order, which is also the export order.

mod item;
mod tree;

pub use item::{CatalogEntry, Check, Deprecation, Metadata, Reference, Title};
pub use tree::{Edition, Language, Part, Product, Update, Vendor, Version};

use crate::name::CpeName;

/// Namespace prefix and effective `xml:lang` of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlMeta {
    pub prefix: Option<String>,
    pub lang: Option<String>,
}

impl XmlMeta {
    pub fn new(prefix: Option<&str>, lang: Option<&str>) -> Self {
        XmlMeta {
            prefix: prefix.map(str::to_string),
            lang: lang.map(str::to_string),
        }
    }

    /// Metadata carrying only a namespace prefix.
    pub fn with_prefix(prefix: &str) -> Self {
        XmlMeta {
            prefix: Some(prefix.to_string()),
            lang: None,
        }
    }
}

/// One attribute of the document element, typically a namespace declaration
/// such as `xmlns:meta="..."`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// Qualified attribute name as written, e.g. `xmlns` or `xsi:schemaLocation`.
    pub name: String,
    /// Declarations without a value are skipped on export.
    pub uri: Option<String>,
}

impl NamespaceDecl {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        NamespaceDecl {
            name: name.into(),
            uri: Some(uri.into()),
        }
    }
}

/// The `<generator>` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generator {
    pub xml: XmlMeta,
    pub product_name: Option<String>,
    pub product_version: Option<String>,
    pub schema_version: Option<String>,
    pub timestamp: Option<String>,
}

/// The `<cpe-list>` document root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    pub xml: XmlMeta,
    xmlns: Vec<NamespaceDecl>,
    generator: Option<Generator>,
    items: Vec<CatalogEntry>,
    /// Prefix and locale of the `component-tree` wrapper.
    pub component_tree: XmlMeta,
    vendors: Vec<Vendor>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Dictionary {
            component_tree: XmlMeta::with_prefix(crate::constants::NS_META),
            ..Default::default()
        }
    }

    pub fn xmlns(&self) -> &[NamespaceDecl] {
        &self.xmlns
    }

    pub fn add_xmlns(&mut self, decl: NamespaceDecl) {
        self.xmlns.push(decl);
    }

    pub fn generator(&self) -> Option<&Generator> {
        self.generator.as_ref()
    }

    pub fn generator_mut(&mut self) -> Option<&mut Generator> {
        self.generator.as_mut()
    }

    /// Replaces the generator block.
    pub fn set_generator(&mut self, generator: Option<Generator>) {
        self.generator = generator;
    }

    pub fn items(&self) -> &[CatalogEntry] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<CatalogEntry> {
        &mut self.items
    }

    pub fn add_item(&mut self, item: CatalogEntry) {
        self.items.push(item);
    }

    /// Removes and returns the entry at `index`, if any.
    pub fn remove_item(&mut self, index: usize) -> Option<CatalogEntry> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain_items<F: FnMut(&CatalogEntry) -> bool>(&mut self, keep: F) {
        self.items.retain(keep);
    }

    /// Finds the first entry with the given name.
    pub fn find_item(&self, name: &CpeName) -> Option<&CatalogEntry> {
        self.items.iter().find(|item| item.name() == Some(name))
    }

    /// Iterates over deprecated entries.
    pub fn deprecated_items(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.items.iter().filter(|item| item.is_deprecated())
    }

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    pub fn vendors_mut(&mut self) -> &mut Vec<Vendor> {
        &mut self.vendors
    }

    pub fn add_vendor(&mut self, vendor: Vendor) {
        self.vendors.push(vendor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(uri: &str) -> CatalogEntry {
        CatalogEntry::new(Some(CpeName::parse(uri).unwrap()))
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let mut dict = Dictionary::new();
        dict.add_item(entry("cpe:/a:b:c"));
        dict.add_item(entry("cpe:/a:a:a"));
        dict.add_item(entry("cpe:/o:z:z"));

        let uris: Vec<String> = dict
            .items()
            .iter()
            .map(|i| i.name().unwrap().to_uri())
            .collect();
        assert_eq!(uris, vec!["cpe:/a:b:c", "cpe:/a:a:a", "cpe:/o:z:z"]);
    }

    #[test]
    fn test_find_and_remove_item() {
        let mut dict = Dictionary::new();
        dict.add_item(entry("cpe:/a:b:c"));
        dict.add_item(entry("cpe:/a:d:e"));

        let target = CpeName::parse("cpe:/a:d:e").unwrap();
        assert!(dict.find_item(&target).is_some());

        let removed = dict.remove_item(1).unwrap();
        assert_eq!(removed.name(), Some(&target));
        assert!(dict.find_item(&target).is_none());
        assert!(dict.remove_item(5).is_none());
    }

    #[test]
    fn test_deprecated_items() {
        let mut dict = Dictionary::new();
        let mut old = entry("cpe:/a:b:c:1");
        old.set_deprecation(Deprecation {
            by: CpeName::parse("cpe:/a:b:c:2").unwrap(),
            date: "2009-01-01T00:00:00.000Z".to_string(),
        });
        dict.add_item(old);
        dict.add_item(entry("cpe:/a:b:c:2"));

        let deprecated: Vec<_> = dict.deprecated_items().collect();
        assert_eq!(deprecated.len(), 1);
        assert_eq!(deprecated[0].name().unwrap().version(), Some("1"));
    }

    #[test]
    fn test_new_dictionary_defaults_component_tree_prefix() {
        let dict = Dictionary::new();
        assert_eq!(dict.component_tree.prefix.as_deref(), Some("meta"));
        assert!(dict.generator().is_none());
        assert!(dict.xmlns().is_empty());
    }
}
