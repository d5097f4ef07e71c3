//! Writes a [`Dictionary`] back to its XML form.
//!
//! The walk mirrors the parser: root and namespace declarations, generator,
//! catalog entries, then the component tree. Absent optional fields are left
//! out rather than written empty.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::writer::{ExportOptions, XmlWriter};
use crate::constants::*;
use crate::error::Result;
use crate::model::{
    CatalogEntry, Check, Dictionary, Edition, Generator, Language, Metadata, Product, Reference,
    Title, Update, Vendor, Version, XmlMeta,
};

/// Writes the dictionary as a complete XML document.
pub fn serialize<W: Write>(dict: &Dictionary, writer: W, options: &ExportOptions) -> Result<()> {
    let mut out = XmlWriter::new(writer, options);
    out.start_document()?;
    write_dictionary(&mut out, dict)?;
    out.end_document()?;
    Ok(())
}

/// Writes the dictionary to a string.
pub fn to_string(dict: &Dictionary, options: &ExportOptions) -> Result<String> {
    let mut output = Vec::new();
    serialize(dict, &mut output, options)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}

/// Writes the dictionary to a file, replacing it if it exists.
pub fn export_file<P: AsRef<Path>>(
    dict: &Dictionary,
    path: P,
    options: &ExportOptions,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    serialize(dict, BufWriter::new(file), options)?;
    tracing::info!(
        "exported {} items and {} vendors to {}",
        dict.items().len(),
        dict.vendors().len(),
        path.display()
    );
    Ok(())
}

fn qname(xml: &XmlMeta, local: &str) -> String {
    match &xml.prefix {
        Some(prefix) => format!("{}:{}", prefix, local),
        None => local.to_string(),
    }
}

fn write_dictionary<W: Write>(out: &mut XmlWriter<W>, dict: &Dictionary) -> std::io::Result<()> {
    let root = qname(&dict.xml, TAG_CPE_LIST);
    let attrs: Vec<(&str, &str)> = dict
        .xmlns()
        .iter()
        .filter_map(|decl| decl.uri.as_deref().map(|uri| (decl.name.as_str(), uri)))
        .collect();
    out.start_root(&root, &attrs, dict.xml.lang.as_deref())?;

    if let Some(generator) = dict.generator() {
        write_generator(out, generator)?;
    }

    for item in dict.items() {
        write_item(out, item)?;
    }

    if !dict.vendors().is_empty() {
        let tree = qname(&dict.component_tree, TAG_COMPONENT_TREE);
        out.start_element(&tree, &[], dict.component_tree.lang.as_deref())?;
        for vendor in dict.vendors() {
            write_vendor(out, vendor)?;
        }
        out.end_element(&tree)?;
    }

    out.end_element(&root)
}

fn write_generator<W: Write>(out: &mut XmlWriter<W>, generator: &Generator) -> std::io::Result<()> {
    let name = qname(&generator.xml, TAG_GENERATOR);
    out.start_element(&name, &[], generator.xml.lang.as_deref())?;

    let fields = [
        (TAG_PRODUCT_NAME, &generator.product_name),
        (TAG_PRODUCT_VERSION, &generator.product_version),
        (TAG_SCHEMA_VERSION, &generator.schema_version),
        (TAG_TIMESTAMP, &generator.timestamp),
    ];
    for (tag, value) in fields {
        if let Some(value) = value {
            out.text_element(&qname(&generator.xml, tag), value)?;
        }
    }

    out.end_element(&name)
}

fn write_item<W: Write>(out: &mut XmlWriter<W>, item: &CatalogEntry) -> std::io::Result<()> {
    let name = qname(&item.xml, TAG_CPE_ITEM);

    let uri = item.name().map(|n| n.to_uri());
    let successor = item.deprecated_by().map(|n| n.to_uri());
    let mut attrs: Vec<(&str, &str)> = Vec::new();
    if let Some(uri) = &uri {
        attrs.push((ATTR_NAME, uri));
    }
    if let (Some(deprecation), Some(successor)) = (item.deprecation(), &successor) {
        attrs.push((ATTR_DEPRECATED, VAL_TRUE));
        attrs.push((ATTR_DEPRECATION_DATE, &deprecation.date));
        attrs.push((ATTR_DEPRECATED_BY, successor));
    }
    out.start_element(&name, &attrs, item.xml.lang.as_deref())?;

    for title in item.titles() {
        write_title(out, title, TAG_TITLE)?;
    }

    if let Some(metadata) = item.metadata() {
        write_metadata(out, metadata)?;
    }

    if !item.references().is_empty() {
        let wrapper = qname(&item.xml, TAG_REFERENCES);
        out.start_element(&wrapper, &[], item.xml.lang.as_deref())?;
        for reference in item.references() {
            write_reference(out, reference)?;
        }
        out.end_element(&wrapper)?;
    }

    if !item.notes().is_empty() {
        let wrapper = qname(&item.xml, TAG_NOTES);
        out.start_element(&wrapper, &[], item.xml.lang.as_deref())?;
        for note in item.notes() {
            write_title(out, note, TAG_NOTE)?;
        }
        out.end_element(&wrapper)?;
    }

    for check in item.checks() {
        write_check(out, check)?;
    }

    out.end_element(&name)
}

fn write_title<W: Write>(out: &mut XmlWriter<W>, title: &Title, tag: &str) -> std::io::Result<()> {
    let name = qname(&title.xml, tag);
    out.start_element(&name, &[], title.lang())?;
    out.text(&title.content)?;
    out.end_element(&name)
}

fn write_metadata<W: Write>(out: &mut XmlWriter<W>, metadata: &Metadata) -> std::io::Result<()> {
    let name = qname(&metadata.xml, TAG_ITEM_METADATA);
    let mut attrs: Vec<(&str, &str)> =
        vec![(ATTR_MODIFICATION_DATE, metadata.modification_date.as_str())];
    if let Some(status) = &metadata.status {
        attrs.push((ATTR_STATUS, status));
    }
    if let Some(nvd_id) = &metadata.nvd_id {
        attrs.push((ATTR_NVD_ID, nvd_id));
    }
    if let Some(id) = &metadata.deprecated_by_nvd_id {
        attrs.push((ATTR_DEP_BY_NVD_ID, id));
    }
    out.start_element(&name, &attrs, metadata.xml.lang.as_deref())?;
    out.end_element(&name)
}

fn write_reference<W: Write>(out: &mut XmlWriter<W>, reference: &Reference) -> std::io::Result<()> {
    let name = qname(&reference.xml, TAG_REFERENCE);
    let mut attrs: Vec<(&str, &str)> = Vec::new();
    if let Some(href) = &reference.href {
        attrs.push((ATTR_HREF, href));
    }
    out.start_element(&name, &attrs, reference.xml.lang.as_deref())?;
    if let Some(content) = &reference.content {
        out.text(content)?;
    }
    out.end_element(&name)
}

fn write_check<W: Write>(out: &mut XmlWriter<W>, check: &Check) -> std::io::Result<()> {
    let name = qname(&check.xml, TAG_CHECK);
    let mut attrs: Vec<(&str, &str)> = vec![(ATTR_SYSTEM, check.system.as_str())];
    if let Some(href) = &check.href {
        attrs.push((ATTR_HREF, href));
    }
    out.start_element(&name, &attrs, check.xml.lang.as_deref())?;
    if let Some(identifier) = &check.identifier {
        out.text(identifier)?;
    }
    out.end_element(&name)
}

/// Attributes shared by every component tree node.
fn value_attrs(value: &Option<String>) -> Vec<(&str, &str)> {
    value
        .as_deref()
        .map(|v| vec![(ATTR_VALUE, v)])
        .unwrap_or_default()
}

fn write_vendor<W: Write>(out: &mut XmlWriter<W>, vendor: &Vendor) -> std::io::Result<()> {
    let name = qname(&vendor.xml, TAG_VENDOR);
    out.start_element(&name, &value_attrs(&vendor.value), vendor.xml.lang.as_deref())?;
    for title in vendor.titles() {
        write_title(out, title, TAG_TITLE)?;
    }
    for product in vendor.products() {
        write_product(out, product)?;
    }
    out.end_element(&name)
}

fn write_product<W: Write>(out: &mut XmlWriter<W>, product: &Product) -> std::io::Result<()> {
    let name = qname(&product.xml, TAG_PRODUCT);
    let mut attrs = value_attrs(&product.value);
    if let Some(code) = product.part.code() {
        attrs.push((ATTR_PART, code));
    }
    out.start_element(&name, &attrs, product.xml.lang.as_deref())?;
    for version in product.versions() {
        write_version(out, version)?;
    }
    out.end_element(&name)
}

fn write_version<W: Write>(out: &mut XmlWriter<W>, version: &Version) -> std::io::Result<()> {
    let name = qname(&version.xml, TAG_VERSION);
    out.start_element(&name, &value_attrs(&version.value), version.xml.lang.as_deref())?;
    for update in version.updates() {
        write_update(out, update)?;
    }
    out.end_element(&name)
}

fn write_update<W: Write>(out: &mut XmlWriter<W>, update: &Update) -> std::io::Result<()> {
    let name = qname(&update.xml, TAG_UPDATE);
    out.start_element(&name, &value_attrs(&update.value), update.xml.lang.as_deref())?;
    for edition in update.editions() {
        write_edition(out, edition)?;
    }
    out.end_element(&name)
}

fn write_edition<W: Write>(out: &mut XmlWriter<W>, edition: &Edition) -> std::io::Result<()> {
    let name = qname(&edition.xml, TAG_EDITION);
    out.start_element(&name, &value_attrs(&edition.value), edition.xml.lang.as_deref())?;
    for language in edition.languages() {
        write_language(out, language)?;
    }
    out.end_element(&name)
}

fn write_language<W: Write>(out: &mut XmlWriter<W>, language: &Language) -> std::io::Result<()> {
    let name = qname(&language.xml, TAG_LANGUAGE);
    out.start_element(&name, &value_attrs(&language.value), language.xml.lang.as_deref())?;
    out.end_element(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Deprecation, NamespaceDecl, Part};
    use crate::name::CpeName;

    fn compact(dict: &Dictionary) -> String {
        to_string(dict, &ExportOptions::compact()).unwrap()
    }

    #[test]
    fn test_empty_dictionary() {
        let dict = Dictionary::new();
        assert_eq!(
            compact(&dict),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><cpe-list />\n"
        );
    }

    #[test]
    fn test_namespace_without_value_is_skipped() {
        let mut dict = Dictionary::new();
        dict.add_xmlns(NamespaceDecl::new("xmlns", "http://cpe.mitre.org/dictionary/2.0"));
        dict.add_xmlns(NamespaceDecl {
            name: "xmlns:dangling".to_string(),
            uri: None,
        });
        let out = compact(&dict);
        assert!(out.contains("<cpe-list xmlns=\"http://cpe.mitre.org/dictionary/2.0\" />"));
        assert!(!out.contains("dangling"));
    }

    #[test]
    fn test_generator_omits_absent_fields() {
        let mut dict = Dictionary::new();
        dict.set_generator(Some(Generator {
            product_name: Some("Tool".to_string()),
            timestamp: Some("2009-01-01".to_string()),
            ..Default::default()
        }));
        let out = compact(&dict);
        assert!(out.contains(
            "<generator><product_name>Tool</product_name><timestamp>2009-01-01</timestamp></generator>"
        ));
        assert!(!out.contains("product_version"));
        assert!(!out.contains("schema_version"));
    }

    #[test]
    fn test_item_element_order() {
        let mut item = CatalogEntry::new(Some(CpeName::parse("cpe:/a:x:y:1").unwrap()));
        item.set_deprecation(Deprecation {
            by: CpeName::parse("cpe:/a:x:y:2").unwrap(),
            date: "2011-01-01".to_string(),
        });
        item.add_check(Check::new("urn:oval"));
        item.add_note(Title::new(None, "note"));
        item.add_reference(Reference {
            href: Some("http://r".to_string()),
            ..Default::default()
        });
        item.set_metadata(Some(Metadata::new("2010-01-01")));
        item.add_title(Title::new(Some("en-US"), "X Y"));

        let mut dict = Dictionary::new();
        dict.add_item(item);
        let out = compact(&dict);

        assert!(out.contains(
            "<cpe-item name=\"cpe:/a:x:y:1\" deprecated=\"true\" deprecation_date=\"2011-01-01\" deprecated_by=\"cpe:/a:x:y:2\">"
        ));
        let title = out.find("<title").unwrap();
        let metadata = out.find("<item-metadata").unwrap();
        let references = out.find("<references>").unwrap();
        let notes = out.find("<notes>").unwrap();
        let check = out.find("<check").unwrap();
        assert!(title < metadata && metadata < references && references < notes && notes < check);
        assert!(out.contains("<title xml:lang=\"en-US\">X Y</title>"));
        assert!(out.contains("<reference href=\"http://r\" />"));
        assert!(out.contains("<check system=\"urn:oval\" />"));
    }

    #[test]
    fn test_title_without_locale_under_localized_item() {
        let mut item = CatalogEntry::new(Some(CpeName::parse("cpe:/a:x").unwrap()));
        item.xml.lang = Some("en-US".to_string());
        item.add_title(Title::new(Some("en-US"), "Inherited"));
        item.add_title(Title::new(None, "Unmarked"));

        let mut dict = Dictionary::new();
        dict.add_item(item);
        let out = compact(&dict);
        assert!(out.contains(
            "<cpe-item name=\"cpe:/a:x\" xml:lang=\"en-US\"><title>Inherited</title><title xml:lang=\"\">Unmarked</title></cpe-item>"
        ));

        let reparsed = crate::xml::parse_str(&out).unwrap().dictionary;
        assert_eq!(reparsed, dict);
    }

    #[test]
    fn test_empty_wrappers_are_omitted() {
        let mut dict = Dictionary::new();
        dict.add_item(CatalogEntry::new(Some(CpeName::parse("cpe:/a:x").unwrap())));
        let out = compact(&dict);
        assert!(!out.contains("references"));
        assert!(!out.contains("notes"));
        assert!(!out.contains("component-tree"));
    }

    #[test]
    fn test_component_tree() {
        let mut product = Product::new("p", Part::Hardware);
        product.add_version(Version::new("1"));
        let mut unspecified = Product::new("q", Part::Unspecified);
        unspecified.xml = XmlMeta::with_prefix("meta");
        let mut vendor = Vendor::new("v");
        vendor.xml = XmlMeta::with_prefix("meta");
        product.xml = XmlMeta::with_prefix("meta");
        vendor.add_product(product);
        vendor.add_product(unspecified);

        let mut dict = Dictionary::new();
        dict.add_vendor(vendor);
        let out = compact(&dict);
        assert!(out.contains(
            "<meta:component-tree><meta:vendor value=\"v\"><meta:product value=\"p\" part=\"h\"><version value=\"1\" /></meta:product><meta:product value=\"q\" /></meta:vendor></meta:component-tree>"
        ));
    }
}
