//! Catalog entries (`<cpe-item>`) and their children.

use super::XmlMeta;
use crate::name::CpeName;

/// A localized text: `<title>` or `<note>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Title {
    pub xml: XmlMeta,
    pub content: String,
}

impl Title {
    pub fn new(lang: Option<&str>, content: impl Into<String>) -> Self {
        Title {
            xml: XmlMeta::new(None, lang),
            content: content.into(),
        }
    }

    pub fn lang(&self) -> Option<&str> {
        self.xml.lang.as_deref()
    }
}

/// Successor name and date of a deprecated entry.
///
/// Both halves live in one value, so an entry is either fully deprecated or
/// not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
    pub by: CpeName,
    pub date: String,
}

/// The `<meta:item-metadata>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub xml: XmlMeta,
    pub modification_date: String,
    pub status: Option<String>,
    pub nvd_id: Option<String>,
    pub deprecated_by_nvd_id: Option<String>,
}

impl Metadata {
    pub fn new(modification_date: impl Into<String>) -> Self {
        Metadata {
            xml: XmlMeta::default(),
            modification_date: modification_date.into(),
            status: None,
            nvd_id: None,
            deprecated_by_nvd_id: None,
        }
    }
}

/// A `<check>` pointing at an external checking system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub xml: XmlMeta,
    /// Checking system URI.
    pub system: String,
    /// External file holding the check.
    pub href: Option<String>,
    /// Test identifier inside the external file.
    pub identifier: Option<String>,
}

impl Check {
    pub fn new(system: impl Into<String>) -> Self {
        Check {
            xml: XmlMeta::default(),
            system: system.into(),
            href: None,
            identifier: None,
        }
    }
}

/// A `<reference>` link with optional description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
    pub xml: XmlMeta,
    pub href: Option<String>,
    pub content: Option<String>,
}

/// One `<cpe-item>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    pub xml: XmlMeta,
    name: Option<CpeName>,
    deprecation: Option<Deprecation>,
    titles: Vec<Title>,
    notes: Vec<Title>,
    checks: Vec<Check>,
    references: Vec<Reference>,
    metadata: Option<Metadata>,
}

impl CatalogEntry {
    pub fn new(name: Option<CpeName>) -> Self {
        CatalogEntry {
            name,
            ..Default::default()
        }
    }

    pub fn name(&self) -> Option<&CpeName> {
        self.name.as_ref()
    }

    pub fn set_name(&mut self, name: Option<CpeName>) {
        self.name = name;
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation.is_some()
    }

    pub fn deprecation(&self) -> Option<&Deprecation> {
        self.deprecation.as_ref()
    }

    /// Name of the entry that supersedes this one.
    pub fn deprecated_by(&self) -> Option<&CpeName> {
        self.deprecation.as_ref().map(|d| &d.by)
    }

    pub fn deprecation_date(&self) -> Option<&str> {
        self.deprecation.as_ref().map(|d| d.date.as_str())
    }

    pub fn set_deprecation(&mut self, deprecation: Deprecation) {
        self.deprecation = Some(deprecation);
    }

    pub fn clear_deprecation(&mut self) {
        self.deprecation = None;
    }

    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    pub fn add_title(&mut self, title: Title) {
        self.titles.push(title);
    }

    /// Notes share the title shape but live in their own list.
    pub fn notes(&self) -> &[Title] {
        &self.notes
    }

    pub fn add_note(&mut self, note: Title) {
        self.notes.push(note);
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn add_check(&mut self, check: Check) {
        self.checks.push(check);
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn add_reference(&mut self, reference: Reference) {
        self.references.push(reference);
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn set_metadata(&mut self, metadata: Option<Metadata>) {
        self.metadata = metadata;
    }

    /// Returns the first title in `lang`, falling back to the first title.
    pub fn title_for(&self, lang: &str) -> Option<&Title> {
        self.titles
            .iter()
            .find(|t| t.lang().is_some_and(|l| l.eq_ignore_ascii_case(lang)))
            .or_else(|| self.titles.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deprecation_pair() {
        let mut entry = CatalogEntry::new(Some(CpeName::parse("cpe:/a:x:y:1").unwrap()));
        assert!(!entry.is_deprecated());
        assert!(entry.deprecated_by().is_none());
        assert!(entry.deprecation_date().is_none());

        entry.set_deprecation(Deprecation {
            by: CpeName::parse("cpe:/a:x:y:2").unwrap(),
            date: "2010-03-04".to_string(),
        });
        assert!(entry.is_deprecated());
        assert_eq!(entry.deprecated_by().unwrap().version(), Some("2"));
        assert_eq!(entry.deprecation_date(), Some("2010-03-04"));

        entry.clear_deprecation();
        assert!(entry.deprecated_by().is_none());
        assert!(entry.deprecation_date().is_none());
    }

    #[test]
    fn test_notes_separate_from_titles() {
        let mut entry = CatalogEntry::default();
        entry.add_title(Title::new(Some("en-US"), "Title"));
        entry.add_note(Title::new(Some("en-US"), "Note"));

        assert_eq!(entry.titles().len(), 1);
        assert_eq!(entry.notes().len(), 1);
        assert_eq!(entry.notes()[0].content, "Note");
    }

    #[test]
    fn test_title_for_lang() {
        let mut entry = CatalogEntry::default();
        entry.add_title(Title::new(Some("en-US"), "Hello"));
        entry.add_title(Title::new(Some("de-DE"), "Hallo"));

        assert_eq!(entry.title_for("de-de").unwrap().content, "Hallo");
        assert_eq!(entry.title_for("fr-FR").unwrap().content, "Hello");
    }
}
