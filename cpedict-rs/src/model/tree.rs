//! The component tree: vendor → product → version → update → edition → language.

use super::{Title, XmlMeta};

/// Part classification of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Part {
    Hardware,
    OperatingSystem,
    Application,
    /// No `part` attribute was given.
    #[default]
    Unspecified,
}

impl Part {
    /// Maps `h`, `o` or `a` (any case) to a part.
    pub fn from_code(code: &str) -> Option<Part> {
        if code.eq_ignore_ascii_case("h") {
            Some(Part::Hardware)
        } else if code.eq_ignore_ascii_case("o") {
            Some(Part::OperatingSystem)
        } else if code.eq_ignore_ascii_case("a") {
            Some(Part::Application)
        } else {
            None
        }
    }

    /// Returns the single-letter code, or `None` for `Unspecified`.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Part::Hardware => Some("h"),
            Part::OperatingSystem => Some("o"),
            Part::Application => Some("a"),
            Part::Unspecified => None,
        }
    }
}

/// Leaf of the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Language {
    pub xml: XmlMeta,
    pub value: Option<String>,
}

impl Language {
    pub fn new(value: impl Into<String>) -> Self {
        Language {
            xml: XmlMeta::default(),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edition {
    pub xml: XmlMeta,
    pub value: Option<String>,
    languages: Vec<Language>,
}

impl Edition {
    pub fn new(value: impl Into<String>) -> Self {
        Edition {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Creates a node as read from a document.
    pub fn with_meta(xml: XmlMeta, value: Option<String>) -> Self {
        Edition {
            xml,
            value,
            languages: Vec::new(),
        }
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn add_language(&mut self, language: Language) {
        self.languages.push(language);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Update {
    pub xml: XmlMeta,
    pub value: Option<String>,
    editions: Vec<Edition>,
}

impl Update {
    pub fn new(value: impl Into<String>) -> Self {
        Update {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Creates a node as read from a document.
    pub fn with_meta(xml: XmlMeta, value: Option<String>) -> Self {
        Update {
            xml,
            value,
            editions: Vec::new(),
        }
    }

    pub fn editions(&self) -> &[Edition] {
        &self.editions
    }

    pub fn add_edition(&mut self, edition: Edition) {
        self.editions.push(edition);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
    pub xml: XmlMeta,
    pub value: Option<String>,
    updates: Vec<Update>,
}

impl Version {
    pub fn new(value: impl Into<String>) -> Self {
        Version {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Creates a node as read from a document.
    pub fn with_meta(xml: XmlMeta, value: Option<String>) -> Self {
        Version {
            xml,
            value,
            updates: Vec::new(),
        }
    }

    pub fn updates(&self) -> &[Update] {
        &self.updates
    }

    pub fn add_update(&mut self, update: Update) {
        self.updates.push(update);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Product {
    pub xml: XmlMeta,
    pub value: Option<String>,
    pub part: Part,
    versions: Vec<Version>,
}

impl Product {
    pub fn new(value: impl Into<String>, part: Part) -> Self {
        Product {
            value: Some(value.into()),
            part,
            ..Default::default()
        }
    }

    pub fn with_meta(xml: XmlMeta, value: Option<String>, part: Part) -> Self {
        Product {
            xml,
            value,
            part,
            versions: Vec::new(),
        }
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn add_version(&mut self, version: Version) {
        self.versions.push(version);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vendor {
    pub xml: XmlMeta,
    pub value: Option<String>,
    titles: Vec<Title>,
    products: Vec<Product>,
}

impl Vendor {
    pub fn new(value: impl Into<String>) -> Self {
        Vendor {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn with_meta(xml: XmlMeta, value: Option<String>) -> Self {
        Vendor {
            xml,
            value,
            titles: Vec::new(),
            products: Vec::new(),
        }
    }

    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    pub fn add_title(&mut self, title: Title) {
        self.titles.push(title);
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.push(product);
    }
}
