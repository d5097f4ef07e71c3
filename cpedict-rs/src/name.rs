//! CPE 2.2 platform names (`cpe:/part:vendor:product:...`).
//!
//! The dictionary treats names as atomic values: they are parsed once when an
//! entry is read and formatted back verbatim when it is written. Components
//! are stored exactly as they appear in the URI, without percent-decoding.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::Part;

const SCHEME: &str = "cpe:/";
const COMPONENT_COUNT: usize = 7;

/// A parsed CPE URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CpeName {
    /// part, vendor, product, version, update, edition, language
    components: [Option<String>; COMPONENT_COUNT],
}

impl CpeName {
    /// Parses a CPE URI.
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        let body = match uri.get(..SCHEME.len()) {
            Some(scheme) if scheme.eq_ignore_ascii_case(SCHEME) => &uri[SCHEME.len()..],
            _ => return Err(Error::InvalidName(uri.to_string())),
        };

        let fields: Vec<&str> = body.split(':').collect();
        if fields.len() > COMPONENT_COUNT {
            return Err(Error::InvalidName(uri.to_string()));
        }

        let mut components: [Option<String>; COMPONENT_COUNT] = Default::default();
        for (slot, field) in components.iter_mut().zip(fields) {
            if field.chars().any(|c| c.is_whitespace() || c == '/') {
                return Err(Error::InvalidName(uri.to_string()));
            }
            if !field.is_empty() {
                *slot = Some(field.to_string());
            }
        }

        if let Some(code) = &components[0] {
            if Part::from_code(code).is_none() {
                return Err(Error::InvalidName(uri.to_string()));
            }
        }

        Ok(CpeName { components })
    }

    /// Formats the name as a URI, dropping trailing empty components.
    ///
    /// The output is normalized: the scheme is always lowercase `cpe:/`, so
    /// `CPE:/a:x:y:` formats as `cpe:/a:x:y`. Components are kept verbatim.
    pub fn to_uri(&self) -> String {
        let last = self
            .components
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |i| i + 1);
        let joined: Vec<&str> = self.components[..last]
            .iter()
            .map(|c| c.as_deref().unwrap_or(""))
            .collect();
        format!("{}{}", SCHEME, joined.join(":"))
    }

    /// Returns the part classification (`Unspecified` when the component is empty).
    pub fn part(&self) -> Part {
        self.components[0]
            .as_deref()
            .and_then(Part::from_code)
            .unwrap_or(Part::Unspecified)
    }

    pub fn vendor(&self) -> Option<&str> {
        self.components[1].as_deref()
    }

    pub fn product(&self) -> Option<&str> {
        self.components[2].as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.components[3].as_deref()
    }

    pub fn update(&self) -> Option<&str> {
        self.components[4].as_deref()
    }

    pub fn edition(&self) -> Option<&str> {
        self.components[5].as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.components[6].as_deref()
    }
}

impl FromStr for CpeName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CpeName::parse(s)
    }
}

impl fmt::Display for CpeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_components() {
        let name = CpeName::parse("cpe:/a:vendor:product:1.0").unwrap();
        assert_eq!(name.part(), Part::Application);
        assert_eq!(name.vendor(), Some("vendor"));
        assert_eq!(name.product(), Some("product"));
        assert_eq!(name.version(), Some("1.0"));
        assert_eq!(name.update(), None);
        assert_eq!(name.language(), None);
    }

    #[test]
    fn test_format_is_verbatim() {
        for uri in [
            "cpe:/a:vendor:product:1.0",
            "cpe:/o:microsoft:windows_xp::sp2:pro:en-us",
            "cpe:/h:cisco",
            "cpe:/a:%240.99_kindle_books_project:%240.99_kindle_books:6",
        ] {
            assert_eq!(CpeName::parse(uri).unwrap().to_uri(), uri);
        }
    }

    #[test]
    fn test_trailing_empty_components_dropped() {
        let name = CpeName::parse("cpe:/a:vendor:product::").unwrap();
        assert_eq!(name.to_string(), "cpe:/a:vendor:product");
    }

    #[test]
    fn test_format_normalizes_scheme_and_trailing_colon() {
        let name = CpeName::parse("CPE:/a:Vendor:y:").unwrap();
        assert_eq!(name.to_uri(), "cpe:/a:Vendor:y");
        assert_eq!(CpeName::parse(&name.to_uri()).unwrap(), name);
    }

    #[test]
    fn test_empty_part_is_unspecified() {
        let name = CpeName::parse("cpe:/:vendor").unwrap();
        assert_eq!(name.part(), Part::Unspecified);
        assert_eq!(name.to_uri(), "cpe:/:vendor");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(CpeName::parse("not-a-cpe").is_err());
        assert!(CpeName::parse("cpe:/x:vendor").is_err());
        assert!(CpeName::parse("cpe:/a:b:c:d:e:f:g:h").is_err());
        assert!(CpeName::parse("cpe:/a:two words").is_err());
    }

    #[test]
    fn test_equality_is_component_wise() {
        let a: CpeName = "cpe:/a:vendor:product".parse().unwrap();
        let b: CpeName = "cpe:/a:vendor:product::".parse().unwrap();
        assert_eq!(a, b);
    }
}
