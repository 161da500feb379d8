//! Cache key types

use std::fmt;

/// File extension used for every cached entry
pub const IMAGE_EXTENSION: &str = "jpg";

/// Identifier of a cached image: a non-empty run of ASCII decimal digits.
///
/// The digits are kept verbatim (`"007"` stays `"007"`) because they are only
/// ever used to build a file name and a remote URL, never compared numerically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageCode(String);

impl ImageCode {
    /// Parse a bare digit string, returning `None` for anything else
    pub fn parse(raw: &str) -> Option<Self> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the file holding this entry, e.g. `404.jpg`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, IMAGE_EXTENSION)
    }
}

impl fmt::Display for ImageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_digits() {
        let code = ImageCode::parse("404").unwrap();
        assert_eq!(code.as_str(), "404");
        assert_eq!(code.to_string(), "404");
    }

    #[test]
    fn test_parse_keeps_leading_zeros_and_large_values() {
        assert_eq!(ImageCode::parse("007").unwrap().as_str(), "007");
        assert!(ImageCode::parse("99999999999999999999999").is_some());
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        for raw in ["", "abc", "2o0", "200/", "-1", "1.5", " 200", "２００"] {
            assert!(ImageCode::parse(raw).is_none(), "accepted {:?}", raw);
        }
    }

    #[test]
    fn test_file_name() {
        let code = ImageCode::parse("418").unwrap();
        assert_eq!(code.file_name(), "418.jpg");
    }
}
