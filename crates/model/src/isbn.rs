use crate::consts::ISBN_REGEX;
use crate::error::{Error, ErrorKind, Result};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Number of characters in an ISBN-13 title key.
pub const ISBN_LENGTH: usize = 13;

/// Returns `true` if `s` is exactly a 13-digit ISBN starting with `978` or
/// `979`. No checksum validation is performed.
///
/// ```
/// use bestpub_model::is_isbn;
/// assert!(is_isbn("9780203807217"));
/// assert!(!is_isbn("9770203807217"));
/// assert!(!is_isbn(" 9780203807217"));
/// ```
#[must_use]
pub fn is_isbn(s: &str) -> bool {
    ISBN_REGEX.is_match(s)
}

/// The title key: the sole identity of a title across ingestion and
/// publishing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Isbn(String);

impl Isbn {
    /// Takes the first 13 characters of the trimmed filename and validates
    /// them. The rest of the string is never searched, so a filename that
    /// does not *start* with its ISBN is rejected.
    ///
    /// ```
    /// use bestpub_model::Isbn;
    /// let isbn = Isbn::extract("9780203807217-Chapter-001.xhtml").unwrap();
    /// assert_eq!(isbn.as_str(), "9780203807217");
    /// assert!(Isbn::extract("chapter-9780203807217.xhtml").is_err());
    /// ```
    pub fn extract(filename: &str) -> Result<Self> {
        let trimmed = filename.trim();
        match trimmed.get(..ISBN_LENGTH) {
            Some(candidate) => candidate.parse(),
            None => exn::bail!(ErrorKind::InvalidTitleKey(trimmed.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Isbn {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if !is_isbn(s) {
            exn::bail!(ErrorKind::InvalidTitleKey(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}
impl TryFrom<String> for Isbn {
    type Error = Error;
    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        if !is_isbn(&value) {
            exn::bail!(ErrorKind::InvalidTitleKey(value));
        }
        Ok(Self(value))
    }
}
impl From<Isbn> for String {
    fn from(isbn: Isbn) -> Self {
        isbn.0
    }
}
impl AsRef<str> for Isbn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Display for Isbn {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
