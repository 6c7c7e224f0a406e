use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// A published artifact version.
///
/// Only whole-number major versions exist; the minor component is always
/// rendered as `.0` and ignored when parsing stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
}
impl Version {
    /// Version produced by the very first publish of a title.
    pub const FIRST: Version = Version { major: 1 };

    pub fn new(major: u32) -> Self {
        Self { major }
    }

    /// The version that follows `previous`, or [`FIRST`](Self::FIRST) when
    /// nothing has been published yet.
    ///
    /// ```
    /// use bestpub_model::models::Version;
    /// assert_eq!(Version::next_after(None).to_string(), "1.0");
    /// let prior: Version = "10.3".parse().unwrap();
    /// assert_eq!(Version::next_after(Some(prior)).to_string(), "11.0");
    /// ```
    #[must_use]
    pub fn next_after(previous: Option<Version>) -> Version {
        match previous {
            Some(previous) => Version::new(previous.major.saturating_add(1)),
            None => Version::FIRST,
        }
    }
}
impl FromStr for Version {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let major = match trimmed.split_once('.') {
            Some((major, _minor)) => major,
            None => trimmed,
        };
        match major.parse::<u32>() {
            Ok(major) => Ok(Version::new(major)),
            Err(_) => exn::bail!(ErrorKind::InvalidVersion(s.to_string())),
        }
    }
}
impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.0", self.major)
    }
}
#[cfg(feature = "serde")]
impl serde::Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
