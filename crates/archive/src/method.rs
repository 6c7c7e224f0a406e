use crate::Method;
use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use zip::CompressionMethod;

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for Method {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stored" | "store" | "none" => Ok(Method::Stored),
            "deflated" | "deflate" => Ok(Method::Deflated),
            _ => exn::bail!(ErrorKind::UnsupportedMethod(s.to_string())),
        }
    }
}

impl From<Method> for CompressionMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Stored => CompressionMethod::Stored,
            Method::Deflated => CompressionMethod::Deflated,
        }
    }
}

impl Method {
    /// Returns the short name for configuration (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Stored => "stored",
            Method::Deflated => "deflated",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Method;
    use rstest::rstest;
    use zip::CompressionMethod;

    #[rstest]
    #[case("stored", Method::Stored)]
    #[case("STORE", Method::Stored)]
    #[case("none", Method::Stored)]
    #[case("deflate", Method::Deflated)]
    #[case("Deflated", Method::Deflated)]
    fn test_from_str(#[case] test: &str, #[case] expected: Method) {
        assert_eq!(test.parse::<Method>().unwrap(), expected);
    }

    #[rstest]
    #[case("bzip2")]
    #[case(" ")]
    fn test_from_str_invalid(#[case] test: &str) {
        assert!(test.parse::<Method>().is_err());
    }

    #[test]
    fn test_into_zip_method() {
        assert_eq!(CompressionMethod::from(Method::Stored), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from(Method::Deflated), CompressionMethod::Deflated);
    }
}
