use super::sanitize;
use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Genres the editorial team classifies titles under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genre {
    NonFiction,
    Comedy,
    Drama,
    Fantasy,
    Fiction,
    Horror,
    Mythology,
    Mystery,
    Romance,
    Satire,
    Tragedy,
    Tragicomedy,
}
impl Genre {
    pub const ALL: [Genre; 12] = [
        Genre::NonFiction,
        Genre::Comedy,
        Genre::Drama,
        Genre::Fantasy,
        Genre::Fiction,
        Genre::Horror,
        Genre::Mythology,
        Genre::Mystery,
        Genre::Romance,
        Genre::Satire,
        Genre::Tragedy,
        Genre::Tragicomedy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::NonFiction => "Non-fiction",
            Genre::Comedy => "Comedy",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::Fiction => "Fiction",
            Genre::Horror => "Horror",
            Genre::Mythology => "Mythology",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::Satire => "Satire",
            Genre::Tragedy => "Tragedy",
            Genre::Tragicomedy => "Tragicomedy",
        }
    }
}
impl FromStr for Genre {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sanitized = sanitize(s);
        match Genre::ALL.into_iter().find(|genre| sanitize(genre.as_str()) == sanitized) {
            Some(genre) => Ok(genre),
            None => exn::bail!(ErrorKind::UnknownGenre(s.to_string())),
        }
    }
}
impl Display for Genre {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Non-fiction", Genre::NonFiction)]
    #[case("non fiction", Genre::NonFiction)]
    #[case("MYSTERY", Genre::Mystery)]
    #[case(" tragicomedy ", Genre::Tragicomedy)]
    fn test_from_str(#[case] s: &str, #[case] expected: Genre) {
        assert_eq!(s.parse::<Genre>().unwrap(), expected);
    }

    #[test]
    fn test_unknown() {
        assert!("Cyberpunk".parse::<Genre>().is_err());
    }
}
