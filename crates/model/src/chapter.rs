use crate::consts::{LEGACY_CHAPTER_FILE_REGEX, NUMBERED_CHAPTER_FILE_REGEX};
use crate::error::{Error, ErrorKind, Result};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Highest chapter number a title may carry.
pub const MAX_CHAPTER_NUMBER: u32 = 200;
const FOLDER_PREFIX: &str = "chapter";

/// Filename convention used to route chapter content to its chapter folder.
///
/// Two incompatible conventions have been delivered by producers over time,
/// so the active one is chosen by configuration rather than guessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChapterConvention {
    /// `{ISBN}-Chapter-{NNN}.{ext}` filed into `chapter-{N}`.
    #[default]
    Numbered,
    /// `{ISBN}-chapter{N}.{ext}` filed into `chapter{N}`.
    Legacy,
}

impl ChapterConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numbered => "numbered",
            Self::Legacy => "legacy",
        }
    }

    /// Name of the chapter folder that holds chapter `number`.
    #[must_use]
    pub fn folder_name(&self, number: u32) -> String {
        match self {
            Self::Numbered => format!("{FOLDER_PREFIX}-{number}"),
            Self::Legacy => format!("{FOLDER_PREFIX}{number}"),
        }
    }

    /// Returns `true` if `filename` is chapter content under this convention.
    #[must_use]
    pub fn is_chapter_file(&self, filename: &str) -> bool {
        match self {
            Self::Numbered => NUMBERED_CHAPTER_FILE_REGEX.is_match(filename),
            Self::Legacy => LEGACY_CHAPTER_FILE_REGEX.is_match(filename),
        }
    }

    /// Computes the destination chapter folder name for a content file.
    ///
    /// Returns `None` (and logs) when no folder name can be derived. The
    /// folder is only *named* here; whether it exists is up to the caller.
    ///
    /// ```
    /// use bestpub_model::ChapterConvention;
    /// let numbered = ChapterConvention::Numbered;
    /// assert_eq!(numbered.resolve_folder_name("9780203807217-Chapter-012.xhtml").as_deref(), Some("chapter-12"));
    /// assert_eq!(numbered.resolve_folder_name("9780203807217-Chapter-201.xhtml"), None);
    /// let legacy = ChapterConvention::Legacy;
    /// assert_eq!(legacy.resolve_folder_name("9780203807217-Chapter7.html").as_deref(), Some("chapter7"));
    /// ```
    #[must_use]
    pub fn resolve_folder_name(&self, filename: &str) -> Option<String> {
        match self {
            Self::Numbered => match numbered_chapter(filename) {
                Ok(number) => Some(self.folder_name(number)),
                Err(err) => {
                    tracing::error!(filename, error = %err, "Could not derive chapter number from filename");
                    None
                },
            },
            Self::Legacy => {
                let start = filename.find('-')? + 1;
                let end = filename.rfind('.')?;
                let name = filename.get(start..end)?.trim().to_lowercase();
                match name.is_empty() {
                    true => {
                        tracing::error!(filename, "Chapter filename has an empty chapter segment");
                        None
                    },
                    false => Some(name),
                }
            },
        }
    }

    /// Chapter number carried by a content filename, if any.
    #[must_use]
    pub fn chapter_number(&self, filename: &str) -> Option<u32> {
        match self {
            Self::Numbered => numbered_chapter(filename).ok(),
            Self::Legacy => self.resolve_folder_name(filename).and_then(|name| self.number_from_folder(&name)),
        }
    }

    /// Inverse of [`folder_name`](Self::folder_name).
    #[must_use]
    pub fn number_from_folder(&self, folder: &str) -> Option<u32> {
        let head = folder.get(..FOLDER_PREFIX.len())?;
        if !head.eq_ignore_ascii_case(FOLDER_PREFIX) {
            return None;
        }
        let rest = &folder[FOLDER_PREFIX.len()..];
        let digits = match self {
            Self::Numbered => rest.strip_prefix('-')?,
            Self::Legacy => rest,
        };
        digits.parse().ok()
    }
}

/// The chapter number is the three characters right before the final `.`.
fn numbered_chapter(filename: &str) -> Result<u32> {
    let invalid = || ErrorKind::InvalidChapterFilename(filename.to_string());
    let Some(dot) = filename.rfind('.') else {
        exn::bail!(invalid());
    };
    let Some(digits) = dot.checked_sub(3).and_then(|start| filename.get(start..dot)) else {
        exn::bail!(invalid());
    };
    let number: i64 = match digits.parse() {
        Ok(number) => number,
        Err(_) => exn::bail!(invalid()),
    };
    match u32::try_from(number) {
        Ok(number) if number <= MAX_CHAPTER_NUMBER => Ok(number),
        _ => exn::bail!(ErrorKind::ChapterOutOfRange(number.clamp(0, i64::from(u32::MAX)) as u32)),
    }
}

impl FromStr for ChapterConvention {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "numbered" | "a" => Ok(Self::Numbered),
            "legacy" | "b" => Ok(Self::Legacy),
            _ => exn::bail!(ErrorKind::UnknownConvention(s.to_string())),
        }
    }
}
impl Display for ChapterConvention {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
