use super::sanitize;
use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Ingestion state stored on a title container.
///
/// A title is `InProgress` from the moment the importer creates it until the
/// very last step of a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum IngestionStatus {
    InProgress,
    Complete,
}
impl IngestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Complete => "Complete",
        }
    }
}
impl FromStr for IngestionStatus {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "inprogress" => Self::InProgress,
            "complete" | "completed" => Self::Complete,
            _ => exn::bail!(ErrorKind::InvalidStatus { field: "ingestion status", value: s.to_string() }),
        })
    }
}
impl Display for IngestionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Whether a chapter container was described by the title metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ChapterStatus {
    Missing,
    Completed,
}
impl ChapterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "Missing",
            Self::Completed => "Completed",
        }
    }
}
impl FromStr for ChapterStatus {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "missing" => Self::Missing,
            "completed" | "complete" => Self::Completed,
            _ => exn::bail!(ErrorKind::InvalidStatus { field: "chapter status", value: s.to_string() }),
        })
    }
}
impl Display for ChapterStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Roll-up of chapter statuses for the whole title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum MetadataStatus {
    Missing,
    Partial,
    Completed,
}
impl MetadataStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "Missing",
            Self::Partial => "Partial",
            Self::Completed => "Completed",
        }
    }

    /// `Completed` if every chapter is, `Missing` if none are (or there are
    /// no chapters at all), otherwise `Partial`.
    pub fn from_chapters<'a>(statuses: impl IntoIterator<Item = &'a ChapterStatus>) -> Self {
        let (mut completed, mut total) = (0usize, 0usize);
        for status in statuses {
            total += 1;
            if *status == ChapterStatus::Completed {
                completed += 1;
            }
        }
        match (completed, total) {
            (_, 0) | (0, _) => Self::Missing,
            (c, t) if c == t => Self::Completed,
            _ => Self::Partial,
        }
    }
}
impl FromStr for MetadataStatus {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "missing" => Self::Missing,
            "partial" => Self::Partial,
            "completed" | "complete" => Self::Completed,
            _ => exn::bail!(ErrorKind::InvalidStatus { field: "metadata status", value: s.to_string() }),
        })
    }
}
impl Display for MetadataStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
