use super::ChapterStatus;
use std::cmp::Ordering;

/// Descriptive metadata for one chapter, as delivered with the title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChapterInfo {
    #[cfg_attr(feature = "serde", serde(rename = "chapterNumber"))]
    pub number: u32,
    #[cfg_attr(feature = "serde", serde(rename = "chapterTitle"))]
    pub title: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "chapterAuthor"))]
    pub author: Option<String>,
}
impl ChapterInfo {
    pub fn new(number: u32) -> Self {
        Self { number, title: None, author: None }
    }

    /// Returns `true` if the metadata file described this chapter.
    pub fn is_described(&self) -> bool {
        self.title.is_some() || self.author.is_some()
    }
}
// Chapters are ordered by number alone: there is only ever one chapter per
// number within a title.
impl PartialOrd for ChapterInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ChapterInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number).then_with(|| self.title.cmp(&other.title))
    }
}

/// A chapter container as stored under its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRecord {
    pub info: ChapterInfo,
    pub status: ChapterStatus,
}
