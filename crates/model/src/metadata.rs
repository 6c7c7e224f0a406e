//! Title metadata file parsing.
//!
//! Producers ship a `{ISBN}.txt` file alongside the content. Only the pieces
//! needed to build the title and its chapter containers are interpreted; the
//! format itself is pluggable through [`MetadataParser`].

use crate::consts::CHAPTER_PROPERTY_REGEX;
use crate::error::{ErrorKind, Result};
use crate::models::{BookMetadata, ChapterInfo};
use crate::{Isbn, MAX_CHAPTER_NUMBER};
use std::collections::BTreeMap;

/// Everything a metadata file says about a title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleMetadata {
    pub book: BookMetadata,
    /// One entry per chapter `1..=N`, sorted by number.
    pub chapters: Vec<ChapterInfo>,
}

/// Turns the text of a title metadata file into [`TitleMetadata`].
pub trait MetadataParser: Send + Sync {
    fn parse(&self, isbn: &Isbn, text: &str) -> Result<TitleMetadata>;
}

/// Parser for Java-style `key=value` properties files.
///
/// ```
/// use bestpub_model::{Isbn, MetadataParser, PropertiesParser};
///
/// let isbn: Isbn = "9780203807217".parse().unwrap();
/// let text = "bookTitle=Tea Time\nnrOfChapters=2\nchapter.1.chapterTitle=Milk First\n";
/// let metadata = PropertiesParser.parse(&isbn, text).unwrap();
/// assert_eq!(metadata.book.title.as_deref(), Some("Tea Time"));
/// assert_eq!(metadata.chapters.len(), 2);
/// assert_eq!(metadata.chapters[0].title.as_deref(), Some("Milk First"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesParser;

impl MetadataParser for PropertiesParser {
    #[tracing::instrument(level = "debug", skip(self, text), fields(isbn = %isbn))]
    fn parse(&self, isbn: &Isbn, text: &str) -> Result<TitleMetadata> {
        let mut book = BookMetadata::default();
        let mut chapters: BTreeMap<u32, ChapterInfo> = BTreeMap::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            let Some((key, value)) = trimmed.split_once('=').or_else(|| trimmed.split_once(':')) else {
                exn::bail!(ErrorKind::InvalidMetadata { line, reason: "expected key=value".to_string() });
            };
            let (key, value) = (key.trim(), value.trim());
            match key {
                "bookTitle" => book.title = non_empty(value),
                "bookGenre" => {
                    book.genre = non_empty(value);
                    if book.genre.is_some() && book.known_genre().is_none() {
                        tracing::warn!(isbn = %isbn, genre = value, "Title uses an unrecognised genre");
                    }
                },
                "bookAuthors" => {
                    book.authors = value.split(',').map(str::trim).filter(|a| !a.is_empty()).map(String::from).collect();
                },
                "nrOfChapters" => book.chapter_count = parse_count(line, key, value)?,
                "nrOfPages" => book.page_count = parse_count(line, key, value)?,
                _ => match CHAPTER_PROPERTY_REGEX.captures(key) {
                    Some(captures) => {
                        let number = parse_chapter_number(line, &captures[1])?;
                        let chapter = chapters.entry(number).or_insert_with(|| ChapterInfo::new(number));
                        match &captures[2] {
                            "chapterTitle" => chapter.title = non_empty(value),
                            _ => chapter.author = non_empty(value),
                        }
                    },
                    None => tracing::debug!(isbn = %isbn, key, line, "Ignoring unknown metadata key"),
                },
            }
        }

        let described_max = chapters.keys().next_back().copied().unwrap_or(0);
        let count = match book.chapter_count {
            Some(count) if count > MAX_CHAPTER_NUMBER => exn::bail!(ErrorKind::ChapterOutOfRange(count)),
            Some(count) if described_max > count => exn::bail!(ErrorKind::InvalidMetadata {
                line: 0,
                reason: format!("chapter {described_max} described but nrOfChapters is {count}"),
            }),
            Some(count) => count,
            None => described_max,
        };
        for number in 1..=count {
            chapters.entry(number).or_insert_with(|| ChapterInfo::new(number));
        }

        Ok(TitleMetadata { book, chapters: chapters.into_values().collect() })
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_count(line: usize, key: &str, value: &str) -> Result<Option<u32>> {
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse() {
        Ok(count) => Ok(Some(count)),
        Err(_) => exn::bail!(ErrorKind::InvalidMetadata { line, reason: format!("{key} is not a number: {value:?}") }),
    }
}

fn parse_chapter_number(line: usize, digits: &str) -> Result<u32> {
    let Ok(number) = digits.parse::<u32>() else {
        exn::bail!(ErrorKind::InvalidMetadata { line, reason: format!("chapter number too large: {digits}") });
    };
    if number == 0 || number > MAX_CHAPTER_NUMBER {
        exn::bail!(ErrorKind::ChapterOutOfRange(number));
    }
    Ok(number)
}
