use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

regex!(ISBN_REGEX, r"^(978|979)[0-9]{10}$");
// `{ISBN}-Chapter-{NNN}.{ext}`, loosely: a malformed number must still reach
// the resolver so it can reject it.
regex!(NUMBERED_CHAPTER_FILE_REGEX, r"(?i)^[0-9]{13}-chapter-[^.]+\.[^.]+$");
// `{ISBN}-chapter{N}.{ext}`
regex!(LEGACY_CHAPTER_FILE_REGEX, r"(?i)^[0-9]{13}-chapter[0-9]+\.[^.]+$");
regex!(CHAPTER_PROPERTY_REGEX, r"^chapter\.([0-9]+)\.(chapterTitle|chapterAuthor)$");
