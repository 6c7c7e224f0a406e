use bestpub_model::ChapterConvention;

/// Name of the package descriptor, filed directly under the title.
pub const PACKAGE_DESCRIPTOR: &str = "package.opf";
pub const STYLES_FOLDER: &str = "Styles";
pub const ARTWORK_FOLDER: &str = "Artwork";
pub const SUPPLEMENTARY_FOLDER: &str = "Supplementary";

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "svg", "webp"];

/// Where an archive entry is filed beneath its title container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Directly under the title.
    Title,
    /// Under the chapter folder the filename resolves to.
    Chapter,
    /// Under the named sibling folder of the chapters.
    Folder(&'static str),
}

pub fn classify(filename: &str, convention: ChapterConvention) -> Destination {
    if filename.eq_ignore_ascii_case(PACKAGE_DESCRIPTOR) {
        return Destination::Title;
    }
    if convention.is_chapter_file(filename) {
        return Destination::Chapter;
    }
    match extension(filename).as_deref() {
        Some("css") => Destination::Folder(STYLES_FOLDER),
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => Destination::Folder(ARTWORK_FOLDER),
        _ => Destination::Folder(SUPPLEMENTARY_FOLDER),
    }
}

/// MIME type stored alongside content, by file extension.
pub fn mime_type(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("xhtml") => "application/xhtml+xml",
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("opf") => "application/oebps-package+xml",
        Some("ncx") => "application/x-dtbncx+xml",
        Some("xml") => "application/xml",
        Some("txt") => "text/plain",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("otf") => "font/otf",
        Some("ttf") => "font/ttf",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

fn extension(filename: &str) -> Option<String> {
    filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}
