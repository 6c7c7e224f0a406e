use crate::Method;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::collections::HashSet;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{DateTime, ZipWriter};

/// Builds a ZIP archive entry by entry, in exactly the order entries are
/// added.
///
/// Every entry gets the same fixed timestamp so that identical input
/// produces identical archive structure. Adding the same path twice is an
/// error rather than a silent overwrite.
///
/// # Examples
///
/// ```
/// use bestpub_archive::{ArchiveWriter, Method, read_entries};
/// use std::io::Cursor;
///
/// let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()));
/// writer.add_file("mimetype", b"application/epub+zip", Method::Stored).unwrap();
/// writer.add_directory("META-INF").unwrap();
/// let bytes = writer.finish().unwrap().into_inner();
///
/// let entries = read_entries(Cursor::new(bytes)).unwrap();
/// assert_eq!(entries[0].path, "mimetype");
/// ```
pub struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    entries: HashSet<String>,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { zip: ZipWriter::new(inner), entries: HashSet::new() }
    }

    fn options(method: Method) -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(method.into()).last_modified_time(DateTime::default())
    }

    fn claim(&mut self, name: String) -> Result<String> {
        if !self.entries.insert(name.clone()) {
            exn::bail!(ErrorKind::DuplicateEntry(name));
        }
        Ok(name)
    }

    /// Add a file entry at `name` (a `/`-separated relative path).
    pub fn add_file(&mut self, name: &str, data: &[u8], method: Method) -> Result<()> {
        let name = self.claim(validate_name(name)?)?;
        tracing::trace!(entry = %name, size = data.len(), %method, "Adding archive entry");
        self.zip.start_file(name, Self::options(method)).or_raise(|| ErrorKind::Io)?;
        self.zip.write_all(data).or_raise(|| ErrorKind::Io)
    }

    /// Add an explicit directory entry. A trailing `/` is implied.
    pub fn add_directory(&mut self, name: &str) -> Result<()> {
        let name = self.claim(format!("{}/", validate_name(name.trim_end_matches('/'))?))?;
        tracing::trace!(entry = %name, "Adding archive directory");
        self.zip.add_directory(name, Self::options(Method::Stored)).or_raise(|| ErrorKind::Io)
    }

    /// Number of entries (files and directories) written so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the central directory and hand back the underlying writer.
    pub fn finish(self) -> Result<W> {
        self.zip.finish().or_raise(|| ErrorKind::Io)
    }
}

fn validate_name(name: &str) -> Result<String> {
    let valid = !name.is_empty()
        && !name.starts_with('/')
        && !name.contains('\\')
        && !name.contains('\0')
        && name.split('/').all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    match valid {
        true => Ok(name.to_string()),
        false => exn::bail!(ErrorKind::InvalidEntryName(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;
    use zip::{CompressionMethod, ZipArchive};

    fn build(f: impl FnOnce(&mut ArchiveWriter<Cursor<Vec<u8>>>)) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()));
        f(&mut writer);
        let bytes = writer.finish().unwrap().into_inner();
        ZipArchive::new(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut archive = build(|w| {
            w.add_file("mimetype", b"application/epub+zip", Method::Stored).unwrap();
            w.add_directory("META-INF/").unwrap();
            w.add_file("META-INF/container.xml", b"<container/>", Method::Deflated).unwrap();
            w.add_file("OPS/package.opf", b"<package/>", Method::Deflated).unwrap();
        });
        let names: Vec<_> = (0..archive.len()).map(|i| archive.by_index(i).unwrap().name().to_string()).collect();
        assert_eq!(names, vec!["mimetype", "META-INF/", "META-INF/container.xml", "OPS/package.opf"]);

        let mimetype = archive.by_index(0).unwrap();
        assert_eq!(mimetype.compression(), CompressionMethod::Stored);
        assert_eq!(mimetype.size(), 20);
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()));
        writer.add_file("OPS/a.xhtml", b"one", Method::Deflated).unwrap();
        let err = writer.add_file("OPS/a.xhtml", b"two", Method::Deflated).unwrap_err();
        assert_eq!(*err, ErrorKind::DuplicateEntry("OPS/a.xhtml".to_string()));
        assert_eq!(writer.len(), 1);
    }

    #[rstest]
    #[case("")]
    #[case("/absolute")]
    #[case("../escape")]
    #[case("OPS//double")]
    #[case("OPS\\windows")]
    #[case("OPS/./here")]
    fn test_invalid_names(#[case] name: &str) {
        let mut writer = ArchiveWriter::new(Cursor::new(Vec::new()));
        let err = writer.add_file(name, b"", Method::Stored).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidEntryName(_)));
        assert!(writer.is_empty());
    }
}
