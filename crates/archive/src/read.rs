use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Upper bound on the buffer reserved from an entry's declared size, which
/// the archive itself claims and may lie about.
const MAX_PREALLOCATION: usize = 1024 * 1024;

fn preallocation(declared: u64) -> usize {
    usize::try_from(declared).map_or(MAX_PREALLOCATION, |size| size.min(MAX_PREALLOCATION))
}

/// A file entry read out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Relative, `/`-separated path inside the archive.
    pub path: String,
    pub data: Vec<u8>,
}
impl Entry {
    /// Final path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Read every file entry of an archive into memory, in archive order.
///
/// Directory entries are skipped, as are entries whose names would escape
/// the extraction root (absolute paths, `..`); those are logged.
pub fn read_entries<R: Read + Seek>(reader: R) -> Result<Vec<Entry>> {
    let mut archive = ZipArchive::new(reader).or_raise(|| ErrorKind::InvalidArchive)?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index).or_raise(|| ErrorKind::InvalidArchive)?;
        if file.is_dir() {
            continue;
        }
        let Some(enclosed) = file.enclosed_name() else {
            tracing::warn!(entry = file.name(), "Skipping archive entry with unsafe path");
            continue;
        };
        let path = enclosed.iter().map(|segment| segment.to_string_lossy()).collect::<Vec<_>>().join("/");
        let mut data = Vec::with_capacity(preallocation(file.size()));
        file.read_to_end(&mut data).or_raise(|| ErrorKind::InvalidArchive)?;
        entries.push(Entry { path, data });
    }
    Ok(entries)
}

/// [`read_entries`] for an archive on disk.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn read_archive(path: impl AsRef<Path>) -> Result<Vec<Entry>> {
    let file = File::open(path.as_ref()).or_raise(|| ErrorKind::Io)?;
    read_entries(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn raw_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                zip.start_file(*name, SimpleFileOptions::default()).unwrap();
                zip.write_all(data).unwrap();
            }
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_reads_files_skips_directories() {
        let bytes = raw_archive(&[
            ("9780203807217/", b""),
            ("9780203807217/9780203807217-Chapter-001.xhtml", b"<p>one</p>"),
            ("cover.jpg", b"\xFF\xD8"),
        ]);
        let entries = read_entries(Cursor::new(bytes)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "9780203807217/9780203807217-Chapter-001.xhtml");
        assert_eq!(entries[0].file_name(), "9780203807217-Chapter-001.xhtml");
        assert_eq!(entries[0].data, b"<p>one</p>");
        assert_eq!(entries[1].file_name(), "cover.jpg");
    }

    #[rstest]
    #[case::small(10, 10)]
    #[case::at_limit(1024 * 1024, MAX_PREALLOCATION)]
    #[case::declared_huge(u64::MAX, MAX_PREALLOCATION)]
    fn test_preallocation_is_capped(#[case] declared: u64, #[case] expected: usize) {
        assert_eq!(preallocation(declared), expected);
    }

    #[test]
    fn test_reads_entries_beyond_preallocation() {
        let large = vec![7u8; MAX_PREALLOCATION * 2 + 3];
        let entries = read_entries(Cursor::new(raw_archive(&[("big.bin", large.as_slice())]))).unwrap();
        assert_eq!(entries[0].data.len(), large.len());
    }

    #[test]
    fn test_skips_escaping_entries() {
        let bytes = raw_archive(&[("../evil.txt", b"nope"), ("fine.txt", b"yes")]);
        let entries = read_entries(Cursor::new(bytes)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "fine.txt");
    }

    #[test]
    fn test_not_an_archive() {
        let err = read_entries(Cursor::new(b"definitely not a zip".to_vec())).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidArchive);
    }

    #[test]
    fn test_read_archive_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("9780203807217.zip");
        std::fs::write(&path, raw_archive(&[("a.txt", b"a")])).unwrap();
        assert_eq!(read_archive(&path).unwrap().len(), 1);

        let err = read_archive(dir.path().join("missing.zip")).unwrap_err();
        assert_eq!(*err, ErrorKind::Io);
    }
}
