use crate::fs::PARTIAL_SUFFIX;
use crate::import::{ARTWORK_FOLDER, PACKAGE_DESCRIPTOR, STYLES_FOLDER, SUPPLEMENTARY_FOLDER};
use crate::publish::error::{ErrorKind, Result};
use crate::records::CHAPTER_NUMBER;
use bestpub_archive::{ArchiveWriter, Method};
use bestpub_model::{ChapterConvention, Isbn};
use bestpub_store::{ContentStore, Node, NodeKind, NodeRef};
use exn::ResultExt;
use std::io::{BufWriter, IntoInnerError, Seek, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// MIME type of the artifact, stored verbatim as its first entry.
pub const MIMETYPE: &str = "application/epub+zip";
/// Root of the publication content inside the artifact.
pub const CONTENT_DIR: &str = "OPS";

const MIMETYPE_ENTRY: &str = "mimetype";
const META_INF: &str = "META-INF";
const CONTAINER_ENTRY: &str = "META-INF/container.xml";
const CONTAINER_XML: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n",
    "<container version=\"1.0\" xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\n",
    "   <rootfiles>\n",
    "      <rootfile full-path=\"OPS/package.opf\" media-type=\"application/oebps-package+xml\"/>\n",
    "   </rootfiles>\n",
    "</container>",
);

/// Optional title folders and where their files land in the artifact.
const FOLDERS: [(&str, &str); 3] =
    [(STYLES_FOLDER, "OPS/css"), (ARTWORK_FOLDER, "OPS/images"), (SUPPLEMENTARY_FOLDER, CONTENT_DIR)];

/// One artifact entry, in the order it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactEntry {
    Directory(String),
    File { path: String, data: Vec<u8>, method: Method },
}
impl ArtifactEntry {
    pub fn path(&self) -> &str {
        match self {
            Self::Directory(path) | Self::File { path, .. } => path,
        }
    }
}

/// Lays out the artifact for the title container `title`.
///
/// 1. `mimetype`, uncompressed.
/// 2. `META-INF/` with `container.xml` pointing at the package descriptor.
/// 3. `OPS/package.opf`, which must exist.
/// 4. `Styles` files into `OPS/css/`.
/// 5. `Artwork` files into `OPS/images/`.
/// 6. `Supplementary` files into `OPS/`.
/// 7. Each chapter's files into `OPS/`, chapters in number order.
///
/// Missing optional folders are logged and skipped. Only content nodes are
/// packed; anything nested deeper is ignored.
#[tracing::instrument(level = "debug", skip(store, convention))]
pub async fn plan(
    store: &dyn ContentStore,
    title: NodeRef,
    isbn: &Isbn,
    convention: ChapterConvention,
) -> Result<Vec<ArtifactEntry>> {
    let mut entries = vec![
        ArtifactEntry::File { path: MIMETYPE_ENTRY.to_string(), data: MIMETYPE.into(), method: Method::Stored },
        ArtifactEntry::Directory(META_INF.to_string()),
        ArtifactEntry::File {
            path: CONTAINER_ENTRY.to_string(),
            data: CONTAINER_XML.into(),
            method: Method::Deflated,
        },
    ];

    let children = store.children(title).await.or_raise(|| ErrorKind::Store)?;
    let package = children
        .iter()
        .find(|child| child.kind == NodeKind::Content && child.name.eq_ignore_ascii_case(PACKAGE_DESCRIPTOR));
    let Some(package) = package else {
        exn::bail!(ErrorKind::MissingPackageDescriptor(isbn.clone()));
    };
    let data = store.read_content(package.id).await.or_raise(|| ErrorKind::Store)?;
    entries.push(ArtifactEntry::File {
        path: format!("{CONTENT_DIR}/{PACKAGE_DESCRIPTOR}"),
        data,
        method: Method::Deflated,
    });

    for (folder, target) in FOLDERS {
        match children.iter().find(|child| child.is_container() && child.name == folder) {
            Some(node) => append_files(store, node, target, &mut entries).await?,
            None => tracing::info!(%isbn, folder, "Skipping missing folder"),
        }
    }

    let mut chapters = Vec::new();
    for chapter in children.iter().filter(|child| child.kind == NodeKind::Chapter) {
        let stored = store.property(chapter.id, CHAPTER_NUMBER).await.or_raise(|| ErrorKind::Store)?;
        let number = stored
            .and_then(|number| number.parse::<u32>().ok())
            .or_else(|| convention.number_from_folder(&chapter.name));
        chapters.push((number.unwrap_or(u32::MAX), chapter));
    }
    chapters.sort_by(|(a, x), (b, y)| a.cmp(b).then_with(|| x.name.cmp(&y.name)));
    for (_, chapter) in chapters {
        append_files(store, chapter, CONTENT_DIR, &mut entries).await?;
    }

    tracing::debug!(entries = entries.len(), "Planned artifact");
    Ok(entries)
}

async fn append_files(
    store: &dyn ContentStore,
    folder: &Node,
    target: &str,
    entries: &mut Vec<ArtifactEntry>,
) -> Result<()> {
    for child in store.children(folder.id).await.or_raise(|| ErrorKind::Store)? {
        if child.kind != NodeKind::Content {
            tracing::debug!(folder = folder.name, child = child.name, "Ignoring nested container");
            continue;
        }
        let data = store.read_content(child.id).await.or_raise(|| ErrorKind::Store)?;
        entries.push(ArtifactEntry::File { path: format!("{target}/{}", child.name), data, method: Method::Deflated });
    }
    Ok(())
}

/// Writes planned entries as a ZIP archive. Two entries with the same path
/// fail the whole write.
pub fn write<W: Write + Seek>(entries: &[ArtifactEntry], writer: W) -> Result<W> {
    let mut archive = ArchiveWriter::new(writer);
    for entry in entries {
        match entry {
            ArtifactEntry::Directory(path) => archive.add_directory(path),
            ArtifactEntry::File { path, data, method } => archive.add_file(path, data, *method),
        }
        .or_raise(|| ErrorKind::AssemblyFailed)?;
    }
    archive.finish().or_raise(|| ErrorKind::AssemblyFailed)
}

/// Builds the artifact for `title` into a new randomly named `.part` file
/// in `temp_dir`.
///
/// The file is deleted again when the returned handle is dropped, so a
/// failure anywhere after this point leaves nothing behind.
pub async fn assemble(
    store: &dyn ContentStore,
    title: NodeRef,
    isbn: &Isbn,
    convention: ChapterConvention,
    temp_dir: &Path,
) -> Result<NamedTempFile> {
    let entries = plan(store, title, isbn, convention).await?;
    let temp_dir = temp_dir.to_path_buf();
    let prefix = format!("{isbn}-");
    tokio::task::spawn_blocking(move || -> Result<NamedTempFile> {
        let mut temp = Builder::new()
            .prefix(&prefix)
            .suffix(PARTIAL_SUFFIX)
            .tempfile_in(&temp_dir)
            .or_raise(|| ErrorKind::AssemblyFailed)?;
        let writer = write(&entries, BufWriter::new(temp.as_file_mut()))?;
        writer.into_inner().map_err(IntoInnerError::into_error).or_raise(|| ErrorKind::AssemblyFailed)?;
        temp.as_file().sync_all().or_raise(|| ErrorKind::AssemblyFailed)?;
        Ok(temp)
    })
    .await
    .or_raise(|| ErrorKind::AssemblyFailed)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ISBN;
    use bestpub_archive::read_entries;
    use bestpub_store::MemoryStore;
    use std::fs::File;

    /// A title laid out the way the importer leaves one, chapters created
    /// out of order.
    async fn title(store: &MemoryStore, package: bool) -> NodeRef {
        let root = store.root().await.unwrap();
        let title = store.create_node(root, ISBN, NodeKind::Title).await.unwrap();
        let chapters = [
            (2, "9780203807217-Chapter-002.xhtml"),
            (10, "9780203807217-Chapter-010.xhtml"),
            (1, "9780203807217-Chapter-001.xhtml"),
        ];
        for (number, file) in chapters {
            let chapter = store.create_node(title, &format!("chapter-{number}"), NodeKind::Chapter).await.unwrap();
            store.create_file(chapter, file, "application/xhtml+xml", file.as_bytes()).await.unwrap();
        }
        if package {
            store.create_file(title, "package.opf", "application/oebps-package+xml", b"<package/>").await.unwrap();
        }
        let styles = store.create_node(title, STYLES_FOLDER, NodeKind::Folder).await.unwrap();
        store.create_file(styles, "main.css", "text/css", b"body {}").await.unwrap();
        let extra = store.create_node(title, SUPPLEMENTARY_FOLDER, NodeKind::Folder).await.unwrap();
        store.create_file(extra, "toc.ncx", "application/x-dtbncx+xml", b"<ncx/>").await.unwrap();
        title
    }

    #[tokio::test]
    async fn test_layout() {
        let store = MemoryStore::default();
        let node = title(&store, true).await;
        let isbn: Isbn = ISBN.parse().unwrap();
        let entries = plan(&store, node, &isbn, ChapterConvention::Numbered).await.unwrap();
        let paths: Vec<_> = entries.iter().map(ArtifactEntry::path).collect();
        assert_eq!(
            paths,
            vec![
                "mimetype",
                "META-INF",
                "META-INF/container.xml",
                "OPS/package.opf",
                "OPS/css/main.css",
                "OPS/toc.ncx",
                "OPS/9780203807217-Chapter-001.xhtml",
                "OPS/9780203807217-Chapter-002.xhtml",
                "OPS/9780203807217-Chapter-010.xhtml",
            ]
        );
    }

    #[tokio::test]
    async fn test_assembled_archive() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::default();
        let node = title(&store, true).await;
        let isbn: Isbn = ISBN.parse().unwrap();
        let temp = assemble(&store, node, &isbn, ChapterConvention::Numbered, dir.path()).await.unwrap();
        assert!(temp.path().to_string_lossy().ends_with(".part"));

        let entries = read_entries(File::open(temp.path()).unwrap()).unwrap();
        assert_eq!(entries[0].path, "mimetype");
        assert_eq!(entries[0].data, MIMETYPE.as_bytes());
        assert_eq!(entries[1].path, "META-INF/container.xml");
        assert!(String::from_utf8_lossy(&entries[1].data).contains("full-path=\"OPS/package.opf\""));
        assert_eq!(entries[2].path, "OPS/package.opf");
        assert_eq!(entries.len(), 8);

        let mut archive = zip::ZipArchive::new(File::open(temp.path()).unwrap()).unwrap();
        assert_eq!(archive.by_index(0).unwrap().compression(), zip::CompressionMethod::Stored);
        assert!(archive.by_name("META-INF/").unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_missing_package_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::default();
        let node = title(&store, false).await;
        let isbn: Isbn = ISBN.parse().unwrap();
        let err = assemble(&store, node, &isbn, ChapterConvention::Numbered, dir.path()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingPackageDescriptor(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_entry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::default();
        let node = title(&store, true).await;
        // Same name as a chapter file, both land in `OPS/`.
        let extra = store.child_by_name(node, SUPPLEMENTARY_FOLDER).await.unwrap().unwrap();
        store.create_file(extra, "9780203807217-Chapter-001.xhtml", "text/html", b"dup").await.unwrap();
        let isbn: Isbn = ISBN.parse().unwrap();
        let err = assemble(&store, node, &isbn, ChapterConvention::Numbered, dir.path()).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AssemblyFailed));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
