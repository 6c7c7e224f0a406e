use bestpub_model::ChapterConvention;
use bestpub_store::error::Result as StoreResult;
use bestpub_store::{ContentStore, NodeKind, NodeRef};

/// Finds the existing chapter folder under `title` that `filename` belongs to.
///
/// Only resolves; chapter folders are created up front by the importer.
/// Returns `None`, after logging, when the filename does not name a folder
/// under `convention` or when the named folder is not there.
pub async fn resolve_chapter_folder(
    store: &dyn ContentStore,
    title: NodeRef,
    filename: &str,
    convention: ChapterConvention,
) -> StoreResult<Option<NodeRef>> {
    let Some(name) = convention.resolve_folder_name(filename) else {
        return Ok(None);
    };
    let Some(folder) = store.child_by_name(title, &name).await? else {
        tracing::error!(filename, folder = name, "Chapter folder does not exist");
        return Ok(None);
    };
    if store.node(folder).await?.kind != NodeKind::Chapter {
        tracing::error!(filename, folder = name, "Chapter folder name is taken by another kind of node");
        return Ok(None);
    }
    Ok(Some(folder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bestpub_store::MemoryStore;
    use rstest::rstest;

    #[rstest]
    #[case(ChapterConvention::Numbered, "chapter-2", "9780203807217-Chapter-002.xhtml", true)]
    #[case(ChapterConvention::Numbered, "chapter-2", "9780203807217-Chapter-003.xhtml", false)]
    #[case(ChapterConvention::Numbered, "chapter-2", "9780203807217-Chapter-x02.xhtml", false)]
    #[case(ChapterConvention::Numbered, "chapter-200", "9780203807217-Chapter-201.xhtml", false)]
    #[case(ChapterConvention::Legacy, "chapter2", "9780203807217-Chapter2.html", true)]
    #[case(ChapterConvention::Legacy, "chapter2", "9780203807217-chapter02.html", false)]
    #[tokio::test]
    async fn test_resolve(
        #[case] convention: ChapterConvention,
        #[case] folder: &str,
        #[case] filename: &str,
        #[case] found: bool,
    ) {
        let store = MemoryStore::default();
        let root = store.root().await.unwrap();
        let title = store.create_node(root, "9780203807217", NodeKind::Title).await.unwrap();
        let chapter = store.create_node(title, folder, NodeKind::Chapter).await.unwrap();
        let resolved = resolve_chapter_folder(&store, title, filename, convention).await.unwrap();
        assert_eq!(resolved, found.then_some(chapter));
    }

    #[tokio::test]
    async fn test_non_chapter_folder_is_not_resolved() {
        let store = MemoryStore::default();
        let root = store.root().await.unwrap();
        let title = store.create_node(root, "9780203807217", NodeKind::Title).await.unwrap();
        store.create_node(title, "chapter-1", NodeKind::Folder).await.unwrap();
        let resolved =
            resolve_chapter_folder(&store, title, "9780203807217-Chapter-001.xhtml", ChapterConvention::Numbered)
                .await
                .unwrap();
        assert_eq!(resolved, None);
    }
}
