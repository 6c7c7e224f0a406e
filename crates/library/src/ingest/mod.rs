pub mod error;
mod reconcile;
mod stats;
mod stream;

pub use self::reconcile::{Outcome, Transition, reconcile_archive};
pub use self::stats::{CycleReport, IngestionStats, run_cycle};
pub use self::stream::{IngestEvent, ingest};

#[cfg(test)]
mod tests {
    use super::*;
    use super::error::ErrorKind as IngestErrorKind;
    use crate::error::ErrorKind as LibraryErrorKind;
    use crate::records;
    use crate::testing::{ISBN, context, delivery, write_archive};
    use crate::{Context, QUARANTINE_DIR};
    use bestpub_config::InvalidNamePolicy;
    use bestpub_model::models::IngestionStatus;
    use bestpub_store::{NodeKind, NodeRef};

    async fn title(ctx: &Context) -> Option<NodeRef> {
        let container = ctx.store.resolve(&ctx.ingestion.titles_path).await.unwrap()?;
        ctx.store.child_by_name(container, ISBN).await.unwrap()
    }

    async fn chapter_names(ctx: &Context, title: NodeRef) -> Vec<String> {
        let children = ctx.store.children(title).await.unwrap();
        children.into_iter().filter(|c| c.kind == NodeKind::Chapter).map(|c| c.name).collect()
    }

    const OTHER_ISBN: &str = "9781234567897";

    /// [`delivery`] for a second title.
    fn other_delivery() -> Vec<(String, String)> {
        delivery().into_iter().map(|(name, data)| (name.replace(ISBN, OTHER_ISBN), data.to_string())).collect()
    }

    fn write_owned(ctx: &Context, name: &str, files: &[(String, String)]) -> std::path::PathBuf {
        let files: Vec<(&str, &str)> = files.iter().map(|(name, data)| (name.as_str(), data.as_str())).collect();
        write_archive(&ctx.ingestion.drop_directory, name, &files)
    }

    async fn has_title(ctx: &Context, isbn: &str) -> bool {
        let container = ctx.store.resolve(&ctx.ingestion.titles_path).await.unwrap();
        match container {
            Some(container) => ctx.store.child_by_name(container, isbn).await.unwrap().is_some(),
            None => false,
        }
    }

    /// A title left behind by an earlier ingestion, with five chapters.
    async fn existing_title(ctx: &Context, status: Option<IngestionStatus>) -> NodeRef {
        let container = ctx.store.ensure_path(&ctx.ingestion.titles_path).await.unwrap();
        let node = ctx.store.create_node(container, ISBN, NodeKind::Title).await.unwrap();
        if let Some(status) = status {
            records::write_status(&*ctx.store, node, status).await.unwrap();
        }
        for number in 1..=5 {
            ctx.store.create_node(node, &format!("chapter-{number}"), NodeKind::Chapter).await.unwrap();
        }
        node
    }

    #[tokio::test]
    async fn test_new_title() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let archive = write_archive(&ctx.ingestion.drop_directory, "9780203807217.zip", &delivery());

        let mut stats = IngestionStats::default();
        let report = run_cycle(&ctx, &mut stats).await.unwrap();
        assert_eq!(report.discovered, 1);
        assert!(report.errors.is_empty());
        match &report.outcomes[..] {
            [Outcome::Imported { isbn, transition, summary, .. }] => {
                assert_eq!(isbn.as_str(), ISBN);
                assert_eq!(*transition, Transition::New);
                assert_eq!(summary.chapters.len(), 2);
            },
            other => panic!("unexpected outcomes: {other:?}"),
        }
        assert!(!archive.exists());

        let title = title(&ctx).await.unwrap();
        assert_eq!(records::read_status(&*ctx.store, title).await.unwrap(), Some(IngestionStatus::Complete));
        assert_eq!(chapter_names(&ctx, title).await, vec!["chapter-1", "chapter-2"]);
        assert_eq!(stats.runs, 1);
        assert_eq!(stats.imported, 1);
        assert_eq!(stats.queued, 0);
        assert!(stats.last_run.is_some());
    }

    #[tokio::test]
    async fn test_invalid_name_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let archive = write_archive(&ctx.ingestion.drop_directory, "invalidname.zip", &delivery());

        let mut stats = IngestionStats::default();
        let report = run_cycle(&ctx, &mut stats).await.unwrap();
        assert!(matches!(&report.outcomes[..], [Outcome::Rejected { .. }]));
        assert!(!archive.exists());
        assert!(ctx.ingestion.drop_directory.join(QUARANTINE_DIR).join("invalidname.zip").exists());
        assert_eq!(ctx.store.resolve(&ctx.ingestion.titles_path).await.unwrap(), None);
        assert_eq!(stats.quarantined, 1);
    }

    #[tokio::test]
    async fn test_invalid_name_does_not_stop_the_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        write_archive(&ctx.ingestion.drop_directory, "invalidname.zip", &delivery());
        let first = write_archive(&ctx.ingestion.drop_directory, "9780203807217.zip", &delivery());
        let second = write_owned(&ctx, "9781234567897.zip", &other_delivery());

        let mut stats = IngestionStats::default();
        let report = run_cycle(&ctx, &mut stats).await.unwrap();
        assert_eq!(report.discovered, 3);
        assert_eq!(report.imported().count(), 2);
        assert_eq!(report.quarantined().count(), 1);
        assert!(ctx.ingestion.drop_directory.join(QUARANTINE_DIR).join("invalidname.zip").exists());
        assert!(!first.exists() && !second.exists());
        assert!(has_title(&ctx, ISBN).await);
        assert!(has_title(&ctx, OTHER_ISBN).await);
        assert_eq!((stats.imported, stats.quarantined), (2, 1));
    }

    #[tokio::test]
    async fn test_failed_import_does_not_stop_the_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        std::fs::write(ctx.ingestion.drop_directory.join("9780203807217.zip"), b"not a zip").unwrap();
        write_owned(&ctx, "9781234567897.zip", &other_delivery());

        let report = run_cycle(&ctx, &mut IngestionStats::default()).await.unwrap();
        assert!(report.errors.is_empty());
        match &report.outcomes[..] {
            [Outcome::Failed { isbn: failed, .. }, Outcome::Imported { isbn: imported, .. }] => {
                assert_eq!(failed.as_str(), ISBN);
                assert_eq!(imported.as_str(), OTHER_ISBN);
            },
            other => panic!("unexpected outcomes: {other:?}"),
        }
        assert!(ctx.ingestion.drop_directory.join(QUARANTINE_DIR).join("9780203807217.zip").exists());
        assert!(!has_title(&ctx, ISBN).await);
        assert!(has_title(&ctx, OTHER_ISBN).await);
    }

    #[tokio::test]
    async fn test_invalid_name_aborts_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        ctx.ingestion.invalid_name_policy = InvalidNamePolicy::AbortCycle;
        write_archive(&ctx.ingestion.drop_directory, "000invalid.zip", &delivery());
        let valid = write_archive(&ctx.ingestion.drop_directory, "9780203807217.zip", &delivery());

        let mut stats = IngestionStats::default();
        let err = run_cycle(&ctx, &mut stats).await.unwrap_err();
        assert!(matches!(&*err, LibraryErrorKind::CycleAborted));
        assert!(ctx.ingestion.drop_directory.join(QUARANTINE_DIR).join("000invalid.zip").exists());
        assert!(valid.exists());
        assert_eq!(title(&ctx).await, None);
        assert_eq!(stats.queued, 0);
    }

    #[tokio::test]
    async fn test_republish_replaces_chapters() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let old = existing_title(&ctx, Some(IngestionStatus::Complete)).await;
        write_archive(&ctx.ingestion.drop_directory, "9780203807217.zip", &delivery());

        let report = run_cycle(&ctx, &mut IngestionStats::default()).await.unwrap();
        assert!(matches!(&report.outcomes[..], [Outcome::Imported { transition: Transition::Republish, .. }]));
        assert!(!ctx.store.exists(old).await.unwrap());
        let title = title(&ctx).await.unwrap();
        assert_eq!(chapter_names(&ctx, title).await, vec!["chapter-1", "chapter-2"]);
    }

    #[rstest::rstest]
    #[case::in_progress(Some(IngestionStatus::InProgress))]
    #[case::no_status(None)]
    #[tokio::test]
    async fn test_interrupted_import_is_resumed(#[case] status: Option<IngestionStatus>) {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        existing_title(&ctx, status).await;
        let archive = write_archive(&ctx.ingestion.drop_directory, "9780203807217.zip", &delivery());

        let outcome = reconcile_archive(&ctx, &archive).await.unwrap();
        assert!(matches!(outcome, Outcome::Imported { transition: Transition::Resume, .. }));
        let title = title(&ctx).await.unwrap();
        assert_eq!(records::read_status(&*ctx.store, title).await.unwrap(), Some(IngestionStatus::Complete));
        assert_eq!(chapter_names(&ctx, title).await, vec!["chapter-1", "chapter-2"]);
    }

    #[tokio::test]
    async fn test_failed_import_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let archive = ctx.ingestion.drop_directory.join("9780203807217.zip");
        std::fs::write(&archive, b"not a zip").unwrap();

        let outcome = reconcile_archive(&ctx, &archive).await.unwrap();
        match outcome {
            Outcome::Failed { quarantined, error, .. } => {
                assert_eq!(quarantined, ctx.ingestion.drop_directory.join(QUARANTINE_DIR).join("9780203807217.zip"));
                assert!(matches!(&*error, IngestErrorKind::ImportFailed(_)));
            },
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!archive.exists());
        assert_eq!(title(&ctx).await, None);
    }

    #[tokio::test]
    async fn test_missing_drop_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(dir.path());
        ctx.ingestion.drop_directory = dir.path().join("nowhere");

        let mut stats = IngestionStats::default();
        let err = run_cycle(&ctx, &mut stats).await.unwrap_err();
        assert!(matches!(&*err, LibraryErrorKind::Scan));
        assert_eq!(stats.runs, 1);
        assert_eq!(stats.errors, 1);
    }

    #[tokio::test]
    async fn test_event_order() {
        use futures::StreamExt;

        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        write_archive(&ctx.ingestion.drop_directory, "9780203807217.zip", &delivery());

        let events: Vec<_> = ingest(&ctx).collect().await;
        let events: Vec<_> = events.into_iter().map(Result::unwrap).collect();
        assert!(matches!(
            &events[..],
            [
                IngestEvent::Started,
                IngestEvent::DiscoveryComplete(1),
                IngestEvent::Reconciled(Outcome::Imported { .. }),
                IngestEvent::Complete,
            ]
        ));
    }
}
