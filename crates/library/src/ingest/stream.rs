use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::ingest::error::{ErrorKind, Result};
use crate::ingest::reconcile::{Outcome, reconcile_archive_inner};
use crate::scan::list_archives_inner;
use async_stream::stream;
use bestpub_config::InvalidNamePolicy;
use exn::ResultExt;
use futures::Stream;

/// Progress events emitted by [`ingest`] during one scan cycle.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete), exactly once, with
///    the number of archives waiting.
/// 3. [`Reconciled`](Self::Reconciled), zero or more times, one per archive.
/// 4. [`Complete`](Self::Complete), exactly once.
///
/// An error may end the stream early, in which case [`Complete`](Self::Complete)
/// is never emitted.
#[derive(Debug)]
pub enum IngestEvent {
    Started,
    DiscoveryComplete(u64),
    Reconciled(Outcome),
    Complete,
}

/// Runs one scan cycle over the drop directory, streaming [`IngestEvent`]s.
///
/// Archives are reconciled one at a time in path order. A failure to move
/// one archive out of the drop directory is surfaced as an
/// [`Ingest`](LibraryErrorKind::Ingest) error item and the cycle carries on.
/// A missing or unusable drop directory ends the stream with a
/// [`Scan`](LibraryErrorKind::Scan) error. Under
/// [`InvalidNamePolicy::AbortCycle`], an archive not named after an ISBN is
/// quarantined and then the stream ends with
/// [`CycleAborted`](LibraryErrorKind::CycleAborted).
pub fn ingest(ctx: &Context) -> impl Stream<Item = LibraryResult<IngestEvent>> + '_ {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(IngestEvent::Started);

        let listed = list_archives_inner(&ctx.ingestion.drop_directory, &ctx.ingestion.extension).await;
        let archives = match listed.or_raise(|| LibraryErrorKind::Scan) {
            Ok(archives) => archives,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        yield Ok(IngestEvent::DiscoveryComplete(u64::try_from(archives.len()).unwrap_or(0)));

        for archive in archives {
            let result = reconcile_archive_inner(ctx, &archive).await;
            let abort = ctx.ingestion.invalid_name_policy == InvalidNamePolicy::AbortCycle
                && matches!(&result, Ok(outcome) if outcome.is_rejected());
            yield result.map(IngestEvent::Reconciled).or_raise(|| LibraryErrorKind::Ingest);
            if abort {
                let aborted: Result<IngestEvent> = Err(exn::Exn::from(ErrorKind::InvalidTitleKey(archive)));
                yield aborted.or_raise(|| LibraryErrorKind::CycleAborted);
                return;
            }
        }

        yield Ok(IngestEvent::Complete);
    })
}
