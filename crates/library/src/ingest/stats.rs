use crate::Context;
use crate::error::{Error as LibraryError, ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::ingest::reconcile::Outcome;
use crate::ingest::stream::{IngestEvent, ingest};
use futures::StreamExt;
use std::pin::pin;
use time::UtcDateTime;

/// Running totals across scan cycles, owned by whoever schedules them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionStats {
    /// When the most recent cycle started.
    pub last_run: Option<UtcDateTime>,
    pub runs: u64,
    /// Archives discovered by the current cycle and not yet reconciled.
    pub queued: u64,
    pub imported: u64,
    pub quarantined: u64,
    pub errors: u64,
}

impl IngestionStats {
    /// Fold one item of an [`ingest`] stream into the totals.
    pub fn observe(&mut self, item: &LibraryResult<IngestEvent>) {
        match item {
            Ok(IngestEvent::Started) => {
                self.runs += 1;
                self.last_run = Some(UtcDateTime::now());
                self.queued = 0;
            },
            Ok(IngestEvent::DiscoveryComplete(count)) => self.queued = *count,
            Ok(IngestEvent::Reconciled(outcome)) => {
                self.queued = self.queued.saturating_sub(1);
                match outcome.is_imported() {
                    true => self.imported += 1,
                    false => self.quarantined += 1,
                }
            },
            Ok(IngestEvent::Complete) => self.queued = 0,
            Err(err) => {
                self.errors += 1;
                // An aborted cycle leaves nothing queued; anything else was
                // one archive that could not be reconciled.
                match &**err {
                    LibraryErrorKind::CycleAborted => self.queued = 0,
                    _ => self.queued = self.queued.saturating_sub(1),
                }
            },
        }
    }
}

/// Everything that happened during one scan cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub started: UtcDateTime,
    pub finished: UtcDateTime,
    pub discovered: u64,
    pub outcomes: Vec<Outcome>,
    /// Archives that could not be moved out of the drop directory.
    pub errors: Vec<LibraryError>,
}

impl CycleReport {
    pub fn imported(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_imported())
    }

    pub fn quarantined(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_imported())
    }
}

/// Drives one [`ingest`] cycle to completion, updating `stats` as it goes.
///
/// # Errors
/// Returns the stream's error when the drop directory is unusable or the
/// cycle was aborted. Per-archive errors are collected into the report.
pub async fn run_cycle(ctx: &Context, stats: &mut IngestionStats) -> LibraryResult<CycleReport> {
    let started = UtcDateTime::now();
    let mut report = CycleReport { started, finished: started, discovered: 0, outcomes: vec![], errors: vec![] };
    let mut discovered = false;
    let mut events = pin!(ingest(ctx));
    while let Some(item) = events.next().await {
        stats.observe(&item);
        match item {
            Ok(IngestEvent::Started | IngestEvent::Complete) => {},
            Ok(IngestEvent::DiscoveryComplete(count)) => {
                discovered = true;
                report.discovered = count;
            },
            Ok(IngestEvent::Reconciled(outcome)) => report.outcomes.push(outcome),
            Err(err) if !discovered || matches!(&*err, LibraryErrorKind::CycleAborted) => return Err(err),
            Err(err) => {
                tracing::error!(error = ?err, "Archive left in the drop directory");
                report.errors.push(err);
            },
        }
    }
    report.finished = UtcDateTime::now();
    tracing::info!(
        discovered = report.discovered,
        imported = report.imported().count(),
        quarantined = report.quarantined().count(),
        errors = report.errors.len(),
        "Ingestion cycle complete"
    );
    Ok(report)
}
