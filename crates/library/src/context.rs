use crate::ingest::Outcome;
use bestpub_model::Isbn;
use bestpub_model::models::ChapterInfo;
use serde::{Deserialize, Serialize};

/// Named variables shared with the workflow engine that schedules ingestion.
///
/// Only the fields ingestion produces are interpreted; the timer durations
/// are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessContext {
    pub content_found: bool,
    pub content_error_found: bool,
    pub chapter_list: Vec<ChapterInfo>,
    pub related_isbn: Option<Isbn>,
    pub interrupt_t1_timer_duration: Option<String>,
    pub wait2_check4_content_timer_duration: Option<String>,
}

impl ProcessContext {
    /// Fold one reconciliation outcome into the variables.
    pub fn record(&mut self, outcome: &Outcome) {
        self.content_found = true;
        match outcome {
            Outcome::Imported { isbn, summary, .. } => {
                self.related_isbn = Some(isbn.clone());
                self.chapter_list = summary.chapters.clone();
            },
            Outcome::Failed { isbn, .. } => {
                self.content_error_found = true;
                self.related_isbn = Some(isbn.clone());
            },
            Outcome::Rejected { .. } => self.content_error_found = true,
        }
    }
}
