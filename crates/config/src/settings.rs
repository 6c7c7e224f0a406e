use crate::error::{ErrorKind, Result};
use bestpub_model::ChapterConvention;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FALLBACK_DATA_DIR: &str = "/var/lib/bestpub";
/// Shared container every title is imported under.
pub const DEFAULT_TITLES_PATH: &str = "/BestPub/Incoming/Content";
/// Container holding one publish record per title. Kept apart from the
/// titles so re-ingesting a title does not reset its version.
pub const DEFAULT_RECORDS_PATH: &str = "/BestPub/Published";

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "BestPub", "bestpub")
}

fn data_dir() -> PathBuf {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf()).unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}

/// What to do with an archive whose filename is not an ISBN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidNamePolicy {
    /// Quarantine the archive and carry on with the rest of the cycle.
    #[default]
    Quarantine,
    /// Quarantine the archive, then end the whole cycle with an error.
    AbortCycle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ingestion: IngestionConfig,
    pub publishing: PublishingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file holding the content store.
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Directory producers drop `{ISBN}.zip` archives into.
    pub drop_directory: PathBuf,
    /// Archive extension, matched case-insensitively, without the dot.
    pub extension: String,
    /// Content store path of the shared container titles are imported into.
    pub titles_path: String,
    pub chapter_convention: ChapterConvention,
    pub invalid_name_policy: InvalidNamePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishingConfig {
    /// Directory the downstream distributor polls for finished artifacts.
    pub pickup_directory: PathBuf,
    /// Artifact extension, without the dot.
    pub extension: String,
    /// Where artifacts are built before delivery. Defaults to the system
    /// temporary directory.
    pub temp_directory: Option<PathBuf>,
    /// Content store path of the container holding publish records.
    pub records_path: String,
}

impl Default for Config {
    fn default() -> Self {
        let data = data_dir();
        Self {
            database: DatabaseConfig { path: data.join("bestpub.sqlite") },
            ingestion: IngestionConfig {
                drop_directory: data.join("incoming"),
                extension: "zip".to_string(),
                titles_path: DEFAULT_TITLES_PATH.to_string(),
                chapter_convention: ChapterConvention::default(),
                invalid_name_policy: InvalidNamePolicy::default(),
            },
            publishing: PublishingConfig {
                pickup_directory: data.join("pickup"),
                extension: "epub".to_string(),
                temp_directory: None,
                records_path: DEFAULT_RECORDS_PATH.to_string(),
            },
        }
    }
}

impl Config {
    /// Fail fast on values that would only blow up halfway through a cycle.
    pub fn validate(&self) -> Result<()> {
        absolute("database.path", &self.database.path)?;
        absolute("ingestion.drop_directory", &self.ingestion.drop_directory)?;
        extension("ingestion.extension", &self.ingestion.extension)?;
        store_path("ingestion.titles_path", &self.ingestion.titles_path)?;
        absolute("publishing.pickup_directory", &self.publishing.pickup_directory)?;
        extension("publishing.extension", &self.publishing.extension)?;
        if let Some(temp) = &self.publishing.temp_directory {
            absolute("publishing.temp_directory", temp)?;
        }
        store_path("publishing.records_path", &self.publishing.records_path)?;
        if self.publishing.records_path.trim_end_matches('/') == self.ingestion.titles_path.trim_end_matches('/') {
            exn::bail!(ErrorKind::Invalid {
                field: "publishing.records_path",
                reason: "must differ from ingestion.titles_path".to_string(),
            });
        }
        Ok(())
    }
}

fn store_path(field: &'static str, path: &str) -> Result<()> {
    let trimmed = path.trim_matches('/');
    if !path.starts_with('/') || trimmed.is_empty() || trimmed.split('/').any(str::is_empty) {
        exn::bail!(ErrorKind::Invalid { field, reason: format!("expected an absolute store path, got {path:?}") });
    }
    Ok(())
}

fn absolute(field: &'static str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || !path.is_absolute() {
        exn::bail!(ErrorKind::Invalid { field, reason: format!("expected an absolute path, got {:?}", path.display()) });
    }
    Ok(())
}

fn extension(field: &'static str, ext: &str) -> Result<()> {
    if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
        exn::bail!(ErrorKind::Invalid { field, reason: format!("expected a bare file extension, got {ext:?}") });
    }
    Ok(())
}
