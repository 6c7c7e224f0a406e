//! Layered configuration for bestpub.
//!
//! Values are merged, last one wins, from:
//! 1. built-in defaults (paths under the platform data directory),
//! 2. `bestpub.toml`, `bestpub.yaml` and `bestpub.json` in the platform
//!    config directory, or a single explicitly given file,
//! 3. `BESTPUB_`-prefixed environment variables, nested with `__`
//!    (`BESTPUB_INGESTION__DROP_DIRECTORY=/srv/drop`).

pub mod error;
mod load;
mod settings;

pub use crate::load::{default_files, figment, load};
pub use crate::settings::{Config, DatabaseConfig, IngestionConfig, InvalidNamePolicy, PublishingConfig};
pub use bestpub_model::ChapterConvention;
