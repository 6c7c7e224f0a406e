//! Command Line Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open the content store")]
    Database,
    #[display("invalid ISBN: {_0}")]
    InvalidIsbn(#[error(not(source))] String),
    #[display("ingestion failed")]
    Ingest,
    #[display("publishing failed")]
    Publish,
    #[display("title {_0} has not been imported")]
    UnknownTitle(#[error(not(source))] String),
    #[display("could not read title status")]
    Status,
    #[display("could not write output")]
    Output,
}
