//! CLI error type.

use std::path::PathBuf;

use tabula::TableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error(transparent)]
    Table(#[from] TableError),
}
