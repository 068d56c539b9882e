use std::{io, path::PathBuf};

use pcd_parser::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("dataset directory not found: {}", .0.display())]
    DatasetNotFound(PathBuf),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("failed to access config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    ConfigFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("failed to list {}: {source}", path.display())]
    Listing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

impl AppError {
    /// Missing dataset or frame, as opposed to a corrupt or unreadable one.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::DatasetNotFound(_) => true,
            Self::Parse(e) => e.is_not_found(),
            _ => false,
        }
    }
}
