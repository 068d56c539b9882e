use std::{io, path::PathBuf};

use thiserror::Error;

/// The file's content does not follow the point cloud header/payload convention.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("header ended before the DATA line")]
    MissingDataLine,
    #[error("malformed header at line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },
    #[error("header has no {0} entry")]
    MissingHeaderEntry(&'static str),
    #[error("FIELDS does not contain '{0}'")]
    MissingField(&'static str),
    #[error("{entry} lists {actual} values but FIELDS lists {expected}")]
    FieldListMismatch {
        entry: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("unsupported DATA encoding '{0}'")]
    UnsupportedEncoding(String),
    #[error("unsupported storage for field '{field}': TYPE {kind} SIZE {size}")]
    UnsupportedFieldType {
        field: String,
        kind: char,
        size: usize,
    },
    #[error("binary payload truncated: expected {expected} bytes, found {actual}")]
    TruncatedPayload { expected: usize, actual: usize },
    #[error("invalid record at line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },
}

/// Failure while decoding from an arbitrary reader.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Failure while decoding a file, carrying the file's path.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("point cloud file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed point cloud file {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

impl ParseError {
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub fn from_read(path: impl Into<PathBuf>, error: ReadError) -> Self {
        match error {
            ReadError::Io(source) => Self::from_io(path, source),
            ReadError::Format(source) => Self::Format {
                path: path.into(),
                source,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound { path } | Self::Io { path, .. } | Self::Format { path, .. } => path,
        }
    }
}
