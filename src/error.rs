// Error taxonomy for extraction and comparison.
//
// Extraction errors are fatal for the package being analyzed. Class parse
// failures live in `classfile` and never reach this level: a bad class is
// skipped and counted. Comparison errors name the input that was invalid.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort the extraction of one package. No analysis file is
/// written when any of these is returned.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("archive is corrupt or unreadable: {location}")]
    ArchiveCorrupt {
        location: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to read {location}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read or write cached artifact {}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl ExtractError {
    pub(crate) fn corrupt(location: impl Into<String>, source: zip::result::ZipError) -> Self {
        Self::ArchiveCorrupt {
            location: location.into(),
            source,
        }
    }
}

/// Which side of a pairwise comparison an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Errors raised while comparing two packages.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error(
        "embedding dimension mismatch for `{field}` ({left} vs {right}); \
         the cached embedding is stale or from another model, delete it and re-run extract"
    )]
    DimensionMismatch {
        field: &'static str,
        left: usize,
        right: usize,
    },

    #[error("{side} input {} is invalid: {reason}", path.display())]
    InvalidInput {
        side: Side,
        path: PathBuf,
        reason: String,
    },

    #[error("invalid similarity configuration: {0}")]
    InvalidConfig(String),
}
