//! Sync pipeline errors and exit-code mapping.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use sierra_discovery::DiscoveryError;
use sierra_format::RecordError;
use thiserror::Error;

/// A configured storage root that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRoot {
    /// Configuration key, `scid_root` or `depth_root`.
    pub name: &'static str,
    /// Configured path.
    pub path: PathBuf,
}

impl fmt::Display for MissingRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.path.display())
    }
}

fn join_roots(roots: &[MissingRoot]) -> String {
    roots
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reasons a sync run fails.
#[derive(Error, Debug)]
pub enum SyncError {
    /// One or more storage roots do not exist.
    #[error("missing storage root: {}", join_roots(.0))]
    RootMissing(Vec<MissingRoot>),

    /// No depth files were found on or near the requested day.
    #[error("no depth files for {symbol} on or near {day} (expected e.g. {expected})")]
    NoCandidates {
        /// Requested symbol.
        symbol: String,
        /// Requested day.
        day: NaiveDate,
        /// Depth filename the symbol's front contract would use.
        expected: String,
    },

    /// The requested stem is not among the candidates.
    #[error("stem {stem} not found among candidates: {}", .candidates.join(", "))]
    StemNotFound {
        /// Requested stem.
        stem: String,
        /// Stems that were discovered.
        candidates: Vec<String>,
    },

    /// The chosen candidate has no trade file.
    #[error("trade file missing for {stem}: expected {}", .expected.display())]
    MissingPair {
        /// Chosen stem.
        stem: String,
        /// Path the trade file was expected at.
        expected: PathBuf,
    },

    /// The chosen depth file disappeared before export.
    #[error("depth file missing: {}", .path.display())]
    MissingDepth {
        /// Depth file path.
        path: PathBuf,
    },

    /// An export output would overwrite its own source.
    #[error("output {} is the source file; choose another output stem", .path.display())]
    OutputCollision {
        /// Offending path.
        path: PathBuf,
    },

    /// Reading or writing a record file failed.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Scanning a storage root failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// A filesystem operation outside record I/O failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Process exit code for this failure.
    ///
    /// `2` missing root, `3` missing trade file, `4` missing depth file, no
    /// candidates or unknown stem, `1` anything else.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::RootMissing(_) => 2,
            Self::MissingPair { .. } => 3,
            Self::MissingDepth { .. } | Self::NoCandidates { .. } | Self::StemNotFound { .. } => 4,
            Self::OutputCollision { .. }
            | Self::Record(_)
            | Self::Discovery(_)
            | Self::Io { .. } => 1,
        }
    }
}
