//! Discovery errors.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while scanning storage roots.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// A directory listing or metadata lookup failed.
    #[error("cannot scan {}: {source}", .path.display())]
    Io {
        /// Directory or file being inspected.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl DiscoveryError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
