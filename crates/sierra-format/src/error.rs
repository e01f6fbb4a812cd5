//! Error types for record file I/O.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The file on disk does not match the compiled layout.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The file is shorter than the header.
    #[error("{}: {len} bytes is too small for the {expected}-byte {format} header", .path.display())]
    TooSmall {
        /// The offending file.
        path: PathBuf,
        /// Format name.
        format: &'static str,
        /// Actual file length.
        len: u64,
        /// Header size of the format.
        expected: usize,
    },

    /// The magic bytes do not identify this format.
    #[error("{}: bad {format} magic \"{}\" (expected \"{}\")", .path.display(), .found.escape_ascii(), .expected.escape_ascii())]
    BadMagic {
        /// The offending file.
        path: PathBuf,
        /// Format name.
        format: &'static str,
        /// Magic read from the file.
        found: [u8; 4],
        /// Magic of the format.
        expected: [u8; 4],
    },

    /// The header declares a header size other than the compiled one.
    #[error("{}: unexpected {format} header size {found} (expected {expected})", .path.display())]
    HeaderSize {
        /// The offending file.
        path: PathBuf,
        /// Format name.
        format: &'static str,
        /// Declared header size.
        found: u32,
        /// Compiled header size.
        expected: usize,
    },

    /// The header declares a record size other than the compiled one.
    #[error("{}: unexpected {format} record size {found} (expected {expected})", .path.display())]
    RecordSize {
        /// The offending file.
        path: PathBuf,
        /// Format name.
        format: &'static str,
        /// Declared record size.
        found: u32,
        /// Compiled record size.
        expected: usize,
    },

    /// The data region ends in a partial record.
    #[error(
        "{}: {format} data region of {data_len} bytes is not a multiple of {record_size}; partial record at offset {offset}",
        .path.display()
    )]
    Truncated {
        /// The offending file.
        path: PathBuf,
        /// Format name.
        format: &'static str,
        /// Bytes after the header.
        data_len: u64,
        /// Record size of the format.
        record_size: usize,
        /// Byte offset where the partial record starts.
        offset: u64,
    },
}

/// Errors raised while reading or writing record files.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The file failed header or size validation.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A record index beyond the record count was requested.
    #[error("{}: record index {index} out of range ({len} records)", .path.display())]
    OutOfRange {
        /// The file being read.
        path: PathBuf,
        /// Requested index.
        index: usize,
        /// Number of records in the file.
        len: usize,
    },

    /// An I/O operation failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl RecordError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true if this is a layout/validation failure.
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}
