//! File header shared by both formats.

use std::io::Read;
use std::path::Path;

use crate::{FormatError, RecordError, RecordFormat};

/// Decoded file header.
///
/// Both formats start with a 4-byte magic followed by the header and record
/// sizes as little-endian `u32`; the remaining fields differ slightly and are
/// normalized here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Format identifier (`SCDD` or `SCID`).
    pub magic: [u8; 4],
    /// Declared header size in bytes.
    pub header_size: u32,
    /// Declared record size in bytes.
    pub record_size: u32,
    /// Layout version (stored as `u16` in intraday files).
    pub version: u32,
    /// Intraday files only; always zero for depth files.
    pub utc_start_index: u32,
}

impl FileHeader {
    /// Version written into freshly created files.
    pub const CURRENT_VERSION: u32 = 1;

    /// Returns the header written when creating a new file of format `F`.
    #[must_use]
    pub const fn fresh<F: RecordFormat>() -> Self {
        Self {
            magic: F::MAGIC,
            header_size: F::HEADER_SIZE as u32,
            record_size: F::RECORD_SIZE as u32,
            version: Self::CURRENT_VERSION,
            utc_start_index: 0,
        }
    }

    /// Checks the header against the compiled layout of `F`.
    ///
    /// # Errors
    ///
    /// Returns an error on magic, header size or record size mismatch.
    pub fn validate<F: RecordFormat>(&self, path: &Path) -> Result<(), FormatError> {
        if self.magic != F::MAGIC {
            return Err(FormatError::BadMagic {
                path: path.to_path_buf(),
                format: F::NAME,
                found: self.magic,
                expected: F::MAGIC,
            });
        }
        if self.header_size as usize != F::HEADER_SIZE {
            return Err(FormatError::HeaderSize {
                path: path.to_path_buf(),
                format: F::NAME,
                found: self.header_size,
                expected: F::HEADER_SIZE,
            });
        }
        if self.record_size as usize != F::RECORD_SIZE {
            return Err(FormatError::RecordSize {
                path: path.to_path_buf(),
                format: F::NAME,
                found: self.record_size,
                expected: F::RECORD_SIZE,
            });
        }
        Ok(())
    }
}

/// Reads and validates the header of an open file of `file_len` bytes.
///
/// Reads exactly `F::HEADER_SIZE` bytes from `reader`, which must be
/// positioned at the start of the file. Returns the header and the number of
/// complete records that follow it.
pub(crate) fn read_header<F: RecordFormat>(
    mut reader: impl Read,
    path: &Path,
    file_len: u64,
) -> Result<(FileHeader, usize), RecordError> {
    if file_len < F::HEADER_SIZE as u64 {
        return Err(FormatError::TooSmall {
            path: path.to_path_buf(),
            format: F::NAME,
            len: file_len,
            expected: F::HEADER_SIZE,
        }
        .into());
    }

    let mut buf = vec![0u8; F::HEADER_SIZE];
    reader
        .read_exact(&mut buf)
        .map_err(|source| RecordError::io(path, source))?;
    let header = F::decode_header(&buf);
    header.validate::<F>(path)?;

    let data_len = file_len - F::HEADER_SIZE as u64;
    let record_size = F::RECORD_SIZE as u64;
    if !data_len.is_multiple_of(record_size) {
        return Err(FormatError::Truncated {
            path: path.to_path_buf(),
            format: F::NAME,
            data_len,
            record_size: F::RECORD_SIZE,
            offset: F::HEADER_SIZE as u64 + data_len / record_size * record_size,
        }
        .into());
    }

    Ok((header, (data_len / record_size) as usize))
}
