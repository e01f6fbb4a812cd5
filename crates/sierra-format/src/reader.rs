//! Validated, indexed reader over a record file.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::header::read_header;
use crate::layout::TIMESTAMP_SIZE;
use crate::{Depth, FileHeader, RecordError, RecordFormat, Trade};

/// Records decoded per buffered read.
const CHUNK_RECORDS: usize = 4096;

/// An open, validated record file of format `F`.
///
/// The header is read and checked once at open; the record count is fixed at
/// that point. Reads go through `&File`, so any number of iterators can be
/// live over one handle: each refill seeks to its own offset first.
#[derive(Debug)]
pub struct RecordFile<F: RecordFormat> {
    path: PathBuf,
    file: File,
    header: FileHeader,
    len: usize,
    _format: PhantomData<F>,
}

/// Reader over a market-depth file.
pub type DepthFile = RecordFile<Depth>;

/// Reader over an intraday trade file.
pub type TradeFile = RecordFile<Trade>;

/// Opens and validates a depth file.
///
/// # Errors
///
/// See [`RecordFile::open`].
pub fn open_depth(path: impl AsRef<Path>) -> Result<DepthFile, RecordError> {
    RecordFile::open(path)
}

/// Opens and validates an intraday trade file.
///
/// # Errors
///
/// See [`RecordFile::open`].
pub fn open_trade(path: impl AsRef<Path>) -> Result<TradeFile, RecordError> {
    RecordFile::open(path)
}

impl<F: RecordFormat> RecordFile<F> {
    /// Opens `path` and validates its header and size.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Format`] when the file is smaller than the
    /// header, the magic or declared sizes differ from the layout of `F`, or
    /// the data region ends in a partial record. I/O failures are returned as
    /// [`RecordError::Io`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RecordError::io(path, source))?;
        let file_len = file
            .metadata()
            .map_err(|source| RecordError::io(path, source))?
            .len();
        let (header, len) = read_header::<F>(&file, path, file_len)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
            len,
            _format: PhantomData,
        })
    }

    /// Number of complete records after the header.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the file holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The validated header.
    #[must_use]
    pub const fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Path the file was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decodes the record at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::OutOfRange`] when `index >= len()`.
    pub fn record_at(&self, index: usize) -> Result<F::Record, RecordError> {
        self.check_index(index)?;
        let mut buf = [0u8; crate::layout::MAX_RECORD_SIZE];
        let buf = &mut buf[..F::RECORD_SIZE];
        self.read_at(Self::offset_of(index), buf)?;
        Ok(F::decode(buf))
    }

    /// Reads only the timestamp of the record at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::OutOfRange`] when `index >= len()`.
    pub fn timestamp_at(&self, index: usize) -> Result<i64, RecordError> {
        self.check_index(index)?;
        let mut buf = [0u8; TIMESTAMP_SIZE];
        self.read_at(Self::offset_of(index), &mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Iterates every record in file order.
    #[must_use]
    pub fn iter_records(&self) -> Records<'_, F> {
        self.records_from(0)
    }

    /// Iterates records starting at `index` (clamped to `len()`).
    #[must_use]
    pub fn records_from(&self, index: usize) -> Records<'_, F> {
        Records {
            source: self,
            next: index.min(self.len),
            buf: Vec::new(),
            cursor: 0,
            failed: false,
        }
    }

    const fn offset_of(index: usize) -> u64 {
        (F::HEADER_SIZE + index * F::RECORD_SIZE) as u64
    }

    fn check_index(&self, index: usize) -> Result<(), RecordError> {
        if index >= self.len {
            return Err(RecordError::OutOfRange {
                path: self.path.clone(),
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), RecordError> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.read_exact(buf))
            .map_err(|source| RecordError::io(&self.path, source))
    }
}

/// Lazy iterator over the records of a [`RecordFile`].
///
/// Reads in chunks of a few thousand records. An I/O error is yielded once,
/// after which the iterator is exhausted.
#[derive(Debug)]
pub struct Records<'a, F: RecordFormat> {
    source: &'a RecordFile<F>,
    next: usize,
    buf: Vec<u8>,
    cursor: usize,
    failed: bool,
}

impl<F: RecordFormat> Records<'_, F> {
    /// Index of the record the next call to `next` yields.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.next
    }

    fn refill(&mut self) -> Result<(), RecordError> {
        let count = (self.source.len - self.next).min(CHUNK_RECORDS);
        self.buf.resize(count * F::RECORD_SIZE, 0);
        self.cursor = 0;
        self.source
            .read_at(RecordFile::<F>::offset_of(self.next), &mut self.buf)
    }
}

impl<F: RecordFormat> Iterator for Records<'_, F> {
    type Item = Result<F::Record, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next >= self.source.len {
            return None;
        }
        if self.cursor >= self.buf.len() {
            if let Err(err) = self.refill() {
                self.failed = true;
                return Some(Err(err));
            }
        }

        let end = self.cursor + F::RECORD_SIZE;
        let record = F::decode(&self.buf[self.cursor..end]);
        self.cursor = end;
        self.next += 1;
        Some(Ok(record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.source.len - self.next;
        (remaining, Some(remaining))
    }
}

impl<F: RecordFormat> FusedIterator for Records<'_, F> {}
