//! Create-or-append record writer.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::header::read_header;
use crate::layout::MAX_RECORD_SIZE;
use crate::{Depth, FileHeader, RecordError, RecordFormat, Trade};

const WRITE_BUFFER: usize = 1 << 20;

/// Appends records of format `F` to a file, creating it with a fresh header
/// when missing.
///
/// Existing files are validated like [`RecordFile::open`](crate::RecordFile::open)
/// and never truncated. [`close`](Self::close) flushes and syncs; dropping
/// the writer does the same on a best-effort basis.
#[derive(Debug)]
pub struct RecordWriter<F: RecordFormat> {
    path: PathBuf,
    out: Option<BufWriter<File>>,
    len: usize,
    written: usize,
    is_new: bool,
    _format: PhantomData<F>,
}

/// Writer for market-depth files.
pub type DepthWriter = RecordWriter<Depth>;

/// Writer for intraday trade files.
pub type TradeWriter = RecordWriter<Trade>;

/// Closes and removes a file this writer just created, so that no
/// headerless file is left behind.
fn discard_new(path: &Path, file: File, source: io::Error) -> RecordError {
    drop(file);
    let _ = fs::remove_file(path);
    RecordError::io(path, source)
}

impl<F: RecordFormat> RecordWriter<F> {
    /// Opens `path` for appending.
    ///
    /// A missing file is created (along with its parent directories) and
    /// receives a fresh header. An existing file must pass header and size
    /// validation, after which writes land at its end.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Format`] when an existing file fails
    /// validation, or [`RecordError::Io`] on I/O failure.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| RecordError::io(parent, source))?;
            }
        }

        let created = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path);

        let (file, len, is_new) = match created {
            Ok(mut file) => {
                let mut header = vec![0u8; F::HEADER_SIZE];
                F::encode_header(&FileHeader::fresh::<F>(), &mut header);
                if let Err(source) = file.write_all(&header) {
                    return Err(discard_new(path, file, source));
                }
                (file, 0, true)
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                let mut file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .open(path)
                    .map_err(|source| RecordError::io(path, source))?;
                let file_len = file
                    .metadata()
                    .map_err(|source| RecordError::io(path, source))?
                    .len();
                let (_, len) = read_header::<F>(&file, path, file_len)?;
                file.seek(SeekFrom::End(0))
                    .map_err(|source| RecordError::io(path, source))?;
                (file, len, false)
            }
            Err(source) => return Err(RecordError::io(path, source)),
        };

        Ok(Self {
            path: path.to_path_buf(),
            out: Some(BufWriter::with_capacity(WRITE_BUFFER, file)),
            len,
            written: 0,
            is_new,
            _format: PhantomData,
        })
    }

    /// Appends one record at the end of the file.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] if the write fails.
    pub fn append(&mut self, record: &F::Record) -> Result<(), RecordError> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        let buf = &mut buf[..F::RECORD_SIZE];
        F::encode(record, buf);

        let Some(out) = self.out.as_mut() else {
            return Err(RecordError::io(
                &self.path,
                io::Error::other("writer already closed"),
            ));
        };
        out.write_all(buf)
            .map_err(|source| RecordError::io(&self.path, source))?;
        self.len += 1;
        self.written += 1;
        Ok(())
    }

    /// Flushes buffered records and syncs the file to disk.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] if flushing or syncing fails.
    pub fn close(mut self) -> Result<(), RecordError> {
        let Some(out) = self.out.take() else {
            return Ok(());
        };
        let file = out
            .into_inner()
            .map_err(|err| RecordError::io(&self.path, err.into_error()))?;
        file.sync_all()
            .map_err(|source| RecordError::io(&self.path, source))
    }

    /// Records appended through this writer.
    #[must_use]
    pub const fn records_written(&self) -> usize {
        self.written
    }

    /// Records in the file, including those present before opening.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the file holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte offset where the next appended record lands.
    #[must_use]
    pub const fn next_offset(&self) -> u64 {
        (F::HEADER_SIZE + self.len * F::RECORD_SIZE) as u64
    }

    /// Returns true if `open` created the file.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.is_new
    }

    /// Path being written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<F: RecordFormat> Drop for RecordWriter<F> {
    fn drop(&mut self) {
        if let Some(mut out) = self.out.take() {
            let _ = out.flush();
            let _ = out.get_ref().sync_all();
        }
    }
}
