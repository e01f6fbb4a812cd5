//! Time-windowed queries over ascending-timestamp record files.
//!
//! Every query assumes timestamps are non-decreasing in file order. Lookups
//! probe only the 8-byte timestamp field, so locating a window costs
//! `O(log n)` small reads regardless of file size.

use std::iter::FusedIterator;

use sierra_types::DepthRecord;

use crate::{Depth, RecordError, RecordFile, RecordFormat, Records};

impl<F: RecordFormat> RecordFile<F> {
    /// Returns the smallest index whose timestamp is `>= target`.
    ///
    /// Returns `len()` when every record is older than `target`, and 0 for an
    /// empty file.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] if a probe read fails.
    pub fn lower_bound(&self, target: i64) -> Result<usize, RecordError> {
        let (mut lo, mut hi) = (0, self.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.timestamp_at(mid)? < target {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }

    /// Iterates records with `start <= timestamp < end`.
    ///
    /// The iterator is empty when `start >= end`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] if locating the window fails.
    pub fn records_in_window(&self, start: i64, end: i64) -> Result<Window<'_, F>, RecordError> {
        if start >= end {
            return Ok(Window {
                records: self.records_from(self.len()),
                end,
                done: true,
            });
        }
        let first = self.lower_bound(start)?;
        Ok(Window {
            records: self.records_from(first),
            end,
            done: false,
        })
    }

    /// Counts records with `start <= timestamp < end` without decoding them.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] if a probe read fails.
    pub fn count_in_window(&self, start: i64, end: i64) -> Result<usize, RecordError> {
        if start >= end {
            return Ok(0);
        }
        Ok(self.lower_bound(end)? - self.lower_bound(start)?)
    }

    /// Scans the whole file for the first record older than its predecessor.
    ///
    /// Returns `None` when timestamps are non-decreasing throughout.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] if a read fails.
    pub fn check_sorted(&self) -> Result<Option<usize>, RecordError> {
        let mut previous = i64::MIN;
        for (index, record) in self.iter_records().enumerate() {
            let ts = F::timestamp(&record?);
            if ts < previous {
                return Ok(Some(index));
            }
            previous = ts;
        }
        Ok(None)
    }
}

impl RecordFile<Depth> {
    /// Returns the first full book batch at or after `at`.
    ///
    /// The batch starts at the first clear-book record with timestamp
    /// `>= at` and runs through the first record carrying the end-of-batch
    /// flag. A batch still open at end of file is returned as read. Empty
    /// when no clear-book record follows `at`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] if a read fails.
    pub fn next_batch_at_or_after(&self, at: i64) -> Result<Vec<DepthRecord>, RecordError> {
        let first = self.lower_bound(at)?;
        let mut batch = Vec::new();
        for record in self.records_from(first) {
            let record = record?;
            if batch.is_empty() && !record.is_clear_book() {
                continue;
            }
            let closes = record.is_end_of_batch();
            batch.push(record);
            if closes {
                break;
            }
        }
        Ok(batch)
    }
}

/// Iterator over the records of a half-open time window.
///
/// Created by [`RecordFile::records_in_window`].
#[derive(Debug)]
pub struct Window<'a, F: RecordFormat> {
    records: Records<'a, F>,
    end: i64,
    done: bool,
}

impl<F: RecordFormat> Iterator for Window<'_, F> {
    type Item = Result<F::Record, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.records.next() {
            Some(Ok(record)) if F::timestamp(&record) < self.end => Some(Ok(record)),
            Some(Err(err)) => {
                self.done = true;
                Some(Err(err))
            }
            _ => {
                self.done = true;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, self.records.size_hint().1)
        }
    }
}

impl<F: RecordFormat> FusedIterator for Window<'_, F> {}
