//! Fixture utilities for sierra-sync benchmarks.

use chrono::NaiveDate;
use sierra_lib::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A synthetic `.scid` file living in its own temporary directory.
#[derive(Debug)]
pub struct TradeFixture {
    dir: TempDir,
    path: PathBuf,
    /// First timestamp written.
    pub first: i64,
    /// Spacing between consecutive records in microseconds.
    pub step: i64,
    /// Number of records written.
    pub len: usize,
}

impl TradeFixture {
    /// Writes `len` records spaced `step` microseconds apart, starting at
    /// midnight UTC of `day`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written.
    pub fn generate(day: NaiveDate, len: usize, step: i64) -> Result<Self, RecordError> {
        let dir = TempDir::new().map_err(|source| RecordError::Io {
            path: PathBuf::from("<tempdir>"),
            source,
        })?;
        let path = dir.path().join("BENCH_FUT_CME.scid");
        let (first, _) = day_bounds(day);

        let mut writer = TradeWriter::open(&path)?;
        let mut timestamp = first;
        for i in 0..len {
            let price = 6000.0 + (i % 64) as f32 * 0.25;
            writer.append(&TradeRecord {
                timestamp,
                open: 0.0,
                high: price + 0.25,
                low: price,
                close: price,
                num_trades: 1,
                total_volume: 1 + (i % 7) as u32,
                bid_volume: 0,
                ask_volume: 1 + (i % 7) as u32,
            })?;
            timestamp += step;
        }
        writer.close()?;

        Ok(Self {
            dir,
            path,
            first,
            step,
            len,
        })
    }

    /// Path of the generated file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the file.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Timestamp of the record at `fraction` (0.0 to 1.0) through the file.
    #[must_use]
    pub fn timestamp_at_fraction(&self, fraction: f64) -> i64 {
        let index = (self.len as f64 * fraction.clamp(0.0, 1.0)) as i64;
        self.first + index * self.step
    }
}

/// Counts records in `[start, end)` by reading every record.
///
/// # Errors
///
/// Returns an error if any record cannot be read.
pub fn linear_count(file: &TradeFile, start: i64, end: i64) -> Result<usize, RecordError> {
    let mut count = 0;
    for record in file.iter_records() {
        let ts = record?.timestamp;
        if ts >= start && ts < end {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_count_matches_window() {
        let day = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
        let fixture = TradeFixture::generate(day, 1_000, 1_000).unwrap();
        let file = open_trade(fixture.path()).unwrap();

        let start = fixture.timestamp_at_fraction(0.25);
        let end = fixture.timestamp_at_fraction(0.5);
        assert_eq!(linear_count(&file, start, end).unwrap(), 250);
        assert_eq!(file.count_in_window(start, end).unwrap(), 250);
    }
}
