//! Passthrough export of a depth/trade pair.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use sierra_format::{
    Depth, RecordError, RecordFormat, RecordWriter, Trade, open_depth, open_trade,
};
use sierra_types::day_bounds;
use tracing::info;

use crate::SyncError;

/// Records between progress bar updates.
const PROGRESS_STEP: usize = 16 * 1024;

/// Result of copying one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyStats {
    /// Source file.
    pub source: PathBuf,
    /// Output file.
    pub output: PathBuf,
    /// Records written.
    pub records: usize,
    /// Output size in bytes, header included.
    pub bytes: u64,
    /// Wall time spent copying.
    pub elapsed: Duration,
}

impl CopyStats {
    /// Records written per second.
    #[must_use]
    pub fn records_per_sec(&self) -> f64 {
        per_sec(self.records as f64, self.elapsed)
    }

    /// Output mebibytes written per second.
    #[must_use]
    pub fn mib_per_sec(&self) -> f64 {
        per_sec(self.bytes as f64 / (1024.0 * 1024.0), self.elapsed)
    }
}

fn per_sec(amount: f64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { amount / secs } else { 0.0 }
}

/// Result of exporting a depth/trade pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Day whose trade records were kept.
    pub day: NaiveDate,
    /// Trade window start, Sierra Chart microseconds (inclusive).
    pub window_start: i64,
    /// Trade window end, Sierra Chart microseconds (exclusive).
    pub window_end: i64,
    /// Depth copy.
    pub depth: CopyStats,
    /// Trade copy.
    pub trade: CopyStats,
}

/// Source and output paths of one export.
#[derive(Debug, Clone)]
pub(crate) struct ExportJob<'a> {
    pub(crate) depth_source: &'a Path,
    pub(crate) trade_source: &'a Path,
    pub(crate) depth_output: PathBuf,
    pub(crate) trade_output: PathBuf,
    pub(crate) day: NaiveDate,
    pub(crate) progress: bool,
}

impl ExportJob<'_> {
    /// Copies every depth record, then the day's trade records.
    ///
    /// Outputs left by an earlier run are replaced. A failure during the
    /// trade copy leaves the finished depth output in place.
    pub(crate) fn run(&self) -> Result<ExportReport, SyncError> {
        for (output, source) in [
            (&self.depth_output, self.depth_source),
            (&self.trade_output, self.trade_source),
        ] {
            if same_file(output, source) {
                return Err(SyncError::OutputCollision {
                    path: output.clone(),
                });
            }
        }

        let depth = self.copy_depth()?;
        info!(
            path = %depth.output.display(),
            records = depth.records,
            bytes = depth.bytes,
            "depth export written"
        );

        let (window_start, window_end) = day_bounds(self.day);
        let trade = self.copy_trade(window_start, window_end)?;
        info!(
            path = %trade.output.display(),
            records = trade.records,
            bytes = trade.bytes,
            "trade export written"
        );

        Ok(ExportReport {
            day: self.day,
            window_start,
            window_end,
            depth,
            trade,
        })
    }

    fn copy_depth(&self) -> Result<CopyStats, SyncError> {
        let source = open_depth(self.depth_source)?;
        let bar = progress_bar(self.progress, source.len(), "depth");
        copy_records::<Depth>(
            source.iter_records(),
            self.depth_source,
            &self.depth_output,
            &bar,
        )
    }

    fn copy_trade(&self, start: i64, end: i64) -> Result<CopyStats, SyncError> {
        let source = open_trade(self.trade_source)?;
        let total = source.count_in_window(start, end)?;
        let bar = progress_bar(self.progress, total, "scid");
        copy_records::<Trade>(
            source.records_in_window(start, end)?,
            self.trade_source,
            &self.trade_output,
            &bar,
        )
    }
}

fn copy_records<F: RecordFormat>(
    records: impl Iterator<Item = Result<F::Record, RecordError>>,
    source: &Path,
    output: &Path,
    bar: &ProgressBar,
) -> Result<CopyStats, SyncError> {
    let started = Instant::now();
    remove_stale(output)?;

    let mut writer = RecordWriter::<F>::open(output)?;
    for record in records {
        writer.append(&record?)?;
        if writer.records_written().is_multiple_of(PROGRESS_STEP) {
            bar.set_position(writer.records_written() as u64);
        }
    }
    let records = writer.records_written();
    writer.close()?;
    bar.finish_with_message(format!("{records} records"));

    let bytes = fs::metadata(output)
        .map_err(|source| SyncError::Io {
            path: output.to_path_buf(),
            source,
        })?
        .len();

    Ok(CopyStats {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        records,
        bytes,
        elapsed: started.elapsed(),
    })
}

fn remove_stale(path: &Path) -> Result<(), SyncError> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "replacing previous export");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(SyncError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    matches!(
        (fs::canonicalize(a), fs::canonicalize(b)),
        (Ok(x), Ok(y)) if x == y
    )
}

fn progress_bar(enabled: bool, len: usize, label: &'static str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{prefix:>5.bold} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("=>-"));
    bar.set_style(style);
    bar.set_prefix(label);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    #[test]
    fn test_throughput_zero_elapsed() {
        let stats = CopyStats {
            source: PathBuf::from("a"),
            output: PathBuf::from("b"),
            records: 10,
            bytes: 1024 * 1024,
            elapsed: Duration::ZERO,
        };
        assert_relative_eq!(stats.records_per_sec(), 0.0);

        let stats = CopyStats {
            elapsed: Duration::from_millis(500),
            ..stats
        };
        assert_relative_eq!(stats.records_per_sec(), 20.0);
        assert_relative_eq!(stats.mib_per_sec(), 2.0);
    }

    #[test]
    fn test_same_file_through_dot_segment() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ES.scid");
        fs::write(&path, b"x").unwrap();
        let dotted = dir.path().join(".").join("ES.scid");

        assert!(same_file(&path, &dotted));
        assert!(!same_file(&path, &dir.path().join("NQ.scid")));
    }

    #[test]
    fn test_remove_stale_missing_is_ok() {
        let dir = tempdir().unwrap();
        remove_stale(&dir.path().join("none.scid")).unwrap();
    }
}
