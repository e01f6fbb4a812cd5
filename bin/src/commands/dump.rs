//! Dump command implementation.
//!
//! Resolves the symbol's depth/trade pair the same way `sync` does, then
//! renders a window (or a depth snapshot) on the requested UTC day.

use crate::display::{DumpKind, depth_markdown, trade_markdown, write_or_print};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Serialize;
use sierra_lib::prelude::*;
use sierra_lib::{DiscoveredCandidate, SyncConfig};
use std::path::Path;
use std::process::ExitCode;

/// What part of the day to dump.
#[derive(Clone, Copy, Debug)]
pub(crate) enum View {
    /// `[start, end)` on the requested day.
    Window(TimeOfDay, TimeOfDay),
    /// The first full book batch at or after the given time.
    Snapshot(TimeOfDay),
}

#[derive(Serialize)]
struct DumpRows {
    stem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    depth: Option<Vec<DepthRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scid: Option<Vec<TradeRecord>>,
}

/// Dump records for `symbol` on `date`.
pub(crate) fn dump(
    config: &SyncConfig,
    kind: DumpKind,
    symbol: &str,
    date: NaiveDate,
    view: View,
    out: Option<&Path>,
    json: bool,
) -> Result<ExitCode> {
    let candidates = discover(
        &config.scid_root,
        &config.depth_root,
        symbol,
        date,
        config.fallback_window_days,
    )
    .context("Failed to discover files")?;
    let Some(chosen) = choose_best(&candidates) else {
        eprintln!("No candidates discovered for {symbol} on/near {date}.");
        return Ok(ExitCode::from(4));
    };

    let rows = match view {
        View::Snapshot(at) => {
            if kind != DumpKind::Depth {
                bail!("--snapshot-at is only supported for depth dumps");
            }
            let file = open_depth(&chosen.depth_file)?;
            let batch = file.next_batch_at_or_after(at_time_of_day(date, at))?;
            DumpRows {
                stem: chosen.stem.clone(),
                depth: Some(batch),
                scid: None,
            }
        }
        View::Window(start, end) => {
            let (start, end) = (at_time_of_day(date, start), at_time_of_day(date, end));
            window_rows(chosen, kind, start, end)?
        }
    };

    let text = if json {
        let mut text = serde_json::to_string_pretty(&rows)?;
        text.push('\n');
        text
    } else {
        render(&rows, view, date)
    };
    write_or_print(&text, out)?;
    Ok(ExitCode::SUCCESS)
}

fn window_rows(
    chosen: &DiscoveredCandidate,
    kind: DumpKind,
    start: i64,
    end: i64,
) -> Result<DumpRows> {
    let depth = if kind.wants_depth() {
        let file = open_depth(&chosen.depth_file)?;
        Some(file.records_in_window(start, end)?.collect::<Result<Vec<_>, _>>()?)
    } else {
        None
    };

    let scid = if kind.wants_trades() {
        let Some(path) = &chosen.trade_file else {
            bail!("No trade file for {}", chosen.stem);
        };
        let file = open_trade(path)?;
        Some(file.records_in_window(start, end)?.collect::<Result<Vec<_>, _>>()?)
    } else {
        None
    };

    Ok(DumpRows {
        stem: chosen.stem.clone(),
        depth,
        scid,
    })
}

fn render(rows: &DumpRows, view: View, date: NaiveDate) -> String {
    let mut out = match view {
        View::Window(start, end) => format!("# {} {date} {start}-{end} UTC\n\n", rows.stem),
        View::Snapshot(at) => format!("# {} {date} snapshot at/after {at} UTC\n\n", rows.stem),
    };
    if let Some(depth) = &rows.depth {
        out.push_str("## Depth\n\n");
        out.push_str(&depth_markdown(depth));
        out.push('\n');
    }
    if let Some(scid) = &rows.scid {
        out.push_str("## SCID\n\n");
        out.push_str(&trade_markdown(scid));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_window_dump_to_file() {
        let scid = tempdir().unwrap();
        let depth = tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
        let (start, _) = day_bounds(date);

        let mut writer =
            DepthWriter::open(depth.path().join("ESU25_FUT_CME.2025-09-15.depth")).unwrap();
        writer
            .append(&DepthRecord::new(start + 1_000, DepthCommand::ClearBook, 0, 0, 0.0, 0))
            .unwrap();
        writer
            .append(&DepthRecord::new(start + 2_000, DepthCommand::AddBid, 1, 2, 6000.25, 4))
            .unwrap();
        writer.close().unwrap();

        let config = SyncConfig::new(scid.path(), depth.path());
        let out = scid.path().join("dump.md");
        let view = View::Window(
            TimeOfDay::from_hms_milli(0, 0, 0, 0).unwrap(),
            TimeOfDay::from_hms_milli(0, 0, 1, 0).unwrap(),
        );
        dump(&config, DumpKind::Depth, "ES", date, view, Some(&out), false).unwrap();

        let text = std::fs::read_to_string(out).unwrap();
        assert!(text.starts_with("# ESU25_FUT_CME 2025-09-15 00:00:00.000-00:00:01.000 UTC"));
        assert!(text.contains("| 00:00:00.002 | AB | bid | 6000.25000 | 4 | EOB |"));
    }

    #[test]
    fn test_snapshot_rejects_trade_dump() {
        let scid = tempdir().unwrap();
        let depth = tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
        DepthWriter::open(depth.path().join("ESU25_FUT_CME.2025-09-15.depth"))
            .unwrap()
            .close()
            .unwrap();

        let config = SyncConfig::new(scid.path(), depth.path());
        let view = View::Snapshot(TimeOfDay::from_hms_milli(9, 30, 0, 0).unwrap());
        assert!(dump(&config, DumpKind::Scid, "ES", date, view, None, false).is_err());
    }
}
