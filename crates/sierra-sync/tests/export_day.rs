//! Export of a real depth/trade pair through the full pipeline.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use sierra_format::{DepthWriter, TradeWriter, open_depth, open_trade};
use sierra_sync::{SyncConfig, SyncPipeline, SyncRequest, SyncState, run_sync};
use sierra_types::{DepthCommand, DepthRecord, TradeRecord, day_bounds};
use tempfile::tempdir;
use tracing::Dispatch;

const MICROS_PER_HOUR: i64 = 3_600_000_000;

fn trade(timestamp: i64, price: f32) -> TradeRecord {
    TradeRecord {
        timestamp,
        open: 0.0,
        high: price,
        low: price,
        close: price,
        num_trades: 1,
        total_volume: 3,
        bid_volume: 1,
        ask_volume: 2,
    }
}

fn setup(scid_root: &Path, depth_root: &Path, day: NaiveDate) -> (Vec<DepthRecord>, Vec<i64>) {
    let (start, end) = day_bounds(day);

    let depth = vec![
        DepthRecord::new(start - 5, DepthCommand::ClearBook, 0, 0, 0.0, 0),
        DepthRecord::new(start - 5, DepthCommand::AddBid, 0, 4, 6000.25, 12),
        DepthRecord::new(start - 5, DepthCommand::AddAsk, 1, 3, 6000.50, 9),
        DepthRecord::new(start + MICROS_PER_HOUR, DepthCommand::ModifyBid, 1, 5, 6000.25, 15),
        DepthRecord::new(end + 10, DepthCommand::DeleteAsk, 1, 0, 6000.50, 0),
    ];
    let mut writer = DepthWriter::open(depth_root.join("ESU25_FUT_CME.2025-09-15.depth")).unwrap();
    for record in &depth {
        writer.append(record).unwrap();
    }
    writer.close().unwrap();

    let stamps = [
        start - MICROS_PER_HOUR,
        start - 1,
        start,
        start + MICROS_PER_HOUR,
        end - 1,
        end,
        end + MICROS_PER_HOUR,
    ];
    let mut writer = TradeWriter::open(scid_root.join("ESU25_FUT_CME.scid")).unwrap();
    for (i, &ts) in stamps.iter().enumerate() {
        writer.append(&trade(ts, 6000.0 + i as f32)).unwrap();
    }
    writer.close().unwrap();

    (depth, vec![start, start + MICROS_PER_HOUR, end - 1])
}

#[test]
fn test_export_keeps_only_the_days_trades() {
    let scid = tempdir().unwrap();
    let depth = tempdir().unwrap();
    let day = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
    let (depth_records, expected_stamps) = setup(scid.path(), depth.path(), day);

    let config = SyncConfig::new(scid.path(), depth.path());
    let request = SyncRequest::new("ES", day).export();
    let mut pipeline = SyncPipeline::new(&config);
    let outcome = pipeline.run(&request).unwrap();
    assert_eq!(pipeline.state(), SyncState::Done);

    let report = outcome.report().unwrap();
    assert_eq!(report.depth.records, depth_records.len());
    assert_eq!(report.trade.records, expected_stamps.len());
    assert_eq!(report.trade.bytes, 56 + 40 * expected_stamps.len() as u64);

    let depth_out = depth.path().join("ESU25_FUT_CME-SYNC.2025-09-15.depth");
    let copied: Vec<DepthRecord> = open_depth(&depth_out)
        .unwrap()
        .iter_records()
        .map(Result::unwrap)
        .collect();
    assert_eq!(copied, depth_records);

    let source_bytes = fs::read(depth.path().join("ESU25_FUT_CME.2025-09-15.depth")).unwrap();
    assert_eq!(fs::read(&depth_out).unwrap(), source_bytes);

    let (start, end) = day_bounds(day);
    let trades = open_trade(scid.path().join("ESU25_FUT_CME-SYNC.scid")).unwrap();
    let stamps: Vec<i64> = trades
        .iter_records()
        .map(|r| r.unwrap().timestamp)
        .collect();
    assert_eq!(stamps, expected_stamps);
    assert!(stamps.iter().all(|&ts| start <= ts && ts < end));
    assert_eq!(trades.check_sorted().unwrap(), None);
}

#[test]
fn test_export_rerun_replaces_outputs() {
    let scid = tempdir().unwrap();
    let depth = tempdir().unwrap();
    let day = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
    let (depth_records, expected_stamps) = setup(scid.path(), depth.path(), day);

    let config = SyncConfig::new(scid.path(), depth.path());
    let request = SyncRequest::new("ES", day).export();
    assert_eq!(run_sync(&config, &request, &Dispatch::none()), 0);

    // The first run's outputs sit in the scanned roots; they must not be picked up.
    let outcome = SyncPipeline::new(&config).run(&request).unwrap();
    let plan = outcome.plan();
    assert_eq!(plan.candidates.len(), 1);
    assert_eq!(plan.chosen.stem, "ESU25_FUT_CME");
    assert_eq!(plan.out_stem, "ESU25_FUT_CME-SYNC");

    let depth_out = open_depth(depth.path().join("ESU25_FUT_CME-SYNC.2025-09-15.depth")).unwrap();
    assert_eq!(depth_out.len(), depth_records.len());
    let trade_out = open_trade(scid.path().join("ESU25_FUT_CME-SYNC.scid")).unwrap();
    assert_eq!(trade_out.len(), expected_stamps.len());

    let names = |root: &Path| -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    };
    assert_eq!(
        names(depth.path()),
        ["ESU25_FUT_CME-SYNC.2025-09-15.depth", "ESU25_FUT_CME.2025-09-15.depth"]
    );
    assert_eq!(names(scid.path()), ["ESU25_FUT_CME-SYNC.scid", "ESU25_FUT_CME.scid"]);
}

#[test]
fn test_export_with_torn_trade_source_keeps_depth_output() {
    let scid = tempdir().unwrap();
    let depth = tempdir().unwrap();
    let day = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
    setup(scid.path(), depth.path(), day);

    let trade_path = scid.path().join("ESU25_FUT_CME.scid");
    let mut bytes = fs::read(&trade_path).unwrap();
    bytes.extend_from_slice(&[0u8; 7]);
    fs::write(&trade_path, bytes).unwrap();

    let config = SyncConfig::new(scid.path(), depth.path());
    let request = SyncRequest::new("ES", day).export();
    assert_eq!(run_sync(&config, &request, &Dispatch::none()), 1);

    assert!(
        depth
            .path()
            .join("ESU25_FUT_CME-SYNC.2025-09-15.depth")
            .is_file()
    );
    assert!(!scid.path().join("ESU25_FUT_CME-SYNC.scid").exists());
}
