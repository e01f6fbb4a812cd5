//! Sierra Chart market depth and intraday file toolkit.
//!
//! This is a facade crate that re-exports functionality from the sierra-sync
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```no_run
//! use sierra_lib::prelude::*;
//!
//! let day = chrono::NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
//! let (start, end) = day_bounds(day);
//!
//! let trades = open_trade(r"C:\SierraChart\Data\ESU25_FUT_CME.scid")?;
//! for record in trades.records_in_window(start, end)? {
//!     let record = record?;
//!     println!("{} {}", format_ms(record.timestamp), record.close);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use sierra_types::*;

// Re-export record file I/O
pub use sierra_format::{
    Depth, DepthFile, DepthWriter, FileHeader, FormatError, RecordError, RecordFile, RecordFormat,
    RecordWriter, Records, Trade, TradeFile, TradeWriter, Window, open_depth, open_trade,
};

// Re-export discovery
#[cfg(feature = "discovery")]
pub use sierra_discovery::{
    DiscoveredCandidate, DiscoveryError, candidates_for, choose_best, discover, infer_suffix,
    synthesize_stem,
};

// Re-export the sync pipeline
#[cfg(feature = "sync")]
pub use sierra_sync::{
    ConfigError, CopyStats, ENV_DEPTH_ROOT, ENV_SCID_ROOT, ExportReport, MissingRoot,
    SyncConfig, SyncError, SyncMode, SyncOutcome, SyncPipeline, SyncPlan, SyncRequest, SyncState,
    run_sync,
};

/// Prelude module for convenient imports.
///
/// ```
/// use sierra_lib::prelude::*;
/// ```
pub mod prelude {
    pub use sierra_types::{
        ContractStem, DepthCommand, DepthRecord, Side, TimeOfDay, TradeRecord, at_time_of_day,
        day_bounds, format_ms, from_datetime, to_datetime,
    };

    pub use sierra_format::{
        DepthFile, DepthWriter, RecordError, TradeFile, TradeWriter, open_depth, open_trade,
    };

    #[cfg(feature = "discovery")]
    pub use sierra_discovery::{DiscoveredCandidate, choose_best, discover};

    #[cfg(feature = "sync")]
    pub use sierra_sync::{SyncConfig, SyncError, SyncOutcome, SyncPipeline, SyncRequest, run_sync};
}
