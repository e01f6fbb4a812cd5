//! Depth/trade sync pipeline for Sierra Chart data.
//!
//! - [`SyncConfig`] - storage roots, loaded from defaults, environment and TOML
//! - [`SyncPipeline`] - validate, discover, select, then report or export
//! - [`run_sync`] - one-call entry point returning a process exit code
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use sierra_sync::{SyncConfig, SyncRequest, run_sync};
//! use tracing::Dispatch;
//!
//! let config = SyncConfig::load(None)?;
//! let day = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
//! let request = SyncRequest::new("ES", day).export();
//! let code = run_sync(&config, &request, &Dispatch::none());
//! # Ok::<(), sierra_sync::ConfigError>(())
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod export;
mod pipeline;

pub use config::{ConfigError, ENV_DEPTH_ROOT, ENV_SCID_ROOT, SyncConfig};
pub use error::{MissingRoot, SyncError};
pub use export::{CopyStats, ExportReport};
pub use pipeline::{
    SyncMode, SyncOutcome, SyncPipeline, SyncPlan, SyncRequest, SyncState, run_sync,
};
pub use sierra_types::SYNC_SUFFIX;
