//! Core types for the sierra-sync toolkit.
//!
//! This crate provides the value types used throughout sierra-sync:
//!
//! - [`to_datetime`] / [`from_datetime`] - Sierra Chart timestamp codec
//! - [`DepthRecord`] - One market-depth event from a `.depth` file
//! - [`TradeRecord`] - One trade/bar aggregate from a `.scid` file
//! - [`ContractStem`] - Canonical contract identifier used in filenames
//! - [`FallbackDays`] - Nearby-day search order used by discovery

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod contract;
mod day;
mod error;
mod record;
mod time;

pub use contract::{
    ContractStem, DEFAULT_SUFFIX, DEPTH_EXTENSION, SYNC_SUFFIX, TRADE_EXTENSION, depth_file_name,
    is_sync_output, month_code_for, stem_from_depth_name, trade_file_name,
};
pub use day::{FallbackDays, day_bounds};
pub use error::{StemError, TimeError};
pub use record::{DepthCommand, DepthRecord, Side, TradeRecord};
pub use time::{
    SC_EPOCH_OFFSET_MICROS, TimeOfDay, at_time_of_day, format_ms, from_datetime, sc_epoch,
    to_datetime,
};
