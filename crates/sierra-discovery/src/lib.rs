//! Depth/trade pair discovery.
//!
//! - [`discover`] - candidates for a symbol and day, with nearby-day fallback
//! - [`choose_best`] - deterministic candidate selection
//! - [`synthesize_stem`] - the stem a symbol's front file is expected to use

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod candidate;
mod error;
mod scan;
mod suffix;

pub use candidate::{DiscoveredCandidate, choose_best};
pub use error::DiscoveryError;
pub use scan::{candidates_for, discover};
pub use suffix::{infer_suffix, synthesize_stem};
