//! Fixed-record binary I/O for Sierra Chart depth and intraday files.
//!
//! - [`RecordFile`] - validated, indexed, streaming reader
//! - [`RecordWriter`] - create-or-append writer, durable on close
//! - [`Depth`] / [`Trade`] - the two on-disk layouts
//! - windowed queries on [`RecordFile`]: [`RecordFile::lower_bound`],
//!   [`RecordFile::records_in_window`] and
//!   [`RecordFile::next_batch_at_or_after`]
//!
//! # Example
//!
//! ```no_run
//! use sierra_format::open_trade;
//!
//! let file = open_trade("ESU25_FUT_CME.scid")?;
//! for record in file.records_in_window(0, i64::MAX)? {
//!     println!("{:?}", record?);
//! }
//! # Ok::<(), sierra_format::RecordError>(())
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod header;
mod layout;
mod reader;
mod window;
mod writer;

pub use error::{FormatError, RecordError};
pub use header::FileHeader;
pub use layout::{Depth, RecordFormat, Trade};
pub use reader::{DepthFile, RecordFile, Records, TradeFile, open_depth, open_trade};
pub use window::Window;
pub use writer::{DepthWriter, RecordWriter, TradeWriter};
