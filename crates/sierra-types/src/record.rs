//! Decoded depth and trade records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TimeError, to_datetime};

/// Order book side touched by a depth command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Bid side.
    Bid,
    /// Ask side.
    Ask,
}

impl Side {
    /// Returns the side as a lowercase string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bid => "bid",
            Self::Ask => "ask",
        }
    }
}

/// Market depth command carried by a [`DepthRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DepthCommand {
    /// Clear the whole book; starts a new snapshot batch.
    ClearBook = 1,
    /// Add a bid level.
    AddBid = 2,
    /// Add an ask level.
    AddAsk = 3,
    /// Modify a bid level.
    ModifyBid = 4,
    /// Modify an ask level.
    ModifyAsk = 5,
    /// Delete a bid level.
    DeleteBid = 6,
    /// Delete an ask level.
    DeleteAsk = 7,
}

impl DepthCommand {
    /// Returns the short tag used in tabular output (`CLR`, `AB`, ...).
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::ClearBook => "CLR",
            Self::AddBid => "AB",
            Self::AddAsk => "AA",
            Self::ModifyBid => "MB",
            Self::ModifyAsk => "MA",
            Self::DeleteBid => "DB",
            Self::DeleteAsk => "DA",
        }
    }

    /// Returns the book side this command applies to, if any.
    #[must_use]
    pub const fn side(&self) -> Option<Side> {
        match self {
            Self::ClearBook => None,
            Self::AddBid | Self::ModifyBid | Self::DeleteBid => Some(Side::Bid),
            Self::AddAsk | Self::ModifyAsk | Self::DeleteAsk => Some(Side::Ask),
        }
    }
}

impl TryFrom<u8> for DepthCommand {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::ClearBook),
            2 => Ok(Self::AddBid),
            3 => Ok(Self::AddAsk),
            4 => Ok(Self::ModifyBid),
            5 => Ok(Self::ModifyAsk),
            6 => Ok(Self::DeleteBid),
            7 => Ok(Self::DeleteAsk),
            other => Err(other),
        }
    }
}

impl From<DepthCommand> for u8 {
    fn from(command: DepthCommand) -> Self {
        command as Self
    }
}

/// One market-depth event from a `.depth` file.
///
/// The command byte is stored verbatim so that a record with an unknown
/// code survives a copy unchanged; use [`DepthRecord::command`] for the
/// typed view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRecord {
    /// Microseconds since 1899-12-30 UTC.
    pub timestamp: i64,
    /// Raw command code (1-7).
    pub command: u8,
    /// Flag bits; see [`DepthRecord::END_OF_BATCH`].
    pub flags: u8,
    /// Number of orders at the level.
    pub num_orders: u16,
    /// Price level.
    pub price: f32,
    /// Quantity at the level.
    pub quantity: u32,
    /// Unused padding written as zero by the platform.
    pub reserved: u32,
}

impl DepthRecord {
    /// Flag bit marking the last record of a batch.
    pub const END_OF_BATCH: u8 = 0x01;

    /// Creates a depth record with zero reserved field.
    #[must_use]
    pub fn new(
        timestamp: i64,
        command: DepthCommand,
        flags: u8,
        num_orders: u16,
        price: f32,
        quantity: u32,
    ) -> Self {
        Self {
            timestamp,
            command: command.into(),
            flags,
            num_orders,
            price,
            quantity,
            reserved: 0,
        }
    }

    /// Returns the typed command, or `None` for an unknown code.
    #[must_use]
    pub fn command(&self) -> Option<DepthCommand> {
        DepthCommand::try_from(self.command).ok()
    }

    /// Returns true if this record is a clear-book event.
    #[must_use]
    pub fn is_clear_book(&self) -> bool {
        self.command() == Some(DepthCommand::ClearBook)
    }

    /// Returns true if this record closes a batch.
    #[must_use]
    pub const fn is_end_of_batch(&self) -> bool {
        self.flags & Self::END_OF_BATCH != 0
    }

    /// Returns the timestamp as a UTC datetime.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp is outside the representable range.
    pub fn datetime(&self) -> Result<DateTime<Utc>, TimeError> {
        to_datetime(self.timestamp)
    }
}

/// One trade/bar aggregate from a `.scid` file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Microseconds since 1899-12-30 UTC.
    pub timestamp: i64,
    /// Open price.
    pub open: f32,
    /// High price (ask for single-trade records).
    pub high: f32,
    /// Low price (bid for single-trade records).
    pub low: f32,
    /// Close price (trade price for single-trade records).
    pub close: f32,
    /// Number of trades aggregated.
    pub num_trades: u32,
    /// Total traded volume.
    pub total_volume: u32,
    /// Volume traded at the bid.
    pub bid_volume: u32,
    /// Volume traded at the ask.
    pub ask_volume: u32,
}

impl TradeRecord {
    /// Returns the timestamp as a UTC datetime.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp is outside the representable range.
    pub fn datetime(&self) -> Result<DateTime<Utc>, TimeError> {
        to_datetime(self.timestamp)
    }
}
