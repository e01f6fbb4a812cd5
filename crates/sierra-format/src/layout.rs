//! On-disk layouts of the depth and intraday formats.
//!
//! Both formats are little-endian and every record begins with the 8-byte
//! timestamp, which lets the windowed queries probe it without decoding the
//! rest of the record.

use byteorder::{ByteOrder, LittleEndian};
use sierra_types::{DepthRecord, TradeRecord};

use crate::FileHeader;

/// Upper bound on `RECORD_SIZE` across formats, used for stack buffers.
pub(crate) const MAX_RECORD_SIZE: usize = 64;

/// Size of the timestamp field at the start of every record.
pub(crate) const TIMESTAMP_SIZE: usize = 8;

/// A fixed-record binary file layout.
pub trait RecordFormat {
    /// Decoded record type.
    type Record: Copy + std::fmt::Debug;

    /// Short format name used in error messages.
    const NAME: &'static str;
    /// Magic bytes at offset 0.
    const MAGIC: [u8; 4];
    /// Compiled header size.
    const HEADER_SIZE: usize;
    /// Compiled record size.
    const RECORD_SIZE: usize;

    /// Decodes a header from exactly `HEADER_SIZE` bytes.
    fn decode_header(buf: &[u8]) -> FileHeader;

    /// Encodes a header into exactly `HEADER_SIZE` zeroed bytes.
    fn encode_header(header: &FileHeader, out: &mut [u8]);

    /// Decodes a record from exactly `RECORD_SIZE` bytes.
    fn decode(buf: &[u8]) -> Self::Record;

    /// Encodes a record into exactly `RECORD_SIZE` bytes.
    fn encode(record: &Self::Record, out: &mut [u8]);

    /// Returns the record's timestamp.
    fn timestamp(record: &Self::Record) -> i64;
}

fn magic(buf: &[u8]) -> [u8; 4] {
    [buf[0], buf[1], buf[2], buf[3]]
}

/// Market depth layout (`.depth`).
///
/// Header (64 bytes): magic `SCDD`, `u32` header size, `u32` record size,
/// `u32` version, 48 reserved bytes.
///
/// Record (24 bytes): `u64` timestamp, `u8` command, `u8` flags,
/// `u16` number of orders, `f32` price, `u32` quantity, `u32` reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth;

impl RecordFormat for Depth {
    type Record = DepthRecord;

    const NAME: &'static str = "depth";
    const MAGIC: [u8; 4] = *b"SCDD";
    const HEADER_SIZE: usize = 64;
    const RECORD_SIZE: usize = 24;

    fn decode_header(buf: &[u8]) -> FileHeader {
        FileHeader {
            magic: magic(buf),
            header_size: LittleEndian::read_u32(&buf[4..8]),
            record_size: LittleEndian::read_u32(&buf[8..12]),
            version: LittleEndian::read_u32(&buf[12..16]),
            utc_start_index: 0,
        }
    }

    fn encode_header(header: &FileHeader, out: &mut [u8]) {
        out[0..4].copy_from_slice(&header.magic);
        LittleEndian::write_u32(&mut out[4..8], header.header_size);
        LittleEndian::write_u32(&mut out[8..12], header.record_size);
        LittleEndian::write_u32(&mut out[12..16], header.version);
    }

    #[inline]
    fn decode(buf: &[u8]) -> DepthRecord {
        DepthRecord {
            timestamp: LittleEndian::read_i64(&buf[0..8]),
            command: buf[8],
            flags: buf[9],
            num_orders: LittleEndian::read_u16(&buf[10..12]),
            price: LittleEndian::read_f32(&buf[12..16]),
            quantity: LittleEndian::read_u32(&buf[16..20]),
            reserved: LittleEndian::read_u32(&buf[20..24]),
        }
    }

    #[inline]
    fn encode(record: &DepthRecord, out: &mut [u8]) {
        LittleEndian::write_i64(&mut out[0..8], record.timestamp);
        out[8] = record.command;
        out[9] = record.flags;
        LittleEndian::write_u16(&mut out[10..12], record.num_orders);
        LittleEndian::write_f32(&mut out[12..16], record.price);
        LittleEndian::write_u32(&mut out[16..20], record.quantity);
        LittleEndian::write_u32(&mut out[20..24], record.reserved);
    }

    fn timestamp(record: &DepthRecord) -> i64 {
        record.timestamp
    }
}

/// Intraday trade layout (`.scid`).
///
/// Header (56 bytes): magic `SCID`, `u32` header size, `u32` record size,
/// `u16` version, `u16` unused, `u32` UTC start index, 36 reserved bytes.
///
/// Record (40 bytes): `u64` timestamp, `f32` open/high/low/close,
/// `u32` trades/total volume/bid volume/ask volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade;

impl RecordFormat for Trade {
    type Record = TradeRecord;

    const NAME: &'static str = "scid";
    const MAGIC: [u8; 4] = *b"SCID";
    const HEADER_SIZE: usize = 56;
    const RECORD_SIZE: usize = 40;

    fn decode_header(buf: &[u8]) -> FileHeader {
        FileHeader {
            magic: magic(buf),
            header_size: LittleEndian::read_u32(&buf[4..8]),
            record_size: LittleEndian::read_u32(&buf[8..12]),
            version: u32::from(LittleEndian::read_u16(&buf[12..14])),
            utc_start_index: LittleEndian::read_u32(&buf[16..20]),
        }
    }

    fn encode_header(header: &FileHeader, out: &mut [u8]) {
        out[0..4].copy_from_slice(&header.magic);
        LittleEndian::write_u32(&mut out[4..8], header.header_size);
        LittleEndian::write_u32(&mut out[8..12], header.record_size);
        LittleEndian::write_u16(&mut out[12..14], header.version as u16);
        LittleEndian::write_u32(&mut out[16..20], header.utc_start_index);
    }

    #[inline]
    fn decode(buf: &[u8]) -> TradeRecord {
        TradeRecord {
            timestamp: LittleEndian::read_i64(&buf[0..8]),
            open: LittleEndian::read_f32(&buf[8..12]),
            high: LittleEndian::read_f32(&buf[12..16]),
            low: LittleEndian::read_f32(&buf[16..20]),
            close: LittleEndian::read_f32(&buf[20..24]),
            num_trades: LittleEndian::read_u32(&buf[24..28]),
            total_volume: LittleEndian::read_u32(&buf[28..32]),
            bid_volume: LittleEndian::read_u32(&buf[32..36]),
            ask_volume: LittleEndian::read_u32(&buf[36..40]),
        }
    }

    #[inline]
    fn encode(record: &TradeRecord, out: &mut [u8]) {
        LittleEndian::write_i64(&mut out[0..8], record.timestamp);
        LittleEndian::write_f32(&mut out[8..12], record.open);
        LittleEndian::write_f32(&mut out[12..16], record.high);
        LittleEndian::write_f32(&mut out[16..20], record.low);
        LittleEndian::write_f32(&mut out[20..24], record.close);
        LittleEndian::write_u32(&mut out[24..28], record.num_trades);
        LittleEndian::write_u32(&mut out[28..32], record.total_volume);
        LittleEndian::write_u32(&mut out[32..36], record.bid_volume);
        LittleEndian::write_u32(&mut out[36..40], record.ask_volume);
    }

    fn timestamp(record: &TradeRecord) -> i64 {
        record.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sierra_types::DepthCommand;

    fn depth_bytes(ts: u64, cmd: u8, flags: u8, orders: u16, price: f32, qty: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; 24];
        LittleEndian::write_u64(&mut bytes[0..8], ts);
        bytes[8] = cmd;
        bytes[9] = flags;
        LittleEndian::write_u16(&mut bytes[10..12], orders);
        LittleEndian::write_f32(&mut bytes[12..16], price);
        LittleEndian::write_u32(&mut bytes[16..20], qty);
        bytes
    }

    #[test]
    fn test_decode_depth_record() {
        let bytes = depth_bytes(123_456_789, 2, 0, 3, 5000.25, 10);
        let record = Depth::decode(&bytes);

        assert_eq!(record.timestamp, 123_456_789);
        assert_eq!(record.command(), Some(DepthCommand::AddBid));
        assert_eq!(record.num_orders, 3);
        assert_relative_eq!(record.price, 5000.25);
        assert_eq!(record.quantity, 10);
        assert_eq!(record.reserved, 0);
    }

    #[test]
    fn test_encode_depth_matches_layout() {
        let record = DepthRecord::new(123_456_999, DepthCommand::AddAsk, 1, 2, 5000.5, 7);
        let mut out = vec![0u8; Depth::RECORD_SIZE];
        Depth::encode(&record, &mut out);
        assert_eq!(out, depth_bytes(123_456_999, 3, 1, 2, 5000.5, 7));
    }

    #[test]
    fn test_trade_field_offsets() {
        let record = TradeRecord {
            timestamp: 3_967_000_000_000_000,
            open: 0.0,
            high: 6001.0,
            low: 6000.75,
            close: 6000.75,
            num_trades: 1,
            total_volume: 4,
            bid_volume: 4,
            ask_volume: 0,
        };
        let mut out = vec![0u8; Trade::RECORD_SIZE];
        Trade::encode(&record, &mut out);

        assert_eq!(LittleEndian::read_i64(&out[0..8]), 3_967_000_000_000_000);
        assert_relative_eq!(LittleEndian::read_f32(&out[12..16]), 6001.0);
        assert_eq!(LittleEndian::read_u32(&out[28..32]), 4);
        assert_eq!(Trade::decode(&out), record);
    }

    #[test]
    fn test_record_sizes_fit_stack_buffer() {
        assert!(Depth::RECORD_SIZE <= MAX_RECORD_SIZE);
        assert!(Trade::RECORD_SIZE <= MAX_RECORD_SIZE);
        assert!(TIMESTAMP_SIZE <= Depth::RECORD_SIZE);
    }
}
