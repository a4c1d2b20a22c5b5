//! Daily-bar record codec (.day files).
//!
//! Each record is 32 bytes, little-endian:
//!
//! | offset | field  | type | scale  |
//! |--------|--------|------|--------|
//! | 0      | date   | u32  | literal YYYYMMDD |
//! | 4      | open   | u32  | /100   |
//! | 8      | high   | u32  | /100   |
//! | 12     | low    | u32  | /100   |
//! | 16     | close  | u32  | /100   |
//! | 20     | volume | u32  | lots   |
//! | 24     | amount | u32  | /100   |
//! | 28     | (reserved, 4 bytes)   |
//!
//! No header, no footer, no length prefix; end-of-file is end-of-series.

use std::io::Read;

use crate::codec::{decode_yyyymmdd, encode_yyyymmdd, read_record, u32_at, CodecError};
use crate::domain::DailyBar;

/// Fixed width of one daily-bar record.
pub const DAY_RECORD_LEN: usize = 32;

const PRICE_SCALE: f64 = 100.0;

/// Decode a stream of 32-byte daily-bar records.
///
/// Reads until the stream is exhausted. A truncated tail chunk is dropped
/// and a record whose date field is not a valid calendar date is skipped;
/// neither terminates the decode. Records are returned in input order.
pub fn decode_day_stream<R: Read>(mut reader: R) -> Result<Vec<DailyBar>, CodecError> {
    let mut bars = Vec::new();
    let mut buf = [0u8; DAY_RECORD_LEN];
    loop {
        let n = read_record(&mut reader, &mut buf)?;
        if n < DAY_RECORD_LEN {
            break;
        }
        let Some(date) = decode_yyyymmdd(u32_at(&buf, 0)) else {
            continue;
        };
        bars.push(DailyBar {
            date,
            open: f64::from(u32_at(&buf, 4)) / PRICE_SCALE,
            high: f64::from(u32_at(&buf, 8)) / PRICE_SCALE,
            low: f64::from(u32_at(&buf, 12)) / PRICE_SCALE,
            close: f64::from(u32_at(&buf, 16)) / PRICE_SCALE,
            volume: u64::from(u32_at(&buf, 20)),
            amount: f64::from(u32_at(&buf, 24)) / PRICE_SCALE,
        });
    }
    Ok(bars)
}

/// Encode one bar as a 32-byte record. Reserved bytes are zeroed.
///
/// Prices are converted back to fixed-point hundredths with rounding, so a
/// round trip is exact to 0.01.
pub fn encode_day_record(bar: &DailyBar) -> [u8; DAY_RECORD_LEN] {
    let mut buf = [0u8; DAY_RECORD_LEN];
    let put = |buf: &mut [u8; DAY_RECORD_LEN], offset: usize, value: u32| {
        buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    };
    put(&mut buf, 0, encode_yyyymmdd(bar.date));
    put(&mut buf, 4, (bar.open * PRICE_SCALE).round() as u32);
    put(&mut buf, 8, (bar.high * PRICE_SCALE).round() as u32);
    put(&mut buf, 12, (bar.low * PRICE_SCALE).round() as u32);
    put(&mut buf, 16, (bar.close * PRICE_SCALE).round() as u32);
    put(&mut buf, 20, bar.volume as u32);
    put(&mut buf, 24, (bar.amount * PRICE_SCALE).round() as u32);
    buf
}
