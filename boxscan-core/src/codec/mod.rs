//! Fixed-record binary codecs for the two proprietary on-disk formats.
//!
//! Both formats share a shape: a fixed record width, little-endian u32
//! integral fields, and (in the concentration format) one IEEE-754 f32.
//! Decoding reads fixed-width chunks until the stream is exhausted; a
//! truncated tail chunk is dropped so corruption at the end of a file never
//! prevents use of the valid prefix.
//!
//! Decoders return records in input order. Sorting and de-duplication are
//! the caller's responsibility (the file format carries no ordering
//! guarantee).

pub mod chip;
pub mod day;

pub use chip::{decode_chip_stream, encode_chip_record, CHIP_RECORD_LEN};
pub use day::{decode_day_stream, encode_day_record, DAY_RECORD_LEN};

use thiserror::Error;

/// Errors from the codec layer.
///
/// A short read at end-of-stream is not an error (the partial chunk is
/// discarded); only genuine I/O failures surface here.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("i/o error while decoding record stream: {0}")]
    Io(#[from] std::io::Error),
}

/// Read one fixed-width record into `buf`.
///
/// Returns the number of bytes read: `buf.len()` for a complete record,
/// less at end-of-stream. Interrupted reads are retried.
pub(crate) fn read_record<R: std::io::Read>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<usize, CodecError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CodecError::Io(e)),
        }
    }
    Ok(filled)
}

/// Little-endian u32 at `offset` within a record buffer.
pub(crate) fn u32_at(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

/// Little-endian f32 at `offset` within a record buffer.
pub(crate) fn f32_at(buf: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

/// Decode a literal YYYYMMDD integer into a calendar date.
///
/// Returns `None` for values that are not valid dates; callers treat such
/// records as corrupt and skip them.
pub(crate) fn decode_yyyymmdd(raw: u32) -> Option<chrono::NaiveDate> {
    let year = (raw / 10_000) as i32;
    let month = (raw / 100) % 100;
    let day = raw % 100;
    chrono::NaiveDate::from_ymd_opt(year, month, day)
}

/// Encode a calendar date as a literal YYYYMMDD integer.
pub(crate) fn encode_yyyymmdd(date: chrono::NaiveDate) -> u32 {
    use chrono::Datelike;
    date.year() as u32 * 10_000 + date.month() * 100 + date.day()
}
