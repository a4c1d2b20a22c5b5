//! Concentration record codec (.chip files).
//!
//! Each record is 48 bytes. The core reads two fields: the date (u32,
//! literal YYYYMMDD, offset 0) and the 70% concentration (f32, percentage,
//! offset 24). All other bytes are reserved and ignored.

use std::io::Read;

use crate::codec::{decode_yyyymmdd, encode_yyyymmdd, f32_at, read_record, u32_at, CodecError};
use crate::domain::ConcentrationSample;

/// Fixed width of one concentration record.
pub const CHIP_RECORD_LEN: usize = 48;

const CONCENTRATION_OFFSET: usize = 24;

/// Decode a stream of 48-byte concentration records.
///
/// Same contract as the daily-bar decoder: a truncated tail chunk is
/// dropped, an invalid date skips the record, input order is preserved.
pub fn decode_chip_stream<R: Read>(mut reader: R) -> Result<Vec<ConcentrationSample>, CodecError> {
    let mut samples = Vec::new();
    let mut buf = [0u8; CHIP_RECORD_LEN];
    loop {
        let n = read_record(&mut reader, &mut buf)?;
        if n < CHIP_RECORD_LEN {
            break;
        }
        let Some(date) = decode_yyyymmdd(u32_at(&buf, 0)) else {
            continue;
        };
        samples.push(ConcentrationSample {
            date,
            concentration70: f64::from(f32_at(&buf, CONCENTRATION_OFFSET)),
        });
    }
    Ok(samples)
}

/// Encode one sample as a 48-byte record. Reserved bytes are zeroed.
pub fn encode_chip_record(sample: &ConcentrationSample) -> [u8; CHIP_RECORD_LEN] {
    let mut buf = [0u8; CHIP_RECORD_LEN];
    buf[0..4].copy_from_slice(&encode_yyyymmdd(sample.date).to_le_bytes());
    let concentration = sample.concentration70 as f32;
    buf[CONCENTRATION_OFFSET..CONCENTRATION_OFFSET + 4]
        .copy_from_slice(&concentration.to_le_bytes());
    buf
}
