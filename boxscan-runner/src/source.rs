//! Series source — per-instrument time-series access behind a trait.
//!
//! The screener never touches the filesystem directly; it asks a
//! `SeriesSource` for decoded, normalized series. That keeps the pipeline
//! testable (tests substitute an in-memory source and count calls) and
//! confines file-handle lifetimes to this module: a handle is opened
//! immediately before decode and dropped on every exit path.

use std::fs::File;
use std::path::PathBuf;

use boxscan_core::codec::{decode_chip_stream, decode_day_stream, CodecError};
use boxscan_core::domain::{ConcentrationSample, DailyBar};
use chrono::NaiveDate;
use thiserror::Error;

use crate::layout::DataLayout;

/// Why a daily series could not be produced. Never fatal: the screener
/// absorbs every variant into "instrument does not qualify".
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("no daily-bar file for '{code}'")]
    NotFound { code: String },
    #[error("failed to open daily-bar file '{path}': {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to decode daily-bar stream: {0}")]
    Codec(#[from] CodecError),
}

/// Decoded, normalized series per instrument.
///
/// Implementations must return daily bars sorted ascending by date with
/// unique dates. Concentration series are optional by nature; `None` covers
/// both a missing file and an unreadable one.
pub trait SeriesSource: Sync {
    fn daily_bars(&self, code: &str) -> Result<Vec<DailyBar>, SeriesError>;
    fn concentration(&self, code: &str) -> Option<Vec<ConcentrationSample>>;
}

/// Filesystem-backed source over a resolved data layout.
pub struct FsSeriesSource {
    layout: DataLayout,
}

impl FsSeriesSource {
    pub fn new(layout: DataLayout) -> Self {
        Self { layout }
    }

    /// Resolve `{code}.day`, falling back to the lexicographically first
    /// directory entry matching `{code}*.day` (market-suffix variants).
    fn day_file(&self, code: &str) -> Option<PathBuf> {
        let exact = self.layout.day_dir.join(format!("{code}.day"));
        if exact.is_file() {
            return Some(exact);
        }
        let entries = std::fs::read_dir(&self.layout.day_dir).ok()?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(code) && n.ends_with(".day"))
            })
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }
}

impl SeriesSource for FsSeriesSource {
    fn daily_bars(&self, code: &str) -> Result<Vec<DailyBar>, SeriesError> {
        let path = self.day_file(code).ok_or_else(|| SeriesError::NotFound {
            code: code.to_string(),
        })?;
        let file = File::open(&path).map_err(|source| SeriesError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let bars = decode_day_stream(file)?;
        Ok(normalize_by_date(bars, |bar| bar.date))
    }

    fn concentration(&self, code: &str) -> Option<Vec<ConcentrationSample>> {
        let path = self.layout.chip_dir.join(format!("{code}.chip"));
        let file = File::open(&path).ok()?;
        let samples = decode_chip_stream(file).ok()?;
        Some(normalize_by_date(samples, |sample| sample.date))
    }
}

/// Sort ascending by date and keep the last record per date, so a corrected
/// re-download appended to the file wins over the original record.
fn normalize_by_date<T>(mut records: Vec<T>, date_of: fn(&T) -> NaiveDate) -> Vec<T> {
    records.sort_by_key(date_of);
    // Stable sort keeps input order within a date; after reversing, dedup
    // retains the first seen, which is the original last occurrence.
    records.reverse();
    records.dedup_by_key(|r| date_of(r));
    records.reverse();
    records
}
