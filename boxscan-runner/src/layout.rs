//! Data directory layout — resolving where the binary files live.
//!
//! Path discovery is configuration resolution, not pipeline work: the CLI
//! probes candidate installation roots once and hands the pipeline a
//! resolved layout. The conventional tree under an installation root is:
//!
//! ```text
//! <root>/T0002/dsmarket/            per-instrument .day files
//! <root>/T0002/chip/                per-instrument .chip files (optional)
//! <root>/T0002/hq_cache/stock_basic.csv
//! ```

use std::path::{Path, PathBuf};

/// Resolved locations of the three data inputs.
#[derive(Debug, Clone)]
pub struct DataLayout {
    /// Directory of per-instrument daily-bar files.
    pub day_dir: PathBuf,
    /// Directory of per-instrument concentration files.
    pub chip_dir: PathBuf,
    /// Instrument profile table.
    pub basics_path: PathBuf,
}

impl DataLayout {
    /// Layout under a conventional installation root.
    pub fn from_root(root: &Path) -> Self {
        let t0002 = root.join("T0002");
        Self {
            day_dir: t0002.join("dsmarket"),
            chip_dir: t0002.join("chip"),
            basics_path: t0002.join("hq_cache").join("stock_basic.csv"),
        }
    }

    /// Probe candidate roots in order; the first with a daily-bar directory
    /// wins. Returns `None` when no candidate qualifies.
    pub fn discover<'a>(candidates: impl IntoIterator<Item = &'a Path>) -> Option<Self> {
        candidates
            .into_iter()
            .map(Self::from_root)
            .find(|layout| layout.day_dir.is_dir())
    }
}
