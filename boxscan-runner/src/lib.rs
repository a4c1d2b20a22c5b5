//! Boxscan Runner — scan orchestration on top of `boxscan-core`.
//!
//! This crate provides:
//! - Scan configuration with TOML loading and deterministic fingerprints
//! - The instrument profile repository (the one fatal dependency of a run)
//! - Filesystem series sources over the binary data directories
//! - The 8-stage screening pipeline with a rayon fan-out
//! - CSV/JSON result export

pub mod basics;
pub mod config;
pub mod export;
pub mod layout;
pub mod result;
pub mod screener;
pub mod source;

pub use basics::{BasicInfoRepository, CsvBasicInfo, RepoError};
pub use config::{ConfigError, ScanConfig, ScanId};
pub use export::{export_report_json, export_results_csv, save_artifacts};
pub use layout::DataLayout;
pub use result::ScreeningResult;
pub use screener::{run_scan, Rejection, ScanError, ScanReport};
pub use source::{FsSeriesSource, SeriesError, SeriesSource};
