//! Boxscan Core — domain types, binary record codecs, and the indicator engine.
//!
//! This crate contains everything the screener computes with, and nothing it
//! orchestrates with:
//! - Domain types (daily bars, concentration samples, instrument profiles)
//! - Fixed-record binary codecs for the two proprietary on-disk formats
//! - Pure indicator functions (moving average, box breakout, volume growth,
//!   turnover rate, MA-break test)
//!
//! All indicator functions are pure: no I/O, no shared mutable state. File
//! access and the filter chain live in `boxscan-runner`.

pub mod codec;
pub mod domain;
pub mod indicators;
