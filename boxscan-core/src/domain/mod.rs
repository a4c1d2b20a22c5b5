//! Domain types shared across the codec, indicator, and screening layers.

pub mod bar;
pub mod concentration;
pub mod profile;

pub use bar::DailyBar;
pub use concentration::ConcentrationSample;
pub use profile::InstrumentProfile;
