//! Screening pipeline — per-instrument filter chain over the universe.
//!
//! Stage order is fixed so candidates drop out as cheaply as possible: the
//! static market-cap filter runs before any file is opened, and each later
//! stage short-circuits the instrument. Every stage is a pure predicate, so
//! ordering only affects cost, never final membership.
//!
//! Instruments are independent after the static filter, so the per-file
//! work fans out across a rayon pool; results are collected back in
//! universe order, keeping output deterministic regardless of completion
//! order.

use std::collections::BTreeMap;

use boxscan_core::domain::InstrumentProfile;
use boxscan_core::indicators::{
    box_upper, breakout, ma_break, moving_average, turnover_rate_pct, volume_growth_ratio,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, ScanConfig};
use crate::result::{round2, ScreeningResult};
use crate::source::SeriesSource;

/// Fatal scan errors. Everything per-instrument is absorbed into a
/// [`Rejection`] instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("repository error: {0}")]
    Repository(#[from] crate::basics::RepoError),
}

/// Which stage eliminated an instrument.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Rejection {
    /// Circulating market cap above the configured limit.
    CapExceeded,
    /// Daily-bar file absent or unreadable.
    NoSeries,
    /// Target date not present in the daily series.
    TargetDateAbsent,
    /// Target date is the first entry; no previous-volume reference.
    NoPriorBar,
    /// At least one configured moving average undefined at the target date.
    IncompleteMa,
    /// Volume growth ratio below threshold.
    LowVolumeGrowth,
    /// Turnover rate below threshold.
    LowTurnover,
    /// No concentration sample for the target date (or no file at all).
    NoConcentration,
    /// Concentration sample below threshold.
    LowConcentration,
    /// Fewer trailing bars than the box window requires.
    InsufficientBoxWindow,
    /// Close did not clear the box upper edge by the margin.
    NoBoxBreakout,
    /// Close did not stand above the configured moving averages.
    NoMaBreakout,
}

/// Outcome of a full scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: String,
    pub config: ScanConfig,
    pub universe_size: usize,
    /// Candidates surviving the static cap filter (stage 1).
    pub candidates: usize,
    /// Surviving instruments, in universe order.
    pub results: Vec<ScreeningResult>,
    /// How many instruments each stage eliminated.
    pub rejections: BTreeMap<Rejection, usize>,
}

/// Run the full screening pipeline over a universe of profiles.
///
/// Only a config problem aborts the scan here; the caller has already
/// loaded the profile table (whose failure is the other fatal path). The
/// returned report is deterministic for identical inputs.
pub fn run_scan(
    config: &ScanConfig,
    profiles: &[InstrumentProfile],
    source: &dyn SeriesSource,
) -> Result<ScanReport, ScanError> {
    config.validate()?;

    let mut rejections: BTreeMap<Rejection, usize> = BTreeMap::new();

    // Stage 1: static cap filter. Profile table only, no file I/O.
    let candidates: Vec<&InstrumentProfile> = profiles
        .iter()
        .filter(|p| {
            if p.circulating_market_cap > config.market_cap_limit {
                *rejections.entry(Rejection::CapExceeded).or_insert(0) += 1;
                false
            } else {
                true
            }
        })
        .collect();
    let candidate_count = candidates.len();

    // Stages 2-8 fan out per instrument; collect preserves input order.
    let outcomes: Vec<Result<ScreeningResult, Rejection>> = candidates
        .par_iter()
        .map(|profile| screen_instrument(profile, config, source))
        .collect();

    let mut results = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(rejection) => *rejections.entry(rejection).or_insert(0) += 1,
        }
    }

    Ok(ScanReport {
        scan_id: config.scan_id(),
        config: config.clone(),
        universe_size: profiles.len(),
        candidates: candidate_count,
        results,
        rejections,
    })
}

/// Stages 2-8 for one instrument. The first failing stage wins.
fn screen_instrument(
    profile: &InstrumentProfile,
    config: &ScanConfig,
    source: &dyn SeriesSource,
) -> Result<ScreeningResult, Rejection> {
    // Stage 2: series availability.
    let bars = source
        .daily_bars(&profile.code)
        .map_err(|_| Rejection::NoSeries)?;
    let target_idx = bars
        .binary_search_by_key(&config.target_date, |bar| bar.date)
        .map_err(|_| Rejection::TargetDateAbsent)?;
    if target_idx == 0 {
        return Err(Rejection::NoPriorBar);
    }
    let target = &bars[target_idx];

    // Stage 3: moving-average completeness.
    let mut ma_values = BTreeMap::new();
    for &period in &config.ma_periods {
        let series = moving_average(&bars, period);
        let value = series[target_idx];
        if value.is_nan() {
            return Err(Rejection::IncompleteMa);
        }
        ma_values.insert(period, value);
    }

    // Stage 4: volume growth against the previous trading bar.
    let prev_volume = bars[target_idx - 1].volume;
    let growth = volume_growth_ratio(target.volume, prev_volume);
    if growth < config.volume_growth_ratio {
        return Err(Rejection::LowVolumeGrowth);
    }

    // Stage 5: turnover rate.
    let turnover = turnover_rate_pct(target.volume, profile.circulating_shares);
    if turnover < config.turnover_rate_pct {
        return Err(Rejection::LowTurnover);
    }

    // Stage 6: concentration. Missing file and missing sample are the same
    // exclusion, not an error.
    let concentration = source
        .concentration(&profile.code)
        .and_then(|samples| {
            samples
                .binary_search_by_key(&config.target_date, |s| s.date)
                .ok()
                .map(|i| samples[i].concentration70)
        })
        .ok_or(Rejection::NoConcentration)?;
    if concentration < config.concentration_pct {
        return Err(Rejection::LowConcentration);
    }

    // Stage 7: box breakout.
    let upper = box_upper(&bars, config.target_date, config.box_days)
        .map_err(|_| Rejection::InsufficientBoxWindow)?;
    let box_result = breakout(target.close, upper, config.breakout_margin);
    if !box_result.broke {
        return Err(Rejection::NoBoxBreakout);
    }

    // Stage 8: moving-average breakout.
    if !ma_break(target.close, &ma_values, config.ma_break_mode) {
        return Err(Rejection::NoMaBreakout);
    }

    Ok(ScreeningResult {
        code: profile.code.clone(),
        name: profile.name.clone(),
        circulating_market_cap: round2(profile.circulating_market_cap),
        close: round2(target.close),
        ma_values: ma_values.into_iter().map(|(p, v)| (p, round2(v))).collect(),
        volume_growth_pct: round2((growth - 1.0) * 100.0),
        turnover_rate_pct: round2(turnover),
        concentration70: round2(concentration),
        box_upper: round2(upper),
        breakout_ratio_pct: round2(box_result.ratio_pct),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxscan_core::domain::{ConcentrationSample, DailyBar};
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::source::SeriesError;

    /// In-memory source that counts decode requests.
    struct MemSource {
        daily: HashMap<String, Vec<DailyBar>>,
        chips: HashMap<String, Vec<ConcentrationSample>>,
        daily_calls: AtomicUsize,
    }

    impl MemSource {
        fn new() -> Self {
            Self {
                daily: HashMap::new(),
                chips: HashMap::new(),
                daily_calls: AtomicUsize::new(0),
            }
        }
    }

    impl SeriesSource for MemSource {
        fn daily_bars(&self, code: &str) -> Result<Vec<DailyBar>, SeriesError> {
            self.daily_calls.fetch_add(1, Ordering::SeqCst);
            self.daily
                .get(code)
                .cloned()
                .ok_or_else(|| SeriesError::NotFound {
                    code: code.to_string(),
                })
        }

        fn concentration(&self, code: &str) -> Option<Vec<ConcentrationSample>> {
            self.chips.get(code).cloned()
        }
    }

    fn target_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 30).unwrap()
    }

    /// `len` bars ending at the target date; all closes `base` except the
    /// final one, with the final volume given.
    fn series(len: usize, base: f64, last_close: f64, prev_vol: u64, last_vol: u64) -> Vec<DailyBar> {
        (0..len)
            .map(|i| {
                let close = if i == len - 1 { last_close } else { base };
                let volume = if i == len - 1 {
                    last_vol
                } else if i == len - 2 {
                    prev_vol
                } else {
                    1000
                };
                DailyBar {
                    date: target_date() - chrono::Duration::days((len - 1 - i) as i64),
                    open: close,
                    high: close + 0.1,
                    low: close - 0.1,
                    close,
                    volume,
                    amount: close * volume as f64 * 100.0,
                }
            })
            .collect()
    }

    fn chip_at_target(concentration70: f64) -> Vec<ConcentrationSample> {
        vec![ConcentrationSample {
            date: target_date(),
            concentration70,
        }]
    }

    fn profile(code: &str, cap: f64) -> InstrumentProfile {
        InstrumentProfile {
            code: code.into(),
            name: format!("Instrument {code}"),
            circulating_shares: 5000.0,
            circulating_market_cap: cap,
        }
    }

    /// A candidate that passes every stage with the default thresholds:
    /// 25 bars, 24 closes of 10.00, target close 10.10 (box upper 10.00,
    /// margin threshold 10.05), volume 1000 -> 2000 (growth 2.0),
    /// turnover 2000*100/5000 = 40%.
    fn passing_setup() -> (ScanConfig, Vec<InstrumentProfile>, MemSource) {
        let config = ScanConfig::for_date(target_date());
        let profiles = vec![profile("600001", 80.0)];
        let mut source = MemSource::new();
        source
            .daily
            .insert("600001".into(), series(25, 10.0, 10.10, 1000, 2000));
        source.chips.insert("600001".into(), chip_at_target(85.0));
        (config, profiles, source)
    }

    #[test]
    fn passing_instrument_produces_snapshot() {
        let (config, profiles, source) = passing_setup();
        let report = run_scan(&config, &profiles, &source).unwrap();

        assert_eq!(report.universe_size, 1);
        assert_eq!(report.candidates, 1);
        assert_eq!(report.results.len(), 1);

        let result = &report.results[0];
        assert_eq!(result.code, "600001");
        assert_eq!(result.close, 10.10);
        assert_eq!(result.box_upper, 10.0);
        assert_eq!(result.breakout_ratio_pct, 1.0);
        assert_eq!(result.volume_growth_pct, 100.0);
        assert_eq!(result.turnover_rate_pct, 40.0);
        assert_eq!(result.concentration70, 85.0);
        // MA5 over [10,10,10,10,10.10] = 10.02.
        assert_eq!(result.ma_values[&5], 10.02);
    }

    #[test]
    fn cap_filter_short_circuits_before_decode() {
        let (config, _, source) = passing_setup();
        let profiles = vec![profile("600001", 250.0)];

        let report = run_scan(&config, &profiles, &source).unwrap();

        assert!(report.results.is_empty());
        assert_eq!(report.rejections[&Rejection::CapExceeded], 1);
        // The expensive path never ran.
        assert_eq!(source.daily_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_series_is_a_non_fatal_rejection() {
        let (config, _, source) = passing_setup();
        let profiles = vec![profile("600001", 80.0), profile("600002", 80.0)];

        let report = run_scan(&config, &profiles, &source).unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.rejections[&Rejection::NoSeries], 1);
    }

    #[test]
    fn absent_target_date_rejects() {
        let (mut config, profiles, source) = passing_setup();
        config.target_date = target_date() + chrono::Duration::days(5);
        let report = run_scan(&config, &profiles, &source).unwrap();
        assert_eq!(report.rejections[&Rejection::TargetDateAbsent], 1);
    }

    #[test]
    fn first_bar_target_has_no_prior_volume_reference() {
        let (config, profiles, mut source) = passing_setup();
        source
            .daily
            .insert("600001".into(), series(1, 10.0, 10.10, 1000, 2000));
        let report = run_scan(&config, &profiles, &source).unwrap();
        assert_eq!(report.rejections[&Rejection::NoPriorBar], 1);
    }

    #[test]
    fn short_series_fails_ma_completeness() {
        let (config, profiles, mut source) = passing_setup();
        // 10 bars: MA20 undefined at the target.
        source
            .daily
            .insert("600001".into(), series(10, 10.0, 10.10, 1000, 2000));
        let report = run_scan(&config, &profiles, &source).unwrap();
        assert_eq!(report.rejections[&Rejection::IncompleteMa], 1);
    }

    #[test]
    fn weak_volume_growth_rejects() {
        let (config, profiles, mut source) = passing_setup();
        source
            .daily
            .insert("600001".into(), series(25, 10.0, 10.10, 2000, 2400));
        let report = run_scan(&config, &profiles, &source).unwrap();
        assert_eq!(report.rejections[&Rejection::LowVolumeGrowth], 1);
    }

    #[test]
    fn low_turnover_rejects() {
        let (config, mut profiles, source) = passing_setup();
        // 2000 * 100 / 50_000_000 = 0.004% turnover.
        profiles[0].circulating_shares = 50_000_000.0;
        let report = run_scan(&config, &profiles, &source).unwrap();
        assert_eq!(report.rejections[&Rejection::LowTurnover], 1);
    }

    #[test]
    fn missing_concentration_file_rejects_like_missing_sample() {
        let (config, profiles, mut source) = passing_setup();
        source.chips.clear();
        let report = run_scan(&config, &profiles, &source).unwrap();
        assert_eq!(report.rejections[&Rejection::NoConcentration], 1);

        let (config, profiles, mut source) = passing_setup();
        source.chips.insert(
            "600001".into(),
            vec![ConcentrationSample {
                date: target_date() - chrono::Duration::days(3),
                concentration70: 90.0,
            }],
        );
        let report = run_scan(&config, &profiles, &source).unwrap();
        assert_eq!(report.rejections[&Rejection::NoConcentration], 1);
    }

    #[test]
    fn low_concentration_rejects() {
        let (config, profiles, mut source) = passing_setup();
        source.chips.insert("600001".into(), chip_at_target(55.0));
        let report = run_scan(&config, &profiles, &source).unwrap();
        assert_eq!(report.rejections[&Rejection::LowConcentration], 1);
    }

    #[test]
    fn close_inside_margin_is_no_breakout() {
        let (config, profiles, mut source) = passing_setup();
        // 10.04 is above the box upper but within the 0.5% margin.
        source
            .daily
            .insert("600001".into(), series(25, 10.0, 10.04, 1000, 2000));
        let report = run_scan(&config, &profiles, &source).unwrap();
        assert_eq!(report.rejections[&Rejection::NoBoxBreakout], 1);
    }

    #[test]
    fn short_box_window_rejects() {
        let (mut config, profiles, mut source) = passing_setup();
        // 16 bars leaves 15 before the target; MA periods shortened so the
        // completeness stage passes and the box stage is the one that fails.
        config.ma_periods = vec![5];
        source
            .daily
            .insert("600001".into(), series(16, 10.0, 10.10, 1000, 2000));
        let report = run_scan(&config, &profiles, &source).unwrap();
        assert_eq!(report.rejections[&Rejection::InsufficientBoxWindow], 1);
    }

    /// Two price regimes: an old high plateau at 20.00 outside the 20-day
    /// box window, a recent plateau at 10.00 inside it, target close 10.20.
    /// The box breaks (10.20 > 10.05) but MA60 still averages in the old
    /// regime and sits far above the close.
    fn two_regime_series() -> Vec<DailyBar> {
        let mut bars = series(70, 10.0, 10.20, 1000, 2000);
        for bar in bars.iter_mut().take(45) {
            bar.close = 20.0;
            bar.open = 20.0;
            bar.high = 20.1;
            bar.low = 19.9;
        }
        bars
    }

    #[test]
    fn ma_breakout_all_mode_rejects_when_below_one_ma() {
        let (mut config, profiles, mut source) = passing_setup();
        config.ma_periods = vec![5, 60];
        source.daily.insert("600001".into(), two_regime_series());

        let report = run_scan(&config, &profiles, &source).unwrap();
        assert_eq!(report.rejections[&Rejection::NoMaBreakout], 1);
    }

    #[test]
    fn ma_breakout_any_mode_accepts_with_one_ma_below() {
        let (mut config, profiles, mut source) = passing_setup();
        config.ma_periods = vec![5, 60];
        config.ma_break_mode = boxscan_core::indicators::MaBreakMode::Any;
        source.daily.insert("600001".into(), two_regime_series());

        let report = run_scan(&config, &profiles, &source).unwrap();
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn report_is_deterministic_across_runs() {
        let (config, mut profiles, mut source) = passing_setup();
        profiles.push(profile("600002", 90.0));
        profiles.push(profile("600003", 120.0));
        source
            .daily
            .insert("600002".into(), series(25, 10.0, 10.10, 1000, 2000));
        source.chips.insert("600002".into(), chip_at_target(72.0));

        let report1 = run_scan(&config, &profiles, &source).unwrap();
        let report2 = run_scan(&config, &profiles, &source).unwrap();

        assert_eq!(report1.scan_id, report2.scan_id);
        assert_eq!(report1.results, report2.results);
        assert_eq!(report1.rejections, report2.rejections);
        // Universe order, not completion order.
        let codes: Vec<&str> = report1.results.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["600001", "600002"]);
    }

    #[test]
    fn invalid_config_is_fatal() {
        let (mut config, profiles, source) = passing_setup();
        config.ma_periods.clear();
        assert!(run_scan(&config, &profiles, &source).is_err());
    }
}
