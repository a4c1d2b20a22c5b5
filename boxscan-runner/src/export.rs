//! Result export — CSV table and JSON report artifacts.
//!
//! Two formats:
//! - **CSV**: one row per surviving instrument, with one MA column per
//!   configured period, for spreadsheet consumption
//! - **JSON**: the full `ScanReport` (config, funnel, results) for
//!   round-trip archival

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::result::ScreeningResult;
use crate::screener::ScanReport;

/// Render results as CSV. `ma_periods` fixes the MA column set and order;
/// an instrument missing a period (config drift) gets an empty cell.
pub fn export_results_csv(results: &[ScreeningResult], ma_periods: &[usize]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "code".to_string(),
        "name".to_string(),
        "circulating_market_cap".to_string(),
        "close".to_string(),
    ];
    for period in ma_periods {
        header.push(format!("ma_{period}"));
    }
    header.extend(
        [
            "volume_growth_pct",
            "turnover_rate_pct",
            "concentration70",
            "box_upper",
            "breakout_ratio_pct",
        ]
        .map(String::from),
    );
    wtr.write_record(&header)?;

    for r in results {
        let mut row = vec![
            r.code.clone(),
            r.name.clone(),
            format!("{:.2}", r.circulating_market_cap),
            format!("{:.2}", r.close),
        ];
        for period in ma_periods {
            row.push(
                r.ma_values
                    .get(period)
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_default(),
            );
        }
        row.push(format!("{:.2}", r.volume_growth_pct));
        row.push(format!("{:.2}", r.turnover_rate_pct));
        row.push(format!("{:.2}", r.concentration70));
        row.push(format!("{:.2}", r.box_upper));
        row.push(format!("{:.2}", r.breakout_ratio_pct));
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Serialize a full report to pretty JSON.
pub fn export_report_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ScanReport to JSON")
}

/// Save the artifact set for one scan.
///
/// Creates `scan_{target_date}_{scan_id prefix}/` under `output_dir`
/// containing `report.json` and `results.csv`. Returns the created
/// directory.
pub fn save_artifacts(report: &ScanReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "scan_{}_{}",
        report.config.target_date.format("%Y%m%d"),
        &report.scan_id[..8.min(report.scan_id.len())]
    );
    let scan_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&scan_dir)
        .with_context(|| format!("failed to create artifact dir: {}", scan_dir.display()))?;

    std::fs::write(scan_dir.join("report.json"), export_report_json(report)?)?;
    std::fs::write(
        scan_dir.join("results.csv"),
        export_results_csv(&report.results, &report.config.ma_periods)?,
    )?;

    Ok(scan_dir)
}
