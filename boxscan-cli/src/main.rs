//! Boxscan CLI — daily breakout screening over TDX-style binary data.
//!
//! Commands:
//! - `scan` — run the screening pipeline for one trading date
//! - `inspect` — decode a single .day or .chip file and print the tail

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use boxscan_core::codec::{decode_chip_stream, decode_day_stream};
use boxscan_core::indicators::MaBreakMode;
use boxscan_runner::{
    export_results_csv, run_scan, save_artifacts, BasicInfoRepository, CsvBasicInfo, DataLayout,
    FsSeriesSource, ScanConfig, ScanReport,
};

#[derive(Parser)]
#[command(name = "boxscan", about = "Boxscan — daily breakout screener")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the screening pipeline for one trading date.
    Scan {
        /// Candidate installation roots, probed in order; the first with a
        /// daily-bar directory wins.
        #[arg(long = "root", num_args = 1..)]
        roots: Vec<PathBuf>,

        /// Daily-bar directory (overrides --root discovery).
        #[arg(long, requires_all = ["chip_dir", "basics"])]
        day_dir: Option<PathBuf>,

        /// Concentration-file directory.
        #[arg(long)]
        chip_dir: Option<PathBuf>,

        /// Instrument profile table (CSV).
        #[arg(long)]
        basics: Option<PathBuf>,

        /// Path to a TOML scan config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Target trading date (YYYY-MM-DD). Overrides the config file.
        #[arg(long)]
        date: Option<String>,

        /// Maximum circulating market cap.
        #[arg(long)]
        cap: Option<f64>,

        /// Minimum volume growth ratio.
        #[arg(long)]
        growth: Option<f64>,

        /// Minimum turnover rate, percent.
        #[arg(long)]
        turnover: Option<f64>,

        /// Minimum concentration, percent.
        #[arg(long)]
        concentration: Option<f64>,

        /// Box window length in trading days.
        #[arg(long)]
        box_days: Option<usize>,

        /// Comma-separated MA periods, e.g. 5,10,20.
        #[arg(long)]
        ma: Option<String>,

        /// MA break mode: all or any.
        #[arg(long)]
        mode: Option<String>,

        /// Write the result table to this CSV file.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Save report.json + results.csv under this directory.
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },
    /// Decode a binary record file and print the trailing records.
    Inspect {
        /// Path to a .day or .chip file.
        file: PathBuf,

        /// Treat the file as a concentration (.chip) file.
        #[arg(long, default_value_t = false)]
        chip: bool,

        /// Number of trailing records to print.
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            roots,
            day_dir,
            chip_dir,
            basics,
            config,
            date,
            cap,
            growth,
            turnover,
            concentration,
            box_days,
            ma,
            mode,
            out,
            artifacts,
        } => run_scan_cmd(ScanArgs {
            roots,
            day_dir,
            chip_dir,
            basics,
            config,
            date,
            cap,
            growth,
            turnover,
            concentration,
            box_days,
            ma,
            mode,
            out,
            artifacts,
        }),
        Commands::Inspect { file, chip, tail } => run_inspect(&file, chip, tail),
    }
}

struct ScanArgs {
    roots: Vec<PathBuf>,
    day_dir: Option<PathBuf>,
    chip_dir: Option<PathBuf>,
    basics: Option<PathBuf>,
    config: Option<PathBuf>,
    date: Option<String>,
    cap: Option<f64>,
    growth: Option<f64>,
    turnover: Option<f64>,
    concentration: Option<f64>,
    box_days: Option<usize>,
    ma: Option<String>,
    mode: Option<String>,
    out: Option<PathBuf>,
    artifacts: Option<PathBuf>,
}

fn run_scan_cmd(args: ScanArgs) -> Result<()> {
    let layout = resolve_layout(&args)?;
    let config = build_config(&args)?;

    let repo = CsvBasicInfo::new(&layout.basics_path);
    let profiles = repo
        .load_profiles()
        .context("cannot load the instrument profile table; nothing to scan")?;

    println!(
        "scanning {} instruments for {} (scan {})",
        profiles.len(),
        config.target_date,
        &config.scan_id()[..8]
    );

    let source = FsSeriesSource::new(layout);
    let report = run_scan(&config, &profiles, &source)?;

    print_funnel(&report);
    print_results(&report);

    if let Some(path) = &args.out {
        let csv = export_results_csv(&report.results, &report.config.ma_periods)?;
        std::fs::write(path, csv)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("results written to {}", path.display());
    }
    if let Some(dir) = &args.artifacts {
        let scan_dir = save_artifacts(&report, dir)?;
        println!("artifacts saved to {}", scan_dir.display());
    }

    Ok(())
}

fn resolve_layout(args: &ScanArgs) -> Result<DataLayout> {
    if let (Some(day_dir), Some(chip_dir), Some(basics)) =
        (&args.day_dir, &args.chip_dir, &args.basics)
    {
        return Ok(DataLayout {
            day_dir: day_dir.clone(),
            chip_dir: chip_dir.clone(),
            basics_path: basics.clone(),
        });
    }
    if args.roots.is_empty() {
        bail!("no data location given: pass --root (repeatable) or --day-dir/--chip-dir/--basics");
    }
    DataLayout::discover(args.roots.iter().map(PathBuf::as_path))
        .context("no candidate root contains a daily-bar directory (T0002/dsmarket)")
}

fn build_config(args: &ScanArgs) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::from_toml_file(path)?,
        None => {
            let date = args
                .date
                .as_deref()
                .context("pass --date YYYY-MM-DD (or a --config file with target_date)")?;
            ScanConfig::for_date(parse_date(date)?)
        }
    };

    if let Some(date) = &args.date {
        config.target_date = parse_date(date)?;
    }
    if let Some(cap) = args.cap {
        config.market_cap_limit = cap;
    }
    if let Some(growth) = args.growth {
        config.volume_growth_ratio = growth;
    }
    if let Some(turnover) = args.turnover {
        config.turnover_rate_pct = turnover;
    }
    if let Some(concentration) = args.concentration {
        config.concentration_pct = concentration;
    }
    if let Some(box_days) = args.box_days {
        config.box_days = box_days;
    }
    if let Some(ma) = &args.ma {
        config.ma_periods = ma
            .split(',')
            .map(|p| p.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("invalid --ma list '{ma}'"))?;
    }
    if let Some(mode) = &args.mode {
        config.ma_break_mode = match mode.as_str() {
            "all" => MaBreakMode::All,
            "any" => MaBreakMode::Any,
            other => bail!("invalid --mode '{other}' (expected all or any)"),
        };
    }

    config.validate()?;
    Ok(config)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
}

fn print_funnel(report: &ScanReport) {
    println!(
        "universe {} -> cap filter {} -> passed {}",
        report.universe_size,
        report.candidates,
        report.results.len()
    );
    for (rejection, count) in &report.rejections {
        println!("  {rejection:?}: {count}");
    }
}

fn print_results(report: &ScanReport) {
    if report.results.is_empty() {
        println!("no instrument passed every stage");
        return;
    }
    println!("{:<12} {:<16} {:>8} {:>8} {:>9} {:>9} {:>8}", "code", "name", "close", "cap", "growth%", "turn%", "break%");
    for r in &report.results {
        println!(
            "{:<12} {:<16} {:>8.2} {:>8.2} {:>9.2} {:>9.2} {:>8.2}",
            r.code,
            r.name,
            r.close,
            r.circulating_market_cap,
            r.volume_growth_pct,
            r.turnover_rate_pct,
            r.breakout_ratio_pct
        );
    }
}

fn run_inspect(file: &PathBuf, chip: bool, tail: usize) -> Result<()> {
    let handle = std::fs::File::open(file)
        .with_context(|| format!("failed to open {}", file.display()))?;

    if chip {
        let samples = decode_chip_stream(handle)?;
        println!("{} records", samples.len());
        let start = samples.len().saturating_sub(tail);
        for s in &samples[start..] {
            println!("{}  concentration70={:.2}", s.date, s.concentration70);
        }
    } else {
        let bars = decode_day_stream(handle)?;
        println!("{} records", bars.len());
        let start = bars.len().saturating_sub(tail);
        for b in &bars[start..] {
            println!(
                "{}  o={:.2} h={:.2} l={:.2} c={:.2} vol={} amt={:.2}",
                b.date, b.open, b.high, b.low, b.close, b.volume, b.amount
            );
        }
    }
    Ok(())
}
