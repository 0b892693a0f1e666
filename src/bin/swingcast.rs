use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use clap::Parser;
use swingcast::prelude::*;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Detect swing highs/lows and project calendar dates from them")]
struct Cli {
    /// CSV file with columns timestamp,open,high,low,close[,volume] (RFC 3339 timestamps)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Symbol used in output file names
    #[arg(short, long, default_value = "symbol")]
    symbol: String,

    /// Bars required before a pivot
    #[arg(long, default_value_t = 3)]
    left: usize,

    /// Bars required after a pivot
    #[arg(long, default_value_t = 3)]
    right: usize,

    /// Directory for the projection CSV files
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Skip bar consistency checks
    #[arg(long)]
    no_validate: bool,

    /// trace, debug, info, warn or error (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("swingcast={level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: &Cli) -> Result<()> {
    let bars = read_bars(&cli.input)?;
    info!(bars = bars.len(), input = %cli.input.display(), "loaded bars");

    let analyzer = AnalyzerBuilder::new()
        .left_len(cli.left)
        .right_len(cli.right)
        .validate_data(!cli.no_validate)
        .build()
        .context("invalid pivot window")?;

    if bars.len() < analyzer.config().min_bars() {
        warn!(
            bars = bars.len(),
            needed = analyzer.config().min_bars(),
            "series too short for any pivot"
        );
    }

    let analysis = analyzer
        .analyze(&bars)
        .with_context(|| format!("failed to analyze {}", cli.input.display()))?;

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;

    let last = bars.last().map(|b| b.timestamp);
    for table in [&analysis.projections.highs, &analysis.projections.lows] {
        info!(kind = table.kind.label(), pivots = table.rows.len(), "projected");
        for row in &table.rows {
            debug!(
                kind = table.kind.label(),
                index = row.source_index,
                date = %row.source_date,
                price = row.source_price,
                "swing point"
            );
        }
        if let Some(last) = &last {
            debug!(
                kind = table.kind.label(),
                lines = table.reference_lines(last).len(),
                "projections inside data range"
            );
        }

        if table.is_empty() {
            continue;
        }
        let path = cli.out_dir.join(export_file_name(&cli.symbol, table.kind));
        write_table(table, &path)?;
        info!(path = %path.display(), "wrote projections");
    }

    Ok(())
}

fn read_bars(path: &Path) -> Result<Vec<Bar<FixedOffset>>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let bars = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<Bar<FixedOffset>>, _>>()
        .with_context(|| format!("failed to parse bars from {}", path.display()))?;
    Ok(bars)
}

fn write_table(table: &ProjectionTable<FixedOffset>, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(table, BufWriter::new(file))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
