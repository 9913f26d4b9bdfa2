//! ReturnLab CLI — acquire quote histories, derive rolling returns and
//! return distributions, and manage the response cache.
//!
//! Commands:
//! - `acquire` — fetch tickers through the response cache, emit a dense CSV
//! - `returns` — rolling returns from a CSV table or freshly acquired tickers
//! - `distribution` — binned return distributions as JSON
//! - `run` — full pipeline from a TOML config file
//! - `cache status` / `cache clear` — response cache maintenance

mod config;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use returnlab_core::data::{
    acquire, load_csv, write_returns_csv, write_table_csv, DiskStore, HttpTransport,
    ResponseStore, StderrSink, CACHE_TTL_MS,
};
use returnlab_core::domain::{DailyPriceTable, ReturnObservation};
use returnlab_core::timeseries::{
    distribution, resample, rolling_returns, DistributionOptions, TableError,
};

use config::RunConfig;

#[derive(Parser)]
#[command(
    name = "returnlab",
    about = "ReturnLab CLI — rolling-return analytics over cached quote histories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire tickers through the response cache and emit a dense CSV table.
    Acquire {
        /// Tickers to acquire (e.g., VWCE.MI SWDA.MI).
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Quote endpoint base URL (the chart proxy).
        #[arg(long)]
        endpoint: String,

        /// Response cache directory.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,

        /// Output CSV path. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compute rolling returns from a CSV table or freshly acquired tickers.
    Returns {
        /// Tickers to acquire (mutually exclusive with --input).
        tickers: Vec<String>,

        /// Wide CSV table (Date,SYM,...) to read instead of acquiring.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Rolling horizon in whole days.
        #[arg(long, default_value_t = 365)]
        period: usize,

        /// Quote endpoint base URL (required when acquiring).
        #[arg(long)]
        endpoint: Option<String>,

        /// Response cache directory.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,

        /// Output CSV path. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Bin rolling returns into per-symbol distributions (JSON).
    Distribution {
        /// Tickers to acquire (mutually exclusive with --input).
        tickers: Vec<String>,

        /// Wide CSV table (Date,SYM,...) to read instead of acquiring.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Rolling horizon in whole days.
        #[arg(long, default_value_t = 365)]
        period: usize,

        /// Number of equal-width bins per symbol.
        #[arg(long, default_value_t = 100)]
        thresholds: usize,

        /// Reverse cumulative mode (proportion with return >= bin edge).
        #[arg(long, default_value_t = false)]
        cumulative: bool,

        /// Quote endpoint base URL (required when acquiring).
        #[arg(long)]
        endpoint: Option<String>,

        /// Response cache directory.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,

        /// Output JSON path. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run the full pipeline from a TOML config file.
    Run {
        /// Path to the TOML run config.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for prices.csv, returns.csv, distribution.json.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Response cache maintenance.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached tickers, their age, and freshness.
    Status {
        /// Response cache directory.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,
    },
    /// Remove every cached response.
    Clear {
        /// Response cache directory.
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,

        /// Actually delete (without this flag, only previews what would be
        /// removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Acquire {
            tickers,
            endpoint,
            cache_dir,
            output,
        } => run_acquire(&tickers, &endpoint, &cache_dir, output.as_deref()),
        Commands::Returns {
            tickers,
            input,
            period,
            endpoint,
            cache_dir,
            output,
        } => run_returns(
            &tickers,
            input.as_deref(),
            period,
            endpoint.as_deref(),
            &cache_dir,
            output.as_deref(),
        ),
        Commands::Distribution {
            tickers,
            input,
            period,
            thresholds,
            cumulative,
            endpoint,
            cache_dir,
            output,
        } => run_distribution(
            &tickers,
            input.as_deref(),
            period,
            DistributionOptions {
                cumulative,
                thresholds,
            },
            endpoint.as_deref(),
            &cache_dir,
            output.as_deref(),
        ),
        Commands::Run { config, output_dir } => run_pipeline(&config, &output_dir),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => run_cache_status(&cache_dir),
            CacheAction::Clear { cache_dir, confirm } => run_cache_clear(&cache_dir, confirm),
        },
    }
}

/// Load the dense table either from a CSV file or by acquiring tickers.
fn load_table(
    tickers: &[String],
    input: Option<&Path>,
    endpoint: Option<&str>,
    cache_dir: &Path,
) -> Result<DailyPriceTable> {
    match (input, tickers.is_empty()) {
        (Some(_), false) => bail!("tickers and --input are mutually exclusive"),
        (None, true) => bail!("either tickers or --input is required"),
        (Some(path), true) => {
            let file = fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            let raw = load_csv(file)?;
            Ok(resample(&raw)?)
        }
        (None, false) => {
            let Some(endpoint) = endpoint else {
                bail!("--endpoint is required when acquiring tickers");
            };
            acquire_table(tickers, endpoint, cache_dir)
        }
    }
}

fn acquire_table(tickers: &[String], endpoint: &str, cache_dir: &Path) -> Result<DailyPriceTable> {
    let transport = HttpTransport::new(endpoint);
    let store = DiskStore::new(cache_dir);
    let table = acquire(tickers, &transport, &store, &StderrSink)?;
    if table.is_empty() {
        eprintln!("WARNING: no usable data was acquired");
    }
    Ok(table)
}

fn run_acquire(
    tickers: &[String],
    endpoint: &str,
    cache_dir: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let table = acquire_table(tickers, endpoint, cache_dir)?;
    with_output(output, |w| Ok(write_table_csv(w, &table)?))
}

fn run_returns(
    tickers: &[String],
    input: Option<&Path>,
    period: usize,
    endpoint: Option<&str>,
    cache_dir: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let table = load_table(tickers, input, endpoint, cache_dir)?;
    match compute_returns(&table, period)? {
        Some(returns) => with_output(output, |w| Ok(write_returns_csv(w, &returns)?)),
        None => Ok(()),
    }
}

fn run_distribution(
    tickers: &[String],
    input: Option<&Path>,
    period: usize,
    options: DistributionOptions,
    endpoint: Option<&str>,
    cache_dir: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let table = load_table(tickers, input, endpoint, cache_dir)?;
    let Some(returns) = compute_returns(&table, period)? else {
        return Ok(());
    };
    let dists = distribution(&returns, &options);
    let json = serde_json::to_string_pretty(&dists)?;
    with_output(output, |w| {
        writeln!(w, "{json}")?;
        Ok(())
    })
}

/// Derive rolling returns, converting a too-large window into the inline
/// error marker instead of a crash. `None` means the marker was rendered.
fn compute_returns(
    table: &DailyPriceTable,
    period: usize,
) -> Result<Option<Vec<ReturnObservation>>> {
    match rolling_returns(&table.observations(), period) {
        Ok(returns) => Ok(Some(returns)),
        Err(err @ TableError::WindowTooLarge { .. }) => {
            println!("[rolling returns unavailable: {err}]");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn run_pipeline(config_path: &Path, output_dir: &Path) -> Result<()> {
    let config = RunConfig::from_file(config_path)?;

    let table = acquire_table(
        &config.acquire.tickers,
        &config.acquire.endpoint,
        &config.acquire.cache_dir,
    )?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let prices_path = output_dir.join("prices.csv");
    let file = fs::File::create(&prices_path)?;
    write_table_csv(file, &table)?;
    println!("Prices:       {} ({} rows)", prices_path.display(), table.len());

    let Some(returns) = compute_returns(&table, config.returns.period)? else {
        return Ok(());
    };

    let returns_path = output_dir.join("returns.csv");
    let file = fs::File::create(&returns_path)?;
    write_returns_csv(file, &returns)?;
    println!(
        "Returns:      {} ({} observations, {}-day horizon)",
        returns_path.display(),
        returns.len(),
        config.returns.period
    );

    let dists = distribution(
        &returns,
        &DistributionOptions {
            cumulative: config.distribution.cumulative,
            thresholds: config.distribution.thresholds,
        },
    );
    let dist_path = output_dir.join("distribution.json");
    fs::write(&dist_path, serde_json::to_string_pretty(&dists)?)?;
    println!(
        "Distribution: {} ({} facets, {} bins)",
        dist_path.display(),
        dists.len(),
        config.distribution.thresholds
    );

    Ok(())
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let store = DiskStore::new(cache_dir);
    let now = chrono::Utc::now();
    let mut rows: Vec<(String, String, String, u64)> = Vec::new();

    for entry in fs::read_dir(cache_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(ticker) = name.strip_suffix(".json") else {
            continue;
        };

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        match store.get(ticker) {
            Some(cached) => {
                let age_days = (now - cached.stored_at).num_days();
                let state = if cached.is_fresh_at(now) { "fresh" } else { "stale" };
                rows.push((
                    ticker.to_string(),
                    format!("{} ({age_days}d ago)", cached.stored_at.format("%Y-%m-%d")),
                    state.to_string(),
                    size,
                ));
            }
            None => rows.push((ticker.to_string(), "(corrupt)".into(), "-".into(), size)),
        }
    }

    if rows.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }

    rows.sort_by(|a, b| a.0.cmp(&b.0));

    println!("Cache: {}", cache_dir.display());
    println!("Entries: {} (freshness window: {} days)", rows.len(), CACHE_TTL_MS / 86_400_000);
    println!();
    println!("{:<12} {:<24} {:<8} {:>10}", "Ticker", "Stored", "State", "Size");
    println!("{}", "-".repeat(58));
    for (ticker, stored, state, size) in &rows {
        println!("{ticker:<12} {stored:<24} {state:<8} {:>10}", format_size(*size));
    }

    Ok(())
}

fn run_cache_clear(cache_dir: &Path, confirm: bool) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let entry_count = fs::read_dir(cache_dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".json"))
        .count();

    if entry_count == 0 {
        println!("Cache is already empty: {}", cache_dir.display());
        return Ok(());
    }

    if !confirm {
        println!("Would remove {entry_count} cached response(s) from {}.", cache_dir.display());
        println!("Dry run — pass --confirm to actually delete.");
        return Ok(());
    }

    DiskStore::new(cache_dir).clear()?;
    println!("Removed {entry_count} cached response(s).");
    Ok(())
}

fn with_output<F>(output: Option<&Path>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    match output {
        Some(path) => {
            let mut file = fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write(&mut file)
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write(&mut lock)
        }
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
