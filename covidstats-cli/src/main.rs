//! COVID stats CLI — show, watch, search and cache management commands.
//!
//! Commands:
//! - `show` — load stats synchronously (the widget path) and print one row per location
//! - `watch` — load a saved location list asynchronously and print updates as they land
//! - `search` — find location codes in the reference dataset
//! - `cache status` — list cached snapshots and their age
//! - `cache clean` — remove cached snapshots older than a threshold

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use covidstats_core::config::default_config_path;
use covidstats_core::data::{LocationCatalog, SnapshotCache};
use covidstats_core::signal::normalize;
use covidstats_core::{
    CollectionEvent, CovidConfig, FetchMode, SourceContext, SourceState, Stat, StatCollection,
    StatSource,
};
use std::path::PathBuf;
use std::sync::mpsc;

/// Number of trailing days drawn in a sparkline.
const CHART_DAYS: usize = 20;

#[derive(Parser)]
#[command(
    name = "covidstats",
    about = "COVID stats CLI — case and death trends per location"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to the platform config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference dataset (overrides the config file).
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Cache directory (overrides the config file).
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load stats synchronously and print one row per location.
    Show {
        /// Location codes (e.g., Massachusetts 25025.0 Spain).
        #[arg(required = true)]
        codes: Vec<String>,

        /// Draw a sparkline of smoothed daily cases.
        #[arg(long, default_value_t = false)]
        chart: bool,
    },
    /// Load a location list asynchronously and print updates as they arrive.
    Watch {
        /// Location codes. Defaults to the saved list from the config file.
        codes: Vec<String>,

        /// Force a network fetch even when the cache is fresh.
        #[arg(long, default_value_t = false)]
        refresh: bool,

        /// Give up waiting after this many seconds.
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
    },
    /// Search the reference dataset for locations.
    Search {
        /// Words that must all appear in the location name.
        query: Vec<String>,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached snapshots and their age.
    Status,
    /// Remove cached snapshots older than the given number of hours.
    Clean {
        /// Remove snapshots fetched more than this many hours ago.
        #[arg(long)]
        older_than_hours: i64,

        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Show { codes, chart } => run_show(&config, &codes, chart),
        Commands::Watch {
            codes,
            refresh,
            timeout_secs,
        } => run_watch(&config, &codes, refresh, timeout_secs),
        Commands::Search { query } => run_search(&config, &query.join(" ")),
        Commands::Cache { action } => match action {
            CacheAction::Status => run_cache_status(&config),
            CacheAction::Clean {
                older_than_hours,
                confirm,
            } => run_cache_clean(&config, older_than_hours, confirm),
        },
    }
}

fn load_config(cli: &Cli) -> Result<CovidConfig> {
    let path = cli.config.clone().or_else(default_config_path);
    let mut config = match &path {
        Some(path) => CovidConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CovidConfig::default(),
    };
    if let Some(dataset) = &cli.dataset {
        config.dataset = dataset.clone();
    }
    if let Some(cache_dir) = &cli.cache_dir {
        config.cache_dir = cache_dir.clone();
    }
    log::debug!("config: {config:?}");
    Ok(config)
}

fn run_show(config: &CovidConfig, codes: &[String], chart: bool) -> Result<()> {
    let context = SourceContext::from_config(config).context("setting up stat sources")?;

    let mut failed = 0;
    for code in codes {
        let source = context.create_source(code, FetchMode::Sync);
        print_source(&source, chart);
        if source.state() != SourceState::Ready {
            failed += 1;
        }
    }

    if failed > 0 {
        eprintln!("{failed}/{} location(s) could not be loaded", codes.len());
        std::process::exit(1);
    }
    Ok(())
}

fn run_watch(config: &CovidConfig, codes: &[String], refresh: bool, timeout_secs: u64) -> Result<()> {
    let context = SourceContext::from_config(config).context("setting up stat sources")?;
    let list = if codes.is_empty() {
        config.locations.clone()
    } else {
        codes.join(",")
    };

    let collection = StatCollection::from_codes(&context, &list, FetchMode::Async);
    if collection.is_empty() {
        bail!("no locations to watch");
    }

    // Listeners fire on fetch threads; hand events to this thread to print.
    let (tx, rx) = mpsc::channel();
    let _sub = collection.subscribe(move |event| {
        let _ = tx.send(event.clone());
    });

    if refresh {
        for source in collection.iter() {
            source.refresh(FetchMode::Async);
        }
    }

    for source in collection.iter() {
        print_source(source, false);
    }

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(timeout_secs);
    while !all_done(&collection) {
        let remaining = deadline.saturating_duration_since(std::time::Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(CollectionEvent::MemberChanged { index, event }) if event.state.is_settled() => {
                if let Some(source) = collection.get(index) {
                    print_source(source, false);
                }
            }
            Ok(_) => {}
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let pending: Vec<&str> = collection
                    .iter()
                    .filter(|s| !s.state().is_settled())
                    .map(|s| s.code())
                    .collect();
                bail!("timed out waiting for {}", pending.join(", "));
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

/// Every member is settled, or is stuck loading with a diagnostic.
fn all_done(collection: &StatCollection) -> bool {
    collection
        .iter()
        .all(|s| s.state().is_settled() || s.diagnostic().is_some())
}

fn run_search(config: &CovidConfig, query: &str) -> Result<()> {
    let catalog = LocationCatalog::load(&config.dataset)
        .with_context(|| format!("loading {}", config.dataset.display()))?;

    let hits = catalog.search(query);
    if hits.is_empty() {
        println!("No locations match '{query}'.");
        return Ok(());
    }
    for hit in hits {
        println!("{:<16} {}", hit.code, hit.label);
    }
    Ok(())
}

fn run_cache_status(config: &CovidConfig) -> Result<()> {
    let cache = SnapshotCache::new(&config.cache_dir);
    let entries = cache.entries();

    println!("Cache directory: {}", cache.cache_dir().display());
    if entries.is_empty() {
        println!("No cached snapshots.");
        return Ok(());
    }

    let now = Utc::now();
    let total_bytes: u64 = entries.iter().map(|e| e.bytes).sum();
    println!(
        "Snapshots: {}  Total size: {}",
        entries.len(),
        format_bytes(total_bytes)
    );
    println!();
    println!("{:<16} {:>10} {:>8}  Status", "Code", "Size", "Age");
    println!("{}", "-".repeat(46));
    for entry in &entries {
        let age = now - entry.fetched_at;
        let status = if age < config.freshness() {
            "fresh"
        } else {
            "stale"
        };
        println!(
            "{:<16} {:>10} {:>7}h  {status}",
            entry.code,
            format_bytes(entry.bytes),
            age.num_hours()
        );
    }
    Ok(())
}

fn run_cache_clean(config: &CovidConfig, older_than_hours: i64, confirm: bool) -> Result<()> {
    if older_than_hours < 0 {
        bail!("--older-than-hours must not be negative");
    }
    let cache = SnapshotCache::new(&config.cache_dir);
    let age = Duration::hours(older_than_hours);
    let now = Utc::now();

    if !confirm {
        let stale = cache.stale_entries(now, age);
        if stale.is_empty() {
            println!("Nothing older than {older_than_hours}h.");
            return Ok(());
        }
        println!("Would remove {} snapshot(s):", stale.len());
        for entry in &stale {
            println!("  {} (fetched {})", entry.code, entry.fetched_at);
        }
        println!("\nRe-run with --confirm to delete.");
        return Ok(());
    }

    let removed = cache.prune_older_than(now, age);
    println!("Removed {} snapshot(s).", removed.len());
    for code in removed {
        println!("  {code}");
    }
    Ok(())
}

// ── Output ──────────────────────────────────────────────────────────

fn print_source(source: &StatSource, chart: bool) {
    match source.current_stat() {
        Some(stat) if !stat.is_empty() => {
            println!("{}", summary_row(&stat));
            if chart {
                println!("    {}", sparkline(&stat.cases_delta_smooth_series));
            }
        }
        _ => println!("{:<32} {}", source.code(), source.state()),
    }
    if let Some(diagnostic) = source.diagnostic() {
        eprintln!("  {}: {diagnostic}", source.code());
    }
}

fn summary_row(stat: &Stat) -> String {
    let place = match &stat.sub_caption {
        Some(sub) => format!("{}, {sub}", stat.caption),
        None => stat.caption.clone(),
    };
    format!(
        "{place:<32} cases {:>12} ({:>+8})   deaths {:>10} ({:>+6})   as of {}",
        stat.total_cases,
        stat.delta_cases,
        stat.total_deaths,
        stat.delta_deaths,
        stat.computed_at.format("%Y-%m-%d %H:%M")
    )
}

fn sparkline(series: &[i64]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    normalize(series, CHART_DAYS)
        .into_iter()
        .map(|v| BARS[((v * (BARS.len() - 1) as f64).round() as usize).min(BARS.len() - 1)])
        .collect()
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
