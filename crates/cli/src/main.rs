//! `dex-panel`: fetch event-window batches and build the panel.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use panel_assemble::{export_duckdb, write_panel_csv, CsvBatchStore, PanelAssembler};
use panel_core::{format_timestamp, Config, EventWindow, Method, UsdSplit, Venue};
use panel_ingestion::{plan_jobs, SubgraphClient};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// JSON configuration file. Built-in defaults apply when omitted.
    #[arg(short, long, env = "DEX_PANEL_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Paginate, flatten and store one CSV per (event, method, venue)
    Fetch {
        /// Only this event
        #[arg(long)]
        event: Option<String>,

        /// Only this method (swap, mint, burn)
        #[arg(long)]
        method: Option<Method>,

        /// Only this venue (v2, v3)
        #[arg(long)]
        venue: Option<Venue>,
    },
    /// Normalize stored batches and write the panel
    Panel {
        /// Mint/burn USD split (even_split, cross_leg); overrides the config
        #[arg(long)]
        usd_split: Option<UsdSplit>,

        /// Also export the panel to this DuckDB database
        #[arg(long)]
        duckdb: Option<PathBuf>,
    },
    /// Print each event's resolved window
    Windows,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

fn select_windows(config: &Config, event: Option<&str>) -> Result<Vec<EventWindow>> {
    let windows = config.event_windows()?;
    match event {
        None => Ok(windows),
        Some(name) => {
            let selected: Vec<_> = windows.into_iter().filter(|w| w.event_name == name).collect();
            if selected.is_empty() {
                bail!("event `{name}` is not configured");
            }
            Ok(selected)
        }
    }
}

fn fetch(config: &Config, event: Option<&str>, method: Option<Method>, venue: Option<Venue>) -> Result<()> {
    let windows = select_windows(config, event)?;
    let methods: Vec<Method> = method.map_or_else(|| Method::ALL.to_vec(), |m| vec![m]);
    let venues: Vec<Venue> = venue.map_or_else(|| Venue::ALL.to_vec(), |v| vec![v]);
    let store = CsvBatchStore::new(&config.output.data_dir);
    let job_delay = Duration::from_millis(config.fetch.job_delay_ms);

    let jobs = plan_jobs(&windows, &methods, &venues);
    info!(jobs = jobs.len(), data_dir = %store.data_dir().display(), "starting fetch");

    let mut failed = 0usize;
    for (i, job) in jobs.iter().enumerate() {
        if i > 0 && !job_delay.is_zero() {
            thread::sleep(job_delay);
        }

        let client = SubgraphClient::new(config.venues.endpoint(job.venue), job.method, job.venue, &config.fetch)?;
        let outcome = job
            .run(&client)
            .and_then(|records| store.save(&job.window.event_name, job.method, job.venue, &records));

        match outcome {
            Ok(path) => info!(path = %path.display(), requests = client.requests(), "batch stored"),
            Err(e) => {
                failed += 1;
                error!(
                    event = %job.window.event_name,
                    method = %job.method,
                    venue = %job.venue,
                    error = %e,
                    "fetch job failed"
                );
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} fetch jobs failed", jobs.len());
    }
    Ok(())
}

fn panel(config: &Config, usd_split: Option<UsdSplit>, duckdb: Option<PathBuf>) -> Result<()> {
    let windows = config.event_windows()?;
    let usd_split = usd_split.unwrap_or(config.derivation.usd_split);
    let store = CsvBatchStore::new(&config.output.data_dir);

    let panel = PanelAssembler::new(usd_split)
        .assemble(&windows, &store)
        .context("failed to assemble panel")?;

    write_panel_csv(&config.output.panel_path, panel.rows())
        .with_context(|| format!("failed to write {}", config.output.panel_path.display()))?;

    if let Some(path) = duckdb.or_else(|| config.output.duckdb_path.clone()) {
        export_duckdb(&path, panel.rows())
            .with_context(|| format!("failed to export to {}", path.display()))?;
    }

    let quality = panel.quality();
    println!(
        "{} rows ({} ok, {} non-finite, {} negative liquidity) -> {}",
        panel.len(),
        quality.ok,
        quality.non_finite,
        quality.negative_liquidity,
        config.output.panel_path.display()
    );
    Ok(())
}

fn windows(config: &Config) -> Result<()> {
    for window in config.event_windows()? {
        println!(
            "{}\t{}\t[{}, {})",
            window.event_name,
            window.event_time,
            format_timestamp(window.start),
            format_timestamp(window.end)
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch { event, method, venue } => fetch(&config, event.as_deref(), method, venue),
        Commands::Panel { usd_split, duckdb } => panel(&config, usd_split, duckdb),
        Commands::Windows => windows(&config),
    }
}
