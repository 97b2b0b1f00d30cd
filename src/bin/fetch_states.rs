use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use solar_animator::config::load_run_config;
use solar_animator::ephemeris::StateCatalog;
use solar_animator::importer::{FetchStatus, HorizonsClient, fetch_catalog};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fetch initial state vectors from JPL Horizons into an offline catalog"
)]
struct Cli {
    /// Run configuration naming the bodies and start epoch
    #[arg(long)]
    config: PathBuf,

    /// Catalog file to create or extend
    #[arg(long, default_value = "data/states.yaml")]
    output: PathBuf,

    /// Alternate Horizons endpoint
    #[arg(long)]
    base_url: Option<String>,

    /// Ignore any existing catalog contents and fetch everything again
    #[arg(long, default_value_t = false)]
    refresh: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_run_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let epoch_jd = config.start_jd()?;

    let mut catalog = if cli.output.exists() && !cli.refresh {
        StateCatalog::load(&cli.output)?
    } else {
        StateCatalog::new()
    };

    let mut client = HorizonsClient::new()?;
    if let Some(url) = cli.base_url {
        client = client.with_base_url(url);
    }

    let ids = config.bodies.iter().map(|b| b.id.as_str());
    let statuses = fetch_catalog(&client, ids, epoch_jd, &mut catalog)?;
    catalog.save(&cli.output)?;

    for status in statuses {
        match status {
            FetchStatus::Fetched(id) => println!("[fetched] {id}"),
            FetchStatus::AlreadyPresent(id) => println!("[skip] {id} already in catalog"),
        }
    }
    println!(
        "Catalog {} holds {} entries",
        cli.output.display(),
        catalog.len()
    );
    Ok(())
}
