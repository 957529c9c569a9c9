mod catalog;
mod config;
mod dispatcher;
mod error;
mod output;
mod pricing;
mod product;
mod progress;
mod session;

#[cfg(test)]
mod fake_api;

use std::path::PathBuf;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::{info, warn};

use config::{Credentials, Endpoints, Settings};
use dispatcher::Dispatcher;
use error::HarvestError;
use session::{CatalogApi, Session};

#[derive(Parser)]
#[command(
    name = "catalog_harvest",
    about = "Collect the vendor product catalog with marketing prices into products.json"
)]
struct Cli {
    /// Directory for products.json and last_updated.txt
    #[arg(long, env = "HARVEST_OUT_DIR", default_value = config::OUTPUT_DIR)]
    out_dir: PathBuf,
    /// Max in-flight requests per stage
    #[arg(long, env = "HARVEST_CONCURRENCY", default_value_t = config::MAX_CONCURRENCY)]
    concurrency: usize,
    /// Per-request timeout in seconds
    #[arg(long, env = "HARVEST_TIMEOUT_SECS", default_value_t = config::REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// Backend base URL (defaults to the production host)
    #[arg(long, env = "ISLANDSUN_BASE_URL")]
    base_url: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("ERROR: {}", e);
        std::process::exit(e.exit_code());
    }

    info!("[ALL DONE] in {}", format_duration(t0.elapsed()));
}

async fn run(cli: Cli) -> Result<(), HarvestError> {
    // Checked before any network activity.
    let creds = Credentials::from_env()?;
    let endpoints = cli
        .base_url
        .as_deref()
        .map(Endpoints::with_base)
        .unwrap_or_default();
    let settings = Settings::new(cli.concurrency, cli.timeout_secs, cli.out_dir);

    let session = Session::authenticate(&creds, &endpoints, &settings).await?;
    let result = harvest(&session, &settings, Local::now().date_naive()).await;
    session.close();
    result.map(|summary| summary.print())
}

struct HarvestSummary {
    products: usize,
    priced: usize,
    last_updated: String,
}

impl HarvestSummary {
    fn print(&self) {
        println!(
            "Saved {} products ({} with a price), last updated {}.",
            self.products, self.priced, self.last_updated
        );
    }
}

/// Catalog stage, price stage, then both output files. Each stage gets its own
/// concurrency window.
async fn harvest<A>(api: &A, settings: &Settings, today: NaiveDate) -> Result<HarvestSummary, HarvestError>
where
    A: CatalogApi + ?Sized,
{
    let t_catalog = Instant::now();
    let terms = catalog::search_terms();
    let catalog =
        catalog::collect_catalog(api, &terms, &Dispatcher::new(settings.max_concurrency)).await;
    info!("Catalog stage took {}", format_duration(t_catalog.elapsed()));
    if catalog.is_empty() {
        warn!("No products found for any search term");
    }

    let t_prices = Instant::now();
    let records =
        pricing::enrich(api, &catalog, &Dispatcher::new(settings.max_concurrency)).await;
    info!("Price stage took {}", format_duration(t_prices.elapsed()));

    let sorted = output::write_products(&settings.output_dir, records)?;
    let last_updated = output::write_last_updated(&settings.output_dir, today)?;

    Ok(HarvestSummary {
        products: sorted.len(),
        priced: sorted.iter().filter(|r| !r.marketing_price.is_empty()).count(),
        last_updated,
    })
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
