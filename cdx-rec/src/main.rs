//! CDX recommendation engine - demo driver
//!
//! Thin stand-in for the out-of-scope transport layer: loads a JSON catalog,
//! runs a single search against a fresh engine, and prints the ranked list
//! plus per-variant funnel stats.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cdx_common::api::SearchRequest;
use cdx_common::catalog::{Catalog, CatalogItem};
use cdx_common::events::TimeWindow;
use cdx_common::intent::QueryOrigin;
use cdx_rec::store::{EventStore, MemoryEventStore, SqliteEventStore};
use cdx_rec::{RecConfig, RecEngine};

/// Command-line arguments for cdx-rec
#[derive(Parser, Debug)]
#[command(name = "cdx-rec")]
#[command(about = "Content discovery experiment engine")]
#[command(version)]
struct Args {
    /// Path to a JSON catalog file (array of catalog items)
    #[arg(short, long, env = "CDX_CATALOG")]
    catalog: PathBuf,

    /// Session identifier (determines the assigned variant)
    #[arg(short, long, default_value = "demo-session")]
    session: String,

    /// Treat the query as voice-transcribed input
    #[arg(long)]
    voice: bool,

    /// Optional config file
    #[arg(long, env = "CDX_CONFIG")]
    config: Option<PathBuf>,

    /// The query text
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cdx_rec=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config =
        RecConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let raw = std::fs::read_to_string(&args.catalog)
        .with_context(|| format!("Failed to read catalog {}", args.catalog.display()))?;
    let items: Vec<CatalogItem> =
        serde_json::from_str(&raw).context("Failed to parse catalog JSON")?;
    let catalog = Arc::new(Catalog::new(items).context("Invalid catalog")?);
    info!("Loaded {} catalog items", catalog.len());

    let store: Box<dyn EventStore> = match &config.event_db_path {
        Some(path) => Box::new(
            SqliteEventStore::open(path)
                .await
                .with_context(|| format!("Failed to open event database {}", path.display()))?,
        ),
        None => Box::new(MemoryEventStore::new()),
    };
    let engine =
        RecEngine::new(catalog, config, store).context("Failed to initialize engine")?;

    let query = args.query.join(" ");
    let origin = if args.voice {
        QueryOrigin::Voice
    } else {
        QueryOrigin::Text
    };

    let response = engine
        .search(SearchRequest {
            session_id: args.session.clone(),
            query,
            origin,
            fail: false,
        })
        .await
        .context("Search failed")?;

    println!(
        "request {}  variant {}  {} results  ({:.2} ms)",
        response.result.request_id,
        response.result.variant,
        response.total_results,
        response.processing_time_ms
    );
    for entry in &response.result.entries {
        let title = engine
            .catalog()
            .get(entry.item_id)
            .map(|item| item.title.as_str())
            .unwrap_or("?");
        println!(
            "{:>3}. [{:>4}] {:<40} {:.4}",
            entry.position, entry.item_id, title, entry.score
        );
    }

    engine.flush_events().await.context("Flush failed")?;
    let stats = engine.aggregate_by_variant(TimeWindow::all()).await?;
    for (variant, s) in &stats {
        println!(
            "variant {variant}: {} impressions, {} clicks, ctr {:.2}",
            s.impressions, s.clicks, s.ctr
        );
    }

    Ok(())
}
