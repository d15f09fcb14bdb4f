//! Dry-run výpisu: načte pár stránek scrollu a vypíše, co by jednotlivé
//! strategie vybraly. Nic nekliká.
//! Spustit: cargo run --bin listing-probe -- acca.json [loops]

use anyhow::{Context, Result};
use bet_runner::{session, IncrementalLoader, RunConfig};
use page_driver::{ChromePage, PageController};
use selection_engine::{
    Event, ListingParser, RunState, SelectionEngine, SelectionMode, StrategyConfig,
};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const MODES: [SelectionMode; 4] = [
    SelectionMode::Priority,
    SelectionMode::MinOdd,
    SelectionMode::RoundRobin,
    SelectionMode::OverUnderLine,
];

fn probe(cfg: &RunConfig, loops: u32) -> Result<Vec<Event>> {
    let page = ChromePage::launch(&cfg.browser)?;
    session::open_listing(&page, &cfg.site)?;

    let loader = IncrementalLoader::new(&cfg.loader, &cfg.site.scroll_container, &cfg.site.listing.event_container);
    for i in 1..=loops {
        let visible = loader.step(&page);
        info!("   ➕ Chunks: {} (loop {})", visible, i);
    }

    let parser = ListingParser::new(&cfg.site.listing)?;
    let html = page.content()?;
    info!("🩺 HTML {} B", html.len());
    Ok(parser.parse(&html))
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = env::args().skip(1);
    let cfg = RunConfig::load(args.next().unwrap_or_else(|| "acca.json".to_string()))?;
    let loops: u32 = args.next().and_then(|v| v.parse().ok()).unwrap_or(3);

    info!("🚀 Listing probe: {} ({} loops)", cfg.site.listing_url, loops);

    let probe_cfg = cfg.clone();
    let events = tokio::task::spawn_blocking(move || probe(&probe_cfg, loops))
        .await
        .context("Probe thread panicked")??;

    let locked = events.iter().flat_map(|e| &e.options).filter(|o| o.locked).count();
    info!("✅ Zápasů: {} | možností: {} | zamčeno: {}",
        events.len(),
        events.iter().map(|e| e.options.len()).sum::<usize>(),
        locked
    );
    if events.is_empty() {
        warn!("Výpis je prázdný, zkontroluj selektory v configu");
        return Ok(());
    }

    let state = RunState::new(cfg.limits());
    for mode in MODES {
        let strategy = StrategyConfig { mode, batch_limit: usize::MAX, ..cfg.strategy.clone() };
        let batch = SelectionEngine::with_seed(strategy, 0).propose(&events, &state);

        let odds: Vec<f64> = batch.proposals.iter().map(|p| p.option.odd).collect();
        info!(
            "📊 {:<16} vybráno {:>3} | odmítnuto {:>3} | součin {:.2}",
            mode.as_str(),
            batch.proposals.len(),
            batch.rejected.len(),
            selection_engine::combined_odds(&odds)
        );
        for p in batch.proposals.iter().take(5) {
            info!("      {} | {} @ {:.2}", p.event_label, p.option.label, p.option.odd);
        }
    }

    Ok(())
}
