/// AccaLive — kombinovaný tiket z DC výpisu
///
/// Co dělá:
///   1. Otevře výpis (Chrome přes CDP), volitelně se přihlásí
///   2. Scrolluje výpis proti lazy loadingu a průběžně vybírá tipy podle strategie
///   3. Násobí kurzy, dokud nedosáhne cíle nebo nedojdou zápasy / smyčky
///   4. Volitelně vsadí (jen při dosaženém cíli a auto_place = true)
///
/// Spuštění:
///   cargo run --bin acca-bot -- acca.json
///
/// Verbosita přes RUST_LOG, vše ostatní v JSON configu.

use anyhow::{Context, Result};
use bet_runner::{run_session, RunConfig, SessionReport};
use logger::{send_ntfy_alert, EventLogger};
use page_driver::ChromePage;
use std::env;
use std::fs::File;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let config_path = env::args().nth(1).unwrap_or_else(|| "acca.json".to_string());
    let cfg = RunConfig::load(&config_path)?;

    info!("=== AccaLive — accumulator bot ===");
    info!("Mode: {} | target {:.2} | max odd {:?}", cfg.strategy.mode.as_str(), cfg.target_odds, cfg.max_odd_per_selection);
    match &cfg.stake {
        Some(s) if s.auto_place => info!("Stake: {:.2} (AUTO PLACE)", s.amount),
        Some(s) => info!("Stake: {:.2} (manual)", s.amount),
        None => info!("Stake: none (selection only)"),
    }
    info!("Logs: ./{}/", cfg.log_dir);

    // Single instance lock
    let lock_file_path = env::temp_dir().join("accalive_bot.lock");
    let lock_file = match File::create(&lock_file_path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to create lock file at {:?}: {}", lock_file_path, e);
            return Ok(());
        }
    };

    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => {
            info!("Acquired single-instance lock.");
            guard
        }
        Err(_) => {
            warn!("Another instance of acca-bot is already running! Exiting.");
            return Ok(());
        }
    };

    let ntfy_topic = cfg.ntfy_topic.clone();
    let stake_amount = cfg.stake.as_ref().map(|s| s.amount);

    // headless_chrome je blokující, celý běh na vlastním vlákně
    let outcome = tokio::task::spawn_blocking(move || -> Result<SessionReport> {
        let events = EventLogger::new(&cfg.log_dir);
        let page = ChromePage::launch(&cfg.browser)?;
        run_session(&page, &cfg, Some(&events))
    })
    .await
    .context("Bot thread panicked")?;

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            error!("❌ Běh selhal: {:#}", e);
            if let Some(topic) = &ntfy_topic {
                send_ntfy_alert(topic, &format!("{e:#}"), "AccaLive: run failed").await;
            }
            return Err(e);
        }
    };

    let run = &report.run;
    info!("🎯 Cíl: {:.2}x | 📈 Total: {:.2}x | ⚡ Efektivita: {:.1} %", run.target_odds, run.total_odds, run.efficiency_pct);
    info!("⚽ Tipů: {} | nepotvrzeno: {} | smyček: {}", run.selections.len(), run.failed_clicks, run.loops);
    if let Some(amount) = stake_amount {
        info!("💵 Možná výhra: {:.2}", run.potential_payout(amount));
    }

    let stake_line = report.stake.as_ref().map(|s| s.outcome.reason());
    if let Some(line) = &stake_line {
        info!("🎰 Sázka: {}", line);
    }

    if let Some(topic) = &ntfy_topic {
        let target_hit = run.phase == selection_engine::RunPhase::TargetReached;
        if target_hit || stake_line.is_some() {
            let msg = format!(
                "{} tipů, total {:.2}x (cíl {:.2}x)\n{}",
                run.selections.len(),
                run.total_odds,
                run.target_odds,
                stake_line.unwrap_or_else(|| "bez sázky".to_string())
            );
            send_ntfy_alert(topic, &msg, "AccaLive: target reached").await;
        }
    }

    Ok(())
}
