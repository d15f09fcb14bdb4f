//! Hlavní smyčka: scroll → výběr → klik → akumulace, dokud není konec
//!
//! Každá iterace je izolovaná: chyba se zaloguje, následuje cooldown
//! a smyčka pokračuje. Iterace s chybou se počítá jako idle.

use anyhow::{bail, Context, Result};
use logger::{
    now_iso, EventLogger, RunFinishedEvent, RunStartedEvent, ScrollProgressEvent, SelectionEvent,
    StakeResultEvent,
};
use page_driver::PageController;
use selection_engine::{ListingParser, Proposal, RunPhase, RunState, Selection, SelectionEngine};
use serde::Serialize;
use std::thread::sleep;
use tracing::{debug, info, warn};

use crate::clicker::{ClickOutcome, ClickVerifier};
use crate::config::RunConfig;
use crate::loader::IncrementalLoader;
use crate::session;
use crate::stake::{StakePlacer, StakeReport};

#[derive(Debug, Clone)]
pub struct RunReport {
    pub phase: RunPhase,
    pub total_odds: f64,
    pub target_odds: f64,
    pub selections: Vec<Selection>,
    pub failed_clicks: usize,
    pub loops: u32,
    pub efficiency_pct: f64,
}

impl RunReport {
    pub fn potential_payout(&self, stake: f64) -> f64 {
        stake * self.total_odds
    }
}

#[derive(Debug)]
pub struct SessionReport {
    pub balance: Option<f64>,
    pub run: RunReport,
    pub stake: Option<StakeReport>,
}

fn emit<T: Serialize>(events: Option<&EventLogger>, event: &T) {
    if let Some(logger) = events {
        if let Err(e) = logger.log(event) {
            warn!("Event log write failed: {}", e);
        }
    }
}

pub struct BetRunner<'a, P: PageController + ?Sized> {
    page: &'a P,
    cfg: &'a RunConfig,
    events: Option<&'a EventLogger>,
    engine: SelectionEngine,
    parser: ListingParser,
    loader: IncrementalLoader,
    clicker: ClickVerifier,
    state: RunState,
    failed_clicks: usize,
}

impl<'a, P: PageController + ?Sized> BetRunner<'a, P> {
    pub fn new(page: &'a P, cfg: &'a RunConfig, events: Option<&'a EventLogger>) -> Result<Self> {
        let parser = ListingParser::new(&cfg.site.listing).context("Invalid listing selectors")?;
        Ok(Self {
            page,
            cfg,
            events,
            engine: SelectionEngine::new(cfg.strategy.clone()),
            parser,
            loader: IncrementalLoader::new(&cfg.loader, &cfg.site.scroll_container, &cfg.site.listing.event_container),
            clicker: ClickVerifier::new(&cfg.click),
            state: RunState::new(cfg.limits()),
            failed_clicks: 0,
        })
    }

    /// Podstrčí engine s pevným seedem
    pub fn with_engine(mut self, engine: SelectionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn run(&mut self) -> Result<RunReport> {
        let cfg = self.cfg;
        info!(
            "🚀 Start: mode={} target={:.2} max_odd={:?} batch={}",
            cfg.strategy.mode.as_str(),
            cfg.target_odds,
            cfg.max_odd_per_selection,
            cfg.strategy.batch_limit
        );
        emit(self.events, &RunStartedEvent {
            ts: now_iso(),
            event: "RUN_STARTED",
            listing_url: cfg.site.listing_url.clone(),
            mode: cfg.strategy.mode.as_str().to_string(),
            target_odds: cfg.target_odds,
            max_odd: cfg.max_odd_per_selection,
            stake: cfg.stake.as_ref().map(|s| s.amount),
        });

        session::open_listing(self.page, &cfg.site)?;

        while !self.state.is_finished() {
            let visible = match self.iteration() {
                Ok(visible) => visible,
                Err(e) => {
                    warn!("⚠️ Smyčka {} selhala: {:#}, cooldown {:?}", self.state.loops() + 1, e, cfg.cooldown());
                    sleep(cfg.cooldown());
                    0
                }
            };
            self.state.end_loop(visible);

            info!(
                "   ➕ Loop {}: {} zápasů (idle {}/{}) | total {:.2} | tipů {}",
                self.state.loops(),
                visible,
                self.state.idle_loops(),
                cfg.loader.idle_threshold,
                self.state.total_odds(),
                self.state.selections().len()
            );
            emit(self.events, &ScrollProgressEvent {
                ts: now_iso(),
                event: "SCROLL_PROGRESS",
                loop_no: self.state.loops(),
                visible,
                idle_loops: self.state.idle_loops(),
                total_odds: self.state.total_odds(),
                selections: self.state.selections().len(),
            });
        }

        let report = self.report();
        info!(
            "🏁 Konec ({}): total {:.2} / cíl {:.2} ({:.1} %), tipů {}, nepotvrzeno {}, zpracováno {}, smyček {}",
            report.phase.as_str(),
            report.total_odds,
            report.target_odds,
            report.efficiency_pct,
            report.selections.len(),
            report.failed_clicks,
            self.state.processed_count(),
            report.loops
        );
        emit(self.events, &RunFinishedEvent {
            ts: now_iso(),
            event: "RUN_FINISHED",
            outcome: report.phase.as_str().to_string(),
            total_odds: report.total_odds,
            target_odds: report.target_odds,
            selections: report.selections.len(),
            loops: report.loops,
            efficiency_pct: report.efficiency_pct,
        });
        Ok(report)
    }

    fn iteration(&mut self) -> Result<usize> {
        session::ensure_on_listing(self.page, &self.cfg.site)?;
        let visible = self.loader.step(self.page);
        self.selection_pass()?;
        Ok(visible)
    }

    fn selection_pass(&mut self) -> Result<()> {
        let html = self.page.content().context("Failed to read listing HTML")?;
        let events = self.parser.parse(&html);
        let batch = self.engine.propose(&events, &self.state);

        for id in &batch.rejected {
            debug!("event {} has no admissible option, skipping for good", id);
            self.state.mark_processed(*id);
        }
        if !batch.proposals.is_empty() {
            info!("   🎯 Výběr (batch {}) z {} zápasů", batch.proposals.len(), events.len());
        }

        for proposal in &batch.proposals {
            if self.state.is_finished() {
                break;
            }
            let outcome = self.clicker.click_and_verify(self.page, &proposal.option.handle);
            if outcome.confirmed {
                self.on_confirmed(proposal, outcome);
            } else {
                self.on_failed(proposal, outcome);
            }
        }
        Ok(())
    }

    fn on_confirmed(&mut self, proposal: &Proposal, outcome: ClickOutcome) {
        let page_total = session::read_total_odds(self.page, &self.cfg.site);
        let phase = self.state.confirm(Selection::from(proposal), page_total);

        info!(
            "   ✅ {} | {} @ {:.2} → total {:.2}",
            proposal.event_label,
            proposal.option.label,
            proposal.option.odd,
            self.state.total_odds()
        );
        emit(self.events, &self.selection_event("SELECTION_CONFIRMED", proposal, outcome, page_total));

        if phase == RunPhase::TargetReached {
            info!("🎉 Cíl dosažen: {:.2} ≥ {:.2}", self.state.total_odds(), self.state.target_odds());
        }
    }

    fn on_failed(&mut self, proposal: &Proposal, outcome: ClickOutcome) {
        self.state.mark_processed(proposal.event_id);
        self.failed_clicks += 1;
        warn!(
            "   ⚠️ Výběr nepotvrzen po {} pokusech: {} | {} (event {})",
            outcome.attempts, proposal.event_label, proposal.option.label, proposal.event_id
        );
        emit(self.events, &self.selection_event("SELECTION_FAILED", proposal, outcome, None));
    }

    fn selection_event(
        &self,
        name: &'static str,
        proposal: &Proposal,
        outcome: ClickOutcome,
        page_total: Option<f64>,
    ) -> SelectionEvent {
        SelectionEvent {
            ts: now_iso(),
            event: name,
            event_id: proposal.event_id,
            match_label: proposal.event_label.clone(),
            option: proposal.option.label.clone(),
            odd: proposal.option.odd,
            attempts: outcome.attempts,
            total_odds: self.state.total_odds(),
            page_total,
        }
    }

    fn report(&self) -> RunReport {
        RunReport {
            phase: self.state.phase(),
            total_odds: self.state.total_odds(),
            target_odds: self.state.target_odds(),
            selections: self.state.selections().to_vec(),
            failed_clicks: self.failed_clicks,
            loops: self.state.loops(),
            efficiency_pct: self.state.efficiency_pct(),
        }
    }
}

/// Celý běh: volitelné přihlášení, akumulace, volitelná sázka
pub fn run_session<P: PageController + ?Sized>(
    page: &P,
    cfg: &RunConfig,
    events: Option<&EventLogger>,
) -> Result<SessionReport> {
    let mut balance = None;
    if let Some(creds) = &cfg.credentials {
        page.navigate(&cfg.site.base_url)
            .with_context(|| format!("Failed to open {}", cfg.site.base_url))?;
        session::dismiss_cookie_banner(page);
        balance = session::login(page, &cfg.site, creds).context("Login failed")?;
        if let Some(b) = balance.filter(|b| *b <= 0.0) {
            bail!("Insufficient balance: {b:.2}");
        }
    }

    let run = BetRunner::new(page, cfg, events)?.run()?;

    let stake = match &cfg.stake {
        Some(stake) if stake.auto_place && run.phase == RunPhase::TargetReached => {
            info!(
                "💰 Sázím {:.2} na kurz {:.2} → možná výhra {:.2}",
                stake.amount,
                run.total_odds,
                run.potential_payout(stake.amount)
            );
            let report = StakePlacer::new(&cfg.site, stake.balance_tolerance).place(page, stake.amount);
            emit(events, &StakeResultEvent {
                ts: now_iso(),
                event: "STAKE_RESULT",
                amount: report.amount,
                placed: report.outcome.is_placed(),
                reason: report.outcome.reason(),
                balance_before: report.balance_before,
                balance_after: report.balance_after,
                potential_win: run.potential_payout(report.amount),
            });
            Some(report)
        }
        Some(stake) if stake.auto_place => {
            info!("ℹ️ Cíl nedosažen ({}), nesázím", run.phase.as_str());
            None
        }
        Some(stake) => {
            info!(
                "🖐️ Auto-place vypnuto, tiket připraven, možná výhra {:.2}",
                run.potential_payout(stake.amount)
            );
            None
        }
        None => None,
    };

    Ok(SessionReport { balance, run, stake })
}
