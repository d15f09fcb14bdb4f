//! Stake placer — vyplní částku, jednou klikne na "place bet", ověří výsledek
//!
//! Umístění se NIKDY neopakuje: druhý klik by mohl vsadit dvakrát.

use page_driver::PageController;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::SiteConfig;
use crate::retry::poll_until;
use crate::scripts;
use crate::session::{read_balance, read_total_odds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    Receipt,
    BetslipEmptied,
    TotalOddsReset,
    BalanceDropped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StakeOutcome {
    Placed(Confirmation),
    InsufficientBalance { balance: f64 },
    /// Tiket nešel vyplnit nebo odeslat
    Rejected(String),
    /// Odesláno, ale potvrzení nepřišlo v limitu
    Timeout,
}

impl StakeOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, StakeOutcome::Placed(_))
    }

    pub fn reason(&self) -> String {
        match self {
            StakeOutcome::Placed(c) => format!("placed ({c:?})"),
            StakeOutcome::InsufficientBalance { balance } => format!("insufficient balance {balance:.2}"),
            StakeOutcome::Rejected(why) => why.clone(),
            StakeOutcome::Timeout => "no confirmation before timeout".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StakeReport {
    pub amount: f64,
    pub outcome: StakeOutcome,
    pub balance_before: Option<f64>,
    pub balance_after: Option<f64>,
}

/// "500" pro celé částky, jinak dvě desetinná místa
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

pub struct StakePlacer<'a> {
    site: &'a SiteConfig,
    balance_tolerance: f64,
}

impl<'a> StakePlacer<'a> {
    pub fn new(site: &'a SiteConfig, balance_tolerance: f64) -> Self {
        Self { site, balance_tolerance }
    }

    pub fn place<P: PageController + ?Sized>(&self, page: &P, amount: f64) -> StakeReport {
        let balance_before = read_balance(page, self.site);
        let outcome = self.submit(page, amount, balance_before);
        let balance_after = read_balance(page, self.site);

        match &outcome {
            StakeOutcome::Placed(how) => info!("💰 Sázka {} umístěna ({:?})", format_amount(amount), how),
            other => warn!("❌ Sázka {} neumístěna: {}", format_amount(amount), other.reason()),
        }

        StakeReport { amount, outcome, balance_before, balance_after }
    }

    fn submit<P: PageController + ?Sized>(&self, page: &P, amount: f64, balance_before: Option<f64>) -> StakeOutcome {
        let site = self.site;

        if let Some(balance) = balance_before {
            if balance < amount {
                return StakeOutcome::InsufficientBalance { balance };
            }
        }

        match page.wait_for_selector(&site.stake_input, site.wait_timeout()) {
            Ok(true) => {}
            Ok(false) => return StakeOutcome::Rejected(format!("stake input {} not found", site.stake_input)),
            Err(e) => return StakeOutcome::Rejected(format!("stake input lookup failed: {e}")),
        }

        if let Err(e) = page.evaluate(&scripts::clear_input(&site.stake_input)) {
            warn!("⚠️ Vyčištění částky selhalo: {}", e);
        }
        if let Err(e) = page.type_text(&site.stake_input, &format_amount(amount)) {
            return StakeOutcome::Rejected(format!("typing stake failed: {e}"));
        }

        let enabled_script = scripts::is_enabled(&site.place_button);
        let enabled = poll_until(site.wait_timeout(), site.poll_interval(), || {
            page.evaluate(&enabled_script)
                .ok()
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
        });
        if !enabled {
            return StakeOutcome::Rejected(format!("{} never became enabled", site.place_button));
        }

        // Prázdný tiket po kliku je potvrzení jen tehdy, když předtím něco obsahoval
        let entries_before = self.betslip_entries(page);

        if let Err(e) = page.click(&site.place_button) {
            return StakeOutcome::Rejected(format!("place click failed: {e}"));
        }
        info!("🎰 Sázka odeslána, čekám na potvrzení...");

        let mut confirmation = None;
        poll_until(site.confirm_timeout(), site.poll_interval(), || {
            confirmation = self.confirmation(page, amount, balance_before, entries_before);
            confirmation.is_some()
        });
        confirmation.map_or(StakeOutcome::Timeout, StakeOutcome::Placed)
    }

    fn confirmation<P: PageController + ?Sized>(
        &self,
        page: &P,
        amount: f64,
        balance_before: Option<f64>,
        entries_before: Option<u64>,
    ) -> Option<Confirmation> {
        let site = self.site;

        if page.exists(&site.receipt).unwrap_or(false) {
            return Some(Confirmation::Receipt);
        }

        if entries_before.is_some_and(|n| n > 0) && self.betslip_entries(page) == Some(0) {
            return Some(Confirmation::BetslipEmptied);
        }

        if read_total_odds(page, site).is_some_and(|t| (t - 1.0).abs() < 0.01) {
            return Some(Confirmation::TotalOddsReset);
        }

        let before = balance_before?;
        let after = read_balance(page, site)?;
        ((before - after - amount).abs() <= self.balance_tolerance).then_some(Confirmation::BalanceDropped)
    }

    fn betslip_entries<P: PageController + ?Sized>(&self, page: &P) -> Option<u64> {
        page.evaluate(&scripts::count(&self.site.betslip_entry))
            .ok()
            .and_then(|v| v.as_u64())
    }
}
