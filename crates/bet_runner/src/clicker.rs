//! Click-and-verify — klik na možnost a kontrola markeru výběru
//!
//! Klik je přepínač: před každým klikem se nejdřív ověří marker,
//! jinak by klik na už vybranou možnost výběr zase zrušil.

use anyhow::{anyhow, Result};
use page_driver::PageController;
use std::thread::sleep;
use std::time::Duration;
use tracing::debug;

use crate::config::ClickConfig;
use crate::retry::RetryPolicy;
use crate::scripts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    pub confirmed: bool,
    pub attempts: u32,
}

pub struct ClickVerifier {
    policy: RetryPolicy,
    pre_click: Duration,
    settle: Duration,
}

impl ClickVerifier {
    pub fn new(cfg: &ClickConfig) -> Self {
        Self {
            policy: RetryPolicy::fixed(cfg.max_attempts, Duration::from_millis(cfg.retry_delay_ms)),
            pre_click: Duration::from_millis(cfg.pre_click_ms),
            settle: Duration::from_millis(cfg.settle_ms),
        }
    }

    pub fn click_and_verify<P: PageController + ?Sized>(&self, page: &P, handle: &str) -> ClickOutcome {
        let marker = scripts::selection_marker(handle);
        let is_marked = || -> Result<bool> {
            page.evaluate(&marker)?
                .as_bool()
                .ok_or_else(|| anyhow!("marker check returned non-bool"))
        };

        let attempted = self.policy.run(
            "click_and_verify",
            |attempt| -> Result<bool> {
                // už vybráno (obnovený tiket) nebo se předchozí klik projevil pozdě
                if is_marked().unwrap_or(false) {
                    debug!("{} already marked before click {}", handle, attempt);
                    return Ok(true);
                }
                if let Err(e) = page.scroll_into_view(handle) {
                    debug!("scrollIntoView {} failed: {}", handle, e);
                }
                sleep(self.pre_click);
                page.click(handle)?;
                sleep(self.settle);
                is_marked()
            },
            |marked| *marked,
        );

        ClickOutcome { confirmed: attempted.succeeded, attempts: attempted.attempts }
    }
}
