//! Incremental loader — scroll výpisu proti lazy loadingu
//!
//! Jeden krok = rebound scroll, pauza, klávesa End, krátká pauza, přepočet
//! viditelných zápasů. Cokoli selže, krok vrátí 0 a runner ho započítá
//! jako idle smyčku.

use page_driver::PageController;
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::LoaderConfig;
use crate::scripts;

pub struct IncrementalLoader {
    scroll_script: String,
    count_script: String,
    wait: Duration,
    end_key_wait: Duration,
}

impl IncrementalLoader {
    pub fn new(cfg: &LoaderConfig, scroll_container: &str, event_container: &str) -> Self {
        Self {
            scroll_script: scripts::rebound_scroll(scroll_container, event_container),
            count_script: scripts::count(event_container),
            wait: Duration::from_millis(cfg.wait_ms),
            end_key_wait: Duration::from_millis(cfg.end_key_wait_ms),
        }
    }

    /// Provede jeden scroll a vrátí počet viditelných zápasů
    pub fn step<P: PageController + ?Sized>(&self, page: &P) -> usize {
        if let Err(e) = page.evaluate(&self.scroll_script) {
            warn!("⚠️ Scroll selhal: {}", e);
        }
        sleep(self.wait);

        if let Err(e) = page.press_key("End") {
            debug!("End key fallback failed: {}", e);
        }
        sleep(self.end_key_wait);

        self.visible_count(page).unwrap_or(0)
    }

    pub fn visible_count<P: PageController + ?Sized>(&self, page: &P) -> Option<usize> {
        match page.evaluate(&self.count_script) {
            Ok(value) => value.as_u64().map(|n| n as usize),
            Err(e) => {
                warn!("⚠️ Počítání zápasů selhalo: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{listing_html, FakePage};

    fn loader() -> IncrementalLoader {
        let cfg = LoaderConfig { wait_ms: 0, end_key_wait_ms: 0, ..Default::default() };
        IncrementalLoader::new(&cfg, ".section-middle .scrollable-content", ".game-events-container.prematch")
    }

    #[test]
    fn step_scrolls_presses_end_and_counts() {
        let dc: &[(&str, &str)] = &[("1X", "1.4")];
        let page = FakePage::new().with_snapshots(vec![
            listing_html(&[(1, dc)]),
            listing_html(&[(1, dc), (2, dc), (3, dc)]),
        ]);

        assert_eq!(loader().step(&page), 3);
        assert_eq!(page.count_actions("key:End"), 1);
        // na konci výpisu počet stojí
        assert_eq!(loader().step(&page), 3);
    }

    #[test]
    fn failed_evaluate_counts_as_zero() {
        let page = FakePage::new().with_snapshots(vec![listing_html(&[])]);
        page.break_eval();
        assert_eq!(loader().step(&page), 0);
    }
}
