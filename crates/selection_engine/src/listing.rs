//! Extrakce zápasů z HTML snapshotu výpisu
//!
//! Struktura výpisu (prematch, DC market):
//! <div class="game-events-container prematch">
//!   <a href="/event/12345"> ... <span class="scoreboard-participant-name">Home</span> ... </a>
//!   <div class="event-bet-wrapper bet-price">
//!     <div class="event-bet"><div class="anchor-wrap" id="price-1">
//!       <span class="event-selection">1X</span><span class="event-odds"><span>1,40</span></span>
//!     </div></div>
//!   </div>
//! </div>

use anyhow::{anyhow, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::sync::OnceLock;

use crate::model::{BetOption, Event};
use crate::odds::parse_decimal_odd;

/// CSS selektory výpisu, konfigurovatelné
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    pub event_container: String,
    pub event_link: String,
    pub participant: String,
    pub option: String,
    pub option_label: String,
    pub option_odd: String,
    pub locked: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            event_container: ".game-events-container.prematch".to_string(),
            event_link: r#"a[href^="/event/"]"#.to_string(),
            participant: ".scoreboard-participant-name, .event-name".to_string(),
            option: ".event-bet-wrapper.bet-price .event-bet .anchor-wrap".to_string(),
            option_label: ".event-selection".to_string(),
            option_odd: ".event-odds span".to_string(),
            locked: ".event-selection_locked, .event-odds_locked".to_string(),
        }
    }
}

fn event_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/event/(\d+)").expect("valid event id regex"))
}

/// Id zápasu z href, musí odpovídat `/event/<číslice>`
pub fn extract_event_id(href: &str) -> Option<u64> {
    event_id_re()
        .captures(href)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Zkompilované selektory, ať se neparsují pro každý snapshot znovu
pub struct ListingParser {
    container: Selector,
    link: Selector,
    participant: Selector,
    option: Selector,
    option_label: Selector,
    option_odd: Selector,
    locked: Selector,
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e:?}"))
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

impl ListingParser {
    pub fn new(sel: &ListingSelectors) -> Result<Self> {
        Ok(Self {
            container: compile(&sel.event_container)?,
            link: compile(&sel.event_link)?,
            participant: compile(&sel.participant)?,
            option: compile(&sel.option)?,
            option_label: compile(&sel.option_label)?,
            option_odd: compile(&sel.option_odd)?,
            locked: compile(&sel.locked)?,
        })
    }

    /// Všechny zápasy se známým id. Kontejnery bez `/event/<id>` odkazu se
    /// přeskočí, stejně jako možnosti bez id prvku nebo s nečitelným kurzem.
    pub fn parse(&self, html: &str) -> Vec<Event> {
        let document = Html::parse_document(html);
        let mut events = Vec::new();

        for container in document.select(&self.container) {
            let href = container
                .value()
                .attr("href")
                .map(str::to_string)
                .or_else(|| {
                    container
                        .select(&self.link)
                        .next()
                        .and_then(|a| a.value().attr("href"))
                        .map(str::to_string)
                });
            let Some(id) = href.as_deref().and_then(extract_event_id) else {
                continue;
            };

            let teams: Vec<String> = container
                .select(&self.participant)
                .map(text_of)
                .filter(|t| !t.is_empty())
                .collect();
            let label = if teams.len() >= 2 {
                format!("{} - {}", teams[0], teams[1])
            } else {
                format!("event_{id}")
            };

            let options = container
                .select(&self.option)
                .filter_map(|wrap| self.parse_option(wrap))
                .collect();

            events.push(Event { id, label, options });
        }

        events
    }

    fn parse_option(&self, wrap: ElementRef<'_>) -> Option<BetOption> {
        let dom_id = wrap.value().attr("id").filter(|id| !id.is_empty())?;
        let label = wrap.select(&self.option_label).next().map(text_of)?;
        let odd = wrap
            .select(&self.option_odd)
            .next()
            .map(text_of)
            .and_then(|t| parse_decimal_odd(&t))?;
        let locked = wrap.select(&self.locked).next().is_some()
            || wrap.value().classes().any(|c| c.ends_with("_locked"));

        Some(BetOption {
            label,
            odd,
            locked,
            handle: format!(r#"[id="{dom_id}"]"#),
        })
    }
}
