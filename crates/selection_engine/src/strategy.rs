//! Výběr tipů z viditelných zápasů
//!
//! Engine jen navrhuje, stav mění až runner po potvrzeném kliknutí.
//! Strop kurzu se aplikuje na kandidáty PŘED volbou módu, takže
//! priority s limitem 1.3 na {1X:1.4, X2:1.6, 12:1.2} vezme 12.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::model::{BetOption, Event, Proposal};
use crate::odds::parse_decimal_odd;
use crate::state::RunState;

const LINE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// První label z pořadí preferencí, jinak nejnižší kurz
    Priority,
    /// Nejnižší kurz, shoda → pořadí preferencí
    MinOdd,
    /// Preferovaný label rotuje napříč výběry
    RoundRobin,
    /// Over/Under na konkrétní lajně
    OverUnderLine,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::Priority => "priority",
            SelectionMode::MinOdd => "min_odd",
            SelectionMode::RoundRobin => "round_robin",
            SelectionMode::OverUnderLine => "over_under_line",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OuSide {
    Over,
    Under,
}

impl OuSide {
    fn other(self) -> Self {
        match self {
            OuSide::Over => OuSide::Under,
            OuSide::Under => OuSide::Over,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub mode: SelectionMode,
    pub preference: Vec<String>,
    /// Max nových návrhů na jeden průchod
    pub batch_limit: usize,
    pub ou_line: f64,
    pub ou_side: OuSide,
    /// Pravděpodobnost, že zápas v tomto průchodu přeskočíme (zůstane na později)
    pub random_skip_rate: f64,
    /// Zamíchat pořadí zápasů v každém průchodu
    pub shuffle: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Priority,
            preference: vec!["1X".to_string(), "X2".to_string(), "12".to_string()],
            batch_limit: 5,
            ou_line: 2.5,
            ou_side: OuSide::Over,
            random_skip_rate: 0.0,
            shuffle: false,
        }
    }
}

/// Výsledek jednoho průchodu enginem
#[derive(Debug, Default)]
pub struct Batch {
    pub proposals: Vec<Proposal>,
    /// Zápasy s platnými kandidáty, ze kterých nic neprošlo (definitivně vyřízené)
    pub rejected: Vec<u64>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty() && self.rejected.is_empty()
    }
}

/// "Over 2.5" / "Plus de 2,5" / "Under 2.5" / "Moins de 2.5" → (strana, lajna)
pub fn parse_ou_label(label: &str) -> Option<(OuSide, f64)> {
    let lower = label.trim().to_lowercase();
    let side = if lower.starts_with("over") || lower.starts_with("plus") || lower.starts_with('+') {
        OuSide::Over
    } else if lower.starts_with("under") || lower.starts_with("moins") || lower.starts_with('-') {
        OuSide::Under
    } else {
        return None;
    };
    let line = parse_decimal_odd(lower.trim_start_matches(['+', '-']))?;
    Some((side, line))
}

fn by_odd(a: &&BetOption, b: &&BetOption) -> Ordering {
    a.odd.total_cmp(&b.odd)
}

fn same_label(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

pub struct SelectionEngine {
    cfg: StrategyConfig,
    rr_index: usize,
    rng: StdRng,
}

impl SelectionEngine {
    pub fn new(cfg: StrategyConfig) -> Self {
        Self { cfg, rr_index: 0, rng: StdRng::from_entropy() }
    }

    /// Deterministický engine pro testy a probe
    pub fn with_seed(cfg: StrategyConfig, seed: u64) -> Self {
        Self { cfg, rr_index: 0, rng: StdRng::seed_from_u64(seed) }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.cfg
    }

    /// Návrhy pro zápasy, které ještě nejsou zpracované.
    ///
    /// Zápas bez odemčených kandidátů (nebo přeskočený náhodou) se do
    /// výsledku nedostane vůbec, zůstává otevřený pro další průchod.
    pub fn propose(&mut self, events: &[Event], state: &RunState) -> Batch {
        let mut batch = Batch::default();
        if self.cfg.batch_limit == 0 {
            return batch;
        }

        let mut order: Vec<&Event> = events.iter().collect();
        if self.cfg.shuffle {
            order.shuffle(&mut self.rng);
        }

        let ceiling = state.max_odd();
        let mut seen = HashSet::new();

        for event in order {
            if batch.proposals.len() >= self.cfg.batch_limit {
                break;
            }
            if state.is_processed(event.id) || !seen.insert(event.id) {
                continue;
            }

            let unlocked: Vec<&BetOption> = event.options.iter().filter(|o| !o.locked).collect();
            if unlocked.is_empty() {
                continue;
            }

            if self.cfg.random_skip_rate > 0.0 && self.rng.gen::<f64>() < self.cfg.random_skip_rate {
                continue;
            }

            let admissible: Vec<&BetOption> = unlocked
                .into_iter()
                .filter(|o| ceiling.map_or(true, |max| o.odd <= max))
                .collect();

            match self.choose(&admissible) {
                Some(option) => batch.proposals.push(Proposal {
                    event_id: event.id,
                    event_label: event.label.clone(),
                    option: option.clone(),
                }),
                None => batch.rejected.push(event.id),
            }
        }

        batch
    }

    /// Volba jedné možnosti podle módu. Prázdné `candidates` → `None`.
    pub fn choose<'a>(&mut self, candidates: &[&'a BetOption]) -> Option<&'a BetOption> {
        if candidates.is_empty() {
            return None;
        }
        match self.cfg.mode {
            SelectionMode::Priority => self.by_preference(candidates).or_else(|| lowest(candidates)),
            SelectionMode::MinOdd => self.min_odd(candidates),
            SelectionMode::RoundRobin => {
                let pick = match self.cfg.preference.len() {
                    0 => None,
                    n => {
                        let wanted = &self.cfg.preference[self.rr_index % n];
                        candidates.iter().copied().find(|o| same_label(&o.label, wanted))
                    }
                };
                self.rr_index = self.rr_index.wrapping_add(1);
                pick.or_else(|| lowest(candidates))
            }
            SelectionMode::OverUnderLine => self.over_under(candidates),
        }
    }

    fn preference_rank(&self, label: &str) -> usize {
        self.cfg
            .preference
            .iter()
            .position(|p| same_label(p, label))
            .unwrap_or(usize::MAX)
    }

    fn by_preference<'a>(&self, candidates: &[&'a BetOption]) -> Option<&'a BetOption> {
        self.cfg
            .preference
            .iter()
            .find_map(|wanted| candidates.iter().copied().find(|o| same_label(&o.label, wanted)))
    }

    fn min_odd<'a>(&self, candidates: &[&'a BetOption]) -> Option<&'a BetOption> {
        candidates.iter().copied().min_by(|a, b| {
            a.odd
                .total_cmp(&b.odd)
                .then_with(|| self.preference_rank(&a.label).cmp(&self.preference_rank(&b.label)))
        })
    }

    fn over_under<'a>(&self, candidates: &[&'a BetOption]) -> Option<&'a BetOption> {
        let on_line: Vec<(OuSide, &'a BetOption)> = candidates
            .iter()
            .filter_map(|o| {
                let (side, line) = parse_ou_label(&o.label)?;
                ((line - self.cfg.ou_line).abs() < LINE_TOLERANCE).then_some((side, *o))
            })
            .collect();

        let side_pick = |side: OuSide| {
            on_line
                .iter()
                .filter(|(s, _)| *s == side)
                .map(|(_, o)| *o)
                .min_by(by_odd)
        };

        // mimo linku se nesází, event je pak odmítnutý
        side_pick(self.cfg.ou_side).or_else(|| side_pick(self.cfg.ou_side.other()))
    }
}

fn lowest<'a>(candidates: &[&'a BetOption]) -> Option<&'a BetOption> {
    candidates.iter().copied().min_by(by_odd)
}
