//! RunState — akumulátor kurzů a stav běhu
//!
//! Jediné místo, kde se mění součin kurzů, počítadla smyček a množina
//! zpracovaných zápasů. Fáze jde jen jedním směrem: z `Accumulating` do
//! některé z koncových.

use serde::Serialize;
use std::collections::HashSet;

use crate::model::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Accumulating,
    TargetReached,
    /// N smyček po sobě bez nových zápasů ve výpisu
    IdleExhausted,
    LoopLimitReached,
    MaxSelectionsReached,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Accumulating => "accumulating",
            RunPhase::TargetReached => "target_reached",
            RunPhase::IdleExhausted => "idle_exhausted",
            RunPhase::LoopLimitReached => "loop_limit_reached",
            RunPhase::MaxSelectionsReached => "max_selections_reached",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunPhase::Accumulating)
    }
}

#[derive(Debug, Clone)]
pub struct RunLimits {
    pub target_odds: f64,
    /// Strop kurzu jednoho tipu
    pub max_odd: Option<f64>,
    pub max_selections: usize,
    pub max_loops: u32,
    pub idle_threshold: u32,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            target_odds: 1000.0,
            max_odd: None,
            max_selections: 200,
            max_loops: 120,
            idle_threshold: 8,
        }
    }
}

#[derive(Debug)]
pub struct RunState {
    limits: RunLimits,
    local_product: f64,
    /// Celkový kurz vykreslený stránkou po posledním potvrzení
    page_total: Option<f64>,
    selections: Vec<Selection>,
    processed: HashSet<u64>,
    loops: u32,
    idle_loops: u32,
    last_visible: usize,
    phase: RunPhase,
}

impl RunState {
    pub fn new(limits: RunLimits) -> Self {
        Self {
            limits,
            local_product: 1.0,
            page_total: None,
            selections: Vec::new(),
            processed: HashSet::new(),
            loops: 0,
            idle_loops: 0,
            last_visible: 0,
            phase: RunPhase::Accumulating,
        }
    }

    /// Autoritativní celkový kurz: hodnota ze stránky, jinak lokální součin
    pub fn total_odds(&self) -> f64 {
        self.page_total.unwrap_or(self.local_product)
    }

    pub fn local_product(&self) -> f64 {
        self.local_product
    }

    pub fn target_odds(&self) -> f64 {
        self.limits.target_odds
    }

    pub fn max_odd(&self) -> Option<f64> {
        self.limits.max_odd
    }

    pub fn limits(&self) -> &RunLimits {
        &self.limits
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn loops(&self) -> u32 {
        self.loops
    }

    pub fn idle_loops(&self) -> u32 {
        self.idle_loops
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn is_processed(&self, event_id: u64) -> bool {
        self.processed.contains(&event_id)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Vrací false, pokud už zápas zpracovaný byl
    pub fn mark_processed(&mut self, event_id: u64) -> bool {
        self.processed.insert(event_id)
    }

    /// Potvrzený tip: vynásobí součin, případně převezme kurz ze stránky
    /// a vyhodnotí cíl / limit tipů.
    pub fn confirm(&mut self, selection: Selection, page_total: Option<f64>) -> RunPhase {
        if self.phase.is_terminal() {
            return self.phase;
        }

        self.processed.insert(selection.event_id);
        self.local_product *= selection.odd;
        self.page_total = page_total.filter(|t| t.is_finite() && *t > 0.0);
        self.selections.push(selection);

        if self.total_odds() >= self.limits.target_odds {
            self.phase = RunPhase::TargetReached;
        } else if self.selections.len() >= self.limits.max_selections {
            self.phase = RunPhase::MaxSelectionsReached;
        }
        self.phase
    }

    /// Konec jedné smyčky loaderu. Počet viditelných zápasů, který nevzrostl
    /// proti předchozí smyčce, je idle smyčka (i když se ho nepodařilo
    /// změřit, pak přijde 0). Po návratu na výpis se počítá znovu odspodu.
    pub fn end_loop(&mut self, visible: usize) -> RunPhase {
        self.loops += 1;
        if visible > self.last_visible {
            self.idle_loops = 0;
        } else {
            self.idle_loops += 1;
        }
        self.last_visible = visible;

        if !self.phase.is_terminal() {
            if self.idle_loops >= self.limits.idle_threshold {
                self.phase = RunPhase::IdleExhausted;
            } else if self.loops >= self.limits.max_loops {
                self.phase = RunPhase::LoopLimitReached;
            }
        }
        self.phase
    }

    /// Kolik procent cíle je splněno
    pub fn efficiency_pct(&self) -> f64 {
        if self.limits.target_odds <= 0.0 {
            return 0.0;
        }
        self.total_odds() / self.limits.target_odds * 100.0
    }
}
