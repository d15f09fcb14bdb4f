use serde::{Deserialize, Serialize};

/// Zápas tak, jak je právě vidět ve výpisu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub label: String,          // "Home - Away"
    pub options: Vec<BetOption>,
}

/// Jedna klikací možnost v zápase ("1X", "X2", "Over 2.5", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetOption {
    pub label: String,
    pub odd: f64,
    pub locked: bool,
    /// CSS selektor klikacího prvku
    pub handle: String,
}

/// Návrh k prokliknutí, ještě nic nezměnil
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub event_id: u64,
    pub event_label: String,
    pub option: BetOption,
}

/// Potvrzený tip s kurzem v okamžiku kliknutí
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub event_id: u64,
    pub event_label: String,
    pub option_label: String,
    pub odd: f64,
}

impl From<&Proposal> for Selection {
    fn from(p: &Proposal) -> Self {
        Self {
            event_id: p.event_id,
            event_label: p.event_label.clone(),
            option_label: p.option.label.clone(),
            odd: p.option.odd,
        }
    }
}
