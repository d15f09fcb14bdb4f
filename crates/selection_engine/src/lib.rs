//! Selection Engine pro kombinované tikety
//! Čistá logika bez I/O: výpis → návrhy → akumulace kurzů

pub mod listing;
pub mod model;
pub mod odds;
pub mod state;
pub mod strategy;

pub use listing::{extract_event_id, ListingParser, ListingSelectors};
pub use model::{BetOption, Event, Proposal, Selection};
pub use odds::{combined_odds, parse_amount, parse_decimal_odd};
pub use state::{RunLimits, RunPhase, RunState};
pub use strategy::{parse_ou_label, Batch, OuSide, SelectionEngine, SelectionMode, StrategyConfig};
