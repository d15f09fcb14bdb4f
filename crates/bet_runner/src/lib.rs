//! Bet runner — řízení jedné stránky sázkovky od výpisu po tiket
//!
//! Blokující kód nad `PageController`: binárka ho pouští přes
//! `tokio::task::spawn_blocking`, testy nad `FakePage`.

pub mod clicker;
pub mod config;
pub mod loader;
pub mod retry;
pub mod runner;
pub mod scripts;
pub mod session;
pub mod stake;

#[cfg(test)]
mod fake;

pub use clicker::{ClickOutcome, ClickVerifier};
pub use config::{ClickConfig, Credentials, LoaderConfig, RunConfig, SiteConfig, StakeConfig};
pub use loader::IncrementalLoader;
pub use retry::{poll_until, RetryPolicy};
pub use runner::{run_session, BetRunner, RunReport, SessionReport};
pub use stake::{Confirmation, StakeOutcome, StakePlacer, StakeReport};
