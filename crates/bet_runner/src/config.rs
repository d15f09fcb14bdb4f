//! Konfigurace jednoho běhu — JSON soubor, každé pole má default

use anyhow::{bail, Context, Result};
use page_driver::BrowserConfig;
use selection_engine::{ListingSelectors, RunLimits, StrategyConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Celkový kurz, při kterém se běh zastaví
    pub target_odds: f64,
    /// Strop kurzu jednoho tipu
    pub max_odd_per_selection: Option<f64>,
    pub max_selections: usize,
    pub strategy: StrategyConfig,
    pub loader: LoaderConfig,
    pub click: ClickConfig,
    /// Pauza po chybě v iteraci
    pub cooldown_ms: u64,
    pub site: SiteConfig,
    pub browser: BrowserConfig,
    pub credentials: Option<Credentials>,
    pub stake: Option<StakeConfig>,
    pub log_dir: String,
    pub ntfy_topic: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_odds: 1000.0,
            max_odd_per_selection: None,
            max_selections: 200,
            strategy: StrategyConfig::default(),
            loader: LoaderConfig::default(),
            click: ClickConfig::default(),
            cooldown_ms: 5_000,
            site: SiteConfig::default(),
            browser: BrowserConfig::default(),
            credentials: None,
            stake: None,
            log_dir: "logs".to_string(),
            ntfy_topic: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub max_loops: u32,
    /// Kolik smyček po sobě bez nových zápasů ukončí běh
    pub idle_threshold: u32,
    pub wait_ms: u64,
    pub end_key_wait_ms: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { max_loops: 120, idle_threshold: 8, wait_ms: 1_000, end_key_wait_ms: 300 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClickConfig {
    pub max_attempts: u32,
    /// Pauza mezi scrollIntoView a klikem
    pub pre_click_ms: u64,
    /// Pauza po kliku, než se čte marker
    pub settle_ms: u64,
    pub retry_delay_ms: u64,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self { max_attempts: 3, pre_click_ms: 120, settle_ms: 250, retry_delay_ms: 400 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub listing_url: String,
    /// Úsek cesty, podle kterého poznáme, že jsme pořád na výpisu
    pub listing_path: String,
    pub listing: ListingSelectors,
    pub scroll_container: String,
    pub total_odds: String,
    pub stake_input: String,
    pub place_button: String,
    pub receipt: String,
    pub betslip_entry: String,
    pub balance: Vec<String>,
    pub login_link: String,
    pub country_code_input: String,
    pub phone_input: String,
    pub password_input: String,
    pub login_button: String,
    pub wait_timeout_ms: u64,
    pub confirm_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.betpawa.cm".to_string(),
            listing_url: "https://www.betpawa.cm/events?marketId=DC&categoryId=2".to_string(),
            listing_path: "/events".to_string(),
            listing: ListingSelectors::default(),
            scroll_container: ".section-middle .scrollable-content".to_string(),
            total_odds: ".betslip-total-odds, [data-test-id=\"totalOdds\"]".to_string(),
            stake_input: "#betslip-form-stake-input".to_string(),
            place_button: ".place-bet.button-primary".to_string(),
            receipt: ".betslip-receipt".to_string(),
            betslip_entry: ".betslip-bet".to_string(),
            balance: vec![
                "span.button.balance".to_string(),
                ".header-buttons-authenticated .button.balance".to_string(),
                ".balance-amount".to_string(),
            ],
            login_link: r#"a.button.button-accent[href="/login"]"#.to_string(),
            country_code_input: ".country-code".to_string(),
            phone_input: "#login-form-phoneNumber".to_string(),
            password_input: "#login-form-password-input".to_string(),
            login_button: r#"input[data-test-id="logInButton"]"#.to_string(),
            wait_timeout_ms: 15_000,
            confirm_timeout_ms: 15_000,
            poll_interval_ms: 250,
        }
    }
}

impl SiteConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub country_code: String,
    pub phone: String,
    pub password: String,
}

// heslo nikdy do logu
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("country_code", &self.country_code)
            .field("phone", &self.phone)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StakeConfig {
    pub amount: f64,
    /// Vsadit automaticky po dosažení cíle, jinak jen vyplnit tiket ručně
    pub auto_place: bool,
    /// Tolerance při kontrole poklesu zůstatku
    pub balance_tolerance: f64,
}

impl Default for StakeConfig {
    fn default() -> Self {
        Self { amount: 1.0, auto_place: false, balance_tolerance: 0.1 }
    }
}

impl RunConfig {
    /// Načte config ze souboru; chybějící soubor = defaulty
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("⚠️ Config {:?} nenalezen, jedu s defaulty", path);
            let cfg = Self::default();
            cfg.validate()?;
            return Ok(cfg);
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let cfg = Self::from_json(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!("📄 Config načten z {:?}", path);
        Ok(cfg)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(raw).context("Failed to parse config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.target_odds > 1.0) {
            bail!("target_odds must be > 1 (got {})", self.target_odds);
        }
        if let Some(max) = self.max_odd_per_selection {
            if !(max > 1.0) {
                bail!("max_odd_per_selection must be > 1 (got {max})");
            }
        }
        let skip = self.strategy.random_skip_rate;
        if !(0.0..1.0).contains(&skip) {
            bail!("random_skip_rate must be in [0, 1) (got {skip})");
        }
        if self.strategy.batch_limit == 0 {
            bail!("batch_limit must be at least 1");
        }
        if self.max_selections == 0 {
            bail!("max_selections must be at least 1");
        }
        if let Some(stake) = &self.stake {
            if !(stake.amount >= 1.0) {
                bail!("stake amount must be >= 1 (got {})", stake.amount);
            }
        }
        if self.click.max_attempts == 0 {
            bail!("click.max_attempts must be at least 1");
        }
        Ok(())
    }

    pub fn limits(&self) -> RunLimits {
        RunLimits {
            target_odds: self.target_odds,
            max_odd: self.max_odd_per_selection,
            max_selections: self.max_selections,
            max_loops: self.loader.max_loops,
            idle_threshold: self.loader.idle_threshold,
        }
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}
