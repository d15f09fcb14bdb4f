//! headless_chrome implementace `PageController`

use anyhow::{Context, Result};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::Deserialize;
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::{js_string, PageController};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub sandbox: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Minimální rozestup mezi akcemi na stránce (obdoba slowMo)
    pub action_interval_ms: u64,
    pub default_timeout_ms: u64,
    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            sandbox: false,
            window_width: 1366,
            window_height: 820,
            action_interval_ms: 50,
            default_timeout_ms: 30_000,
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

pub struct ChromePage {
    // Browser musí žít stejně dlouho jako tab
    _browser: Browser,
    tab: Arc<Tab>,
    pacer: Option<DefaultDirectRateLimiter>,
}

impl ChromePage {
    pub fn launch(cfg: &BrowserConfig) -> Result<Self> {
        let ua_arg = cfg.user_agent.as_ref().map(|ua| format!("--user-agent={ua}"));
        let mut args: Vec<&OsStr> = vec![OsStr::new("--start-maximized")];
        if let Some(arg) = ua_arg.as_deref() {
            args.push(OsStr::new(arg));
        }

        let options = LaunchOptions::default_builder()
            .headless(cfg.headless)
            .sandbox(cfg.sandbox)
            .window_size(Some((cfg.window_width, cfg.window_height)))
            .idle_browser_timeout(Duration::from_secs(600))
            .args(args)
            .build()
            .context("Failed to build Chrome launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome")?;
        let tab = browser.new_tab().context("Failed to create browser tab")?;
        tab.set_default_timeout(Duration::from_millis(cfg.default_timeout_ms));

        let pacer = Quota::with_period(Duration::from_millis(cfg.action_interval_ms))
            .map(RateLimiter::direct);

        info!("🌐 Chrome launched (headless={}, {}x{})", cfg.headless, cfg.window_width, cfg.window_height);

        Ok(Self { _browser: browser, tab, pacer })
    }

    /// Blokující čekání na další slot paceru
    fn pace(&self) {
        let Some(pacer) = &self.pacer else { return };
        let clock = DefaultClock::default();
        while let Err(not_until) = pacer.check() {
            std::thread::sleep(not_until.wait_time_from(clock.now()));
        }
    }
}

impl PageController for ChromePage {
    fn navigate(&self, url: &str) -> Result<()> {
        self.pace();
        debug!("navigate → {}", url);
        self.tab.navigate_to(url).context("Chrome navigate failed")?;
        self.tab.wait_until_navigated().context("Chrome navigation did not settle")?;
        Ok(())
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn content(&self) -> Result<String> {
        self.tab.get_content().context("Failed to read HTML from browser tab")
    }

    fn exists(&self, selector: &str) -> Result<bool> {
        let script = format!("document.querySelector({}) !== null", js_string(selector));
        Ok(self.evaluate(&script)?.as_bool().unwrap_or(false))
    }

    fn click(&self, selector: &str) -> Result<()> {
        self.pace();
        self.tab
            .find_element(selector)
            .with_context(|| format!("Element {selector} not found"))?
            .click()
            .with_context(|| format!("Click on {selector} failed"))?;
        Ok(())
    }

    fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        self.pace();
        self.tab
            .find_element(selector)
            .with_context(|| format!("Input {selector} not found"))?
            .type_into(text)
            .with_context(|| format!("Typing into {selector} failed"))?;
        Ok(())
    }

    fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let remote = self
            .tab
            .evaluate(script, false)
            .context("Chrome evaluate failed")?;
        Ok(remote.value.unwrap_or(serde_json::Value::Null))
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.pace();
        self.tab.press_key(key).with_context(|| format!("Key press {key} failed"))?;
        Ok(())
    }

    fn read_text(&self, selector: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); return el ? (el.textContent || '').trim() : null; }})()",
            js_string(selector)
        );
        Ok(self.evaluate(&script)?.as_str().map(str::to_string))
    }

    fn scroll_into_view(&self, selector: &str) -> Result<()> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); if (el) el.scrollIntoView({{ block: 'center' }}); return !!el; }})()",
            js_string(selector)
        );
        self.evaluate(&script)?;
        Ok(())
    }
}
