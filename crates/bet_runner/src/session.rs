//! Stránkové okolí běhu: výpis, cookie lišta, přihlášení, zůstatek, kurz tiketu

use anyhow::{bail, Context, Result};
use page_driver::PageController;
use selection_engine::{parse_amount, parse_decimal_odd};
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{Credentials, SiteConfig};
use crate::scripts;

/// Otevře výpis a počká na první zápasy. Prázdný výpis není chyba,
/// loader si s ním poradí.
pub fn open_listing<P: PageController + ?Sized>(page: &P, site: &SiteConfig) -> Result<()> {
    info!("➡️ Navigace na výpis: {}", site.listing_url);
    page.navigate(&site.listing_url)
        .with_context(|| format!("Failed to open listing {}", site.listing_url))?;

    if dismiss_cookie_banner(page) {
        info!("🍪 Cookie lišta zavřena");
    }

    if !page.wait_for_selector(&site.listing.event_container, site.wait_timeout())? {
        warn!("⚠️ Výpis zatím bez zápasů ({})", site.listing.event_container);
    }
    Ok(())
}

/// Vrátí stránku na výpis, pokud z něj odjela (klik na zápas, redirect).
/// `true` = bylo potřeba navigovat.
pub fn ensure_on_listing<P: PageController + ?Sized>(page: &P, site: &SiteConfig) -> Result<bool> {
    let url = page.current_url();
    if url.contains(&site.listing_path) {
        return Ok(false);
    }
    warn!("🧭 Stránka odjela z výpisu ({}), vracím se", url);
    page.navigate(&site.listing_url)
        .with_context(|| format!("Failed to return to listing {}", site.listing_url))?;
    Ok(true)
}

/// Best-effort, chyba = lišta nebyla
pub fn dismiss_cookie_banner<P: PageController + ?Sized>(page: &P) -> bool {
    match page.evaluate(&scripts::dismiss_cookie_banner()) {
        Ok(v) => v.as_bool().unwrap_or(false),
        Err(e) => {
            debug!("cookie banner check failed: {}", e);
            false
        }
    }
}

/// Zůstatek z prvního selektoru, který má čitelné číslo
pub fn read_balance<P: PageController + ?Sized>(page: &P, site: &SiteConfig) -> Option<f64> {
    site.balance.iter().find_map(|sel| {
        let text = page.read_text(sel).ok().flatten()?;
        parse_amount(&text)
    })
}

fn balance_visible<P: PageController + ?Sized>(page: &P, site: &SiteConfig) -> bool {
    site.balance.iter().any(|sel| page.exists(sel).unwrap_or(false))
}

/// Celkový kurz vykreslený na tiketu, pokud jde přečíst
pub fn read_total_odds<P: PageController + ?Sized>(page: &P, site: &SiteConfig) -> Option<f64> {
    let text = page.read_text(&site.total_odds).ok().flatten()?;
    parse_decimal_odd(&text)
}

/// Přihlášení přes formulář. Už přihlášená session se přeskočí.
pub fn login<P: PageController + ?Sized>(page: &P, site: &SiteConfig, creds: &Credentials) -> Result<Option<f64>> {
    if balance_visible(page, site) {
        info!("🔑 Už přihlášeno");
        return Ok(read_balance(page, site));
    }

    let timeout = site.wait_timeout();
    if !page.wait_for_selector(&site.login_link, timeout)? {
        bail!("Login link {} not found", site.login_link);
    }
    page.click(&site.login_link).context("Failed to open login form")?;
    info!("🔑 Přihlašovací formulář otevřen");

    for (selector, value) in [
        (&site.country_code_input, &creds.country_code),
        (&site.phone_input, &creds.phone),
        (&site.password_input, &creds.password),
    ] {
        if !page.wait_for_selector(selector, timeout)? {
            bail!("Login field {} not found", selector);
        }
        page.type_text(selector, value)
            .with_context(|| format!("Failed to fill {selector}"))?;
    }

    page.click(&site.login_button).context("Failed to submit login form")?;

    let logged_in = crate::retry::poll_until(timeout, site.poll_interval(), || balance_visible(page, site));
    if !logged_in {
        bail!("Login did not complete within {:?}", timeout);
    }
    // zůstatek se dorenderuje o chvilku později
    sleep(site.poll_interval().min(Duration::from_secs(1)));

    let balance = read_balance(page, site);
    match balance {
        Some(b) => info!("✅ Přihlášeno, zůstatek {:.2}", b),
        None => warn!("⚠️ Přihlášeno, ale zůstatek nejde přečíst"),
    }
    Ok(balance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{Effect, FakePage};

    fn site() -> SiteConfig {
        SiteConfig { wait_timeout_ms: 0, poll_interval_ms: 0, ..Default::default() }
    }

    fn creds() -> Credentials {
        Credentials { country_code: "+237".into(), phone: "690000000".into(), password: "pw".into() }
    }

    #[test]
    fn drift_triggers_renavigation() {
        let site = site();
        let page = FakePage::new();
        page.set_url("https://www.betpawa.cm/event/123");
        assert!(ensure_on_listing(&page, &site).unwrap());
        assert_eq!(page.current_url(), site.listing_url);
        assert!(!ensure_on_listing(&page, &site).unwrap());
        assert_eq!(page.count_actions("nav:"), 1);
    }

    #[test]
    fn balance_uses_first_readable_selector() {
        let site = site();
        let page = FakePage::new();
        page.set_text("span.button.balance", "Balance");
        page.set_text(".balance-amount", "FCFA 1 490,50");
        assert_eq!(read_balance(&page, &site), Some(1490.5));
    }

    #[test]
    fn total_odds_parsed_from_betslip() {
        let site = site();
        let page = FakePage::new();
        assert_eq!(read_total_odds(&page, &site), None);
        page.set_text(&site.total_odds, "12,75");
        assert_eq!(read_total_odds(&page, &site), Some(12.75));
    }

    #[test]
    fn login_fills_form_and_reads_balance() {
        let site = site();
        let page = FakePage::new();
        page.show(&site.login_link);
        page.on_click(&site.login_link, Effect::Show(site.country_code_input.clone()));
        page.on_click(&site.login_link, Effect::Show(site.phone_input.clone()));
        page.on_click(&site.login_link, Effect::Show(site.password_input.clone()));
        page.on_click(&site.login_button, Effect::SetText("span.button.balance".into(), "FCFA 2,350.00".into()));

        let balance = login(&page, &site, &creds()).unwrap();
        assert_eq!(balance, Some(2350.0));
        assert_eq!(page.count_actions("type:"), 3);
        assert!(page.actions.borrow().contains(&"type:#login-form-phoneNumber=690000000".to_string()));
    }

    #[test]
    fn login_skipped_when_already_authenticated() {
        let site = site();
        let page = FakePage::new();
        page.set_text(".balance-amount", "500");
        assert_eq!(login(&page, &site, &creds()).unwrap(), Some(500.0));
        assert_eq!(page.count_actions("click:"), 0);
    }

    #[test]
    fn login_fails_without_form() {
        let page = FakePage::new();
        assert!(login(&page, &site(), &creds()).is_err());
    }

    #[test]
    fn cookie_banner_is_best_effort() {
        let page = FakePage::new();
        assert!(!dismiss_cookie_banner(&page));
        page.rule("accept", vec![true.into()]);
        assert!(dismiss_cookie_banner(&page));
    }
}
