//! Page driver — tenká vrstva nad vzdáleně ovládanou stránkou
//!
//! Zbytek workspace zná jen trait `PageController`. Reálná implementace
//! `ChromePage` jede přes headless_chrome (CDP), testy si podstrčí fake.
//!
//! Všechna volání jsou blokující, bot běží lineárně v jednom vlákně
//! (`tokio::task::spawn_blocking` v binárce).

mod chrome;

pub use chrome::{BrowserConfig, ChromePage};

use anyhow::Result;
use std::time::{Duration, Instant};

/// Schopnosti stránky, které bot potřebuje.
///
/// Každé volání může selhat (element zmizel, stránka se přerenderovala);
/// volající rozhoduje, zda je chyba fatální.
pub trait PageController {
    fn navigate(&self, url: &str) -> Result<()>;

    fn current_url(&self) -> String;

    /// Aktuální HTML celého dokumentu
    fn content(&self) -> Result<String>;

    fn exists(&self, selector: &str) -> Result<bool>;

    fn click(&self, selector: &str) -> Result<()>;

    fn type_text(&self, selector: &str, text: &str) -> Result<()>;

    /// Spustí JS výraz v kontextu stránky a vrátí jeho JSON hodnotu
    fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    fn press_key(&self, key: &str) -> Result<()>;

    /// Oříznutý textContent prvního elementu, `None` když neexistuje
    fn read_text(&self, selector: &str) -> Result<Option<String>>;

    fn scroll_into_view(&self, selector: &str) -> Result<()>;

    /// Polluje `exists` dokud element nepřibyde nebo nevyprší timeout.
    /// Timeout znamená "nenalezeno", ne chybu.
    fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool> {
        let poll = Duration::from_millis(100).min(timeout);
        let started = Instant::now();
        loop {
            if self.exists(selector).unwrap_or(false) {
                return Ok(true);
            }
            if started.elapsed() >= timeout {
                return Ok(false);
            }
            std::thread::sleep(poll);
        }
    }
}

/// Zabalí CSS selektor / text do JS string literálu
pub fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct AppearsAfter {
        polls: Cell<u32>,
        after: u32,
    }

    impl PageController for AppearsAfter {
        fn navigate(&self, _url: &str) -> Result<()> { Ok(()) }
        fn current_url(&self) -> String { String::new() }
        fn content(&self) -> Result<String> { Ok(String::new()) }
        fn exists(&self, _selector: &str) -> Result<bool> {
            self.polls.set(self.polls.get() + 1);
            Ok(self.polls.get() > self.after)
        }
        fn click(&self, _selector: &str) -> Result<()> { Ok(()) }
        fn type_text(&self, _selector: &str, _text: &str) -> Result<()> { Ok(()) }
        fn evaluate(&self, _script: &str) -> Result<serde_json::Value> { Ok(serde_json::Value::Null) }
        fn press_key(&self, _key: &str) -> Result<()> { Ok(()) }
        fn read_text(&self, _selector: &str) -> Result<Option<String>> { Ok(None) }
        fn scroll_into_view(&self, _selector: &str) -> Result<()> { Ok(()) }
    }

    #[test]
    fn wait_for_selector_sees_late_element() {
        let page = AppearsAfter { polls: Cell::new(0), after: 2 };
        assert!(page.wait_for_selector(".late", Duration::from_secs(2)).unwrap());
        assert_eq!(page.polls.get(), 3);
    }

    #[test]
    fn wait_for_selector_timeout_is_not_found() {
        let page = AppearsAfter { polls: Cell::new(0), after: u32::MAX };
        assert!(!page.wait_for_selector(".never", Duration::ZERO).unwrap());
    }

    #[test]
    fn js_string_escapes_quotes() {
        assert_eq!(js_string(r#"a[href^="/event/"]"#), r#""a[href^=\"/event/\"]""#);
    }
}
