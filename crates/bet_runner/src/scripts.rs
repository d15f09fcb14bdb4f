//! JS výrazy spouštěné ve stránce přes `PageController::evaluate`
//!
//! Všechny selektory jdou přes `js_string`, nikdy se nevkládají syrově.

use page_driver::js_string;

/// Scroll kontejneru výpisu na konec s odrazem 100 % → 90 % → 100 %
/// a syntetickým `scroll` eventem. Bez kontejneru scrolluje okno.
pub fn rebound_scroll(container: &str, event_container: &str) -> String {
    format!(
        r#"(() => {{
  const events = document.querySelectorAll({events});
  const last = events[events.length - 1];
  if (last) last.scrollIntoView({{ block: 'end' }});
  const container = document.querySelector({container});
  const target = container || document.scrollingElement || document.body;
  const to = target.scrollHeight || document.body.scrollHeight;
  const go = (top) => container ? container.scrollTo({{ top }}) : window.scrollTo({{ top }});
  go(to);
  setTimeout(() => go(to * 0.9), 150);
  setTimeout(() => go(to), 300);
  target.dispatchEvent(new Event('scroll', {{ bubbles: true }}));
  window.dispatchEvent(new Event('scroll'));
  return !!container;
}})()"#,
        events = js_string(event_container),
        container = js_string(container),
    )
}

/// Počet elementů odpovídajících selektoru
pub fn count(selector: &str) -> String {
    format!("document.querySelectorAll({}).length", js_string(selector))
}

/// Je možnost vybraná? Marker na prvku samotném nebo na jeho `.event-bet-wrapper`.
pub fn selection_marker(handle: &str) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({handle});
  if (!el) return false;
  const marked = (node) => !!node && (
    node.classList.contains('selected') ||
    node.classList.contains('active') ||
    node.classList.contains('event-bet--selected') ||
    node.getAttribute('aria-selected') === 'true');
  return marked(el) || marked(el.closest('.event-bet-wrapper'));
}})()"#,
        handle = js_string(handle),
    )
}

/// Existuje a není disabled
pub fn is_enabled(selector: &str) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  return !!el && !el.disabled && !el.classList.contains('disabled') && el.getAttribute('aria-disabled') !== 'true';
}})()"#,
        sel = js_string(selector),
    )
}

/// Vyprázdní input a pošle `input` event, ať si toho framework všimne
pub fn clear_input(selector: &str) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  if (!el) return false;
  el.focus();
  el.value = '';
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  return true;
}})()"#,
        sel = js_string(selector),
    )
}

/// Klikne na první tlačítko cookie lišty (accept / accepter / ok / agree)
pub fn dismiss_cookie_banner() -> String {
    r#"(() => {
  const candidates = Array.from(document.querySelectorAll('button, .button, [role="button"]'));
  const btn = candidates.find((el) => {
    const t = (el.textContent || '').trim().toLowerCase();
    return t.includes('accept') || t === 'ok' || t.includes('agree');
  });
  if (btn) btn.click();
  return !!btn;
})()"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_are_quoted() {
        let s = selection_marker(r#"[id="p-1"]"#);
        assert!(s.contains(r#""[id=\"p-1\"]""#));
        assert!(s.contains("event-bet--selected"));
        assert!(s.contains("aria-selected"));
    }

    #[test]
    fn count_script_shape() {
        assert_eq!(count(".betslip-bet"), r#"document.querySelectorAll(".betslip-bet").length"#);
    }

    #[test]
    fn rebound_scroll_uses_both_selectors() {
        let s = rebound_scroll(".section-middle .scrollable-content", ".game-events-container.prematch");
        assert!(s.contains(r#"".section-middle .scrollable-content""#));
        assert!(s.contains("to * 0.9"));
        assert!(s.contains("dispatchEvent"));
    }
}
