//! Scriptovaná stránka v paměti pro testy loaderu, kliku, sázky a runneru

use anyhow::{anyhow, bail, Result};
use page_driver::{js_string, PageController};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone)]
pub enum Effect {
    Show(String),
    Hide(String),
    SetText(String, String),
    /// Web přesměruje jinam (detail zápasu apod.)
    Navigate(String),
}

pub struct FakePage {
    url: RefCell<String>,
    /// HTML výpisu; klávesa End posune na další snapshot (lazy load)
    snapshots: RefCell<Vec<String>>,
    cursor: Cell<usize>,
    existing: RefCell<HashSet<String>>,
    texts: RefCell<HashMap<String, String>>,
    selected: RefCell<HashSet<String>>,
    dead_clicks: RefCell<HashMap<String, u32>>,
    failing_clicks: RefCell<HashSet<String>>,
    after_click: RefCell<HashMap<String, Vec<Effect>>>,
    rules: RefCell<Vec<(String, VecDeque<Value>)>>,
    broken_eval: Cell<bool>,
    broken_content: Cell<bool>,
    pub actions: RefCell<Vec<String>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            url: RefCell::new("about:blank".to_string()),
            snapshots: RefCell::new(Vec::new()),
            cursor: Cell::new(0),
            existing: RefCell::new(HashSet::new()),
            texts: RefCell::new(HashMap::new()),
            selected: RefCell::new(HashSet::new()),
            dead_clicks: RefCell::new(HashMap::new()),
            failing_clicks: RefCell::new(HashSet::new()),
            after_click: RefCell::new(HashMap::new()),
            rules: RefCell::new(Vec::new()),
            broken_eval: Cell::new(false),
            broken_content: Cell::new(false),
            actions: RefCell::new(Vec::new()),
        }
    }

    pub fn with_snapshots(self, snapshots: Vec<String>) -> Self {
        *self.snapshots.borrow_mut() = snapshots;
        self
    }

    pub fn show(&self, selector: &str) {
        self.existing.borrow_mut().insert(selector.to_string());
    }

    pub fn set_text(&self, selector: &str, text: &str) {
        self.show(selector);
        self.texts.borrow_mut().insert(selector.to_string(), text.to_string());
    }

    pub fn set_url(&self, url: &str) {
        *self.url.borrow_mut() = url.to_string();
    }

    /// Prvních `n` kliků na `handle` stránka ignoruje
    pub fn ignore_clicks(&self, handle: &str, n: u32) {
        self.dead_clicks.borrow_mut().insert(handle.to_string(), n);
    }

    pub fn fail_clicks_on(&self, selector: &str) {
        self.failing_clicks.borrow_mut().insert(selector.to_string());
    }

    pub fn on_click(&self, selector: &str, effect: Effect) {
        self.after_click
            .borrow_mut()
            .entry(selector.to_string())
            .or_default()
            .push(effect);
    }

    /// Skript obsahující `needle` vrací postupně `values`, poslední hodnota zůstává
    pub fn rule(&self, needle: &str, values: Vec<Value>) {
        self.rules.borrow_mut().push((needle.to_string(), values.into()));
    }

    pub fn break_eval(&self) {
        self.broken_eval.set(true);
    }

    pub fn break_content(&self) {
        self.broken_content.set(true);
    }

    pub fn is_selected(&self, handle: &str) -> bool {
        self.selected.borrow().contains(handle)
    }

    pub fn count_actions(&self, prefix: &str) -> usize {
        self.actions.borrow().iter().filter(|a| a.starts_with(prefix)).count()
    }

    fn current_snapshot(&self) -> String {
        let snapshots = self.snapshots.borrow();
        snapshots
            .get(self.cursor.get())
            .or_else(|| snapshots.last())
            .cloned()
            .unwrap_or_default()
    }

    fn apply(&self, effect: &Effect) {
        match effect {
            Effect::Show(sel) => self.show(sel),
            Effect::Hide(sel) => {
                self.existing.borrow_mut().remove(sel);
                self.texts.borrow_mut().remove(sel);
            }
            Effect::SetText(sel, text) => self.set_text(sel, text),
            Effect::Navigate(url) => self.set_url(url),
        }
    }

    fn scripted(&self, script: &str) -> Option<Value> {
        let mut rules = self.rules.borrow_mut();
        let (_, values) = rules.iter_mut().find(|(needle, _)| script.contains(needle.as_str()))?;
        if values.len() > 1 {
            values.pop_front()
        } else {
            values.front().cloned()
        }
    }

    fn count_of(&self, script: &str) -> Option<usize> {
        let inner = script
            .strip_prefix("document.querySelectorAll(")?
            .strip_suffix(").length")?;
        let selector: String = serde_json::from_str(inner).ok()?;
        if selector.contains("game-events-container") {
            return Some(self.current_snapshot().matches("game-events-container").count());
        }
        Some(usize::from(self.existing.borrow().contains(&selector)))
    }
}

impl PageController for FakePage {
    fn navigate(&self, url: &str) -> Result<()> {
        self.actions.borrow_mut().push(format!("nav:{url}"));
        self.set_url(url);
        // znovu načtený výpis začíná zase nahoře
        self.cursor.set(0);
        Ok(())
    }

    fn current_url(&self) -> String {
        self.url.borrow().clone()
    }

    fn content(&self) -> Result<String> {
        if self.broken_content.get() {
            bail!("target closed");
        }
        Ok(self.current_snapshot())
    }

    fn exists(&self, selector: &str) -> Result<bool> {
        Ok(self.existing.borrow().contains(selector))
    }

    fn click(&self, selector: &str) -> Result<()> {
        self.actions.borrow_mut().push(format!("click:{selector}"));
        if self.failing_clicks.borrow().contains(selector) {
            bail!("element {selector} is not clickable");
        }

        let swallowed = match self.dead_clicks.borrow_mut().get_mut(selector) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        };
        if !swallowed {
            let mut selected = self.selected.borrow_mut();
            if !selected.remove(selector) {
                selected.insert(selector.to_string());
            }
        }

        let effects = self.after_click.borrow().get(selector).cloned().unwrap_or_default();
        for effect in &effects {
            self.apply(effect);
        }
        Ok(())
    }

    fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        if !self.existing.borrow().contains(selector) {
            bail!("input {selector} not found");
        }
        self.actions.borrow_mut().push(format!("type:{selector}={text}"));
        Ok(())
    }

    fn evaluate(&self, script: &str) -> Result<Value> {
        if self.broken_eval.get() {
            return Err(anyhow!("execution context was destroyed"));
        }
        if let Some(value) = self.scripted(script) {
            return Ok(value);
        }
        if script.contains("event-bet--selected") {
            let hit = self
                .selected
                .borrow()
                .iter()
                .any(|handle| script.contains(&js_string(handle)));
            return Ok(Value::Bool(hit));
        }
        if let Some(n) = self.count_of(script) {
            return Ok(Value::from(n));
        }
        Ok(Value::Null)
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.actions.borrow_mut().push(format!("key:{key}"));
        if key == "End" {
            let last = self.snapshots.borrow().len().saturating_sub(1);
            self.cursor.set((self.cursor.get() + 1).min(last));
        }
        Ok(())
    }

    fn read_text(&self, selector: &str) -> Result<Option<String>> {
        Ok(self.texts.borrow().get(selector).cloned())
    }

    fn scroll_into_view(&self, selector: &str) -> Result<()> {
        self.actions.borrow_mut().push(format!("scroll:{selector}"));
        Ok(())
    }
}

/// HTML výpisu s DC zápasy `(id, [(label, odd)])`, id možností `p-<id>-<i>`
pub fn listing_html(events: &[(u64, &[(&str, &str)])]) -> String {
    let mut html = String::from("<html><body><div class=\"section-middle\">");
    for (id, options) in events {
        html.push_str(&format!(
            r#"<div class="game-events-container prematch"><a href="/event/{id}">
<span class="scoreboard-participant-name">Home{id}</span>
<span class="scoreboard-participant-name">Away{id}</span></a>"#
        ));
        for (i, (label, odd)) in options.iter().enumerate() {
            html.push_str(&format!(
                r#"<div class="event-bet-wrapper bet-price"><div class="event-bet"><div class="anchor-wrap" id="p-{id}-{i}">
<span class="event-selection">{label}</span><span class="event-odds"><span>{odd}</span></span></div></div></div>"#
            ));
        }
        html.push_str("</div>");
    }
    html.push_str("</div></body></html>");
    html
}

pub fn handle(event_id: u64, index: usize) -> String {
    format!(r#"[id="p-{event_id}-{index}"]"#)
}
