/// AccaLive — Logger
/// JSONL event stream průběhu běhu, NTFY alerty

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let date  = Utc::now().format("%Y-%m-%d").to_string();
        let path  = self.log_dir.join(format!("{date}.jsonl"));
        let line  = serde_json::to_string(event)?;
        let mut f = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event typy ────────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct RunStartedEvent {
    pub ts:           String,
    pub event:        &'static str,   // "RUN_STARTED"
    pub listing_url:  String,
    pub mode:         String,         // "priority" | "min_odd" | "round_robin" | "over_under_line"
    pub target_odds:  f64,
    pub max_odd:      Option<f64>,    // strop na jeden tip
    pub stake:        Option<f64>,
}

#[derive(Serialize, Debug)]
pub struct ScrollProgressEvent {
    pub ts:            String,
    pub event:         &'static str,  // "SCROLL_PROGRESS"
    pub loop_no:       u32,
    pub visible:       usize,
    pub idle_loops:    u32,
    pub total_odds:    f64,
    pub selections:    usize,
}

#[derive(Serialize, Debug)]
pub struct SelectionEvent {
    pub ts:           String,
    pub event:        &'static str,   // "SELECTION_CONFIRMED" | "SELECTION_FAILED"
    pub event_id:     u64,
    pub match_label:  String,
    pub option:       String,
    pub odd:          f64,
    pub attempts:     u32,
    pub total_odds:   f64,
    pub page_total:   Option<f64>,    // hodnota z tiketu, pokud šla přečíst
}

#[derive(Serialize, Debug)]
pub struct RunFinishedEvent {
    pub ts:             String,
    pub event:          &'static str, // "RUN_FINISHED"
    pub outcome:        String,       // "target_reached" | "idle_exhausted" | "loop_limit_reached" | "max_selections_reached"
    pub total_odds:     f64,
    pub target_odds:    f64,
    pub selections:     usize,
    pub loops:          u32,
    pub efficiency_pct: f64,
}

#[derive(Serialize, Debug)]
pub struct StakeResultEvent {
    pub ts:              String,
    pub event:           &'static str, // "STAKE_RESULT"
    pub amount:          f64,
    pub placed:          bool,
    pub reason:          String,
    pub balance_before:  Option<f64>,
    pub balance_after:   Option<f64>,
    pub potential_win:   f64,
}

const NTFY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Pošli čitelný push alert. Nikdy neselže.
pub async fn send_ntfy_alert(topic: &str, msg: &str, title: &str) {
    let client = reqwest::Client::new();
    let request = client
        .post(format!("https://ntfy.sh/{topic}"))
        .header("Title", title)
        .header("Priority", "high")
        .header("Tags", "soccer")
        .body(msg.to_string())
        .send();

    match tokio::time::timeout(NTFY_TIMEOUT, request).await {
        Ok(Ok(_))  => tracing::info!("NTFY sent: {}", title),
        Ok(Err(e)) => tracing::warn!("NTFY failed: {}", e),
        Err(_)     => tracing::warn!("NTFY timed out after {:?}", NTFY_TIMEOUT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_appends_one_json_line_per_event() {
        let dir = std::env::temp_dir().join(format!("acca-logger-{}", std::process::id()));
        let logger = EventLogger::new(&dir);

        for loop_no in 1..=2 {
            logger
                .log(&ScrollProgressEvent {
                    ts: now_iso(),
                    event: "SCROLL_PROGRESS",
                    loop_no,
                    visible: 10 * loop_no as usize,
                    idle_loops: 0,
                    total_odds: 1.0,
                    selections: 0,
                })
                .unwrap();
        }

        let date = Utc::now().format("%Y-%m-%d").to_string();
        let content = fs::read_to_string(dir.join(format!("{date}.jsonl"))).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"], "SCROLL_PROGRESS");
        assert_eq!(second["visible"], 20);

        fs::remove_dir_all(&dir).ok();
    }
}
