//! Retry s backoffem a polling s timeoutem
//!
//! Blokující varianta, celý bot běží v jednom vlákně nad jednou stránkou.

use std::thread::sleep;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(400),
            max_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
        }
    }
}

/// Výsledek `RetryPolicy::run`: poslední hodnota a kolik pokusů padlo
#[derive(Debug)]
pub struct Attempted<T> {
    pub value: Option<T>,
    pub attempts: u32,
    pub succeeded: bool,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, initial_delay: delay, max_delay: delay, backoff_factor: 1.0 }
    }

    /// Volá `op(attempt)` dokud `accept` hodnotu nepřijme nebo nedojdou pokusy.
    /// Chyba z `op` je jen neúspěšný pokus.
    pub fn run<T, E, F, A>(&self, name: &str, mut op: F, accept: A) -> Attempted<T>
    where
        E: std::fmt::Display,
        F: FnMut(u32) -> Result<T, E>,
        A: Fn(&T) -> bool,
    {
        let max = self.max_attempts.max(1);
        let mut delay = self.initial_delay;
        let mut last = None;

        for attempt in 1..=max {
            match op(attempt) {
                Ok(value) if accept(&value) => {
                    return Attempted { value: Some(value), attempts: attempt, succeeded: true };
                }
                Ok(value) => {
                    debug!("[Retry] {} attempt {}/{} not accepted", name, attempt, max);
                    last = Some(value);
                }
                Err(e) => {
                    debug!("[Retry] {} attempt {}/{} failed: {}", name, attempt, max, e);
                }
            }

            if attempt < max {
                sleep(delay);
                delay = delay.mul_f64(self.backoff_factor.max(1.0)).min(self.max_delay);
            }
        }

        Attempted { value: last, attempts: max, succeeded: false }
    }
}

/// Polluje `check` dokud nevrátí true nebo nevyprší `timeout`.
/// Vždy proběhne aspoň jedna kontrola.
pub fn poll_until<F>(timeout: Duration, interval: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let started = Instant::now();
    loop {
        if check() {
            return true;
        }
        if started.elapsed() >= timeout {
            return false;
        }
        sleep(interval.min(timeout));
    }
}
