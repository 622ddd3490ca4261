use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
struct Pending {
    value: String,
    deadline: Instant,
}

/// Trailing debounce over a text input.
///
/// A value settles once `delay` has passed with no newer input. Every keystroke
/// restarts the timer. An empty input settles immediately and drops whatever
/// was pending, so clearing a field never triggers a late lookup.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
    settled: String,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            settled: String::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn settled(&self) -> &str {
        &self.settled
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Feed a raw value. Returns the new settled value only for the empty fast path.
    pub fn push(&mut self, raw: &str, now: Instant) -> Option<String> {
        if raw.is_empty() {
            self.pending = None;
            if self.settled.is_empty() {
                return None;
            }
            self.settled.clear();
            return Some(String::new());
        }

        self.pending = Some(Pending {
            value: raw.to_string(),
            deadline: now + self.delay,
        });
        None
    }

    /// Settle the pending value if its deadline has passed.
    /// Returns it only when it differs from the previous settled value.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self.pending.as_ref().map(|p| p.deadline <= now).unwrap_or(false);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;
        if pending.value == self.settled {
            return None;
        }
        self.settled = pending.value;
        Some(self.settled.clone())
    }

    /// Sleep until the pending deadline, then settle.
    pub async fn wait(&mut self) -> Option<String> {
        let deadline = self.deadline()?;
        tokio::time::sleep_until(deadline).await;
        self.poll(Instant::now())
    }

    /// Forget the pending value and the settled value.
    pub fn reset(&mut self) {
        self.pending = None;
        self.settled.clear();
    }

    /// Forget the pending value only.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
