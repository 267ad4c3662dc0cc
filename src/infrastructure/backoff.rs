use crate::config::ChannelConfig;
use std::time::Duration;

/// Reconnect bookkeeping for one failure episode: the attempt counter and a
/// delay that grows geometrically up to a cap.
///
/// The delay is kept as fractional milliseconds so repeated growth does not
/// accumulate rounding error; it is rounded only when handed out.
#[derive(Debug, Clone)]
pub struct Backoff {
    attempts: u32,
    initial_ms: f64,
    max_ms: f64,
    multiplier: f64,
    current_ms: f64,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, multiplier: f64) -> Self {
        let initial_ms = initial.as_millis() as f64;
        Self {
            attempts: 0,
            initial_ms,
            max_ms: max.as_millis() as f64,
            multiplier,
            current_ms: initial_ms,
        }
    }

    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(
            config.initial_backoff(),
            config.max_backoff(),
            config.backoff_multiplier,
        )
    }

    /// Count one more failure in the current episode and return the new total
    pub fn record_failure(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay the next scheduled reconnect would use, without consuming it
    pub fn current_delay(&self) -> Duration {
        Duration::from_millis(self.current_ms.round() as u64)
    }

    /// Get the delay for the reconnect being scheduled now, then grow it
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current_delay();
        self.current_ms = (self.current_ms * self.multiplier).min(self.max_ms);
        delay
    }

    /// Reset the counter and delay (called after a successful connection)
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.current_ms = self.initial_ms;
    }
}
