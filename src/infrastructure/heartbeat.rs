use std::future::pending;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{self, Instant, Interval, Sleep};

/// What the heartbeat wants the owner to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatEvent {
    /// Interval elapsed, a ping should be sent
    PingDue,
    /// The last ping went unanswered for the whole response timeout
    PongOverdue,
}

/// Liveness probe timers for one open link.
///
/// Owns the repeating ping interval and at most one pending response
/// deadline. Both are plain owned values, so dropping or stopping the
/// heartbeat cancels them; there is no detached task to chase.
pub struct Heartbeat {
    interval: Duration,
    timeout: Duration,
    ticker: Option<Interval>,
    deadline: Option<Pin<Box<Sleep>>>,
}

impl Heartbeat {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            ticker: None,
            deadline: None,
        }
    }

    /// Start pinging; the first ping is due one interval from now
    pub fn start(&mut self) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
        self.deadline = None;
    }

    pub fn stop(&mut self) {
        self.ticker = None;
        self.deadline = None;
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.deadline.is_some()
    }

    /// Arm the response deadline after a ping went out.
    ///
    /// An already pending deadline is kept, so an unanswered ping is never
    /// granted extra time by the next one.
    pub fn arm(&mut self) {
        if self.deadline.is_none() {
            self.deadline = Some(Box::pin(time::sleep(self.timeout)));
        }
    }

    /// Clears the pending deadline (call this on any sign of life from the peer).
    /// Returns whether a deadline was actually pending.
    pub fn acknowledge(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Waits for the next heartbeat event. Never resolves while stopped.
    ///
    /// Cancel safe: dropping the future leaves the timers untouched.
    pub async fn next_event(&mut self) -> HeartbeatEvent {
        let Some(ticker) = self.ticker.as_mut() else {
            return pending().await;
        };
        let deadline = self.deadline.as_mut();

        let overdue = tokio::select! {
            biased;
            _ = async {
                match deadline {
                    Some(sleep) => sleep.as_mut().await,
                    None => pending().await,
                }
            } => true,
            _ = ticker.tick() => false,
        };

        if overdue {
            self.deadline = None;
            HeartbeatEvent::PongOverdue
        } else {
            HeartbeatEvent::PingDue
        }
    }
}
