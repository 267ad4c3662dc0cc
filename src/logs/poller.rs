use super::{LogEntry, LogSource};
use crate::notifications::{NotificationKind, NotificationQueue};
use crate::types::{MonitorError, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;

struct PollRun {
    stop: watch::Sender<bool>,
    // Detached on stop so an in-flight fetch can finish; its result is dropped
    _task: JoinHandle<()>,
}

/// Fixed-cadence fetcher of the historical log window.
///
/// A successful fetch replaces the buffer wholesale; a failed one leaves it
/// as it was and raises an `error` notification. The cadence never changes:
/// a fetch still pending when the next tick is due is abandoned and reported
/// as a failure.
pub struct LogPoller {
    source: Arc<dyn LogSource>,
    notifications: NotificationQueue,
    entries: Arc<watch::Sender<Vec<LogEntry>>>,
    run: Mutex<Option<PollRun>>,
}

impl LogPoller {
    pub fn new(source: Arc<dyn LogSource>, notifications: NotificationQueue) -> Self {
        let (entries, _) = watch::channel(Vec::new());
        Self {
            source,
            notifications,
            entries: Arc::new(entries),
            run: Mutex::new(None),
        }
    }

    fn lock_run(&self) -> MutexGuard<'_, Option<PollRun>> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches immediately, then once per `interval` until [`stop`](Self::stop).
    /// Calling it while running restarts the cadence with the new interval.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Config`] for a zero interval; a running poller
    /// is left untouched in that case.
    pub fn start(&self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(MonitorError::Config(
                "log poll interval must be greater than zero".to_string(),
            ));
        }

        let mut run = self.lock_run();
        if let Some(previous) = run.take() {
            previous.stop.send_replace(true);
        }

        let (stop, mut stopped) = watch::channel(false);
        let source = Arc::clone(&self.source);
        let entries = Arc::clone(&self.entries);
        let notifications = self.notifications.clone();

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    _ = ticker.tick() => {}
                }

                let result = match time::timeout(interval, source.fetch()).await {
                    Ok(result) => result,
                    Err(_) => Err(MonitorError::Timeout(interval)),
                };
                if *stopped.borrow() {
                    tracing::debug!("Log poller stopped during fetch, discarding result");
                    break;
                }

                match result {
                    Ok(window) => {
                        tracing::debug!("Replacing log buffer with {} entries", window.len());
                        entries.send_replace(window);
                    }
                    Err(e) => {
                        tracing::warn!("Log fetch failed, keeping previous entries: {}", e);
                        notifications
                            .push(NotificationKind::Error, format!("Failed to fetch logs: {}", e));
                    }
                }
            }
            tracing::debug!("Log poller task finished");
        });

        tracing::info!("Log polling started every {:?}", interval);
        *run = Some(PollRun { stop, _task: task });
        Ok(())
    }

    /// Cancels the cadence. A fetch already in flight completes but is ignored.
    pub fn stop(&self) {
        if let Some(run) = self.lock_run().take() {
            run.stop.send_replace(true);
            tracing::info!("Log polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_run().is_some()
    }

    /// Current log window
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<LogEntry>> {
        self.entries.subscribe()
    }
}

impl Drop for LogPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotificationConfig;
    use crate::logs::LogLevel;
    use futures::FutureExt;
    use futures::future::BoxFuture;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Vec<LogEntry>>>>,
        calls: AtomicUsize,
        latency: Duration,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<LogEntry>>>, latency: Duration) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
                latency,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LogSource for ScriptedSource {
        fn fetch(&self) -> BoxFuture<'_, Result<Vec<LogEntry>>> {
            async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if !self.latency.is_zero() {
                    sleep(self.latency).await;
                }
                self.responses
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| Ok(Vec::new()))
            }
            .boxed()
        }
    }

    fn entry(id: u64, event: &str) -> LogEntry {
        LogEntry {
            id,
            timestamp: "2024-03-01T08:15:00Z".parse().unwrap(),
            event: event.to_string(),
            status: "Done".to_string(),
            level: LogLevel::Info,
        }
    }

    fn events(entries: &[LogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.event.as_str()).collect()
    }

    fn unavailable() -> MonitorError {
        MonitorError::HttpStatus {
            status: 503,
            url: "http://plant.example/api/logs".to_string(),
        }
    }

    fn long_lived_notifications() -> NotificationQueue {
        NotificationQueue::new(NotificationConfig {
            max_notifications: 10,
            display_duration_ms: 3_600_000,
        })
    }

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_success_replaces_and_failure_keeps_buffer() {
        let source = ScriptedSource::new(
            vec![
                Ok(vec![entry(1, "X"), entry(2, "Y"), entry(3, "Z")]),
                Ok(vec![entry(4, "A"), entry(5, "B")]),
                Err(unavailable()),
            ],
            Duration::ZERO,
        );
        let notifications = long_lived_notifications();
        let poller = LogPoller::new(source.clone(), notifications.clone());

        poller.start(MINUTE).unwrap();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(events(&poller.entries()), vec!["X", "Y", "Z"]);

        sleep(MINUTE).await;
        assert_eq!(events(&poller.entries()), vec!["A", "B"]);
        assert!(notifications.is_empty());

        sleep(MINUTE).await;
        assert_eq!(events(&poller.entries()), vec!["A", "B"]);
        let raised = notifications.list();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].kind, NotificationKind::Error);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cadence_survives_failures() {
        let source = ScriptedSource::new(
            vec![Err(unavailable()), Err(unavailable()), Ok(vec![entry(1, "A")])],
            Duration::ZERO,
        );
        let notifications = long_lived_notifications();
        let poller = LogPoller::new(source.clone(), notifications.clone());

        poller.start(MINUTE).unwrap();
        sleep(Duration::from_secs(121)).await;

        assert_eq!(source.calls(), 3);
        assert_eq!(events(&poller.entries()), vec!["A"]);
        assert_eq!(notifications.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_discards_in_flight_result() {
        let source = ScriptedSource::new(
            vec![Ok(vec![entry(1, "A")]), Ok(vec![entry(2, "B")])],
            Duration::from_secs(5),
        );
        let poller = LogPoller::new(source.clone(), long_lived_notifications());

        poller.start(MINUTE).unwrap();
        sleep(Duration::from_millis(5001)).await;
        assert_eq!(events(&poller.entries()), vec!["A"]);

        // Second fetch starts at 60s and is still in flight at 61s
        sleep(Duration::from_secs(56)).await;
        assert_eq!(source.calls(), 2);
        poller.stop();
        assert!(!poller.is_running());

        sleep(Duration::from_secs(600)).await;
        assert_eq!(events(&poller.entries()), vec!["A"]);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_uses_new_interval() {
        let source = ScriptedSource::new(Vec::new(), Duration::ZERO);
        let poller = LogPoller::new(source.clone(), long_lived_notifications());

        poller.start(MINUTE).unwrap();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(source.calls(), 1);

        poller.start(Duration::from_secs(10)).unwrap();
        sleep(Duration::from_millis(30_001)).await;
        // Immediate fetch on restart plus three ten-second ticks
        assert_eq!(source.calls(), 5);
        assert!(poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_keeps_cadence() {
        let source = ScriptedSource::new(
            vec![Ok(vec![entry(1, "late")]), Ok(vec![entry(2, "late")])],
            Duration::from_secs(150),
        );
        let notifications = long_lived_notifications();
        let poller = LogPoller::new(source.clone(), notifications.clone());

        poller.start(MINUTE).unwrap();
        sleep(Duration::from_secs(301)).await;

        // Fetches at 0, 60, 120, 180, 240 and 300 seconds
        assert_eq!(source.calls(), 6);
        assert!(poller.entries().is_empty());
        let raised = notifications.list();
        assert_eq!(raised.len(), 5);
        assert!(raised.iter().all(|n| n.kind == NotificationKind::Error));
        assert!(raised[0].message.contains("Timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_rejected() {
        let source = ScriptedSource::new(Vec::new(), Duration::ZERO);
        let poller = LogPoller::new(source.clone(), long_lived_notifications());

        assert!(matches!(
            poller.start(Duration::ZERO),
            Err(MonitorError::Config(_))
        ));
        assert!(!poller.is_running());

        poller.start(MINUTE).unwrap();
        assert!(poller.start(Duration::ZERO).is_err());
        sleep(Duration::from_millis(60_001)).await;
        assert!(poller.is_running());
        assert_eq!(source.calls(), 2);
    }
}
