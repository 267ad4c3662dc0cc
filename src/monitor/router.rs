use crate::connection::{ConnectionEvent, ConnectionState};
use crate::notifications::{NotificationKind, NotificationQueue};
use crate::signals::{InboundFrame, SignalSet, SignalStore};
use tokio::sync::{mpsc, oneshot, watch};

/// Routes connection events into the signal store and the notification queue.
///
/// Sole owner of the [`SignalStore`]; everyone else sees published snapshots.
/// Transport trouble is left to the status line, only the terminal failure
/// becomes a notification.
pub struct FrameRouter {
    store: SignalStore,
    signals: watch::Sender<SignalSet>,
    notifications: NotificationQueue,
}

impl FrameRouter {
    pub fn new(notifications: NotificationQueue, signals: watch::Sender<SignalSet>) -> Self {
        Self {
            store: SignalStore::new(),
            signals,
            notifications,
        }
    }

    /// Consumes events in arrival order until the connection goes away.
    ///
    /// A drain request is acknowledged only once every event queued before it
    /// has been routed.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<ConnectionEvent>,
        mut drains: mpsc::UnboundedReceiver<oneshot::Sender<()>>,
    ) {
        loop {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(event) => self.route(event),
                    None => break,
                },
                Some(done) = drains.recv() => {
                    let _ = done.send(());
                }
            }
        }
        tracing::debug!("Frame router finished");
    }

    pub fn route(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Frame(text) => self.handle_frame(&text),
            ConnectionEvent::Status { state, message } => {
                if state == ConnectionState::Failed {
                    self.notifications.push(NotificationKind::Error, message);
                }
            }
            ConnectionEvent::Attempts(attempts) => {
                tracing::debug!("Reconnect attempts: {}", attempts);
            }
        }
    }

    fn handle_frame(&mut self, text: &str) {
        let frame = match InboundFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to parse frame: {} - Raw: {}", e, text);
                self.notifications.push(
                    NotificationKind::Error,
                    format!("Discarded malformed signal frame: {}", e),
                );
                return;
            }
        };

        let activated = self.store.ingest(&frame);
        self.signals.send_replace(self.store.snapshot());

        for key in activated {
            tracing::info!(
                "Signal {} became active at {} (wire {}={})",
                key,
                frame.timestamp,
                key.wire_field(),
                frame.wire_value(key)
            );
            self.notifications
                .push(key.notification_kind(), key.activation_message());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotificationConfig;
    use crate::signals::SignalKey;

    fn router() -> (FrameRouter, watch::Receiver<SignalSet>, NotificationQueue) {
        let notifications = NotificationQueue::new(NotificationConfig {
            max_notifications: 10,
            display_duration_ms: 60_000,
        });
        let (signals_tx, signals_rx) = watch::channel(SignalSet::default());
        (
            FrameRouter::new(notifications.clone(), signals_tx),
            signals_rx,
            notifications,
        )
    }

    fn frame(fault_active: bool, estop_ok: bool) -> ConnectionEvent {
        ConnectionEvent::Frame(format!(
            r#"{{"timestamp":"2024-03-01T08:15:00Z","machine_running":false,"fault_active":{},"cleaning_active":false,"material_low":false,"estop_ok":{},"air_pressure_ok":true}}"#,
            fault_active, estop_ok
        ))
    }

    fn status(state: ConnectionState, message: &str) -> ConnectionEvent {
        ConnectionEvent::Status {
            state,
            message: message.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_activation_raises_notifications_in_key_order() {
        let (mut router, signals, notifications) = router();

        router.route(frame(true, false));

        let set = *signals.borrow();
        assert!(set.get(SignalKey::FaultActive));
        assert!(set.get(SignalKey::EmergencyStop));
        assert!(!set.get(SignalKey::AirPressureLow));

        let raised = notifications.list();
        // Newest first: EmergencyStop was pushed after FaultActive
        assert_eq!(raised.len(), 2);
        assert_eq!(raised[0].message, "Emergency stop activated");
        assert_eq!(raised[0].kind, NotificationKind::Alert);
        assert_eq!(raised[1].message, "Machine fault detected");
    }

    #[tokio::test(start_paused = true)]
    async fn test_steady_signals_do_not_repeat_notifications() {
        let (mut router, _signals, notifications) = router();

        router.route(frame(true, true));
        router.route(frame(true, true));
        router.route(frame(true, true));

        assert_eq!(notifications.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_frame_leaves_state_untouched() {
        let (mut router, signals, notifications) = router();
        router.route(frame(true, true));

        router.route(ConnectionEvent::Frame(r#"{"timestamp":"nope"}"#.to_string()));

        assert!(signals.borrow().get(SignalKey::FaultActive));
        let raised = notifications.list();
        assert_eq!(raised.len(), 2);
        assert_eq!(raised[0].kind, NotificationKind::Error);
        assert!(raised[0].message.starts_with("Discarded malformed signal frame"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_terminal_failure_is_notified() {
        let (mut router, _signals, notifications) = router();

        for attempt in 1..=5 {
            router.route(status(ConnectionState::Connecting, "Connecting"));
            router.route(ConnectionEvent::Attempts(attempt - 1));
            router.route(status(ConnectionState::Reconnecting, "Connection lost"));
            router.route(ConnectionEvent::Attempts(attempt));
        }
        assert!(notifications.is_empty());

        router.route(status(ConnectionState::Failed, "Connection failed after 5 attempts"));
        let raised = notifications.list();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].kind, NotificationKind::Error);
        assert_eq!(raised[0].message, "Connection failed after 5 attempts");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_waits_for_queued_events() {
        let (router, _signals, notifications) = router();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (drains_tx, drains_rx) = mpsc::unbounded_channel();

        events_tx.send(frame(true, false)).unwrap();
        events_tx.send(frame(false, true)).unwrap();
        events_tx.send(frame(true, true)).unwrap();
        let (done_tx, done_rx) = oneshot::channel();
        drains_tx.send(done_tx).unwrap();

        tokio::spawn(router.run(events_rx, drains_rx));
        done_rx.await.unwrap();

        // Fault and e-stop on the first frame, fault again on the third
        assert_eq!(notifications.len(), 3);
        assert_eq!(notifications.list()[0].message, "Machine fault detected");
    }
}
