use super::{Notification, NotificationKind};
use crate::config::NotificationConfig;
use crate::infrastructure::TaskManager;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;
use uuid::Uuid;

/// Bounded list of operator notifications, newest first.
///
/// Every notification owns its own expiry timer, so its visible lifetime is
/// exactly the configured display duration no matter how many others arrive
/// after it. When the cap is exceeded the oldest entry is evicted and its
/// timer cancelled.
///
/// Cloning the queue yields another handle to the same list. Pushing requires
/// a running tokio runtime because the expiry timers are tokio tasks.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Inner>,
}

struct Inner {
    config: NotificationConfig,
    state: Mutex<QueueState>,
    snapshot: watch::Sender<Vec<Notification>>,
}

struct QueueState {
    /// Front is the most recent notification
    items: VecDeque<Notification>,
    timers: TaskManager<Uuid>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &QueueState) {
        self.snapshot
            .send_replace(state.items.iter().cloned().collect());
    }

    fn expire(&self, id: Uuid) {
        let mut state = self.lock();
        state.timers.forget(&id);
        let before = state.items.len();
        state.items.retain(|item| item.id != id);
        if state.items.len() != before {
            tracing::debug!("Notification {} expired", id);
            self.publish(&state);
        }
    }
}

impl NotificationQueue {
    pub fn new(config: NotificationConfig) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(QueueState {
                    items: VecDeque::new(),
                    timers: TaskManager::new(),
                }),
                snapshot,
            }),
        }
    }

    /// Adds a notification at the head and schedules its expiry. Returns its id.
    pub fn push(&self, kind: NotificationKind, message: impl Into<String>) -> Uuid {
        let notification = Notification::new(kind, message);
        let id = notification.id;
        tracing::debug!("Notification {} ({:?}): {}", id, kind, notification.message);

        let mut state = self.inner.lock();
        state.items.push_front(notification);
        while state.items.len() > self.inner.config.max_notifications {
            if let Some(evicted) = state.items.pop_back() {
                state.timers.abort(&evicted.id);
            }
        }

        let queue = Arc::downgrade(&self.inner);
        let duration = self.inner.config.display_duration();
        state.timers.spawn(id, async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = Weak::upgrade(&queue) {
                inner.expire(id);
            }
        });

        self.inner.publish(&state);
        id
    }

    /// Removes a notification before its timer fires. Returns whether it was visible.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut state = self.inner.lock();
        state.timers.abort(&id);
        let before = state.items.len();
        state.items.retain(|item| item.id != id);
        let removed = state.items.len() != before;
        if removed {
            self.inner.publish(&state);
        }
        removed
    }

    /// Drops every notification and cancels all pending timers
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        state.timers.abort_all();
        state.items.clear();
        self.inner.publish(&state);
    }

    /// Current notifications, newest first
    pub fn list(&self) -> Vec<Notification> {
        self.inner.lock().items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Watch the list; every change publishes a fresh newest-first snapshot
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.snapshot.subscribe()
    }
}
