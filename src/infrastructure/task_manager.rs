use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use tokio::task::JoinHandle;

/// Owns background tasks by key so every one of them keeps a cancel path.
///
/// Dropping the manager aborts whatever is still tracked.
pub struct TaskManager<K: Eq + Hash> {
    handles: HashMap<K, JoinHandle<()>>,
}

impl<K: Eq + Hash> TaskManager<K> {
    /// Create a new empty task manager
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }

    /// Spawn a task and track it under `key`, aborting any task already there
    pub fn spawn<F>(&mut self, key: K, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        if let Some(previous) = self.handles.insert(key, handle) {
            previous.abort();
        }
    }

    /// Abort the task tracked under `key`. Returns whether one was tracked.
    pub fn abort(&mut self, key: &K) -> bool {
        match self.handles.remove(key) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Stop tracking a task that completed on its own
    pub fn forget(&mut self, key: &K) {
        self.handles.remove(key);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Abort all tasks without waiting
    pub fn abort_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}

impl<K: Eq + Hash> Default for TaskManager<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> Drop for TaskManager<K> {
    fn drop(&mut self) {
        self.abort_all();
    }
}
