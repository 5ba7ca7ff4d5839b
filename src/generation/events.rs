//! "Properties created" notification and its subscriber list.

use crate::generation::epoch::Epoch;
use crate::sheet::ControlSet;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identity of an orchestrator instance, carried by its notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrchestratorId(u64);

impl OrchestratorId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        OrchestratorId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrchestratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "orchestrator-{}", self.0)
    }
}

/// Raised on the UI thread after a sheet was applied.
#[derive(Debug, Clone)]
pub struct PropertiesCreated {
    pub orchestrator: OrchestratorId,
    pub epoch: Epoch,
    pub controls: Arc<ControlSet>,
    pub presented_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&PropertiesCreated) + Send + Sync>;

#[derive(Default)]
pub(crate) struct PropertiesCreatedNotifier {
    subscribers: Mutex<Vec<(SubscriptionId, Callback)>>,
    next_id: AtomicU64,
}

impl PropertiesCreatedNotifier {
    pub(crate) fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PropertiesCreated) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push((id, Arc::new(callback)));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Invoke subscribers in subscription order. The list is copied first so
    /// callbacks may subscribe or unsubscribe.
    pub(crate) fn notify(&self, event: &PropertiesCreated) {
        let callbacks: Vec<Callback> = self
            .subscribers
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }
}
