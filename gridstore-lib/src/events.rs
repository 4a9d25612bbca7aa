//! Change and failure notifications
//!
//! Every emission fires the unscoped event (`change` / `fail`) and, when an
//! instance id is given, the id-scoped event (`change:<id>` / `fail:<id>`).
//! Listeners subscribe to an event name and receive a [`StoreEvent`] carrying
//! any extra arguments the emitter passed.
//!
//! Emitting only queues. [`EventEmitter::take`] resolves the queued events
//! against the current listeners into an [`EventBatch`], which is delivered
//! separately so the owner of the emitter can release its locks first.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::Value;

/// Kind of store notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Instance state changed.
    Change,
    /// A data request failed.
    Fail,
}

impl EventKind {
    /// Unscoped event name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Change => "change",
            EventKind::Fail => "fail",
        }
    }

    /// Event name scoped to an instance id.
    pub fn scoped(self, id: &str) -> String {
        format!("{}:{}", self.as_str(), id)
    }
}

/// A single delivered notification.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEvent {
    /// The name the event was emitted under, e.g. `change:devices`.
    pub name: String,
    /// Change or fail.
    pub kind: EventKind,
    /// Instance the emission was about, if any.
    pub id: Option<String>,
    /// Extra arguments forwarded from the emitter.
    pub args: Vec<Value>,
}

/// Handle returned by [`EventEmitter::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__listener_{}", self.0)
    }
}

type Listener = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Named-event emitter.
#[derive(Default)]
pub struct EventEmitter {
    listeners: Vec<(ListenerId, String, Listener)>,
    queued: Vec<StoreEvent>,
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.listeners.iter().map(|(_, n, _)| n.as_str()).collect();
        f.debug_struct("EventEmitter")
            .field("listeners", &names)
            .field("queued", &self.queued.len())
            .finish()
    }
}

impl EventEmitter {
    /// Creates an emitter with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `listener` to events named `name`.
    pub fn on<F>(&mut self, name: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = ListenerId::new();
        self.listeners.push((id, name.into(), Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Number of listeners for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.iter().filter(|(_, n, _)| n == name).count()
    }

    /// Queues a change notification.
    pub fn emit_change(&mut self, id: Option<&str>, args: Vec<Value>) {
        self.queue_kind(EventKind::Change, id, args);
    }

    /// Queues a failure notification.
    pub fn emit_fail(&mut self, id: Option<&str>, args: Vec<Value>) {
        self.queue_kind(EventKind::Fail, id, args);
    }

    fn queue_kind(&mut self, kind: EventKind, id: Option<&str>, args: Vec<Value>) {
        let event = StoreEvent {
            name: kind.as_str().to_string(),
            kind,
            id: id.map(str::to_string),
            args,
        };
        if let Some(id) = id {
            let scoped = StoreEvent {
                name: kind.scoped(id),
                ..event.clone()
            };
            self.queued.push(event);
            self.queued.push(scoped);
        } else {
            self.queued.push(event);
        }
    }

    /// Number of queued events.
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// Drains the queue, pairing each event with the listeners of its name
    /// in subscription order.
    pub fn take(&mut self) -> EventBatch {
        let mut deliveries = Vec::new();
        for event in self.queued.drain(..) {
            log::trace!("[events] emit {}", event.name);
            for (_, name, listener) in &self.listeners {
                if *name == event.name {
                    deliveries.push((Arc::clone(listener), event.clone()));
                }
            }
        }
        EventBatch { deliveries }
    }

    /// Delivers every queued event now.
    pub fn flush(&mut self) {
        self.take().deliver();
    }
}

/// Queued events paired with their listeners.
#[must_use = "listeners only run when the batch is delivered"]
#[derive(Default)]
pub struct EventBatch {
    deliveries: Vec<(Listener, StoreEvent)>,
}

impl fmt::Debug for EventBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.deliveries.iter().map(|(_, e)| e.name.as_str()).collect();
        f.debug_struct("EventBatch").field("events", &names).finish()
    }
}

impl EventBatch {
    /// Number of listener calls in the batch.
    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// Calls every listener with its event.
    pub fn deliver(self) {
        for (listener, event) in self.deliveries {
            listener(&event);
        }
    }
}
