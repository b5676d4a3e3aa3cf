//! Fan-out of update events to observers
//!
//! Every observer owns an unbounded queue, so a slow reader never holds up
//! the simulation or other readers. Events are released in sequence order
//! even when publishers race each other after leaving the mutation lock.
//! A sequence that is never published holds back at most `reorder_limit`
//! events before the broadcaster skips past it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use super::update::UpdateEvent;
use crate::core::types::Sequence;

/// Parked events allowed before a missing sequence is skipped
pub const DEFAULT_REORDER_LIMIT: usize = 64;

/// Unique identifier for an observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverId(pub Uuid);

impl ObserverId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receiving end of a subscription
#[derive(Debug)]
pub struct Observer {
    id: ObserverId,
    receiver: UnboundedReceiver<Arc<UpdateEvent>>,
}

impl Observer {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Wait for the next event; `None` once unsubscribed
    pub async fn recv(&mut self) -> Option<Arc<UpdateEvent>> {
        self.receiver.recv().await
    }

    /// Next event if one is already queued
    pub fn try_recv(&mut self) -> Option<Arc<UpdateEvent>> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Every event queued right now
    pub fn drain(&mut self) -> Vec<Arc<UpdateEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }
}

#[derive(Debug)]
struct Inner {
    observers: Vec<(ObserverId, UnboundedSender<Arc<UpdateEvent>>)>,
    next_release: Sequence,
    /// Events that arrived ahead of `next_release`
    parked: BTreeMap<Sequence, Arc<UpdateEvent>>,
    reorder_limit: usize,
}

impl Inner {
    fn deliver(&mut self, event: &Arc<UpdateEvent>) {
        self.observers.retain(|(id, sender)| match sender.send(Arc::clone(event)) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("Dropping observer {}: receiver closed", id);
                false
            }
        });
    }

    /// Deliver parked events for as long as they follow the cursor
    fn release_parked(&mut self) {
        loop {
            let next = self.next_release;
            let Some(parked) = self.parked.remove(&next) else {
                break;
            };
            self.deliver(&parked);
            self.next_release += 1;
        }
    }
}

/// Cloneable handle to the observer set
#[derive(Debug, Clone)]
pub struct Broadcaster {
    inner: Arc<Mutex<Inner>>,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster {
    /// Broadcaster expecting the first event to carry sequence 1
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Broadcaster expecting the first event to carry `sequence`
    pub fn starting_at(sequence: Sequence) -> Self {
        Self::with_reorder_limit(sequence, DEFAULT_REORDER_LIMIT)
    }

    /// Broadcaster that parks at most `limit` events behind a gap
    pub fn with_reorder_limit(sequence: Sequence, limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                observers: Vec::new(),
                next_release: sequence,
                parked: BTreeMap::new(),
                reorder_limit: limit,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an observer; it sees only events released from now on
    pub fn subscribe(&self) -> Observer {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = ObserverId::new();
        let mut inner = self.lock();
        inner.observers.push((id, sender));
        tracing::debug!("Observer {} subscribed ({} total)", id, inner.observers.len());
        Observer { id, receiver }
    }

    /// Remove an observer; returns false if it was already gone
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut inner = self.lock();
        let before = inner.observers.len();
        inner.observers.retain(|(observer, _)| *observer != id);
        inner.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    /// Sequence the broadcaster will release next
    pub fn next_release(&self) -> Sequence {
        self.lock().next_release
    }

    /// Queue an event for every observer, in sequence order
    ///
    /// Never blocks on observers. An event older than the release cursor is
    /// delivered immediately; one ahead of it waits for the gap to fill.
    /// Once more than `reorder_limit` events are waiting, the gap is given
    /// up on and the cursor jumps to the oldest parked event.
    pub fn publish(&self, event: impl Into<Arc<UpdateEvent>>) {
        let event = event.into();
        let mut inner = self.lock();

        if event.sequence < inner.next_release {
            inner.deliver(&event);
            return;
        }
        if event.sequence > inner.next_release {
            inner.parked.insert(event.sequence, event);
            if inner.parked.len() <= inner.reorder_limit {
                return;
            }
            let Some(&oldest) = inner.parked.keys().next() else {
                return;
            };
            tracing::warn!(
                "Sequences {}..{} never published; skipping ahead with {} events parked",
                inner.next_release,
                oldest,
                inner.parked.len()
            );
            inner.next_release = oldest;
            inner.release_parked();
            return;
        }

        inner.deliver(&event);
        inner.next_release += 1;
        inner.release_parked();
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = UpdateEvent>) {
        for event in events {
            self.publish(event);
        }
    }
}
