//! Gesture events and their fire-and-forget broadcast.
//!
//! Detection code only returns [`GestureEvent`] values. Delivery goes through an
//! [`EventDispatcher`], normally an [`EventEmitter`] that fans events out to
//! bounded per-subscriber queues without ever blocking the frame loop.

use crate::{constants::DEFAULT_SUBSCRIBER_CAPACITY, head_pose::HeadDirection, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::{
    mpsc::{self, Receiver, SyncSender, TrySendError},
    Arc, Mutex, MutexGuard,
};
use std::time::Duration;

/// A discrete gesture produced at a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureEvent {
    /// A completed blink, carrying the running blink total
    Blink {
        /// Total blinks in this session including this one
        count: u64,
    },
    /// The classified head direction changed
    #[serde(rename = "head_direction")]
    HeadDirectionChanged {
        /// The new direction
        direction: HeadDirection,
    },
}

impl GestureEvent {
    /// Serialize to the JSON record sent to subscribers
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Anything that can take events off the frame loop's hands
pub trait EventDispatcher {
    /// Hand over events produced for one frame, in order
    fn dispatch(&mut self, events: &[GestureEvent]);
}

/// Collects dispatched events in memory
impl EventDispatcher for Vec<GestureEvent> {
    fn dispatch(&mut self, events: &[GestureEvent]) {
        self.extend_from_slice(events);
    }
}

/// Delivery counters for an [`EventEmitter`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterStats {
    /// Successful per-subscriber deliveries
    pub delivered: u64,
    /// Per-subscriber drops because the subscriber's queue was full
    pub dropped_full: u64,
    /// Events emitted while nobody was subscribed
    pub dropped_no_subscriber: u64,
}

#[derive(Default)]
struct Registry {
    subscribers: Vec<(u64, SyncSender<GestureEvent>)>,
    next_id: u64,
    stats: EmitterStats,
}

/// Broadcasts events to every registered subscriber.
///
/// Cloning yields another handle to the same subscriber set, so subscribers
/// can register from other threads while the frame loop emits.
#[derive(Clone)]
pub struct EventEmitter {
    registry: Arc<Mutex<Registry>>,
    capacity: usize,
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_CAPACITY)
    }
}

impl EventEmitter {
    /// Create an emitter whose subscribers each buffer up to `capacity` events
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            capacity: capacity.max(1),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Registry holds no invariants a panicking holder could break
        self.registry.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register a new subscriber
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::sync_channel(self.capacity);
        let mut registry = self.registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.push((id, sender));
        debug!("Subscriber {} registered ({} total)", id, registry.subscribers.len());
        Subscription { id, receiver }
    }

    /// Number of currently registered subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry().subscribers.len()
    }

    /// Delivery counters so far
    #[must_use]
    pub fn stats(&self) -> EmitterStats {
        self.registry().stats
    }

    /// Deliver one event to every current subscriber without blocking.
    ///
    /// Full queues drop the event for that subscriber; disconnected
    /// subscribers are removed.
    pub fn emit(&self, event: &GestureEvent) {
        let mut registry = self.registry();
        if registry.subscribers.is_empty() {
            registry.stats.dropped_no_subscriber += 1;
            debug!("No subscribers, dropping {:?}", event);
            return;
        }

        let mut delivered = 0;
        let mut dropped = 0;
        registry.subscribers.retain(|(id, sender)| match sender.try_send(*event) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!("Subscriber {} is not keeping up, dropping {:?}", id, event);
                dropped += 1;
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("Subscriber {} disconnected", id);
                false
            }
        });
        registry.stats.delivered += delivered;
        registry.stats.dropped_full += dropped;
    }
}

impl EventDispatcher for EventEmitter {
    fn dispatch(&mut self, events: &[GestureEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}

/// Receiving end of one subscriber; events arrive in emission order
pub struct Subscription {
    id: u64,
    receiver: Receiver<GestureEvent>,
}

impl Subscription {
    /// Subscriber identifier, unique per emitter
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next event if one is already queued
    #[must_use]
    pub fn try_recv(&self) -> Option<GestureEvent> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<GestureEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Drain every queued event
    #[must_use]
    pub fn drain(&self) -> Vec<GestureEvent> {
        self.receiver.try_iter().collect()
    }
}

impl IntoIterator for Subscription {
    type Item = GestureEvent;
    type IntoIter = mpsc::IntoIter<GestureEvent>;

    /// Blocking iterator that ends once every emitter handle is dropped
    fn into_iter(self) -> Self::IntoIter {
        self.receiver.into_iter()
    }
}
