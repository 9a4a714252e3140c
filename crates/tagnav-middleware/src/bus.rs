//! Typed, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the others.
//!
//! # Topics
//!
//! Traffic is partitioned into four [`Topic`] lanes so components only
//! receive the messages they care about:
//!
//! | Topic | Typical traffic |
//! |---|---|
//! | [`Topic::RawTags`] | Detection batches from the vision stage, per frame |
//! | [`Topic::VisibleTags`] | Per-batch visible-tag geometry reports |
//! | [`Topic::VehiclePosition`] | Absolute position estimates (0–1 per batch) |
//! | [`Topic::SystemAlerts`] | Capture faults and other operational events |

use tagnav_types::{Event, NavError};
use tokio::sync::broadcast;
use tracing::warn;

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Enumeration of all routing topics on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Detection batches from the vision stage.
    RawTags,
    /// Derived per-tag geometry, one report per inbound batch.
    VisibleTags,
    /// Vehicle absolute position estimates.
    VehiclePosition,
    /// Operational faults and alerts.
    SystemAlerts,
}

/// Shared event bus. Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    raw_tags: broadcast::Sender<Event>,
    visible_tags: broadcast::Sender<Event>,
    vehicle_position: broadcast::Sender<Event>,
    system_alerts: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity, applied to every
    /// topic channel independently.
    pub fn new(capacity: usize) -> Self {
        let (raw_tags, _) = broadcast::channel(capacity);
        let (visible_tags, _) = broadcast::channel(capacity);
        let (vehicle_position, _) = broadcast::channel(capacity);
        let (system_alerts, _) = broadcast::channel(capacity);
        Self {
            raw_tags,
            visible_tags,
            vehicle_position,
            system_alerts,
        }
    }

    /// Publish `event` to the given [`Topic`] channel.
    ///
    /// Returns the number of active receivers that were handed the event, or
    /// [`NavError::Channel`] when no subscriber is currently listening on
    /// the topic.
    pub fn publish_to(&self, topic: Topic, event: Event) -> Result<usize, NavError> {
        self.topic_sender(topic).send(event).map_err(|_| {
            NavError::Channel(format!("no subscribers for topic {topic:?}"))
        })
    }

    /// Subscribe to a specific [`Topic`] channel.
    ///
    /// The returned [`TopicReceiver`] yields only events published to that
    /// topic.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::RawTags => &self.raw_tags,
            Topic::VisibleTags => &self.visible_tags,
            Topic::VehiclePosition => &self.vehicle_position,
            Topic::SystemAlerts => &self.system_alerts,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// An async receiver bound to a single [`Topic`] channel.
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Wait for the next event on this topic.
    ///
    /// A lagged subscriber (buffer overrun) logs a warning and keeps
    /// receiving from the oldest retained event; `None` means the bus has
    /// shut down.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(topic = ?self.topic, lagged_by = n, "subscriber lagged, events dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The [`Topic`] this receiver is bound to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}
