//! Topic-based event bus for shard events.
//!
//! Consumers subscribe to the topics they care about and never see
//! unrelated traffic: death processing listens on [`Topic::Deaths`], client
//! session tasks on [`Topic::Effects`] and [`Topic::Notices`]. Publishing is
//! fire and forget: a topic with no subscribers drops its events, and a slow
//! subscriber lags rather than backpressuring the tick loop.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use world_core::{AreaEffect, DeathEvent, Notice, PlayerId, Position, Tick, TickReport};

/// Topics for event routing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Deaths flagged by the combat engine, one record per victim.
    Deaths,
    /// Area-visible side effects (hit splats, projectiles, ground drops).
    Effects,
    /// Per-player notification messages.
    Notices,
    /// End-of-tick summaries.
    Ticks,
}

/// Event wrapper carrying the tick it was produced on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ShardEvent {
    Death {
        tick: Tick,
        event: DeathEvent,
    },
    Effect {
        tick: Tick,
        origin: Position,
        effect: AreaEffect,
    },
    Notice {
        tick: Tick,
        player: PlayerId,
        notice: Notice,
    },
    TickCompleted {
        tick: Tick,
        report: TickReport,
    },
}

impl ShardEvent {
    pub fn topic(&self) -> Topic {
        match self {
            ShardEvent::Death { .. } => Topic::Deaths,
            ShardEvent::Effect { .. } => Topic::Effects,
            ShardEvent::Notice { .. } => Topic::Notices,
            ShardEvent::TickCompleted { .. } => Topic::Ticks,
        }
    }
}

/// Topic-based event bus backed by one broadcast channel per topic.
///
/// The topic set is fixed, so the channel map is built once and never
/// mutated; the bus is freely shareable behind an `Arc`.
pub struct EventBus {
    channels: HashMap<Topic, broadcast::Sender<ShardEvent>>,
}

impl EventBus {
    const TOPICS: [Topic; 4] = [Topic::Deaths, Topic::Effects, Topic::Notices, Topic::Ticks];

    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a bus with the given buffer capacity per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Self::TOPICS
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity).0))
            .collect();
        Self { channels }
    }

    /// Publishes an event to its topic. Best effort: an unsubscribed topic
    /// silently drops the event.
    pub fn publish(&self, event: ShardEvent) {
        let topic = event.topic();
        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            tracing::trace!(?topic, "no subscribers for topic");
        }
    }

    /// Subscribes to a single topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<ShardEvent> {
        self.channels
            .get(&topic)
            .expect("all topics are pre-created")
            .subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
