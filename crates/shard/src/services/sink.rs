//! Event sink buffering one tick's worth of outbound events.

use world_core::{AreaEffect, EventSink, Notice, PlayerId, Position};

/// Collects notices and area effects during a tick.
///
/// The engine cannot know the tick number its events will be published
/// under (the counter advances inside the tick), so the driver buffers them
/// here and stamps them onto the bus after the tick completes.
#[derive(Debug, Default)]
pub struct BufferedSink {
    pub notices: Vec<(PlayerId, Notice)>,
    pub effects: Vec<(Position, AreaEffect)>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for BufferedSink {
    fn notify(&mut self, player: PlayerId, notice: Notice) {
        self.notices.push((player, notice));
    }

    fn broadcast(&mut self, origin: Position, effect: AreaEffect) {
        self.effects.push((origin, effect));
    }
}
