//! Runtime implementations of the combat core's mutable collaborators.

mod equipment;
mod experience;
mod sink;

pub use equipment::InMemoryEquipment;
pub use experience::XpTracker;
pub use sink::BufferedSink;
