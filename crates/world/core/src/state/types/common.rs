use std::fmt;

/// Unique identifier for a logged-in player character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p#{}", self.0)
    }
}

/// Unique identifier for a spawned NPC instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NpcId(pub u32);

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n#{}", self.0)
    }
}

/// Tagged identity of any combat-capable actor.
///
/// The engine never branches on ad hoc field presence to tell players and
/// NPCs apart; everything that needs to treat both uniformly goes through
/// this union and the accessors on [`crate::state::WorldShard`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorId {
    Player(PlayerId),
    Npc(NpcId),
}

impl ActorId {
    #[inline]
    pub const fn is_player(self) -> bool {
        matches!(self, ActorId::Player(_))
    }

    #[inline]
    pub const fn is_npc(self) -> bool {
        matches!(self, ActorId::Npc(_))
    }

    /// Returns the player id if this actor is a player.
    pub fn as_player(self) -> Option<PlayerId> {
        match self {
            ActorId::Player(id) => Some(id),
            ActorId::Npc(_) => None,
        }
    }

    /// Returns the NPC id if this actor is an NPC.
    pub fn as_npc(self) -> Option<NpcId> {
        match self {
            ActorId::Npc(id) => Some(id),
            ActorId::Player(_) => None,
        }
    }

    /// Raw numeric id, used when mixing actor identity into RNG seeds.
    pub fn raw(self) -> u32 {
        match self {
            ActorId::Player(PlayerId(id)) => id,
            ActorId::Npc(NpcId(id)) => id,
        }
    }
}

impl From<PlayerId> for ActorId {
    fn from(id: PlayerId) -> Self {
        ActorId::Player(id)
    }
}

impl From<NpcId> for ActorId {
    fn from(id: NpcId) -> Self {
        ActorId::Npc(id)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorId::Player(id) => id.fmt(f),
            ActorId::Npc(id) => id.fmt(f),
        }
    }
}

/// Discrete tile position on a specific map level.
///
/// Positions are owned and mutated by the movement subsystem; combat reads
/// them but never writes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Map level (floor/plane) the tile belongs to.
    pub level: u32,
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(level: u32, x: i32, y: i32) -> Self {
        Self { level, x, y }
    }

    /// Chebyshev distance: `max(|dx|, |dy|)`. Basis for tile adjacency
    /// and attack range. Only meaningful on the same map level.
    pub fn chebyshev(&self, other: &Position) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }

    #[inline]
    pub fn same_level(&self, other: &Position) -> bool {
        self.level == other.level
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})@{}", self.x, self.y, self.level)
    }
}

/// Discrete simulation step counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Advances the counter by one step.
    pub fn advance(&mut self) {
        self.0 += 1;
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a spell in the external spell catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellId(pub u32);

impl fmt::Display for SpellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spell#{}", self.0)
    }
}

/// Identifier of an item definition (ammunition, reagents, drops).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}
