//! RNG oracle for deterministic random number generation.
//!
//! Combat rolls (damage variance, ammunition consumption) must replay
//! identically given the same shard seed and tick, both for test
//! reproducibility and so independent observers (anti-cheat detectors) can
//! re-derive outcomes. Implementations must be pure functions of the seed.

use crate::state::{ActorId, Tick};

/// Deterministic random number source keyed by an explicit seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1-100 inclusive). Common for percentage mechanics.
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Generate a random value in range [0, max] inclusive.
    fn roll_max(&self, seed: u64, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.next_u32(seed) % (max + 1)
    }
}

/// PCG random number generator (PCG-XSH-RR variant).
///
/// Fast, 64 bits of state, and a pure function of its input, which is
/// exactly what per-roll seeding needs.
///
/// Reference: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation: xorshift high bits, rotate by top bits.
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Contexts distinguishing multiple rolls within one attack resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollContext {
    Damage,
    AmmoConsume,
    AmmoRecover,
}

impl RollContext {
    fn discriminant(self) -> u64 {
        match self {
            RollContext::Damage => 0,
            RollContext::AmmoConsume => 1,
            RollContext::AmmoRecover => 2,
        }
    }
}

/// Combine shard seed, tick, actor, and roll context into a unique seed.
///
/// Every random event on the shard gets a distinct seed, and the whole
/// sequence replays from the shard seed alone.
pub fn compute_seed(shard_seed: u64, tick: Tick, actor: ActorId, context: RollContext) -> u64 {
    let actor_bits = ((actor.is_npc() as u64) << 32) | actor.raw() as u64;
    shard_seed
        .wrapping_mul(0x9E3779B97F4A7C15)
        .wrapping_add(tick.0)
        .rotate_left(17)
        .wrapping_add(actor_bits)
        .rotate_left(13)
        .wrapping_add(context.discriminant())
}
