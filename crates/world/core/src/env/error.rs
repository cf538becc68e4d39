//! Errors for missing collaborators.
//!
//! The engine degrades a missing required oracle to a skipped pair, never a
//! halted tick; these errors exist so callers and logs can tell which seam
//! was left unwired.

/// A required collaborator was not provided to [`crate::env::CombatEnv`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("damage formula oracle not available")]
    FormulasNotAvailable,

    #[error("spell catalog oracle not available")]
    SpellsNotAvailable,

    #[error("region oracle not available")]
    RegionsNotAvailable,

    #[error("rng oracle not available")]
    RngNotAvailable,
}
