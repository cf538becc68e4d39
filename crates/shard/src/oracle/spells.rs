//! Static spell catalog.

use std::collections::BTreeMap;
use std::path::Path;

use world_core::{SpellDefinition, SpellId, SpellOracle};

use crate::error::{Result, ShardError};

/// In-memory spell catalog keyed by spell id. Immutable at runtime; loaded
/// once at shard start.
#[derive(Clone, Debug, Default)]
pub struct Spellbook {
    spells: BTreeMap<SpellId, SpellDefinition>,
}

impl Spellbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, definition: SpellDefinition) {
        self.spells.insert(definition.id, definition);
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    /// Loads a catalog from a RON file holding a list of definitions.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ShardError::DataIo {
            path: path.to_path_buf(),
            source,
        })?;
        let definitions: Vec<SpellDefinition> =
            ron::from_str(&content).map_err(|source| ShardError::DataParse {
                path: path.to_path_buf(),
                source,
            })?;
        let mut book = Self::new();
        for definition in definitions {
            book.insert(definition);
        }
        Ok(book)
    }
}

impl FromIterator<SpellDefinition> for Spellbook {
    fn from_iter<I: IntoIterator<Item = SpellDefinition>>(iter: I) -> Self {
        let mut book = Self::new();
        for definition in iter {
            book.insert(definition);
        }
        book
    }
}

impl SpellOracle for Spellbook {
    fn spell(&self, id: SpellId) -> Option<SpellDefinition> {
        self.spells.get(&id).cloned()
    }
}
