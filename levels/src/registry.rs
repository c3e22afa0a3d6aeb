//! Ordered catalogue of levels addressed by [`LevelId`].

use std::{
    collections::{btree_map::Entry, BTreeMap},
    fs,
    ops::Bound,
    path::Path,
};

use block_escape_core::{LevelData, LevelId};
use serde::{Deserialize, Serialize};

use crate::{builtin, LevelError};

/// On-disk layout of a level file: a `[[levels]]` array.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LevelDocument {
    #[serde(default)]
    levels: Vec<LevelData>,
}

/// Ordered collection of levels.
#[derive(Clone, Debug, Default)]
pub struct LevelRegistry {
    levels: BTreeMap<LevelId, LevelData>,
}

impl LevelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the levels shipped with the game.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for level in builtin::levels() {
            let _ = registry.register(level);
        }
        registry
    }

    /// Parses a TOML level document.
    pub fn from_toml_str(source: &str) -> Result<Self, LevelError> {
        let document: LevelDocument = toml::from_str(source)?;
        Self::from_document(document)
    }

    /// Parses a JSON level document.
    pub fn from_json_str(source: &str) -> Result<Self, LevelError> {
        let document: LevelDocument = serde_json::from_str(source)?;
        Self::from_document(document)
    }

    /// Reads a level document, picking the format from the file extension.
    pub fn load_file(path: &Path) -> Result<Self, LevelError> {
        let source = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = match path.extension().and_then(|extension| extension.to_str()) {
            Some("toml") => Self::from_toml_str(&source)?,
            Some("json") => Self::from_json_str(&source)?,
            _ => return Err(LevelError::UnsupportedFormat(path.to_path_buf())),
        };
        log::info!("loaded {} levels from {}", registry.len(), path.display());
        Ok(registry)
    }

    /// Renders every level as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, LevelError> {
        let document = LevelDocument {
            levels: self.levels.values().cloned().collect(),
        };
        Ok(toml::to_string_pretty(&document)?)
    }

    fn from_document(document: LevelDocument) -> Result<Self, LevelError> {
        let mut levels = BTreeMap::new();
        for level in document.levels {
            level.validate().map_err(|source| LevelError::Invalid {
                level: level.id(),
                source,
            })?;
            match levels.entry(level.id()) {
                Entry::Occupied(_) => return Err(LevelError::Duplicate(level.id())),
                Entry::Vacant(slot) => {
                    let _ = slot.insert(level);
                }
            }
        }
        Ok(Self { levels })
    }

    /// Adds or replaces a level, returning the one it replaced.
    pub fn register(&mut self, level: LevelData) -> Option<LevelData> {
        self.levels.insert(level.id(), level)
    }

    /// Adds every level of `other`, replacing levels with the same identifier.
    pub fn merge(&mut self, other: LevelRegistry) {
        self.levels.extend(other.levels);
    }

    /// Looks up a level.
    #[must_use]
    pub fn get(&self, id: LevelId) -> Option<&LevelData> {
        self.levels.get(&id)
    }

    /// Looks up a level, falling back to [`LevelId::FIRST`] when it is missing.
    #[must_use]
    pub fn resolve(&self, id: LevelId) -> Option<&LevelData> {
        match self.levels.get(&id) {
            Some(level) => Some(level),
            None => {
                log::warn!(
                    "level {} not found, falling back to level {}",
                    id.get(),
                    LevelId::FIRST.get()
                );
                self.levels.get(&LevelId::FIRST)
            }
        }
    }

    /// Level following `id` in identifier order.
    #[must_use]
    pub fn next_after(&self, id: LevelId) -> Option<&LevelData> {
        self.levels
            .range((Bound::Excluded(id), Bound::Unbounded))
            .next()
            .map(|(_, level)| level)
    }

    /// Level with the lowest identifier.
    #[must_use]
    pub fn first(&self) -> Option<&LevelData> {
        self.levels.values().next()
    }

    /// Identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = LevelId> + '_ {
        self.levels.keys().copied()
    }

    /// Levels in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &LevelData> {
        self.levels.values()
    }

    /// Number of registered levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether no level is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
