//! Block registry: maps single-character block symbols to [`BlockDef`] metadata.
//!
//! The registry is built once during startup from the configured block table
//! and never mutated afterwards. Every symbol the terrain engine writes must be
//! registered; configuration validation enforces that before generation starts.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Reserved symbols
// ---------------------------------------------------------------------------

/// Symbols the terrain engine writes directly.
pub mod symbols {
    /// Empty cell (sky, carved cave).
    pub const AIR: char = ' ';
    /// Ground-surface marker placed on top of every column.
    pub const SURFACE: char = '-';
    /// Solid fill between the surface and bedrock.
    pub const FILL: char = '#';
    /// Bottom row of every column.
    pub const BEDROCK: char = '_';
    /// Tree trunk.
    pub const TRUNK: char = '|';
    /// Tree leaves.
    pub const LEAF: char = '@';
    /// Grass tuft sitting on the surface.
    pub const GRASS: char = 'v';

    /// All symbols that must be present in any block table.
    pub const RESERVED: [char; 7] = [AIR, SURFACE, FILL, BEDROCK, TRUNK, LEAF, GRASS];
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Full descriptor for a block symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDef {
    /// Human-readable name (e.g. "dirt", "coal").
    pub name: String,
    /// Whether the block supports other blocks and takes part in gravity.
    pub solid: bool,
    /// Overwrite precedence: a higher value wins when two features target the
    /// same cell.
    pub hierarchy: i32,
}

/// Errors that can occur while building the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The same symbol was registered twice.
    #[error("duplicate block symbol: {0:?}")]
    DuplicateSymbol(char),
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps block symbol → [`BlockDef`].
#[derive(Clone, Debug, Default)]
pub struct BlockRegistry {
    blocks: FxHashMap<char, BlockDef>,
}

impl BlockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from `(symbol, definition)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateSymbol`] if a symbol appears twice.
    pub fn from_table<I>(table: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (char, BlockDef)>,
    {
        let mut registry = Self::new();
        for (symbol, def) in table {
            registry.register(symbol, def)?;
        }
        Ok(registry)
    }

    /// Registers a block symbol.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateSymbol`] if the symbol already exists.
    pub fn register(&mut self, symbol: char, def: BlockDef) -> Result<(), RegistryError> {
        if self.blocks.contains_key(&symbol) {
            return Err(RegistryError::DuplicateSymbol(symbol));
        }
        self.blocks.insert(symbol, def);
        Ok(())
    }

    /// Returns the definition of `symbol`, if registered.
    pub fn get(&self, symbol: char) -> Option<&BlockDef> {
        self.blocks.get(&symbol)
    }

    /// Returns `true` if `symbol` is registered.
    pub fn contains(&self, symbol: char) -> bool {
        self.blocks.contains_key(&symbol)
    }

    /// Returns `true` if `symbol` is solid.
    ///
    /// Unknown symbols are treated like air.
    pub fn is_solid(&self, symbol: char) -> bool {
        self.get(symbol).is_some_and(|def| def.solid)
    }

    /// Returns the hierarchy of `symbol`. Unknown symbols never win.
    pub fn hierarchy(&self, symbol: char) -> i32 {
        self.get(symbol).map_or(i32::MIN, |def| def.hierarchy)
    }

    /// Picks the symbol that should occupy a cell when `candidate` is placed
    /// over `existing`.
    ///
    /// The higher hierarchy wins. Ties keep `existing`, so placing features of
    /// equal hierarchy is first-writer-wins.
    pub fn resolve(&self, candidate: char, existing: char) -> char {
        if self.hierarchy(candidate) > self.hierarchy(existing) {
            candidate
        } else {
            existing
        }
    }

    /// Places `candidate` into `cell` using [`resolve`](Self::resolve).
    pub fn place(&self, cell: &mut char, candidate: char) {
        *cell = self.resolve(candidate, *cell);
    }

    /// Number of registered symbols.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, solid: bool, hierarchy: i32) -> BlockDef {
        BlockDef {
            name: name.to_string(),
            solid,
            hierarchy,
        }
    }

    fn test_registry() -> BlockRegistry {
        BlockRegistry::from_table([
            (symbols::AIR, def("air", false, 0)),
            (symbols::LEAF, def("leaves", false, 2)),
            (symbols::TRUNK, def("trunk", false, 3)),
            (symbols::FILL, def("dirt", true, 4)),
            ('+', def("iron", true, 6)),
            ('x', def("other_ore", true, 6)),
            (symbols::BEDROCK, def("bedrock", true, 10)),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let registry = test_registry();
        assert_eq!(registry.get('+').unwrap().name, "iron");
        assert!(registry.get('?').is_none());
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let mut registry = test_registry();
        let result = registry.register('+', def("iron_again", true, 1));
        assert!(matches!(result, Err(RegistryError::DuplicateSymbol('+'))));
    }

    #[test]
    fn test_unknown_symbol_is_not_solid() {
        let registry = test_registry();
        assert!(registry.is_solid(symbols::FILL));
        assert!(!registry.is_solid(symbols::AIR));
        assert!(!registry.is_solid('?'));
    }

    #[test]
    fn test_lower_hierarchy_does_not_overwrite() {
        let registry = test_registry();
        let mut cell = symbols::TRUNK;
        registry.place(&mut cell, symbols::LEAF);
        assert_eq!(cell, symbols::TRUNK);
    }

    #[test]
    fn test_higher_hierarchy_overwrites() {
        let registry = test_registry();
        let mut cell = symbols::LEAF;
        registry.place(&mut cell, symbols::TRUNK);
        assert_eq!(cell, symbols::TRUNK);

        let mut cell = symbols::FILL;
        registry.place(&mut cell, '+');
        assert_eq!(cell, '+');
    }

    #[test]
    fn test_equal_hierarchy_keeps_existing() {
        let registry = test_registry();
        assert_eq!(registry.resolve('x', '+'), '+');
        assert_eq!(registry.resolve('+', 'x'), 'x');
    }

    #[test]
    fn test_unknown_candidate_never_wins() {
        let registry = test_registry();
        assert_eq!(registry.resolve('?', symbols::AIR), symbols::AIR);
    }
}
