//! Registry of grid maps shared across the documents of a build

use std::collections::BTreeMap;

use crate::error::ConsistencyError;
use crate::parser::ast::GridMapDecl;

/// A named mapping from single characters to image filenames
#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    pub name: String,
    /// Parent map names from the `grid-map` header, in declaration order
    pub parents: Vec<String>,
    /// Filenames as written, relative to `source_document`
    pub entries: BTreeMap<char, String>,
    /// Document that defined this map
    pub source_document: String,
}

impl GridMap {
    /// Create a grid map from a parsed declaration in `docname`
    pub fn from_decl(decl: &GridMapDecl, docname: &str) -> Self {
        Self {
            name: decl.name.node.0.clone(),
            parents: decl.parents.iter().map(|p| p.node.0.clone()).collect(),
            entries: decl.entries.clone(),
            source_document: docname.to_string(),
        }
    }

    pub fn get(&self, ch: char) -> Option<&str> {
        self.entries.get(&ch).map(|s| s.as_str())
    }
}

/// Build-wide store of grid maps, keyed by name
///
/// Iteration is ordered by name so that listings and collision reports do
/// not depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    maps: BTreeMap<String, GridMap>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a map; the name must not be taken
    pub fn add(&mut self, map: GridMap) -> Result<(), ConsistencyError> {
        if let Some(existing) = self.maps.get(&map.name) {
            return Err(ConsistencyError {
                name: map.name.clone(),
                first_document: existing.source_document.clone(),
                second_document: map.source_document,
            });
        }
        self.maps.insert(map.name.clone(), map);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&GridMap> {
        self.maps.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.maps.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridMap> {
        self.maps.values()
    }

    /// Remove every map defined by `document`
    pub fn purge(&mut self, document: &str) {
        self.maps.retain(|_, map| map.source_document != document);
    }

    /// Absorb the maps collected by another worker
    ///
    /// Fails without modifying `self` if any name is present on both sides;
    /// the smallest colliding name is reported.
    pub fn merge(&mut self, other: Registry) -> Result<(), ConsistencyError> {
        if let Some(err) = self.collision(&other, &[]) {
            return Err(err);
        }
        self.maps.extend(other.maps);
        Ok(())
    }

    /// First name `other` shares with this registry
    ///
    /// Maps defined by the `replaced` documents are about to be purged and
    /// do not count.
    pub fn collision(&self, other: &Registry, replaced: &[&str]) -> Option<ConsistencyError> {
        other.maps.values().find_map(|theirs| {
            let ours = self.maps.get(&theirs.name)?;
            if replaced.contains(&ours.source_document.as_str()) {
                return None;
            }
            Some(ConsistencyError {
                name: theirs.name.clone(),
                first_document: ours.source_document.clone(),
                second_document: theirs.source_document.clone(),
            })
        })
    }
}
