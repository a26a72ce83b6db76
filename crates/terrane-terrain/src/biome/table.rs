//! Biome table: ordered biome definitions with name and key validation.

use rustc_hash::FxHashSet;

use super::{BiomeDef, BiomeKey};

/// Index of a biome in its [`BiomeTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeIndex(pub u16);

impl BiomeIndex {
    /// Position in the table as a `usize`.
    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// Errors that can occur when assembling a biome table.
#[derive(Debug, thiserror::Error)]
pub enum BiomeTableError {
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
    /// Two biomes share a key; the later one could never be selected.
    #[error("biomes {first:?} and {second:?} share key {key:?}")]
    DuplicateKey {
        /// The shared key.
        key: BiomeKey,
        /// Name of the earlier biome.
        first: String,
        /// Name of the later biome.
        second: String,
    },
    /// No biome answers to this key.
    #[error("no biome covers key {0:?}")]
    MissingKey(BiomeKey),
    /// The biome has no color stops.
    #[error("biome {0:?} has an empty color ramp")]
    EmptyRamp(String),
}

/// Stores all biome definitions in classification order.
#[derive(Clone, Debug, Default)]
pub struct BiomeTable {
    biomes: Vec<BiomeDef>,
}

impl BiomeTable {
    /// Builds a table, rejecting duplicate names, duplicate keys and empty ramps.
    ///
    /// Gaps are allowed: keys without a biome classify as unmatched.
    ///
    /// # Errors
    ///
    /// Returns the first [`BiomeTableError`] found.
    pub fn new(biomes: Vec<BiomeDef>) -> Result<Self, BiomeTableError> {
        let mut names = FxHashSet::default();
        for (i, def) in biomes.iter().enumerate() {
            if !names.insert(def.name.as_str()) {
                return Err(BiomeTableError::DuplicateName(def.name.clone()));
            }
            if def.ramp.stops.is_empty() {
                return Err(BiomeTableError::EmptyRamp(def.name.clone()));
            }
            if let Some(first) = biomes[..i].iter().find(|b| b.key == def.key) {
                return Err(BiomeTableError::DuplicateKey {
                    key: def.key,
                    first: first.name.clone(),
                    second: def.name.clone(),
                });
            }
        }
        Ok(Self { biomes })
    }

    /// Like [`new`](Self::new), but additionally requires all eight keys to be covered.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeTableError::MissingKey`] for the first uncovered key.
    pub fn new_complete(biomes: Vec<BiomeDef>) -> Result<Self, BiomeTableError> {
        let table = Self::new(biomes)?;
        if let Some(key) = table.missing_keys().next() {
            return Err(BiomeTableError::MissingKey(key));
        }
        Ok(table)
    }

    /// Keys that no biome answers to.
    pub fn missing_keys(&self) -> impl Iterator<Item = BiomeKey> + '_ {
        BiomeKey::ALL
            .into_iter()
            .filter(|key| self.biomes.iter().all(|b| b.key != *key))
    }

    /// Returns `true` if every key is covered.
    pub fn is_complete(&self) -> bool {
        self.missing_keys().next().is_none()
    }

    /// Linear scan for the biome answering to `key`.
    pub fn find(&self, key: BiomeKey) -> Option<BiomeIndex> {
        self.biomes
            .iter()
            .position(|b| b.key == key)
            .map(|i| BiomeIndex(i as u16))
    }

    /// Definition at `index`, or `None` if it is out of range.
    pub fn get(&self, index: BiomeIndex) -> Option<&BiomeDef> {
        self.biomes.get(index.get())
    }

    /// All definitions in table order.
    pub fn iter(&self) -> impl Iterator<Item = &BiomeDef> {
        self.biomes.iter()
    }

    /// Returns the number of registered biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Returns `true` if no biomes are registered.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{ColorRamp, ColorStop};
    use glam::Vec4;

    fn def(name: &str, key: BiomeKey) -> BiomeDef {
        BiomeDef {
            name: name.into(),
            key,
            ramp: ColorRamp::new(vec![ColorStop {
                color: Vec4::ONE,
                start_height: 0.0,
                blend: 0.0,
            }]),
            prototypes: Vec::new(),
        }
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = BiomeTable::new(vec![
            def("desert", BiomeKey::new(false, true, true)),
            def("desert", BiomeKey::new(true, true, true)),
        ]);
        assert!(matches!(result, Err(BiomeTableError::DuplicateName(_))));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result = BiomeTable::new(vec![
            def("desert", BiomeKey::new(false, true, true)),
            def("dunes", BiomeKey::new(false, true, true)),
        ]);
        assert!(matches!(result, Err(BiomeTableError::DuplicateKey { .. })));
    }

    #[test]
    fn test_empty_ramp_rejected() {
        let mut bare = def("void", BiomeKey::default());
        bare.ramp.stops.clear();
        assert!(matches!(BiomeTable::new(vec![bare]), Err(BiomeTableError::EmptyRamp(_))));
    }

    #[test]
    fn test_partial_table_reports_missing_keys() {
        let table = BiomeTable::new(vec![def("marsh", BiomeKey::new(false, false, false))]).unwrap();
        assert!(!table.is_complete());
        assert_eq!(table.missing_keys().count(), 7);
        assert!(matches!(
            BiomeTable::new_complete(vec![def("marsh", BiomeKey::default())]),
            Err(BiomeTableError::MissingKey(_))
        ));
    }

    #[test]
    fn test_complete_table_accepted() {
        let defs = BiomeKey::ALL
            .iter()
            .enumerate()
            .map(|(i, key)| def(&format!("biome{i}"), *key))
            .collect();
        let table = BiomeTable::new_complete(defs).unwrap();
        assert_eq!(table.len(), 8);
        assert_eq!(table.find(BiomeKey::new(true, false, true)), Some(BiomeIndex(5)));
    }
}
