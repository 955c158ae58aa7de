//! Resolved lookup tables keyed by map character and resource code

use ahash::AHashMap;

use crate::core::types::Fpt;
use crate::grid::resource::ResourceCode;

/// Productivity lookups; anything not listed yields zero
#[derive(Debug, Clone, Default)]
pub struct TileTables {
    terrain_fpt: AHashMap<char, Fpt>,
    resource_fpt: AHashMap<ResourceCode, Fpt>,
    allowed: AHashMap<char, Vec<ResourceCode>>,
    /// Terrain characters in table order
    terrains: Vec<char>,
}

impl TileTables {
    pub fn insert_terrain(&mut self, ident: char, fpt: Fpt, allowed: Vec<ResourceCode>) {
        if self.terrain_fpt.insert(ident, fpt).is_none() {
            self.terrains.push(ident);
        }
        self.allowed.insert(ident, allowed);
    }

    pub fn insert_resource(&mut self, code: ResourceCode, fpt: Fpt) {
        self.resource_fpt.insert(code, fpt);
    }

    pub fn terrain_fpt(&self, terrain: char) -> Fpt {
        self.terrain_fpt.get(&terrain).copied().unwrap_or(Fpt::ZERO)
    }

    pub fn resource_fpt(&self, code: ResourceCode) -> Fpt {
        self.resource_fpt.get(&code).copied().unwrap_or(Fpt::ZERO)
    }

    pub fn has_resource(&self, code: ResourceCode) -> bool {
        self.resource_fpt.contains_key(&code)
    }

    pub fn has_terrain(&self, terrain: char) -> bool {
        self.terrain_fpt.contains_key(&terrain)
    }

    /// Resources that may sit on a terrain; `None` when the terrain is unlisted
    pub fn allowed(&self, terrain: char) -> Option<&[ResourceCode]> {
        self.allowed.get(&terrain).map(Vec::as_slice)
    }

    pub fn allowed_resources(&self, terrain: char) -> &[ResourceCode] {
        self.allowed(terrain).unwrap_or(&[])
    }

    /// Whether a resource may stay on a tile after it becomes `terrain`
    pub fn permits(&self, terrain: char, code: ResourceCode) -> bool {
        self.allowed(terrain).map_or(true, |codes| codes.contains(&code))
    }

    pub fn terrains(&self) -> &[char] {
        &self.terrains
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entries_are_zero() {
        let tables = TileTables::default();
        assert!(tables.terrain_fpt('x').is_zero());
        assert!(tables.resource_fpt(ResourceCode::new(3, '4')).is_zero());
        assert!(tables.permits('x', ResourceCode::new(3, '4')));
    }

    #[test]
    fn test_permits_follows_allowed_list() {
        let mut tables = TileTables::default();
        let gold = ResourceCode::new(3, '4');
        tables.insert_terrain('m', Fpt::new(0.0, 1.0, 0.0), vec![gold]);
        tables.insert_terrain('g', Fpt::new(2.0, 0.0, 0.0), vec![]);
        assert!(tables.permits('m', gold));
        assert!(!tables.permits('g', gold));
        assert_eq!(tables.terrains(), &['m', 'g']);
    }
}
