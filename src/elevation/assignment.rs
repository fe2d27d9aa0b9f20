//! Per-tile elevation levels kept in sync with the region forest.

use std::collections::BTreeSet;

use super::level::ElevationLevel;
use super::regions::{ElevationRegion, RegionForest, RegionId};

/// The authoritative elevation state: per-tile levels, the elevated-tile
/// cache and the region forest they are derived from.
#[derive(Clone, Debug)]
pub struct ElevationAssignment {
    levels: Vec<ElevationLevel>,
    elevated: BTreeSet<usize>,
    forest: RegionForest,
}

impl ElevationAssignment {
    pub fn new(tile_count: usize) -> Self {
        Self {
            levels: vec![ElevationLevel::GROUND; tile_count],
            elevated: BTreeSet::new(),
            forest: RegionForest::new(tile_count),
        }
    }

    /// Level of a tile, ground for unknown indices.
    pub fn level(&self, tile: usize) -> ElevationLevel {
        self.levels.get(tile).copied().unwrap_or(ElevationLevel::GROUND)
    }

    pub fn levels(&self) -> &[ElevationLevel] {
        &self.levels
    }

    pub fn is_elevated(&self, tile: usize) -> bool {
        self.elevated.contains(&tile)
    }

    pub fn elevated(&self) -> &BTreeSet<usize> {
        &self.elevated
    }

    pub fn forest(&self) -> &RegionForest {
        &self.forest
    }

    pub(crate) fn forest_mut(&mut self) -> &mut RegionForest {
        &mut self.forest
    }

    /// Commit a region, raising each member tile to at least `level`.
    pub fn commit(
        &mut self,
        level: ElevationLevel,
        tiles: BTreeSet<usize>,
        parent: Option<RegionId>,
    ) -> RegionId {
        for &tile in &tiles {
            if level > self.levels[tile] {
                self.set_level(tile, level);
            }
        }
        self.forest.insert(level, tiles, parent)
    }

    /// Remove a region with its descendants and recompute the affected tiles.
    pub fn remove_region_tree(&mut self, id: RegionId) -> Vec<ElevationRegion> {
        let removed = self.forest.remove_subtree(id);
        let touched: BTreeSet<usize> = removed.iter().flat_map(|r| r.tiles.iter().copied()).collect();
        for tile in touched {
            let level = self.forest.deepest_level(tile);
            self.set_level(tile, level);
        }
        removed
    }

    /// Set a tile's level and keep the elevated cache in step.
    pub fn set_level(&mut self, tile: usize, level: ElevationLevel) {
        let Some(slot) = self.levels.get_mut(tile) else {
            return;
        };
        *slot = level;
        if level.is_ground() {
            self.elevated.remove(&tile);
        } else {
            self.elevated.insert(tile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_and_remove_keep_caches_in_sync() {
        let mut assignment = ElevationAssignment::new(8);
        let a = assignment.commit(ElevationLevel::PRIMARY, BTreeSet::from([0, 1, 2, 3]), None);
        assignment.commit(ElevationLevel::SECONDARY, BTreeSet::from([1, 2]), Some(a));

        assert_eq!(assignment.level(1), ElevationLevel::SECONDARY);
        assert_eq!(assignment.level(0), ElevationLevel::PRIMARY);
        assert_eq!(assignment.elevated().len(), 4);

        assignment.remove_region_tree(a);
        assert!(assignment.elevated().is_empty());
        assert!(assignment.levels().iter().all(|l| l.is_ground()));
        assert!(assignment.forest().is_empty());
    }

    #[test]
    fn test_overlapping_siblings_upgrade_only() {
        let mut assignment = ElevationAssignment::new(6);
        let a = assignment.commit(ElevationLevel::PRIMARY, BTreeSet::from([0, 1, 2, 3]), None);
        let b = assignment.commit(ElevationLevel::SECONDARY, BTreeSet::from([0, 1]), Some(a));
        assignment.commit(ElevationLevel::SECONDARY, BTreeSet::from([1, 2]), Some(a));

        assert_eq!(assignment.level(1), ElevationLevel::SECONDARY);
        assert_eq!(assignment.forest().regions_of(1).len(), 3);

        assignment.remove_region_tree(b);
        assert_eq!(assignment.level(0), ElevationLevel::PRIMARY);
        assert_eq!(assignment.level(1), ElevationLevel::SECONDARY);
    }

    #[test]
    fn test_unknown_tile_is_ground() {
        let mut assignment = ElevationAssignment::new(2);
        assignment.set_level(10, ElevationLevel::TERTIARY);
        assert_eq!(assignment.level(10), ElevationLevel::GROUND);
        assert!(!assignment.is_elevated(10));
    }
}
