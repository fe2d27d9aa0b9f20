//! Region forest: an arena of nested plateau regions.
//!
//! Regions are keyed by monotonically increasing ids. Alongside the forward
//! region -> tiles sets the forest keeps a reverse tile -> regions index and a
//! parent -> children adjacency, so membership lookups and subtree removal
//! never scan the whole forest.

use std::collections::{BTreeMap, BTreeSet};

use super::level::ElevationLevel;

/// Region identifier, unique for the lifetime of a forest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct RegionId(pub u32);

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A committed plateau.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationRegion {
    pub id: RegionId,
    pub level: ElevationLevel,
    pub tiles: BTreeSet<usize>,
    /// `None` for primary regions
    pub parent: Option<RegionId>,
}

impl ElevationRegion {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegionForest {
    regions: BTreeMap<RegionId, ElevationRegion>,
    children: BTreeMap<RegionId, Vec<RegionId>>,
    /// Tile -> ids of regions containing it, ascending
    membership: Vec<Vec<RegionId>>,
    next_id: u32,
}

impl RegionForest {
    pub fn new(tile_count: usize) -> Self {
        Self {
            membership: vec![Vec::new(); tile_count],
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Commit a new region and return its id.
    pub fn insert(
        &mut self,
        level: ElevationLevel,
        tiles: BTreeSet<usize>,
        parent: Option<RegionId>,
    ) -> RegionId {
        let id = RegionId(self.next_id);
        self.next_id += 1;

        for &tile in &tiles {
            // Ids only grow, so pushing keeps each list sorted.
            self.membership[tile].push(id);
        }
        if let Some(parent) = parent {
            self.children.entry(parent).or_default().push(id);
        }
        self.regions.insert(id, ElevationRegion { id, level, tiles, parent });
        id
    }

    pub fn get(&self, id: RegionId) -> Option<&ElevationRegion> {
        self.regions.get(&id)
    }

    /// All regions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ElevationRegion> {
        self.regions.values()
    }

    pub fn at_level(&self, level: ElevationLevel) -> impl Iterator<Item = &ElevationRegion> {
        self.regions.values().filter(move |r| r.level == level)
    }

    /// Regions containing a tile, ascending by id.
    pub fn regions_of(&self, tile: usize) -> &[RegionId] {
        self.membership.get(tile).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children_of(&self, id: RegionId) -> &[RegionId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Deepest level of any region containing the tile.
    pub fn deepest_level(&self, tile: usize) -> ElevationLevel {
        self.regions_of(tile)
            .iter()
            .filter_map(|id| self.regions.get(id))
            .map(|r| r.level)
            .max()
            .unwrap_or(ElevationLevel::GROUND)
    }

    /// Remove a region and all of its descendants.
    ///
    /// Returns the removed regions in post-order (children before parents).
    pub fn remove_subtree(&mut self, root: RegionId) -> Vec<ElevationRegion> {
        if !self.regions.contains_key(&root) {
            return Vec::new();
        }

        let mut order = Vec::new();
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for &child in self.children_of(id).iter().rev() {
                stack.push((child, false));
            }
        }

        let mut removed = Vec::with_capacity(order.len());
        for id in order {
            self.children.remove(&id);
            let Some(region) = self.regions.remove(&id) else {
                continue;
            };
            for &tile in &region.tiles {
                self.membership[tile].retain(|&r| r != id);
            }
            if let Some(parent) = region.parent {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.retain(|&c| c != id);
                }
            }
            removed.push(region);
        }
        removed
    }

    /// Take a tile out of every region that holds it.
    ///
    /// Regions left without tiles stay in the forest.
    pub fn detach_tile(&mut self, tile: usize) -> Vec<RegionId> {
        let Some(ids) = self.membership.get_mut(tile) else {
            return Vec::new();
        };
        let ids = std::mem::take(ids);
        for id in &ids {
            if let Some(region) = self.regions.get_mut(id) {
                region.tiles.remove(&tile);
            }
        }
        ids
    }

    /// Add a tile to a region and every ancestor of it.
    pub fn attach_tile(&mut self, tile: usize, id: RegionId) -> bool {
        if tile >= self.membership.len() || !self.regions.contains_key(&id) {
            return false;
        }

        let mut current = Some(id);
        while let Some(rid) = current {
            let Some(region) = self.regions.get_mut(&rid) else {
                break;
            };
            region.tiles.insert(tile);
            let list = &mut self.membership[tile];
            if let Err(pos) = list.binary_search(&rid) {
                list.insert(pos, rid);
            }
            current = region.parent;
        }
        true
    }
}
