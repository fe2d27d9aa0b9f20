//! Ground connectivity validation and repair.
//!
//! Ground tiles (eligible and not elevated) must form one connected
//! component. When plateaus wall off a pocket of ground, the smallest primary
//! plateau bordering the pocket is removed together with its nested
//! plateaus, and the check runs again.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, warn};

use crate::tiles::TileGraph;

use super::assignment::ElevationAssignment;
use super::level::ElevationLevel;
use super::regions::RegionId;

/// Result of validating (and possibly repairing) ground connectivity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectivityOutcome {
    /// Ground was connected without changes
    Connected,
    /// Ground is connected after removing these primaries (in removal order)
    Repaired { removed: Vec<RegionId> },
    /// No bordering primary was left to remove
    Unrepairable { removed: Vec<RegionId>, isolated: usize },
}

impl ConnectivityOutcome {
    pub fn is_connected(&self) -> bool {
        !matches!(self, Self::Unrepairable { .. })
    }

    pub fn removed(&self) -> &[RegionId] {
        match self {
            Self::Connected => &[],
            Self::Repaired { removed } | Self::Unrepairable { removed, .. } => removed,
        }
    }
}

/// Eligible tiles that are not elevated.
pub fn ground_tiles(eligible: &[bool], assignment: &ElevationAssignment) -> BTreeSet<usize> {
    (0..eligible.len())
        .filter(|&t| eligible[t] && !assignment.is_elevated(t))
        .collect()
}

/// Ground tiles not reachable from the lowest-index ground tile.
pub fn isolated_ground(graph: &TileGraph, eligible: &[bool], assignment: &ElevationAssignment) -> BTreeSet<usize> {
    let ground = ground_tiles(eligible, assignment);
    let Some(&start) = ground.iter().next() else {
        return BTreeSet::new();
    };

    let mut visited = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(tile) = queue.pop_front() {
        for &n in graph.neighbors(tile) {
            if ground.contains(&n) && visited.insert(n) {
                queue.push_back(n);
            }
        }
    }

    if visited.len() == ground.len() {
        return BTreeSet::new();
    }
    ground.difference(&visited).copied().collect()
}

/// Remove bordering primaries until ground is connected or nothing is left
/// to remove.
pub fn validate_and_repair(
    graph: &TileGraph,
    eligible: &[bool],
    assignment: &mut ElevationAssignment,
) -> ConnectivityOutcome {
    let mut removed = Vec::new();

    loop {
        let isolated = isolated_ground(graph, eligible, assignment);
        if isolated.is_empty() {
            return if removed.is_empty() {
                ConnectivityOutcome::Connected
            } else {
                ConnectivityOutcome::Repaired { removed }
            };
        }

        // Edges from isolated ground into each region
        let mut touching: BTreeMap<RegionId, usize> = BTreeMap::new();
        for &tile in &isolated {
            for &n in graph.neighbors(tile) {
                if !assignment.is_elevated(n) {
                    continue;
                }
                for &id in assignment.forest().regions_of(n) {
                    *touching.entry(id).or_insert(0) += 1;
                }
            }
        }

        let forest = assignment.forest();
        let smallest = touching
            .keys()
            .filter_map(|&id| forest.get(id))
            .filter(|r| r.level == ElevationLevel::PRIMARY)
            .min_by_key(|r| (r.len(), r.id))
            .map(|r| (r.id, r.len()));

        let Some((id, size)) = smallest else {
            warn!(
                "Ground is split: {} isolated tiles with no removable bordering plateau",
                isolated.len()
            );
            return ConnectivityOutcome::Unrepairable { removed, isolated: isolated.len() };
        };

        debug!(
            "Removing primary {} ({} tiles, {} edges into {} isolated tiles)",
            id,
            size,
            touching.get(&id).copied().unwrap_or(0),
            isolated.len()
        );
        assignment.remove_region_tree(id);
        removed.push(id);
    }
}
