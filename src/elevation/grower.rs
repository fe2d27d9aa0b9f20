//! Nearest-first region growth over the tile graph.
//!
//! A region grows from a seed tile by repeatedly claiming the frontier tile
//! whose center is closest to the seed's center. Only tiles adjacent to the
//! region ever enter the frontier, so the result is always connected.
//!
//! Tie-break: frontier entries with equal distance are claimed in the order
//! they were discovered. Discovery follows claim order and, within one tile,
//! the order of its adjacency list.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashSet};

use crate::tiles::TileGraph;

/// Membership test used to constrain growth.
pub trait TileSet {
    fn contains_tile(&self, tile: usize) -> bool;
}

impl TileSet for BTreeSet<usize> {
    fn contains_tile(&self, tile: usize) -> bool {
        self.contains(&tile)
    }
}

impl TileSet for HashSet<usize> {
    fn contains_tile(&self, tile: usize) -> bool {
        self.contains(&tile)
    }
}

/// Dense mask indexed by tile.
impl TileSet for [bool] {
    fn contains_tile(&self, tile: usize) -> bool {
        self.get(tile).copied().unwrap_or(false)
    }
}

impl TileSet for Vec<bool> {
    fn contains_tile(&self, tile: usize) -> bool {
        self.as_slice().contains_tile(tile)
    }
}

/// The empty set.
pub struct NoTiles;

impl TileSet for NoTiles {
    fn contains_tile(&self, _tile: usize) -> bool {
        false
    }
}

/// Entry in the growth frontier.
#[derive(Clone, Copy)]
struct FrontierTile {
    tile: usize,
    distance: f32,
    /// Discovery sequence number
    order: u64,
}

impl PartialEq for FrontierTile {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierTile {}

impl PartialOrd for FrontierTile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierTile {
    // Reversed: BinaryHeap is a max-heap and we pop the nearest, earliest tile.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Grow a connected region of up to `target_size` tiles from `seed`.
///
/// Returns an empty set when the seed is not allowed or is excluded.
pub fn grow<A, E>(
    graph: &TileGraph,
    seed: usize,
    target_size: usize,
    allowed: &A,
    excluded: &E,
) -> BTreeSet<usize>
where
    A: TileSet + ?Sized,
    E: TileSet + ?Sized,
{
    let mut region = BTreeSet::new();
    if target_size == 0 || seed >= graph.len() || !allowed.contains_tile(seed) || excluded.contains_tile(seed) {
        return region;
    }

    let origin = graph.center(seed);
    let mut seen: HashSet<usize> = HashSet::from([seed]);
    let mut frontier: BinaryHeap<FrontierTile> = BinaryHeap::new();
    let mut order = 0u64;

    let mut claim = |tile: usize, region: &mut BTreeSet<usize>, frontier: &mut BinaryHeap<FrontierTile>| {
        region.insert(tile);
        for &n in graph.neighbors(tile) {
            if seen.contains(&n) || !allowed.contains_tile(n) || excluded.contains_tile(n) {
                continue;
            }
            seen.insert(n);
            frontier.push(FrontierTile {
                tile: n,
                distance: graph.center(n).distance(origin),
                order,
            });
            order += 1;
        }
    };

    claim(seed, &mut region, &mut frontier);
    while region.len() < target_size {
        let Some(next) = frontier.pop() else {
            break;
        };
        claim(next.tile, &mut region, &mut frontier);
    }

    region
}
