//! Tile graph supplied by the caller.
//!
//! Tiles are stored densely: the tile at position `i` must carry index `i`,
//! and `adjacency[i]` lists the neighbors of tile `i`.

use glam::Vec3;

use crate::error::{Result, TerrainError};

/// A cell of the sphere tessellation.
#[derive(Clone, Debug)]
pub struct Tile {
    pub index: usize,
    /// Ordered boundary polygon on the sphere surface
    pub boundary: Vec<Vec3>,
    pub center: Vec3,
}

impl Tile {
    pub fn new(index: usize, boundary: Vec<Vec3>, center: Vec3) -> Self {
        Self { index, boundary, center }
    }

    /// Pentagons mark special tiles such as portals.
    pub fn is_pentagon(&self) -> bool {
        self.boundary.len() == 5
    }
}

/// Tiles plus their adjacency, validated on construction.
#[derive(Clone, Debug)]
pub struct TileGraph {
    tiles: Vec<Tile>,
    adjacency: Vec<Vec<usize>>,
}

impl TileGraph {
    pub fn new(tiles: Vec<Tile>, adjacency: Vec<Vec<usize>>) -> Result<Self> {
        if adjacency.len() != tiles.len() {
            return Err(TerrainError::AdjacencyLength {
                expected: tiles.len(),
                found: adjacency.len(),
            });
        }
        for (position, tile) in tiles.iter().enumerate() {
            if tile.index != position {
                return Err(TerrainError::TileIndexMismatch { position, index: tile.index });
            }
        }
        for (tile, neighbors) in adjacency.iter().enumerate() {
            if let Some(&neighbor) = neighbors.iter().find(|&&n| n >= tiles.len()) {
                return Err(TerrainError::NeighborOutOfRange { tile, neighbor });
            }
        }

        Ok(Self { tiles, adjacency })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn center(&self, index: usize) -> Vec3 {
        self.tiles[index].center
    }

    /// Neighbors of a tile, empty for unknown indices.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.adjacency.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(index: usize) -> Tile {
        Tile::new(index, Vec::new(), Vec3::new(index as f32, 0.0, 1.0))
    }

    #[test]
    fn test_valid_graph() {
        let graph = TileGraph::new(vec![tile(0), tile(1)], vec![vec![1], vec![0]]).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.neighbors(0), &[1]);
        assert!(graph.neighbors(7).is_empty());
    }

    #[test]
    fn test_rejects_inconsistent_input() {
        assert!(matches!(
            TileGraph::new(vec![tile(0), tile(1)], vec![vec![1]]),
            Err(TerrainError::AdjacencyLength { expected: 2, found: 1 })
        ));
        assert!(matches!(
            TileGraph::new(vec![tile(0), tile(5)], vec![vec![], vec![]]),
            Err(TerrainError::TileIndexMismatch { position: 1, index: 5 })
        ));
        assert!(matches!(
            TileGraph::new(vec![tile(0)], vec![vec![3]]),
            Err(TerrainError::NeighborOutOfRange { tile: 0, neighbor: 3 })
        ));
    }

    #[test]
    fn test_pentagon_detection() {
        let pent = Tile::new(0, vec![Vec3::X; 5], Vec3::Y);
        let hex = Tile::new(1, vec![Vec3::X; 6], Vec3::Y);
        assert!(pent.is_pentagon());
        assert!(!hex.is_pentagon());
    }
}
