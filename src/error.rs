//! Errors raised while building a terrain.
//!
//! Only construction faults are errors. Soft generation failures are reported
//! through [`crate::terrain::GenerationWarning`] instead.

use thiserror::Error;

/// Result type for terrain construction
pub type Result<T> = std::result::Result<T, TerrainError>;

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("invalid config value for {field}: {message}")]
    InvalidConfig { field: &'static str, message: String },

    #[error("tile at position {position} carries index {index}")]
    TileIndexMismatch { position: usize, index: usize },

    #[error("adjacency lists {found} tiles but the tile list has {expected}")]
    AdjacencyLength { expected: usize, found: usize },

    #[error("tile {tile} lists neighbor {neighbor} which does not exist")]
    NeighborOutOfRange { tile: usize, neighbor: usize },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
