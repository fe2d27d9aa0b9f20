//! Plateau terrain library
//!
//! Raises nested plateaus (up to three levels) over a spherical tile graph,
//! keeps ground connected, and answers elevation queries by position.

pub mod config;
pub mod elevation;
pub mod error;
pub mod export;
pub mod seeds;
pub mod spatial;
pub mod sphere;
pub mod terrain;
pub mod tilemap;
pub mod tiles;

pub use config::{ElevationConfig, SizeRange, TerrainStyle};
pub use elevation::{ElevationLevel, ElevationRegion, RegionId};
pub use error::{Result, TerrainError};
pub use terrain::{ElevationTerrain, GenerationReport, GenerationWarning};
pub use tiles::{Tile, TileGraph};
