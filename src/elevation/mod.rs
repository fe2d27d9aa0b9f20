//! Plateau generation: region growth, the nested region hierarchy and ground
//! connectivity repair.

pub mod assignment;
pub mod connectivity;
pub mod grower;
pub mod hierarchy;
pub mod level;
pub mod regions;

pub use assignment::ElevationAssignment;
pub use connectivity::{validate_and_repair, ConnectivityOutcome};
pub use grower::{grow, NoTiles, TileSet};
pub use hierarchy::{build_hierarchy, HierarchyStats, PhaseStats};
pub use level::ElevationLevel;
pub use regions::{ElevationRegion, RegionForest, RegionId};
