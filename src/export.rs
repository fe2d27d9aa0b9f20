//! Export generated elevation to JSON

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::terrain::ElevationTerrain;

/// Exported elevation state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElevationSnapshot {
    pub seed: u64,
    pub tile_count: usize,
    /// Level per tile, indexed by tile
    pub levels: Vec<u8>,
    pub regions: Vec<RegionSnapshot>,
    pub removed_by_repair: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    pub id: u32,
    pub level: u8,
    pub parent: Option<u32>,
    pub tiles: Vec<usize>,
}

impl ElevationSnapshot {
    pub fn from_terrain(terrain: &ElevationTerrain) -> Self {
        let regions = terrain
            .regions()
            .map(|r| RegionSnapshot {
                id: r.id.0,
                level: r.level.0,
                parent: r.parent.map(|p| p.0),
                tiles: r.tiles.iter().copied().collect(),
            })
            .collect();

        Self {
            seed: terrain.config().seed,
            tile_count: terrain.graph().len(),
            levels: terrain.levels().iter().map(|l| l.0).collect(),
            regions,
            removed_by_repair: terrain.report().connectivity.removed().iter().map(|id| id.0).collect(),
        }
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElevationConfig;
    use crate::sphere::fibonacci_sphere;

    #[test]
    fn test_snapshot_matches_terrain() {
        let graph = fibonacci_sphere(400, 1.0).unwrap();
        let terrain = ElevationTerrain::generate(ElevationConfig::default(), graph, &[], &[]).unwrap();
        let snapshot = ElevationSnapshot::from_terrain(&terrain);

        assert_eq!(snapshot.tile_count, 400);
        assert_eq!(snapshot.levels.len(), 400);
        assert_eq!(snapshot.regions.len(), terrain.regions().count());
        let raised = snapshot.levels.iter().filter(|&&l| l > 0).count();
        assert_eq!(raised, terrain.elevated_tiles().len());
        for region in &snapshot.regions {
            assert!(region.tiles.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(region.parent.is_none(), region.level == 1);
        }
    }

    #[test]
    fn test_write_and_read_json() {
        let graph = fibonacci_sphere(150, 1.0).unwrap();
        let config = ElevationConfig { seed: 99, ..Default::default() };
        let terrain = ElevationTerrain::generate(config, graph, &[], &[]).unwrap();
        let snapshot = ElevationSnapshot::from_terrain(&terrain);

        let path = std::env::temp_dir().join(format!("plateau_snapshot_{}.json", std::process::id()));
        snapshot.write_json(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"seed\": 99"));

        let loaded = ElevationSnapshot::read_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let err = ElevationSnapshot::read_json(Path::new("/nonexistent/plateau.json")).unwrap_err();
        assert!(matches!(err, crate::error::TerrainError::Io(_)));
    }
}
