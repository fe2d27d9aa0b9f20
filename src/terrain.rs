//! Generated plateau terrain and its runtime query/override API.
//!
//! [`ElevationTerrain::generate`] runs the full pipeline once:
//! hierarchy build, ground connectivity repair, then the spatial index.
//! Afterwards elevation only changes through the reversible
//! [`ElevationTerrain::clear_elevation`] / [`ElevationTerrain::restore_elevation`]
//! pair.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::config::ElevationConfig;
use crate::elevation::connectivity::ground_tiles;
use crate::elevation::{
    build_hierarchy, validate_and_repair, ConnectivityOutcome, ElevationAssignment, ElevationLevel,
    ElevationRegion, HierarchyStats, RegionId,
};
use crate::error::Result;
use crate::seeds::GenerationSeeds;
use crate::spatial::SpatialGrid;
use crate::tiles::TileGraph;

/// Non-fatal problems found while generating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationWarning {
    /// The attempt budget ran out before the coverage target was reached
    UnderCoverage { achieved: usize, target: usize, attempts: usize },
    /// Ground tiles cut off with no removable plateau bordering them
    UnrepairableDisconnection { isolated: usize },
}

impl std::fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnderCoverage { achieved, target, attempts } => write!(
                f,
                "coverage {} / {} tiles after {} attempts",
                achieved, target, attempts
            ),
            Self::UnrepairableDisconnection { isolated } => {
                write!(f, "{} ground tiles unreachable", isolated)
            }
        }
    }
}

/// Summary of one `generate()` run.
#[derive(Clone, Debug)]
pub struct GenerationReport {
    pub seeds: GenerationSeeds,
    pub eligible_tiles: usize,
    pub hierarchy: HierarchyStats,
    /// Elevated tiles after connectivity repair
    pub elevated_tiles: usize,
    /// Indexed by level; entry 0 counts ground tiles
    pub tiles_per_level: [usize; 4],
    pub regions_per_level: [usize; 4],
    pub connectivity: ConnectivityOutcome,
    pub warnings: Vec<GenerationWarning>,
}

impl std::fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Plateau generation ===")?;
        writeln!(f, "Seeds:          {}", self.seeds)?;
        writeln!(f, "Eligible tiles: {}", self.eligible_tiles)?;
        writeln!(
            f,
            "Raised tiles:   {} (target {}, {} attempts, {} spacing rejections)",
            self.elevated_tiles,
            self.hierarchy.target_tiles,
            self.hierarchy.attempts,
            self.hierarchy.spacing_rejections,
        )?;
        for level in 1..4 {
            writeln!(
                f,
                "Level {}:        {} regions, {} tiles",
                level, self.regions_per_level[level], self.tiles_per_level[level]
            )?;
        }
        match &self.connectivity {
            ConnectivityOutcome::Connected => writeln!(f, "Ground:         connected")?,
            ConnectivityOutcome::Repaired { removed } => {
                writeln!(f, "Ground:         connected after removing {} plateaus", removed.len())?
            }
            ConnectivityOutcome::Unrepairable { isolated, .. } => {
                writeln!(f, "Ground:         {} tiles unreachable", isolated)?
            }
        }
        for warning in &self.warnings {
            writeln!(f, "Warning:        {}", warning)?;
        }
        Ok(())
    }
}

/// Suppressed elevation waiting to be restored.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ElevationBackup {
    level: ElevationLevel,
    regions: Vec<RegionId>,
}

/// A tile graph with generated plateaus and a spatial index over it.
pub struct ElevationTerrain {
    config: ElevationConfig,
    graph: TileGraph,
    eligible: Vec<bool>,
    assignment: ElevationAssignment,
    grid: SpatialGrid,
    backups: BTreeMap<usize, ElevationBackup>,
    report: GenerationReport,
}

impl ElevationTerrain {
    /// Generate plateaus over `graph`, never raising portal or pole tiles.
    ///
    /// Fails only on an invalid config; coverage and connectivity problems
    /// are recorded as warnings in [`GenerationReport`].
    pub fn generate(config: ElevationConfig, graph: TileGraph, portals: &[usize], poles: &[usize]) -> Result<Self> {
        config.validate()?;

        let mut eligible = vec![true; graph.len()];
        for &tile in portals.iter().chain(poles) {
            if let Some(slot) = eligible.get_mut(tile) {
                *slot = false;
            }
        }
        let eligible_tiles = eligible.iter().filter(|&&e| e).count();
        let seeds = GenerationSeeds::from_master(config.seed);
        info!(
            "Generating plateaus over {} tiles ({} eligible), seed {}",
            graph.len(),
            eligible_tiles,
            config.seed
        );

        let mut assignment = ElevationAssignment::new(graph.len());
        let hierarchy = build_hierarchy(&graph, &eligible, &config, &seeds, &mut assignment);

        let mut warnings = Vec::new();
        let achieved = assignment.elevated().len();
        if achieved < hierarchy.target_tiles {
            warn!(
                "Plateau coverage short of target: {} / {} tiles after {} attempts",
                achieved, hierarchy.target_tiles, hierarchy.attempts
            );
            warnings.push(GenerationWarning::UnderCoverage {
                achieved,
                target: hierarchy.target_tiles,
                attempts: hierarchy.attempts,
            });
        }

        let connectivity = validate_and_repair(&graph, &eligible, &mut assignment);
        match &connectivity {
            ConnectivityOutcome::Connected => {}
            ConnectivityOutcome::Repaired { removed } => {
                info!("Removed {} plateaus to reconnect ground", removed.len());
            }
            ConnectivityOutcome::Unrepairable { isolated, .. } => {
                warnings.push(GenerationWarning::UnrepairableDisconnection { isolated: *isolated });
            }
        }

        let centers: Vec<Vec3> = graph.tiles().iter().map(|t| t.center).collect();
        let mut grid = SpatialGrid::build(&centers, config.grid_rows, config.grid_cols);
        grid.refresh_elevation(assignment.levels());

        let mut tiles_per_level = [0usize; 4];
        for level in assignment.levels() {
            tiles_per_level[level.0 as usize] += 1;
        }
        let mut regions_per_level = [0usize; 4];
        for region in assignment.forest().iter() {
            regions_per_level[region.level.0 as usize] += 1;
        }

        let report = GenerationReport {
            seeds,
            eligible_tiles,
            hierarchy,
            elevated_tiles: assignment.elevated().len(),
            tiles_per_level,
            regions_per_level,
            connectivity,
            warnings,
        };

        Ok(Self {
            config,
            graph,
            eligible,
            assignment,
            grid,
            backups: BTreeMap::new(),
            report,
        })
    }

    pub fn config(&self) -> &ElevationConfig {
        &self.config
    }

    pub fn graph(&self) -> &TileGraph {
        &self.graph
    }

    pub fn report(&self) -> &GenerationReport {
        &self.report
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Whether a tile may carry plateaus (not a portal or pole).
    pub fn is_eligible(&self, tile: usize) -> bool {
        self.eligible.get(tile).copied().unwrap_or(false)
    }

    // =========================================================================
    // Elevation and region accessors
    // =========================================================================

    /// Elevation of a tile; ground for unknown indices.
    pub fn level_of(&self, tile: usize) -> ElevationLevel {
        self.assignment.level(tile)
    }

    pub fn is_elevated(&self, tile: usize) -> bool {
        self.assignment.is_elevated(tile)
    }

    /// Per-tile levels, indexed by tile.
    pub fn levels(&self) -> &[ElevationLevel] {
        self.assignment.levels()
    }

    pub fn elevated_tiles(&self) -> &BTreeSet<usize> {
        self.assignment.elevated()
    }

    /// Eligible tiles at elevation 0.
    pub fn ground_tiles(&self) -> BTreeSet<usize> {
        ground_tiles(&self.eligible, &self.assignment)
    }

    pub fn regions(&self) -> impl Iterator<Item = &ElevationRegion> {
        self.assignment.forest().iter()
    }

    pub fn region(&self, id: RegionId) -> Option<&ElevationRegion> {
        self.assignment.forest().get(id)
    }

    pub fn regions_at_level(&self, level: ElevationLevel) -> impl Iterator<Item = &ElevationRegion> {
        self.assignment.forest().at_level(level)
    }

    pub fn regions_of_tile(&self, tile: usize) -> &[RegionId] {
        self.assignment.forest().regions_of(tile)
    }

    pub fn children_of(&self, id: RegionId) -> &[RegionId] {
        self.assignment.forest().children_of(id)
    }

    // =========================================================================
    // Spatial queries
    // =========================================================================

    pub fn nearest_tile(&self, pos: Vec3) -> Option<usize> {
        self.grid.nearest(pos)
    }

    /// Elevation of the tile nearest to `pos`; ground when there is none.
    pub fn elevation_at(&self, pos: Vec3) -> ElevationLevel {
        self.nearest_tile(pos)
            .map(|t| self.level_of(t))
            .unwrap_or(ElevationLevel::GROUND)
    }

    pub fn max_elevation_near(&self, pos: Vec3) -> ElevationLevel {
        self.grid.max_elevation_near(pos)
    }

    /// Radial scale for geometry at `level`; ground maps to 1.0.
    pub fn extrusion_factor(&self, level: ElevationLevel) -> f32 {
        1.0 + level.0 as f32 * self.config.extrusion_per_level
    }

    /// Height of a level above the ground surface, in world units.
    pub fn level_height(&self, level: ElevationLevel) -> f32 {
        self.config.planet_radius * (self.extrusion_factor(level) - 1.0)
    }

    /// Height limit for effects at `pos`.
    ///
    /// When a higher plateau is nearby the cap is the height of the first
    /// level above the local one, not the tallest neighbor. `None` means no
    /// cap.
    pub fn cliff_cap_height(&self, pos: Vec3) -> Option<f32> {
        let local = self.elevation_at(pos);
        let highest = self.max_elevation_near(pos);
        (highest > local).then(|| self.level_height(local.next()))
    }

    // =========================================================================
    // Reversible overrides
    // =========================================================================

    /// Drop the given tiles to ground, remembering what they were.
    ///
    /// Ground tiles and unknown indices are ignored. Returns the tiles that
    /// changed.
    pub fn clear_elevation(&mut self, tiles: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
        let mut cleared = BTreeSet::new();
        for tile in tiles {
            let level = self.assignment.level(tile);
            if level.is_ground() {
                continue;
            }
            let regions = self.assignment.forest_mut().detach_tile(tile);
            self.assignment.set_level(tile, ElevationLevel::GROUND);
            self.backups.insert(tile, ElevationBackup { level, regions });
            cleared.insert(tile);
        }

        if !cleared.is_empty() {
            self.grid.refresh_elevation(self.assignment.levels());
            debug!("Cleared elevation on {} tiles", cleared.len());
        }
        cleared
    }

    /// Bring back elevation removed by [`Self::clear_elevation`].
    ///
    /// A tile rejoins the regions it left if they still exist; otherwise it
    /// joins the first region at its level found among its neighbors, or
    /// stays region-less. Tiles without a pending backup are ignored.
    pub fn restore_elevation(&mut self, tiles: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
        let mut restored = BTreeSet::new();
        for tile in tiles {
            let Some(backup) = self.backups.remove(&tile) else {
                continue;
            };
            self.assignment.set_level(tile, backup.level);

            let mut rejoined = false;
            for &id in &backup.regions {
                rejoined |= self.assignment.forest_mut().attach_tile(tile, id);
            }
            if !rejoined {
                if let Some(id) = self.neighbor_region_at(tile, backup.level) {
                    self.assignment.forest_mut().attach_tile(tile, id);
                }
            }
            restored.insert(tile);
        }

        if !restored.is_empty() {
            self.grid.refresh_elevation(self.assignment.levels());
            debug!("Restored elevation on {} tiles", restored.len());
        }
        restored
    }

    /// Whether a tile has suppressed elevation waiting to be restored.
    pub fn has_backup(&self, tile: usize) -> bool {
        self.backups.contains_key(&tile)
    }

    /// First region at `level` holding one of the tile's neighbors.
    fn neighbor_region_at(&self, tile: usize, level: ElevationLevel) -> Option<RegionId> {
        let forest = self.assignment.forest();
        self.graph.neighbors(tile).iter().find_map(|&n| {
            forest
                .regions_of(n)
                .iter()
                .copied()
                .find(|&id| forest.get(id).is_some_and(|r| r.level == level))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizeRange;
    use crate::elevation::connectivity::isolated_ground;
    use crate::sphere::fibonacci_sphere;

    /// 100-tile sphere, 20% coverage, plateaus small and well apart.
    fn toy_config(seed: u64) -> ElevationConfig {
        ElevationConfig {
            seed,
            coverage_fraction: 0.2,
            primary_size: SizeRange::new(4, 6),
            secondary_size: SizeRange::new(2, 3),
            tertiary_size: SizeRange::new(1, 2),
            secondary_parent_threshold: 5,
            tertiary_parent_threshold: 2,
            min_seed_spacing: 1.2,
            max_attempts: 500,
            ..Default::default()
        }
    }

    fn toy_terrain(seed: u64) -> ElevationTerrain {
        let graph = fibonacci_sphere(100, 1.0).unwrap();
        ElevationTerrain::generate(toy_config(seed), graph, &[], &[]).unwrap()
    }

    fn nested_terrain(seed: u64) -> ElevationTerrain {
        let config = ElevationConfig {
            seed,
            coverage_fraction: 0.3,
            primary_size: SizeRange::new(25, 50),
            secondary_size: SizeRange::new(8, 15),
            tertiary_size: SizeRange::new(3, 6),
            secondary_parent_threshold: 25,
            tertiary_parent_threshold: 8,
            min_seed_spacing: 0.3,
            ..Default::default()
        };
        ElevationTerrain::generate(config, fibonacci_sphere(800, 1.0).unwrap(), &[], &[]).unwrap()
    }

    fn all_regions(terrain: &ElevationTerrain) -> Vec<ElevationRegion> {
        terrain.regions().cloned().collect()
    }

    #[test]
    fn test_toy_sphere_seed_73() {
        let terrain = toy_terrain(73);

        let primaries: Vec<_> = terrain.regions_at_level(ElevationLevel::PRIMARY).collect();
        assert!(!primaries.is_empty());
        let raised: usize = primaries.iter().map(|r| r.len()).sum();
        assert!((16..=24).contains(&raised), "raised {raised}");
        assert_eq!(raised, terrain.elevated_tiles().len());

        assert!(isolated_ground(terrain.graph(), &terrain.eligible, &terrain.assignment).is_empty());
        assert!(terrain.report().connectivity.is_connected());

        let again = toy_terrain(73);
        assert_eq!(terrain.levels(), again.levels());
        assert_eq!(all_regions(&terrain), all_regions(&again));
    }

    #[test]
    fn test_deterministic_with_nesting() {
        let a = nested_terrain(5);
        let b = nested_terrain(5);
        assert!(a.report().regions_per_level[2] > 0);
        assert_eq!(a.levels(), b.levels());
        assert_eq!(all_regions(&a), all_regions(&b));

        let c = nested_terrain(6);
        assert_ne!(a.levels(), c.levels());
    }

    #[test]
    fn test_nesting_holds_after_generation() {
        let terrain = nested_terrain(9);
        for region in terrain.regions().filter(|r| r.level > ElevationLevel::PRIMARY) {
            let parent_level = region.level.parent().unwrap();
            for &tile in &region.tiles {
                assert!(terrain
                    .regions_of_tile(tile)
                    .iter()
                    .any(|&id| terrain.region(id).unwrap().level == parent_level));
            }
            assert!(terrain.children_of(region.parent.unwrap()).contains(&region.id));
        }
        for tile in 0..terrain.graph().len() {
            let deepest = terrain
                .regions_of_tile(tile)
                .iter()
                .map(|&id| terrain.region(id).unwrap().level)
                .max()
                .unwrap_or(ElevationLevel::GROUND);
            assert_eq!(terrain.level_of(tile), deepest);
        }
    }

    #[test]
    fn test_portals_and_poles_stay_ground() {
        let graph = fibonacci_sphere(300, 1.0).unwrap();
        let portals: Vec<usize> = (0..300).step_by(9).collect();
        let poles = [0, 299];
        let config = ElevationConfig { coverage_fraction: 0.5, primary_size: SizeRange::new(5, 20), ..Default::default() };
        let terrain = ElevationTerrain::generate(config, graph, &portals, &poles).unwrap();

        assert!(!terrain.elevated_tiles().is_empty());
        for &t in portals.iter().chain(&poles) {
            assert!(!terrain.is_elevated(t));
            assert!(!terrain.is_eligible(t));
            assert!(!terrain.ground_tiles().contains(&t));
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let graph = fibonacci_sphere(20, 1.0).unwrap();
        let config = ElevationConfig { coverage_fraction: 2.0, ..Default::default() };
        assert!(ElevationTerrain::generate(config, graph, &[], &[]).is_err());
    }

    #[test]
    fn test_under_coverage_warning() {
        let graph = fibonacci_sphere(100, 1.0).unwrap();
        let config = ElevationConfig {
            coverage_fraction: 1.0,
            primary_size: SizeRange::new(3, 5),
            min_seed_spacing: 4.0,
            max_attempts: 50,
            ..Default::default()
        };
        let terrain = ElevationTerrain::generate(config, graph, &[], &[]).unwrap();
        assert!(matches!(
            terrain.report().warnings.as_slice(),
            [GenerationWarning::UnderCoverage { attempts: 50, .. }, ..]
        ));
    }

    #[test]
    fn test_pocket_walled_by_portals_is_reported() {
        let graph = fibonacci_sphere(100, 1.0).unwrap();
        let portals = graph.neighbors(50).to_vec();
        let terrain = ElevationTerrain::generate(toy_config(3), graph, &portals, &[]).unwrap();

        assert!(!terrain.is_elevated(50));
        assert!(!terrain.report().connectivity.is_connected());
        assert!(terrain
            .report()
            .warnings
            .iter()
            .any(|w| matches!(w, GenerationWarning::UnrepairableDisconnection { .. })));
    }

    #[test]
    fn test_elevation_at_matches_nearest_tile() {
        let terrain = nested_terrain(21);
        for tile in terrain.graph().tiles() {
            let pos = tile.center * 1.01;
            assert_eq!(terrain.nearest_tile(pos), Some(tile.index));
            assert_eq!(terrain.elevation_at(pos), terrain.level_of(tile.index));
        }
        assert_eq!(terrain.elevation_at(Vec3::ZERO), ElevationLevel::GROUND);
        assert_eq!(terrain.nearest_tile(Vec3::ZERO), None);
    }

    #[test]
    fn test_extrusion_and_cliff_cap() {
        let terrain = nested_terrain(4);
        assert_eq!(terrain.extrusion_factor(ElevationLevel::GROUND), 1.0);
        assert!(terrain.extrusion_factor(ElevationLevel::TERTIARY) > terrain.extrusion_factor(ElevationLevel::PRIMARY));

        let step = terrain.level_height(ElevationLevel::PRIMARY);
        let (mut capped, mut uncapped) = (0, 0);
        for tile in terrain.graph().tiles() {
            let local = terrain.level_of(tile.index);
            let near = terrain.max_elevation_near(tile.center);
            match terrain.cliff_cap_height(tile.center) {
                Some(height) => {
                    assert!(near > local);
                    assert!((height - step * (local.0 + 1) as f32).abs() < 1e-5);
                    capped += 1;
                }
                None => {
                    assert!(near <= local);
                    uncapped += 1;
                }
            }
        }
        assert!(capped > 0 && uncapped > 0);
        assert_eq!(terrain.cliff_cap_height(Vec3::ZERO), None);
    }

    #[test]
    fn test_clear_restore_round_trip() {
        let mut terrain = nested_terrain(8);
        let levels = terrain.levels().to_vec();
        let regions = all_regions(&terrain);
        let elevated = terrain.elevated_tiles().clone();
        let everything = 0..terrain.graph().len();

        let cleared = terrain.clear_elevation(everything.clone());
        assert_eq!(cleared, elevated);
        assert!(terrain.elevated_tiles().is_empty());
        assert!(terrain.regions().all(|r| r.is_empty()));
        assert_eq!(terrain.max_elevation_near(terrain.graph().center(*elevated.first().unwrap())), ElevationLevel::GROUND);

        // Clearing twice changes nothing.
        assert!(terrain.clear_elevation(everything.clone()).is_empty());

        let restored = terrain.restore_elevation(everything);
        assert_eq!(restored, elevated);
        assert_eq!(terrain.levels(), levels.as_slice());
        assert_eq!(all_regions(&terrain), regions);
        assert!(!terrain.has_backup(*elevated.first().unwrap()));
    }

    #[test]
    fn test_clear_restore_level_two_tile() {
        let mut terrain = nested_terrain(10);
        let tile = (0..terrain.graph().len())
            .find(|&t| terrain.level_of(t) == ElevationLevel::SECONDARY)
            .unwrap();

        assert_eq!(terrain.clear_elevation([tile]), BTreeSet::from([tile]));
        assert_eq!(terrain.level_of(tile), ElevationLevel::GROUND);
        assert!(terrain.regions_of_tile(tile).is_empty());

        assert_eq!(terrain.restore_elevation([tile]), BTreeSet::from([tile]));
        assert_eq!(terrain.level_of(tile), ElevationLevel::SECONDARY);
        assert!(terrain
            .regions_of_tile(tile)
            .iter()
            .any(|&id| terrain.region(id).unwrap().level == ElevationLevel::SECONDARY));
    }

    #[test]
    fn test_restore_joins_neighbor_region_when_own_is_gone() {
        let mut terrain = nested_terrain(12);
        let primary = terrain.regions_at_level(ElevationLevel::PRIMARY).next().unwrap().id;
        let tile = *terrain
            .region(primary)
            .unwrap()
            .tiles
            .iter()
            .find(|&&t| terrain.level_of(t) == ElevationLevel::PRIMARY)
            .unwrap();
        terrain.clear_elevation([tile]);

        // Replace the tile's own plateau with a one-tile plateau next to it.
        terrain.assignment.remove_region_tree(primary);
        let neighbor = terrain.graph().neighbors(tile)[0];
        let replacement = terrain
            .assignment
            .commit(ElevationLevel::PRIMARY, BTreeSet::from([neighbor]), None);

        terrain.restore_elevation([tile]);
        assert_eq!(terrain.level_of(tile), ElevationLevel::PRIMARY);
        let joined = terrain.regions_of_tile(tile);
        assert_eq!(joined.len(), 1);
        assert!(terrain.regions_of_tile(neighbor).contains(&joined[0]));
        assert!(joined[0] <= replacement);
    }

    #[test]
    fn test_override_ignores_unknown_and_ground_tiles() {
        let mut terrain = toy_terrain(73);
        let ground = *terrain.ground_tiles().iter().next().unwrap();
        let before = terrain.levels().to_vec();

        assert!(terrain.clear_elevation([ground, 10_000]).is_empty());
        assert!(terrain.restore_elevation([ground, 10_000]).is_empty());
        assert_eq!(terrain.levels(), before.as_slice());
    }
}
