//! Three-pass plateau hierarchy.
//!
//! 1. Primary plateaus are grown over all eligible tiles until the coverage
//!    target is met or the attempt budget runs out. Primaries never overlap
//!    and their seeds keep a minimum angular spacing.
//! 2. Large primaries receive one or two secondary plateaus grown strictly
//!    inside their own tiles.
//! 3. Large secondaries receive one tertiary plateau the same way.
//!
//! Growing each nested region inside its parent's tile set makes the nesting
//! invariant hold by construction.

use std::collections::BTreeSet;

use glam::Vec3;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{ElevationConfig, SizeRange};
use crate::seeds::{parent_rng, GenerationSeeds};
use crate::tiles::TileGraph;

use super::assignment::ElevationAssignment;
use super::grower::{grow, NoTiles};
use super::level::ElevationLevel;
use super::regions::RegionId;

/// Commit/discard counts for one phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseStats {
    pub committed: usize,
    /// Grown regions below the minimum size
    pub discarded: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HierarchyStats {
    /// Elevated tiles the primary phase aimed for
    pub target_tiles: usize,
    pub attempts: usize,
    /// Primary picks rejected for crowding an earlier seed
    pub spacing_rejections: usize,
    pub primary: PhaseStats,
    pub secondary: PhaseStats,
    pub tertiary: PhaseStats,
}

/// Run all three phases into `assignment`.
pub fn build_hierarchy(
    graph: &TileGraph,
    eligible: &[bool],
    config: &ElevationConfig,
    seeds: &GenerationSeeds,
    assignment: &mut ElevationAssignment,
) -> HierarchyStats {
    let mut stats = build_primaries(graph, eligible, config, seeds, assignment);
    info!(
        "Primary phase: {} regions, {} / {} tiles raised in {} attempts",
        stats.primary.committed,
        assignment.elevated().len(),
        stats.target_tiles,
        stats.attempts,
    );

    stats.secondary = build_nested(
        graph,
        assignment,
        ElevationLevel::SECONDARY,
        config.secondary_parent_threshold,
        config.secondary_size,
        2,
        seeds.secondary,
    );
    info!("Secondary phase: {} regions", stats.secondary.committed);

    stats.tertiary = build_nested(
        graph,
        assignment,
        ElevationLevel::TERTIARY,
        config.tertiary_parent_threshold,
        config.tertiary_size,
        1,
        seeds.tertiary,
    );
    info!("Tertiary phase: {} regions", stats.tertiary.committed);

    stats
}

/// Great-circle angle between two directions.
fn angle_between(a: Vec3, b: Vec3) -> f32 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

fn build_primaries(
    graph: &TileGraph,
    eligible: &[bool],
    config: &ElevationConfig,
    seeds: &GenerationSeeds,
    assignment: &mut ElevationAssignment,
) -> HierarchyStats {
    let eligible_tiles: Vec<usize> = (0..graph.len()).filter(|&t| eligible[t]).collect();
    let target = (eligible_tiles.len() as f64 * config.coverage_fraction as f64).floor() as usize;
    let size = config.primary_size;

    let mut stats = HierarchyStats { target_tiles: target, ..Default::default() };
    let mut rng = seeds.primary_rng();
    let mut seed_dirs: Vec<Vec3> = Vec::new();

    while assignment.elevated().len() < target && stats.attempts < config.max_attempts {
        stats.attempts += 1;

        let candidates: Vec<usize> = eligible_tiles
            .iter()
            .copied()
            .filter(|&t| !assignment.is_elevated(t))
            .collect();
        if candidates.is_empty() {
            break;
        }
        let seed = candidates[rng.gen_range(0..candidates.len())];

        let dir = graph.center(seed).normalize_or_zero();
        if seed_dirs.iter().any(|&d| angle_between(d, dir) < config.min_seed_spacing) {
            stats.spacing_rejections += 1;
            continue;
        }

        // Clamp so the last region cannot overshoot the target by a full region.
        let remaining = target - assignment.elevated().len();
        let target_size = rng.gen_range(size.min..=size.max).min(remaining.max(size.min));

        let region = grow(graph, seed, target_size, eligible, assignment.elevated());
        if region.len() < size.min {
            debug!("Discarded primary at tile {} ({} < {} tiles)", seed, region.len(), size.min);
            stats.primary.discarded += 1;
            continue;
        }

        let len = region.len();
        let id = assignment.commit(ElevationLevel::PRIMARY, region, None);
        debug!("Committed primary {} at tile {} with {} tiles", id, seed, len);
        seed_dirs.push(dir);
        stats.primary.committed += 1;
    }

    stats
}

/// Grow regions at `level` inside every large enough region one level down.
///
/// Growth runs in parallel per parent; each parent draws from its own stream
/// and results are committed in parent id order.
fn build_nested(
    graph: &TileGraph,
    assignment: &mut ElevationAssignment,
    level: ElevationLevel,
    parent_threshold: usize,
    size: SizeRange,
    max_per_parent: usize,
    phase_seed: u64,
) -> PhaseStats {
    let parent_level = level.parent().unwrap_or(ElevationLevel::GROUND);
    let parents: Vec<(RegionId, BTreeSet<usize>)> = assignment
        .forest()
        .at_level(parent_level)
        .filter(|r| !r.is_empty() && r.len() >= parent_threshold)
        .map(|r| (r.id, r.tiles.clone()))
        .collect();

    let grown: Vec<(RegionId, Vec<BTreeSet<usize>>)> = parents
        .par_iter()
        .map(|(parent, tiles)| {
            let mut rng = parent_rng(phase_seed, parent.0);
            let members: Vec<usize> = tiles.iter().copied().collect();
            let count = rng.gen_range(1..=max_per_parent);

            let regions = (0..count)
                .map(|_| {
                    let seed = members[rng.gen_range(0..members.len())];
                    let target_size = rng.gen_range(size.min..=size.max);
                    grow(graph, seed, target_size, tiles, &NoTiles)
                })
                .collect();
            (*parent, regions)
        })
        .collect();

    let mut stats = PhaseStats::default();
    for (parent, regions) in grown {
        for region in regions {
            if region.len() < size.min {
                stats.discarded += 1;
                continue;
            }
            let len = region.len();
            let id = assignment.commit(level, region, Some(parent));
            debug!("Committed {} region {} in {} with {} tiles", level, id, parent, len);
            stats.committed += 1;
        }
    }
    stats
}
