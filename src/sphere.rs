//! Deterministic toy tessellation for tests, demos and the CLI.
//!
//! Tiles sit on a Fibonacci spiral; each tile is linked to its nearest
//! neighbors (symmetrized). Boundaries are approximated from the midpoints
//! toward each neighbor, ordered around the tile center.

use std::collections::BTreeSet;
use std::f32::consts::PI;

use glam::Vec3;

use crate::error::Result;
use crate::tiles::{Tile, TileGraph};

/// Neighbors linked per tile before symmetrizing
const NEAREST_NEIGHBORS: usize = 6;

/// Evenly spread points on a sphere of the given radius.
pub fn fibonacci_points(n: usize, radius: f32) -> Vec<Vec3> {
    let golden_angle = PI * (3.0 - 5.0f32.sqrt());

    (0..n)
        .map(|i| {
            let y = 1.0 - (2.0 * i as f32 + 1.0) / n as f32;
            let r = (1.0 - y * y).sqrt();
            let theta = golden_angle * i as f32;
            Vec3::new(r * theta.cos(), y, r * theta.sin()) * radius
        })
        .collect()
}

/// Build a tile graph of `n` tiles on a sphere of the given radius.
pub fn fibonacci_sphere(n: usize, radius: f32) -> Result<TileGraph> {
    let centers = fibonacci_points(n, radius);

    let mut links: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
    for (i, &center) in centers.iter().enumerate() {
        let mut dists: Vec<(usize, f32)> = centers
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(j, &p)| (j, (center - p).length_squared()))
            .collect();
        dists.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        for (j, _) in dists.into_iter().take(NEAREST_NEIGHBORS) {
            links[i].insert(j);
            links[j].insert(i);
        }
    }

    let adjacency: Vec<Vec<usize>> = links.into_iter().map(|set| set.into_iter().collect()).collect();

    let tiles = centers
        .iter()
        .enumerate()
        .map(|(i, &center)| {
            let mut corners: Vec<Vec3> = adjacency[i]
                .iter()
                .map(|&j| ((center + centers[j]) * 0.5).normalize_or_zero() * radius)
                .collect();
            sort_polygon_corners(&mut corners, center);
            Tile::new(i, corners, center)
        })
        .collect();

    TileGraph::new(tiles, adjacency)
}

/// Order boundary corners by angle around the tile center.
fn sort_polygon_corners(corners: &mut [Vec3], center: Vec3) {
    if corners.len() < 3 {
        return;
    }

    let normal = center.normalize_or_zero();
    let up = if normal.y.abs() < 0.99 { Vec3::Y } else { Vec3::X };
    let t1 = normal.cross(up).normalize();
    let t2 = normal.cross(t1).normalize();

    corners.sort_by(|a, b| {
        let da = *a - center;
        let db = *b - center;
        let angle_a = da.dot(t2).atan2(da.dot(t1));
        let angle_b = db.dot(t2).atan2(db.dot(t1));
        angle_a.total_cmp(&angle_b)
    });
}
