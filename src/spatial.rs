//! Angular bucket grid over tile centers.
//!
//! Each tile center is bucketed by polar angle (rows, measured from +Y) and
//! azimuth (columns, wrapping). Nearest-tile lookups scan the 3x3 buckets
//! around the query direction, widen the ring if that finds nothing, then
//! scan every bucket the spherical cap through the best candidate can reach.
//! For centers on a common sphere the answer matches a brute-force search.
//!
//! Tile centers never move, so bucket contents are built once. Each bucket
//! also caches the highest elevation among its tiles; that cache is the only
//! part refreshed when elevation changes.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::elevation::ElevationLevel;
use crate::tilemap::Tilemap;

/// Query positions closer than this to the origin have no direction.
const DEGENERATE_LENGTH_SQ: f32 = 1e-12;

/// Slack added to the cap radius so rounding cannot drop a bucket.
const CAP_MARGIN: f32 = 1e-3;

#[derive(Clone, Debug)]
pub struct SpatialGrid {
    buckets: Tilemap<Vec<usize>>,
    bucket_max: Tilemap<ElevationLevel>,
    centers: Vec<Vec3>,
    indexed: usize,
}

impl SpatialGrid {
    /// Bucket every tile center into a `rows` x `cols` grid.
    ///
    /// Centers at the origin cannot be bucketed and are skipped.
    pub fn build(centers: &[Vec3], rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let mut grid = Self {
            buckets: Tilemap::new(cols, rows),
            bucket_max: Tilemap::new_with(cols, rows, ElevationLevel::GROUND),
            centers: centers.to_vec(),
            indexed: 0,
        };

        for (tile, &center) in centers.iter().enumerate() {
            if center.length_squared() <= DEGENERATE_LENGTH_SQ {
                continue;
            }
            let (x, y) = grid.cell_of(center.normalize());
            grid.buckets.get_mut(x, y).push(tile);
            grid.indexed += 1;
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.buckets.height
    }

    pub fn cols(&self) -> usize {
        self.buckets.width
    }

    /// Number of tiles held in buckets.
    pub fn len(&self) -> usize {
        self.indexed
    }

    pub fn is_empty(&self) -> bool {
        self.indexed == 0
    }

    /// Recompute the per-bucket elevation maxima.
    pub fn refresh_elevation(&mut self, levels: &[ElevationLevel]) {
        for (x, y, tiles) in self.buckets.iter() {
            let max = tiles
                .iter()
                .filter_map(|&t| levels.get(t).copied())
                .max()
                .unwrap_or(ElevationLevel::GROUND);
            self.bucket_max.set(x, y, max);
        }
    }

    /// (column, row) of a unit direction.
    fn cell_of(&self, dir: Vec3) -> (usize, usize) {
        let (theta, phi) = spherical(dir);
        let col = self.unwrapped_col(phi).rem_euclid(self.cols() as i64) as usize;
        (col, self.row_of(theta))
    }

    fn row_of(&self, theta: f32) -> usize {
        let rows = self.rows();
        ((theta / PI * rows as f32) as usize).min(rows - 1)
    }

    /// Column of an azimuth before wrapping; `phi` may lie outside [0, TAU).
    fn unwrapped_col(&self, phi: f32) -> i64 {
        (phi / TAU * self.cols() as f32).floor() as i64
    }

    /// Tile whose center is nearest (Euclidean) to `pos`.
    ///
    /// Returns `None` for an empty grid or a position at the origin.
    pub fn nearest(&self, pos: Vec3) -> Option<usize> {
        if self.is_empty() || pos.length_squared() <= DEGENERATE_LENGTH_SQ {
            return None;
        }
        let dir = pos.normalize();
        let (x, y) = self.cell_of(dir);

        let mut best = None;
        let max_radius = self.rows().max(self.cols());
        let mut radius = 1;
        loop {
            best = self.scan(self.buckets.window(x, y, radius), pos, best);
            if best.is_some() || radius >= max_radius {
                break;
            }
            radius += 1;
        }

        let (tile, _) = best?;
        let alpha = angle_between(dir, self.centers[tile].normalize()) + CAP_MARGIN;
        best = self.scan(self.cap_cells(dir, alpha), pos, best);
        best.map(|(tile, _)| tile)
    }

    /// Highest elevation among tiles in the 3x3 buckets around `pos`.
    pub fn max_elevation_near(&self, pos: Vec3) -> ElevationLevel {
        if self.is_empty() || pos.length_squared() <= DEGENERATE_LENGTH_SQ {
            return ElevationLevel::GROUND;
        }
        let (x, y) = self.cell_of(pos.normalize());
        self.buckets
            .window(x, y, 1)
            .into_iter()
            .map(|(cx, cy)| *self.bucket_max.get(cx, cy))
            .max()
            .unwrap_or(ElevationLevel::GROUND)
    }

    /// Tiles in the 3x3 buckets around `pos`.
    pub fn tiles_near(&self, pos: Vec3) -> Vec<usize> {
        if self.is_empty() || pos.length_squared() <= DEGENERATE_LENGTH_SQ {
            return Vec::new();
        }
        let (x, y) = self.cell_of(pos.normalize());
        self.buckets
            .window(x, y, 1)
            .into_iter()
            .flat_map(|(cx, cy)| self.buckets.get(cx, cy).iter().copied())
            .collect()
    }

    /// Best (tile, squared distance) over the given cells, ties to the lower index.
    fn scan(
        &self,
        cells: Vec<(usize, usize)>,
        pos: Vec3,
        mut best: Option<(usize, f32)>,
    ) -> Option<(usize, f32)> {
        for (x, y) in cells {
            for &tile in self.buckets.get(x, y) {
                let d = (self.centers[tile] - pos).length_squared();
                let better = match best {
                    None => true,
                    Some((b, bd)) => d < bd || (d == bd && tile < b),
                };
                if better {
                    best = Some((tile, d));
                }
            }
        }
        best
    }

    /// Every cell a spherical cap of angular radius `alpha` around `dir` can touch.
    fn cap_cells(&self, dir: Vec3, alpha: f32) -> Vec<(usize, usize)> {
        let (theta, phi) = spherical(dir);
        let lo = theta - alpha;
        let hi = theta + alpha;
        let row_lo = if lo <= 0.0 { 0 } else { self.row_of(lo) };
        let row_hi = if hi >= PI { self.rows() - 1 } else { self.row_of(hi) };

        // A cap containing a pole spans every azimuth.
        let cols = if lo <= 0.0 || hi >= PI || alpha.sin() >= theta.sin() {
            (0..self.cols()).collect()
        } else {
            let dphi = (alpha.sin() / theta.sin()).asin();
            self.buckets
                .wrapped_columns(self.unwrapped_col(phi - dphi), self.unwrapped_col(phi + dphi))
        };

        (row_lo..=row_hi)
            .flat_map(|y| cols.iter().map(move |&x| (x, y)))
            .collect()
    }
}

/// Polar angle from +Y in [0, PI] and azimuth in [0, TAU).
fn spherical(dir: Vec3) -> (f32, f32) {
    let theta = dir.y.clamp(-1.0, 1.0).acos();
    let mut phi = dir.z.atan2(dir.x);
    if phi < 0.0 {
        phi += TAU;
    }
    (theta, phi)
}

fn angle_between(a: Vec3, b: Vec3) -> f32 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}
