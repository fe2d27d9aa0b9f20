//! Elevation generation parameters and configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

/// Inclusive tile-count range for a region size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: usize,
    pub max: usize,
}

impl SizeRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

/// Plateau style preset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TerrainStyle {
    /// Few, widely spaced plateaus
    Gentle,
    /// Balanced coverage
    #[default]
    Standard,
    /// Dense plateaus with frequent nesting
    Rugged,
}

impl TerrainStyle {
    /// Parse from string (for CLI)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gentle" | "flat" => Some(Self::Gentle),
            "standard" | "default" => Some(Self::Standard),
            "rugged" | "rough" => Some(Self::Rugged),
            _ => None,
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Gentle, Self::Standard, Self::Rugged]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Gentle => "Gentle (~15% raised, wide spacing)",
            Self::Standard => "Standard (~25% raised)",
            Self::Rugged => "Rugged (~35% raised, deep nesting)",
        }
    }

    /// Configuration tuned for this style.
    pub fn config(&self, seed: u64) -> ElevationConfig {
        let base = ElevationConfig { seed, ..ElevationConfig::default() };
        match self {
            Self::Gentle => ElevationConfig {
                coverage_fraction: 0.15,
                min_seed_spacing: 0.5,
                secondary_parent_threshold: 30,
                tertiary_parent_threshold: 14,
                ..base
            },
            Self::Standard => base,
            Self::Rugged => ElevationConfig {
                coverage_fraction: 0.35,
                min_seed_spacing: 0.25,
                secondary_parent_threshold: 15,
                tertiary_parent_threshold: 7,
                ..base
            },
        }
    }
}

impl std::fmt::Display for TerrainStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gentle => write!(f, "gentle"),
            Self::Standard => write!(f, "standard"),
            Self::Rugged => write!(f, "rugged"),
        }
    }
}

/// Tunable plateau generation parameters.
///
/// Missing fields fall back to [`Default`] when deserialized, so a JSON file
/// only needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationConfig {
    /// Master seed; every phase seed is derived from it
    pub seed: u64,

    // =========================================================================
    // Coverage and region sizes
    // =========================================================================

    /// Fraction of eligible tiles to raise in the primary phase (0.0-1.0]
    pub coverage_fraction: f32,

    pub primary_size: SizeRange,
    pub secondary_size: SizeRange,
    pub tertiary_size: SizeRange,

    /// Minimum primary size before it is subdivided into secondaries
    pub secondary_parent_threshold: usize,

    /// Minimum secondary size before it receives a tertiary
    pub tertiary_parent_threshold: usize,

    /// Minimum great-circle angle between primary seeds (radians)
    pub min_seed_spacing: f32,

    /// Random picks allowed in the primary phase
    pub max_attempts: usize,

    // =========================================================================
    // Spatial index and geometry
    // =========================================================================

    /// Polar-angle buckets
    pub grid_rows: usize,

    /// Azimuthal buckets (wraps)
    pub grid_cols: usize,

    /// Outward extrusion per elevation level, as a fraction of the radius
    pub extrusion_per_level: f32,

    pub planet_radius: f32,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            coverage_fraction: 0.25,
            primary_size: SizeRange::new(12, 40),
            secondary_size: SizeRange::new(5, 15),
            tertiary_size: SizeRange::new(3, 8),
            secondary_parent_threshold: 20,
            tertiary_parent_threshold: 10,
            min_seed_spacing: 0.35,
            max_attempts: 500,
            grid_rows: 32,
            grid_cols: 64,
            extrusion_per_level: 0.02,
            planet_radius: 1.0,
        }
    }
}

impl ElevationConfig {
    /// Load a config from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.coverage_fraction > 0.0 && self.coverage_fraction <= 1.0) {
            return Err(invalid("coverage_fraction", format!("{} is outside (0, 1]", self.coverage_fraction)));
        }
        for (field, range) in [
            ("primary_size", self.primary_size),
            ("secondary_size", self.secondary_size),
            ("tertiary_size", self.tertiary_size),
        ] {
            if range.min == 0 || range.min > range.max {
                return Err(invalid(field, format!("range {}..={} is empty", range.min, range.max)));
            }
        }
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Err(invalid("grid_rows", format!("grid {}x{} has no buckets", self.grid_rows, self.grid_cols)));
        }
        if !(self.min_seed_spacing >= 0.0) {
            return Err(invalid("min_seed_spacing", format!("{} is negative", self.min_seed_spacing)));
        }
        if !(self.extrusion_per_level >= 0.0) {
            return Err(invalid("extrusion_per_level", format!("{} is negative", self.extrusion_per_level)));
        }
        if !(self.planet_radius > 0.0) {
            return Err(invalid("planet_radius", format!("{} is not positive", self.planet_radius)));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: String) -> TerrainError {
    TerrainError::InvalidConfig { field, message }
}
