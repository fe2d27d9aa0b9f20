//! Seed management for elevation generation
//!
//! Each generation phase gets its own seed, derived from a master seed, so a
//! single phase can be varied while the others stay fixed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeds for the three plateau generation phases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Primary plateau placement and growth
    pub primary: u64,
    /// Secondary plateaus nested inside primaries
    pub secondary: u64,
    /// Tertiary plateaus nested inside secondaries
    pub tertiary: u64,
}

impl GenerationSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            primary: derive_seed(master, "primary"),
            secondary: derive_seed(master, "secondary"),
            tertiary: derive_seed(master, "tertiary"),
        }
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: u64) -> GenerationSeedsBuilder {
        GenerationSeedsBuilder::new(master)
    }

    /// Stream for the primary phase.
    pub fn primary_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.primary)
    }
}

/// Builder for customizing individual seeds while deriving others from master
pub struct GenerationSeedsBuilder {
    seeds: GenerationSeeds,
}

impl GenerationSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: GenerationSeeds::from_master(master),
        }
    }

    pub fn primary(mut self, seed: u64) -> Self {
        self.seeds.primary = seed;
        self
    }

    pub fn secondary(mut self, seed: u64) -> Self {
        self.seeds.secondary = seed;
        self
    }

    pub fn tertiary(mut self, seed: u64) -> Self {
        self.seeds.tertiary = seed;
        self
    }

    pub fn build(self) -> GenerationSeeds {
        self.seeds
    }
}

/// Derive a sub-seed from a master seed and a phase name.
fn derive_seed(master: u64, phase: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    phase.hash(&mut hasher);
    hasher.finish()
}

/// Stream for one parent region in a nested phase.
///
/// Keyed on the parent id so the stream does not depend on the order in
/// which parents are processed.
pub fn parent_rng(phase_seed: u64, parent_id: u32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(phase_seed.wrapping_add(parent_id as u64))
}

impl std::fmt::Display for GenerationSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GenerationSeeds {{ master: {}, primary: {}, secondary: {}, tertiary: {} }}",
            self.master, self.primary, self.secondary, self.tertiary,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_deterministic_derivation() {
        assert_eq!(GenerationSeeds::from_master(73), GenerationSeeds::from_master(73));
    }

    #[test]
    fn test_phases_get_different_seeds() {
        let seeds = GenerationSeeds::from_master(12345);
        assert_ne!(seeds.primary, seeds.secondary);
        assert_ne!(seeds.secondary, seeds.tertiary);
    }

    #[test]
    fn test_builder_override() {
        let seeds = GenerationSeeds::builder(12345).tertiary(99999).build();
        let default_seeds = GenerationSeeds::from_master(12345);

        assert_eq!(seeds.tertiary, 99999);
        assert_eq!(seeds.primary, default_seeds.primary);
        assert_eq!(seeds.secondary, default_seeds.secondary);
    }

    #[test]
    fn test_parent_streams_independent() {
        let a: f64 = parent_rng(7, 1).gen();
        let b: f64 = parent_rng(7, 2).gen();
        let a_again: f64 = parent_rng(7, 1).gen();
        assert_ne!(a, b);
        assert_eq!(a, a_again);
    }
}
