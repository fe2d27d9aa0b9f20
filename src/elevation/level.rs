/// Elevation level of a tile: 0 is ground, 1-3 are nested plateaus.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ElevationLevel(pub u8);

impl ElevationLevel {
    pub const GROUND: ElevationLevel = ElevationLevel(0);
    pub const PRIMARY: ElevationLevel = ElevationLevel(1);
    pub const SECONDARY: ElevationLevel = ElevationLevel(2);
    pub const TERTIARY: ElevationLevel = ElevationLevel(3);
    pub const MAX: ElevationLevel = Self::TERTIARY;

    pub fn is_ground(&self) -> bool {
        self.0 == 0
    }

    /// The level one step up, saturating at [`Self::MAX`].
    pub fn next(&self) -> ElevationLevel {
        ElevationLevel((self.0 + 1).min(Self::MAX.0))
    }

    /// The level one step down, or `None` for ground.
    pub fn parent(&self) -> Option<ElevationLevel> {
        self.0.checked_sub(1).map(ElevationLevel)
    }
}

impl std::fmt::Display for ElevationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.0)
    }
}
