//! Terrain height function
//!
//! Pure and deterministic: the same seed always yields the same landscape.
//! The core only samples heights to place spawns and to tell land from water.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

use crate::consts::{DEFAULT_WORLD_RADIUS, WATER_LEVEL};

/// Read-only height field
pub trait Terrain {
    /// Elevation at world (x, z)
    fn height(&self, x: f32, z: f32) -> f32;

    /// True when the ground at (x, z) is above the water line
    fn is_on_land(&self, x: f32, z: f32) -> bool {
        self.height(x, z) > WATER_LEVEL
    }
}

/// Constant-height ground
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain(pub f32);

impl Default for FlatTerrain {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Terrain for FlatTerrain {
    fn height(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}

/// Rolling hills on an island: Perlin FBm lifted near the centre and sunk
/// toward the rim so the world is ringed by water.
pub struct NoiseTerrain {
    hills: FastNoiseLite,
    detail: FastNoiseLite,
    island_radius: f32,
}

impl NoiseTerrain {
    pub fn new(seed: u64) -> Self {
        Self::with_radius(seed, DEFAULT_WORLD_RADIUS)
    }

    pub fn with_radius(seed: u64, island_radius: f32) -> Self {
        let mut hills = FastNoiseLite::with_seed(seed as i32);
        hills.set_noise_type(Some(NoiseType::Perlin));
        hills.set_fractal_type(Some(FractalType::FBm));
        hills.set_fractal_octaves(Some(4));
        hills.set_frequency(Some(0.012));

        let mut detail = FastNoiseLite::with_seed(seed.wrapping_add(7919) as i32);
        detail.set_noise_type(Some(NoiseType::Perlin));
        detail.set_frequency(Some(0.08));

        Self {
            hills,
            detail,
            island_radius: island_radius.max(1.0),
        }
    }
}

impl Terrain for NoiseTerrain {
    fn height(&self, x: f32, z: f32) -> f32 {
        let dist = (x * x + z * z).sqrt() / self.island_radius;
        // 1.0 at the centre, 0.0 at the rim, negative beyond
        let falloff = 1.0 - dist * dist;
        let hills = self.hills.get_noise_2d(x, z) * 6.0;
        let detail = self.detail.get_noise_2d(x, z) * 0.5;
        falloff * 10.0 + hills + detail - 2.0
    }
}
