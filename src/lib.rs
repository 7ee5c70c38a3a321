//! Beaver Dam - game-state core for a 3D forest survival/building game
//!
//! Core modules:
//! - `sim`: Authoritative session store (actions, combos, blueprints, scheduler)
//! - `terrain`: Deterministic terrain height function
//! - `platform`: Clock abstraction (wall clock on web/native, manual in tests)
//! - `settings`: Session configuration
//!
//! Rendering, physics, audio synthesis and input widgets live in the host and
//! talk to the core only through `sim::Game` actions.

pub mod platform;
pub mod settings;
pub mod sim;
pub mod terrain;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use platform::{Clock, ManualClock, SystemClock};
pub use settings::{Settings, SettingsError};
pub use sim::Game;
pub use terrain::{FlatTerrain, NoiseTerrain, Terrain};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Collected/spawned logs cannot be picked up for this long (ms)
    pub const LOG_INVULNERABLE_MS: f64 = 500.0;
    /// Loose logs vanish after this long unless collected (ms)
    pub const LOOSE_LOG_LIFETIME_MS: f64 = 120_000.0;

    /// Combo windows (ms) for leaving multiplier 1, 2 and 3+
    pub const COMBO_WINDOW_START_MS: f64 = 40_000.0;
    pub const COMBO_WINDOW_LEVEL2_MS: f64 = 30_000.0;
    pub const COMBO_WINDOW_LEVEL3_MS: f64 = 25_000.0;
    /// Logs needed within a window to level up
    pub const COMBO_LOGS_PER_LEVEL: u32 = 2;
    pub const MAX_MULTIPLIER: u32 = 4;

    /// Powerups
    pub const MAGNET_DURATION_MS: f64 = 30_000.0;
    pub const MEGA_CHOMP_DURATION_MS: f64 = 20_000.0;
    pub const BASE_COLLECTION_RADIUS: f32 = 2.5;
    pub const BASE_CHOMP_RADIUS: f32 = 2.0;

    /// Every Nth log collected awards a milestone bonus
    pub const MILESTONE_INTERVAL: u32 = 50;
    pub const MILESTONE_BONUS: u64 = 10;

    /// Blueprint unlocks
    pub const UNLOCK_BONUS: u64 = 100;
    pub const FIRST_BLUEPRINT_LOGS: u32 = 3;
    pub const UNLOCK_THRESHOLDS: [u64; 10] = [0, 150, 300, 500, 750, 1050, 1400, 1800, 2250, 2750];

    /// Structures
    pub const STRUCTURE_HEALTH_PER_COST: f32 = 10.0;
    pub const REFUND_RATIO: f32 = 0.8;
    pub const REFUND_SCATTER_RADIUS: f32 = 4.0;
    /// Destroy target is dropped beyond 8 units (squared)
    pub const DESTROY_LEASH_SQ: f32 = 64.0;
    pub const PLACEMENT_ROTATION_SPEED: f32 = 0.05;

    /// Player health
    pub const DEFAULT_MAX_HEALTH: f32 = 100.0;
    pub const OVERHEAL_FACTOR: f32 = 2.0;
    /// Overheal decays toward max at this rate (HP/s)
    pub const OVERHEAL_DECAY_PER_SEC: f32 = 0.2;
    pub const FOOD_HEAL: f32 = 25.0;
    pub const FOOD_DROP_CHANCE: f64 = 0.3;

    /// Day/night and hazards
    pub const DEFAULT_DAY_DURATION_SECS: f32 = 300.0;
    pub const NIGHT_START: f32 = 0.75;
    pub const NIGHT_END: f32 = 0.25;
    pub const MAX_MOBS: usize = 8;
    pub const MOB_SPAWN_CHANCE: f64 = 0.01;
    pub const MOB_DESPAWN_CHANCE: f64 = 0.02;
    pub const MOB_SPAWN_MIN_DIST: f32 = 30.0;
    pub const MOB_SPAWN_MAX_DIST: f32 = 50.0;

    /// World
    pub const WATER_LEVEL: f32 = 0.0;
    pub const DEFAULT_WORLD_RADIUS: f32 = 120.0;
    pub const DEFAULT_TREE_COUNT: u32 = 60;
    pub const DEFAULT_BOULDER_COUNT: u32 = 25;
    /// Keep the spawn point clear of trees and boulders
    pub const SPAWN_CLEARING_RADIUS: f32 = 6.0;
}

/// Horizontal (x, z) squared distance between two world positions
#[inline]
pub fn ground_distance_sq(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length_squared()
}

/// Point on the ground plane at `radius` along heading `theta` from `center`
#[inline]
pub fn ground_offset(center: Vec3, radius: f32, theta: f32) -> Vec3 {
    Vec3::new(center.x + radius * theta.cos(), center.y, center.z + radius * theta.sin())
}
