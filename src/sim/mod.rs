//! Authoritative game-state core
//!
//! All gameplay rules live here. This module must stay host-agnostic:
//! - Time comes from an injected `Clock`
//! - Randomness comes from one seeded RNG
//! - The player position is passed in, never read from shared state
//! - No rendering, physics or audio dependencies

pub mod blueprint;
pub mod build;
pub mod combo;
pub mod game;
pub mod generate;
pub mod state;
pub mod tick;

pub use blueprint::{Blueprint, LogOffset, generate_blueprints, sweep_unlocks};
pub use build::{destroy_rate, refund_logs};
pub use combo::{Collectible, ComboStep, advance_combo};
pub use game::Game;
pub use generate::{generate_boulders, generate_trees};
pub use state::{
    Boulder, BuildMode, CameraMode, ComboState, DestroyMode, Food, GameEvent, GamePhase,
    GameState, Log, LooseLog, Mob, MobKind, Notification, PlacedStructure, Powerup, PowerupKind,
    Powerups, SoundEffect, Tree, TreeSize,
};
pub use tick::advance_time_of_day;
