//! Game state and core session types
//!
//! Everything the presentation layer reads lives in `GameState`. Only the
//! store (`sim::Game`) mutates it.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::blueprint::Blueprint;
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing spawned yet
    #[default]
    Start,
    /// Active gameplay
    Playing,
    /// Run ended; only `start_game` leaves this phase
    GameOver,
}

/// Tree size class, fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeSize {
    Small,
    Medium,
    Large,
}

impl TreeSize {
    pub fn max_health(&self) -> f32 {
        match self {
            TreeSize::Small => 100.0,
            TreeSize::Medium => 200.0,
            TreeSize::Large => 300.0,
        }
    }

    /// Loose logs dropped when felled
    pub fn log_count(&self) -> u32 {
        match self {
            TreeSize::Small => 1,
            TreeSize::Medium => 2,
            TreeSize::Large => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub id: u32,
    pub pos: Vec3,
    pub size: TreeSize,
    pub health: f32,
    pub max_health: f32,
    /// Felled trees stay as stumps until the next session
    pub is_felled: bool,
}

impl Tree {
    pub fn new(id: u32, pos: Vec3, size: TreeSize) -> Self {
        Self {
            id,
            pos,
            size,
            health: size.max_health(),
            max_health: size.max_health(),
            is_felled: false,
        }
    }
}

/// A log the player placed into the world as dam material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    pub id: u32,
    pub pos: Vec3,
    /// Euler angles (radians)
    pub rotation: Vec3,
    pub created_at: f64,
}

/// A scattered log from a felled tree or a destroyed structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LooseLog {
    pub id: u32,
    pub pos: Vec3,
    pub created_at: f64,
}

impl LooseLog {
    pub fn is_expired(&self, now: f64) -> bool {
        now - self.created_at >= LOOSE_LOG_LIFETIME_MS
    }
}

/// Static obstacle, never changes after spawn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boulder {
    pub id: u32,
    pub pos: Vec3,
    pub scale: f32,
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MobKind {
    Wolf,
    Bear,
}

/// Night hazard that pursues the player (movement is the host's job)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mob {
    pub id: u32,
    pub kind: MobKind,
    pub pos: Vec3,
    pub spawned_at: f64,
}

/// Healing pickup dropped by felled trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: u32,
    pub pos: Vec3,
    pub created_at: f64,
}

/// A built instance of a blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedStructure {
    pub id: u32,
    pub blueprint_id: usize,
    pub pos: Vec3,
    /// Yaw/pitch at placement time (radians, unbounded)
    pub rotation: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// Wood spent, used for the refund
    pub cost: u32,
}

/// Log-collection streak
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub active: bool,
    /// 1..=4
    pub multiplier: u32,
    pub start_time: f64,
    pub level_start_time: f64,
    pub logs_collected: u32,
    pub logs_since_last_level: u32,
    pub last_log_time: f64,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            active: false,
            multiplier: 1,
            start_time: 0.0,
            level_start_time: 0.0,
            logs_collected: 0,
            logs_since_last_level: 0,
            last_log_time: 0.0,
        }
    }
}

impl ComboState {
    /// Window for the current level, measured from `start_time` at x1 and
    /// from `level_start_time` above that
    pub fn window_ms(&self) -> f64 {
        match self.multiplier {
            0 | 1 => COMBO_WINDOW_START_MS,
            2 => COMBO_WINDOW_LEVEL2_MS,
            _ => COMBO_WINDOW_LEVEL3_MS,
        }
    }

    /// Drop the streak. Lifetime counters are kept.
    pub fn end(&mut self) {
        self.active = false;
        self.multiplier = 1;
    }

    /// Move every timed-window timestamp forward by the part of the pause
    /// `[pause_start, now]` that it lived through. Timestamps taken during
    /// the pause land on `now`.
    pub fn shift(&mut self, pause_start: f64, now: f64) {
        let compensate = |ts: f64| ts + (now - ts.max(pause_start)).max(0.0);
        self.start_time = compensate(self.start_time);
        self.level_start_time = compensate(self.level_start_time);
        self.last_log_time = compensate(self.last_log_time);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Widened log collection radius
    Magnet,
    /// Widened chomp radius
    MegaChomp,
}

/// A timed effect, polled against `end_time`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Powerup {
    pub active: bool,
    pub end_time: f64,
    /// Whether the first-activation notification has been shown this session
    pub introduced: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Powerups {
    pub magnet: Powerup,
    pub mega_chomp: Powerup,
}

impl Powerups {
    pub fn get_mut(&mut self, kind: PowerupKind) -> &mut Powerup {
        match kind {
            PowerupKind::Magnet => &mut self.magnet,
            PowerupKind::MegaChomp => &mut self.mega_chomp,
        }
    }
}

/// Blocking message for the presentation layer. At most one is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    BlueprintUnlocked { blueprint_id: usize },
    PowerupUnlocked { powerup: PowerupKind },
    Milestone { total_logs: u32 },
}

/// Build workflow
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BuildMode {
    #[default]
    Idle,
    MenuOpen,
    Placing { blueprint_id: usize, rotation: Vec2 },
}

/// Destroy workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DestroyMode {
    #[default]
    Idle,
    /// Touching a structure, ready to chew
    Armed { target: u32 },
    Destroying { target: u32 },
}

impl DestroyMode {
    pub fn target(&self) -> Option<u32> {
        match *self {
            DestroyMode::Idle => None,
            DestroyMode::Armed { target } | DestroyMode::Destroying { target } => Some(target),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraMode {
    #[default]
    ThirdPerson,
    FirstPerson,
    TopDown,
}

impl CameraMode {
    pub fn next(self) -> Self {
        match self {
            CameraMode::ThirdPerson => CameraMode::FirstPerson,
            CameraMode::FirstPerson => CameraMode::TopDown,
            CameraMode::TopDown => CameraMode::ThirdPerson,
        }
    }
}

/// Sound cues for the host's audio layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Tree hit
    Chop,
    /// Tree felled
    TreeFall,
    /// Log or food eaten/collected, log placed on land
    Chomp,
    /// Log placed in water
    Splash,
    /// Structure built, blueprint unlocked
    Success,
    /// Combo multiplier increased
    LevelUp,
    /// Structure destroyed
    StructureCollapse,
}

/// Fire-and-forget output drained by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundEffect),
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Spendable wood
    pub wood_count: u32,
    pub score: u64,
    pub total_logs_collected: u32,
    pub health: f32,
    pub max_health: f32,
    pub is_paused: bool,
    pub last_pause_start_time: f64,
    /// Cyclic day clock in [0, 1)
    pub time_of_day: f32,
    pub day_duration_secs: f32,
    pub trees: Vec<Tree>,
    pub logs: Vec<Log>,
    pub loose_logs: Vec<LooseLog>,
    pub boulders: Vec<Boulder>,
    pub mobs: Vec<Mob>,
    pub food: Vec<Food>,
    pub structures: Vec<PlacedStructure>,
    /// Catalog carried across restarts
    pub blueprints: Vec<Blueprint>,
    pub combo: ComboState,
    pub powerups: Powerups,
    pub notification: Option<Notification>,
    pub build: BuildMode,
    pub destroy: DestroyMode,
    /// Tree the player is currently chewing
    pub active_tree: Option<u32>,
    pub camera: CameraMode,
    next_id: u32,
}

impl GameState {
    /// Title-screen state: no entities, default counters
    pub fn new(settings: &Settings, blueprints: Vec<Blueprint>) -> Self {
        Self {
            phase: GamePhase::Start,
            wood_count: 0,
            score: 0,
            total_logs_collected: 0,
            health: settings.starting_health,
            max_health: settings.starting_health,
            is_paused: false,
            last_pause_start_time: 0.0,
            time_of_day: NIGHT_END,
            day_duration_secs: settings.day_duration_secs,
            trees: Vec::new(),
            logs: Vec::new(),
            loose_logs: Vec::new(),
            boulders: Vec::new(),
            mobs: Vec::new(),
            food: Vec::new(),
            structures: Vec::new(),
            blueprints,
            combo: ComboState::default(),
            powerups: Powerups::default(),
            notification: None,
            build: BuildMode::Idle,
            destroy: DestroyMode::Idle,
            active_tree: None,
            camera: settings.default_camera,
            next_id: 1,
        }
    }

    /// Allocate a new transient entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    pub fn is_night(&self) -> bool {
        self.time_of_day > NIGHT_START || self.time_of_day < NIGHT_END
    }

    pub fn tree(&self, id: u32) -> Option<&Tree> {
        self.trees.iter().find(|t| t.id == id)
    }

    pub fn structure(&self, id: u32) -> Option<&PlacedStructure> {
        self.structures.iter().find(|s| s.id == id)
    }

    /// Blueprint being previewed in placement mode
    pub fn selected_blueprint(&self) -> Option<&Blueprint> {
        match self.build {
            BuildMode::Placing { blueprint_id, .. } => self.blueprints.get(blueprint_id),
            _ => None,
        }
    }
}
