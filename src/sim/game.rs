//! The session store
//!
//! `Game` owns the one `GameState` and is the only thing allowed to change
//! it. Hosts call actions on it (per frame and on collisions/input) and read
//! `state()` to draw. Every action runs to completion on `&mut self`, so no
//! action ever sees another half-applied.
//!
//! Actions are total: acting on a missing entity, without enough wood, or
//! outside the Playing phase leaves the state untouched.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::blueprint::generate_blueprints;
use super::generate::{generate_boulders, generate_trees};
use super::state::*;
use crate::consts::*;
use crate::platform::{Clock, SystemClock};
use crate::settings::{Settings, SettingsError};
use crate::terrain::{NoiseTerrain, Terrain};

pub struct Game {
    pub(super) state: GameState,
    pub(super) settings: Settings,
    pub(super) clock: Box<dyn Clock>,
    pub(super) terrain: Box<dyn Terrain>,
    pub(super) rng: Pcg32,
    pub(super) events: Vec<GameEvent>,
}

impl Game {
    /// Wall clock and noise terrain derived from the settings' seed
    pub fn new(settings: Settings) -> Result<Self, SettingsError> {
        let terrain = NoiseTerrain::with_radius(settings.seed, settings.world_radius);
        Self::with_parts(settings, SystemClock, terrain)
    }

    /// Fails when `settings` does not pass `Settings::validate`
    pub fn with_parts(
        settings: Settings,
        clock: impl Clock + 'static,
        terrain: impl Terrain + 'static,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let state = GameState::new(&settings, generate_blueprints());
        Ok(Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            state,
            settings,
            clock: Box::new(clock),
            terrain: Box::new(terrain),
            events: Vec::new(),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn terrain(&self) -> &dyn Terrain {
        self.terrain.as_ref()
    }

    /// Current reading of the injected clock (ms)
    pub fn now(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Take all sound cues raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Replace the settings used by the next `start_game`. Invalid settings
    /// are rejected and the current ones kept.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Begin a fresh session. Entities and counters reset; the blueprint
    /// catalog, including what has been unlocked, carries over.
    pub fn start_game(&mut self) {
        let blueprints = std::mem::take(&mut self.state.blueprints);
        self.rng = Pcg32::seed_from_u64(self.settings.seed);
        let mut state = GameState::new(&self.settings, blueprints);

        let radius = self.settings.world_radius;
        state.trees = generate_trees(
            &mut self.rng,
            self.terrain.as_ref(),
            self.settings.tree_count,
            radius,
        );
        state.boulders = generate_boulders(
            &mut self.rng,
            self.terrain.as_ref(),
            self.settings.boulder_count,
            radius,
        );
        state.phase = GamePhase::Playing;

        log::info!(
            "Session started: {} trees, {} boulders, {} blueprints unlocked",
            state.trees.len(),
            state.boulders.len(),
            state.blueprints.iter().filter(|bp| bp.unlocked).count()
        );
        self.state = state;
        self.events.clear();
    }

    /// Terminal: freezes the session until the next `start_game`
    pub fn end_game(&mut self) {
        if self.state.phase == GamePhase::GameOver {
            return;
        }
        self.state.phase = GamePhase::GameOver;
        if !self.state.is_paused {
            self.state.is_paused = true;
            self.state.last_pause_start_time = self.now();
        }
        log::info!(
            "Game over: score {}, {} logs collected",
            self.state.score,
            self.state.total_logs_collected
        );
    }

    pub fn add_wood(&mut self, amount: u32) {
        if !self.state.is_playing() {
            return;
        }
        self.state.wood_count = self.state.wood_count.saturating_add(amount);
    }

    /// Drop one wood into the world as dam material
    pub fn place_log(&mut self, pos: Vec3, rotation: Vec3) {
        if !self.state.is_playing() || self.state.wood_count == 0 {
            return;
        }
        let now = self.now();
        self.state.wood_count -= 1;
        let id = self.state.next_entity_id();
        self.state.logs.push(Log {
            id,
            pos,
            rotation,
            created_at: now,
        });
        let sound = if self.terrain.is_on_land(pos.x, pos.z) {
            SoundEffect::Chomp
        } else {
            SoundEffect::Splash
        };
        self.play(sound);
    }

    /// Chew on a tree. Felling drops its logs and maybe some food.
    pub fn damage_tree(&mut self, id: u32, amount: f32) {
        if !self.state.is_playing() || amount.is_nan() || amount <= 0.0 {
            return;
        }
        let Some(tree) = self
            .state
            .trees
            .iter_mut()
            .find(|t| t.id == id && !t.is_felled)
        else {
            return;
        };

        tree.health -= amount;
        if tree.health > 0.0 {
            self.play(SoundEffect::Chop);
            return;
        }

        tree.health = 0.0;
        tree.is_felled = true;
        let (trunk, logs) = (tree.pos, tree.size.log_count());
        log::debug!("Tree {} felled, dropping {} logs", id, logs);

        for _ in 0..logs {
            let theta = self.rng.random_range(0.0..std::f32::consts::TAU);
            let dist = self.rng.random_range(1.0..2.0);
            let drop = crate::ground_offset(trunk, dist, theta);
            let y = self.terrain.height(drop.x, drop.z) + 1.0;
            self.spawn_loose_log(Vec3::new(drop.x, y, drop.z));
        }
        if self.rng.random_bool(FOOD_DROP_CHANCE) {
            let id = self.state.next_entity_id();
            let created_at = self.now();
            let theta = self.rng.random_range(0.0..std::f32::consts::TAU);
            let pos = crate::ground_offset(trunk, 1.5, theta);
            let y = self.terrain.height(pos.x, pos.z) + 0.5;
            self.state.food.push(Food {
                id,
                pos: Vec3::new(pos.x, y, pos.z),
                created_at,
            });
        }
        if self.state.active_tree == Some(id) {
            self.state.active_tree = None;
        }
        self.play(SoundEffect::TreeFall);
    }

    /// Tree under the player's teeth (for highlighting), or none
    pub fn set_active_tree(&mut self, id: Option<u32>) {
        if !self.state.is_playing() {
            return;
        }
        match id {
            None => self.state.active_tree = None,
            Some(id) => {
                if self.state.tree(id).is_some_and(|t| !t.is_felled) {
                    self.state.active_tree = Some(id);
                }
            }
        }
    }

    pub fn expire_loose_log(&mut self, id: u32) {
        if !self.state.is_playing() {
            return;
        }
        self.state.loose_logs.retain(|l| l.id != id);
    }

    pub(super) fn spawn_loose_log(&mut self, pos: Vec3) {
        let id = self.state.next_entity_id();
        let created_at = self.now();
        self.state.loose_logs.push(LooseLog { id, pos, created_at });
    }

    pub fn collect_food(&mut self, id: u32) {
        if !self.state.is_playing() {
            return;
        }
        let Some(idx) = self.state.food.iter().position(|f| f.id == id) else {
            return;
        };
        self.state.food.remove(idx);
        self.heal(FOOD_HEAL);
        self.play(SoundEffect::Chomp);
    }

    pub fn take_damage(&mut self, amount: f32) {
        if !self.state.is_playing() || amount.is_nan() || amount <= 0.0 {
            return;
        }
        self.state.health -= amount;
        if self.state.health <= 0.0 {
            self.state.health = 0.0;
            self.end_game();
        }
    }

    /// Heal, allowing overheal up to twice max health
    pub fn heal(&mut self, amount: f32) {
        if !self.state.is_playing() || amount.is_nan() || amount <= 0.0 {
            return;
        }
        let cap = self.state.max_health * OVERHEAL_FACTOR;
        self.state.health = (self.state.health + amount).min(cap);
    }

    /// Show a blocking notification. Replaces any outstanding one.
    pub(super) fn raise_notification(&mut self, notification: Notification) {
        log::info!("Notification: {:?}", notification);
        self.state.notification = Some(notification);
        self.pause();
    }

    pub fn dismiss_notification(&mut self) {
        if self.state.notification.take().is_none() {
            return;
        }
        if self.state.is_playing() {
            self.try_resume();
        }
    }

    pub(super) fn pause(&mut self) {
        if self.state.is_paused {
            return;
        }
        self.state.is_paused = true;
        self.state.last_pause_start_time = self.now();
    }

    /// Unpause unless something still holds the pause (a notification or the
    /// build menu). Combo timestamps move forward by the paused time; powerup
    /// deadlines do not.
    pub(super) fn try_resume(&mut self) {
        if !self.state.is_paused
            || self.state.notification.is_some()
            || self.state.build == BuildMode::MenuOpen
        {
            return;
        }
        if self.state.combo.active {
            let now = self.now();
            self.state.combo.shift(self.state.last_pause_start_time, now);
        }
        self.state.is_paused = false;
    }

    pub fn cycle_camera_mode(&mut self) {
        self.state.camera = self.state.camera.next();
    }

    pub(super) fn play(&mut self, sound: SoundEffect) {
        if self.settings.sound_enabled {
            self.events.push(GameEvent::Sound(sound));
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn small_tree_id(game: &mut Game) -> u32 {
        // Force the first tree small so the felling math is fixed
        let tree = &mut game.state.trees[0];
        *tree = Tree::new(tree.id, tree.pos, TreeSize::Small);
        tree.id
    }

    #[test]
    fn actions_are_ignored_before_start() {
        let (mut game, _clock) = new_game();
        assert_eq!(game.state().phase, GamePhase::Start);
        game.add_wood(5);
        game.heal(10.0);
        game.take_damage(10.0);
        assert_eq!(game.state().wood_count, 0);
        assert_eq!(game.state().health, DEFAULT_MAX_HEALTH);
    }

    #[test]
    fn start_game_populates_world() {
        let (game, _clock) = started_game();
        let state = game.state();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.trees.len(), 12);
        assert_eq!(state.boulders.len(), 4);
        assert_eq!(state.blueprints.len(), 10);
        assert!(!state.is_paused);
        assert!(!state.is_night());
    }

    #[test]
    fn restart_resets_session_but_keeps_unlocks() {
        let (mut game, _clock) = started_game();
        game.add_wood(20);
        game.state.score = 400;
        game.state.blueprints[0].unlocked = true;
        game.state.trees[0].is_felled = true;

        game.start_game();
        let state = game.state();
        assert_eq!(state.wood_count, 0);
        assert_eq!(state.score, 0);
        assert!(state.blueprints[0].unlocked);
        assert!(state.trees.iter().all(|t| !t.is_felled));
    }

    #[test]
    fn same_seed_gives_same_forest() {
        let (mut a, _ca) = started_game();
        let first: Vec<Vec3> = a.state().trees.iter().map(|t| t.pos).collect();
        a.start_game();
        let second: Vec<Vec3> = a.state().trees.iter().map(|t| t.pos).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn felling_small_tree_drops_one_log() {
        let (mut game, _clock) = started_game();
        let id = small_tree_id(&mut game);
        game.damage_tree(id, 100.0);

        let tree = game.state().tree(id).unwrap();
        assert!(tree.is_felled);
        assert_eq!(tree.health, 0.0);
        assert_eq!(game.state().loose_logs.len(), 1);
    }

    #[test]
    fn chopping_without_felling_only_plays_chop() {
        let (mut game, _clock) = started_game();
        let id = small_tree_id(&mut game);
        game.damage_tree(id, 40.0);
        assert_eq!(game.state().tree(id).unwrap().health, 60.0);
        assert!(game.state().loose_logs.is_empty());
        assert_eq!(game.drain_events(), vec![GameEvent::Sound(SoundEffect::Chop)]);
    }

    #[test]
    fn felled_tree_ignores_further_damage() {
        let (mut game, _clock) = started_game();
        let id = small_tree_id(&mut game);
        game.damage_tree(id, 150.0);
        let logs = game.state().loose_logs.len();
        game.damage_tree(id, 150.0);
        assert_eq!(game.state().loose_logs.len(), logs);
    }

    #[test]
    fn felling_clears_active_tree() {
        let (mut game, _clock) = started_game();
        let id = small_tree_id(&mut game);
        game.set_active_tree(Some(id));
        assert_eq!(game.state().active_tree, Some(id));
        game.damage_tree(id, 100.0);
        assert_eq!(game.state().active_tree, None);
        game.set_active_tree(Some(id));
        assert_eq!(game.state().active_tree, None);
    }

    #[test]
    fn unknown_tree_is_a_no_op() {
        let (mut game, _clock) = started_game();
        game.damage_tree(9999, 500.0);
        game.set_active_tree(Some(9999));
        assert!(game.state().loose_logs.is_empty());
        assert_eq!(game.state().active_tree, None);
    }

    #[test]
    fn place_log_spends_one_wood() {
        let (mut game, clock) = started_game();
        game.place_log(Vec3::ONE, Vec3::ZERO);
        assert!(game.state().logs.is_empty());

        game.add_wood(2);
        game.place_log(Vec3::ONE, Vec3::ZERO);
        assert_eq!(game.state().wood_count, 1);
        assert_eq!(game.state().logs.len(), 1);
        assert_eq!(game.state().logs[0].created_at, clock.now_ms());
    }

    #[test]
    fn log_in_water_splashes() {
        let clock = crate::platform::ManualClock::new(0.0);
        let mut game = Game::with_parts(
            Settings {
                tree_count: 0,
                boulder_count: 0,
                ..Default::default()
            },
            clock,
            crate::terrain::FlatTerrain(-2.0),
        )
        .unwrap();
        game.start_game();
        game.add_wood(1);
        game.place_log(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(game.drain_events(), vec![GameEvent::Sound(SoundEffect::Splash)]);
    }

    #[test]
    fn muted_settings_raise_no_events() {
        let (mut game, _clock) = new_game();
        game.settings.sound_enabled = false;
        game.start_game();
        let id = small_tree_id(&mut game);
        game.damage_tree(id, 10.0);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn heal_caps_at_double_max() {
        let (mut game, _clock) = started_game();
        game.heal(500.0);
        assert_eq!(game.state().health, 200.0);
    }

    #[test]
    fn food_heals_and_is_consumed() {
        let (mut game, _clock) = started_game();
        game.state.health = 50.0;
        let id = game.state.next_entity_id();
        game.state.food.push(Food {
            id,
            pos: Vec3::ZERO,
            created_at: 0.0,
        });
        game.collect_food(id);
        assert_eq!(game.state().health, 50.0 + FOOD_HEAL);
        assert!(game.state().food.is_empty());
        game.collect_food(id);
        assert_eq!(game.state().health, 50.0 + FOOD_HEAL);
    }

    #[test]
    fn lethal_damage_ends_game() {
        let (mut game, _clock) = started_game();
        game.take_damage(60.0);
        assert_eq!(game.state().phase, GamePhase::Playing);
        game.take_damage(60.0);
        assert_eq!(game.state().phase, GamePhase::GameOver);
        assert!(game.state().is_paused);
        assert_eq!(game.state().health, 0.0);

        // Frozen until restart
        game.add_wood(3);
        assert_eq!(game.state().wood_count, 0);
        game.start_game();
        assert_eq!(game.state().phase, GamePhase::Playing);
        assert!(!game.state().is_paused);
    }

    #[test]
    fn expire_loose_log_removes_only_that_log() {
        let (mut game, _clock) = started_game();
        let a = add_loose_log(&mut game, 0.0);
        let b = add_loose_log(&mut game, 0.0);
        game.expire_loose_log(a);
        game.expire_loose_log(a);
        assert_eq!(game.state().loose_logs.len(), 1);
        assert_eq!(game.state().loose_logs[0].id, b);
    }

    #[test]
    fn dismiss_resumes_and_shifts_combo() {
        let (mut game, clock) = started_game();
        game.state.combo = ComboState {
            active: true,
            start_time: 10_000.0,
            level_start_time: 10_000.0,
            last_log_time: 10_000.0,
            ..Default::default()
        };
        clock.set(12_000.0);
        game.raise_notification(Notification::Milestone { total_logs: 50 });
        assert!(game.state().is_paused);

        clock.set(19_000.0);
        game.dismiss_notification();
        assert!(!game.state().is_paused);
        assert_eq!(game.state().notification, None);
        assert_eq!(game.state().combo.start_time, 10_000.0 + 7_000.0);
        assert_eq!(game.state().combo.level_start_time, 17_000.0);
    }

    #[test]
    fn powerup_deadline_is_not_shifted_by_pause() {
        let (mut game, clock) = started_game();
        game.state.powerups.magnet = Powerup {
            active: true,
            end_time: 40_000.0,
            introduced: true,
        };
        game.raise_notification(Notification::Milestone { total_logs: 50 });
        clock.advance(5_000.0);
        game.dismiss_notification();
        assert_eq!(game.state().powerups.magnet.end_time, 40_000.0);
    }

    #[test]
    fn second_notification_keeps_first_pause_start() {
        let (mut game, clock) = started_game();
        game.raise_notification(Notification::Milestone { total_logs: 50 });
        let started = game.state().last_pause_start_time;
        clock.advance(1_000.0);
        game.raise_notification(Notification::BlueprintUnlocked { blueprint_id: 2 });
        assert_eq!(game.state().last_pause_start_time, started);
        assert_eq!(
            game.state().notification,
            Some(Notification::BlueprintUnlocked { blueprint_id: 2 })
        );
    }

    #[test]
    fn camera_cycles() {
        let (mut game, _clock) = started_game();
        game.cycle_camera_mode();
        assert_eq!(game.state().camera, CameraMode::FirstPerson);
        game.cycle_camera_mode();
        game.cycle_camera_mode();
        assert_eq!(game.state().camera, CameraMode::ThirdPerson);
    }

    #[test]
    fn world_inside_spawn_clearing_is_rejected() {
        let settings = Settings {
            world_radius: 5.0,
            ..Default::default()
        };
        let clock = crate::platform::ManualClock::new(0.0);
        let result = Game::with_parts(settings, clock, crate::terrain::FlatTerrain(1.0));
        assert!(matches!(
            result,
            Err(SettingsError::Invalid {
                field: "world_radius",
                ..
            })
        ));
    }

    #[test]
    fn zero_length_day_is_rejected() {
        let settings = Settings {
            day_duration_secs: 0.0,
            ..Default::default()
        };
        let clock = crate::platform::ManualClock::new(0.0);
        let result = Game::with_parts(settings, clock, crate::terrain::FlatTerrain(1.0));
        assert!(matches!(
            result,
            Err(SettingsError::Invalid {
                field: "day_duration_secs",
                ..
            })
        ));
    }

    #[test]
    fn invalid_settings_swap_keeps_current_settings() {
        let (mut game, _clock) = started_game();
        let before = game.settings().clone();
        let bad = Settings {
            world_radius: SPAWN_CLEARING_RADIUS,
            ..before.clone()
        };
        assert!(game.set_settings(bad).is_err());
        assert_eq!(game.settings(), &before);

        // Restart still works and the day clock stays finite
        game.start_game();
        game.update_time(0.016, Vec3::ZERO);
        assert!((0.0..1.0).contains(&game.state().time_of_day));

        let longer = Settings {
            day_duration_secs: 600.0,
            ..before
        };
        assert!(game.set_settings(longer).is_ok());
        assert_eq!(game.settings().day_duration_secs, 600.0);
    }
}
