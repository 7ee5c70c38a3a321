//! Building and demolishing structures
//!
//! Build: open menu (pauses) -> pick an unlocked blueprint -> steer the
//! preview rotation -> commit where the player stands.
//!
//! Destroy: the host reports contact with a structure, the player holds the
//! chew input, and the structure's health drains each frame until it
//! collapses into loose logs.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;

use super::game::Game;
use super::state::*;
use crate::consts::*;

/// Health drained per second while destroying. Larger structures drain
/// faster in absolute terms but take somewhat longer overall.
pub fn destroy_rate(max_health: f32) -> f32 {
    max_health / (2.0 + max_health / 1000.0)
}

/// Loose logs returned when a structure of this cost collapses
pub fn refund_logs(cost: u32) -> u32 {
    (cost as f32 * REFUND_RATIO).floor() as u32
}

impl Game {
    /// Pause and show the blueprint picker. Any running combo ends.
    pub fn open_build_menu(&mut self) {
        if !self.state.is_playing() || self.state.build == BuildMode::MenuOpen {
            return;
        }
        self.state.build = BuildMode::MenuOpen;
        self.end_combo();
        self.pause();
    }

    /// Leave the menu (or abandon a placement preview) without building
    pub fn close_build_menu(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        match self.state.build {
            BuildMode::MenuOpen => {
                self.state.build = BuildMode::Idle;
                self.try_resume();
            }
            BuildMode::Placing { .. } => self.state.build = BuildMode::Idle,
            BuildMode::Idle => {}
        }
    }

    /// Pick an unlocked blueprint and enter placement mode
    pub fn select_blueprint(&mut self, blueprint_id: usize) {
        if !self.state.is_playing() || self.state.build != BuildMode::MenuOpen {
            return;
        }
        let unlocked = self
            .state
            .blueprints
            .get(blueprint_id)
            .is_some_and(|bp| bp.unlocked);
        if !unlocked {
            log::debug!("Blueprint {} is not available", blueprint_id);
            return;
        }
        self.state.build = BuildMode::Placing {
            blueprint_id,
            rotation: Vec2::ZERO,
        };
        self.try_resume();
    }

    /// Accumulate joystick input into the preview's yaw/pitch
    pub fn update_placement_rotation(&mut self, dx: f32, dy: f32) {
        if !self.state.is_playing() {
            return;
        }
        if let BuildMode::Placing { rotation, .. } = &mut self.state.build {
            *rotation += Vec2::new(dx, dy) * PLACEMENT_ROTATION_SPEED;
        }
    }

    /// Build the selected blueprint at `pos` if there is enough wood
    pub fn place_structure(&mut self, pos: Vec3) {
        if !self.state.is_playing() {
            return;
        }
        let BuildMode::Placing {
            blueprint_id,
            rotation,
        } = self.state.build
        else {
            return;
        };
        let Some(blueprint) = self.state.blueprints.get(blueprint_id) else {
            return;
        };
        let (cost, health) = (blueprint.cost, blueprint.structure_health());
        if self.state.wood_count < cost {
            log::debug!(
                "Not enough wood for {}: {} < {}",
                blueprint.name,
                self.state.wood_count,
                cost
            );
            return;
        }

        self.state.wood_count -= cost;
        let id = self.state.next_entity_id();
        self.state.structures.push(PlacedStructure {
            id,
            blueprint_id,
            pos,
            rotation,
            health,
            max_health: health,
            cost,
        });
        self.state.build = BuildMode::Idle;
        log::info!("Built structure {} from blueprint {}", id, blueprint_id);
        self.play(SoundEffect::Success);
    }

    /// Contact with a structure arms destruction; `None` disarms
    pub fn set_destroy_target(&mut self, id: Option<u32>) {
        if !self.state.is_playing() {
            return;
        }
        self.state.destroy = match id {
            Some(id) if self.state.structure(id).is_some() => match self.state.destroy {
                DestroyMode::Destroying { target } if target == id => self.state.destroy,
                _ => DestroyMode::Armed { target: id },
            },
            _ => DestroyMode::Idle,
        };
    }

    pub fn start_destroying(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        if let DestroyMode::Armed { target } = self.state.destroy {
            self.state.destroy = if self.state.structure(target).is_some() {
                DestroyMode::Destroying { target }
            } else {
                DestroyMode::Idle
            };
        }
    }

    pub fn stop_destroying(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        if let DestroyMode::Destroying { target } = self.state.destroy {
            self.state.destroy = DestroyMode::Armed { target };
        }
    }

    /// Per-frame destruction step. Drops the target when it is gone or the
    /// player has wandered off.
    pub fn tick_destruction(&mut self, delta: f32, player_pos: Vec3) {
        if !self.state.is_playing() || self.state.is_paused {
            return;
        }
        let Some(target) = self.state.destroy.target() else {
            return;
        };
        let Some(idx) = self.state.structures.iter().position(|s| s.id == target) else {
            self.state.destroy = DestroyMode::Idle;
            return;
        };
        if self.state.structures[idx].pos.distance_squared(player_pos) > DESTROY_LEASH_SQ {
            self.state.destroy = DestroyMode::Idle;
            return;
        }
        if !matches!(self.state.destroy, DestroyMode::Destroying { .. }) {
            return;
        }

        let structure = &mut self.state.structures[idx];
        structure.health -= destroy_rate(structure.max_health) * delta.max(0.0);
        if structure.health > 0.0 {
            return;
        }

        let structure = self.state.structures.remove(idx);
        let refund = refund_logs(structure.cost);
        for _ in 0..refund {
            let theta = self.rng.random_range(0.0..TAU);
            // sqrt for an even spread over the disc
            let r = self.rng.random_range(0.0f32..1.0).sqrt() * REFUND_SCATTER_RADIUS;
            let spot = crate::ground_offset(structure.pos, r, theta);
            let drop_height = self.rng.random_range(2.0..5.0);
            let y = self.terrain.height(spot.x, spot.z) + drop_height;
            self.spawn_loose_log(Vec3::new(spot.x, y, spot.z));
        }
        self.state.destroy = DestroyMode::Idle;
        log::info!("Structure {} destroyed, {} logs refunded", structure.id, refund);
        self.play(SoundEffect::StructureCollapse);
    }
}

#[cfg(test)]
mod tests {
    use super::super::game::test_support::*;
    use super::*;

    fn ready_to_place(game: &mut Game, blueprint_id: usize, wood: u32) {
        game.state.blueprints[blueprint_id].unlocked = true;
        game.add_wood(wood);
        game.open_build_menu();
        game.select_blueprint(blueprint_id);
    }

    /// A built structure from blueprint `blueprint_id` next to the origin
    fn build_one(game: &mut Game, blueprint_id: usize) -> u32 {
        let cost = game.state.blueprints[blueprint_id].cost;
        ready_to_place(game, blueprint_id, cost);
        game.place_structure(Vec3::new(2.0, 1.0, 0.0));
        game.state.structures.last().unwrap().id
    }

    #[test]
    fn damage_rate_and_refund_formulas() {
        assert!((destroy_rate(300.0) - 300.0 / 2.3).abs() < 1e-3);
        assert_eq!(refund_logs(30), 24);
        assert_eq!(refund_logs(7), 5);
        assert_eq!(refund_logs(1), 0);
    }

    #[test]
    fn opening_menu_pauses_and_ends_combo() {
        let (mut game, _clock) = started_game();
        game.state.combo = ComboState {
            active: true,
            multiplier: 3,
            logs_collected: 6,
            ..Default::default()
        };
        game.open_build_menu();
        assert_eq!(game.state().build, BuildMode::MenuOpen);
        assert!(game.state().is_paused);
        assert!(!game.state().combo.active);
        assert_eq!(game.state().combo.multiplier, 1);
        assert_eq!(game.state().combo.logs_collected, 6);
    }

    #[test]
    fn closing_menu_resumes() {
        let (mut game, _clock) = started_game();
        game.open_build_menu();
        game.close_build_menu();
        assert_eq!(game.state().build, BuildMode::Idle);
        assert!(!game.state().is_paused);
    }

    #[test]
    fn locked_blueprint_cannot_be_selected() {
        let (mut game, _clock) = started_game();
        game.open_build_menu();
        game.select_blueprint(3);
        game.select_blueprint(99);
        assert_eq!(game.state().build, BuildMode::MenuOpen);
        assert!(game.state().is_paused);
    }

    #[test]
    fn selecting_resumes_and_zeroes_rotation() {
        let (mut game, clock) = started_game();
        game.state.blueprints[0].unlocked = true;
        game.open_build_menu();
        clock.advance(3_000.0);
        game.select_blueprint(0);
        assert!(!game.state().is_paused);
        assert_eq!(
            game.state().build,
            BuildMode::Placing {
                blueprint_id: 0,
                rotation: Vec2::ZERO
            }
        );
        assert_eq!(game.state().selected_blueprint().map(|bp| bp.id), Some(0));
    }

    #[test]
    fn rotation_accumulates_without_clamp() {
        let (mut game, _clock) = started_game();
        ready_to_place(&mut game, 0, 0);
        for _ in 0..1000 {
            game.update_placement_rotation(1.0, -0.5);
        }
        let BuildMode::Placing { rotation, .. } = game.state().build else {
            panic!("not placing");
        };
        assert!((rotation.x - 1000.0 * PLACEMENT_ROTATION_SPEED).abs() < 1e-2);
        assert!((rotation.y + 500.0 * PLACEMENT_ROTATION_SPEED).abs() < 1e-2);
    }

    #[test]
    fn placing_without_enough_wood_is_a_no_op() {
        let (mut game, _clock) = started_game();
        ready_to_place(&mut game, 0, 5);
        assert_eq!(game.state().blueprints[0].cost, 7);
        game.place_structure(Vec3::ZERO);
        assert_eq!(game.state().wood_count, 5);
        assert!(game.state().structures.is_empty());
        assert!(matches!(game.state().build, BuildMode::Placing { .. }));
    }

    #[test]
    fn placing_deducts_cost_and_exits_placement() {
        let (mut game, _clock) = started_game();
        ready_to_place(&mut game, 0, 10);
        game.update_placement_rotation(2.0, 0.0);
        game.place_structure(Vec3::new(3.0, 1.0, 3.0));

        let state = game.state();
        assert_eq!(state.wood_count, 3);
        assert_eq!(state.build, BuildMode::Idle);
        let structure = &state.structures[0];
        assert_eq!(structure.health, 70.0);
        assert_eq!(structure.max_health, 70.0);
        assert!((structure.rotation.x - 2.0 * PLACEMENT_ROTATION_SPEED).abs() < 1e-6);
    }

    #[test]
    fn destroy_targeting_state_machine() {
        let (mut game, _clock) = started_game();
        let id = build_one(&mut game, 0);

        game.start_destroying();
        assert_eq!(game.state().destroy, DestroyMode::Idle);

        game.set_destroy_target(Some(id));
        assert_eq!(game.state().destroy, DestroyMode::Armed { target: id });
        game.start_destroying();
        assert_eq!(game.state().destroy, DestroyMode::Destroying { target: id });
        // Re-reporting the same contact keeps chewing
        game.set_destroy_target(Some(id));
        assert_eq!(game.state().destroy, DestroyMode::Destroying { target: id });
        game.stop_destroying();
        assert_eq!(game.state().destroy, DestroyMode::Armed { target: id });
        game.set_destroy_target(None);
        assert_eq!(game.state().destroy, DestroyMode::Idle);
        game.set_destroy_target(Some(id + 100));
        assert_eq!(game.state().destroy, DestroyMode::Idle);
    }

    #[test]
    fn armed_structure_does_not_decay() {
        let (mut game, _clock) = started_game();
        let id = build_one(&mut game, 0);
        game.set_destroy_target(Some(id));
        game.tick_destruction(1.0, Vec3::ZERO);
        assert_eq!(game.state().structure(id).unwrap().health, 70.0);
    }

    #[test]
    fn walking_away_drops_target() {
        let (mut game, _clock) = started_game();
        let id = build_one(&mut game, 0);
        game.set_destroy_target(Some(id));
        game.start_destroying();
        game.tick_destruction(0.1, Vec3::new(20.0, 1.0, 0.0));
        assert_eq!(game.state().destroy, DestroyMode::Idle);
        assert_eq!(game.state().structure(id).unwrap().health, 70.0);
    }

    #[test]
    fn vanished_target_resets_destroy_state() {
        let (mut game, _clock) = started_game();
        let id = build_one(&mut game, 0);
        game.set_destroy_target(Some(id));
        game.start_destroying();
        game.state.structures.clear();
        game.tick_destruction(0.1, Vec3::ZERO);
        assert_eq!(game.state().destroy, DestroyMode::Idle);
    }

    #[test]
    fn destroying_cost_30_refunds_24_logs() {
        let (mut game, _clock) = started_game();
        let id = build_one(&mut game, 4);
        assert_eq!(game.state().structure(id).unwrap().cost, 30);
        let player = Vec3::new(2.0, 1.0, 1.0);
        game.set_destroy_target(Some(id));
        game.start_destroying();

        // 300 HP at 300/2.3 HP/s: gone within 2.3 s
        for _ in 0..24 {
            game.tick_destruction(0.1, player);
        }
        assert!(game.state().structure(id).is_none());
        assert_eq!(game.state().loose_logs.len(), 24);
        assert_eq!(game.state().destroy, DestroyMode::Idle);

        let center = Vec3::new(2.0, 1.0, 0.0);
        for log in &game.state().loose_logs {
            let d = crate::ground_distance_sq(log.pos, center);
            assert!(d <= REFUND_SCATTER_RADIUS.powi(2) + 1e-3);
            assert!(log.pos.y >= 1.0 + 2.0 && log.pos.y <= 1.0 + 5.0);
        }
    }

    #[test]
    fn destruction_freezes_while_paused() {
        let (mut game, _clock) = started_game();
        let id = build_one(&mut game, 0);
        game.set_destroy_target(Some(id));
        game.start_destroying();
        game.state.is_paused = true;
        game.tick_destruction(10.0, Vec3::ZERO);
        assert_eq!(game.state().structure(id).unwrap().health, 70.0);
    }
}
