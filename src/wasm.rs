//! Browser bindings
//!
//! The page owns rendering, physics and audio. It calls these methods from
//! its frame loop and collision callbacks, then reads `state_json()` to draw
//! and `drain_events_json()` to play sounds.

use glam::{Vec2, Vec3};
use wasm_bindgen::prelude::*;

use crate::settings::Settings;
use crate::sim::Game;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

#[wasm_bindgen]
pub struct WasmGame {
    game: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// `settings_json` may be empty for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str) -> Result<WasmGame, JsValue> {
        let settings = if settings_json.trim().is_empty() {
            Settings::default()
        } else {
            Settings::from_json(settings_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let game = Game::new(settings).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { game })
    }

    pub fn state_json(&self) -> String {
        serde_json::to_string(self.game.state()).unwrap_or_default()
    }

    pub fn drain_events_json(&mut self) -> String {
        serde_json::to_string(&self.game.drain_events()).unwrap_or_default()
    }

    pub fn terrain_height(&self, x: f32, z: f32) -> f32 {
        self.game.terrain().height(x, z)
    }

    pub fn collection_radius(&self) -> f32 {
        self.game.collection_radius()
    }

    pub fn chomp_radius(&self) -> f32 {
        self.game.chomp_radius()
    }

    pub fn combo_time_remaining(&self) -> f64 {
        self.game.combo_time_remaining().unwrap_or(0.0)
    }

    pub fn frame(&mut self, delta: f32, px: f32, py: f32, pz: f32) {
        self.game.frame(delta, Vec3::new(px, py, pz));
    }

    pub fn start_game(&mut self) {
        self.game.start_game();
    }

    pub fn end_game(&mut self) {
        self.game.end_game();
    }

    pub fn add_wood(&mut self, amount: u32) {
        self.game.add_wood(amount);
    }

    pub fn place_log(&mut self, x: f32, y: f32, z: f32, rx: f32, ry: f32, rz: f32) {
        self.game
            .place_log(Vec3::new(x, y, z), Vec3::new(rx, ry, rz));
    }

    pub fn damage_tree(&mut self, id: u32, amount: f32) {
        self.game.damage_tree(id, amount);
    }

    /// Negative id clears the active tree
    pub fn set_active_tree(&mut self, id: i64) {
        self.game.set_active_tree(u32::try_from(id).ok());
    }

    pub fn collect_loose_log(&mut self, id: u32) {
        self.game.collect_loose_log(id);
    }

    pub fn collect_log(&mut self, id: u32) {
        self.game.collect_log(id);
    }

    pub fn collect_food(&mut self, id: u32) {
        self.game.collect_food(id);
    }

    pub fn expire_loose_log(&mut self, id: u32) {
        self.game.expire_loose_log(id);
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.game.take_damage(amount);
    }

    pub fn heal(&mut self, amount: f32) {
        self.game.heal(amount);
    }

    pub fn end_combo(&mut self) {
        self.game.end_combo();
    }

    pub fn open_build_menu(&mut self) {
        self.game.open_build_menu();
    }

    pub fn close_build_menu(&mut self) {
        self.game.close_build_menu();
    }

    pub fn select_blueprint(&mut self, id: usize) {
        self.game.select_blueprint(id);
    }

    pub fn update_placement_rotation(&mut self, dx: f32, dy: f32) {
        self.game.update_placement_rotation(dx, dy);
    }

    pub fn place_structure(&mut self, x: f32, y: f32, z: f32) {
        self.game.place_structure(Vec3::new(x, y, z));
    }

    /// Negative id disarms
    pub fn set_destroy_target(&mut self, id: i64) {
        self.game.set_destroy_target(u32::try_from(id).ok());
    }

    pub fn start_destroying(&mut self) {
        self.game.start_destroying();
    }

    pub fn stop_destroying(&mut self) {
        self.game.stop_destroying();
    }

    pub fn tick_destruction(&mut self, delta: f32, px: f32, py: f32, pz: f32) {
        self.game.tick_destruction(delta, Vec3::new(px, py, pz));
    }

    pub fn check_powerups(&mut self) {
        self.game.check_powerups();
    }

    pub fn update_time(&mut self, delta: f32, px: f32, py: f32, pz: f32) {
        self.game.update_time(delta, Vec3::new(px, py, pz));
    }

    pub fn spawn_mob(&mut self, px: f32, py: f32, pz: f32) {
        self.game.spawn_mob(Vec3::new(px, py, pz));
    }

    pub fn remove_mob(&mut self, id: u32) {
        self.game.remove_mob(id);
    }

    pub fn dismiss_notification(&mut self) {
        self.game.dismiss_notification();
    }

    pub fn cycle_camera_mode(&mut self) {
        self.game.cycle_camera_mode();
    }

    /// Placement preview yaw/pitch, zero outside placement mode
    pub fn placement_rotation(&self) -> Vec<f32> {
        let rotation = match self.game.state().build {
            crate::sim::BuildMode::Placing { rotation, .. } => rotation,
            _ => Vec2::ZERO,
        };
        vec![rotation.x, rotation.y]
    }
}
