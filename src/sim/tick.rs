//! Per-frame scheduling
//!
//! Day/night clock, night hazards, overheal decay, loose-log expiry and
//! powerup/combo deadlines. Everything here is skipped while paused.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::game::Game;
use super::state::*;
use crate::consts::*;

/// Advance a cyclic day clock, staying in [0, 1)
pub fn advance_time_of_day(time_of_day: f32, delta: f32, day_duration_secs: f32) -> f32 {
    if day_duration_secs.is_nan() || day_duration_secs <= 0.0 {
        return time_of_day;
    }
    let t = (time_of_day + delta / day_duration_secs).rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0
    if t >= 1.0 { 0.0 } else { t }
}

impl Game {
    /// One frame, in order: clock and hazards, destruction, deadlines
    pub fn frame(&mut self, delta: f32, player_pos: Vec3) {
        self.update_time(delta, player_pos);
        self.tick_destruction(delta, player_pos);
        self.check_powerups();
    }

    /// Advance the day clock and roll for hazards around the player
    pub fn update_time(&mut self, delta: f32, player_pos: Vec3) {
        if !self.state.is_playing() || self.state.is_paused || !delta.is_finite() || delta < 0.0 {
            return;
        }

        self.state.time_of_day = advance_time_of_day(
            self.state.time_of_day,
            delta,
            self.state.day_duration_secs,
        );

        if self.state.is_night() {
            if self.state.mobs.len() < MAX_MOBS && self.rng.random_bool(MOB_SPAWN_CHANCE) {
                self.spawn_mob(player_pos);
            }
        } else if !self.state.mobs.is_empty() && self.rng.random_bool(MOB_DESPAWN_CHANCE) {
            let idx = self.rng.random_range(0..self.state.mobs.len());
            let mob = self.state.mobs.swap_remove(idx);
            log::debug!("{:?} {} wandered off at dawn", mob.kind, mob.id);
        }

        let max = self.state.max_health;
        if self.state.health > max {
            self.state.health = (self.state.health - OVERHEAL_DECAY_PER_SEC * delta).max(max);
        }

        let now = self.now();
        self.state.loose_logs.retain(|l| !l.is_expired(now));
    }

    /// Spawn a wolf or bear 30-50 units from the player
    pub fn spawn_mob(&mut self, player_pos: Vec3) {
        if !self.state.is_playing() || self.state.mobs.len() >= MAX_MOBS {
            return;
        }
        let theta = self.rng.random_range(0.0..TAU);
        let dist = self.rng.random_range(MOB_SPAWN_MIN_DIST..MOB_SPAWN_MAX_DIST);
        let spot = crate::ground_offset(player_pos, dist, theta);
        let kind = if self.rng.random_bool(0.5) {
            MobKind::Wolf
        } else {
            MobKind::Bear
        };
        let id = self.state.next_entity_id();
        let spawned_at = self.now();
        self.state.mobs.push(Mob {
            id,
            kind,
            pos: Vec3::new(spot.x, self.terrain.height(spot.x, spot.z), spot.z),
            spawned_at,
        });
        log::debug!("{:?} {} spawned {:.1} units from the player", kind, id, dist);
    }

    pub fn remove_mob(&mut self, id: u32) {
        if !self.state.is_playing() {
            return;
        }
        self.state.mobs.retain(|m| m.id != id);
    }

    /// Expire powerups past their deadline and combos left idle past their
    /// window
    pub fn check_powerups(&mut self) {
        if !self.state.is_playing() || self.state.is_paused {
            return;
        }
        let now = self.now();
        for kind in [PowerupKind::Magnet, PowerupKind::MegaChomp] {
            let powerup = self.state.powerups.get_mut(kind);
            if powerup.active && now > powerup.end_time {
                powerup.active = false;
                log::info!("{:?} wore off", kind);
            }
        }

        let combo = &self.state.combo;
        if combo.active && now - combo.last_log_time > combo.window_ms() {
            self.end_combo();
        }
    }

    pub fn is_night(&self) -> bool {
        self.state.is_night()
    }

    /// Radius within which the host should collect logs
    pub fn collection_radius(&self) -> f32 {
        if self.state.powerups.magnet.active {
            BASE_COLLECTION_RADIUS * 2.0
        } else {
            BASE_COLLECTION_RADIUS
        }
    }

    /// Radius within which the host should register tree bites
    pub fn chomp_radius(&self) -> f32 {
        if self.state.powerups.mega_chomp.active {
            BASE_CHOMP_RADIUS * 2.0
        } else {
            BASE_CHOMP_RADIUS
        }
    }

    /// Milliseconds until the running combo lapses, if one is running
    pub fn combo_time_remaining(&self) -> Option<f64> {
        let combo = &self.state.combo;
        if !combo.active {
            return None;
        }
        let elapsed = if self.state.is_paused {
            // A log taken during the pause has had no running time yet
            (self.state.last_pause_start_time - combo.last_log_time).max(0.0)
        } else {
            self.now() - combo.last_log_time
        };
        Some((combo.window_ms() - elapsed).max(0.0))
    }
}
