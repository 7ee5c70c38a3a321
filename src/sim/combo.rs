//! Log collection: combo multiplier, scoring, powerups, unlocks
//!
//! Placed logs and loose logs go through the same reward path; the only
//! difference is which list the log is taken from.

use super::blueprint::sweep_unlocks;
use super::game::Game;
use super::state::*;
use crate::consts::*;

/// Anything the player can pick up as wood
pub trait Collectible {
    fn id(&self) -> u32;
    fn created_at(&self) -> f64;
}

impl Collectible for Log {
    fn id(&self) -> u32 {
        self.id
    }
    fn created_at(&self) -> f64 {
        self.created_at
    }
}

impl Collectible for LooseLog {
    fn id(&self) -> u32 {
        self.id
    }
    fn created_at(&self) -> f64 {
        self.created_at
    }
}

/// Remove `id` from `source` if it exists and is past its invulnerability
/// window
fn take_collectible<T: Collectible>(source: &mut Vec<T>, id: u32, now: f64) -> bool {
    let Some(idx) = source.iter().position(|e| e.id() == id) else {
        return false;
    };
    if now - source[idx].created_at() < LOG_INVULNERABLE_MS {
        log::debug!("Log {} still invulnerable", id);
        return false;
    }
    source.remove(idx);
    true
}

/// Result of advancing the combo by one log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboStep {
    /// Bonus for an elevated multiplier plus any level-up award
    pub points: u64,
    pub leveled_up: bool,
}

/// Count one collected log against the combo at time `now`
pub fn advance_combo(combo: &mut ComboState, now: f64) -> ComboStep {
    if !combo.active {
        *combo = ComboState {
            active: true,
            multiplier: 1,
            start_time: now,
            level_start_time: now,
            logs_collected: 0,
            logs_since_last_level: 0,
            last_log_time: now,
        };
    }

    combo.logs_collected += 1;
    combo.logs_since_last_level += 1;
    combo.last_log_time = now;

    let mut points = combo.multiplier.saturating_sub(1) as u64;

    let leveled_up = match combo.multiplier {
        1 => {
            combo.logs_collected >= COMBO_LOGS_PER_LEVEL
                && now - combo.start_time <= COMBO_WINDOW_START_MS
        }
        m if m < MAX_MULTIPLIER => {
            combo.logs_since_last_level >= COMBO_LOGS_PER_LEVEL
                && now - combo.level_start_time <= combo.window_ms()
        }
        _ => false,
    };

    if leveled_up {
        combo.multiplier += 1;
        // +1 into x2, +2 into x3, +3 into x4
        points += (combo.multiplier - 1) as u64;
        combo.logs_since_last_level = 0;
        combo.level_start_time = now;
    } else if combo.multiplier >= 2 && now - combo.level_start_time > combo.window_ms() {
        // Too slow for the next level: restart progress, keep the multiplier
        combo.logs_since_last_level = 1;
        combo.level_start_time = now;
    }

    ComboStep { points, leveled_up }
}

impl Game {
    /// Collect a player-placed log
    pub fn collect_log(&mut self, id: u32) {
        if !self.state.is_playing() {
            return;
        }
        let now = self.now();
        if take_collectible(&mut self.state.logs, id, now) {
            self.reward_collection(now);
        }
    }

    /// Collect a loose log from a felled tree or a destroyed structure
    pub fn collect_loose_log(&mut self, id: u32) {
        if !self.state.is_playing() {
            return;
        }
        let now = self.now();
        if take_collectible(&mut self.state.loose_logs, id, now) {
            self.reward_collection(now);
        }
    }

    /// Drop the current streak without touching lifetime counters
    pub fn end_combo(&mut self) {
        if self.state.combo.active {
            log::debug!("Combo ended at x{}", self.state.combo.multiplier);
        }
        self.state.combo.end();
    }

    fn reward_collection(&mut self, now: f64) {
        let step = advance_combo(&mut self.state.combo, now);
        let multiplier = self.state.combo.multiplier;
        let mut points = step.points;

        if step.leveled_up {
            log::debug!("Combo level up: x{}", multiplier);
            self.play(SoundEffect::LevelUp);
        }
        if multiplier >= 3 {
            self.activate_powerup(PowerupKind::Magnet, now);
        }
        if multiplier >= MAX_MULTIPLIER {
            self.activate_powerup(PowerupKind::MegaChomp, now);
        }

        self.state.total_logs_collected += 1;
        let total = self.state.total_logs_collected;
        if total % MILESTONE_INTERVAL == 0 {
            points += MILESTONE_BONUS;
            self.raise_notification(Notification::Milestone { total_logs: total });
        }

        self.state.score += points;
        self.state.wood_count = self.state.wood_count.saturating_add(multiplier);
        self.play(SoundEffect::Chomp);

        let unlocked = sweep_unlocks(&mut self.state.blueprints, self.state.score, total);
        for blueprint_id in unlocked {
            self.state.score += UNLOCK_BONUS;
            log::info!("Blueprint {} unlocked", blueprint_id);
            self.raise_notification(Notification::BlueprintUnlocked { blueprint_id });
            self.play(SoundEffect::Success);
        }
    }

    fn activate_powerup(&mut self, kind: PowerupKind, now: f64) {
        let duration = match kind {
            PowerupKind::Magnet => MAGNET_DURATION_MS,
            PowerupKind::MegaChomp => MEGA_CHOMP_DURATION_MS,
        };
        let powerup = self.state.powerups.get_mut(kind);
        if powerup.active {
            return;
        }
        powerup.active = true;
        powerup.end_time = now + duration;
        let first_time = !powerup.introduced;
        powerup.introduced = true;

        log::info!("{:?} active until {}", kind, now + duration);
        if first_time {
            self.raise_notification(Notification::PowerupUnlocked { powerup: kind });
        }
    }
}
