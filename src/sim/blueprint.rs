//! Blueprint catalog and unlock rules
//!
//! Ten fixed structure templates. Each template's shape is a list of log
//! offsets relative to the placement point; the number of logs in the shape
//! equals the wood cost.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{FIRST_BLUEPRINT_LOGS, STRUCTURE_HEALTH_PER_COST, UNLOCK_THRESHOLDS};

/// Log length along its axis
const LOG_LENGTH: f32 = 2.0;
/// Vertical spacing between stacked logs
const LOG_STACK: f32 = 0.4;
const LOG_RADIUS: f32 = 0.2;

/// One log of a structure, relative to the structure origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogOffset {
    pub position: Vec3,
    /// Euler angles (radians)
    pub rotation: Vec3,
}

impl LogOffset {
    fn lying_x(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            rotation: Vec3::new(0.0, 0.0, FRAC_PI_2),
        }
    }

    fn lying_z(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            rotation: Vec3::new(FRAC_PI_2, 0.0, 0.0),
        }
    }
}

/// Buildable structure template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: usize,
    pub name: String,
    /// Wood cost
    pub cost: u32,
    pub logs: Vec<LogOffset>,
    pub unlocked: bool,
    /// Score needed to unlock (ignored for the first blueprint)
    pub unlock_score: u64,
}

impl Blueprint {
    /// Health of a structure built from this template
    pub fn structure_health(&self) -> f32 {
        self.cost as f32 * STRUCTURE_HEALTH_PER_COST
    }
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Pile,
    Wall { per_row: u32 },
    Ring { radius: f32 },
    Dome,
    Cabin,
}

const CATALOG: [(&str, u32, Shape); 10] = [
    ("Log Pile", 7, Shape::Pile),
    ("Beaver Dam", 12, Shape::Wall { per_row: 4 }),
    ("Fence Ring", 18, Shape::Ring { radius: 3.0 }),
    ("Lodge", 24, Shape::Dome),
    ("Log Cabin", 30, Shape::Cabin),
    ("Long Dam", 40, Shape::Wall { per_row: 8 }),
    ("Watchtower", 52, Shape::Cabin),
    ("Great Lodge", 66, Shape::Dome),
    ("Palisade", 82, Shape::Ring { radius: 6.0 }),
    ("Grand Dam", 100, Shape::Wall { per_row: 10 }),
];

/// Build the fixed catalog, everything locked
pub fn generate_blueprints() -> Vec<Blueprint> {
    CATALOG
        .iter()
        .enumerate()
        .map(|(id, &(name, cost, shape))| Blueprint {
            id,
            name: name.to_string(),
            cost,
            logs: shape_logs(shape, cost),
            unlocked: false,
            unlock_score: UNLOCK_THRESHOLDS[id],
        })
        .collect()
}

fn shape_logs(shape: Shape, count: u32) -> Vec<LogOffset> {
    match shape {
        Shape::Pile => pile(count),
        Shape::Wall { per_row } => wall(count, per_row),
        Shape::Ring { radius } => ring(count, radius),
        Shape::Dome => dome(count),
        Shape::Cabin => cabin(count),
    }
}

/// Rows that narrow by one log per layer
fn pile(count: u32) -> Vec<LogOffset> {
    let mut logs = Vec::with_capacity(count as usize);
    let mut row_width = 1;
    while row_width * (row_width + 1) / 2 < count {
        row_width += 1;
    }
    let mut layer = 0;
    while (logs.len() as u32) < count {
        let width = row_width.saturating_sub(layer).max(1);
        let y = LOG_RADIUS + layer as f32 * LOG_STACK;
        for i in 0..width {
            if logs.len() as u32 == count {
                break;
            }
            let z = (i as f32 - (width - 1) as f32 / 2.0) * LOG_RADIUS * 2.0;
            logs.push(LogOffset::lying_x(0.0, y, z));
        }
        layer += 1;
    }
    logs
}

/// Straight wall of end-to-end logs
fn wall(count: u32, per_row: u32) -> Vec<LogOffset> {
    let per_row = per_row.max(1);
    (0..count)
        .map(|i| {
            let row = i / per_row;
            let col = i % per_row;
            // Stagger alternate rows like brickwork
            let stagger = if row % 2 == 1 { LOG_LENGTH / 2.0 } else { 0.0 };
            let x = (col as f32 - (per_row - 1) as f32 / 2.0) * LOG_LENGTH + stagger;
            LogOffset::lying_x(x, LOG_RADIUS + row as f32 * LOG_STACK, 0.0)
        })
        .collect()
}

/// Upright posts around a circle
fn ring(count: u32, radius: f32) -> Vec<LogOffset> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * TAU;
            LogOffset {
                position: Vec3::new(radius * angle.cos(), LOG_LENGTH / 2.0, radius * angle.sin()),
                rotation: Vec3::ZERO,
            }
        })
        .collect()
}

/// Rings of eight logs shrinking toward the top
fn dome(count: u32) -> Vec<LogOffset> {
    const PER_LAYER: u32 = 8;
    (0..count)
        .map(|i| {
            let layer = i / PER_LAYER;
            let slot = i % PER_LAYER;
            let radius = (2.5 - layer as f32 * 0.3).max(0.4);
            let angle = (slot as f32 + layer as f32 * 0.5) / PER_LAYER as f32 * TAU;
            LogOffset {
                position: Vec3::new(
                    radius * angle.cos(),
                    LOG_RADIUS + layer as f32 * LOG_STACK,
                    radius * angle.sin(),
                ),
                // Lie tangent to the ring
                rotation: Vec3::new(0.0, -angle, FRAC_PI_2),
            }
        })
        .collect()
}

/// Log-cabin corners: alternating x and z pairs
fn cabin(count: u32) -> Vec<LogOffset> {
    let half = LOG_LENGTH / 2.0 - LOG_RADIUS;
    (0..count)
        .map(|i| {
            let layer = i / 4;
            let y = LOG_RADIUS + layer as f32 * LOG_STACK;
            match i % 4 {
                0 => LogOffset::lying_x(0.0, y, -half),
                1 => LogOffset::lying_x(0.0, y, half),
                2 => LogOffset::lying_z(-half, y + LOG_RADIUS, 0.0),
                _ => LogOffset::lying_z(half, y + LOG_RADIUS, 0.0),
            }
        })
        .collect()
}

/// One unlock pass after a score or log-count change.
///
/// The first blueprint unlocks on total logs collected; the rest compare
/// their threshold against `score` as it stood when the pass began. Bonuses
/// awarded for unlocks in this pass are added by the caller afterwards, so an
/// unlock that only becomes reachable through another unlock's bonus waits for
/// the next pass.
///
/// Returns the IDs unlocked, ascending.
pub fn sweep_unlocks(blueprints: &mut [Blueprint], score: u64, total_logs: u32) -> Vec<usize> {
    let mut unlocked = Vec::new();
    for bp in blueprints.iter_mut() {
        if bp.unlocked {
            continue;
        }
        let eligible = if bp.id == 0 {
            total_logs >= FIRST_BLUEPRINT_LOGS
        } else {
            score >= bp.unlock_score
        };
        if eligible {
            bp.unlocked = true;
            unlocked.push(bp.id);
        }
    }
    unlocked
}
