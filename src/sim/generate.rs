//! Initial world population
//!
//! Runs once per session start. Positions are rejection-sampled on land inside
//! the world radius, outside the spawn clearing.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::state::{Boulder, Tree, TreeSize};
use crate::consts::SPAWN_CLEARING_RADIUS;
use crate::terrain::Terrain;

/// Attempts per requested entity before giving up on it
const MAX_ATTEMPTS_FACTOR: u32 = 10;
/// Trees keep this much room from each other (squared)
const MIN_TREE_SPACING_SQ: f32 = 2.5 * 2.5;

/// Random point on land inside the annulus, snapped to the ground
fn sample_land_point<R: Rng>(
    rng: &mut R,
    terrain: &dyn Terrain,
    world_radius: f32,
) -> Option<Vec3> {
    let theta = rng.random_range(0.0..TAU);
    // sqrt for uniform area density
    let inner = SPAWN_CLEARING_RADIUS / world_radius;
    let t: f32 = rng.random_range(inner * inner..1.0);
    let r = t.sqrt() * world_radius;
    let (x, z) = (r * theta.cos(), r * theta.sin());
    terrain
        .is_on_land(x, z)
        .then(|| Vec3::new(x, terrain.height(x, z), z))
}

fn roll_tree_size<R: Rng>(rng: &mut R) -> TreeSize {
    match rng.random_range(0..100) {
        0..50 => TreeSize::Small,
        50..85 => TreeSize::Medium,
        _ => TreeSize::Large,
    }
}

/// Trees with IDs `0..n`. May return fewer than `count` on a watery map.
pub fn generate_trees<R: Rng>(
    rng: &mut R,
    terrain: &dyn Terrain,
    count: u32,
    world_radius: f32,
) -> Vec<Tree> {
    let mut trees: Vec<Tree> = Vec::with_capacity(count as usize);
    let mut attempts = 0;
    while (trees.len() as u32) < count && attempts < count * MAX_ATTEMPTS_FACTOR {
        attempts += 1;
        let Some(pos) = sample_land_point(rng, terrain, world_radius) else {
            continue;
        };
        let crowded = trees
            .iter()
            .any(|t| crate::ground_distance_sq(t.pos, pos) < MIN_TREE_SPACING_SQ);
        if crowded {
            continue;
        }
        let size = roll_tree_size(rng);
        trees.push(Tree::new(trees.len() as u32, pos, size));
    }
    if (trees.len() as u32) < count {
        log::warn!("Placed {} of {} trees", trees.len(), count);
    }
    trees
}

/// Boulders with IDs `0..n`
pub fn generate_boulders<R: Rng>(
    rng: &mut R,
    terrain: &dyn Terrain,
    count: u32,
    world_radius: f32,
) -> Vec<Boulder> {
    let mut boulders = Vec::with_capacity(count as usize);
    let mut attempts = 0;
    while (boulders.len() as u32) < count && attempts < count * MAX_ATTEMPTS_FACTOR {
        attempts += 1;
        if let Some(pos) = sample_land_point(rng, terrain, world_radius) {
            boulders.push(Boulder {
                id: boulders.len() as u32,
                pos,
                scale: rng.random_range(0.6..2.2),
                yaw: rng.random_range(0.0..TAU),
            });
        }
    }
    boulders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FlatTerrain;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn trees_are_deterministic_per_seed() {
        let terrain = FlatTerrain(2.0);
        let a = generate_trees(&mut Pcg32::seed_from_u64(5), &terrain, 20, 80.0);
        let b = generate_trees(&mut Pcg32::seed_from_u64(5), &terrain, 20, 80.0);
        assert_eq!(a.len(), 20);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.size, y.size);
        }
    }

    #[test]
    fn trees_avoid_spawn_clearing_and_sit_on_ground() {
        let terrain = FlatTerrain(3.0);
        let trees = generate_trees(&mut Pcg32::seed_from_u64(11), &terrain, 40, 60.0);
        for (i, tree) in trees.iter().enumerate() {
            assert_eq!(tree.id, i as u32);
            assert_eq!(tree.pos.y, 3.0);
            let r2 = tree.pos.x * tree.pos.x + tree.pos.z * tree.pos.z;
            assert!(r2 >= SPAWN_CLEARING_RADIUS * SPAWN_CLEARING_RADIUS - 1e-3);
            assert!(r2 <= 60.0 * 60.0 + 1e-3);
            assert!(!tree.is_felled);
            assert_eq!(tree.health, tree.size.max_health());
        }
    }

    #[test]
    fn nothing_spawns_underwater() {
        let terrain = FlatTerrain(-1.0);
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(generate_trees(&mut rng, &terrain, 10, 50.0).is_empty());
        assert!(generate_boulders(&mut rng, &terrain, 10, 50.0).is_empty());
    }

    #[test]
    fn boulders_fill_requested_count() {
        let terrain = FlatTerrain(1.0);
        let boulders = generate_boulders(&mut Pcg32::seed_from_u64(8), &terrain, 15, 70.0);
        assert_eq!(boulders.len(), 15);
        assert!(boulders.iter().all(|b| (0.6..2.2).contains(&b.scale)));
    }
}
