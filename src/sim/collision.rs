//! Circle-overlap collision
//!
//! Everything in the playfield is a point with a squared contact radius.
//! Contact is inclusive: centers exactly at the threshold distance touch.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Bullet, BulletOwner};

/// Squared contact distances, independently tunable per pairing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionRadii {
    pub player_vs_bullet_sq: f32,
    pub enemy_vs_bullet_sq: f32,
    pub player_vs_enemy_sq: f32,
}

impl Default for CollisionRadii {
    fn default() -> Self {
        Self {
            player_vs_bullet_sq: 0.25 * 0.25,
            enemy_vs_bullet_sq: 0.25 * 0.25,
            player_vs_enemy_sq: 0.25 * 0.25,
        }
    }
}

/// Whether two points are within `radius_sq` (squared) of each other
#[inline]
pub fn touching(a: Vec2, b: Vec2, radius_sq: f32) -> bool {
    let d = a - b;
    d.x * d.x + d.y * d.y <= radius_sq
}

/// Remove every bullet fired by `owner` that touches `center`, returning how many.
///
/// Removal swaps the last bullet into the hole, so bullet order is not kept.
pub fn take_bullet_hits(
    bullets: &mut Vec<Bullet>,
    center: Vec2,
    radius_sq: f32,
    owner: BulletOwner,
) -> u32 {
    let mut hits = 0;
    let mut jj = bullets.len();
    while jj > 0 {
        jj -= 1;
        let b = &bullets[jj];
        if b.owner != owner {
            continue;
        }
        if touching(b.pos, center, radius_sq) {
            bullets.swap_remove(jj);
            hits += 1;
        }
    }
    hits
}
