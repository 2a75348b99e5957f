//! Enemy kinds and their behavior
//!
//! Each kind picks fixed motion, fire-delay and shot functions at spawn
//! time. Dispatch is a `match` on the kind; per-enemy parameters (weave
//! sign, burst counters) live on the enemy itself.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::ExplosionKind;
use super::state::{Bullet, BulletOwner, SpawnEvent};
use crate::audio::SoundEffect;
use crate::consts::*;

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Drone,
    Bomber,
    Sniper,
    Large1,
    Large2,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Drone,
        EnemyKind::Bomber,
        EnemyKind::Sniper,
        EnemyKind::Large1,
        EnemyKind::Large2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EnemyKind::Drone => "drone",
            EnemyKind::Bomber => "bomber",
            EnemyKind::Sniper => "sniper",
            EnemyKind::Large1 => "large1",
            EnemyKind::Large2 => "large2",
        }
    }

    pub fn max_hp(&self) -> u32 {
        match self {
            EnemyKind::Drone => 1,
            EnemyKind::Bomber => 2,
            EnemyKind::Sniper => 4,
            EnemyKind::Large1 | EnemyKind::Large2 => 20,
        }
    }

    pub fn shoots(&self) -> bool {
        !matches!(self, EnemyKind::Drone)
    }

    pub fn is_large(&self) -> bool {
        matches!(self, EnemyKind::Large1 | EnemyKind::Large2)
    }

    pub fn damage_sound(&self) -> SoundEffect {
        SoundEffect::Damage1
    }

    pub fn death_sound(&self) -> SoundEffect {
        match self {
            EnemyKind::Drone => SoundEffect::Damage1,
            _ if self.is_large() => SoundEffect::DestroyedLarge,
            _ => SoundEffect::DestroyedSmall,
        }
    }

    pub fn explosion(&self) -> ExplosionKind {
        match self {
            EnemyKind::Drone => ExplosionKind::Small,
            _ => ExplosionKind::Regular,
        }
    }

    pub fn shoot_sound(&self) -> SoundEffect {
        match self {
            EnemyKind::Sniper => SoundEffect::Shoot3,
            _ if self.is_large() => SoundEffect::Shoot4,
            _ => SoundEffect::Shoot2,
        }
    }
}

/// Burst fire counters: one long gap, then `count - 1` short ones
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub high: f32,
    pub low: f32,
    pub count: u32,
    pub state: u32,
}

impl Burst {
    fn next_delay(&mut self) -> f32 {
        self.state += 1;
        if self.state == 1 {
            return self.high;
        }
        if self.state >= self.count {
            self.state = 0;
        }
        self.low
    }

    /// Like `next_delay`, but only every third step waits; the others
    /// fire immediately so shots come out in threes
    fn next_delay_triple(&mut self) -> f32 {
        self.state += 1;
        if self.state == 1 {
            return self.high;
        }
        if self.state >= self.count {
            self.state = 0;
        }
        if self.state % 3 != 1 {
            return 0.0;
        }
        self.low
    }
}

/// An enemy ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Spawn position; curves are offsets from here
    pub origin: Vec2,
    /// Ms since spawn
    pub age: f32,
    /// Descent rate (tiles per ms)
    pub dy: f32,
    /// Drone lateral velocity and the direction it is steering toward
    pub dx: f32,
    pub desired_dx: f32,
    /// Weave amplitude sign and angular rate
    pub xscale: f32,
    pub xperiod: f32,
    pub hp: u32,
    pub max_hp: u32,
    pub fire_delay: f32,
    pub fire_countdown: f32,
    pub burst: Option<Burst>,
    pub bullet_speed: f32,
    /// Age at which the enemy was last hit
    pub blink_at: Option<f32>,
}

impl Enemy {
    /// Build an enemy for a spawn event. Large ships pick a weave direction from `rng`.
    pub fn spawn(event: &SpawnEvent, rng: &mut impl Rng) -> Self {
        let kind = event.kind;
        let pos = Vec2::new(event.x, ENEMY_SPAWN_Y);
        let left_half = pos.x < BOARD_W / 2.0;
        let mut e = Self {
            kind,
            pos,
            origin: pos,
            age: 0.0,
            dy: ENEMY_DESCENT,
            dx: 0.0,
            desired_dx: 0.0,
            xscale: if left_half { 1.0 } else { -1.0 },
            xperiod: 0.001,
            hp: kind.max_hp(),
            max_hp: kind.max_hp(),
            fire_delay: 0.0,
            fire_countdown: 0.0,
            burst: None,
            bullet_speed: ENEMY_BULLET_SPEED,
            blink_at: None,
        };

        match kind {
            EnemyKind::Drone => {
                e.desired_dx = if pos.x > BOARD_W / 2.0 { -DRONE_SPEED } else { DRONE_SPEED };
                e.dx = e.desired_dx;
            }
            EnemyKind::Bomber => {
                // Fires at the extremes of its weave
                e.fire_delay = PI / e.xperiod;
                e.fire_countdown = e.fire_delay / 4.0 - event.offset;
            }
            EnemyKind::Sniper => {
                // Fires once per full weave, near the apex of its bob
                e.fire_delay = PI * 2.0 / e.xperiod;
                e.fire_countdown = e.fire_delay * 3.0 / 4.0 + 250.0;
            }
            EnemyKind::Large1 | EnemyKind::Large2 => {
                e.xscale = if rng.random_range(0..2) == 0 { -1.0 } else { 1.0 };
                e.xperiod = 0.0001;
                e.burst = Some(if kind == EnemyKind::Large1 {
                    e.dy *= 0.25;
                    Burst {
                        high: 3000.0,
                        low: 120.0,
                        count: 10,
                        state: 0,
                    }
                } else {
                    e.dy *= 0.20;
                    Burst {
                        high: 1500.0,
                        low: 300.0,
                        count: 12,
                        state: 0,
                    }
                });
                e.fire_countdown = e.next_fire_delay();
            }
        }
        e
    }

    /// Advance age and position along this kind's curves
    pub fn advance(&mut self, dt: f32) {
        self.age += dt;
        self.move_x(dt);
        self.move_y();
    }

    fn move_x(&mut self, dt: f32) {
        match self.kind {
            EnemyKind::Drone => {
                // Ping-pong between the edges, easing through each turn
                if (self.desired_dx > 0.0 && self.pos.x >= BOARD_W - DRONE_X_PAD)
                    || (self.desired_dx < 0.0 && self.pos.x <= DRONE_X_PAD)
                {
                    self.desired_dx = -self.desired_dx;
                }
                self.dx = crate::accelerate(self.dx, self.desired_dx, dt, DRONE_ACCEL);
                self.pos.x += self.dx * dt;
            }
            _ => {
                self.pos.x = self.origin.x + (self.age * self.xperiod).sin() * self.xscale;
            }
        }
    }

    fn move_y(&mut self) {
        let linear = self.origin.y + self.age * self.dy;
        self.pos.y = match self.kind {
            EnemyKind::Sniper => linear - (self.age * 0.001).cos(),
            _ => linear,
        };
    }

    /// Delay until the next shot; advances burst counters
    pub fn next_fire_delay(&mut self) -> f32 {
        match (self.kind, self.burst.as_mut()) {
            (EnemyKind::Large1, Some(burst)) => burst.next_delay(),
            (EnemyKind::Large2, Some(burst)) => burst.next_delay_triple(),
            _ => self.fire_delay,
        }
    }

    /// Velocity of the next shot
    pub fn shot_velocity(&self, player_pos: Vec2) -> Vec2 {
        let speed = self.bullet_speed;
        match self.kind {
            EnemyKind::Sniper => {
                let to_player = player_pos - self.pos;
                let mag = to_player.length();
                if mag > 0.001 {
                    to_player / mag * speed
                } else {
                    Vec2::new(0.0, speed)
                }
            }
            EnemyKind::Large2 => {
                let idx = self.burst.map_or(0, |b| b.state % 3);
                if idx == 0 {
                    Vec2::new(0.0, speed)
                } else {
                    let side = idx as f32 * 2.0 - 3.0;
                    Vec2::new(speed * SPREAD_ANGLE.cos() * side, speed * SPREAD_ANGLE.sin())
                }
            }
            _ => Vec2::new(0.0, speed),
        }
    }

    /// Held fire: hugging a side edge or still above the board
    fn can_fire(&self) -> bool {
        self.pos.x > ENEMY_FIRE_EDGE && self.pos.x < BOARD_W - ENEMY_FIRE_EDGE && self.pos.y >= 0.0
    }

    /// Consume `dt` against the fire countdown, pushing every shot due
    /// this tick. Returns the number of shots fired.
    pub fn fire(&mut self, dt: f32, player_pos: Vec2, bullets: &mut Vec<Bullet>) -> u32 {
        if !self.kind.shoots() {
            return 0;
        }
        let mut shots = 0;
        let mut rdt = dt;
        while rdt >= self.fire_countdown {
            rdt -= self.fire_countdown;
            self.fire_countdown = self.next_fire_delay();
            if self.can_fire() {
                let vel = self.shot_velocity(player_pos);
                bullets.push(Bullet::new(self.pos, vel, BulletOwner::Enemy));
                shots += 1;
            }
        }
        self.fire_countdown -= rdt;
        shots
    }

    /// Apply one bullet hit. Returns true if this destroyed the enemy.
    pub fn hit(&mut self) -> bool {
        self.hp = self.hp.saturating_sub(1);
        self.blink_at = Some(self.age);
        self.hp == 0
    }

    /// Fell off the bottom of the board
    pub fn exited(&self) -> bool {
        self.pos.y > BOARD_H + ENEMY_EXIT_MARGIN
    }
}
