//! Player ship update: card effects, steering, collisions and weapons

use glam::Vec2;

use super::cards::Weapon;
use super::collision::{take_bullet_hits, touching};
use super::deck::EffectTotals;
use super::events::{ExplosionKind, GameEvent};
use super::state::{Bullet, BulletOwner, SimulationState};
use super::tick::TickInput;
use crate::audio::SoundEffect;
use crate::consts::*;

/// Advance the player by `dt` ms
pub fn update_player(state: &mut SimulationState, input: &TickInput, dt: f32) {
    let mut steer = input.steer();

    // Cards only run while the ship is alive
    let totals = if state.player_dead {
        EffectTotals::default()
    } else {
        state.deck.advance_effects(dt, &mut state.rng)
    };
    steer.x += totals.dx;
    state.score.damage = state.score.damage.saturating_sub(totals.heal);
    for _ in 0..totals.draws {
        state.events.push(GameEvent::sound(SoundEffect::Draw3));
    }
    state.player.shield = totals.shield;
    state.player.weapons = totals.weapons;

    if !state.player_dead {
        move_player(state, steer, dt);
        if player_collisions(state) {
            take_hit(state);
        }
    }

    fire_weapons(state, dt);

    let p = &mut state.player;
    if dt >= p.hit_cooldown {
        p.hit_cooldown = 0.0;
    } else {
        p.hit_cooldown -= dt;
    }
}

/// Ease the ship's velocity toward `steer` and keep it in the bottom half
fn move_player(state: &mut SimulationState, steer: Vec2, dt: f32) {
    let p = &mut state.player;
    p.vel.x = crate::accelerate(p.vel.x, steer.x, dt, PLAYER_ACCEL);
    p.vel.y = crate::accelerate(p.vel.y, steer.y, dt, PLAYER_ACCEL);

    p.pos += p.vel * dt * PLAYER_SPEED;
    p.pos.x = crate::clamp(p.pos.x, PLAYER_BORDER_PAD, BOARD_W - PLAYER_BORDER_PAD);
    p.pos.y = crate::clamp(
        p.pos.y,
        BOARD_H / 2.0 + PLAYER_BORDER_PAD,
        BOARD_H - PLAYER_BORDER_PAD,
    );
}

/// Remove enemy bullets and rammed enemies touching the ship (or its
/// shield). Returns whether anything hit.
fn player_collisions(state: &mut SimulationState) -> bool {
    let pos = state.player.pos;
    let shield_sq = state.player.shield * state.player.shield;

    let bullet_dist = state.radii.player_vs_bullet_sq.max(shield_sq);
    let mut hit = take_bullet_hits(&mut state.bullets, pos, bullet_dist, BulletOwner::Enemy) > 0;

    let enemy_dist = state.radii.player_vs_enemy_sq.max(shield_sq);
    let mut jj = state.enemies.len();
    while jj > 0 {
        jj -= 1;
        if !touching(state.enemies[jj].pos, pos, enemy_dist) {
            continue;
        }
        let enemy = state.enemies.swap_remove(jj);
        let money = state.kill_reward(enemy.max_hp);
        state.score.kills += 1;
        state.add_money(enemy.pos, money);
        state.events.push(GameEvent::EnemyKilled {
            kind: enemy.kind,
            pos: enemy.pos,
            money,
        });
        hit = true;
    }
    hit
}

/// Resolve a hit: shields absorb everything, otherwise a guard card or
/// the hull takes it (once per blink window)
fn take_hit(state: &mut SimulationState) {
    if state.player.shield > 0.0 {
        state.events.push(GameEvent::sound(SoundEffect::ShieldBlock));
        state.events.push(GameEvent::ShieldBlock);
        return;
    }
    if state.player.hit_cooldown > 0.0 {
        return;
    }

    let blocked = state.deck.consume_guard();
    if blocked {
        state.events.push(GameEvent::sound(SoundEffect::ReactBlock));
    } else {
        state.events.push(GameEvent::sound(SoundEffect::DamagePlayer));
        state.score.damage += 1;
        if state.score.damage == state.player.max_health {
            log::info!("Player destroyed after {} kills", state.score.kills);
            state.events.push(GameEvent::sound(SoundEffect::DestroyedLarge));
            state.events.push(GameEvent::Explosion {
                kind: ExplosionKind::Player,
                pos: state.player.pos,
            });
            state.events.push(GameEvent::PlayerDestroyed);
        }
    }
    state.events.push(GameEvent::PlayerHit { blocked });
    state.player.hit_was_blocked = blocked;
    state.player.hit_cooldown = PLAYER_HIT_BLINK_TIME;
}

/// Run every weapon timer, firing as many shots as fit in `dt`.
///
/// Weapons only fire while something is left to shoot. An idle or locked
/// weapon parks its timer at zero so it fires the moment it is enabled.
pub fn fire_weapons(state: &mut SimulationState, dt: f32) {
    let firing = !state.player_dead && state.hostiles_remain();
    for weapon in Weapon::ALL {
        let ii = weapon.index();
        let active = firing && state.player.weapons.contains(weapon);
        let mut rdt = dt;
        while rdt >= state.player.fire_countdowns[ii] {
            if !active {
                rdt = 0.0;
                state.player.fire_countdowns[ii] = 0.0;
                break;
            }
            rdt -= state.player.fire_countdowns[ii];
            state.player.fire_countdowns[ii] = weapon.fire_delay();
            fire_weapon(state, weapon, rdt - dt);
        }
        state.player.fire_countdowns[ii] -= rdt;
    }
}

/// Spawn one volley. `since` is the (non-positive) time from the end of
/// this tick back to the moment of firing; the bullet update then carries
/// each shot the rest of the way.
fn fire_weapon(state: &mut SimulationState, weapon: Weapon, since: f32) {
    let origin = state.player.pos;
    let speed = PLAYER_BULLET_SPEED;
    let bullets = &mut state.bullets;
    let mut add = |vel: Vec2, offs: Vec2| {
        bullets.push(Bullet::new(origin + offs + vel * since, vel, BulletOwner::Player));
    };

    let sound = match weapon {
        Weapon::Regular => {
            add(Vec2::new(0.0, -speed), Vec2::ZERO);
            Some((SoundEffect::Shoot1, 0.33))
        }
        Weapon::Spread => {
            let dx = speed * SPREAD_ANGLE.cos();
            let dy = -speed * SPREAD_ANGLE.sin();
            add(Vec2::new(-dx, dy), Vec2::ZERO);
            add(Vec2::new(dx, dy), Vec2::ZERO);
            Some((SoundEffect::Shoot1, 1.0))
        }
        Weapon::Rapid => {
            let vel = Vec2::new(0.0, -speed);
            add(vel, Vec2::new(-0.22, 0.05));
            add(vel, Vec2::new(0.22, 0.05));
            Some((SoundEffect::ShootRapid, 1.0))
        }
        Weapon::Beam => {
            let vel = Vec2::new(0.0, -speed * BEAM_SPEED_SCALE);
            for x in [-0.05, 0.0, 0.05] {
                add(vel, Vec2::new(x, 0.0));
            }
            None
        }
        // Placeholder: unlocks and ticks but has no projectile yet
        Weapon::Homing => None,
    };

    if let Some((effect, volume)) = sound {
        state.events.push(GameEvent::Sound { effect, volume });
    }
}
