//! Variable timestep simulation tick
//!
//! One call advances every subsystem by the same `dt` in a fixed pass
//! order: player, enemies, bullets, hand, floaters. Every timer loops to
//! catch up when `dt` spans more than one of its periods.

use glam::Vec2;

use super::collision::touching;
use super::enemy::Enemy;
use super::events::GameEvent;
use super::player::update_player;
use super::state::{BulletOwner, SimulationState};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Directional intents; left wins over right, up over down
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Play the card at this hand slot
    pub play_slot: Option<usize>,
    /// Run the clock faster
    pub fast_forward: bool,
    /// Destroy the ship (debug/testing)
    pub debug_kill: bool,
    /// Drop all pending spawns and live enemies (debug/testing)
    pub debug_clear_wave: bool,
}

impl TickInput {
    /// Steering vector from the held directions, each axis in [-1, 1]
    pub fn steer(&self) -> Vec2 {
        let x = if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        };
        let y = if self.up {
            -1.0
        } else if self.down {
            1.0
        } else {
            0.0
        };
        Vec2::new(x, y)
    }
}

/// Advance the level by `dt` ms
pub fn tick(state: &mut SimulationState, input: &TickInput, dt: f32) {
    if input.debug_kill {
        state.score.damage = state.player.max_health;
    }
    if input.debug_clear_wave {
        state.spawns.clear();
        state.enemies.clear();
    }

    state.player_dead = state.score.damage >= state.player.max_health;

    update_player(state, input, dt);
    update_enemies(state, dt);
    update_bullets(state, dt);
    if !state.player_dead {
        update_hand(state, input, dt);
    }
    update_floaters(state, dt);
}

/// The wave is over and the ship survived it
pub fn level_won(state: &SimulationState) -> bool {
    state.spawns.is_empty()
        && state.enemies.is_empty()
        && state.bullets.is_empty()
        && !state.player_dead
}

/// Pop due spawns, then move, hit-test and fire every enemy
fn update_enemies(state: &mut SimulationState, dt: f32) {
    state.level_time += dt;
    while state
        .spawns
        .last()
        .is_some_and(|next| state.level_time >= next.t)
    {
        if let Some(event) = state.spawns.pop() {
            let enemy = Enemy::spawn(&event, &mut state.rng);
            state.enemies.push(enemy);
        }
    }

    let player_pos = state.player.pos;
    let mut ii = state.enemies.len();
    while ii > 0 {
        ii -= 1;
        state.enemies[ii].advance(dt);

        if !state.player_dead {
            take_player_bullets(state, ii);
        }

        let enemy = &state.enemies[ii];
        if enemy.hp == 0 || enemy.exited() {
            let enemy = state.enemies.swap_remove(ii);
            if enemy.hp == 0 {
                let money = state.kill_reward(enemy.max_hp);
                state.score.kills += 1;
                state.add_money(enemy.pos, money);
                state.events.push(GameEvent::EnemyKilled {
                    kind: enemy.kind,
                    pos: enemy.pos,
                    money,
                });
            }
            continue;
        }

        let enemy = &mut state.enemies[ii];
        let shots = enemy.fire(dt, player_pos, &mut state.bullets);
        let sound = enemy.kind.shoot_sound();
        for _ in 0..shots {
            state.events.push(GameEvent::sound(sound));
        }
    }
}

/// Apply every player bullet touching enemy `ii`. Each one is used up,
/// even those landing after the enemy is already at 0 hp.
fn take_player_bullets(state: &mut SimulationState, ii: usize) {
    let radius_sq = state.radii.enemy_vs_bullet_sq;
    let mut jj = state.bullets.len();
    while jj > 0 {
        jj -= 1;
        let b = &state.bullets[jj];
        if b.owner != BulletOwner::Player || !touching(b.pos, state.enemies[ii].pos, radius_sq) {
            continue;
        }
        state.bullets.swap_remove(jj);

        let enemy = &mut state.enemies[ii];
        let (kind, pos) = (enemy.kind, enemy.pos);
        if enemy.hit() {
            state.events.push(GameEvent::sound(kind.death_sound()));
            state.events.push(GameEvent::Explosion {
                kind: kind.explosion(),
                pos,
            });
        } else {
            state.events.push(GameEvent::sound(kind.damage_sound()));
        }
    }
}

/// Move bullets and drop those that left the board
fn update_bullets(state: &mut SimulationState, dt: f32) {
    let mut ii = state.bullets.len();
    while ii > 0 {
        ii -= 1;
        let b = &mut state.bullets[ii];
        b.pos += b.vel * dt;
        if !b.on_board() {
            state.bullets.swap_remove(ii);
        }
    }
}

/// Refill the hand on a timer and play the selected card
fn update_hand(state: &mut SimulationState, input: &TickInput, dt: f32) {
    let deck = &mut state.deck;
    let can_draw = |deck: &super::deck::Deck| !deck.hand_full() && !deck.exhausted();

    if can_draw(deck) {
        let mut rdt = dt;
        while can_draw(deck) && rdt >= state.draw_countdown {
            rdt -= state.draw_countdown;
            state.draw_countdown = state.draw_rate;
            deck.draw(false, &mut state.rng);
        }
        if can_draw(deck) {
            state.draw_countdown -= rdt;
        } else {
            state.draw_countdown = state.draw_rate;
        }
    } else {
        state.draw_countdown = state.draw_rate;
    }

    if let Some(slot) = input.play_slot {
        if let Some(id) = deck.play_slot(slot) {
            log::debug!("Played {}", id.as_str());
            if let Some(sound) = id.def().sound {
                state.events.push(GameEvent::sound(sound));
            }
            state.events.push(GameEvent::CardPlayed(id));
        }
    }
}

/// Age floating text and drop the expired ones
fn update_floaters(state: &mut SimulationState, dt: f32) {
    for f in &mut state.floaters {
        f.t += dt;
    }
    state.floaters.retain(|f| f.t < f.time);
}
