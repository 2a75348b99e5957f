//! Deckfire - a deck-driven arcade shoot-'em-up
//!
//! Core modules:
//! - `sim`: Deterministic simulation (cards, entities, waves, session state)
//! - `config`: Data-driven game balance and level table
//! - `audio`: Sound effect identifiers emitted by the simulation
//! - `present`: Advisory draw/text requests for an external renderer

pub mod audio;
pub mod config;
pub mod error;
pub mod present;
pub mod sim;

pub use config::GameConfig;
pub use error::{ConfigError, ShopError};

/// Game configuration constants
pub mod consts {
    /// Board dimensions in tiles
    pub const BOARD_W: f32 = 5.0;
    pub const BOARD_H: f32 = 10.0;

    /// Player movement (tiles per ms at full velocity)
    pub const PLAYER_SPEED: f32 = 0.002;
    /// Velocity change per ms while steering toward the desired direction
    pub const PLAYER_ACCEL: f32 = 0.005;
    /// Keep the ship this far inside the board edges
    pub const PLAYER_BORDER_PAD: f32 = 0.25;
    pub const PLAYER_START_Y_FROM_BOTTOM: f32 = 0.5;

    /// Shield bubble radius (tiles) and phase lengths (ms)
    pub const SHIELD_SIZE: f32 = 2.0;
    pub const SHIELD_GROW_TIME: f32 = 250.0;
    pub const SHIELD_SHRINK_TIME: f32 = 2500.0;

    /// Zig-zag card phase length (ms)
    pub const ZIGZAG: f32 = 450.0;

    /// Weapon fire delays (ms), indexed by `Weapon as usize`
    pub const FIRE_DELAY_REGULAR: f32 = 60.0 * 4.0;
    pub const FIRE_DELAY: [f32; 5] = [
        FIRE_DELAY_REGULAR,
        FIRE_DELAY_REGULAR,
        FIRE_DELAY_REGULAR / 2.0,
        16.0,
        FIRE_DELAY_REGULAR * 2.0,
    ];

    /// Bullet speeds (tiles per ms)
    pub const PLAYER_BULLET_SPEED: f32 = 0.005;
    pub const BEAM_SPEED_SCALE: f32 = 3.0;
    pub const ENEMY_BULLET_SPEED: f32 = 0.002;
    /// Spread shots leave 15 degrees off vertical
    pub const SPREAD_ANGLE: f32 = (90.0 - 15.0) / 180.0 * std::f32::consts::PI;

    /// Blink durations (ms)
    pub const PLAYER_HIT_BLINK_TIME: f32 = 250.0;
    pub const ENEMY_HIT_BLINK_TIME: f32 = 150.0;

    /// Enemies
    pub const ENEMY_DESCENT: f32 = 0.0005;
    pub const ENEMY_SPAWN_Y: f32 = -0.5;
    /// Enemies below this line are gone
    pub const ENEMY_EXIT_MARGIN: f32 = 0.5;
    pub const DRONE_X_PAD: f32 = 0.5;
    pub const DRONE_ACCEL: f32 = 0.000_000_5;
    pub const DRONE_SPEED: f32 = 0.0005;
    /// Enemies within this distance of a side edge hold fire
    pub const ENEMY_FIRE_EDGE: f32 = 0.01;

    /// Floating score text
    pub const FLOATER_DIST: f32 = 32.0;
    pub const FLOAT_SCORE_TIME: f32 = 750.0;

    /// Presentation layout (virtual pixels)
    pub const GAME_WIDTH: f32 = 1024.0;
    pub const GAME_HEIGHT: f32 = 1024.0;
    pub const CARD_H: f32 = 118.0;
    pub const CARD_W: f32 = (2.5 / 3.5) * CARD_H;
    pub const HAND_BELOW_H: f32 = CARD_H + 48.0 + 20.0;
    pub const BOARD_TILE: f32 = (GAME_HEIGHT - HAND_BELOW_H) / BOARD_H;
    pub const BOARD_X0: f32 = BOARD_TILE / 2.0;
    pub const BOARD_Y0: f32 = 0.0;
}

/// Clamp `v` into `[mn, mx]`
#[inline]
pub fn clamp(v: f32, mn: f32, mx: f32) -> f32 {
    v.max(mn).min(mx)
}

/// Move `cur` toward `desired` by at most `accel * dt`, never overshooting
#[inline]
pub fn accelerate(cur: f32, desired: f32, dt: f32, accel: f32) -> f32 {
    if desired == cur {
        return cur;
    }
    let delta = desired - cur;
    let step = delta.abs().min(dt * accel);
    cur + step * delta.signum()
}

/// Ease-out curve: fast start, slow finish. `v` in [0, 1]
#[inline]
pub fn ease_out(v: f32, power: f32) -> f32 {
    1.0 - (1.0 - v.clamp(0.0, 1.0)).powf(power)
}

/// Convert board coordinates (tiles) to virtual screen pixels
#[inline]
pub fn board_to_screen(pos: glam::Vec2) -> glam::Vec2 {
    use consts::*;
    glam::Vec2::new(BOARD_X0 + pos.x * BOARD_TILE, BOARD_Y0 + pos.y * BOARD_TILE)
}
