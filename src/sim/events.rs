//! Side effects emitted by the simulation
//!
//! Events are advisory: dropping them never changes simulation state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cards::CardId;
use super::enemy::EnemyKind;
use crate::audio::SoundEffect;

/// Particle system to spawn for a destroyed ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionKind {
    Small,
    Regular,
    Player,
}

/// Something the outside world may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound { effect: SoundEffect, volume: f32 },
    /// Position in board tiles
    Explosion { kind: ExplosionKind, pos: Vec2 },
    CardPlayed(CardId),
    EnemyKilled { kind: EnemyKind, pos: Vec2, money: u32 },
    /// Contact without a shield; `blocked` when a guard card took it
    PlayerHit { blocked: bool },
    ShieldBlock,
    PlayerDestroyed,
    LevelStarted { level: usize },
    LevelWon { level: usize },
}

impl GameEvent {
    /// Sound at full volume
    pub fn sound(effect: SoundEffect) -> Self {
        GameEvent::Sound {
            effect,
            volume: 1.0,
        }
    }
}
