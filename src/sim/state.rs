//! Simulation state and entity types
//!
//! Everything one running level needs lives in `SimulationState`, owned by
//! the caller and threaded through every update.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cards::{CardId, WeaponSet};
use super::collision::CollisionRadii;
use super::deck::Deck;
use super::enemy::{Enemy, EnemyKind};
use super::events::GameEvent;
use super::spawn::SpawnTable;
use crate::config::{GameConfig, LevelSpec};
use crate::consts::*;

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Position in board tiles
    pub pos: Vec2,
    /// Smoothed steering velocity, each axis in [-n, n] card/input units
    pub vel: Vec2,
    pub max_health: u32,
    /// Per-weapon time until the next shot (ms), indexed by `Weapon`
    pub fire_countdowns: [f32; 5],
    /// Remaining hit blink / invulnerability (ms)
    pub hit_cooldown: f32,
    pub hit_was_blocked: bool,
    /// Shield radius derived this tick
    pub shield: f32,
    /// Weapons unlocked this tick
    pub weapons: WeaponSet,
}

impl Player {
    pub fn new(max_health: u32) -> Self {
        Self {
            pos: Self::start_pos(),
            vel: Vec2::ZERO,
            max_health,
            fire_countdowns: [0.0; 5],
            hit_cooldown: 0.0,
            hit_was_blocked: false,
            shield: 0.0,
            weapons: WeaponSet::default(),
        }
    }

    pub fn start_pos() -> Vec2 {
        Vec2::new(BOARD_W / 2.0, BOARD_H - PLAYER_START_Y_FROM_BOTTOM)
    }

    /// Put the ship back at the start line, stationary and idle
    pub fn reset(&mut self) {
        self.pos = Self::start_pos();
        self.vel = Vec2::ZERO;
        self.fire_countdowns = [0.0; 5];
        self.hit_cooldown = 0.0;
        self.hit_was_blocked = false;
        self.shield = 0.0;
        self.weapons = WeaponSet::default();
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// A bullet: a point moving in a straight line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    /// Tiles per ms
    pub vel: Vec2,
    pub owner: BulletOwner,
}

impl Bullet {
    pub fn new(pos: Vec2, vel: Vec2, owner: BulletOwner) -> Self {
        Self { pos, vel, owner }
    }

    pub fn on_board(&self) -> bool {
        self.pos.x >= 0.0 && self.pos.y >= 0.0 && self.pos.x < BOARD_W && self.pos.y < BOARD_H
    }
}

/// A scheduled enemy arrival
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    /// Ms since level start
    pub t: f32,
    pub x: f32,
    pub kind: EnemyKind,
    /// Volley phase shift (ms) for staggered bomber runs
    pub offset: f32,
    /// Spawn pattern that produced this event
    pub pattern: usize,
}

/// Money, kills and damage for the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub retries: u32,
    pub kills: u32,
    pub damage: u32,
    pub money: u32,
    pub money_total: u32,
}

/// Rising "+$N" text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Floater {
    /// Screen position (virtual pixels)
    pub pos: Vec2,
    pub text: String,
    pub t: f32,
    pub time: f32,
}

impl Floater {
    /// Current screen position, drifting upward as it ages
    pub fn current_pos(&self) -> Vec2 {
        let rise = crate::ease_out(self.t / self.time, 2.0) * FLOATER_DIST;
        Vec2::new(self.pos.x, self.pos.y - rise)
    }

    /// Opacity: solid for the first half, then fading out
    pub fn alpha(&self) -> f32 {
        (2.0 - 2.0 * self.t / self.time).clamp(0.0, 1.0)
    }
}

/// Complete simulation state for the current level
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// RNG for shuffles, shop offers and enemy coin flips
    pub rng: Pcg32,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    /// Pending spawns, latest first; the next arrival is at the end
    pub spawns: Vec<SpawnEvent>,
    /// Ms since level start
    pub level_time: f32,
    pub deck: Deck,
    pub score: Score,
    pub floaters: Vec<Floater>,
    pub player_dead: bool,
    /// Time until the hand refills by one card (ms)
    pub draw_countdown: f32,
    pub radii: CollisionRadii,
    pub money_per_hp: u32,
    pub draw_rate: f32,
    /// Side effects since the last drain
    pub events: Vec<GameEvent>,
}

impl SimulationState {
    /// Create a fresh run from validated configuration
    pub fn new(config: &GameConfig, starting_deck: Vec<CardId>) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(config.run_seed),
            player: Player::new(config.player_max_health),
            enemies: Vec::new(),
            bullets: Vec::new(),
            spawns: Vec::new(),
            level_time: 0.0,
            deck: Deck::new(starting_deck, config.hand_size),
            score: Score::default(),
            floaters: Vec::new(),
            player_dead: false,
            draw_countdown: 0.0,
            radii: config.radii(),
            money_per_hp: config.money_per_hp,
            draw_rate: config.draw_rate_ms,
            events: Vec::new(),
        }
    }

    /// Reset the board and deal a fresh hand for `level`
    pub fn start_level(&mut self, index: usize, level: &LevelSpec, table: &SpawnTable) {
        self.floaters.clear();
        self.deck.cards_to_deck();
        self.deck.shuffle(&mut self.rng);
        while self.deck.draw(false, &mut self.rng) {}

        self.player.reset();
        self.enemies.clear();
        self.bullets.clear();
        self.level_time = 0.0;
        self.draw_countdown = 0.0;

        let wave = table.generate(&level.seed, level.hp_budget, level.duration_ms);
        log::info!(
            "Level {} has {} HP in total over {} spawns",
            index,
            wave.total_hp(),
            wave.spawns.len()
        );
        self.spawns = wave.spawns;

        self.player_dead = false;
        self.score.kills = 0;
        self.score.damage = 0;
        self.events.push(GameEvent::LevelStarted { level: index });
    }

    /// Credit money for a kill and float the amount above `pos`
    pub fn add_money(&mut self, pos: Vec2, money: u32) {
        self.score.money += money;
        let screen = crate::board_to_screen(pos) - Vec2::new(15.0, 0.0);
        self.floaters.push(Floater {
            pos: screen,
            text: format!("+${money}"),
            t: 0.0,
            time: FLOAT_SCORE_TIME,
        });
    }

    /// Reward for destroying an enemy with `max_hp`
    pub fn kill_reward(&self, max_hp: u32) -> u32 {
        self.money_per_hp * max_hp
    }

    /// Whether anything is still coming or alive on the board
    pub fn hostiles_remain(&self) -> bool {
        !self.spawns.is_empty() || !self.enemies.is_empty()
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_bounds_half_open() {
        let on = Bullet::new(Vec2::new(0.0, 0.0), Vec2::ZERO, BulletOwner::Player);
        assert!(on.on_board());
        let off = Bullet::new(Vec2::new(BOARD_W, 1.0), Vec2::ZERO, BulletOwner::Player);
        assert!(!off.on_board());
        let above = Bullet::new(Vec2::new(1.0, -0.01), Vec2::ZERO, BulletOwner::Enemy);
        assert!(!above.on_board());
    }

    #[test]
    fn test_start_level_deals_full_hand() {
        let config = GameConfig::default();
        let cards = config.starting_cards().unwrap();
        let mut state = SimulationState::new(&config, cards.clone());
        state.start_level(0, &config.levels[0], &SpawnTable::standard());
        assert_eq!(state.deck.hand.len(), config.hand_size);
        assert_eq!(state.deck.total_cards(), cards.len());
        assert!(!state.spawns.is_empty());
        assert_eq!(state.player.pos, Player::start_pos());
    }

    #[test]
    fn test_add_money_floats_text() {
        let config = GameConfig::default();
        let mut state = SimulationState::new(&config, Vec::new());
        state.add_money(Vec2::new(1.0, 1.0), 10);
        assert_eq!(state.score.money, 10);
        assert_eq!(state.floaters.len(), 1);
        assert_eq!(state.floaters[0].text, "+$10");
    }

    #[test]
    fn test_floater_fades_in_second_half() {
        let mut f = Floater {
            pos: Vec2::new(100.0, 100.0),
            text: String::new(),
            t: 0.0,
            time: FLOAT_SCORE_TIME,
        };
        assert_eq!(f.alpha(), 1.0);
        f.t = FLOAT_SCORE_TIME * 0.75;
        assert!((f.alpha() - 0.5).abs() < 1e-5);
        assert!(f.current_pos().y < 100.0);
    }
}
