//! Game balance and level table
//!
//! Everything a designer might tune lives in `GameConfig`. Fixed geometry
//! and weapon timings stay in `crate::consts`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::cards::CardId;
use crate::sim::collision::CollisionRadii;

/// One entry of the level table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    /// Wave generator seed
    pub seed: String,
    /// Total enemy hit points to spawn
    pub hp_budget: u32,
    /// Target wave length (ms)
    pub duration_ms: f32,
}

impl LevelSpec {
    pub fn new(seed: &str, hp_budget: u32, duration_ms: f32) -> Self {
        Self {
            seed: seed.to_string(),
            hp_budget,
            duration_ms,
        }
    }
}

/// Tunable game balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Deck ===
    /// Cards the hand refills up to
    pub hand_size: usize,
    /// Time between automatic draws (ms)
    pub draw_rate_ms: f32,
    /// Card ids of the deck a new run starts with
    pub starting_deck: Vec<String>,

    // === Player ===
    /// Hits the ship can take
    pub player_max_health: u32,

    // === Collision (squared tile distances) ===
    pub player_vs_bullet_dist_sq: f32,
    pub enemy_vs_bullet_dist_sq: f32,
    pub player_vs_enemy_dist_sq: f32,

    // === Economy ===
    /// Shop price per card tier
    pub cost_by_tier: [u32; 3],
    /// Price to remove a card from the deck
    pub trash_cost: u32,
    /// Trashing needs the deck to be larger than this
    pub min_deck_size: usize,
    /// Kill reward per enemy max hp
    pub money_per_hp: u32,

    // === Run ===
    pub fast_forward_scale: f32,
    pub levels: Vec<LevelSpec>,
    /// Seed for shuffles, shop offers and enemy coin flips
    pub run_seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        let mut starting_deck = Vec::new();
        for (card, count) in [("move_left", 4), ("move_right", 4), ("zigzag", 2), ("repair", 1)] {
            starting_deck.extend(std::iter::repeat_n(card.to_string(), count));
        }

        Self {
            hand_size: 5,
            draw_rate_ms: 2000.0,
            starting_deck,

            player_max_health: 10,

            player_vs_bullet_dist_sq: 0.25 * 0.25,
            enemy_vs_bullet_dist_sq: 0.25 * 0.25,
            player_vs_enemy_dist_sq: 0.25 * 0.25,

            cost_by_tier: [100, 300, 800],
            trash_cost: 250,
            min_deck_size: 5,
            money_per_hp: 5,

            fast_forward_scale: 3.0,
            levels: vec![
                LevelSpec::new("level1b", 170, 40000.0),
                LevelSpec::new("level2d", 200, 60000.0),
                LevelSpec::new("level3", 300, 65000.0),
                LevelSpec::new("level4", 400, 70000.0),
                LevelSpec::new("level5", 500, 70000.0),
                LevelSpec::new("level6", 600, 70000.0),
                LevelSpec::new("level7", 800, 70000.0),
                LevelSpec::new("level8", 1000, 70000.0),
            ],
            run_seed: 0x5eed,
        }
    }
}

impl GameConfig {
    /// Parse JSON (missing fields take defaults) and validate
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Loaded config: {} levels, {} starting cards",
            config.levels.len(),
            config.starting_deck.len()
        );
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every tunable for sanity, including that all starting card ids exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hand_size == 0 {
            return Err(ConfigError::InvalidValue { field: "hand_size" });
        }
        if !(self.draw_rate_ms > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "draw_rate_ms",
            });
        }
        if self.player_max_health == 0 {
            return Err(ConfigError::InvalidValue {
                field: "player_max_health",
            });
        }
        for (field, v) in [
            ("player_vs_bullet_dist_sq", self.player_vs_bullet_dist_sq),
            ("enemy_vs_bullet_dist_sq", self.enemy_vs_bullet_dist_sq),
            ("player_vs_enemy_dist_sq", self.player_vs_enemy_dist_sq),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::InvalidValue { field });
            }
        }
        if !(self.fast_forward_scale >= 1.0) || !self.fast_forward_scale.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "fast_forward_scale",
            });
        }

        if self.levels.is_empty() {
            return Err(ConfigError::EmptyLevelTable);
        }
        for (index, level) in self.levels.iter().enumerate() {
            if level.hp_budget == 0 || !(level.duration_ms > 0.0) || !level.duration_ms.is_finite() {
                return Err(ConfigError::InvalidLevel { index });
            }
        }

        self.starting_cards()?;
        Ok(())
    }

    /// Resolve the starting deck's card ids
    pub fn starting_cards(&self) -> Result<Vec<CardId>, ConfigError> {
        self.starting_deck.iter().map(|s| s.parse()).collect()
    }

    pub fn radii(&self) -> CollisionRadii {
        CollisionRadii {
            player_vs_bullet_sq: self.player_vs_bullet_dist_sq,
            enemy_vs_bullet_sq: self.enemy_vs_bullet_dist_sq,
            player_vs_enemy_sq: self.player_vs_enemy_dist_sq,
        }
    }

    /// Shop price for a card of `tier`
    pub fn cost_for_tier(&self, tier: u8) -> u32 {
        let idx = usize::from(tier).min(self.cost_by_tier.len() - 1);
        self.cost_by_tier[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_validates() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        let cards = config.starting_cards().unwrap();
        assert_eq!(cards.len(), 11);
        assert_eq!(cards.iter().filter(|c| **c == CardId::MoveLeft).count(), 4);
        assert_eq!(config.levels[0], LevelSpec::new("level1b", 170, 40000.0));
        assert_eq!(config.levels.len(), 8);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json_str(r#"{ "hand_size": 7, "run_seed": 42 }"#).unwrap();
        assert_eq!(config.hand_size, 7);
        assert_eq!(config.run_seed, 42);
        assert_eq!(config.trash_cost, 250);
        assert_eq!(config.levels.len(), 8);
    }

    #[test]
    fn test_unknown_card_fails_fast() {
        let err = GameConfig::from_json_str(r#"{ "starting_deck": ["move_left", "laser"] }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCard(ref s) if s == "laser"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "levels": [] }"#),
            Err(ConfigError::EmptyLevelTable)
        ));
        assert!(matches!(
            GameConfig::from_json_str(
                r#"{ "levels": [{ "seed": "a", "hp_budget": 0, "duration_ms": 1000 }] }"#
            ),
            Err(ConfigError::InvalidLevel { index: 0 })
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "hand_size": 0 }"#),
            Err(ConfigError::InvalidValue { field: "hand_size" })
        ));
        assert!(matches!(
            GameConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_levels() {
        let config = GameConfig::default();
        let json = config.to_json_string().unwrap();
        let back = GameConfig::from_json_str(&json).unwrap();
        assert_eq!(back.levels, config.levels);
        assert_eq!(back.starting_deck, config.starting_deck);
    }

    #[test]
    fn test_cost_for_tier() {
        let config = GameConfig::default();
        assert_eq!(config.cost_for_tier(0), 100);
        assert_eq!(config.cost_for_tier(2), 800);
        assert_eq!(config.cost_for_tier(9), 800);
    }
}
