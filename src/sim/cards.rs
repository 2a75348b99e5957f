//! Card and weapon definitions
//!
//! The card table is static. Anything that mutates per-play state works on
//! an owned copy of a card's effects (see `deck::CardInPlay`).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::audio::SoundEffect;
use crate::consts::*;
use crate::error::ConfigError;

/// Player weapons, in fire-timer order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    Regular,
    Spread,
    Rapid,
    Beam,
    /// Unlockable but fires nothing yet
    Homing,
}

impl Weapon {
    pub const ALL: [Weapon; 5] = [
        Weapon::Regular,
        Weapon::Spread,
        Weapon::Rapid,
        Weapon::Beam,
        Weapon::Homing,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn fire_delay(self) -> f32 {
        FIRE_DELAY[self.index()]
    }
}

/// Set of weapons unlocked this tick. Regular is always in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSet(u8);

impl Default for WeaponSet {
    fn default() -> Self {
        Self(1 << Weapon::Regular.index())
    }
}

impl WeaponSet {
    pub fn insert(&mut self, weapon: Weapon) {
        self.0 |= 1 << weapon.index();
    }

    pub fn contains(&self, weapon: Weapon) -> bool {
        self.0 & (1 << weapon.index()) != 0
    }
}

/// One timed phase of a card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Remaining duration (ms)
    pub duration: f32,
    /// Lateral steering bias
    pub dx: f32,
    /// Damage repaired per trigger
    pub hp: u32,
    /// Periodic trigger cadence (ms), for pulse effects
    pub trigger_at: Option<f32>,
    pub shield_grow: f32,
    pub shield_shrink: f32,
    /// Cards drawn per trigger
    pub draw: u32,
    pub weapon: Option<Weapon>,
    /// Absorbs the next hit by discarding the card
    pub guard: bool,
}

impl Effect {
    pub const NONE: Effect = Effect {
        duration: 0.0,
        dx: 0.0,
        hp: 0,
        trigger_at: None,
        shield_grow: 0.0,
        shield_shrink: 0.0,
        draw: 0,
        weapon: None,
        guard: false,
    };
}

/// Card identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardId {
    MoveLeft,
    MoveRight,
    Zigzag,
    React,
    Shield,
    Repair,
    Draw3,
    Spread,
    Rapid,
    Beam,
    Homing,
}

impl CardId {
    pub const ALL: [CardId; 11] = [
        CardId::MoveLeft,
        CardId::MoveRight,
        CardId::Zigzag,
        CardId::React,
        CardId::Shield,
        CardId::Repair,
        CardId::Draw3,
        CardId::Spread,
        CardId::Rapid,
        CardId::Beam,
        CardId::Homing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardId::MoveLeft => "move_left",
            CardId::MoveRight => "move_right",
            CardId::Zigzag => "zigzag",
            CardId::React => "react",
            CardId::Shield => "shield",
            CardId::Repair => "repair",
            CardId::Draw3 => "draw3",
            CardId::Spread => "spread",
            CardId::Rapid => "rapid",
            CardId::Beam => "beam",
            CardId::Homing => "homing",
        }
    }

    /// Static definition for this card
    pub fn def(self) -> &'static CardDef {
        match self {
            CardId::MoveLeft => &MOVE_LEFT,
            CardId::MoveRight => &MOVE_RIGHT,
            CardId::Zigzag => &ZIGZAG_CARD,
            CardId::React => &REACT,
            CardId::Shield => &SHIELD,
            CardId::Repair => &REPAIR,
            CardId::Draw3 => &DRAW3,
            CardId::Spread => &SPREAD,
            CardId::Rapid => &RAPID,
            CardId::Beam => &BEAM,
            CardId::Homing => &HOMING,
        }
    }

    pub fn tier(self) -> u8 {
        self.def().tier
    }
}

impl FromStr for CardId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownCard(s.to_string()))
    }
}

/// Canonical deck order: tier ascending, then id
pub fn canonical_order(a: &CardId, b: &CardId) -> std::cmp::Ordering {
    a.tier()
        .cmp(&b.tier())
        .then_with(|| a.as_str().cmp(b.as_str()))
}

/// Immutable card definition
#[derive(Debug)]
pub struct CardDef {
    pub id: CardId,
    pub name: &'static str,
    pub effects: &'static [Effect],
    pub sprite_idx: u8,
    /// Shop bracket 0..=2
    pub tier: u8,
    pub sound: Option<SoundEffect>,
}

impl CardDef {
    /// Sum of all effect durations
    pub fn total_duration(&self) -> f32 {
        self.effects.iter().map(|e| e.duration).sum()
    }
}

/// Cards offered in the shop, by tier
pub const CARDS_BY_TIER: [&[CardId]; 3] = [
    &[CardId::MoveLeft, CardId::MoveRight, CardId::Zigzag],
    &[CardId::Repair, CardId::React, CardId::Draw3, CardId::Rapid],
    &[CardId::Shield, CardId::Beam, CardId::Spread],
];

static MOVE_LEFT: CardDef = CardDef {
    id: CardId::MoveLeft,
    name: "MOVE LEFT",
    effects: &[Effect {
        duration: 1100.0,
        dx: -1.0,
        ..Effect::NONE
    }],
    sprite_idx: 0,
    tier: 0,
    sound: Some(SoundEffect::Move),
};

static MOVE_RIGHT: CardDef = CardDef {
    id: CardId::MoveRight,
    name: "MOVE RIGHT",
    effects: &[Effect {
        duration: 1100.0,
        dx: 1.0,
        ..Effect::NONE
    }],
    sprite_idx: 1,
    tier: 0,
    sound: Some(SoundEffect::Move),
};

static ZIGZAG_CARD: CardDef = CardDef {
    id: CardId::Zigzag,
    name: "ZIG-ZAG",
    effects: &[
        Effect {
            duration: ZIGZAG,
            dx: -1.0,
            ..Effect::NONE
        },
        Effect {
            duration: ZIGZAG * 2.5,
            dx: 1.0,
            ..Effect::NONE
        },
        Effect {
            duration: ZIGZAG * 1.54,
            dx: -1.0,
            ..Effect::NONE
        },
    ],
    sprite_idx: 2,
    tier: 0,
    sound: Some(SoundEffect::Zigzag),
};

static REACT: CardDef = CardDef {
    id: CardId::React,
    name: "AUTO-GUARD",
    effects: &[Effect {
        duration: 60000.0,
        guard: true,
        ..Effect::NONE
    }],
    sprite_idx: 3,
    tier: 1,
    sound: Some(SoundEffect::ReactPlay),
};

static SHIELD: CardDef = CardDef {
    id: CardId::Shield,
    name: "SHIELD BUBBLE",
    effects: &[
        Effect {
            duration: SHIELD_GROW_TIME,
            shield_grow: SHIELD_SIZE,
            ..Effect::NONE
        },
        Effect {
            duration: SHIELD_SHRINK_TIME,
            shield_shrink: SHIELD_SIZE,
            ..Effect::NONE
        },
    ],
    sprite_idx: 4,
    tier: 2,
    sound: Some(SoundEffect::Shield),
};

static REPAIR: CardDef = CardDef {
    id: CardId::Repair,
    name: "REPAIR",
    effects: &[Effect {
        duration: 250.0 * 5.0,
        trigger_at: Some(250.0),
        hp: 1,
        ..Effect::NONE
    }],
    sprite_idx: 5,
    tier: 1,
    sound: Some(SoundEffect::Repair),
};

static DRAW3: CardDef = CardDef {
    id: CardId::Draw3,
    name: "DRAW 3",
    effects: &[Effect {
        duration: 250.0 * 3.0,
        trigger_at: Some(250.0),
        draw: 1,
        ..Effect::NONE
    }],
    sprite_idx: 6,
    tier: 1,
    sound: Some(SoundEffect::ButtonClick),
};

static SPREAD: CardDef = CardDef {
    id: CardId::Spread,
    name: "SPREAD",
    effects: &[Effect {
        duration: 3000.0,
        weapon: Some(Weapon::Spread),
        ..Effect::NONE
    }],
    sprite_idx: 7,
    tier: 2,
    sound: Some(SoundEffect::Spread),
};

static RAPID: CardDef = CardDef {
    id: CardId::Rapid,
    name: "RAPID FIRE",
    effects: &[Effect {
        duration: 2500.0,
        weapon: Some(Weapon::Rapid),
        ..Effect::NONE
    }],
    sprite_idx: 8,
    tier: 1,
    sound: None,
};

static BEAM: CardDef = CardDef {
    id: CardId::Beam,
    name: "BEAM",
    effects: &[Effect {
        duration: 1750.0,
        weapon: Some(Weapon::Beam),
        ..Effect::NONE
    }],
    sprite_idx: 9,
    tier: 2,
    sound: Some(SoundEffect::Beam),
};

// Not in any shop pool
static HOMING: CardDef = CardDef {
    id: CardId::Homing,
    name: "HOMING",
    effects: &[Effect {
        duration: 3000.0,
        weapon: Some(Weapon::Homing),
        ..Effect::NONE
    }],
    sprite_idx: 10,
    tier: 2,
    sound: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defs_are_keyed_by_their_id() {
        for id in CardId::ALL {
            assert_eq!(id.def().id, id);
            assert!(!id.def().effects.is_empty());
            assert!(id.def().tier <= 2);
        }
    }

    #[test]
    fn test_parse_card_id() {
        assert_eq!("zigzag".parse::<CardId>().unwrap(), CardId::Zigzag);
        assert!(matches!(
            "laser".parse::<CardId>(),
            Err(ConfigError::UnknownCard(s)) if s == "laser"
        ));
    }

    #[test]
    fn test_tier_pools_match_defs() {
        for (tier, pool) in CARDS_BY_TIER.iter().enumerate() {
            for id in pool.iter() {
                assert_eq!(id.tier() as usize, tier);
            }
        }
        assert!(!CARDS_BY_TIER.iter().any(|p| p.contains(&CardId::Homing)));
    }

    #[test]
    fn test_canonical_order() {
        let mut ids = vec![CardId::Shield, CardId::Repair, CardId::Zigzag, CardId::MoveLeft];
        ids.sort_by(canonical_order);
        assert_eq!(
            ids,
            vec![CardId::MoveLeft, CardId::Zigzag, CardId::Repair, CardId::Shield]
        );
    }

    #[test]
    fn test_shield_phases_are_continuous() {
        let effects = CardId::Shield.def().effects;
        assert_eq!(effects[0].shield_grow, effects[1].shield_shrink);
        assert_eq!(CardId::Shield.def().total_duration(), SHIELD_GROW_TIME + SHIELD_SHRINK_TIME);
    }

    #[test]
    fn test_weapon_set_always_has_regular() {
        let mut set = WeaponSet::default();
        assert!(set.contains(Weapon::Regular));
        assert!(!set.contains(Weapon::Beam));
        set.insert(Weapon::Beam);
        assert!(set.contains(Weapon::Beam));
    }
}
