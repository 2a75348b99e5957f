//! Error types
//!
//! The simulation itself never fails at runtime; these cover broken
//! configuration tables and refused shop actions.

use thiserror::Error;

/// Integrity problems in card, spawn, level or balance tables
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("spawn pattern {index} has non-positive hp cost")]
    ZeroCostPattern { index: usize },
    #[error("spawn pattern {index} has an invalid weight")]
    InvalidWeight { index: usize },
    #[error("spawn table has no selectable patterns")]
    EmptyWeights,
    #[error("spawn pattern {index} has invalid delay range [{min}, {max}]")]
    InvalidDelayRange { index: usize, min: f32, max: f32 },
    #[error("unknown card id: {0}")]
    UnknownCard(String),
    #[error("level table is empty")]
    EmptyLevelTable,
    #[error("level {index} has non-positive hp budget or duration")]
    InvalidLevel { index: usize },
    #[error("invalid value for {field}")]
    InvalidValue { field: &'static str },
    #[error("config parse error")]
    Json(#[from] serde_json::Error),
}

/// Shop actions the session refused; state is unchanged when returned
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShopError {
    #[error("not in the shop")]
    NotInShop,
    #[error("no offer at slot {0}")]
    NoSuchOffer(usize),
    #[error("no deck card at slot {0}")]
    NoSuchCard(usize),
    #[error("cannot afford ${cost} with ${money}")]
    CannotAfford { cost: u32, money: u32 },
    #[error("deck must keep more than {0} cards to trash")]
    DeckAtMinimum(usize),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("all levels complete")]
    CampaignComplete,
    #[error("player is not dead")]
    NotDead,
}
