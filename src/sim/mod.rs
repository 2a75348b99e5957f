//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (one stream per run, one per level's wave)
//! - Variable `dt`, with every timer catching up instead of skipping
//! - No rendering, audio or platform dependencies; side effects are events

pub mod cards;
pub mod collision;
pub mod deck;
pub mod enemy;
pub mod events;
pub mod player;
pub mod session;
pub mod spawn;
pub mod state;
pub mod tick;

pub use cards::{CardDef, CardId, Effect, Weapon, WeaponSet};
pub use collision::CollisionRadii;
pub use deck::{CardInPlay, Deck};
pub use enemy::{Enemy, EnemyKind};
pub use events::{ExplosionKind, GameEvent};
pub use session::{CampaignSummary, Session, SessionInput, SessionState, ShopState};
pub use spawn::{SpawnTable, Wave};
pub use state::{Bullet, BulletOwner, Floater, Player, Score, SimulationState, SpawnEvent};
pub use tick::{TickInput, level_won, tick};
