//! Level/session state machine and shop economy
//!
//! `Session` owns the run: which level is loaded, the simulation for it,
//! and the between-level shop. Shop actions are explicit calls that either
//! apply fully or return a `ShopError` and change nothing.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cards::{CARDS_BY_TIER, CardId, canonical_order};
use super::events::GameEvent;
use super::spawn::SpawnTable;
use super::state::SimulationState;
use super::tick::{TickInput, level_won, tick};
use crate::audio::SoundEffect;
use crate::config::GameConfig;
use crate::error::{ConfigError, ShopError};

/// Offers generated per shop tier
const OFFERS_PER_TIER: usize = 2;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Waiting for the outside world to finish loading assets
    Loading,
    /// Next update deals the level and starts it
    GameplayInit,
    Gameplay,
    /// Next update banks the win and opens the shop
    LevelWonInit,
    /// Shop (or retry shop, or the final summary)
    LevelWon,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Loading => "loading",
            SessionState::GameplayInit => "gameplay_init",
            SessionState::Gameplay => "gameplay",
            SessionState::LevelWonInit => "level_won_init",
            SessionState::LevelWon => "level_won",
        }
    }
}

/// Per-update input from the host
#[derive(Debug, Clone, Default)]
pub struct SessionInput {
    /// Assets still loading; the session leaves `Loading` at zero
    pub assets_pending: usize,
    pub tick: TickInput,
}

/// Shop screen state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopState {
    /// Spendable cash while shopping
    pub money: u32,
    /// Cards for sale
    pub offers: Vec<CardId>,
    /// Reached by winning (false when sent back by a retry)
    pub victory: bool,
    /// A purchase or trash happened since the snapshot
    pub dirty: bool,
}

/// Shop contents at the moment the shop opened
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VictorySnapshot {
    pub deck: Vec<CardId>,
    pub money: u32,
    pub offers: Vec<CardId>,
}

/// End-of-campaign stats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignSummary {
    pub retries: u32,
    pub money_total: u32,
}

/// A full run through the level table
#[derive(Debug, Clone)]
pub struct Session {
    config: GameConfig,
    table: SpawnTable,
    state: SessionState,
    level: usize,
    pub sim: SimulationState,
    pub shop: ShopState,
    snapshot: Option<VictorySnapshot>,
    /// Money held when the current level started
    level_start_money: u32,
}

impl Session {
    /// Start a run with the standard spawn table
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_table(config, SpawnTable::standard())
    }

    pub fn with_table(config: GameConfig, table: SpawnTable) -> Result<Self, ConfigError> {
        config.validate()?;
        let cards = config.starting_cards()?;
        let sim = SimulationState::new(&config, cards);
        log::info!(
            "New session: {} levels, seed {}",
            config.levels.len(),
            config.run_seed
        );
        Ok(Self {
            config,
            table,
            state: SessionState::Loading,
            level: 0,
            sim,
            shop: ShopState::default(),
            snapshot: None,
            level_start_money: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Index into the level table
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn snapshot(&self) -> Option<&VictorySnapshot> {
        self.snapshot.as_ref()
    }

    /// The ship is destroyed and only a retry is possible
    pub fn is_player_dead(&self) -> bool {
        self.state == SessionState::Gameplay
            && self.sim.score.damage >= self.sim.player.max_health
    }

    /// The final level has been won
    pub fn is_campaign_complete(&self) -> bool {
        self.state == SessionState::LevelWon
            && self.shop.victory
            && self.level + 1 == self.config.levels.len()
    }

    pub fn summary(&self) -> Option<CampaignSummary> {
        self.is_campaign_complete().then(|| CampaignSummary {
            retries: self.sim.score.retries,
            money_total: self.sim.score.money_total,
        })
    }

    /// Advance by `dt` ms and return the events produced
    pub fn update(&mut self, input: &SessionInput, dt: f32) -> Vec<GameEvent> {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        match self.state {
            SessionState::Loading => {
                if input.assets_pending == 0 {
                    self.set_state(SessionState::GameplayInit);
                }
            }
            SessionState::GameplayInit => {
                self.start_level();
                self.gameplay(&input.tick, dt);
            }
            SessionState::Gameplay => self.gameplay(&input.tick, dt),
            SessionState::LevelWonInit => self.level_won_init(),
            SessionState::LevelWon => {}
        }

        self.sim.drain_events()
    }

    fn set_state(&mut self, state: SessionState) {
        log::debug!("Session {} -> {}", self.state.as_str(), state.as_str());
        self.state = state;
    }

    fn start_level(&mut self) {
        let Some(spec) = self.config.levels.get(self.level) else {
            log::warn!("No level {} in the table", self.level);
            return;
        };
        self.sim.start_level(self.level, spec, &self.table);
        self.level_start_money = self.sim.score.money;
        self.set_state(SessionState::Gameplay);
    }

    fn gameplay(&mut self, input: &TickInput, mut dt: f32) {
        if input.fast_forward {
            dt *= self.config.fast_forward_scale;
        }
        tick(&mut self.sim, input, dt);
        if level_won(&self.sim) {
            self.set_state(SessionState::LevelWonInit);
        }
    }

    /// Bank the level's earnings, snapshot the deck and open the shop
    fn level_won_init(&mut self) {
        self.sim.deck.cards_to_deck();
        let money = self.sim.score.money;
        let earned = money.saturating_sub(self.level_start_money);
        self.sim.score.money_total = self.sim.score.money_total.saturating_add(earned);
        log::info!(
            "Level {} won: {} kills, earned ${}, holding ${}",
            self.level,
            self.sim.score.kills,
            earned,
            money
        );

        self.shop = ShopState {
            money,
            offers: Vec::new(),
            victory: true,
            dirty: false,
        };
        self.snapshot = Some(VictorySnapshot {
            deck: self.sim.deck.deck.clone(),
            money,
            offers: Vec::new(),
        });
        self.gen_offers();
        self.sim.events.push(GameEvent::LevelWon { level: self.level });
        self.set_state(SessionState::LevelWon);
    }

    /// Two random cards from each tier's pool
    fn gen_offers(&mut self) {
        let rng = &mut self.sim.rng;
        let mut offers = Vec::with_capacity(CARDS_BY_TIER.len() * OFFERS_PER_TIER);
        for pool in CARDS_BY_TIER {
            for _ in 0..OFFERS_PER_TIER {
                offers.push(pool[rng.random_range(0..pool.len())]);
            }
        }
        if let Some(snapshot) = self.snapshot.as_mut() {
            snapshot.offers = offers.clone();
        }
        self.shop.offers = offers;
    }

    fn check_shop(&self) -> Result<(), ShopError> {
        if self.state != SessionState::LevelWon {
            return Err(ShopError::NotInShop);
        }
        if self.is_campaign_complete() {
            return Err(ShopError::CampaignComplete);
        }
        Ok(())
    }

    /// Buy the offer at `slot` into the deck
    pub fn buy(&mut self, slot: usize) -> Result<CardId, ShopError> {
        self.check_shop()?;
        let id = *self
            .shop
            .offers
            .get(slot)
            .ok_or(ShopError::NoSuchOffer(slot))?;
        let cost = self.config.cost_for_tier(id.tier());
        if cost > self.shop.money {
            return Err(ShopError::CannotAfford {
                cost,
                money: self.shop.money,
            });
        }

        self.shop.money -= cost;
        self.shop.offers.remove(slot);
        self.sim.deck.deck.push(id);
        self.shop.dirty = true;
        self.sim.events.push(GameEvent::sound(SoundEffect::ButtonClick));
        log::info!("Bought {} for ${}", id.as_str(), cost);
        Ok(id)
    }

    /// Remove the deck card at `slot`
    pub fn trash(&mut self, slot: usize) -> Result<CardId, ShopError> {
        self.check_shop()?;
        let deck_len = self.sim.deck.deck.len();
        if slot >= deck_len {
            return Err(ShopError::NoSuchCard(slot));
        }
        if deck_len <= self.config.min_deck_size {
            return Err(ShopError::DeckAtMinimum(self.config.min_deck_size));
        }
        let cost = self.config.trash_cost;
        if cost > self.shop.money {
            return Err(ShopError::CannotAfford {
                cost,
                money: self.shop.money,
            });
        }

        self.shop.money -= cost;
        let id = self.sim.deck.deck.remove(slot);
        self.shop.dirty = true;
        self.sim.events.push(GameEvent::sound(SoundEffect::ButtonClick));
        log::info!("Trashed {} for ${}", id.as_str(), cost);
        Ok(id)
    }

    /// Put money, offers and deck back the way the shop opened
    pub fn undo(&mut self) -> Result<(), ShopError> {
        self.check_shop()?;
        let snapshot = match (&self.snapshot, self.shop.dirty) {
            (Some(snapshot), true) => snapshot,
            _ => return Err(ShopError::NothingToUndo),
        };
        self.shop.money = snapshot.money;
        self.shop.offers = snapshot.offers.clone();
        self.sim.deck.deck = snapshot.deck.clone();
        self.shop.dirty = false;
        log::info!("Shop undo, back to ${}", self.shop.money);
        Ok(())
    }

    /// Leave the shop for the next level, carrying money and deck forward
    pub fn next_level(&mut self) -> Result<(), ShopError> {
        self.check_shop()?;
        self.sim.deck.deck.sort_by(canonical_order);
        self.sim.score.money = self.shop.money;
        self.level += 1;
        self.sim.events.push(GameEvent::sound(SoundEffect::ButtonClick));
        self.set_state(SessionState::GameplayInit);
        Ok(())
    }

    /// Retry after the ship was destroyed.
    ///
    /// On the first level the run restarts from scratch. Later levels go
    /// back to the previous level's shop with the money and deck it opened
    /// with, so the player can re-shop before replaying.
    pub fn retry(&mut self) -> Result<(), ShopError> {
        if !self.is_player_dead() {
            return Err(ShopError::NotDead);
        }
        self.sim.score.retries += 1;
        log::info!(
            "Retry #{} at level {}",
            self.sim.score.retries,
            self.level
        );

        let snapshot = match &self.snapshot {
            Some(snapshot) if self.level > 0 => snapshot.clone(),
            _ => {
                self.sim.score.money = 0;
                self.start_level();
                return Ok(());
            }
        };

        self.sim.deck.cards_to_deck();
        self.sim.deck.deck = snapshot.deck;
        self.sim.score.money = snapshot.money;
        self.level -= 1;
        self.shop = ShopState {
            money: snapshot.money,
            offers: Vec::new(),
            victory: false,
            dirty: false,
        };
        self.gen_offers();
        self.set_state(SessionState::LevelWon);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LevelSpec;

    fn loaded_session(config: GameConfig) -> Session {
        let mut session = Session::new(config).unwrap();
        session.update(&SessionInput::default(), 16.0);
        assert_eq!(session.state(), SessionState::GameplayInit);
        session
    }

    fn clear_wave() -> SessionInput {
        SessionInput {
            tick: TickInput {
                debug_clear_wave: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn kill_player() -> SessionInput {
        SessionInput {
            tick: TickInput {
                debug_kill: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Win the current level and open the shop
    fn win_level(session: &mut Session) -> Vec<GameEvent> {
        // Shots already in flight have to leave the board first
        for _ in 0..300 {
            session.update(&clear_wave(), 16.0);
            if session.state() == SessionState::LevelWonInit {
                break;
            }
        }
        assert_eq!(session.state(), SessionState::LevelWonInit);
        assert!(session.sim.bullets.is_empty());
        session.update(&SessionInput::default(), 16.0)
    }

    #[test]
    fn test_loading_waits_for_assets() {
        let mut session = Session::new(GameConfig::default()).unwrap();
        let pending = SessionInput {
            assets_pending: 3,
            ..Default::default()
        };
        session.update(&pending, 16.0);
        assert_eq!(session.state(), SessionState::Loading);
        session.update(&SessionInput::default(), 16.0);
        assert_eq!(session.state(), SessionState::GameplayInit);
        let events = session.update(&SessionInput::default(), 16.0);
        assert_eq!(session.state(), SessionState::Gameplay);
        assert!(events.contains(&GameEvent::LevelStarted { level: 0 }));
        assert_eq!(session.sim.deck.hand.len(), 5);
    }

    #[test]
    fn test_bad_dt_is_clamped() {
        let mut session = loaded_session(GameConfig::default());
        session.update(&SessionInput::default(), f32::NAN);
        session.update(&SessionInput::default(), -50.0);
        assert_eq!(session.sim.level_time, 0.0);
        session.update(&SessionInput::default(), 10.0);
        assert_eq!(session.sim.level_time, 10.0);
    }

    #[test]
    fn test_fast_forward_scales_clock() {
        let mut session = loaded_session(GameConfig::default());
        session.update(&SessionInput::default(), 0.0);
        let input = SessionInput {
            tick: TickInput {
                fast_forward: true,
                ..Default::default()
            },
            ..Default::default()
        };
        session.update(&input, 10.0);
        assert!((session.sim.level_time - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_win_opens_shop() {
        let mut session = loaded_session(GameConfig::default());
        let events = win_level(&mut session);
        assert_eq!(session.state(), SessionState::LevelWon);
        assert!(events.contains(&GameEvent::LevelWon { level: 0 }));
        assert!(session.shop.victory);
        assert_eq!(session.shop.offers.len(), 6);
        for (ii, id) in session.shop.offers.iter().enumerate() {
            assert_eq!(usize::from(id.tier()), ii / 2);
        }
        // Every card is back in the deck
        assert_eq!(session.sim.deck.deck.len(), 11);
        assert!(session.sim.deck.hand.is_empty());
        assert_eq!(session.snapshot().map(|s| s.offers.len()), Some(6));
    }

    #[test]
    fn test_buy_trash_undo() {
        let mut session = loaded_session(GameConfig::default());
        win_level(&mut session);
        assert_eq!(session.undo(), Err(ShopError::NothingToUndo));
        assert!(matches!(session.buy(0), Err(ShopError::CannotAfford { cost: 100, money: 0 })));

        session.shop.money = 1000;
        if let Some(snapshot) = session.snapshot.as_mut() {
            snapshot.money = 1000;
        }
        let offers = session.shop.offers.clone();
        let bought = session.buy(0).unwrap();
        assert_eq!(bought, offers[0]);
        assert_eq!(session.shop.money, 900);
        assert_eq!(session.shop.offers.len(), 5);
        assert_eq!(session.sim.deck.deck.len(), 12);

        session.trash(0).unwrap();
        assert_eq!(session.shop.money, 650);
        assert_eq!(session.sim.deck.deck.len(), 11);
        assert_eq!(session.buy(9), Err(ShopError::NoSuchOffer(9)));
        assert_eq!(session.trash(99), Err(ShopError::NoSuchCard(99)));

        session.undo().unwrap();
        assert_eq!(session.shop.money, 1000);
        assert_eq!(session.shop.offers, offers);
        assert_eq!(session.sim.deck.deck.len(), 11);
        assert!(!session.shop.dirty);
    }

    #[test]
    fn test_trash_keeps_minimum_deck() {
        let mut session = loaded_session(GameConfig::default());
        win_level(&mut session);
        session.shop.money = 10_000;
        for _ in 0..6 {
            session.trash(0).unwrap();
        }
        assert_eq!(session.sim.deck.deck.len(), 5);
        assert_eq!(session.trash(0), Err(ShopError::DeckAtMinimum(5)));
        assert_eq!(session.shop.money, 10_000 - 6 * 250);
    }

    #[test]
    fn test_next_level_carries_money_and_deck() {
        let mut session = loaded_session(GameConfig::default());
        win_level(&mut session);
        session.shop.money = 500;
        let bought = session.buy(2).unwrap();
        assert!(session.shop.money < 500);
        let money = session.shop.money;
        session.next_level().unwrap();
        assert_eq!(session.level(), 1);
        assert_eq!(session.state(), SessionState::GameplayInit);
        session.update(&SessionInput::default(), 16.0);
        assert_eq!(session.state(), SessionState::Gameplay);
        assert_eq!(session.sim.score.money, money);
        assert!(session.sim.deck.all_cards().contains(&bought));
        assert_eq!(session.sim.deck.total_cards(), 12);
    }

    #[test]
    fn test_shop_actions_outside_shop() {
        let mut session = loaded_session(GameConfig::default());
        assert_eq!(session.buy(0), Err(ShopError::NotInShop));
        assert_eq!(session.next_level(), Err(ShopError::NotInShop));
        assert_eq!(session.retry(), Err(ShopError::NotDead));
    }

    #[test]
    fn test_retry_first_level_resets() {
        let mut session = loaded_session(GameConfig::default());
        session.update(&SessionInput::default(), 16.0);
        session.sim.score.money = 40;
        session.update(&kill_player(), 16.0);
        assert!(session.is_player_dead());
        session.retry().unwrap();
        assert_eq!(session.state(), SessionState::Gameplay);
        assert_eq!(session.level(), 0);
        assert_eq!(session.sim.score.retries, 1);
        assert_eq!(session.sim.score.money, 0);
        assert_eq!(session.sim.score.damage, 0);
        assert_eq!(session.sim.deck.total_cards(), 11);
    }

    #[test]
    fn test_retry_later_level_returns_to_shop() {
        let mut session = loaded_session(GameConfig::default());
        win_level(&mut session);
        session.shop.money = 300;
        if let Some(snapshot) = session.snapshot.as_mut() {
            snapshot.money = 300;
        }
        let deck_at_win = session.sim.deck.deck.clone();
        session.buy(0).unwrap();
        session.next_level().unwrap();
        session.update(&SessionInput::default(), 16.0);
        session.update(&kill_player(), 16.0);

        session.retry().unwrap();
        assert_eq!(session.state(), SessionState::LevelWon);
        assert_eq!(session.level(), 0);
        assert!(!session.shop.victory);
        assert_eq!(session.shop.money, 300);
        assert_eq!(session.sim.deck.deck, deck_at_win);
        assert_eq!(session.shop.offers.len(), 6);
        assert_eq!(session.sim.score.retries, 1);

        // Replay the level from the shop
        session.next_level().unwrap();
        assert_eq!(session.level(), 1);
    }

    #[test]
    fn test_campaign_complete_summary() {
        let config = GameConfig {
            levels: vec![LevelSpec::new("only", 10, 1000.0)],
            ..Default::default()
        };
        let mut session = loaded_session(config);
        session.update(&SessionInput::default(), 16.0);
        session.sim.score.money = 70;
        win_level(&mut session);
        assert!(session.is_campaign_complete());
        assert_eq!(
            session.summary(),
            Some(CampaignSummary {
                retries: 0,
                money_total: 70
            })
        );
        assert_eq!(session.next_level(), Err(ShopError::CampaignComplete));
        assert_eq!(session.buy(0), Err(ShopError::CampaignComplete));
    }

    #[test]
    fn test_money_total_counts_earnings_only() {
        let mut session = loaded_session(GameConfig::default());
        session.update(&SessionInput::default(), 16.0);
        session.sim.score.money = 400;
        win_level(&mut session);
        assert_eq!(session.sim.score.money_total, 400);
        session.buy(0).unwrap();
        session.next_level().unwrap();
        session.update(&SessionInput::default(), 16.0);
        let start = session.sim.score.money;
        session.sim.score.money += 50;
        win_level(&mut session);
        assert_eq!(session.sim.score.money_total, 450);
        assert_eq!(session.shop.money, start + 50);
    }
}
