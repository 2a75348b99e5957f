//! Deckfire headless runner
//!
//! Plays the whole campaign with a simple autopilot at a fixed 60 Hz frame
//! delta and logs how each level went. Pass a JSON config path to override
//! the default balance.

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use deckfire::sim::{BulletOwner, CardId, Session, TickInput};

    /// Plays cards and steers toward the nearest enemy
    #[derive(Debug, Default)]
    pub struct Autopilot {
        /// Frames until the next card play is considered
        cooldown: u32,
    }

    impl Autopilot {
        pub fn input(&mut self, session: &Session) -> TickInput {
            let sim = &session.sim;
            let mut input = TickInput::default();

            // Line up under the lowest enemy
            let target = sim
                .enemies
                .iter()
                .filter(|e| e.pos.y >= 0.0)
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|e| e.pos.x);
            if let Some(x) = target {
                let dx = x - sim.player.pos.x;
                input.left = dx < -0.2;
                input.right = dx > 0.2;
            }

            if self.cooldown > 0 {
                self.cooldown -= 1;
                return input;
            }
            input.play_slot = self.pick_card(session);
            if input.play_slot.is_some() {
                self.cooldown = 30;
            }
            input
        }

        /// Hand slot worth playing right now, if any
        fn pick_card(&self, session: &Session) -> Option<usize> {
            let sim = &session.sim;
            let hand = &sim.deck.hand;
            let slot = |id: CardId| hand.iter().position(|c| *c == id);

            let threatened = sim.bullets.iter().any(|b| {
                b.owner == BulletOwner::Enemy && b.pos.distance_squared(sim.player.pos) < 1.5
            });
            if threatened {
                if let Some(s) = slot(CardId::Shield) {
                    return Some(s);
                }
            }
            let guarded = sim.deck.in_play.iter().any(|c| c.is_guarding());
            if !guarded {
                if let Some(s) = slot(CardId::React) {
                    return Some(s);
                }
            }
            if sim.score.damage > 0 {
                if let Some(s) = slot(CardId::Repair) {
                    return Some(s);
                }
            }
            if sim.enemies.is_empty() && !sim.deck.hand_full() {
                return None;
            }
            [CardId::Beam, CardId::Spread, CardId::Rapid, CardId::Draw3]
                .into_iter()
                .find_map(slot)
                // Burn the oldest card to keep the draw timer running
                .or_else(|| sim.deck.hand_full().then_some(0))
        }

        /// Spend money in the shop, best tier first
        pub fn shop(&self, session: &mut Session) {
            loop {
                let config = session.config();
                let best = session
                    .shop
                    .offers
                    .iter()
                    .enumerate()
                    .filter(|(_, id)| config.cost_for_tier(id.tier()) <= session.shop.money)
                    .max_by_key(|(_, id)| id.tier())
                    .map(|(ii, _)| ii);
                match best {
                    Some(ii) => {
                        if let Err(err) = session.buy(ii) {
                            log::warn!("Autopilot purchase refused: {err}");
                            break;
                        }
                    }
                    None => break,
                }
            }
            log::info!(
                "Shop done: ${} left, deck of {}",
                session.shop.money,
                session.sim.deck.deck.len()
            );
        }
    }

    /// Frame delta for a 60 Hz display (ms)
    pub const FRAME_MS: f32 = 1000.0 / 60.0;

    /// Give up on a level after this much simulated time (ms)
    pub const LEVEL_TIMEOUT_MS: f32 = 10.0 * 60.0 * 1000.0;

    /// Outcome of playing one attempt at a level
    pub fn level_line(session: &Session) -> String {
        let score = &session.sim.score;
        format!(
            "level {} ({} HP budget): kills {}, damage {}/{}, money ${}",
            session.level() + 1,
            session.config().levels[session.level()].hp_budget,
            score.kills,
            score.damage,
            session.sim.player.max_health,
            score.money
        )
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use deckfire::GameConfig;
    use deckfire::audio::{NullAudio, play_events};
    use deckfire::sim::{Session, SessionInput, SessionState};

    use autopilot::{Autopilot, FRAME_MS, LEVEL_TIMEOUT_MS, level_line};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Deckfire (headless) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => GameConfig::default(),
    };
    let mut session = Session::new(config)?;
    let mut pilot = Autopilot::default();
    let mut audio = NullAudio;
    let mut sounds = 0;
    let mut level_time = 0.0;
    let max_retries = 20;

    loop {
        match session.state() {
            SessionState::LevelWon => {
                if let Some(summary) = session.summary() {
                    log::info!(
                        "All levels complete! Deaths: {}, total cash earned: ${}",
                        summary.retries,
                        summary.money_total
                    );
                    break;
                }
                if session.shop.victory {
                    log::info!("Won {} ({} sounds)", level_line(&session), sounds);
                }
                sounds = 0;
                pilot.shop(&mut session);
                session.next_level()?;
                level_time = 0.0;
            }
            _ if session.is_player_dead() => {
                log::info!("Lost {}", level_line(&session));
                if session.sim.score.retries >= max_retries {
                    log::warn!("Giving up after {} retries", max_retries);
                    break;
                }
                session.retry()?;
                level_time = 0.0;
            }
            _ if level_time > LEVEL_TIMEOUT_MS => {
                log::warn!("Timed out on {}", level_line(&session));
                break;
            }
            _ => {
                let input = SessionInput {
                    assets_pending: 0,
                    tick: pilot.input(&session),
                };
                let events = session.update(&input, FRAME_MS);
                sounds += play_events(&mut audio, &events);
                for event in &events {
                    log::trace!("{event:?}");
                }
                level_time += FRAME_MS;
            }
        }
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}
