//! End-to-end runs of the session state machine

use deckfire::GameConfig;
use deckfire::consts::BOARD_W;
use deckfire::sim::{GameEvent, Player, Session, SessionInput, SessionState, SpawnTable, TickInput};

const FRAME_MS: f32 = 1000.0 / 60.0;

fn idle_input() -> SessionInput {
    SessionInput::default()
}

/// Step until `done` holds or `max_frames` pass; returns the events seen
fn run_until(
    session: &mut Session,
    max_frames: usize,
    done: impl Fn(&Session) -> bool,
) -> Vec<GameEvent> {
    let input = idle_input();
    let mut events = Vec::new();
    for _ in 0..max_frames {
        if done(session) {
            break;
        }
        events.extend(session.update(&input, FRAME_MS));
    }
    events
}

fn sturdy_config() -> GameConfig {
    GameConfig {
        player_max_health: 1_000_000,
        ..GameConfig::default()
    }
}

#[test]
fn test_first_wave_budget_and_timing() {
    let config = GameConfig::default();
    let level = &config.levels[0];
    assert_eq!(level.seed, "level1b");

    let wave = SpawnTable::standard().generate(&level.seed, level.hp_budget, level.duration_ms);
    assert!(wave.total_hp() >= level.hp_budget);
    assert!(!wave.spawns.is_empty());

    // Pattern starts fit in the level; the longest pattern trails 3.6 s behind
    for spawn in &wave.spawns {
        assert!(spawn.t >= 0.0);
        assert!(spawn.t <= level.duration_ms + 3600.0 + 1.0, "late spawn at {}", spawn.t);
        assert!(spawn.x >= 0.0 && spawn.x <= BOARD_W);
    }
    // Popped from the back, so the earliest arrival is last
    for pair in wave.spawns.windows(2) {
        assert!(pair[0].t >= pair[1].t);
    }
}

#[test]
fn test_idle_ship_survives_first_level() {
    let mut session = Session::new(sturdy_config()).expect("default config is valid");
    assert_eq!(session.state(), SessionState::Loading);

    // Two minutes is plenty for every enemy to drift off the bottom
    let events = run_until(&mut session, 120 * 60, |s| s.state() == SessionState::LevelWon);

    assert_eq!(session.state(), SessionState::LevelWon);
    assert_eq!(session.level(), 0);
    assert!(events.contains(&GameEvent::LevelStarted { level: 0 }));
    assert!(events.contains(&GameEvent::LevelWon { level: 0 }));
    assert!(session.shop.victory);
    assert_eq!(session.shop.offers.len(), 6);
    assert!(session.sim.enemies.is_empty());
    assert!(session.sim.spawns.is_empty());
    // Every card went back into the deck for the shop
    assert!(session.sim.deck.hand.is_empty());
    assert!(session.sim.deck.in_play.is_empty());
    assert_eq!(
        session.sim.deck.deck.len(),
        session.config().starting_deck.len()
    );
}

#[test]
fn test_same_config_same_run() {
    let mut a = Session::new(sturdy_config()).expect("valid");
    let mut b = Session::new(sturdy_config()).expect("valid");
    let input = idle_input();
    for _ in 0..600 {
        let ea = a.update(&input, FRAME_MS);
        let eb = b.update(&input, FRAME_MS);
        assert_eq!(ea, eb);
    }
    assert_eq!(a.sim.deck.hand, b.sim.deck.hand);
    assert_eq!(a.sim.enemies.len(), b.sim.enemies.len());
    assert_eq!(a.sim.bullets.len(), b.sim.bullets.len());
}

fn tick_input(tick: TickInput) -> SessionInput {
    SessionInput {
        tick,
        ..Default::default()
    }
}

fn kill_ship(session: &mut Session) {
    let kill = tick_input(TickInput {
        debug_kill: true,
        ..Default::default()
    });
    session.update(&kill, FRAME_MS);
    assert!(session.is_player_dead());
}

fn clear_level(session: &mut Session) {
    let clear = tick_input(TickInput {
        debug_clear_wave: true,
        ..Default::default()
    });
    for _ in 0..600 {
        if session.state() == SessionState::LevelWon {
            return;
        }
        session.update(&clear, FRAME_MS);
    }
    panic!("level never cleared, state {:?}", session.state());
}

#[test]
fn test_retry_on_first_level_restarts_it() {
    let mut session = Session::new(GameConfig::default()).expect("valid");
    run_until(&mut session, 10, |s| s.state() == SessionState::Gameplay);
    assert!(session.retry().is_err());

    kill_ship(&mut session);
    session.retry().expect("dead ship can retry");
    assert_eq!(session.sim.score.retries, 1);
    assert_eq!(session.level(), 0);
    assert_eq!(session.sim.score.money, 0);
    assert_eq!(session.state(), SessionState::Gameplay);
    assert!(!session.is_player_dead());
    assert_eq!(session.sim.player.pos, Player::start_pos());
}

#[test]
fn test_retry_on_later_level_restores_shop() {
    let mut session = Session::new(GameConfig::default()).expect("valid");
    clear_level(&mut session);
    assert_eq!(session.level(), 0);

    // Pretend the first level paid well, then shop it into a new deck
    session.shop.money = 1000;
    let opening_deck = session.sim.deck.deck.clone();
    let snapshot_money = session.snapshot().expect("victory snapshot").money;
    session.buy(0).expect("tier 0 is affordable");
    session.next_level().expect("more levels follow");
    run_until(&mut session, 10, |s| s.state() == SessionState::Gameplay);
    assert_eq!(session.level(), 1);
    assert_eq!(session.sim.deck.total_cards(), opening_deck.len() + 1);

    kill_ship(&mut session);
    session.retry().expect("dead ship can retry");

    assert_eq!(session.state(), SessionState::LevelWon);
    assert_eq!(session.level(), 0);
    assert!(!session.shop.victory);
    assert_eq!(session.sim.score.retries, 1);
    assert_eq!(session.shop.money, snapshot_money);
    assert_eq!(session.sim.score.money, snapshot_money);
    assert_eq!(session.sim.deck.deck, opening_deck);
    assert_eq!(session.shop.offers.len(), 6);

    // From the retry shop the level can be replayed
    session.next_level().expect("back to level two");
    run_until(&mut session, 10, |s| s.state() == SessionState::Gameplay);
    assert_eq!(session.level(), 1);
}
