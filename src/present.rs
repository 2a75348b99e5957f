//! Presentation requests
//!
//! Turns a `Session` into a flat list of sprite and text requests for
//! whatever renderer the host uses. Nothing here feeds back into the
//! simulation; a frame can be built or skipped at will.

use glam::{Vec2, Vec4};

use crate::consts::*;
use crate::sim::{BulletOwner, CardId, EnemyKind, Session, SessionState};

/// Depth layers, back to front
pub mod z {
    pub const BORDER: f32 = 5.0;
    pub const SPRITES: f32 = 10.0;
    pub const UI: f32 = 100.0;
}

pub const WHITE: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
pub const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
pub const GREEN: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);
pub const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);
pub const GHOST: Vec4 = Vec4::new(1.0, 1.0, 1.0, 0.5);

/// Sprite to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteId {
    Player,
    Enemy(EnemyKind),
    BulletSmall,
    BulletLarge,
    Shield,
    Card(CardId),
    /// Solid rectangle
    Rect,
    Vignette,
}

/// Font style for a text request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Hand,
    Floater,
    Victory,
    Retry,
    Cash,
    Section,
    Price,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawRequest {
    pub sprite: SpriteId,
    /// Center in virtual pixels
    pub pos: Vec2,
    pub z: f32,
    pub tint: Vec4,
    /// Size in virtual pixels
    pub size: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub style: TextStyle,
    pub pos: Vec2,
    pub text: String,
    pub alpha: f32,
}

/// Everything to draw this frame
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub draws: Vec<DrawRequest>,
    pub texts: Vec<TextRequest>,
}

impl DrawList {
    fn sprite(&mut self, sprite: SpriteId, pos: Vec2, z: f32, tint: Vec4, size: Vec2) {
        self.draws.push(DrawRequest {
            sprite,
            pos,
            z,
            tint,
            size,
        });
    }

    fn text(&mut self, style: TextStyle, pos: Vec2, text: impl Into<String>) {
        self.texts.push(TextRequest {
            style,
            pos,
            text: text.into(),
            alpha: 1.0,
        });
    }

    /// Whether any text request contains `needle`
    pub fn has_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.text.contains(needle))
    }
}

/// Build the frame for the session's current state. `hover_slot` is the
/// hand slot under the pointer, if any.
pub fn build_frame(session: &Session, hover_slot: Option<usize>) -> DrawList {
    let mut list = DrawList::default();
    match session.state() {
        SessionState::Loading => list.text(TextStyle::Section, Vec2::new(20.0, 20.0), "Loading..."),
        SessionState::GameplayInit | SessionState::Gameplay | SessionState::LevelWonInit => {
            draw_board(session, hover_slot, &mut list);
            draw_hand(session, hover_slot, &mut list);
        }
        SessionState::LevelWon => draw_shop(session, &mut list),
    }
    list
}

fn draw_board(session: &Session, hover_slot: Option<usize>, list: &mut DrawList) {
    let sim = &session.sim;
    let tile = Vec2::splat(BOARD_TILE);
    let half_tile = tile / 2.0;

    // Player blinks red on damage, blue on a guard block
    let p = &sim.player;
    if !sim.player_dead {
        let flash = if p.hit_was_blocked { BLUE } else { RED };
        let tint = flash.lerp(WHITE, 1.0 - p.hit_cooldown / PLAYER_HIT_BLINK_TIME);
        let pos = crate::board_to_screen(p.pos);
        list.sprite(SpriteId::Player, pos, z::SPRITES, tint, half_tile);

        // Preview where a hovered move card would take the ship
        let idle = sim.deck.in_play.iter().all(|c| c.id == CardId::React);
        let hovered = hover_slot.and_then(|slot| sim.deck.hand.get(slot)).copied();
        if let (true, Some(id)) = (idle, hovered) {
            for x in ghost_positions(id, p.pos.x) {
                let ghost = crate::board_to_screen(Vec2::new(x, p.pos.y));
                list.sprite(SpriteId::Player, ghost, z::SPRITES - 1.0, GHOST, half_tile);
            }
        }
    }
    if p.shield > 0.1 {
        let pos = crate::board_to_screen(p.pos);
        let size = Vec2::splat(p.shield * BOARD_TILE * 2.0);
        list.sprite(SpriteId::Shield, pos, z::SPRITES - 1.0, Vec4::new(0.5, 0.5, 1.0, 1.0), size);
    }

    for e in &sim.enemies {
        let pos = crate::board_to_screen(e.pos);
        let mut tint = WHITE;
        if let Some(blink_at) = e.blink_at {
            let since = e.age - blink_at;
            if since < ENEMY_HIT_BLINK_TIME {
                tint = WHITE.lerp(RED, 1.0 - since / ENEMY_HIT_BLINK_TIME);
            }
            // Damaged enemies show a health bar
            let bar = Vec2::new(32.0, 6.0);
            let bar_pos = pos - Vec2::new(0.0, 24.0);
            list.sprite(SpriteId::Rect, bar_pos, z::SPRITES + 10.0, Vec4::new(0.5, 0.0, 0.0, 1.0), bar);
            let frac = e.hp as f32 / e.max_hp as f32;
            let fill = Vec2::new(bar.x * frac, bar.y);
            let fill_pos = bar_pos - Vec2::new((bar.x - fill.x) / 2.0, 0.0);
            list.sprite(SpriteId::Rect, fill_pos, z::SPRITES + 11.0, Vec4::new(0.0, 0.5, 0.0, 1.0), fill);
        }
        list.sprite(SpriteId::Enemy(e.kind), pos, z::SPRITES, tint, half_tile);
    }

    for b in &sim.bullets {
        let pos = crate::board_to_screen(b.pos);
        let (sprite, tint) = match b.owner {
            BulletOwner::Player => (SpriteId::BulletSmall, GREEN),
            BulletOwner::Enemy => (SpriteId::BulletLarge, RED),
        };
        list.sprite(sprite, pos, z::SPRITES, tint, half_tile / 2.0);
    }

    let vignette = Vec4::new(0.0, 0.0, 0.0, 1.0).lerp(RED, (p.hit_cooldown / PLAYER_HIT_BLINK_TIME).clamp(0.0, 1.0));
    let board = Vec2::new(BOARD_W, BOARD_H) * BOARD_TILE;
    list.sprite(
        SpriteId::Vignette,
        Vec2::new(BOARD_X0, BOARD_Y0) + board / 2.0,
        z::BORDER,
        vignette,
        board,
    );

    for f in &sim.floaters {
        list.texts.push(TextRequest {
            style: TextStyle::Floater,
            pos: f.current_pos(),
            text: f.text.clone(),
            alpha: f.alpha(),
        });
    }
}

/// Where a move card would steer the ship from `x`
fn ghost_positions(id: CardId, x: f32) -> Vec<f32> {
    let clamp = |v: f32| crate::clamp(v, PLAYER_BORDER_PAD, BOARD_W - PLAYER_BORDER_PAD);
    match id {
        CardId::MoveLeft => vec![clamp(x - 2.25)],
        CardId::MoveRight => vec![clamp(x + 2.25)],
        CardId::Zigzag => {
            let a = clamp(x - 2.25 * 0.4);
            let b = clamp(a + 2.25 * 0.4 * 2.0);
            let c = clamp(b - 2.25 * 0.4);
            vec![a, b, c]
        }
        _ => Vec::new(),
    }
}

fn draw_hand(session: &Session, hover_slot: Option<usize>, list: &mut DrawList) {
    let sim = &session.sim;
    let deck = &sim.deck;
    let x0 = BOARD_X0;
    let y0 = GAME_HEIGHT - (HAND_BELOW_H - 40.0);
    let card = Vec2::new(CARD_W, CARD_H);

    if sim.player_dead {
        list.text(TextStyle::Hand, Vec2::new(x0 + 24.0, y0 + CARD_H / 2.0 - 12.0), "SHIP DESTROYED");
        return;
    }

    list.text(TextStyle::Hand, Vec2::new(x0, y0 - 38.0), "HAND");
    for (ii, id) in deck.hand.iter().enumerate() {
        let scale = if hover_slot == Some(ii) { 1.2 } else { 1.0 };
        let pos = Vec2::new(x0 + CARD_W * ii as f32, y0) + card / 2.0;
        let z = z::UI + ii as f32 * 10.0;
        list.sprite(SpriteId::Card(*id), pos, z, WHITE, card * scale);
        if ii < 9 {
            list.text(TextStyle::Hand, pos + Vec2::new(0.0, CARD_H / 2.0), format!("{}", ii + 1));
        }
    }

    let slot_x = x0 + CARD_W * deck.hand.len() as f32;
    let message = if deck.exhausted() {
        "No more cards"
    } else if deck.hand_full() {
        "Hand full"
    } else {
        let fill = sim.draw_countdown / sim.draw_rate;
        let pos = Vec2::new(slot_x + CARD_W / 2.0, y0 + CARD_H * (1.0 + fill) / 2.0);
        let size = Vec2::new(CARD_W, CARD_H * (1.0 - fill));
        list.sprite(SpriteId::Rect, pos, z::UI, Vec4::new(0.5, 0.5, 0.5, 1.0), size);
        "Draw..."
    };
    list.text(TextStyle::Hand, Vec2::new(slot_x + 5.0, y0), message);

    // Cards in play with a progress bar of time left
    let play_y = y0 - CARD_H - 60.0;
    for (ii, c) in deck.in_play.iter().enumerate() {
        let pos = Vec2::new(x0 + CARD_W * ii as f32, play_y) + card / 2.0;
        list.sprite(SpriteId::Card(c.id), pos, z::UI, WHITE, card);
        let left = c.progress_left();
        let bar = Vec2::new(CARD_W * left, 6.0);
        let bar_pos = Vec2::new(x0 + CARD_W * ii as f32 + bar.x / 2.0, play_y + CARD_H + 4.0);
        list.sprite(SpriteId::Rect, bar_pos, z::UI + 1.0, GREEN, bar);
    }
}

fn draw_shop(session: &Session, list: &mut DrawList) {
    let shop = &session.shop;
    let level = session.level() + 1;
    let center_x = GAME_WIDTH / 2.0;

    let result = if shop.victory { "Complete" } else { "Failed" };
    list.text(TextStyle::Section, Vec2::new(center_x, 28.0), format!("Level {level} {result}!"));
    if shop.victory {
        list.text(TextStyle::Victory, Vec2::new(center_x, 110.0), "VICTORY!");
    } else {
        list.text(TextStyle::Retry, Vec2::new(center_x, 110.0), "RETRY LEVEL");
    }
    list.text(TextStyle::Cash, Vec2::new(center_x, 160.0), format!("Cash: ${}", shop.money));

    if let Some(summary) = session.summary() {
        list.text(TextStyle::Section, Vec2::new(center_x, 300.0), "All levels complete!");
        list.text(TextStyle::Section, Vec2::new(center_x, 344.0), "Thanks for playing!");
        list.text(TextStyle::Section, Vec2::new(center_x, 432.0), format!("Deaths: {}", summary.retries));
        list.text(
            TextStyle::Section,
            Vec2::new(center_x, 476.0),
            format!("Total Cash Earned: ${}", summary.money_total),
        );
        return;
    }

    let config = session.config();
    let mut y = 250.0;
    list.text(TextStyle::Section, Vec2::new(40.0, y), "BUY NEW CARDS:");
    y += 44.0;
    let big = Vec2::new(CARD_W, CARD_H) * 1.5;
    for (ii, id) in shop.offers.iter().enumerate() {
        let cost = config.cost_for_tier(id.tier());
        let pos = Vec2::new(40.0 + (big.x + 8.0) * ii as f32, y) + big / 2.0;
        let tint = if cost <= shop.money { WHITE } else { Vec4::new(0.5, 0.5, 0.5, 1.0) };
        list.sprite(SpriteId::Card(*id), pos, z::UI + ii as f32 * 10.0, tint, big);
        list.text(TextStyle::Price, pos + Vec2::new(0.0, big.y / 2.0 + 6.0), format!("${cost}"));
    }
    y += big.y + 40.0;

    let deck = &session.sim.deck.deck;
    let can_trash = deck.len() > config.min_deck_size;
    let header = if can_trash {
        "YOUR DECK - click to trash:".to_string()
    } else {
        format!("YOUR DECK - {} cards minimum", config.min_deck_size)
    };
    list.text(TextStyle::Section, Vec2::new(40.0, y), header);
    y += 44.0;
    let card = Vec2::new(CARD_W, CARD_H);
    let per_row = (((GAME_WIDTH - 60.0) / (CARD_W + 8.0)) as usize).max(1);
    for (ii, id) in deck.iter().enumerate() {
        let row = (ii / per_row) as f32;
        let col = (ii % per_row) as f32;
        let pos = Vec2::new(40.0 + (CARD_W + 8.0) * col, y + (CARD_H + 40.0) * row) + card / 2.0;
        list.sprite(SpriteId::Card(*id), pos, z::UI, WHITE, card);
        if can_trash {
            list.text(TextStyle::Price, pos + Vec2::new(0.0, CARD_H / 2.0 + 6.0), format!("${}", config.trash_cost));
        }
    }

    if shop.dirty {
        list.text(TextStyle::Section, Vec2::new(center_x - 400.0, GAME_HEIGHT - 104.0), "UNDO");
    }
    list.text(TextStyle::Section, Vec2::new(center_x + 20.0, GAME_HEIGHT - 104.0), "Next Level");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::{SessionInput, TickInput};

    fn playing_session() -> Session {
        let mut session = Session::new(GameConfig::default()).unwrap();
        session.update(&SessionInput::default(), 16.0);
        session.update(&SessionInput::default(), 16.0);
        session
    }

    fn count(list: &DrawList, sprite: SpriteId) -> usize {
        list.draws.iter().filter(|d| d.sprite == sprite).count()
    }

    #[test]
    fn test_gameplay_frame_has_player_and_hand() {
        let session = playing_session();
        let list = build_frame(&session, None);
        assert_eq!(count(&list, SpriteId::Player), 1);
        let cards = list
            .draws
            .iter()
            .filter(|d| matches!(d.sprite, SpriteId::Card(_)))
            .count();
        assert_eq!(cards, 5);
        assert!(list.has_text("Hand full"));
    }

    #[test]
    fn test_hovered_move_card_shows_ghost() {
        let mut session = playing_session();
        session.sim.deck.hand[0] = CardId::Zigzag;
        let list = build_frame(&session, Some(0));
        assert_eq!(count(&list, SpriteId::Player), 4);
        let hovered = list
            .draws
            .iter()
            .find(|d| d.sprite == SpriteId::Card(CardId::Zigzag))
            .map(|d| d.size);
        assert_eq!(hovered, Some(Vec2::new(CARD_W, CARD_H) * 1.2));
    }

    #[test]
    fn test_hit_tint_fades_to_white() {
        let mut session = playing_session();
        session.sim.player.hit_cooldown = PLAYER_HIT_BLINK_TIME;
        let list = build_frame(&session, None);
        let tint = list.draws.iter().find(|d| d.sprite == SpriteId::Player).map(|d| d.tint);
        assert_eq!(tint, Some(RED));
        session.sim.player.hit_cooldown = 0.0;
        let list = build_frame(&session, None);
        let tint = list.draws.iter().find(|d| d.sprite == SpriteId::Player).map(|d| d.tint);
        assert_eq!(tint, Some(WHITE));
    }

    #[test]
    fn test_dead_player_hidden() {
        let mut session = playing_session();
        let input = SessionInput {
            tick: TickInput {
                debug_kill: true,
                ..Default::default()
            },
            ..Default::default()
        };
        session.update(&input, 16.0);
        let list = build_frame(&session, None);
        assert_eq!(count(&list, SpriteId::Player), 0);
        assert!(list.has_text("SHIP DESTROYED"));
    }

    #[test]
    fn test_shop_frame_lists_prices() {
        let mut session = playing_session();
        let clear = SessionInput {
            tick: TickInput {
                debug_clear_wave: true,
                ..Default::default()
            },
            ..Default::default()
        };
        while session.state() == SessionState::Gameplay {
            session.update(&clear, 16.0);
        }
        session.update(&SessionInput::default(), 16.0);
        assert_eq!(session.state(), SessionState::LevelWon);
        let list = build_frame(&session, None);
        assert!(list.has_text("VICTORY!"));
        assert!(list.has_text("$800"));
        assert!(list.has_text("$250"));
        assert!(list.has_text("Next Level"));
        assert!(!list.has_text("UNDO"));
    }
}
