//! Deck zones and timed card effects
//!
//! Cards live in exactly one of four zones: draw pile, hand, discard, or in
//! play. Moving between zones never creates or destroys a card; only the
//! shop adds or removes cards from the whole collection.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cards::{CardId, Effect, WeaponSet, canonical_order};
use crate::consts::*;

/// A played card with its own mutable copy of the effect queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardInPlay {
    pub id: CardId,
    /// Remaining effects; only the head is active
    pub effects: VecDeque<Effect>,
    /// Sum of all effect durations at play time
    pub total: f32,
}

impl CardInPlay {
    pub fn new(id: CardId) -> Self {
        let def = id.def();
        Self {
            id,
            effects: def.effects.iter().copied().collect(),
            total: def.total_duration(),
        }
    }

    /// Time left across all remaining effects (ms)
    pub fn remaining(&self) -> f32 {
        self.effects.iter().map(|e| e.duration).sum()
    }

    /// Fraction of the card still to run, 1.0 when just played
    pub fn progress_left(&self) -> f32 {
        if self.total > 0.0 {
            self.remaining() / self.total
        } else {
            0.0
        }
    }

    pub fn is_guarding(&self) -> bool {
        self.effects.front().is_some_and(|e| e.guard)
    }
}

/// Modifiers accumulated from every active effect during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectTotals {
    /// Lateral steering bias
    pub dx: f32,
    /// Effective shield radius (tiles)
    pub shield: f32,
    pub weapons: WeaponSet,
    /// Damage repaired this tick
    pub heal: u32,
    /// Draw pulses fired this tick (each one attempted an overfill draw)
    pub draws: u32,
}

/// Number of `trigger_at` boundaries crossed going from `old` to `new` remaining
fn trigger_count(old: f32, new: f32, trigger_at: f32) -> u32 {
    let oldi = ((old - 1.0) / trigger_at).floor();
    let newi = ((new - 1.0) / trigger_at).floor();
    (oldi - newi).max(0.0) as u32
}

/// The four card zones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    /// Draw pile; cards are drawn from the end
    pub deck: Vec<CardId>,
    pub discard: Vec<CardId>,
    pub hand: Vec<CardId>,
    pub in_play: Vec<CardInPlay>,
    pub hand_size: usize,
}

impl Deck {
    pub fn new(cards: Vec<CardId>, hand_size: usize) -> Self {
        Self {
            deck: cards,
            discard: Vec::new(),
            hand: Vec::new(),
            in_play: Vec::new(),
            hand_size,
        }
    }

    /// Total cards owned across all zones
    pub fn total_cards(&self) -> usize {
        self.deck.len() + self.discard.len() + self.hand.len() + self.in_play.len()
    }

    /// Every owned card id, in no particular order
    pub fn all_cards(&self) -> Vec<CardId> {
        let mut all = Vec::with_capacity(self.total_cards());
        all.extend_from_slice(&self.deck);
        all.extend_from_slice(&self.discard);
        all.extend_from_slice(&self.hand);
        all.extend(self.in_play.iter().map(|c| c.id));
        all
    }

    pub fn hand_full(&self) -> bool {
        self.hand.len() >= self.hand_size
    }

    /// No cards left to draw from either pile
    pub fn exhausted(&self) -> bool {
        self.deck.is_empty() && self.discard.is_empty()
    }

    /// Fisher-Yates shuffle of the draw pile
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        for ii in (0..self.deck.len()).rev() {
            let idx = rng.random_range(0..=ii);
            self.deck.swap(ii, idx);
        }
    }

    /// Draw one card into the hand, reshuffling the discard pile if needed
    pub fn draw(&mut self, allow_overfill: bool, rng: &mut impl Rng) -> bool {
        if !allow_overfill && self.hand_full() {
            return false;
        }
        if self.deck.is_empty() {
            self.deck = std::mem::take(&mut self.discard);
            self.shuffle(rng);
        }
        match self.deck.pop() {
            Some(card) => {
                self.hand.push(card);
                true
            }
            None => false,
        }
    }

    /// Play the first copy of `id` from the hand
    pub fn play_card(&mut self, id: CardId) -> bool {
        match self.hand.iter().position(|c| *c == id) {
            Some(slot) => self.play_slot(slot).is_some(),
            None => false,
        }
    }

    /// Play the card at hand slot `slot`
    pub fn play_slot(&mut self, slot: usize) -> Option<CardId> {
        if slot >= self.hand.len() {
            return None;
        }
        let id = self.hand.remove(slot);
        self.in_play.push(CardInPlay::new(id));
        Some(id)
    }

    /// Advance every card in play by `dt` ms and collect the active modifiers.
    ///
    /// Leftover time after an effect expires carries into the next effect of
    /// the same card. Pulse effects fire once per `trigger_at` boundary
    /// crossed, however the time is sliced. Draw pulses draw immediately and
    /// may overfill the hand. Exhausted cards go to the discard pile.
    pub fn advance_effects(&mut self, dt: f32, rng: &mut impl Rng) -> EffectTotals {
        let mut totals = EffectTotals::default();

        for ii in (0..self.in_play.len()).rev() {
            let mut cdt = dt;
            while cdt > 0.0 {
                let Some(head) = self.in_play[ii].effects.front_mut() else {
                    break;
                };
                let duration_old = head.duration;
                let finished = cdt >= head.duration;
                let mut portion = 1.0;
                if finished {
                    portion = head.duration / cdt;
                    cdt -= head.duration;
                    head.duration = 0.0;
                } else {
                    head.duration -= cdt;
                    cdt = 0.0;
                }
                let e = *head;
                if finished {
                    self.in_play[ii].effects.pop_front();
                }

                let pulses = match e.trigger_at {
                    Some(t) => trigger_count(duration_old, e.duration, t),
                    None => u32::from(finished),
                };
                if e.trigger_at.is_some() {
                    portion = pulses as f32;
                }

                if e.dx != 0.0 {
                    totals.dx += portion * e.dx;
                }
                if e.hp > 0 {
                    totals.heal += e.hp * pulses;
                }
                for _ in 0..e.draw * pulses {
                    totals.draws += 1;
                    self.draw(true, rng);
                }
                if e.shield_grow > 0.0 {
                    let grown = e.shield_grow * (1.0 - e.duration / SHIELD_GROW_TIME);
                    totals.shield = totals.shield.max(grown);
                }
                if e.shield_shrink > 0.0 {
                    let left = e.shield_shrink * e.duration / SHIELD_SHRINK_TIME;
                    totals.shield = totals.shield.max(left);
                }
                if let Some(weapon) = e.weapon {
                    totals.weapons.insert(weapon);
                }
            }

            if self.in_play[ii].effects.is_empty() {
                let card = self.in_play.remove(ii);
                self.discard.push(card.id);
            }
        }

        totals
    }

    /// Discard the first in-play card whose active effect guards. Returns
    /// whether a hit was blocked.
    pub fn consume_guard(&mut self) -> bool {
        match self.in_play.iter().position(CardInPlay::is_guarding) {
            Some(idx) => {
                let card = self.in_play.remove(idx);
                self.discard.push(card.id);
                true
            }
            None => false,
        }
    }

    /// Merge every zone back into the draw pile in canonical order
    pub fn cards_to_deck(&mut self) {
        self.deck.append(&mut self.discard);
        self.deck.append(&mut self.hand);
        self.deck.extend(self.in_play.drain(..).map(|c| c.id));
        self.deck.sort_by(canonical_order);
    }
}
