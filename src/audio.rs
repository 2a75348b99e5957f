//! Sound effect identifiers
//!
//! The simulation never plays audio itself. It emits `GameEvent::Sound`
//! and whatever owns an `AudioSink` turns those into noise.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Regular and spread shots
    Shoot1,
    /// Bomber shot
    Shoot2,
    /// Sniper shot
    Shoot3,
    /// Large enemy shot
    Shoot4,
    ShootRapid,
    /// Guard card absorbed a hit
    ReactBlock,
    /// Shield bubble absorbed a hit
    ShieldBlock,
    /// Draw pulse from a card effect
    Draw3,
    /// Enemy damaged (also drone death)
    Damage1,
    DamagePlayer,
    DestroyedSmall,
    DestroyedLarge,
    // Card play sounds
    Move,
    Zigzag,
    ReactPlay,
    Shield,
    Repair,
    ButtonClick,
    Spread,
    Beam,
}

impl SoundEffect {
    /// Asset name used by the loader
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Shoot1 => "shoot1",
            SoundEffect::Shoot2 => "shoot2",
            SoundEffect::Shoot3 => "shoot3",
            SoundEffect::Shoot4 => "shoot4",
            SoundEffect::ShootRapid => "shoot_rapid",
            SoundEffect::ReactBlock => "react_block",
            SoundEffect::ShieldBlock => "shield_block",
            SoundEffect::Draw3 => "draw3",
            SoundEffect::Damage1 => "damage1",
            SoundEffect::DamagePlayer => "damage_player",
            SoundEffect::DestroyedSmall => "destroyed_small",
            SoundEffect::DestroyedLarge => "destroyed_large",
            SoundEffect::Move => "move",
            SoundEffect::Zigzag => "zigzag",
            SoundEffect::ReactPlay => "react_play",
            SoundEffect::Shield => "shield",
            SoundEffect::Repair => "repair",
            SoundEffect::ButtonClick => "button_click",
            SoundEffect::Spread => "spread",
            SoundEffect::Beam => "beam",
        }
    }
}

/// Anything that can play sounds (Web Audio, a mixer, a test recorder...)
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Sink that drops everything
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Sink that records what was requested
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<(SoundEffect, f32)>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.played.push((effect, volume));
    }
}

/// Forward every sound request in `events` to `sink`
pub fn play_events(sink: &mut impl AudioSink, events: &[GameEvent]) -> usize {
    let mut played = 0;
    for event in events {
        if let GameEvent::Sound { effect, volume } = event {
            sink.play(*effect, *volume);
            played += 1;
        }
    }
    played
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_events_skips_non_sounds() {
        let events = vec![
            GameEvent::sound(SoundEffect::Shoot1),
            GameEvent::ShieldBlock,
            GameEvent::Sound {
                effect: SoundEffect::Beam,
                volume: 0.5,
            },
        ];
        let mut sink = RecordingAudio::default();
        assert_eq!(play_events(&mut sink, &events), 2);
        assert_eq!(
            sink.played,
            vec![(SoundEffect::Shoot1, 1.0), (SoundEffect::Beam, 0.5)]
        );
        assert_eq!(play_events(&mut NullAudio, &events), 2);
    }

    #[test]
    fn test_names_are_unique() {
        let all = [
            SoundEffect::Shoot1,
            SoundEffect::Shoot2,
            SoundEffect::Shoot3,
            SoundEffect::Shoot4,
            SoundEffect::ShootRapid,
            SoundEffect::ReactBlock,
            SoundEffect::ShieldBlock,
            SoundEffect::Draw3,
            SoundEffect::Damage1,
            SoundEffect::DamagePlayer,
            SoundEffect::DestroyedSmall,
            SoundEffect::DestroyedLarge,
            SoundEffect::Move,
            SoundEffect::Zigzag,
            SoundEffect::ReactPlay,
            SoundEffect::Shield,
            SoundEffect::Repair,
            SoundEffect::ButtonClick,
            SoundEffect::Spread,
            SoundEffect::Beam,
        ];
        let names: std::collections::HashSet<_> = all.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), all.len());
    }
}
