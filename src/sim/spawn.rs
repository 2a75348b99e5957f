//! Seeded wave generation
//!
//! A level is described by `(seed, hp_budget, duration)`. The generator
//! picks weighted spawn patterns until the HP budget is spent, orders them
//! roughly by difficulty with some local shuffling, then lays them out in
//! time so the whole wave fits the target duration.
//!
//! All randomness comes from one `Pcg32` seeded from the level seed, so the
//! same triple always produces the same spawn list.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::state::SpawnEvent;
use crate::consts::*;
use crate::error::ConfigError;

/// Where a drone wave enters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DroneFormation {
    /// Ten drones down the right quarter line
    Right,
    /// Ten drones down the left quarter line
    Left,
    /// Twenty fast drones fanning out from the centre
    Sweep,
}

/// What a spawn pattern puts on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternKind {
    Drones(DroneFormation),
    /// Six bombers in a staggered column at a random x
    Bombers,
    /// Three rows of two snipers
    Snipers,
    Single(EnemyKind),
    Pair(EnemyKind),
}

impl PatternKind {
    /// Append this pattern's spawn events starting at time `t`
    fn emit(&self, pattern: usize, t: f32, rng: &mut impl Rng, out: &mut Vec<SpawnEvent>) {
        let mut push = |t: f32, x: f32, kind: EnemyKind, offset: f32| {
            out.push(SpawnEvent {
                t,
                x,
                kind,
                offset,
                pattern,
            });
        };

        match *self {
            PatternKind::Drones(formation) => {
                let (count, delay) = match formation {
                    DroneFormation::Sweep => (20, 120.0),
                    _ => (10, 400.0),
                };
                for ii in 0..count {
                    let x = match formation {
                        DroneFormation::Right => BOARD_W * 0.75,
                        DroneFormation::Left => BOARD_W * 0.25,
                        DroneFormation::Sweep => BOARD_W * 0.5 - ii as f32 * 0.3,
                    };
                    push(t + ii as f32 * delay, x, EnemyKind::Drone, 0.0);
                }
            }
            PatternKind::Bombers => {
                let x = BOARD_W / 4.0 + BOARD_W / 2.0 * rng.random::<f32>();
                let delay = 400.0;
                for ii in 0..6 {
                    let offset = ii as f32 * delay;
                    push(t + offset, x, EnemyKind::Bomber, offset);
                }
            }
            PatternKind::Snipers => {
                let delay = 1500.0;
                for ii in 0..3 {
                    let row_t = t + ii as f32 * delay;
                    push(row_t, 1.5, EnemyKind::Sniper, 0.0);
                    push(row_t, BOARD_W - 1.5, EnemyKind::Sniper, 0.0);
                }
            }
            PatternKind::Single(kind) => push(t, 1.25, kind, 0.0),
            PatternKind::Pair(kind) => {
                push(t, BOARD_W / 4.0, kind, 0.0);
                push(t, BOARD_W * 3.0 / 4.0, kind, 0.0);
            }
        }
    }
}

/// One weighted entry in the spawn table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPattern {
    pub kind: PatternKind,
    /// Relative selection weight
    pub weight: f32,
    /// Budget this pattern consumes
    pub hp: u32,
    /// Raw gap after this pattern, before time scaling
    pub delay: (f32, f32),
}

impl SpawnPattern {
    const fn new(kind: PatternKind, weight: f32, hp: u32, delay: (f32, f32)) -> Self {
        Self {
            kind,
            weight,
            hp,
            delay,
        }
    }
}

/// A pattern picked for a wave, with its drawn raw delay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnChoice {
    pub pattern: usize,
    pub delay: f32,
}

/// A generated wave
#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    /// Patterns in play order
    pub choices: Vec<SpawnChoice>,
    /// Spawn events sorted by descending time
    pub spawns: Vec<SpawnEvent>,
    /// Sum of the raw delays
    pub raw_time: f32,
    /// Factor mapping raw delays to milliseconds
    pub time_scale: f32,
}

impl Wave {
    /// Hit points of every enemy in the wave
    pub fn total_hp(&self) -> u32 {
        self.spawns.iter().map(|s| s.kind.max_hp()).sum()
    }
}

/// Weighted, validated table of spawn patterns
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnTable {
    patterns: Vec<SpawnPattern>,
    total_weight: f32,
}

impl SpawnTable {
    /// Validate and build a table. Pattern order is difficulty order.
    pub fn new(patterns: Vec<SpawnPattern>) -> Result<Self, ConfigError> {
        for (index, p) in patterns.iter().enumerate() {
            if p.hp == 0 {
                return Err(ConfigError::ZeroCostPattern { index });
            }
            if !p.weight.is_finite() || p.weight < 0.0 {
                return Err(ConfigError::InvalidWeight { index });
            }
            let (min, max) = p.delay;
            if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
                return Err(ConfigError::InvalidDelayRange { index, min, max });
            }
        }
        let total_weight: f32 = patterns.iter().map(|p| p.weight).sum();
        if total_weight <= 0.0 {
            return Err(ConfigError::EmptyWeights);
        }
        Ok(Self {
            patterns,
            total_weight,
        })
    }

    /// The game's pattern table, easiest first
    pub fn standard() -> Self {
        use DroneFormation::*;
        use PatternKind::*;
        let patterns = vec![
            SpawnPattern::new(Drones(Right), 4.0, 10, (1.0, 3.0)),
            SpawnPattern::new(Drones(Left), 4.0, 10, (1.0, 3.0)),
            SpawnPattern::new(Drones(Sweep), 4.0, 20, (0.0, 2.0)),
            SpawnPattern::new(Bombers, 6.0, 12, (2.0, 4.0)),
            SpawnPattern::new(Snipers, 4.0, 24, (5.0, 7.0)),
            SpawnPattern::new(Single(EnemyKind::Large1), 1.0, 20, (5.0, 10.0)),
            SpawnPattern::new(Single(EnemyKind::Large2), 1.0, 20, (5.0, 10.0)),
            SpawnPattern::new(Pair(EnemyKind::Large1), 0.5, 40, (10.0, 20.0)),
            SpawnPattern::new(Pair(EnemyKind::Large2), 0.5, 40, (10.0, 20.0)),
        ];
        let total_weight = patterns.iter().map(|p| p.weight).sum();
        Self {
            patterns,
            total_weight,
        }
    }

    pub fn patterns(&self) -> &[SpawnPattern] {
        &self.patterns
    }

    /// Roulette selection over the cumulative weights
    fn pick(&self, rng: &mut impl Rng) -> usize {
        let mut r = rng.random::<f32>() * self.total_weight;
        let last = self.patterns.len() - 1;
        let mut idx = 0;
        loop {
            let weight = self.patterns[idx].weight;
            r -= weight;
            if (weight > 0.0 && r <= 0.0) || idx == last {
                return idx;
            }
            idx += 1;
        }
    }

    /// Build the spawn list for one level
    pub fn generate(&self, seed: &str, hp_budget: u32, duration: f32) -> Wave {
        let mut rng = Pcg32::seed_from_u64(seed_from_str(seed));

        let mut remaining = i64::from(hp_budget);
        let mut raw_time = 0.0;
        let mut choices = Vec::new();
        while remaining > 0 {
            let pattern = self.pick(&mut rng);
            let p = &self.patterns[pattern];
            remaining -= i64::from(p.hp);
            let (min, max) = p.delay;
            let delay = min + (max - min) * rng.random::<f32>();
            raw_time += delay;
            choices.push(SpawnChoice { pattern, delay });
        }

        let time_scale = if raw_time > 0.0 { duration / raw_time } else { 0.0 };
        log::info!("Total time = {}, time_scale={}", raw_time, time_scale);

        order_choices(&mut choices, &mut rng);

        let mut spawns = Vec::new();
        let mut t = 0.0;
        for choice in &choices {
            self.patterns[choice.pattern]
                .kind
                .emit(choice.pattern, t, &mut rng, &mut spawns);
            t += choice.delay * time_scale;
        }
        // Next arrival at the end so the level clock can pop it
        spawns.sort_by(|a, b| b.t.total_cmp(&a.t));

        Wave {
            choices,
            spawns,
            raw_time,
            time_scale,
        }
    }
}

impl Default for SpawnTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// FNV-1a hash of a level seed string
pub fn seed_from_str(seed: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in seed.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

/// Sort by difficulty, shuffle locally, then split up repeats
fn order_choices(choices: &mut Vec<SpawnChoice>, rng: &mut impl Rng) {
    choices.sort_by_key(|c| c.pattern);

    let n = choices.len();
    for ii in 0..n.saturating_sub(1) {
        let reach = (n - ii - 1).min(4);
        let idx = ii + rng.random_range(0..reach);
        choices.swap(ii, idx);
    }

    break_adjacent_repeats(choices);
}

/// Make sure no two neighbours share a pattern, whenever that is possible
fn break_adjacent_repeats(choices: &mut Vec<SpawnChoice>) {
    let n = choices.len();
    for ii in 0..n.saturating_sub(1) {
        let next = choices[ii + 1].pattern;
        if choices[ii].pattern != next {
            continue;
        }
        if let Some(jj) = (ii + 2..n).find(|&jj| choices[jj].pattern != next) {
            choices.swap(ii + 1, jj);
        }
    }

    // The scan above can leave a run at the tail. Move repeats into gaps
    // whose neighbours both differ; each move removes at least one pair.
    while let Some(k) = (0..choices.len().saturating_sub(1))
        .find(|&k| choices[k].pattern == choices[k + 1].pattern)
    {
        let item = choices.remove(k + 1);
        let gap = (0..=choices.len()).find(|&g| {
            (g == 0 || choices[g - 1].pattern != item.pattern)
                && (g == choices.len() || choices[g].pattern != item.pattern)
        });
        match gap {
            Some(g) => choices.insert(g, item),
            None => {
                choices.insert(k + 1, item);
                break;
            }
        }
    }
}
