#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded ambient encounter source emitting crowds and patrol drones.

use last_protocol_core::{Command, Event};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Crowds that may gather between turns.
pub const CROWDS: [&str; 3] = [
    "commuters rushing to work",
    "delivery drones crisscrossing the sky",
    "tourists taking selfies",
];

/// Low-urgency drones that may join the patrol between turns.
pub const PATROLS: [&str; 3] = [
    "corporate surveillance drone",
    "traffic monitoring drone",
    "municipal patrol drone",
];

/// Least urgent priority assigned to a patrol drone.
pub const PATROL_PRIORITY_LOW: u8 = 4;

/// Most urgent priority assigned to a patrol drone. Always below the pursuer.
pub const PATROL_PRIORITY_HIGH: u8 = 2;

/// Default 1-in-N odds of a crowd gathering after a turn.
pub const DEFAULT_CROWD_ODDS: u32 = 3;

/// Default 1-in-N odds of a patrol drone arriving after a turn.
pub const DEFAULT_PATROL_ODDS: u32 = 5;

/// Configuration parameters required to construct the ambient system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    crowd_odds: u32,
    patrol_odds: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration using 1-in-N odds per turn; zero disables a
    /// source entirely.
    #[must_use]
    pub const fn new(crowd_odds: u32, patrol_odds: u32, rng_seed: u64) -> Self {
        Self {
            crowd_odds,
            patrol_odds,
            rng_seed,
        }
    }

    /// Default mission odds with the provided seed.
    #[must_use]
    pub const fn mission(rng_seed: u64) -> Self {
        Self::new(DEFAULT_CROWD_ODDS, DEFAULT_PATROL_ODDS, rng_seed)
    }

    /// 1-in-N odds of a crowd gathering after a turn.
    #[must_use]
    pub const fn crowd_odds(&self) -> u32 {
        self.crowd_odds
    }

    /// 1-in-N odds of a patrol drone arriving after a turn.
    #[must_use]
    pub const fn patrol_odds(&self) -> u32 {
        self.patrol_odds
    }
}

/// Pure system that reacts to finished turns with ambient encounters.
#[derive(Debug)]
pub struct Ambient {
    crowd_odds: u32,
    patrol_odds: u32,
    rng: ChaCha8Rng,
}

impl Ambient {
    /// Creates a new ambient system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            crowd_odds: config.crowd_odds,
            patrol_odds: config.patrol_odds,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and emits crowd and patrol commands for every ended turn.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            let Event::TurnEnded { turn } = event else {
                continue;
            };

            if self.chance(self.crowd_odds) {
                let crowd = CROWDS[self.rng.gen_range(0..CROWDS.len())];
                trace!(turn, crowd, "crowd gathering");
                out.push(Command::GatherCrowd {
                    crowd: crowd.to_owned(),
                });
            }

            if self.chance(self.patrol_odds) {
                let label = PATROLS[self.rng.gen_range(0..PATROLS.len())];
                let priority = self
                    .rng
                    .gen_range(PATROL_PRIORITY_HIGH..=PATROL_PRIORITY_LOW);
                trace!(turn, label, priority, "patrol drone arriving");
                out.push(Command::EnqueueThreat {
                    label: label.to_owned(),
                    priority,
                });
            }
        }
    }

    fn chance(&mut self, odds: u32) -> bool {
        odds != 0 && self.rng.gen_range(0..odds) == 0
    }
}
