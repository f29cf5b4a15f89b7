#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bounded-retry hacking challenge.
//!
//! The world decides whether a hack may start and records its consequences;
//! this system only runs the guessing rounds in between. Each round rolls a
//! fresh secret [`Signal`] from an injected [`SignalRoll`], so earlier guesses
//! carry no information about later rounds.

use last_protocol_core::{Command, Event, HackOutcome, NodeId, Signal};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Source of the secret signal rolled at the start of every round.
pub trait SignalRoll {
    /// Draws the signal the player must trace this round.
    fn roll(&mut self) -> Signal;
}

/// Uniform roll over [`Signal::ALL`] driven by a random number generator.
#[derive(Clone, Debug)]
pub struct UniformRoll<R> {
    rng: R,
}

impl<R: Rng> UniformRoll<R> {
    /// Wraps the provided generator.
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl UniformRoll<ChaCha8Rng> {
    /// Creates a reproducible roll from a seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> SignalRoll for UniformRoll<R> {
    fn roll(&mut self) -> Signal {
        Signal::ALL[self.rng.gen_range(0..Signal::ALL.len())]
    }
}

/// States of a single hacking challenge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HackState {
    /// Waiting for a guess.
    Probing {
        /// Guesses remaining, including the current one.
        attempts_left: u8,
    },
    /// The signal was traced.
    Success,
    /// Every attempt was spent.
    Failure,
}

impl HackState {
    /// Reports whether the challenge has finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Probing { .. })
    }
}

#[derive(Clone, Copy, Debug)]
struct Challenge {
    node: NodeId,
    state: HackState,
    target: Signal,
}

/// Runs hacking challenges announced by the world.
#[derive(Debug)]
pub struct Hacking<S> {
    roll: S,
    challenge: Option<Challenge>,
}

impl<S: SignalRoll> Hacking<S> {
    /// Creates a hacking system drawing signals from `roll`.
    #[must_use]
    pub fn new(roll: S) -> Self {
        Self {
            roll,
            challenge: None,
        }
    }

    /// Consumes world events, opening a challenge when a hack starts.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            if let Event::HackStarted { node, attempts } = *event {
                let state = if attempts == 0 {
                    HackState::Failure
                } else {
                    HackState::Probing {
                        attempts_left: attempts,
                    }
                };
                let target = self.roll.roll();
                debug!(?node, attempts, "hacking challenge opened");
                self.challenge = Some(Challenge {
                    node,
                    state,
                    target,
                });
            }
        }
    }

    /// Node targeted by the open challenge, if any.
    #[must_use]
    pub fn active_node(&self) -> Option<NodeId> {
        self.challenge.map(|challenge| challenge.node)
    }

    /// State of the open challenge, if any.
    #[must_use]
    pub fn state(&self) -> Option<HackState> {
        self.challenge.map(|challenge| challenge.state)
    }

    /// Submits one guess to the open challenge.
    ///
    /// Any text that does not name the current round's signal counts as a
    /// wrong guess. When the challenge reaches a terminal state the matching
    /// [`Command::ResolveHack`] is pushed to `out` and the challenge closes.
    /// Returns `None` when no challenge is open.
    pub fn submit(&mut self, guess: &str, out: &mut Vec<Command>) -> Option<HackState> {
        let mut challenge = self.challenge?;
        let HackState::Probing { attempts_left } = challenge.state else {
            return self.close(challenge, out);
        };

        let traced = guess
            .parse::<Signal>()
            .is_ok_and(|signal| signal == challenge.target);
        challenge.state = if traced {
            HackState::Success
        } else if attempts_left <= 1 {
            HackState::Failure
        } else {
            HackState::Probing {
                attempts_left: attempts_left - 1,
            }
        };

        if challenge.state.is_terminal() {
            return self.close(challenge, out);
        }

        challenge.target = self.roll.roll();
        self.challenge = Some(challenge);
        Some(challenge.state)
    }

    fn close(&mut self, challenge: Challenge, out: &mut Vec<Command>) -> Option<HackState> {
        let outcome = match challenge.state {
            HackState::Success => HackOutcome::Success,
            HackState::Failure => HackOutcome::Failure,
            HackState::Probing { .. } => return Some(challenge.state),
        };
        info!(node = ?challenge.node, ?outcome, "hacking challenge resolved");
        self.challenge = None;
        out.push(Command::ResolveHack {
            node: challenge.node,
            outcome,
        });
        Some(challenge.state)
    }
}
