#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Terminal state machine deciding how the mission ends.
//!
//! The engine is text driven: every line the player submits produces a batch
//! of [`ProtocolNotice`] values for presentation, and containment steps are
//! reported to the world as [`Command::RecordProtocolStep`] so they land in
//! the history log.

use last_protocol_core::{
    CollapseCause, Command, ContainmentStep, Ending, InputProblem, ProtocolKind, ProtocolNotice,
    StepAction,
};
use thiserror::Error;
use tracing::{debug, info};

/// Invalid inputs tolerated in each phase; the last one ends the mission.
pub const MAX_INVALID_INPUTS: u32 = 5;

/// Word that confirms the obliteration protocol.
pub const CONFIRMATION: &str = "yes";

/// Error raised when the final protocol is requested away from an unlocked hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("the final protocol requires the unlocked hub")]
pub struct ProtocolLocked;

/// Phases of the final protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for `protocol <type>`.
    Choosing,
    /// Working through the containment steps.
    Containment,
    /// Waiting for the obliteration confirmation.
    ConfirmObliteration,
    /// The mission has ended.
    Ended(Ending),
}

/// Final protocol engine.
#[derive(Clone, Debug)]
pub struct FinalProtocol {
    phase: Phase,
    invalid_choices: u32,
    invalid_steps: u32,
    steps: Vec<ContainmentStep>,
}

impl FinalProtocol {
    /// Opens the final protocol when the player stands on the unlocked hub.
    pub fn engage(protocol_ready: bool) -> Result<Self, ProtocolLocked> {
        if !protocol_ready {
            return Err(ProtocolLocked);
        }
        Ok(Self {
            phase: Phase::Choosing,
            invalid_choices: 0,
            invalid_steps: 0,
            steps: Vec::new(),
        })
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Ending reached, if any.
    #[must_use]
    pub const fn ending(&self) -> Option<Ending> {
        match self.phase {
            Phase::Ended(ending) => Some(ending),
            _ => None,
        }
    }

    /// Step awaiting completion during containment.
    #[must_use]
    pub fn current_step(&self) -> Option<ContainmentStep> {
        match self.phase {
            Phase::Containment => self.steps.last().copied(),
            _ => None,
        }
    }

    /// Submits one line of player input.
    pub fn submit(&mut self, input: &str, out: &mut Vec<Command>) -> Vec<ProtocolNotice> {
        let mut notices = Vec::new();
        let line = input.trim().to_ascii_lowercase();
        match self.phase {
            Phase::Choosing => self.choose(&line, &mut notices),
            Phase::Containment => self.advance(&line, out, &mut notices),
            Phase::ConfirmObliteration => self.confirm(&line, &mut notices),
            Phase::Ended(_) => notices.push(ProtocolNotice::SessionOver),
        }
        notices
    }

    fn choose(&mut self, line: &str, notices: &mut Vec<ProtocolNotice>) {
        let mut words = line.split_whitespace();
        let problem = match (words.next(), words.next()) {
            (None, _) => InputProblem::Empty,
            (Some("protocol"), None) => InputProblem::MissingType,
            (Some("protocol"), Some(kind)) if kind == ProtocolKind::Containment.name() => {
                self.begin_containment(notices);
                return;
            }
            (Some("protocol"), Some(kind)) if kind == ProtocolKind::Obliteration.name() => {
                self.phase = Phase::ConfirmObliteration;
                notices.push(ProtocolNotice::ObliterationArmed);
                return;
            }
            (Some("protocol"), Some(kind)) => InputProblem::UnknownType(kind.to_owned()),
            (Some(command), _) => InputProblem::UnknownCommand(command.to_owned()),
        };

        self.invalid_choices += 1;
        let remaining = MAX_INVALID_INPUTS.saturating_sub(self.invalid_choices);
        notices.push(ProtocolNotice::InvalidInput { problem, remaining });
        if remaining == 0 {
            self.end(
                Ending::Bad {
                    cause: CollapseCause::ProtocolErrors,
                },
                notices,
            );
        }
    }

    fn begin_containment(&mut self, notices: &mut Vec<ProtocolNotice>) {
        self.steps = ContainmentStep::COMPLETION_ORDER.into_iter().rev().collect();
        self.invalid_steps = 0;
        self.phase = Phase::Containment;
        notices.push(ProtocolNotice::ContainmentStarted);
        self.announce_step(notices);
    }

    fn advance(&mut self, line: &str, out: &mut Vec<Command>, notices: &mut Vec<ProtocolNotice>) {
        match line {
            "next" => {
                let Some(step) = self.steps.pop() else {
                    return;
                };
                out.push(Command::RecordProtocolStep {
                    step,
                    action: StepAction::Completed,
                });
                notices.push(ProtocolNotice::StepCompleted { step });
                if self.steps.is_empty() {
                    self.end(Ending::Good, notices);
                    return;
                }
            }
            "undo" => {
                let Some(&step) = self.steps.last() else {
                    return;
                };
                if step.is_final() {
                    notices.push(ProtocolNotice::FinalStepLocked { step });
                } else {
                    let _ = self.steps.pop();
                    out.push(Command::RecordProtocolStep {
                        step,
                        action: StepAction::Reverted,
                    });
                    notices.push(ProtocolNotice::StepReverted { step });
                }
            }
            other => {
                self.invalid_steps += 1;
                let remaining = MAX_INVALID_INPUTS.saturating_sub(self.invalid_steps);
                notices.push(ProtocolNotice::InvalidInput {
                    problem: InputProblem::UnknownStepAction(other.to_owned()),
                    remaining,
                });
                if remaining == 0 {
                    self.end(
                        Ending::Bad {
                            cause: CollapseCause::StepErrors,
                        },
                        notices,
                    );
                    return;
                }
            }
        }
        self.announce_step(notices);
    }

    fn confirm(&mut self, line: &str, notices: &mut Vec<ProtocolNotice>) {
        if line == CONFIRMATION {
            self.end(
                Ending::Bad {
                    cause: CollapseCause::Obliterated,
                },
                notices,
            );
        } else {
            debug!("obliteration declined");
            self.phase = Phase::Choosing;
            notices.push(ProtocolNotice::ObliterationCancelled);
        }
    }

    fn announce_step(&self, notices: &mut Vec<ProtocolNotice>) {
        if let Some(&step) = self.steps.last() {
            notices.push(ProtocolNotice::CurrentStep { step });
        }
    }

    fn end(&mut self, ending: Ending, notices: &mut Vec<ProtocolNotice>) {
        info!(?ending, "final protocol concluded");
        self.phase = Phase::Ended(ending);
        self.steps.clear();
        notices.push(ProtocolNotice::Ended { ending });
    }
}
