use last_protocol_core::{
    CollapseCause, Command, ContainmentStep, Ending, InputProblem, ProtocolNotice, StepAction,
};
use last_protocol_system_final_protocol::{FinalProtocol, Phase, MAX_INVALID_INPUTS};
use last_protocol_world::{self as world, query, HistoryEntry, World};

fn engaged() -> FinalProtocol {
    FinalProtocol::engage(true).expect("hub ready")
}

fn feed(protocol: &mut FinalProtocol, lines: &[&str]) -> (Vec<ProtocolNotice>, Vec<Command>) {
    let mut commands = Vec::new();
    let mut notices = Vec::new();
    for line in lines {
        notices.extend(protocol.submit(line, &mut commands));
    }
    (notices, commands)
}

#[test]
fn containment_next_three_times_reaches_good_ending() {
    let mut protocol = engaged();
    let (notices, commands) = feed(
        &mut protocol,
        &["protocol containment", "next", "next", "next"],
    );

    assert_eq!(
        notices,
        vec![
            ProtocolNotice::ContainmentStarted,
            ProtocolNotice::CurrentStep {
                step: ContainmentStep::SecureAccessPoints,
            },
            ProtocolNotice::StepCompleted {
                step: ContainmentStep::SecureAccessPoints,
            },
            ProtocolNotice::CurrentStep {
                step: ContainmentStep::DeployIsolationCode,
            },
            ProtocolNotice::StepCompleted {
                step: ContainmentStep::DeployIsolationCode,
            },
            ProtocolNotice::CurrentStep {
                step: ContainmentStep::UploadContainmentProtocol,
            },
            ProtocolNotice::StepCompleted {
                step: ContainmentStep::UploadContainmentProtocol,
            },
            ProtocolNotice::Ended {
                ending: Ending::Good,
            },
        ]
    );

    let completed: Vec<_> = ContainmentStep::COMPLETION_ORDER
        .into_iter()
        .map(|step| Command::RecordProtocolStep {
            step,
            action: StepAction::Completed,
        })
        .collect();
    assert_eq!(commands, completed);
    assert_eq!(protocol.ending(), Some(Ending::Good));
}

#[test]
fn undo_on_final_step_is_refused_without_mutation() {
    let mut protocol = engaged();
    let _ = feed(&mut protocol, &["protocol containment", "next", "next"]);
    assert_eq!(
        protocol.current_step(),
        Some(ContainmentStep::UploadContainmentProtocol)
    );

    let (notices, commands) = feed(&mut protocol, &["undo"]);
    assert_eq!(
        notices,
        vec![
            ProtocolNotice::FinalStepLocked {
                step: ContainmentStep::UploadContainmentProtocol,
            },
            ProtocolNotice::CurrentStep {
                step: ContainmentStep::UploadContainmentProtocol,
            },
        ]
    );
    assert!(commands.is_empty());
    assert_eq!(
        protocol.current_step(),
        Some(ContainmentStep::UploadContainmentProtocol)
    );
    assert_eq!(protocol.phase(), Phase::Containment);
}

#[test]
fn undo_reverts_earlier_steps() {
    let mut protocol = engaged();
    let (notices, commands) = feed(&mut protocol, &["protocol containment", "undo"]);

    assert_eq!(
        commands,
        vec![Command::RecordProtocolStep {
            step: ContainmentStep::SecureAccessPoints,
            action: StepAction::Reverted,
        }]
    );
    assert_eq!(
        notices[2..],
        [
            ProtocolNotice::StepReverted {
                step: ContainmentStep::SecureAccessPoints,
            },
            ProtocolNotice::CurrentStep {
                step: ContainmentStep::DeployIsolationCode,
            },
        ]
    );
}

#[test]
fn fifth_invalid_choice_collapses_the_city() {
    let mut protocol = engaged();
    let (notices, _) = feed(
        &mut protocol,
        &["", "protocol", "protocol sideways", "dance", "hack"],
    );

    let problems: Vec<_> = notices
        .iter()
        .filter_map(|notice| match notice {
            ProtocolNotice::InvalidInput { problem, remaining } => {
                Some((problem.clone(), *remaining))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        problems,
        vec![
            (InputProblem::Empty, 4),
            (InputProblem::MissingType, 3),
            (InputProblem::UnknownType("sideways".to_owned()), 2),
            (InputProblem::UnknownCommand("dance".to_owned()), 1),
            (InputProblem::UnknownCommand("hack".to_owned()), 0),
        ]
    );
    assert_eq!(
        notices.last(),
        Some(&ProtocolNotice::Ended {
            ending: Ending::Bad {
                cause: CollapseCause::ProtocolErrors,
            },
        })
    );
}

#[test]
fn four_invalid_choices_still_allow_containment() {
    let mut protocol = engaged();
    let _ = feed(&mut protocol, &["a", "b", "c", "d"]);
    assert_eq!(protocol.phase(), Phase::Choosing);

    let _ = feed(&mut protocol, &["PROTOCOL Containment"]);
    assert_eq!(protocol.phase(), Phase::Containment);
}

#[test]
fn step_errors_have_their_own_budget() {
    let mut protocol = engaged();
    let _ = feed(&mut protocol, &["x", "y", "protocol containment"]);

    let invalid: Vec<&str> = vec!["skip"; MAX_INVALID_INPUTS as usize];
    let (notices, commands) = feed(&mut protocol, &invalid);

    assert!(commands.is_empty());
    assert_eq!(
        protocol.ending(),
        Some(Ending::Bad {
            cause: CollapseCause::StepErrors,
        })
    );
    assert_eq!(
        notices.last(),
        Some(&ProtocolNotice::Ended {
            ending: Ending::Bad {
                cause: CollapseCause::StepErrors,
            },
        })
    );
}

#[test]
fn obliteration_confirmed_is_bad_ending() {
    let mut protocol = engaged();
    let (notices, _) = feed(&mut protocol, &["protocol obliteration", "YES"]);
    assert_eq!(
        notices,
        vec![
            ProtocolNotice::ObliterationArmed,
            ProtocolNotice::Ended {
                ending: Ending::Bad {
                    cause: CollapseCause::Obliterated,
                },
            },
        ]
    );
}

#[test]
fn obliteration_cancel_returns_to_choice_without_penalty() {
    let mut protocol = engaged();
    let _ = feed(&mut protocol, &["a", "b", "c", "d"]);
    let (notices, _) = feed(&mut protocol, &["protocol obliteration", "no"]);

    assert_eq!(
        notices,
        vec![
            ProtocolNotice::ObliterationArmed,
            ProtocolNotice::ObliterationCancelled,
        ]
    );
    assert_eq!(protocol.phase(), Phase::Choosing);

    let (notices, _) = feed(&mut protocol, &["protocol containment"]);
    assert_eq!(notices.first(), Some(&ProtocolNotice::ContainmentStarted));
}

#[test]
fn input_after_ending_is_refused() {
    let mut protocol = engaged();
    let _ = feed(&mut protocol, &["protocol obliteration", "yes"]);
    let (notices, commands) = feed(&mut protocol, &["protocol containment", "next"]);

    assert_eq!(
        notices,
        vec![ProtocolNotice::SessionOver, ProtocolNotice::SessionOver]
    );
    assert!(commands.is_empty());
}

#[test]
fn recorded_steps_reach_the_history_log() {
    let mut world = World::new();
    let mut protocol = engaged();
    let (_, commands) = feed(
        &mut protocol,
        &["protocol containment", "undo", "next", "next"],
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    let texts: Vec<_> = query::history(&world)
        .iter()
        .map(HistoryEntry::text)
        .collect();
    assert_eq!(
        texts,
        vec![
            "Undid step: Step 1: Secure access points",
            "Completed step: Step 2: Deploy isolation code",
            "Completed step: Step 3: Upload containment protocol",
        ]
    );
    assert_eq!(protocol.ending(), Some(Ending::Good));
}
