use std::collections::VecDeque;

use last_protocol_core::{
    Command, Direction, Event, HackOutcome, NodeId, Signal, PURSUER_LABEL, PURSUER_PRIORITY,
};
use last_protocol_system_hacking::{HackState, Hacking, SignalRoll};
use last_protocol_world::{self as world, query, World};

/// Replays a fixed list of signals, one per round.
struct Scripted(VecDeque<Signal>);

impl Scripted {
    fn new(signals: &[Signal]) -> Self {
        Self(signals.iter().copied().collect())
    }
}

impl SignalRoll for Scripted {
    fn roll(&mut self) -> Signal {
        self.0.pop_front().expect("script ran out of signals")
    }
}

fn apply_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn world_at_thamel() -> World {
    let mut world = World::new();
    let route = [
        Direction::South,
        Direction::East,
        Direction::East,
        Direction::North,
    ];
    let _ = apply_all(
        &mut world,
        route
            .into_iter()
            .map(|direction| Command::Move { direction })
            .collect(),
    );
    assert_eq!(query::place_name(&world, query::player_position(&world)), "Thamel Network Node");
    world
}

fn start_hack(world: &mut World, hacking: &mut Hacking<Scripted>) {
    let events = apply_all(world, vec![Command::BeginHack]);
    assert_eq!(
        events,
        vec![Event::HackStarted {
            node: NodeId::Thamel,
            attempts: 3,
        }]
    );
    hacking.handle(&events);
}

#[test]
fn three_wrong_guesses_fail_and_queue_one_pursuer() {
    let mut world = world_at_thamel();
    let mut hacking = Hacking::new(Scripted::new(&[
        Signal::Firewall,
        Signal::Server,
        Signal::Router,
    ]));
    start_hack(&mut world, &mut hacking);

    let mut commands = Vec::new();
    assert_eq!(
        hacking.submit("router", &mut commands),
        Some(HackState::Probing { attempts_left: 2 })
    );
    assert_eq!(
        hacking.submit("firewall", &mut commands),
        Some(HackState::Probing { attempts_left: 1 })
    );
    assert!(commands.is_empty());
    assert_eq!(hacking.submit("server", &mut commands), Some(HackState::Failure));
    assert_eq!(hacking.state(), None);

    let events = apply_all(&mut world, commands);
    assert_eq!(
        events,
        vec![
            Event::HackFailed {
                node: NodeId::Thamel,
            },
            Event::ThreatQueued {
                label: PURSUER_LABEL.to_owned(),
                priority: PURSUER_PRIORITY,
            },
            Event::PursuitActive {
                label: PURSUER_LABEL.to_owned(),
            },
        ]
    );

    let threats = query::threats(&world);
    assert_eq!(threats.len(), 1);
    let head = threats.peek().expect("pursuer queued");
    assert_eq!(head.priority(), 1);
    assert!(head.is_pursuer());
    assert!(!query::node(&world, NodeId::Thamel)
        .expect("thamel exists")
        .hacked());
    assert_eq!(
        query::history(&world)
            .last()
            .map(|entry| entry.text().to_owned()),
        Some("Failed hack attempt at Thamel Network Node".to_owned())
    );
}

#[test]
fn correct_first_guess_hacks_without_threat() {
    let mut world = world_at_thamel();
    let mut hacking = Hacking::new(Scripted::new(&[Signal::Router]));
    start_hack(&mut world, &mut hacking);

    let mut commands = Vec::new();
    assert_eq!(hacking.submit("router", &mut commands), Some(HackState::Success));
    assert_eq!(
        commands,
        vec![Command::ResolveHack {
            node: NodeId::Thamel,
            outcome: HackOutcome::Success,
        }]
    );

    let events = apply_all(&mut world, commands);
    assert_eq!(
        events,
        vec![Event::NodeHacked {
            node: NodeId::Thamel,
        }]
    );
    assert!(query::threats(&world).is_empty());
    assert!(query::node(&world, NodeId::Thamel)
        .expect("thamel exists")
        .hacked());
    assert!(!query::hub(&world).unlocked());
}

#[test]
fn target_is_rerolled_every_round() {
    let mut world = world_at_thamel();
    let mut hacking = Hacking::new(Scripted::new(&[Signal::Firewall, Signal::Server]));
    start_hack(&mut world, &mut hacking);

    let mut commands = Vec::new();
    assert_eq!(
        hacking.submit("server", &mut commands),
        Some(HackState::Probing { attempts_left: 2 })
    );
    assert_eq!(hacking.submit("server", &mut commands), Some(HackState::Success));
}

#[test]
fn unrecognised_text_counts_as_wrong_guess() {
    let mut world = world_at_thamel();
    let mut hacking = Hacking::new(Scripted::new(&[Signal::Router, Signal::Router]));
    start_hack(&mut world, &mut hacking);

    let mut commands = Vec::new();
    assert_eq!(
        hacking.submit("modem", &mut commands),
        Some(HackState::Probing { attempts_left: 2 })
    );
    assert_eq!(hacking.active_node(), Some(NodeId::Thamel));
}

#[test]
fn submit_without_challenge_is_ignored() {
    let mut hacking = Hacking::new(Scripted::new(&[]));
    let mut commands = Vec::new();
    assert_eq!(hacking.submit("router", &mut commands), None);
    assert!(commands.is_empty());
}

#[test]
fn hacked_node_cannot_be_hacked_again() {
    let mut world = world_at_thamel();
    let mut hacking = Hacking::new(Scripted::new(&[Signal::Firewall]));
    start_hack(&mut world, &mut hacking);

    let mut commands = Vec::new();
    let _ = hacking.submit("firewall", &mut commands);
    let _ = apply_all(&mut world, commands);

    let depth = query::undo_depth(&world);
    let events = apply_all(&mut world, vec![Command::BeginHack]);
    assert_eq!(
        events,
        vec![Event::HackRejected {
            reason: last_protocol_core::HackRejection::AlreadyHacked,
        }]
    );
    assert_eq!(query::undo_depth(&world), depth);
}

fn walk(world: &mut World, route: &[Direction]) {
    let events = apply_all(
        world,
        route
            .iter()
            .map(|&direction| Command::Move { direction })
            .collect(),
    );
    assert!(!events.contains(&Event::HubUnlocked));
}

fn hack_here(world: &mut World, node: NodeId) -> Vec<Event> {
    let mut hacking = Hacking::new(Scripted::new(&[Signal::Server]));
    let started = apply_all(world, vec![Command::BeginHack]);
    hacking.handle(&started);
    assert_eq!(query::active_hack(world), Some(node));

    let mut commands = Vec::new();
    assert_eq!(hacking.submit("server", &mut commands), Some(HackState::Success));
    let events = apply_all(world, commands);
    assert_eq!(query::active_hack(world), None);
    events
}

fn unlock_count(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| **event == Event::HubUnlocked)
        .count()
}

#[test]
fn hub_unlocks_only_after_every_node_and_stays_unlocked() {
    let mut world = world_at_thamel();

    let events = hack_here(&mut world, NodeId::Thamel);
    assert_eq!(unlock_count(&events), 0);

    walk(
        &mut world,
        &[
            Direction::East,
            Direction::East,
            Direction::East,
            Direction::South,
        ],
    );
    let events = hack_here(&mut world, NodeId::Baneshwor);
    assert_eq!(unlock_count(&events), 0);
    assert!(!query::hub(&world).unlocked());

    walk(
        &mut world,
        &[
            Direction::West,
            Direction::West,
            Direction::West,
            Direction::West,
            Direction::West,
            Direction::South,
            Direction::South,
        ],
    );
    assert!(!query::hub(&world).unlocked());
    let events = hack_here(&mut world, NodeId::DurbarSquare);
    assert_eq!(unlock_count(&events), 1);
    assert!(query::hub(&world).unlocked());

    let mut later = apply_all(
        &mut world,
        vec![
            Command::Move {
                direction: Direction::East,
            },
            Command::Undo,
            Command::BeginHack,
        ],
    );
    assert_eq!(
        later.pop(),
        Some(Event::HackRejected {
            reason: last_protocol_core::HackRejection::AlreadyHacked,
        })
    );
    assert_eq!(unlock_count(&later), 0);
    assert!(query::hub(&world).unlocked());
    assert!(query::nodes(&world).iter().all(|node| node.hacked()));
}
