#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for The Last Protocol.
//!
//! [`World`] is the single aggregate that owns the player position, node and
//! hub flags, inventory, undo stack, history log, crowd queue and threat
//! scheduler. Every mutation flows through [`apply`]; read access goes
//! through the [`query`] module.

use std::collections::VecDeque;

use last_protocol_core::{
    BypassRejection, Command, ContainmentStep, Direction, Event, HackOutcome, HackRejection, Item,
    NodeId, Position, StepAction, HACK_ATTEMPTS, PURSUER_LABEL, PURSUER_PRIORITY,
};
use tracing::{debug, info};

mod grid;
mod journal;
mod threats;

pub use grid::{attempt_move, Grid, LayoutError, MoveOutcome};
pub use journal::{HistoryEntry, HistoryLog, UndoStack};
pub use threats::{QueueFull, Threat, ThreatScheduler, THREAT_CAPACITY};

const MISSION_BASE: Position = Position::new(0, 0);
const MISSION_HUB: Position = Position::new(2, 3);
const MISSION_NODES: [(NodeId, Position); 3] = [
    (NodeId::Thamel, Position::new(0, 2)),
    (NodeId::Baneshwor, Position::new(1, 5)),
    (NodeId::DurbarSquare, Position::new(3, 0)),
];

/// A compromisable network point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkNode {
    id: NodeId,
    position: Position,
    hacked: bool,
}

impl NetworkNode {
    fn new(id: NodeId, position: Position) -> Self {
        Self {
            id,
            position,
            hacked: false,
        }
    }

    /// Identity of the node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Cell occupied by the node.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Reports whether the node has been compromised. Never reverts.
    #[must_use]
    pub const fn hacked(&self) -> bool {
        self.hacked
    }
}

/// The final mission location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hub {
    position: Position,
    unlocked: bool,
}

impl Hub {
    /// Cell occupied by the hub.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Reports whether every node has been compromised. Never reverts.
    #[must_use]
    pub const fn unlocked(&self) -> bool {
        self.unlocked
    }
}

/// Items carried by the player.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    /// Creates an inventory holding the provided items.
    #[must_use]
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Inventory carried at the start of a mission.
    #[must_use]
    pub fn starting() -> Self {
        Self::new(Item::STARTING.to_vec())
    }

    /// Reports whether the item is carried.
    #[must_use]
    pub fn contains(&self, item: Item) -> bool {
        self.items.contains(&item)
    }

    /// Removes one instance of the item, reporting whether it was carried.
    pub fn take(&mut self, item: Item) -> bool {
        match self.items.iter().position(|candidate| *candidate == item) {
            Some(index) => {
                let _ = self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Carried items in acquisition order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Reports whether nothing is carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Represents the authoritative session state.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    position: Position,
    nodes: Vec<NetworkNode>,
    hub: Hub,
    inventory: Inventory,
    undo: UndoStack,
    history: HistoryLog,
    threats: ThreatScheduler,
    crowds: VecDeque<String>,
    active_hack: Option<NodeId>,
    turn: u64,
}

impl World {
    /// Creates a session on the mission map with the starting inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_inventory(Inventory::starting())
    }

    /// Creates a session on the mission map carrying the provided inventory.
    #[must_use]
    pub fn with_inventory(inventory: Inventory) -> Self {
        Self::assemble(
            Grid::mission(),
            MISSION_BASE,
            MISSION_HUB,
            MISSION_NODES,
            inventory,
        )
    }

    /// Creates a session on a custom grid.
    ///
    /// The grid must hold exactly one base, one hub and one of each node.
    pub fn from_grid(grid: Grid, inventory: Inventory) -> Result<Self, LayoutError> {
        let landmarks = grid.landmarks()?;
        Ok(Self::assemble(
            grid,
            landmarks.base,
            landmarks.hub,
            landmarks.nodes,
            inventory,
        ))
    }

    fn assemble(
        grid: Grid,
        base: Position,
        hub: Position,
        nodes: [(NodeId, Position); 3],
        inventory: Inventory,
    ) -> Self {
        Self {
            grid,
            position: base,
            nodes: nodes
                .into_iter()
                .map(|(id, position)| NetworkNode::new(id, position))
                .collect(),
            hub: Hub {
                position: hub,
                unlocked: false,
            },
            inventory,
            undo: UndoStack::new(),
            history: HistoryLog::new(),
            threats: ThreatScheduler::new(),
            crowds: VecDeque::new(),
            active_hack: None,
            turn: 0,
        }
    }

    fn node_at(&self, position: Position) -> Option<usize> {
        self.nodes.iter().position(|node| node.position == position)
    }

    fn step_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let from = self.position;
        let to = match attempt_move(&self.grid, from, direction) {
            MoveOutcome::Moved(to) => to,
            MoveOutcome::Rejected(reason) => {
                debug!(?direction, ?reason, "move rejected");
                out_events.push(Event::MoveRejected { direction, reason });
                return;
            }
        };

        if let Some(crowd) = self.crowds.pop_front() {
            out_events.push(Event::CrowdDelayed { crowd });
        }
        self.patrol(out_events);

        self.undo.push(from);
        self.history.append(format!(
            "Moved {direction} to {}",
            self.grid.place_name(to)
        ));
        self.position = to;
        out_events.push(Event::PlayerMoved {
            direction,
            from,
            to,
        });
    }

    fn undo(&mut self, out_events: &mut Vec<Event>) {
        let Some(previous) = self.undo.pop() else {
            out_events.push(Event::NothingToUndo);
            return;
        };

        self.position = previous;
        self.history.append(format!(
            "Undid a move, reverting to {}",
            self.grid.place_name(previous)
        ));
        out_events.push(Event::PositionReverted { to: previous });
    }

    fn begin_hack(&mut self, out_events: &mut Vec<Event>) {
        let Some(index) = self.node_at(self.position) else {
            out_events.push(Event::HackRejected {
                reason: HackRejection::NotHackable,
            });
            return;
        };

        let node = self.nodes[index];
        if node.hacked {
            out_events.push(Event::HackRejected {
                reason: HackRejection::AlreadyHacked,
            });
            return;
        }

        self.undo.push(self.position);
        self.active_hack = Some(node.id);
        out_events.push(Event::HackStarted {
            node: node.id,
            attempts: HACK_ATTEMPTS,
        });
    }

    fn resolve_hack(&mut self, node: NodeId, outcome: HackOutcome, out_events: &mut Vec<Event>) {
        if self.active_hack != Some(node) {
            debug!(?node, "ignoring resolution for a hack that was never started");
            return;
        }
        self.active_hack = None;

        let Some(index) = self.nodes.iter().position(|candidate| candidate.id == node) else {
            return;
        };
        let place = self.grid.place_name(self.nodes[index].position);

        match outcome {
            HackOutcome::Success => {
                self.nodes[index].hacked = true;
                self.history.append(format!("Hacked {place}"));
                out_events.push(Event::NodeHacked { node });

                if !self.hub.unlocked && self.nodes.iter().all(|candidate| candidate.hacked) {
                    self.hub.unlocked = true;
                    info!("all nodes breached; hub unlocked");
                    out_events.push(Event::HubUnlocked);
                }
            }
            HackOutcome::Failure => {
                self.history.append(format!("Failed hack attempt at {place}"));
                out_events.push(Event::HackFailed { node });
                self.enqueue_threat(PURSUER_LABEL.to_owned(), PURSUER_PRIORITY, out_events);
                self.patrol(out_events);
            }
        }
    }

    fn bypass(&mut self, out_events: &mut Vec<Event>) {
        let pursuing = self.threats.peek().is_some_and(Threat::is_pursuer);
        if !pursuing {
            out_events.push(Event::BypassRejected {
                reason: BypassRejection::NothingToBypass,
            });
            return;
        }

        if !self.inventory.take(Item::VpnApp) {
            out_events.push(Event::BypassRejected {
                reason: BypassRejection::MissingItem(Item::VpnApp),
            });
            return;
        }

        if let Some(threat) = self.threats.dequeue() {
            self.history
                .append(format!("Bypassed {} with {}", threat.label(), Item::VpnApp));
            out_events.push(Event::ThreatBypassed {
                label: threat.into_label(),
                item: Item::VpnApp,
            });
        }
    }

    fn enqueue_threat(&mut self, label: String, priority: u8, out_events: &mut Vec<Event>) {
        let threat = Threat::new(label, priority);
        let queued_label = threat.label().to_owned();
        match self.threats.enqueue(threat) {
            Ok(()) => out_events.push(Event::ThreatQueued {
                label: queued_label,
                priority,
            }),
            Err(QueueFull(rejected)) => {
                debug!(label = rejected.label(), "threat queue full");
                out_events.push(Event::ThreatQueueFull {
                    label: rejected.into_label(),
                });
            }
        }
    }

    fn patrol(&mut self, out_events: &mut Vec<Event>) {
        let Some(head) = self.threats.peek() else {
            return;
        };

        if head.is_pursuer() {
            out_events.push(Event::PursuitActive {
                label: head.label().to_owned(),
            });
            return;
        }

        if let Some(threat) = self.threats.dequeue() {
            out_events.push(Event::ThreatEvaded {
                label: threat.into_label(),
            });
        }
    }

    fn record_protocol_step(
        &mut self,
        step: ContainmentStep,
        action: StepAction,
        out_events: &mut Vec<Event>,
    ) {
        let text = match action {
            StepAction::Completed => format!("Completed step: {step}"),
            StepAction::Reverted => format!("Undid step: {step}"),
        };
        self.history.append(text);
        out_events.push(Event::ProtocolStepRecorded { step, action });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Move { direction } => world.step_player(direction, out_events),
        Command::Undo => world.undo(out_events),
        Command::BeginHack => world.begin_hack(out_events),
        Command::ResolveHack { node, outcome } => world.resolve_hack(node, outcome, out_events),
        Command::RecordRoute { node } => {
            let Some(target) = world.nodes.iter().find(|candidate| candidate.id == node) else {
                return;
            };
            let place = world.grid.place_name(target.position);
            world.history.append(format!("Found path to {place}"));
            out_events.push(Event::RouteRecorded { node });
        }
        Command::Bypass => world.bypass(out_events),
        Command::EnqueueThreat { label, priority } => {
            world.enqueue_threat(label, priority, out_events);
        }
        Command::GatherCrowd { crowd } => {
            world.crowds.push_back(crowd.clone());
            out_events.push(Event::CrowdGathered { crowd });
        }
        Command::PatrolCheck => world.patrol(out_events),
        Command::EndTurn => {
            world.turn = world.turn.saturating_add(1);
            out_events.push(Event::TurnEnded { turn: world.turn });
        }
        Command::RecordProtocolStep { step, action } => {
            world.record_protocol_step(step, action, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use last_protocol_core::{NodeId, Position};

    use super::{Grid, HistoryEntry, Hub, Inventory, NetworkNode, ThreatScheduler, World};

    /// Provides read-only access to the world's grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player_position(world: &World) -> Position {
        world.position
    }

    /// Landmark name of the provided position.
    #[must_use]
    pub fn place_name(world: &World, position: Position) -> &'static str {
        world.grid.place_name(position)
    }

    /// Every network node in identity order.
    #[must_use]
    pub fn nodes(world: &World) -> &[NetworkNode] {
        &world.nodes
    }

    /// Looks up a single network node.
    #[must_use]
    pub fn node(world: &World, id: NodeId) -> Option<&NetworkNode> {
        world.nodes.iter().find(|node| node.id() == id)
    }

    /// Provides read-only access to the hub.
    #[must_use]
    pub fn hub(world: &World) -> &Hub {
        &world.hub
    }

    /// Reports whether the final protocol may begin.
    #[must_use]
    pub fn protocol_ready(world: &World) -> bool {
        world.hub.unlocked() && world.position == world.hub.position()
    }

    /// Provides read-only access to the inventory.
    #[must_use]
    pub fn inventory(world: &World) -> &Inventory {
        &world.inventory
    }

    /// Every history entry in insertion order.
    #[must_use]
    pub fn history(world: &World) -> &[HistoryEntry] {
        world.history.entries()
    }

    /// Provides read-only access to the threat scheduler.
    #[must_use]
    pub fn threats(world: &World) -> &ThreatScheduler {
        &world.threats
    }

    /// Number of positions recorded on the undo stack.
    #[must_use]
    pub fn undo_depth(world: &World) -> usize {
        world.undo.len()
    }

    /// Number of crowds waiting to slow the player down.
    #[must_use]
    pub fn pending_crowds(world: &World) -> usize {
        world.crowds.len()
    }

    /// Node targeted by the hacking challenge in progress, if any.
    #[must_use]
    pub fn active_hack(world: &World) -> Option<NodeId> {
        world.active_hack
    }

    /// Number of turns completed so far.
    #[must_use]
    pub fn turn(world: &World) -> u64 {
        world.turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    #[test]
    fn mission_landmarks_match_grid() {
        let from_grid =
            World::from_grid(Grid::mission(), Inventory::starting()).expect("mission grid valid");
        let constant = World::new();

        assert_eq!(
            query::player_position(&from_grid),
            query::player_position(&constant)
        );
        assert_eq!(query::nodes(&from_grid), query::nodes(&constant));
        assert_eq!(query::hub(&from_grid), query::hub(&constant));
    }

    #[test]
    fn move_pushes_previous_position_and_logs() {
        let mut world = World::new();
        let events = run(
            &mut world,
            Command::Move {
                direction: Direction::South,
            },
        );

        assert_eq!(
            events,
            vec![Event::PlayerMoved {
                direction: Direction::South,
                from: Position::new(0, 0),
                to: Position::new(1, 0),
            }]
        );
        assert_eq!(query::undo_depth(&world), 1);
        assert_eq!(
            query::history(&world)[0].text(),
            "Moved south to Unknown Sector"
        );
    }

    #[test]
    fn rejected_move_leaves_state_untouched() {
        let mut world = World::new();
        let events = run(
            &mut world,
            Command::Move {
                direction: Direction::East,
            },
        );

        assert_eq!(
            events,
            vec![Event::MoveRejected {
                direction: Direction::East,
                reason: last_protocol_core::MoveRejection::Blocked,
            }]
        );
        assert_eq!(query::player_position(&world), Position::new(0, 0));
        assert_eq!(query::undo_depth(&world), 0);
        assert!(query::history(&world).is_empty());
    }

    #[test]
    fn advisories_precede_committed_move() {
        let mut world = World::new();
        let _ = run(
            &mut world,
            Command::GatherCrowd {
                crowd: "tourists taking selfies".to_owned(),
            },
        );
        let _ = run(
            &mut world,
            Command::EnqueueThreat {
                label: "corporate surveillance drone".to_owned(),
                priority: 3,
            },
        );

        let events = run(
            &mut world,
            Command::Move {
                direction: Direction::South,
            },
        );

        assert_eq!(
            events,
            vec![
                Event::CrowdDelayed {
                    crowd: "tourists taking selfies".to_owned(),
                },
                Event::ThreatEvaded {
                    label: "corporate surveillance drone".to_owned(),
                },
                Event::PlayerMoved {
                    direction: Direction::South,
                    from: Position::new(0, 0),
                    to: Position::new(1, 0),
                },
            ]
        );
    }

    #[test]
    fn undo_on_empty_stack_reports_nothing() {
        let mut world = World::new();
        assert_eq!(run(&mut world, Command::Undo), vec![Event::NothingToUndo]);
        assert!(query::history(&world).is_empty());
    }

    #[test]
    fn undoing_every_move_returns_to_start() {
        let mut world = World::new();
        let route = [
            Direction::South,
            Direction::East,
            Direction::East,
            Direction::North,
        ];
        for direction in route {
            let events = run(&mut world, Command::Move { direction });
            assert!(matches!(
                events.last(),
                Some(Event::PlayerMoved { .. })
            ));
        }
        assert_eq!(query::player_position(&world), Position::new(0, 2));
        assert_eq!(query::undo_depth(&world), route.len());

        for _ in route {
            let events = run(&mut world, Command::Undo);
            assert!(matches!(
                events.as_slice(),
                [Event::PositionReverted { .. }]
            ));
        }
        assert_eq!(query::player_position(&world), Position::new(0, 0));
        assert_eq!(run(&mut world, Command::Undo), vec![Event::NothingToUndo]);
        assert_eq!(query::player_position(&world), Position::new(0, 0));

        let reverts: Vec<_> = query::history(&world)[route.len()..]
            .iter()
            .map(HistoryEntry::text)
            .collect();
        assert_eq!(
            reverts,
            vec![
                "Undid a move, reverting to Unknown Sector",
                "Undid a move, reverting to Unknown Sector",
                "Undid a move, reverting to Unknown Sector",
                "Undid a move, reverting to Lazimpat (Your Base)",
            ]
        );
    }

    #[test]
    fn hack_requires_node() {
        let mut world = World::new();
        assert_eq!(
            run(&mut world, Command::BeginHack),
            vec![Event::HackRejected {
                reason: HackRejection::NotHackable,
            }]
        );
        assert_eq!(query::undo_depth(&world), 0);
    }

    #[test]
    fn resolution_without_started_hack_is_ignored() {
        let mut world = World::new();
        let events = run(
            &mut world,
            Command::ResolveHack {
                node: NodeId::Thamel,
                outcome: HackOutcome::Success,
            },
        );

        assert!(events.is_empty());
        assert!(query::nodes(&world).iter().all(|node| !node.hacked()));
    }

    #[test]
    fn bypass_without_pursuer_is_rejected() {
        let mut world = World::new();
        assert_eq!(
            run(&mut world, Command::Bypass),
            vec![Event::BypassRejected {
                reason: BypassRejection::NothingToBypass,
            }]
        );
        assert!(query::inventory(&world).contains(Item::VpnApp));
    }

    #[test]
    fn pursuer_blocks_slip_past() {
        let mut world = World::new();
        let _ = run(
            &mut world,
            Command::EnqueueThreat {
                label: PURSUER_LABEL.to_owned(),
                priority: PURSUER_PRIORITY,
            },
        );

        for _ in 0..2 {
            assert_eq!(
                run(&mut world, Command::PatrolCheck),
                vec![Event::PursuitActive {
                    label: PURSUER_LABEL.to_owned(),
                }]
            );
        }
        assert_eq!(query::threats(&world).len(), 1);
    }

    #[test]
    fn protocol_steps_are_logged() {
        let mut world = World::new();
        let _ = run(
            &mut world,
            Command::RecordProtocolStep {
                step: ContainmentStep::SecureAccessPoints,
                action: StepAction::Completed,
            },
        );
        let _ = run(
            &mut world,
            Command::RecordProtocolStep {
                step: ContainmentStep::DeployIsolationCode,
                action: StepAction::Reverted,
            },
        );

        let texts: Vec<_> = query::history(&world)
            .iter()
            .map(HistoryEntry::text)
            .collect();
        assert_eq!(
            texts,
            vec![
                "Completed step: Step 1: Secure access points",
                "Undid step: Step 2: Deploy isolation code",
            ]
        );
    }
}
