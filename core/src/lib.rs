#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across The Last Protocol engine.
//!
//! This crate defines the message surface that connects the command
//! dispatcher, the authoritative session world, and pure systems. The
//! dispatcher submits [`Command`] values describing desired mutations, the
//! world executes those commands via its `apply` entry point, and then
//! broadcasts [`Event`] values for systems and presentation to react to.
//! Systems consume event streams, query immutable views, and respond
//! exclusively with new command batches.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title shown above the mission map.
pub const MISSION_TITLE: &str = "Kathmandu - The Last Protocol";

/// Number of probing rounds granted to every hacking attempt.
pub const HACK_ATTEMPTS: u8 = 3;

/// Label carried by the pursuing threat spawned when a hack fails.
pub const PURSUER_LABEL: &str = "Kumari Protocol Drone";

/// Priority of the pursuing threat, the most urgent tier in the scheduler.
pub const PURSUER_PRIORITY: u8 = 1;

/// Name reported for cells that carry no landmark.
pub const UNKNOWN_SECTOR: &str = "Unknown Sector";

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the player step one cell in the provided direction.
    Move {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Reverts the player to the most recently recorded position.
    Undo,
    /// Requests entry into the hacking challenge at the player's position.
    BeginHack,
    /// Settles a hacking challenge previously opened by [`Command::BeginHack`].
    ResolveHack {
        /// Node the challenge targeted.
        node: NodeId,
        /// Terminal result of the challenge.
        outcome: HackOutcome,
    },
    /// Records that a route towards the provided node was found.
    RecordRoute {
        /// Node the route leads to.
        node: NodeId,
    },
    /// Spends the bypass consumable on the pursuing threat.
    Bypass,
    /// Adds a threat to the bounded threat scheduler.
    EnqueueThreat {
        /// Opaque label describing the threat.
        label: String,
        /// Urgency of the threat; lower values are more urgent.
        priority: u8,
    },
    /// Adds an NPC crowd to the crowd queue.
    GatherCrowd {
        /// Description of the crowd.
        crowd: String,
    },
    /// Runs the threat advisory check against the head of the scheduler.
    PatrolCheck,
    /// Closes the current turn.
    EndTurn,
    /// Records progress through the containment protocol.
    RecordProtocolStep {
        /// Step that was acted upon.
        step: ContainmentStep,
        /// Whether the step was completed or reverted.
        action: StepAction,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Direction of the step.
        direction: Direction,
        /// Cell the player occupied before moving.
        from: Position,
        /// Cell the player occupies after moving.
        to: Position,
    },
    /// Reports that a move request was rejected.
    MoveRejected {
        /// Direction that was requested.
        direction: Direction,
        /// Specific reason the move failed.
        reason: MoveRejection,
    },
    /// Announces that a queued crowd slowed the player down.
    CrowdDelayed {
        /// Description of the crowd.
        crowd: String,
    },
    /// Confirms that a crowd joined the crowd queue.
    CrowdGathered {
        /// Description of the crowd.
        crowd: String,
    },
    /// Reports that an ordinary threat was encountered and slipped past.
    ThreatEvaded {
        /// Label of the dequeued threat.
        label: String,
    },
    /// Warns that the pursuing threat holds the head of the scheduler.
    PursuitActive {
        /// Label of the pursuing threat.
        label: String,
    },
    /// Confirms that the player was reverted to a prior position.
    PositionReverted {
        /// Cell the player occupies after the reversion.
        to: Position,
    },
    /// Reports that the undo stack was empty.
    NothingToUndo,
    /// Announces that a hacking challenge opened.
    HackStarted {
        /// Node under attack.
        node: NodeId,
        /// Probing rounds available to the challenge.
        attempts: u8,
    },
    /// Reports that a hacking challenge could not be opened.
    HackRejected {
        /// Specific reason the challenge was refused.
        reason: HackRejection,
    },
    /// Confirms that a node was compromised.
    NodeHacked {
        /// Node that was compromised.
        node: NodeId,
    },
    /// Announces that every node has been compromised and the hub opened.
    HubUnlocked,
    /// Reports that a hacking challenge exhausted its attempts.
    HackFailed {
        /// Node that resisted the challenge.
        node: NodeId,
    },
    /// Confirms that a threat entered the scheduler.
    ThreatQueued {
        /// Label of the queued threat.
        label: String,
        /// Urgency of the queued threat.
        priority: u8,
    },
    /// Reports that the scheduler was full and the threat was dropped.
    ThreatQueueFull {
        /// Label of the dropped threat.
        label: String,
    },
    /// Confirms that a route query was recorded.
    RouteRecorded {
        /// Node the route leads to.
        node: NodeId,
    },
    /// Confirms that the pursuing threat was bypassed.
    ThreatBypassed {
        /// Label of the bypassed threat.
        label: String,
        /// Item consumed by the bypass.
        item: Item,
    },
    /// Reports that a bypass request was rejected.
    BypassRejected {
        /// Specific reason the bypass failed.
        reason: BypassRejection,
    },
    /// Announces that a turn closed.
    TurnEnded {
        /// Number of turns completed so far.
        turn: u64,
    },
    /// Confirms that containment progress was recorded.
    ProtocolStepRecorded {
        /// Step that was acted upon.
        step: ContainmentStep,
        /// Whether the step was completed or reverted.
        action: StepAction,
    },
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction, in the order the help text lists them.
    pub const ALL: [Direction; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// Unit offset of the direction expressed as `(rows, columns)`.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (-1, 0),
            Self::East => (0, 1),
            Self::South => (1, 0),
            Self::West => (0, -1),
        }
    }

    /// Lowercase name accepted by the `move` command.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        }
    }

    /// Capitalised name used when describing routes.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::North => "North",
            Self::East => "East",
            Self::South => "South",
            Self::West => "West",
        }
    }

    /// Direction of the unit step leading from `from` to `to`, if adjacent.
    #[must_use]
    pub fn between(from: Position, to: Position) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| from.checked_step(*direction) == Some(to))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error raised when text does not name a cardinal direction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid direction '{0}'; use north, south, east, or west")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|direction| direction.name() == normalized)
            .ok_or_else(|| ParseDirectionError(value.trim().to_owned()))
    }
}

/// Location of a single grid cell expressed as row and column coordinates.
///
/// Coordinates are signed so that candidate cells computed by stepping off
/// the grid remain representable until bounds checks reject them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    row: i32,
    column: i32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Cell reached by a unit step in the provided direction, or `None` when
    /// the step leaves the coordinate range.
    #[must_use]
    pub fn checked_step(self, direction: Direction) -> Option<Self> {
        let (rows, columns) = direction.offset();
        Some(Self::new(
            self.row.checked_add(rows)?,
            self.column.checked_add(columns)?,
        ))
    }

    /// Computes the Manhattan distance between two positions, saturating at
    /// `u32::MAX`.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.row
            .abs_diff(other.row)
            .saturating_add(self.column.abs_diff(other.column))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Identity of one of the three compromisable network nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeId {
    /// Thamel Network Node, map symbol `T`.
    Thamel,
    /// Baneshwor Node, map symbol `B`.
    Baneshwor,
    /// Durbar Square Node, map symbol `D`.
    DurbarSquare,
}

impl NodeId {
    /// Every node that must be compromised to unlock the hub.
    pub const ALL: [NodeId; 3] = [Self::Thamel, Self::Baneshwor, Self::DurbarSquare];

    /// Symbol used on the map and by the `find_path` command.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Thamel => 'T',
            Self::Baneshwor => 'B',
            Self::DurbarSquare => 'D',
        }
    }

    /// Place name of the node.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Thamel => "Thamel Network Node",
            Self::Baneshwor => "Baneshwor Node",
            Self::DurbarSquare => "Durbar Square Node",
        }
    }

    /// Resolves a map symbol into a node identity.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        let symbol = symbol.to_ascii_uppercase();
        Self::ALL.into_iter().find(|node| node.symbol() == symbol)
    }
}

/// Error raised when text does not name a network node.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid destination '{0}'; use 'T' (Thamel), 'B' (Baneshwor), or 'D' (Durbar Square)")]
pub struct ParseNodeError(pub String);

impl FromStr for NodeId {
    type Err = ParseNodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => {
                Self::from_symbol(symbol).ok_or_else(|| ParseNodeError(trimmed.to_owned()))
            }
            _ => Err(ParseNodeError(trimmed.to_owned())),
        }
    }
}

/// Terrain tag carried by every grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terrain {
    /// The player's base and starting cell.
    Base,
    /// A compromisable network node.
    Node(NodeId),
    /// The final mission hub.
    Hub,
    /// Impassable cell.
    Obstacle,
    /// Unremarkable traversable cell.
    Empty,
}

impl Terrain {
    /// Map legend symbol for the terrain.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Base => 'L',
            Self::Node(node) => node.symbol(),
            Self::Hub => 'H',
            Self::Obstacle => 'X',
            Self::Empty => '.',
        }
    }

    /// Parses a map legend symbol.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'L' => Some(Self::Base),
            'H' => Some(Self::Hub),
            'X' => Some(Self::Obstacle),
            '.' => Some(Self::Empty),
            other => NodeId::from_symbol(other)
                .filter(|_| other.is_ascii_uppercase())
                .map(Self::Node),
        }
    }

    /// Reports whether the terrain blocks movement.
    #[must_use]
    pub const fn is_obstacle(self) -> bool {
        matches!(self, Self::Obstacle)
    }

    /// Landmark name of the terrain, if it carries one.
    #[must_use]
    pub const fn place_name(self) -> Option<&'static str> {
        match self {
            Self::Base => Some("Lazimpat (Your Base)"),
            Self::Node(node) => Some(node.name()),
            Self::Hub => Some("Patan Data Hub (Final Mission)"),
            Self::Obstacle | Self::Empty => None,
        }
    }
}

/// Items the player may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Item {
    /// Encrypted USB stick.
    EncryptedUsb,
    /// VPN application, consumed to bypass the pursuing threat.
    VpnApp,
    /// Decryption tool.
    DecryptTool,
}

impl Item {
    /// Items carried at the start of a mission.
    pub const STARTING: [Item; 3] = [Self::EncryptedUsb, Self::VpnApp, Self::DecryptTool];

    /// Display label of the item.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EncryptedUsb => "encrypted_USB",
            Self::VpnApp => "VPN_app",
            Self::DecryptTool => "decrypt_tool",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Network signal traced during a hacking round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Firewall trace.
    Firewall,
    /// Server trace.
    Server,
    /// Router trace.
    Router,
}

impl Signal {
    /// Fixed set of signals a round may roll.
    pub const ALL: [Signal; 3] = [Self::Firewall, Self::Server, Self::Router];

    /// Lowercase name the player types as a guess.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Firewall => "firewall",
            Self::Server => "server",
            Self::Router => "router",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error raised when a guess does not name a signal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("'{0}' is not a traceable signal")]
pub struct ParseSignalError(pub String);

impl FromStr for Signal {
    type Err = ParseSignalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|signal| signal.name() == normalized)
            .ok_or_else(|| ParseSignalError(value.trim().to_owned()))
    }
}

/// Terminal result of a hacking challenge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HackOutcome {
    /// The node was compromised.
    Success,
    /// Every attempt was spent without tracing the signal.
    Failure,
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum MoveRejection {
    /// The candidate cell lies outside the grid extents.
    #[error("you cannot move outside the city limits")]
    OutOfBounds,
    /// The candidate cell is an obstacle.
    #[error("an obstacle blocks your path; find another way")]
    Blocked,
}

/// Reasons a hacking challenge may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum HackRejection {
    /// The player is not standing on a network node.
    #[error("you are not at a hackable network node")]
    NotHackable,
    /// The node at the player's position is already compromised.
    #[error("this node is already hacked")]
    AlreadyHacked,
}

/// Reasons a bypass request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum BypassRejection {
    /// The head of the scheduler is not the pursuing threat.
    #[error("no high priority drone to bypass at the moment")]
    NothingToBypass,
    /// The required consumable is missing from the inventory.
    #[error("you need a '{0}' in your inventory to bypass the drone")]
    MissingItem(Item),
}

/// Ordered steps of the containment protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainmentStep {
    /// First step.
    SecureAccessPoints,
    /// Second step.
    DeployIsolationCode,
    /// Final step, which can never be undone.
    UploadContainmentProtocol,
}

impl ContainmentStep {
    /// Steps in the order they are completed.
    pub const COMPLETION_ORDER: [ContainmentStep; 3] = [
        Self::SecureAccessPoints,
        Self::DeployIsolationCode,
        Self::UploadContainmentProtocol,
    ];

    /// Display label of the step.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SecureAccessPoints => "Step 1: Secure access points",
            Self::DeployIsolationCode => "Step 2: Deploy isolation code",
            Self::UploadContainmentProtocol => "Step 3: Upload containment protocol",
        }
    }

    /// Reports whether this is the final, non-undoable step.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::UploadContainmentProtocol)
    }
}

impl fmt::Display for ContainmentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Action applied to a containment step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepAction {
    /// The step was completed.
    Completed,
    /// The step was reverted.
    Reverted,
}

/// The two mutually exclusive resolutions of the final protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProtocolKind {
    /// Multi-step protocol, reversible until its last step.
    Containment,
    /// One-shot irreversible protocol.
    Obliteration,
}

impl ProtocolKind {
    /// Name accepted by the `protocol` command.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Containment => "containment",
            Self::Obliteration => "obliteration",
        }
    }
}

/// Terminal outcome of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ending {
    /// Oblivion was contained.
    Good,
    /// The city collapsed.
    Bad {
        /// What forced the collapse.
        cause: CollapseCause,
    },
}

/// Causes of the bad ending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollapseCause {
    /// The player confirmed the obliteration protocol.
    Obliterated,
    /// Too many invalid inputs while choosing a protocol.
    ProtocolErrors,
    /// Too many invalid inputs during the containment steps.
    StepErrors,
}

/// Problems with input submitted to the final protocol.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Error)]
pub enum InputProblem {
    /// Nothing was entered.
    #[error("invalid input; please enter a command")]
    Empty,
    /// `protocol` was entered without a type.
    #[error("usage: protocol <type> (containment or obliteration)")]
    MissingType,
    /// `protocol` was entered with an unknown type.
    #[error("invalid protocol type '{0}'; use 'containment' or 'obliteration'")]
    UnknownType(String),
    /// Something other than `protocol` was entered while choosing.
    #[error("invalid command '{0}'; you must choose a protocol")]
    UnknownCommand(String),
    /// Something other than `next` or `undo` was entered during containment.
    #[error("invalid command '{0}'; use 'next' or 'undo'")]
    UnknownStepAction(String),
}

/// Notices emitted by the final protocol engine for presentation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProtocolNotice {
    /// Input was rejected and counted against the active error budget.
    InvalidInput {
        /// What was wrong with the input.
        problem: InputProblem,
        /// Invalid inputs still tolerated before the protocol fails.
        remaining: u32,
    },
    /// The containment protocol started and its steps were loaded.
    ContainmentStarted,
    /// Names the step awaiting completion.
    CurrentStep {
        /// Step at the top of the protocol stack.
        step: ContainmentStep,
    },
    /// A step was completed.
    StepCompleted {
        /// Completed step.
        step: ContainmentStep,
    },
    /// A step was reverted.
    StepReverted {
        /// Reverted step.
        step: ContainmentStep,
    },
    /// An undo was refused because the final step is current.
    FinalStepLocked {
        /// The final step.
        step: ContainmentStep,
    },
    /// Obliteration awaits confirmation.
    ObliterationArmed,
    /// Obliteration was declined and protocol choice resumed.
    ObliterationCancelled,
    /// The session reached an ending.
    Ended {
        /// Ending that was reached.
        ending: Ending,
    },
    /// Input arrived after the session already ended.
    SessionOver,
}
