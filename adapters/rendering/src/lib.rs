#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text presentation for The Last Protocol adapters.
//!
//! Everything here is a pure function from world queries, events or notices
//! to strings; adapters decide where the text goes.

use std::fmt::{self, Write as _};

use last_protocol_core::{
    CollapseCause, Direction, Ending, Event, MoveRejection, NodeId, Position, ProtocolNotice,
    Terrain, MISSION_TITLE,
};
use last_protocol_world::{query, Grid, World};

mod narrative;

pub use narrative::{
    FINAL_COMMANDS_HINT, FINAL_PROTOCOL_START, GAME_OVER, GOODBYE, INVALID_NAME, MAP_HINT,
    NAME_PROMPT,
};

const BOX_WIDTH: usize = 40;
const PLAYER_MARKER: char = '*';

/// Opening story addressed to the named player.
#[must_use]
pub fn briefing(name: &str) -> String {
    narrative::briefing(name)
}

/// Help menu, with the final-protocol hint once it is available.
#[must_use]
pub fn help(world: &World) -> String {
    let mut text = narrative::HELP.to_owned();
    if query::protocol_ready(world) {
        text.push_str("\n\n");
        text.push_str(FINAL_COMMANDS_HINT);
    }
    text
}

/// Boxed map with the player's cell marked, followed by the legend.
#[must_use]
pub fn map(world: &World) -> String {
    let grid = query::grid(world);
    let player = query::player_position(world);
    let rule = "-".repeat(BOX_WIDTH);
    let inner = BOX_WIDTH - 2;

    let mut text = String::new();
    let _ = writeln!(text, "{rule}");
    let _ = writeln!(text, "|{:^inner$}|", "\u{25b2} North");
    let _ = writeln!(text, "{rule}");
    let _ = writeln!(text, "|{MISSION_TITLE:^inner$}|");
    let _ = writeln!(
        text,
        "|    Location: {:<24}|",
        grid.place_name(player)
    );
    let _ = writeln!(text, "{rule}");

    for row in 0..grid.rows() as i32 {
        let mut line = String::from("| ");
        for column in 0..grid.columns() as i32 {
            let position = Position::new(row, column);
            let symbol = if position == player {
                PLAYER_MARKER
            } else {
                grid.terrain(position).map_or(' ', Terrain::symbol)
            };
            line.push(symbol);
            line.push_str("  ");
        }
        let _ = writeln!(text, "{} |", line.trim_end());
    }
    let _ = writeln!(text, "{rule}");
    text.push('\n');
    text.push_str(&legend());
    text
}

/// Boxed explanation of every map symbol.
#[must_use]
pub fn legend() -> String {
    let rule = "-".repeat(BOX_WIDTH);
    let inner = BOX_WIDTH - 2;
    let mut text = String::new();
    let _ = writeln!(text, "{rule}");
    let _ = writeln!(text, "|{:^inner$}|", "--- Map Legend ---");

    let mut entries = vec![format!("[{PLAYER_MARKER}]: Your Position")];
    let terrains = [
        Terrain::Base,
        Terrain::Node(NodeId::Thamel),
        Terrain::Node(NodeId::Baneshwor),
        Terrain::Node(NodeId::DurbarSquare),
        Terrain::Hub,
    ];
    for terrain in terrains {
        if let Some(name) = terrain.place_name() {
            entries.push(format!("[{}]: {name}", terrain.symbol()));
        }
    }
    entries.push(format!("[{}]: Obstacle", Terrain::Obstacle.symbol()));
    entries.push(format!("[{}]: Empty", Terrain::Empty.symbol()));

    for entry in entries {
        let _ = writeln!(text, "| {:<37}|", entry);
    }
    let _ = write!(text, "{rule}");
    text
}

/// Carried items, one per line.
#[must_use]
pub fn inventory(world: &World) -> String {
    let items = query::inventory(world).items();
    let mut text = String::from("--- Your Inventory ---\n");
    if items.is_empty() {
        text.push_str("Inventory is empty.\n");
    }
    for item in items {
        let _ = writeln!(text, "- {item}");
    }
    text.push_str("----------------------");
    text
}

/// Numbered history log, oldest first.
#[must_use]
pub fn history_log(world: &World) -> String {
    let mut text = String::new();
    for (index, entry) in query::history(world).iter().enumerate() {
        let _ = writeln!(text, "{}. {entry}", index + 1);
    }
    text
}

/// Framed history log printed by the `history` command.
#[must_use]
pub fn history(world: &World) -> String {
    let entries = history_log(world);
    let body = if entries.is_empty() {
        "No actions recorded yet.\n".to_owned()
    } else {
        entries
    };
    format!("--- Hacking History ---\n{body}-----------------------")
}

/// Route directions, or a notice that no route was found.
///
/// `hops` pairs every cell after the start with the direction used to reach it.
#[must_use]
pub fn route(
    grid: &Grid,
    start: Position,
    goal: Position,
    hops: Option<&[(Direction, Position)]>,
) -> String {
    let from = grid.place_name(start);
    let to = grid.place_name(goal);
    let Some(hops) = hops else {
        return format!("No path found from {from} to {to}. Try another route or check obstacles.");
    };

    let mut text = format!("Path from {from} to {to}:");
    for (direction, cell) in hops {
        let _ = write!(
            text,
            "\n-> {} ({})",
            grid.place_name(*cell),
            direction.title()
        );
    }
    text
}

/// Header of a hacking round.
#[must_use]
pub fn hack_round(attempts_left: u8) -> String {
    format!(
        "--- Hacking Protocol ---\n Attempts Left: {attempts_left}\n\
Trace the network connection.\n\
Enter 'firewall', 'router' or 'server' to hack the system."
    )
}

/// Feedback after a correct guess.
pub const HACK_TRACED: &str = "Correct Path Found! Access Granted";

/// Feedback after a wrong guess with attempts remaining.
pub const HACK_MISSED: &str = "!!! Incorrect Path !!!\nRetrying.....";

/// Feedback after the final wrong guess.
pub const HACK_EXHAUSTED: &str = "!!! Network Penetration Failed !!!\nMax attempts reached";

/// Describes a world event, or returns `None` for bookkeeping events.
#[must_use]
pub fn describe_event(world: &World, event: &Event) -> Option<String> {
    let place = |position: Position| query::place_name(world, position);
    let node_name = |node: NodeId| {
        query::node(world, node)
            .map(|found| place(found.position()))
            .unwrap_or_else(|| node.name())
    };

    let text = match event {
        Event::PlayerMoved { to, .. } => format!("Current location: {}", place(*to)),
        Event::MoveRejected { reason, .. } => match reason {
            MoveRejection::Blocked => format!("!!! {} !!!", sentence(reason)),
            MoveRejection::OutOfBounds => sentence(reason),
        },
        Event::CrowdDelayed { crowd } => {
            format!("A wave of {crowd} slows your movement momentarily")
        }
        Event::ThreatEvaded { label } => {
            format!("You encounter a {label}. You manage to slip past.")
        }
        Event::PursuitActive { label } => format!(
            "!!! A high-priority {label} is actively pursuing you! \
Type 'bypass drone' if you have the right tool!"
        ),
        Event::PositionReverted { to } => {
            format!("Reverting to previous location: {}", place(*to))
        }
        Event::NothingToUndo => {
            "You cannot undo. There are no previous moves to revert to.".to_owned()
        }
        Event::HackStarted { node, .. } => format!("Initiating hack on {} ...", node_name(*node)),
        Event::HackRejected { reason } => sentence(reason),
        Event::NodeHacked { node } => format!(
            "Node {} successfully hacked!\nOblivion's control weakens.",
            node_name(*node)
        ),
        Event::HubUnlocked => {
            "All network nodes breached. The Patan Data Hub is now accessible!".to_owned()
        }
        Event::HackFailed { .. } => {
            "Hack failed. Oblivion's defenses are strong. A security alert is triggered!"
                .to_owned()
        }
        Event::ThreatQueueFull { .. } => {
            "Drone queue is full; cannot add more threats.".to_owned()
        }
        Event::ThreatBypassed { label, item } => {
            format!("You successfully deployed your {item} and bypassed the {label}!")
        }
        Event::BypassRejected { reason } => sentence(reason),
        Event::CrowdGathered { .. }
        | Event::ThreatQueued { .. }
        | Event::RouteRecorded { .. }
        | Event::TurnEnded { .. }
        | Event::ProtocolStepRecorded { .. } => return None,
    };
    Some(text)
}

/// Describes a final protocol notice. Endings include the full history log.
#[must_use]
pub fn describe_notice(world: &World, notice: &ProtocolNotice) -> String {
    match notice {
        ProtocolNotice::InvalidInput { problem, remaining } => {
            let mut text = sentence(problem);
            if *remaining > 0 {
                let _ = write!(text, " ({remaining} mistakes left)");
            }
            text
        }
        ProtocolNotice::ContainmentStarted => "Initiating Containment Protocol...\n\
Protocol steps loaded. Enter 'next' to proceed, or 'undo' to revert."
            .to_owned(),
        ProtocolNotice::CurrentStep { step } => format!("Current step: {step}"),
        ProtocolNotice::StepCompleted { .. } => "Step complete.".to_owned(),
        ProtocolNotice::StepReverted { step } => {
            format!("Undoing step: {step}\nReverted to previous step.")
        }
        ProtocolNotice::FinalStepLocked { .. } => {
            "This is the final step. You can't undo it. It's now or never.\n\
You must enter 'next' to proceed, otherwise the protocol fails."
                .to_owned()
        }
        ProtocolNotice::ObliterationArmed => "Initiating Obliteration Protocol...\n\
WARNING: This action is irreversible. There is no undo for Obliteration.\n\
Confirm (yes/no):"
            .to_owned(),
        ProtocolNotice::ObliterationCancelled => "Obliteration Protocol cancelled.".to_owned(),
        ProtocolNotice::Ended { ending } => ending_text(world, *ending),
        ProtocolNotice::SessionOver => "The session has already ended.".to_owned(),
    }
}

/// Ending narrative followed by the numbered history log and the sign-off.
#[must_use]
pub fn ending_text(world: &World, ending: Ending) -> String {
    let mut text = String::new();
    let (title, story) = match ending {
        Ending::Good => (narrative::GOOD_ENDING_TITLE, narrative::GOOD_ENDING),
        Ending::Bad { cause } => {
            match cause {
                CollapseCause::ProtocolErrors => {
                    text.push_str("Too many invalid commands. Protocol failed due to errors.\n\n");
                }
                CollapseCause::StepErrors => {
                    text.push_str("Too many errors in protocol steps. Protocol failed.\n\n");
                }
                CollapseCause::Obliterated => {}
            }
            (narrative::BAD_ENDING_TITLE, narrative::BAD_ENDING)
        }
    };

    let _ = write!(
        text,
        "{title}\n{story}\n\nFinal history log:\n{}{GAME_OVER}",
        history_log(world)
    );
    text
}

/// Renders an error or reason message as a capitalised sentence.
fn sentence(message: &dyn fmt::Display) -> String {
    let raw = message.to_string();
    let mut chars = raw.chars();
    let mut text = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    if !text.ends_with(['.', '!', '?']) {
        text.push('.');
    }
    text
}
