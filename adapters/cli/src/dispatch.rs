use last_protocol_core::{Direction, NodeId, ParseDirectionError, ParseNodeError};
use thiserror::Error;

/// Commands accepted by the exploration loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Request {
    Move(Direction),
    Hack,
    Undo,
    FindPath(NodeId),
    Bypass,
    Inventory,
    History,
    Map,
    Help,
    Quit,
}

/// Malformed player input. Reported as advisory text; never ends the session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum InputError {
    #[error("Please enter a command. Type 'help' for a list of commands.")]
    Empty,
    #[error("Usage: move <direction> (north, south, east, west)")]
    MissingDirection,
    #[error("Invalid direction '{0}'. Please use north, south, east, or west.")]
    InvalidDirection(String),
    #[error("Usage: find_path <location>")]
    MissingLocation,
    #[error("Invalid destination '{0}'. Use 'T' (Thamel), 'B' (Baneshwor), or 'D' (Durbar Square).")]
    InvalidLocation(String),
    #[error("Usage: bypass drone")]
    BypassUsage,
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),
}

/// Parses one line of exploration input. Keywords are case-insensitive.
pub(crate) fn parse(line: &str) -> Result<Request, InputError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Err(InputError::Empty);
    };
    let argument = words.next();

    match command.to_ascii_lowercase().as_str() {
        "move" => {
            let word = argument.ok_or(InputError::MissingDirection)?;
            word.parse()
                .map(Request::Move)
                .map_err(|error: ParseDirectionError| InputError::InvalidDirection(error.0))
        }
        "hack" => Ok(Request::Hack),
        "undo" => Ok(Request::Undo),
        "find_path" => {
            let word = argument.ok_or(InputError::MissingLocation)?;
            word.parse()
                .map(Request::FindPath)
                .map_err(|error: ParseNodeError| InputError::InvalidLocation(error.0))
        }
        "bypass" => match argument {
            Some(target) if target.eq_ignore_ascii_case("drone") => Ok(Request::Bypass),
            _ => Err(InputError::BypassUsage),
        },
        "inventory" => Ok(Request::Inventory),
        "history" => Ok(Request::History),
        "map" => Ok(Request::Map),
        "help" => Ok(Request::Help),
        "quit" => Ok(Request::Quit),
        _ => Err(InputError::Unknown(command.to_owned())),
    }
}
