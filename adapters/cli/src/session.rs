use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use last_protocol_core::{Command, Ending, Event, NodeId};
use last_protocol_rendering as rendering;
use last_protocol_system_ambient::Ambient;
use last_protocol_system_final_protocol::FinalProtocol;
use last_protocol_system_hacking::{HackState, Hacking, SignalRoll};
use last_protocol_system_pathfinding::{find_path, route_steps};
use last_protocol_world::{self as world, query, World};
use tracing::{debug, warn};

use crate::{
    config::is_valid_name,
    dispatch::{self, Request},
};

const PROMPT: &str = "> ";

/// How a session finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The final protocol reached an ending.
    Ended(Ending),
    /// The player typed `quit`.
    Quit,
    /// Input ran out before the mission finished.
    Closed,
}

enum Flow {
    Continue,
    Stop(Outcome),
}

/// Blocking request/response loop driving one mission.
pub(crate) struct Session<R, W, S> {
    input: R,
    output: W,
    world: World,
    hacking: Hacking<S>,
    ambient: Ambient,
    player_name: Option<String>,
}

impl<R: BufRead, W: Write, S: SignalRoll> Session<R, W, S> {
    pub(crate) fn new(
        input: R,
        output: W,
        world: World,
        hacking: Hacking<S>,
        ambient: Ambient,
        player_name: Option<String>,
    ) -> Self {
        Self {
            input,
            output,
            world,
            hacking,
            ambient,
            player_name,
        }
    }

    /// Runs the mission until an ending, `quit`, or end of input.
    pub(crate) fn run(&mut self) -> Result<Outcome> {
        let Some(name) = self.player_name()? else {
            return Ok(Outcome::Closed);
        };
        self.say(&rendering::briefing(&name))?;
        self.say(rendering::MAP_HINT)?;

        loop {
            if query::protocol_ready(&self.world) {
                return self.final_protocol();
            }

            let Some(line) = self.read_line(PROMPT)? else {
                return Ok(Outcome::Closed);
            };
            let request = match dispatch::parse(&line) {
                Ok(request) => request,
                Err(error) => {
                    self.say(&error.to_string())?;
                    continue;
                }
            };

            if let Flow::Stop(outcome) = self.execute(request)? {
                return Ok(outcome);
            }
            self.end_turn()?;
        }
    }

    fn player_name(&mut self) -> Result<Option<String>> {
        if let Some(name) = self.player_name.take() {
            if is_valid_name(&name) {
                return Ok(Some(name.trim().to_owned()));
            }
            warn!(name = %name, "configured player name rejected");
        }

        loop {
            let Some(line) = self.read_line(&format!("{} ", rendering::NAME_PROMPT))? else {
                return Ok(None);
            };
            if is_valid_name(&line) {
                return Ok(Some(line.trim().to_owned()));
            }
            self.say(rendering::INVALID_NAME)?;
        }
    }

    fn execute(&mut self, request: Request) -> Result<Flow> {
        match request {
            Request::Move(direction) => {
                let _ = self.submit(vec![Command::Move { direction }])?;
            }
            Request::Hack => return self.hack(),
            Request::Undo => {
                let _ = self.submit(vec![Command::Undo])?;
            }
            Request::FindPath(node) => self.find_path(node)?,
            Request::Bypass => {
                let _ = self.submit(vec![Command::Bypass])?;
            }
            Request::Inventory => self.say(&rendering::inventory(&self.world))?,
            Request::History => self.say(&rendering::history(&self.world))?,
            Request::Map => self.say(&rendering::map(&self.world))?,
            Request::Help => self.say(&rendering::help(&self.world))?,
            Request::Quit => {
                self.say(rendering::GOODBYE)?;
                return Ok(Flow::Stop(Outcome::Quit));
            }
        }
        Ok(Flow::Continue)
    }

    fn hack(&mut self) -> Result<Flow> {
        let events = self.submit(vec![Command::BeginHack])?;
        self.hacking.handle(&events);

        let mut commands = Vec::new();
        while let Some(state) = self.hacking.state() {
            let HackState::Probing { attempts_left } = state else {
                let _ = self.hacking.submit("", &mut commands);
                break;
            };

            self.say(&rendering::hack_round(attempts_left))?;
            let Some(guess) = self.read_line(PROMPT)? else {
                return Ok(Flow::Stop(Outcome::Closed));
            };
            match self.hacking.submit(&guess, &mut commands) {
                Some(HackState::Success) => self.say(rendering::HACK_TRACED)?,
                Some(HackState::Failure) => {
                    self.say(rendering::HACK_MISSED)?;
                    self.say(rendering::HACK_EXHAUSTED)?;
                }
                Some(HackState::Probing { .. }) => self.say(rendering::HACK_MISSED)?,
                None => break,
            }
        }

        let _ = self.submit(commands)?;
        Ok(Flow::Continue)
    }

    fn find_path(&mut self, node: NodeId) -> Result<()> {
        let start = query::player_position(&self.world);
        let Some(goal) = query::node(&self.world, node).map(|found| found.position()) else {
            return Ok(());
        };

        let grid = query::grid(&self.world);
        let path = find_path(start, goal, grid);
        let hops: Option<Vec<_>> = path.as_deref().map(|cells| route_steps(cells).collect());
        let text = rendering::route(grid, start, goal, hops.as_deref());
        self.say(&text)?;

        if path.is_some() {
            let _ = self.submit(vec![Command::RecordRoute { node }])?;
        }
        Ok(())
    }

    fn end_turn(&mut self) -> Result<()> {
        let events = self.submit(vec![Command::EndTurn])?;
        let mut ambient_commands = Vec::new();
        self.ambient.handle(&events, &mut ambient_commands);
        let _ = self.submit(ambient_commands)?;
        let _ = self.submit(vec![Command::PatrolCheck])?;
        Ok(())
    }

    fn final_protocol(&mut self) -> Result<Outcome> {
        let mut protocol = FinalProtocol::engage(query::protocol_ready(&self.world))
            .context("final protocol engaged away from the hub")?;
        self.say(rendering::FINAL_PROTOCOL_START)?;

        loop {
            let Some(line) = self.read_line(PROMPT)? else {
                return Ok(Outcome::Closed);
            };

            let mut commands = Vec::new();
            let notices = protocol.submit(&line, &mut commands);
            let _ = self.submit(commands)?;
            for notice in &notices {
                let text = rendering::describe_notice(&self.world, notice);
                self.say(&text)?;
            }

            if let Some(ending) = protocol.ending() {
                return Ok(Outcome::Ended(ending));
            }
        }
    }

    /// Applies commands to the world and prints every describable event.
    fn submit(&mut self, commands: Vec<Command>) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        for command in commands {
            debug!(?command, "applying command");
            world::apply(&mut self.world, command, &mut events);
        }
        for event in &events {
            if let Some(text) = rendering::describe_event(&self.world, event) {
                self.say(&text)?;
            }
        }
        Ok(events)
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}\n").context("failed to write to output")
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}").context("failed to write prompt")?;
        self.output.flush().context("failed to flush output")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read player input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
    }
}
