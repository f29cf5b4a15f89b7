//! Fixed story and help text.

/// Prompt shown while asking for the player's name.
pub const NAME_PROMPT: &str = "Welcome to 'The Last Protocol'!\n\nWhat is your name, hacker? >";

/// Advisory shown when the entered name is rejected.
pub const INVALID_NAME: &str =
    "Invalid name. Name must contain only alphabetic characters and spaces. Please try again.";

/// Hint printed after the briefing.
pub const MAP_HINT: &str = "Type 'map' to see your starting location.";

/// Announcement shown when the player reaches the unlocked hub.
pub const FINAL_PROTOCOL_START: &str = "You have reached the Patan Data Hub!\n\n\
It's time to choose your final protocol.\n\
Options:\n\
'protocol containment' (ethical, multi-step, undoable during steps)\n\
OR\n\
'protocol obliteration' (risky, irreversible)";

/// Extra help line shown once the final protocol is available.
pub const FINAL_COMMANDS_HINT: &str = "Final commands available: protocol <type>";

/// Farewell printed on `quit`.
pub const GOODBYE: &str = "Exiting 'The Last Protocol'. Goodbye!";

/// Printed after an ending's history log.
pub const GAME_OVER: &str = "Game Over.";

pub(crate) const GOOD_ENDING_TITLE: &str = "--- GOOD ENDING: The Digital Guardian ---";

pub(crate) const GOOD_ENDING: &str = "You contained Oblivion.\n\n\
Its rogue code is now isolated, and it begins to mend the digital fabric of Kathmandu.\n\n\
Traffic flows, networks hum, and the city breathes a sigh of relief.\n\n\
Oblivion, no longer a threat, becomes a silent protector.";

pub(crate) const BAD_ENDING_TITLE: &str = "--- BAD ENDING: The Digital Collapse ---";

pub(crate) const BAD_ENDING: &str = "You chose destruction.\n\n\
Oblivion is gone, but the intricate web of Skynet, reliant on its core, unravels without it.\n\n\
The city's smart infrastructure descends into a permanent, chaotic blackout.\n\n\
Your name is a footnote in the digital dark age of Kathmandu.";

pub(crate) const HELP: &str = "================= HELP MENU =================

Available Commands:
move <direction>      - Navigate the map (north, south, east, west)
hack                  - Attempt to hack a network node
inventory             - View your current items
history               - Review your hacking and movement log
map                   - Display the current map and your position
undo                  - Revert to your previous position
find_path <location>  - Get directions to a node (T, B, or D)
bypass drone          - Evade a high-priority drone with VPN_app
help                  - Show this help menu
quit                  - Exit the game

Directions: north | south | east | west
Locations:  T (Thamel), B (Baneshwor), D (Durbar Square), H (Patan Data Hub)

=============================================
        Playing 'The Last Protocol'
=============================================

[1] Getting Started
    - Enter a name (letters and spaces only) when prompted.
    - Type 'map' to view your starting location (Lazimpat).

[2] Gameplay Mechanics
    - hack             : Trace 'firewall', 'router' or 'server' (3 tries).
                         The signal changes after every wrong guess.
    - undo             : Step back to your last safe position.
    - find_path <loc>  : Get the shortest route to a node.
    - bypass drone     : Use 'VPN_app' to evade the Kumari Protocol Drone.
    - Beware: crowds may slow you down!

[3] The Final Mission
    - Hack all nodes to unlock the Patan Data Hub (H).
    - At the hub you must choose:
        protocol containment  (multi-step, undoable)
        protocol obliteration (irreversible, permanent)
    - Too many mistakes in the final protocol means mission failure.

=============================================";

pub(crate) fn briefing(name: &str) -> String {
    format!(
        "Greetings, {name}.\n\n\
The year is 2025. Kathmandu, once a hub of traditional charm, now thrives on the digital pulse of Skynet.\n\n\
But something has gone wrong. Nova, the AI that manages the city, has been corrupted.\n\n\
It now calls itself Oblivion.\n\n\
Your mission: infiltrate data hubs, bypass security, and restore systems while evading corporate drones.\n\n\
The fate of Kathmandu's digital future rests on you.\n\n\
Type 'help' for commands."
    )
}
